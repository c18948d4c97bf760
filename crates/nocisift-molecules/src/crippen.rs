//! Wildman-Crippen LogP.
//!
//! Every heavy atom is assigned one of the published atom types (C1-C27,
//! N1-N14, O1-O12, halogens, S1-S3) and contributes that type's value. Its
//! hydrogens are typed by the heavy atom they are attached to (H1-H4).
//! Types are tried in the published order and the first match wins, so the
//! order of the match arms below matters.
//!
//! Reference: S. A. Wildman and G. M. Crippen, J. Chem. Inf. Comput. Sci.
//! 39, 868-873 (1999).

use crate::molecule::{BondOrder, Molecule};
use crate::ring::RingInfo;

const CS: f64 = 0.08129;
const NS: f64 = -0.4806;
const OS: f64 = -0.1188;
const HS: f64 = 0.1125;

/// Octanol/water partition coefficient.
pub fn logp(mol: &Molecule, rings: &RingInfo) -> f64 {
    (0..mol.atom_count())
        .filter(|&i| !mol.atoms[i].is_hydrogen())
        .map(|i| {
            let env = Environment::new(mol, rings, i);
            env.heavy_contribution() + f64::from(env.h) * env.hydrogen_contribution()
        })
        .sum()
}

/// How a neighbour is attached.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Link {
    /// Aromatic bond inside a ring (`:` in SMARTS).
    Ring,
    Single,
    Double,
    Triple,
}

#[derive(Debug, Clone, Copy)]
struct Neighbour {
    index: usize,
    number: u8,
    aromatic: bool,
    link: Link,
}

impl Neighbour {
    fn aliphatic(&self) -> bool {
        !self.aromatic
    }

    fn aliphatic_carbon(&self) -> bool {
        self.number == 6 && !self.aromatic
    }

    /// N, O, P, S or a halogen written aliphatic.
    fn polar(&self) -> bool {
        !self.aromatic && matches!(self.number, 7 | 8 | 9 | 15 | 16 | 17 | 35 | 53)
    }
}

struct Environment<'a> {
    mol: &'a Molecule,
    atom: usize,
    number: u8,
    aromatic: bool,
    charge: i8,
    h: u32,
    neighbours: Vec<Neighbour>,
}

impl<'a> Environment<'a> {
    fn new(mol: &'a Molecule, rings: &RingInfo, atom: usize) -> Self {
        let neighbours = mol.adjacency[atom]
            .iter()
            .filter(|&&(n, _)| !mol.atoms[n].is_hydrogen())
            .map(|&(n, bi)| {
                let link = match mol.bonds[bi].order {
                    BondOrder::Aromatic if rings.bond_in_ring(bi) => Link::Ring,
                    BondOrder::Double => Link::Double,
                    BondOrder::Triple | BondOrder::Quadruple => Link::Triple,
                    BondOrder::Single | BondOrder::Aromatic => Link::Single,
                };
                let other = &mol.atoms[n];
                Neighbour { index: n, number: other.number(), aromatic: other.aromatic, link }
            })
            .collect();
        let a = &mol.atoms[atom];
        Self {
            mol,
            atom,
            number: a.number(),
            aromatic: a.aromatic,
            charge: a.charge,
            h: mol.total_hydrogens(atom),
            neighbours,
        }
    }

    fn degree(&self) -> usize {
        self.neighbours.len()
    }

    /// Total connections including hydrogens (SMARTS `X`).
    fn connections(&self) -> usize {
        self.degree() + self.h as usize
    }

    fn any(&self, f: impl Fn(&Neighbour) -> bool) -> bool {
        self.neighbours.iter().any(f)
    }

    fn all(&self, f: impl Fn(&Neighbour) -> bool) -> bool {
        self.neighbours.iter().all(f)
    }

    fn count(&self, f: impl Fn(&Neighbour) -> bool) -> usize {
        self.neighbours.iter().filter(|n| f(n)).count()
    }

    fn heavy_contribution(&self) -> f64 {
        match self.number {
            6 if self.aromatic => self.aromatic_carbon(),
            6 => self.aliphatic_carbon(),
            7 => self.nitrogen(),
            8 => self.oxygen(),
            9 => 0.4202,
            17 => 0.6895,
            35 => 0.8456,
            53 => 0.8857,
            15 => 0.8612,
            16 if self.aromatic => 0.6237,
            16 if self.charge != 0 => -0.0024,
            16 => 0.6482,
            _ => 0.0,
        }
    }

    fn aliphatic_carbon(&self) -> f64 {
        let h = self.h;
        let x4 = self.connections() == 4;
        let carbons = self.count(|n| n.aliphatic_carbon() && n.link == Link::Single);
        let polar = self.any(|n| n.polar() && n.link == Link::Single);
        let aromatic_neighbour = self.any(|n| n.aromatic);
        let double_to = |f: fn(&Neighbour) -> bool| self.any(|n| n.link == Link::Double && f(n));

        if h == 4 || (h == 3 && carbons >= 1) || (h == 2 && carbons >= 2) {
            return 0.1441; // C1
        }
        if (h == 1 && carbons >= 3) || (h == 0 && carbons >= 4) {
            return 0.0; // C2
        }
        if polar && ((h == 3) || (h == 2 && x4 && self.degree() == 2 && self.all(|n| n.aliphatic()))) {
            return -0.2035; // C3
        }
        if polar && x4 && h <= 1 && self.all(|n| n.aliphatic()) {
            return -0.2051; // C4
        }
        if double_to(|n| n.aliphatic() && n.number != 6) {
            return -0.2783; // C5
        }
        if double_to(|n| n.aliphatic_carbon()) && self.all(|n| n.aliphatic()) {
            return 0.1551; // C6
        }
        if self.any(|n| n.link == Link::Triple && n.aliphatic()) {
            return 0.0017; // C7
        }
        if h == 3 && self.any(|n| n.aromatic && n.number == 6) {
            return 0.08452; // C8
        }
        if h == 3 && aromatic_neighbour {
            return -0.1444; // C9
        }
        if x4 && aromatic_neighbour {
            return match h {
                2 => -0.0516, // C10
                1 => 0.1193,  // C11
                _ => -0.0967, // C12
            };
        }
        if double_to(|n| n.number == 6) && aromatic_neighbour {
            return 0.2640; // C26
        }
        if x4 && self.any(|n| n.aliphatic() && !matches!(n.number, 6 | 7 | 8 | 9 | 15 | 16 | 17 | 35 | 53)) {
            return 0.2148; // C27
        }
        CS
    }

    fn aromatic_carbon(&self) -> f64 {
        let substituent = |f: fn(&Neighbour) -> bool| self.any(|n| n.link != Link::Ring && f(n));

        if self.h == 0
            && substituent(|n| n.link == Link::Single && n.aliphatic() && !matches!(n.number, 6 | 7 | 8 | 9 | 16 | 17 | 35 | 53))
        {
            return -0.5443; // C13
        }
        if substituent(|n| n.number == 9) {
            return 0.0; // C14
        }
        if substituent(|n| n.number == 17) {
            return 0.2450; // C15
        }
        if substituent(|n| n.number == 35) {
            return 0.1980; // C16
        }
        if substituent(|n| n.number == 53) {
            return 0.0; // C17
        }
        if self.h > 0 {
            return 0.1581; // C18
        }
        if self.count(|n| n.link == Link::Ring) >= 3 {
            return 0.2955; // C19
        }
        let single = |f: fn(&Neighbour) -> bool| self.any(|n| n.link == Link::Single && f(n));
        if single(|n| n.aromatic) {
            return 0.2713; // C20
        }
        if single(|n| n.number == 6) {
            return 0.1360; // C21
        }
        if single(|n| n.number == 7) {
            return 0.4619; // C22
        }
        if single(|n| n.number == 8) {
            return 0.5437; // C23
        }
        if single(|n| n.number == 16) {
            return 0.1893; // C24
        }
        if self.any(|n| n.link == Link::Double && matches!(n.number, 6 | 7 | 8)) {
            return -0.8186; // C25
        }
        CS
    }

    fn nitrogen(&self) -> f64 {
        if self.aromatic {
            return if self.charge > 0 { -1.1190 } else { -0.3239 }; // N12, N11
        }
        if self.charge > 0 {
            return if self.h > 0 { -1.9500 } else { -0.3396 }; // N10, N13
        }
        if self.charge < 0 {
            return 0.2887; // N14
        }

        let aromatic = self.count(|n| n.aromatic && n.link == Link::Single);
        let double = self.any(|n| n.link == Link::Double);
        match (self.h, self.degree()) {
            (2, 1) if aromatic == 0 => -1.0190,        // N1
            (1, 2) if aromatic == 0 && !double => -0.7096, // N2
            (2, 1) => -1.0270,                         // N3
            (1, 2) if !double => -0.5188,              // N4
            (1, 1) if double => 0.08387,               // N5
            (0, 2) if double => 0.1836,                // N6
            (0, 3) if aromatic == 0 => -0.3187,        // N7
            (0, 3) => -0.4458,                         // N8
            (0, 1) if self.any(|n| n.link == Link::Triple) => 0.01508, // N9
            _ => NS,
        }
    }

    fn oxygen(&self) -> f64 {
        if self.aromatic {
            return 0.1552; // O1
        }
        if self.charge < 0 {
            return match self.neighbours.first() {
                Some(n) if n.number == 7 => 0.0335,  // O5
                Some(n) if n.number == 16 => -0.3339, // O6
                Some(n) if n.number == 6 && self.carbonyl_partner(n.index) => -1.3260, // O12
                _ => -1.1890,                          // O7
            };
        }
        if self.h > 0 {
            return -0.2893; // O2
        }
        if self.degree() == 2 {
            return if self.any(|n| n.aromatic) { -0.4195 } else { -0.0684 }; // O4, O3
        }

        let Some(partner) = self.neighbours.iter().find(|n| n.link == Link::Double) else {
            return OS;
        };
        match partner.number {
            7 | 8 => 0.0335, // O5
            6 if partner.aromatic => 0.1788, // O8
            6 => self.carbonyl_oxygen(partner.index),
            _ => OS,
        }
    }

    /// O9 (aliphatic), O10 (aromatic) or O11 (heteroatom) carbonyl.
    fn carbonyl_oxygen(&self, carbon: usize) -> f64 {
        let others: Vec<(u8, bool)> = self.mol.adjacency[carbon]
            .iter()
            .filter(|&&(n, _)| n != self.atom && !self.mol.atoms[n].is_hydrogen())
            .map(|&(n, _)| (self.mol.atoms[n].number(), self.mol.atoms[n].aromatic))
            .collect();
        let aliphatic_carbon = others.iter().any(|&(z, ar)| z == 6 && !ar);
        let aromatic = others.iter().any(|&(_, ar)| ar);
        let any_carbon = others.iter().any(|&(z, _)| z == 6);

        if others.is_empty() || (aliphatic_carbon && !aromatic) || (!any_carbon && others.len() == 1) {
            -0.1526 // O9
        } else if aromatic {
            0.1129 // O10
        } else if others.iter().all(|&(z, _)| z != 6) {
            0.4833 // O11
        } else {
            -0.1526
        }
    }

    /// True when `carbon` carries a double-bonded oxygen other than this atom.
    fn carbonyl_partner(&self, carbon: usize) -> bool {
        self.mol.adjacency[carbon].iter().any(|&(n, bi)| {
            n != self.atom && self.mol.atoms[n].number() == 8 && self.mol.bonds[bi].order == BondOrder::Double
        })
    }

    fn hydrogen_contribution(&self) -> f64 {
        match self.number {
            6 => 0.1230, // H1
            7 => 0.2142, // H3
            8 => {
                let Some(n) = self.neighbours.first() else {
                    return HS;
                };
                match n.number {
                    7 => 0.2142, // H3
                    8 | 16 => 0.2980, // H4
                    6 if !n.aromatic && self.double_bonded_elsewhere(n.index) => 0.2980, // H4
                    _ => -0.2677, // H2
                }
            }
            _ => -0.2677, // H2
        }
    }

    /// True when `carbon` has a double bond to anything other than this atom.
    fn double_bonded_elsewhere(&self, carbon: usize) -> bool {
        self.mol.adjacency[carbon]
            .iter()
            .any(|&(n, bi)| n != self.atom && self.mol.bonds[bi].order == BondOrder::Double)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::parse_smiles;

    fn crippen(smiles: &str) -> f64 {
        let mol = parse_smiles(smiles).unwrap();
        let rings = RingInfo::perceive(&mol);
        logp(&mol, &rings)
    }

    fn assert_close(smiles: &str, expected: f64) {
        let got = crippen(smiles);
        assert!((got - expected).abs() < 0.01, "{smiles}: logp {got}, expected {expected}");
    }

    #[test]
    fn aromatic_hydrocarbons() {
        assert_close("c1ccccc1", 1.6866);
        assert_close("C1=CC=CC=C1", 1.6866);
        assert_close("c1ccc2ccccc2c1", 2.8398);
        assert_close("c1cc2ccc3cccc4ccc(c1)c2c34", 4.5840);
    }

    #[test]
    fn reference_drugs() {
        assert_close("CC(=O)Nc1ccc(O)cc1", 1.3506);
        assert_close("CC(C)Cc1ccc(cc1)C(C)C(=O)O", 3.0732);
        assert_close("CC(=O)Oc1ccccc1C(=O)O", 1.3101);
    }

    #[test]
    fn aliphatic_types() {
        // cyclohexane: six C1 carbons with twelve H1
        assert_close("C1CCCCC1", 2.3406);
        // ethanol: C1 + C3 + O2 + alcohol H
        assert_close("CCO", 0.1441 + 3.0 * 0.123 - 0.2035 + 2.0 * 0.123 - 0.2893 - 0.2677);
    }

    #[test]
    fn biphenyl_link_is_not_a_ring_bond() {
        // ten C18 plus two C20
        assert_close("c1ccccc1-c1ccccc1", 10.0 * (0.1581 + 0.123) + 2.0 * 0.2713);
        assert_close("c1ccccc1c1ccccc1", 10.0 * (0.1581 + 0.123) + 2.0 * 0.2713);
    }
}
