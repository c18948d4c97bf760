//! Graph-based descriptor calculations over a parsed [`Molecule`].

use nocisift_common::{DescriptorBundle, InterpreterMode};

use crate::crippen;
use crate::molecule::{BondOrder, Molecule};
use crate::ring::RingInfo;

/// Compute the full descriptor set for a parsed molecule.
pub fn compute(mol: &Molecule) -> DescriptorBundle {
    let rings = RingInfo::perceive(mol);
    DescriptorBundle {
        molecular_weight: mol.molecular_weight(),
        logp: crippen::logp(mol, &rings),
        hbd: hbd_count(mol),
        hba: hba_count(mol),
        tpsa: tpsa(mol),
        rotatable_bonds: rotatable_bond_count(mol, &rings),
        aromatic_rings: rings.aromatic_ring_count(mol) as u32,
        mode: InterpreterMode::Exact,
    }
}

fn is_n_or_o(number: u8) -> bool {
    number == 7 || number == 8
}

/// N or O atoms carrying at least one hydrogen.
pub fn hbd_count(mol: &Molecule) -> u32 {
    (0..mol.atom_count())
        .filter(|&i| is_n_or_o(mol.atoms[i].number()) && mol.total_hydrogens(i) > 0)
        .count() as u32
}

/// All N and O atoms (the Lipinski acceptor count).
pub fn hba_count(mol: &Molecule) -> u32 {
    mol.atoms.iter().filter(|a| is_n_or_o(a.number())).count() as u32
}

/// Topological polar surface area from Ertl's nitrogen and oxygen fragment
/// contributions. Sulfur and phosphorus are not counted.
pub fn tpsa(mol: &Molecule) -> f64 {
    (0..mol.atom_count()).map(|i| polar_contribution(mol, i)).sum()
}

fn polar_contribution(mol: &Molecule, atom: usize) -> f64 {
    let a = &mol.atoms[atom];
    let h = mol.total_hydrogens(atom);
    let degree = mol.heavy_degree(atom);
    let double = mol.has_double_bond(atom);
    let triple = mol.has_triple_bond(atom);

    match a.number() {
        7 if a.aromatic => match (a.charge, h, degree) {
            (0, 0, 2) => 12.89,
            (0, 0, _) => 4.41,
            (0, _, _) => 15.79,
            (c, 0, _) if c > 0 => 3.88,
            (c, _, _) if c > 0 => 14.14,
            _ => 12.89,
        },
        7 if a.charge > 0 => match (h, double, triple) {
            (0, false, false) => 0.0,
            (0, true, _) => 3.01,
            (0, _, true) => 4.36,
            (1, false, _) => 4.44,
            (1, true, _) => 13.97,
            (2, false, _) => 16.61,
            (2, true, _) => 25.59,
            _ => 27.64,
        },
        7 => match (h, double, triple) {
            (0, _, true) => 23.79,
            (0, true, _) => 12.36,
            (0, false, _) => 3.24,
            (1, true, _) => 23.85,
            (1, false, _) => 12.03,
            _ => 26.02,
        },
        8 if a.aromatic => 13.14,
        8 if a.charge < 0 => 23.06,
        8 if double => 17.07,
        8 if h > 0 => 20.23,
        8 => 9.23,
        _ => 0.0,
    }
}

/// Single, non-ring bonds between two non-terminal heavy atoms. Amide C-N
/// bonds and bonds next to a triple bond are treated as rigid.
pub fn rotatable_bond_count(mol: &Molecule, rings: &RingInfo) -> u32 {
    mol.bonds
        .iter()
        .enumerate()
        .filter(|&(bi, bond)| {
            bond.order == BondOrder::Single
                && !rings.bond_in_ring(bi)
                && !mol.atoms[bond.a].is_hydrogen()
                && !mol.atoms[bond.b].is_hydrogen()
                && mol.heavy_degree(bond.a) >= 2
                && mol.heavy_degree(bond.b) >= 2
                && !mol.has_triple_bond(bond.a)
                && !mol.has_triple_bond(bond.b)
                && !is_amide_bond(mol, bond.a, bond.b)
        })
        .count() as u32
}

/// True for the C-N bond of a C(=O)N amide.
fn is_amide_bond(mol: &Molecule, a: usize, b: usize) -> bool {
    let carbon = match (mol.atoms[a].number(), mol.atoms[b].number()) {
        (6, 7) => a,
        (7, 6) => b,
        _ => return false,
    };
    mol.adjacency[carbon].iter().any(|&(n, bi)| {
        mol.atoms[n].number() == 8 && mol.bonds[bi].order == BondOrder::Double
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::parse_smiles;

    fn descriptors(smiles: &str) -> DescriptorBundle {
        compute(&parse_smiles(smiles).unwrap())
    }

    #[test]
    fn acetaminophen() {
        let d = descriptors("CC(=O)Nc1ccc(O)cc1");
        assert!((d.molecular_weight - 151.165).abs() < 0.01);
        assert_eq!(d.hbd, 2);
        assert_eq!(d.hba, 3);
        assert!((d.tpsa - 49.33).abs() < 0.01, "tpsa={}", d.tpsa);
        assert_eq!(d.rotatable_bonds, 1);
        assert_eq!(d.aromatic_rings, 1);
        assert!((d.logp - 1.35).abs() < 0.05, "logp={}", d.logp);
        assert_eq!(d.mode, InterpreterMode::Exact);
    }

    #[test]
    fn ibuprofen() {
        let d = descriptors("CC(C)Cc1ccc(cc1)C(C)C(=O)O");
        assert!((d.molecular_weight - 206.28).abs() < 0.05);
        assert_eq!(d.hbd, 1);
        assert_eq!(d.hba, 2);
        assert!((d.tpsa - 37.30).abs() < 0.01);
        assert_eq!(d.rotatable_bonds, 4);
        assert!((d.logp - 3.07).abs() < 0.05, "logp={}", d.logp);
    }

    #[test]
    fn kekule_and_aromatic_forms_agree() {
        let a = descriptors("c1ccccc1O");
        let b = descriptors("C1=CC=CC=C1O");
        assert_eq!(a.aromatic_rings, b.aromatic_rings);
        assert!((a.molecular_weight - b.molecular_weight).abs() < 1e-9);
        assert!((a.tpsa - b.tpsa).abs() < 1e-9);
    }

    #[test]
    fn nitrile_and_amine_polar_area() {
        // acetonitrile #N, methylamine NH2
        assert!((descriptors("CC#N").tpsa - 23.79).abs() < 0.01);
        assert!((descriptors("CN").tpsa - 26.02).abs() < 0.01);
        assert!((descriptors("CN(C)C").tpsa - 3.24).abs() < 0.01);
        assert!((descriptors("c1ccncc1").tpsa - 12.89).abs() < 0.01);
    }

    #[test]
    fn rigid_bonds_not_rotatable() {
        // amide C-N excluded, ring bonds excluded, terminal methyls excluded
        assert_eq!(descriptors("CC(=O)NC").rotatable_bonds, 0);
        assert_eq!(descriptors("C1CCCCC1").rotatable_bonds, 0);
        assert_eq!(descriptors("CCCC").rotatable_bonds, 1);
        assert_eq!(descriptors("CC#CCC").rotatable_bonds, 0);
    }

    #[test]
    fn polycyclic_aromatics_stay_within_rule_of_five_logp() {
        let pyrene = descriptors("c1cc2ccc3cccc4ccc(c1)c2c34");
        assert!((pyrene.logp - 4.58).abs() < 0.05, "logp={}", pyrene.logp);
        assert!(crate::evaluate(&pyrene).pass);
        assert!((descriptors("C1=CC=CC=C1").logp - 1.69).abs() < 0.05);
    }

    #[test]
    fn explicit_hydrogens_count_as_donors() {
        let d = descriptors("[H]OC");
        assert_eq!(d.hbd, 1);
        assert_eq!(d.rotatable_bonds, 0);
    }
}
