//! Molecular graph representation.

use crate::element::{Element, HYDROGEN_WEIGHT};

/// Bond order classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BondOrder {
    Single,
    Double,
    Triple,
    Quadruple,
    Aromatic,
}

impl BondOrder {
    /// Valence contribution. Aromatic bonds count as 1 here; the parser
    /// subtracts the shared pi electron separately.
    pub fn valence(self) -> u8 {
        match self {
            BondOrder::Single | BondOrder::Aromatic => 1,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
            BondOrder::Quadruple => 4,
        }
    }
}

/// An atom in a molecular graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub element: &'static Element,
    pub aromatic: bool,
    pub charge: i8,
    pub isotope: Option<u16>,
    /// Implicit (organic subset) or bracket-declared hydrogen count.
    pub hydrogens: u8,
}

impl Atom {
    pub fn number(&self) -> u8 {
        self.element.number
    }

    pub fn is_hydrogen(&self) -> bool {
        self.element.number == 1
    }
}

/// A bond between two atoms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bond {
    pub a: usize,
    pub b: usize,
    pub order: BondOrder,
}

impl Bond {
    pub fn other(&self, atom: usize) -> usize {
        if self.a == atom { self.b } else { self.a }
    }
}

/// A molecular graph with atoms, bonds, and adjacency information.
#[derive(Debug, Clone)]
pub struct Molecule {
    pub atoms: Vec<Atom>,
    pub bonds: Vec<Bond>,
    /// adjacency[atom] = Vec<(neighbor, bond index)>
    pub adjacency: Vec<Vec<(usize, usize)>>,
}

impl Molecule {
    /// Build a molecule, deriving the adjacency list from the bonds.
    pub fn new(atoms: Vec<Atom>, bonds: Vec<Bond>) -> Self {
        let mut adjacency = vec![Vec::new(); atoms.len()];
        for (i, bond) in bonds.iter().enumerate() {
            adjacency[bond.a].push((bond.b, i));
            adjacency[bond.b].push((bond.a, i));
        }
        Self { atoms, bonds, adjacency }
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn heavy_atom_count(&self) -> usize {
        self.atoms.iter().filter(|a| !a.is_hydrogen()).count()
    }

    /// Number of bonded neighbours that are not hydrogen atoms.
    pub fn heavy_degree(&self, atom: usize) -> usize {
        self.adjacency[atom]
            .iter()
            .filter(|&&(n, _)| !self.atoms[n].is_hydrogen())
            .count()
    }

    /// Implicit hydrogens plus explicit `[H]` neighbours.
    pub fn total_hydrogens(&self, atom: usize) -> u32 {
        let explicit = self.adjacency[atom]
            .iter()
            .filter(|&&(n, _)| self.atoms[n].is_hydrogen())
            .count() as u32;
        self.atoms[atom].hydrogens as u32 + explicit
    }

    pub fn bond_between(&self, a: usize, b: usize) -> Option<usize> {
        self.adjacency[a].iter().find(|&&(n, _)| n == b).map(|&(_, bi)| bi)
    }

    /// True if the atom carries a double bond to any neighbour.
    pub fn has_double_bond(&self, atom: usize) -> bool {
        self.adjacency[atom]
            .iter()
            .any(|&(_, bi)| self.bonds[bi].order == BondOrder::Double)
    }

    pub fn has_triple_bond(&self, atom: usize) -> bool {
        self.adjacency[atom]
            .iter()
            .any(|&(_, bi)| self.bonds[bi].order == BondOrder::Triple)
    }

    /// Number of disconnected fragments.
    pub fn component_count(&self) -> usize {
        let n = self.atoms.len();
        let mut seen = vec![false; n];
        let mut components = 0;
        for start in 0..n {
            if seen[start] {
                continue;
            }
            components += 1;
            let mut stack = vec![start];
            seen[start] = true;
            while let Some(cur) = stack.pop() {
                for &(next, _) in &self.adjacency[cur] {
                    if !seen[next] {
                        seen[next] = true;
                        stack.push(next);
                    }
                }
            }
        }
        components
    }

    /// Average molecular weight including implicit hydrogens.
    pub fn molecular_weight(&self) -> f64 {
        self.atoms
            .iter()
            .map(|a| a.element.weight + a.hydrogens as f64 * HYDROGEN_WEIGHT)
            .sum()
    }

    /// Hill-order molecular formula (C, H, then alphabetical).
    pub fn formula(&self) -> String {
        use std::collections::BTreeMap;

        let mut counts: BTreeMap<&str, u32> = BTreeMap::new();
        for atom in &self.atoms {
            *counts.entry(atom.element.symbol).or_insert(0) += 1;
            if atom.hydrogens > 0 {
                *counts.entry("H").or_insert(0) += atom.hydrogens as u32;
            }
        }

        let mut formula = String::new();
        let mut push = |symbol: &str, count: u32| {
            formula.push_str(symbol);
            if count > 1 {
                formula.push_str(&count.to_string());
            }
        };
        if let Some(c) = counts.remove("C") {
            push("C", c);
            if let Some(h) = counts.remove("H") {
                push("H", h);
            }
        }
        for (symbol, count) in counts {
            push(symbol, count);
        }
        formula
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::by_symbol;

    fn atom(symbol: &str, hydrogens: u8) -> Atom {
        Atom {
            element: by_symbol(symbol).unwrap(),
            aromatic: false,
            charge: 0,
            isotope: None,
            hydrogens,
        }
    }

    #[test]
    fn construction_and_adjacency() {
        let mol = Molecule::new(
            vec![atom("C", 3), atom("O", 1)],
            vec![Bond { a: 0, b: 1, order: BondOrder::Single }],
        );
        assert_eq!(mol.atom_count(), 2);
        assert_eq!(mol.heavy_degree(0), 1);
        assert_eq!(mol.bond_between(1, 0), Some(0));
        assert_eq!(mol.component_count(), 1);
        assert_eq!(mol.formula(), "CH4O");
        assert!((mol.molecular_weight() - 32.042).abs() < 0.01);
    }

    #[test]
    fn explicit_hydrogen_neighbours_count() {
        let mol = Molecule::new(
            vec![atom("O", 0), atom("H", 0), atom("H", 0)],
            vec![
                Bond { a: 0, b: 1, order: BondOrder::Single },
                Bond { a: 0, b: 2, order: BondOrder::Single },
            ],
        );
        assert_eq!(mol.total_hydrogens(0), 2);
        assert_eq!(mol.heavy_degree(0), 0);
        assert_eq!(mol.heavy_atom_count(), 1);
    }
}
