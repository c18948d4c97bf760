//! Ring perception and aromaticity.
//!
//! Rings are the smallest set of smallest rings: one shortest cycle per ring
//! bond, deduplicated, then picked smallest-first while they stay linearly
//! independent over GF(2) until the cyclomatic number is reached.

use std::collections::VecDeque;

use crate::molecule::{BondOrder, Molecule};

/// Ring membership and SSSR for one molecule.
#[derive(Debug, Clone, Default)]
pub struct RingInfo {
    /// Each ring as atom indices in traversal order.
    pub rings: Vec<Vec<usize>>,
    /// Bond indices for each ring, parallel to `rings`.
    pub ring_bonds: Vec<Vec<usize>>,
    bond_in_ring: Vec<bool>,
    atom_in_ring: Vec<bool>,
}

impl RingInfo {
    pub fn perceive(mol: &Molecule) -> Self {
        let bond_in_ring = cyclic_bonds(mol);
        let mut atom_in_ring = vec![false; mol.atom_count()];
        for (bi, bond) in mol.bonds.iter().enumerate() {
            if bond_in_ring[bi] {
                atom_in_ring[bond.a] = true;
                atom_in_ring[bond.b] = true;
            }
        }

        let nullity = (mol.bonds.len() + mol.component_count()).saturating_sub(mol.atom_count());
        let (rings, ring_bonds) = if nullity == 0 {
            (Vec::new(), Vec::new())
        } else {
            smallest_rings(mol, &bond_in_ring, nullity)
        };

        Self { rings, ring_bonds, bond_in_ring, atom_in_ring }
    }

    pub fn ring_count(&self) -> usize {
        self.rings.len()
    }

    pub fn atom_in_ring(&self, atom: usize) -> bool {
        self.atom_in_ring.get(atom).copied().unwrap_or(false)
    }

    pub fn bond_in_ring(&self, bond: usize) -> bool {
        self.bond_in_ring.get(bond).copied().unwrap_or(false)
    }

    /// Rings whose atoms are all aromatic.
    pub fn aromatic_ring_count(&self, mol: &Molecule) -> usize {
        self.rings
            .iter()
            .filter(|ring| ring.iter().all(|&a| mol.atoms[a].aromatic))
            .count()
    }
}

/// Non-bridge bonds, found with an iterative Tarjan low-link pass.
fn cyclic_bonds(mol: &Molecule) -> Vec<bool> {
    let n = mol.atom_count();
    let mut in_ring = vec![true; mol.bonds.len()];
    let mut disc = vec![usize::MAX; n];
    let mut low = vec![0usize; n];
    let mut time = 0;

    for root in 0..n {
        if disc[root] != usize::MAX {
            continue;
        }
        // (atom, bond used to reach it, next adjacency index)
        let mut stack: Vec<(usize, Option<usize>, usize)> = vec![(root, None, 0)];
        disc[root] = time;
        low[root] = time;
        time += 1;

        while let Some(frame) = stack.last_mut() {
            let (atom, via, next) = *frame;
            if let Some(&(neighbor, bond)) = mol.adjacency[atom].get(next) {
                frame.2 += 1;
                if Some(bond) == via {
                    continue;
                }
                if disc[neighbor] == usize::MAX {
                    disc[neighbor] = time;
                    low[neighbor] = time;
                    time += 1;
                    stack.push((neighbor, Some(bond), 0));
                } else {
                    low[atom] = low[atom].min(disc[neighbor]);
                }
            } else {
                stack.pop();
                if let (Some(&(parent, _, _)), Some(bond)) = (stack.last(), via) {
                    low[parent] = low[parent].min(low[atom]);
                    if low[atom] > disc[parent] {
                        in_ring[bond] = false;
                    }
                }
            }
        }
    }
    in_ring
}

type BitSet = Vec<u64>;

fn bitset(len: usize, bits: &[usize]) -> BitSet {
    let mut set = vec![0u64; (len + 63) / 64];
    for &b in bits {
        set[b / 64] ^= 1 << (b % 64);
    }
    set
}

fn lowest_bit(set: &BitSet) -> Option<usize> {
    set.iter()
        .enumerate()
        .find(|(_, w)| **w != 0)
        .map(|(i, w)| i * 64 + w.trailing_zeros() as usize)
}

fn test_bit(set: &BitSet, bit: usize) -> bool {
    set[bit / 64] & (1 << (bit % 64)) != 0
}

fn smallest_rings(mol: &Molecule, bond_in_ring: &[bool], nullity: usize) -> (Vec<Vec<usize>>, Vec<Vec<usize>>) {
    let mut candidates: Vec<(Vec<usize>, Vec<usize>)> = Vec::new();

    for (bi, bond) in mol.bonds.iter().enumerate() {
        if !bond_in_ring[bi] {
            continue;
        }
        if let Some((atoms, mut bonds)) = shortest_path(mol, bond_in_ring, bond.a, bond.b, bi) {
            bonds.push(bi);
            let mut key = bonds.clone();
            key.sort_unstable();
            if !candidates.iter().any(|(_, b)| {
                let mut other = b.clone();
                other.sort_unstable();
                other == key
            }) {
                candidates.push((atoms, bonds));
            }
        }
    }
    candidates.sort_by_key(|(atoms, _)| atoms.len());

    let nbonds = mol.bonds.len();
    let mut basis: Vec<(usize, BitSet)> = Vec::new();
    let mut rings = Vec::new();
    let mut ring_bonds = Vec::new();

    for (atoms, bonds) in candidates {
        if rings.len() == nullity {
            break;
        }
        let mut reduced = bitset(nbonds, &bonds);
        for (pivot, vector) in &basis {
            if test_bit(&reduced, *pivot) {
                for (r, v) in reduced.iter_mut().zip(vector) {
                    *r ^= v;
                }
            }
        }
        if let Some(pivot) = lowest_bit(&reduced) {
            basis.push((pivot, reduced));
            rings.push(atoms);
            ring_bonds.push(bonds);
        }
    }
    (rings, ring_bonds)
}

/// BFS over ring bonds from `from` to `to`, never using `skip`.
/// Returns the atom path (from..=to) and the bonds walked.
fn shortest_path(
    mol: &Molecule,
    bond_in_ring: &[bool],
    from: usize,
    to: usize,
    skip: usize,
) -> Option<(Vec<usize>, Vec<usize>)> {
    let n = mol.atom_count();
    let mut came_from: Vec<Option<(usize, usize)>> = vec![None; n];
    let mut seen = vec![false; n];
    let mut queue = VecDeque::new();
    seen[from] = true;
    queue.push_back(from);

    while let Some(cur) = queue.pop_front() {
        if cur == to {
            break;
        }
        for &(next, bond) in &mol.adjacency[cur] {
            if bond == skip || !bond_in_ring[bond] || seen[next] {
                continue;
            }
            seen[next] = true;
            came_from[next] = Some((cur, bond));
            queue.push_back(next);
        }
    }

    if !seen[to] {
        return None;
    }
    let mut atoms = vec![to];
    let mut bonds = Vec::new();
    let mut cur = to;
    while let Some((prev, bond)) = came_from[cur] {
        atoms.push(prev);
        bonds.push(bond);
        cur = prev;
    }
    atoms.reverse();
    bonds.reverse();
    Some((atoms, bonds))
}

// ── Aromaticity ───────────────────────────────────────────────────────────────

/// Mark Kekulé-drawn Hückel rings (4n+2 pi electrons) aromatic, repeating
/// until fused systems stop changing. Atoms written aromatic are kept as is.
pub fn perceive_aromaticity(mol: &mut Molecule, rings: &RingInfo) {
    let mut changed = true;
    let mut passes = 0;
    while changed && passes <= rings.ring_count() {
        changed = false;
        passes += 1;
        for (atoms, bonds) in rings.rings.iter().zip(&rings.ring_bonds) {
            if atoms.len() < 5 || atoms.len() > 7 {
                continue;
            }
            if atoms.iter().all(|&a| mol.atoms[a].aromatic) {
                continue;
            }
            if !is_huckel(mol, rings, atoms, bonds) {
                continue;
            }
            for &a in atoms {
                mol.atoms[a].aromatic = true;
            }
            for &b in bonds {
                mol.bonds[b].order = BondOrder::Aromatic;
            }
            changed = true;
        }
    }
}

fn is_huckel(mol: &Molecule, rings: &RingInfo, atoms: &[usize], bonds: &[usize]) -> bool {
    let mut electrons = 0u32;
    for &atom in atoms {
        match pi_electrons(mol, rings, atom, bonds) {
            Some(e) => electrons += e,
            None => return false,
        }
    }
    electrons % 4 == 2
}

/// Pi electrons an atom donates to the ring formed by `ring_bonds`.
fn pi_electrons(mol: &Molecule, rings: &RingInfo, atom: usize, ring_bonds: &[usize]) -> Option<u32> {
    let a = &mol.atoms[atom];
    let number = a.number();

    if a.aromatic {
        let lone_pair_donor = match number {
            8 | 16 | 34 => true,
            7 | 15 => a.charge == 0 && (mol.total_hydrogens(atom) > 0 || mol.heavy_degree(atom) == 3),
            _ => false,
        };
        return Some(if lone_pair_donor { 2 } else { 1 });
    }

    let mut ring_double = false;
    let mut exo_double: Option<usize> = None;
    for &(neighbor, bi) in &mol.adjacency[atom] {
        match mol.bonds[bi].order {
            BondOrder::Double if ring_bonds.contains(&bi) => ring_double = true,
            BondOrder::Double => exo_double = Some(neighbor),
            BondOrder::Triple | BondOrder::Quadruple => return None,
            _ => {}
        }
    }

    if ring_double {
        return Some(1);
    }
    if let Some(partner) = exo_double {
        let p = &mol.atoms[partner];
        if p.aromatic || rings.atom_in_ring(partner) {
            return Some(1);
        }
        return match p.number() {
            7 | 8 | 16 => Some(0),
            _ => None,
        };
    }

    match number {
        7 | 15 if a.charge <= 0 => Some(2),
        8 | 16 | 34 if a.charge == 0 => Some(2),
        6 if a.charge < 0 => Some(2),
        6 if a.charge > 0 => Some(0),
        _ => None,
    }
}
