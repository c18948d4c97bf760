//! SMILES parser.
//!
//! Accepts the OpenSMILES subset that bioactivity databases emit: organic
//! subset and bracket atoms, explicit bonds, branches, ring closures (`0-9`
//! and `%nn`) and `.` disconnections. Stereo markers are accepted and
//! discarded since no descriptor here depends on them.
//!
//! The parser is total: every input string yields either a `Molecule` or a
//! `SmilesError`, never a panic.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::element::{self, Element};
use crate::molecule::{Atom, Bond, BondOrder, Molecule};
use crate::ring;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SmilesError {
    #[error("empty structure notation")]
    Empty,

    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("unknown element '{symbol}' at position {pos}")]
    UnknownElement { symbol: String, pos: usize },

    #[error("unterminated bracket atom starting at position {pos}")]
    UnterminatedBracket { pos: usize },

    #[error("invalid bracket atom at position {pos}: {reason}")]
    InvalidBracket { pos: usize, reason: &'static str },

    #[error("bond at position {pos} is not followed by an atom")]
    DanglingBond { pos: usize },

    #[error("unbalanced parenthesis at position {pos}")]
    UnbalancedBranch { pos: usize },

    #[error("ring closure {label} was opened at position {pos} and never closed")]
    UnclosedRing { label: u16, pos: usize },

    #[error("ring closure {label} at position {pos}: {reason}")]
    InvalidRingClosure { label: u16, pos: usize, reason: &'static str },

    #[error("atom at position {pos} exceeds its allowed valence")]
    ValenceExceeded { pos: usize },

    #[error("aromatic atom at position {pos} is not part of a ring")]
    AromaticOutsideRing { pos: usize },
}

/// Parse a SMILES string into a molecular graph with implicit hydrogens
/// assigned and aromaticity perceived.
pub fn parse_smiles(input: &str) -> Result<Molecule, SmilesError> {
    let chars: Vec<char> = input.trim().chars().collect();
    if chars.is_empty() {
        return Err(SmilesError::Empty);
    }

    let mut parser = Parser::new(&chars);
    parser.run()?;
    parser.finish()
}

#[derive(Debug)]
struct RingOpening {
    atom: usize,
    order: Option<BondOrder>,
    pos: usize,
}

#[derive(Debug)]
struct BranchOpening {
    atom: usize,
    atoms_before: usize,
    pos: usize,
}

struct Parser<'a> {
    chars: &'a [char],
    pos: usize,
    atoms: Vec<Atom>,
    /// Source position of each atom, for error reporting.
    atom_pos: Vec<usize>,
    /// Whether implicit hydrogens must be computed (organic subset atoms).
    implicit_h: Vec<bool>,
    bonds: Vec<Bond>,
    prev: Option<usize>,
    pending: Option<(BondOrder, usize)>,
    branches: Vec<BranchOpening>,
    rings: BTreeMap<u16, RingOpening>,
}

impl<'a> Parser<'a> {
    fn new(chars: &'a [char]) -> Self {
        Self {
            chars,
            pos: 0,
            atoms: Vec::new(),
            atom_pos: Vec::new(),
            implicit_h: Vec::new(),
            bonds: Vec::new(),
            prev: None,
            pending: None,
            branches: Vec::new(),
            rings: BTreeMap::new(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn unexpected(&self) -> SmilesError {
        SmilesError::UnexpectedChar {
            ch: self.peek().unwrap_or(' '),
            pos: self.pos,
        }
    }

    fn run(&mut self) -> Result<(), SmilesError> {
        while let Some(ch) = self.peek() {
            match ch {
                '-' | '=' | '#' | '$' | ':' | '/' | '\\' => self.bond_symbol(ch)?,
                '(' => {
                    let atom = match (self.prev, self.pending) {
                        (Some(atom), None) => atom,
                        _ => return Err(self.unexpected()),
                    };
                    self.branches.push(BranchOpening {
                        atom,
                        atoms_before: self.atoms.len(),
                        pos: self.pos,
                    });
                    self.pos += 1;
                }
                ')' => {
                    if let Some((_, pos)) = self.pending {
                        return Err(SmilesError::DanglingBond { pos });
                    }
                    let open = self
                        .branches
                        .pop()
                        .ok_or(SmilesError::UnbalancedBranch { pos: self.pos })?;
                    if self.atoms.len() == open.atoms_before {
                        return Err(self.unexpected());
                    }
                    self.prev = Some(open.atom);
                    self.pos += 1;
                }
                '.' => {
                    if let Some((_, pos)) = self.pending {
                        return Err(SmilesError::DanglingBond { pos });
                    }
                    if self.prev.is_none() || !self.branches.is_empty() {
                        return Err(self.unexpected());
                    }
                    self.prev = None;
                    self.pos += 1;
                }
                '0'..='9' | '%' => self.ring_closure()?,
                '[' => {
                    let start = self.pos;
                    let atom = self.bracket_atom()?;
                    self.push_atom(atom, start, false)?;
                }
                _ => {
                    let start = self.pos;
                    let atom = self.organic_atom()?;
                    self.push_atom(atom, start, true)?;
                }
            }
        }
        Ok(())
    }

    fn finish(mut self) -> Result<Molecule, SmilesError> {
        if let Some((_, pos)) = self.pending {
            return Err(SmilesError::DanglingBond { pos });
        }
        if let Some(open) = self.branches.last() {
            return Err(SmilesError::UnbalancedBranch { pos: open.pos });
        }
        if let Some((&label, open)) = self.rings.iter().next() {
            return Err(SmilesError::UnclosedRing { label, pos: open.pos });
        }
        if self.atoms.is_empty() {
            return Err(SmilesError::Empty);
        }
        if self.prev.is_none() {
            // trailing '.'
            return Err(SmilesError::UnexpectedChar { ch: '.', pos: self.chars.len() - 1 });
        }

        self.assign_implicit_hydrogens()?;

        let atom_pos = std::mem::take(&mut self.atom_pos);
        let mut mol = Molecule::new(self.atoms, self.bonds);

        let rings = ring::RingInfo::perceive(&mol);
        for (i, atom) in mol.atoms.iter().enumerate() {
            if atom.aromatic && !rings.atom_in_ring(i) {
                return Err(SmilesError::AromaticOutsideRing { pos: atom_pos[i] });
            }
        }
        ring::perceive_aromaticity(&mut mol, &rings);
        Ok(mol)
    }

    // ── Tokens ────────────────────────────────────────────────────────────────

    fn bond_symbol(&mut self, ch: char) -> Result<(), SmilesError> {
        if self.prev.is_none() || self.pending.is_some() {
            return Err(self.unexpected());
        }
        let order = match ch {
            '=' => BondOrder::Double,
            '#' => BondOrder::Triple,
            '$' => BondOrder::Quadruple,
            ':' => BondOrder::Aromatic,
            // '-' plus the cis/trans markers '/' and '\'
            _ => BondOrder::Single,
        };
        self.pending = Some((order, self.pos));
        self.pos += 1;
        Ok(())
    }

    fn ring_closure(&mut self) -> Result<(), SmilesError> {
        let start = self.pos;
        let label = if self.peek() == Some('%') {
            let tens = self.peek_at(1).and_then(|c| c.to_digit(10));
            let ones = self.peek_at(2).and_then(|c| c.to_digit(10));
            match (tens, ones) {
                (Some(t), Some(o)) => {
                    self.pos += 3;
                    (t * 10 + o) as u16
                }
                _ => return Err(self.unexpected()),
            }
        } else {
            let digit = self.peek().and_then(|c| c.to_digit(10)).ok_or_else(|| self.unexpected())?;
            self.pos += 1;
            digit as u16
        };

        let current = self.prev.ok_or(SmilesError::UnexpectedChar {
            ch: self.chars[start],
            pos: start,
        })?;
        let bond_here = self.pending.take().map(|(order, _)| order);

        match self.rings.remove(&label) {
            None => {
                self.rings.insert(label, RingOpening { atom: current, order: bond_here, pos: start });
            }
            Some(open) => {
                if open.atom == current {
                    return Err(SmilesError::InvalidRingClosure { label, pos: start, reason: "ring closes on itself" });
                }
                if self.bonds.iter().any(|b| {
                    (b.a == open.atom && b.b == current) || (b.a == current && b.b == open.atom)
                }) {
                    return Err(SmilesError::InvalidRingClosure { label, pos: start, reason: "atoms already bonded" });
                }
                let order = match (open.order, bond_here) {
                    (Some(a), Some(b)) if a != b => {
                        return Err(SmilesError::InvalidRingClosure { label, pos: start, reason: "conflicting bond orders" });
                    }
                    (Some(a), _) => a,
                    (None, Some(b)) => b,
                    (None, None) => self.default_order(open.atom, current),
                };
                self.bonds.push(Bond { a: open.atom, b: current, order });
            }
        }
        Ok(())
    }

    fn default_order(&self, a: usize, b: usize) -> BondOrder {
        if self.atoms[a].aromatic && self.atoms[b].aromatic {
            BondOrder::Aromatic
        } else {
            BondOrder::Single
        }
    }

    fn push_atom(&mut self, atom: Atom, pos: usize, implicit_h: bool) -> Result<(), SmilesError> {
        let idx = self.atoms.len();
        self.atoms.push(atom);
        self.atom_pos.push(pos);
        self.implicit_h.push(implicit_h);

        if let Some(prev) = self.prev {
            let order = match self.pending.take() {
                Some((order, _)) => order,
                None => self.default_order(prev, idx),
            };
            self.bonds.push(Bond { a: prev, b: idx, order });
        } else if let Some((_, pos)) = self.pending {
            return Err(SmilesError::DanglingBond { pos });
        }
        self.prev = Some(idx);
        Ok(())
    }

    fn organic_atom(&mut self) -> Result<Atom, SmilesError> {
        let start = self.pos;
        let first = self.peek().ok_or(SmilesError::Empty)?;
        let (symbol, aromatic, len): (String, bool, usize) = match (first, self.peek_at(1)) {
            ('C', Some('l')) => ("Cl".into(), false, 2),
            ('B', Some('r')) => ("Br".into(), false, 2),
            ('B' | 'C' | 'N' | 'O' | 'P' | 'S' | 'F' | 'I', _) => (first.to_string(), false, 1),
            ('b' | 'c' | 'n' | 'o' | 'p' | 's', _) => (first.to_string(), true, 1),
            _ if first.is_ascii_alphabetic() || first == '*' => {
                return Err(SmilesError::UnknownElement { symbol: first.to_string(), pos: start });
            }
            _ => return Err(self.unexpected()),
        };
        self.pos += len;

        let element = if aromatic {
            element::aromatic_symbol(&symbol)
        } else {
            element::by_symbol(&symbol)
        }
        .ok_or(SmilesError::UnknownElement { symbol, pos: start })?;

        Ok(Atom { element, aromatic, charge: 0, isotope: None, hydrogens: 0 })
    }

    fn bracket_atom(&mut self) -> Result<Atom, SmilesError> {
        let start = self.pos;
        let close = self.chars[start..]
            .iter()
            .position(|&c| c == ']')
            .map(|offset| start + offset)
            .ok_or(SmilesError::UnterminatedBracket { pos: start })?;
        let body = &self.chars[start + 1..close];
        self.pos = close + 1;

        let invalid = |reason| SmilesError::InvalidBracket { pos: start, reason };
        let mut i = 0;

        // isotope
        let mut isotope: Option<u16> = None;
        while let Some(d) = body.get(i).and_then(|c| c.to_digit(10)) {
            let value = isotope.unwrap_or(0) as u32 * 10 + d;
            if value > 999 {
                return Err(invalid("isotope out of range"));
            }
            isotope = Some(value as u16);
            i += 1;
        }

        // element symbol
        let (element, aromatic, len) = bracket_element(&body[i..]).ok_or_else(|| {
            let symbol: String = body[i..].iter().take_while(|c| c.is_ascii_alphabetic()).collect();
            if symbol.is_empty() {
                invalid("missing element symbol")
            } else {
                SmilesError::UnknownElement { symbol, pos: start + 1 + i }
            }
        })?;
        i += len;

        // chirality: @, @@, or @TH1-style classes
        if body.get(i) == Some(&'@') {
            i += 1;
            if body.get(i) == Some(&'@') {
                i += 1;
            }
            while body.get(i).map_or(false, |c| c.is_ascii_uppercase() && *c != 'H') {
                i += 1;
            }
            while body.get(i).map_or(false, |c| c.is_ascii_digit()) {
                i += 1;
            }
        }

        // hydrogen count
        let mut hydrogens = 0u8;
        if body.get(i) == Some(&'H') {
            i += 1;
            hydrogens = 1;
            if let Some(d) = body.get(i).and_then(|c| c.to_digit(10)) {
                hydrogens = d as u8;
                i += 1;
            }
        }

        // charge
        let mut charge: i32 = 0;
        if let Some(&sign_char) = body.get(i).filter(|c| **c == '+' || **c == '-') {
            let sign = if sign_char == '+' { 1 } else { -1 };
            i += 1;
            let mut magnitude = 1;
            if let Some(d) = body.get(i).and_then(|c| c.to_digit(10)) {
                magnitude = d as i32;
                i += 1;
                if let Some(d2) = body.get(i).and_then(|c| c.to_digit(10)) {
                    magnitude = magnitude * 10 + d2 as i32;
                    i += 1;
                }
            } else {
                while body.get(i) == Some(&sign_char) {
                    magnitude += 1;
                    i += 1;
                }
            }
            charge = sign * magnitude;
            if charge.abs() > 15 {
                return Err(invalid("charge out of range"));
            }
        }

        // atom class
        if body.get(i) == Some(&':') {
            i += 1;
            let digits = body[i..].iter().take_while(|c| c.is_ascii_digit()).count();
            if digits == 0 {
                return Err(invalid("atom class without digits"));
            }
            i += digits;
        }

        if i != body.len() {
            return Err(invalid("unexpected trailing characters"));
        }

        Ok(Atom { element, aromatic, charge: charge as i8, isotope, hydrogens })
    }

    // ── Hydrogens ─────────────────────────────────────────────────────────────

    fn assign_implicit_hydrogens(&mut self) -> Result<(), SmilesError> {
        let mut bond_sum = vec![0u8; self.atoms.len()];
        for bond in &self.bonds {
            let v = bond.order.valence();
            bond_sum[bond.a] = bond_sum[bond.a].saturating_add(v);
            bond_sum[bond.b] = bond_sum[bond.b].saturating_add(v);
        }

        for (i, atom) in self.atoms.iter_mut().enumerate() {
            if !self.implicit_h[i] {
                continue;
            }
            let valences = atom.element.valences;
            let Some(&lowest) = valences.first() else {
                continue;
            };
            if atom.aromatic {
                // one valence unit goes to the shared pi system
                let used = bond_sum[i].saturating_add(1);
                atom.hydrogens = lowest.saturating_sub(used);
                continue;
            }
            let used = bond_sum[i];
            match valences.iter().find(|&&v| v >= used) {
                Some(&v) => atom.hydrogens = v - used,
                None => return Err(SmilesError::ValenceExceeded { pos: self.atom_pos[i] }),
            }
        }
        Ok(())
    }
}

/// Match the element symbol at the start of a bracket body.
/// Two-letter symbols win over one-letter ones.
fn bracket_element(body: &[char]) -> Option<(&'static Element, bool, usize)> {
    let first = *body.first()?;
    let second = body.get(1).copied();

    if first.is_ascii_uppercase() {
        if let Some(s) = second.filter(|c| c.is_ascii_lowercase()) {
            let two: String = [first, s].iter().collect();
            if let Some(e) = element::by_symbol(&two) {
                return Some((e, false, 2));
            }
        }
        return element::by_symbol(&first.to_string()).map(|e| (e, false, 1));
    }

    if first.is_ascii_lowercase() {
        if let Some(s) = second.filter(|c| c.is_ascii_lowercase()) {
            let two: String = [first, s].iter().collect();
            if let Some(e) = element::aromatic_symbol(&two) {
                return Some((e, true, 2));
            }
        }
        return element::aromatic_symbol(&first.to_string()).map(|e| (e, true, 1));
    }

    None
}
