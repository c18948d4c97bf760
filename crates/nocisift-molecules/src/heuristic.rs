//! Character-scan descriptor estimates.
//!
//! No molecular graph is built. The notation is checked against the SMILES
//! alphabet and bracket/branch/ring balance, then descriptors are estimated
//! from atom tokens and their immediate neighbours in the string. Results are
//! always tagged [`InterpreterMode::Heuristic`].

use nocisift_common::{DescriptorBundle, InterpreterMode};

use crate::element::{self, Element, HYDROGEN_WEIGHT};
use crate::smiles::SmilesError;

#[derive(Debug)]
struct Token {
    element: &'static Element,
    aromatic: bool,
    /// Declared H count for bracket atoms; `None` for organic-subset atoms.
    bracket_h: Option<u8>,
    charge: i8,
    /// Bond symbol written directly before the atom, if any.
    bond_before: Option<u8>,
    /// Byte following the token.
    next: Option<u8>,
    /// Byte preceding the token (after any bond symbol).
    prev: Option<u8>,
}

impl Token {
    fn number(&self) -> u8 {
        self.element.number
    }

    fn is_terminal(&self) -> bool {
        matches!(self.next, None | Some(b')') | Some(b'.'))
    }

    fn opens_branch(&self) -> bool {
        self.next == Some(b'(')
    }

    fn carries_ring_digit(&self) -> bool {
        matches!(self.next, Some(b'0'..=b'9') | Some(b'%'))
    }

    fn likely_has_h(&self) -> bool {
        match self.bracket_h {
            Some(h) => h > 0,
            None => {
                !self.aromatic
                    && matches!(self.number(), 7 | 8)
                    && !matches!(self.bond_before, Some(b'=') | Some(b'#'))
                    && !self.opens_branch()
                    && !(self.number() == 8 && !self.is_terminal() && self.prev != Some(b'('))
            }
        }
    }
}

#[derive(Debug, Default)]
struct Scan {
    tokens: Vec<Token>,
    doubles: u32,
    triples: u32,
    ring_closures: u32,
    branches: u32,
    fragments: u32,
}

/// Estimate descriptors by scanning the notation. Fails on characters outside
/// the SMILES alphabet, unknown element symbols and unbalanced syntax.
pub fn estimate(notation: &str) -> Result<DescriptorBundle, SmilesError> {
    let scan = scan(notation)?;
    let tokens = &scan.tokens;

    let heavy_weight: f64 = tokens.iter().map(|t| t.element.weight).sum();
    let hydrogens = estimate_hydrogens(&scan);
    let hbd = tokens.iter().filter(|t| t.likely_has_h()).count() as u32;
    let hba = tokens.iter().filter(|t| matches!(t.number(), 7 | 8)).count() as u32;
    let tpsa = tokens.iter().map(polar_estimate).sum();
    let logp = tokens.iter().map(logp_estimate).sum::<f64>();

    let aliphatic_chain = tokens
        .iter()
        .filter(|t| !t.aromatic && !t.carries_ring_digit() && t.bracket_h.is_none())
        .count() as u32;
    let rotatable_bonds = aliphatic_chain.saturating_sub(scan.branches + 2 * scan.fragments);

    let aromatic_atoms = tokens.iter().filter(|t| t.aromatic).count() as u32;

    Ok(DescriptorBundle {
        molecular_weight: heavy_weight + hydrogens as f64 * HYDROGEN_WEIGHT,
        logp,
        hbd,
        hba,
        tpsa,
        rotatable_bonds,
        aromatic_rings: (aromatic_atoms + 5) / 6,
        mode: InterpreterMode::Heuristic,
    })
}

/// Valence pool minus bond ends: sum of default valences (aromatic atoms one
/// less) minus two per bond, with bonds counted from the token tree.
fn estimate_hydrogens(scan: &Scan) -> u32 {
    let mut pool: i64 = 0;
    let mut declared: i64 = 0;
    let mut bracket_ends: i64 = 0;
    for t in &scan.tokens {
        match t.bracket_h {
            Some(h) => {
                declared += h as i64;
                // bracket atoms sit outside the pool but still take bond ends
                bracket_ends += matches!(t.prev, Some(p) if p != b'.') as i64;
                bracket_ends += !t.is_terminal() as i64;
            }
            None => {
                let valence = t.element.valences.first().copied().unwrap_or(0) as i64;
                pool += if t.aromatic { valence - 1 } else { valence };
            }
        }
    }
    let tree_bonds = scan.tokens.len() as i64 - scan.fragments as i64;
    let bond_ends = 2 * (tree_bonds + scan.ring_closures as i64 + scan.doubles as i64)
        + 4 * scan.triples as i64;
    (pool - bond_ends + bracket_ends).max(0) as u32 + declared.max(0) as u32
}

fn polar_estimate(t: &Token) -> f64 {
    match (t.number(), t.aromatic) {
        (7, true) if t.bracket_h.unwrap_or(0) > 0 => 15.79,
        (7, true) => 12.89,
        (8, true) => 13.14,
        (7, false) => match t.bond_before {
            Some(b'#') => 23.79,
            Some(b'=') => 12.36,
            _ if t.likely_has_h() && t.is_terminal() => 26.02,
            _ if t.likely_has_h() => 12.03,
            _ => 3.24,
        },
        (8, false) if t.charge < 0 => 23.06,
        (8, false) if t.bond_before == Some(b'=') => 17.07,
        (8, false) if t.likely_has_h() => 20.23,
        (8, false) => 9.23,
        _ => 0.0,
    }
}

fn logp_estimate(t: &Token) -> f64 {
    match (t.number(), t.aromatic) {
        (6, true) => 0.33,
        (6, false) => 0.36,
        (7, true) => -0.32,
        (7, false) => -0.80,
        (8, true) => -0.30,
        (8, false) => -0.45,
        (9, _) => 0.41,
        (16, _) => 0.60,
        (17, _) => 0.69,
        (35, _) => 0.88,
        (53, _) => 1.05,
        _ => 0.0,
    }
}

fn scan(notation: &str) -> Result<Scan, SmilesError> {
    let s = notation.trim().as_bytes();
    if s.is_empty() {
        return Err(SmilesError::Empty);
    }

    let mut out = Scan { fragments: 1, ..Scan::default() };
    let mut depth = 0usize;
    let mut open_rings = [false; 100];
    let mut bond: Option<u8> = None;
    let mut prev: Option<u8> = None;
    let mut i = 0;

    while i < s.len() {
        let c = s[i];
        let start = i;
        let token = match c {
            b'(' => {
                depth += 1;
                out.branches += 1;
                prev = Some(c);
                i += 1;
                continue;
            }
            b')' => {
                depth = depth.checked_sub(1).ok_or(SmilesError::UnbalancedBranch { pos: i })?;
                prev = Some(c);
                i += 1;
                continue;
            }
            b'=' | b'#' | b'$' | b'-' | b':' | b'/' | b'\\' => {
                match c {
                    b'=' => out.doubles += 1,
                    b'#' => out.triples += 1,
                    b'$' => out.doubles += 3,
                    _ => {}
                }
                bond = Some(c);
                i += 1;
                continue;
            }
            b'.' => {
                out.fragments += 1;
                prev = Some(c);
                i += 1;
                continue;
            }
            b'0'..=b'9' | b'%' => {
                let label = if c == b'%' {
                    let digits = s.get(i + 1..i + 3).ok_or(SmilesError::UnexpectedChar { ch: '%', pos: i })?;
                    if !digits.iter().all(u8::is_ascii_digit) {
                        return Err(SmilesError::UnexpectedChar { ch: '%', pos: i });
                    }
                    i += 3;
                    ((digits[0] - b'0') * 10 + (digits[1] - b'0')) as usize
                } else {
                    i += 1;
                    (c - b'0') as usize
                };
                if open_rings[label] {
                    out.ring_closures += 1;
                }
                open_rings[label] = !open_rings[label];
                bond = None;
                continue;
            }
            b'[' => {
                let close = s[i..]
                    .iter()
                    .position(|&b| b == b']')
                    .map(|p| i + p)
                    .ok_or(SmilesError::UnterminatedBracket { pos: i })?;
                let token = bracket_token(&s[i + 1..close], i)?;
                i = close + 1;
                token
            }
            b'B' if s.get(i + 1) == Some(&b'r') => {
                i += 2;
                organic_token("Br", false, start)?
            }
            b'C' if s.get(i + 1) == Some(&b'l') => {
                i += 2;
                organic_token("Cl", false, start)?
            }
            b'B' | b'C' | b'N' | b'O' | b'P' | b'S' | b'F' | b'I' => {
                i += 1;
                organic_token(&(c as char).to_string(), false, start)?
            }
            b'b' | b'c' | b'n' | b'o' | b'p' | b's' => {
                i += 1;
                organic_token(&(c as char).to_string(), true, start)?
            }
            _ => {
                let ch = notation.trim()[start..].chars().next().unwrap_or('?');
                return Err(SmilesError::UnexpectedChar { ch, pos: start });
            }
        };

        out.tokens.push(Token {
            bond_before: bond.take(),
            next: s.get(i).copied(),
            prev,
            ..token
        });
        prev = Some(c);
    }

    if bond.is_some() {
        return Err(SmilesError::DanglingBond { pos: s.len() - 1 });
    }
    if depth != 0 {
        return Err(SmilesError::UnbalancedBranch { pos: s.len() });
    }
    if let Some(label) = open_rings.iter().position(|&open| open) {
        return Err(SmilesError::UnclosedRing { label: label as u16, pos: s.len() });
    }
    if out.tokens.is_empty() {
        return Err(SmilesError::Empty);
    }
    Ok(out)
}

fn organic_token(symbol: &str, aromatic: bool, pos: usize) -> Result<Token, SmilesError> {
    let element = if aromatic {
        element::aromatic_symbol(symbol)
    } else {
        element::by_symbol(symbol)
    }
    .ok_or_else(|| SmilesError::UnknownElement { symbol: symbol.to_string(), pos })?;
    Ok(Token {
        element,
        aromatic,
        bracket_h: None,
        charge: 0,
        bond_before: None,
        next: None,
        prev: None,
    })
}

/// Loose bracket reading: isotope digits, symbol, then H count and charge
/// anywhere in the remainder.
fn bracket_token(body: &[u8], pos: usize) -> Result<Token, SmilesError> {
    let mut i = 0;
    while i < body.len() && body[i].is_ascii_digit() {
        i += 1;
    }
    let rest = &body[i..];
    let symbol_len = match rest {
        [a, b, ..] if a.is_ascii_uppercase() && b.is_ascii_lowercase() => {
            let two = std::str::from_utf8(&rest[..2]).unwrap_or("");
            if element::by_symbol(two).is_some() { 2 } else { 1 }
        }
        [a, b, ..] if a.is_ascii_lowercase() && b.is_ascii_lowercase() => {
            let two = std::str::from_utf8(&rest[..2]).unwrap_or("");
            if element::aromatic_symbol(two).is_some() { 2 } else { 1 }
        }
        [_, ..] => 1,
        [] => return Err(SmilesError::InvalidBracket { pos, reason: "missing element symbol" }),
    };
    let symbol = std::str::from_utf8(&rest[..symbol_len]).unwrap_or("");
    let aromatic = symbol.starts_with(|c: char| c.is_ascii_lowercase());

    let mut token = organic_token(symbol, aromatic, pos)?;
    let tail = &rest[symbol_len..];

    let mut h = 0u8;
    let mut charge = 0i8;
    let mut j = 0;
    while j < tail.len() {
        match tail[j] {
            b'H' => {
                let count = tail.get(j + 1).filter(|b| b.is_ascii_digit()).map(|b| b - b'0');
                h = count.unwrap_or(1);
                j += if count.is_some() { 2 } else { 1 };
            }
            sign @ (b'+' | b'-') => {
                let unit = if sign == b'+' { 1 } else { -1 };
                match tail.get(j + 1).filter(|b| b.is_ascii_digit()) {
                    Some(d) => {
                        charge += unit * (d - b'0') as i8;
                        j += 2;
                    }
                    None => {
                        charge += unit;
                        j += 1;
                    }
                }
            }
            b'@' | b':' | b'0'..=b'9' => j += 1,
            other => {
                return Err(SmilesError::UnexpectedChar { ch: other as char, pos: pos + 1 + i + symbol_len + j })
            }
        }
    }
    token.bracket_h = Some(h);
    token.charge = charge;
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acetaminophen_estimate_is_close() {
        let d = estimate("CC(=O)Nc1ccc(O)cc1").unwrap();
        assert_eq!(d.mode, InterpreterMode::Heuristic);
        assert!((d.molecular_weight - 151.165).abs() < 0.01, "mw={}", d.molecular_weight);
        assert_eq!(d.hbd, 2);
        assert_eq!(d.hba, 3);
        assert!((d.tpsa - 49.33).abs() < 0.01, "tpsa={}", d.tpsa);
        assert_eq!(d.aromatic_rings, 1);
        assert_eq!(d.rotatable_bonds, 1);
    }

    #[test]
    fn rejects_characters_outside_alphabet() {
        let err = estimate("NOT_A_SMILES_!!!!").unwrap_err();
        assert!(matches!(err, SmilesError::UnexpectedChar { .. }));
        assert!(estimate("").is_err());
        assert!(estimate("C1CC").is_err());
        assert!(estimate("C(C").is_err());
        assert!(estimate("[Xx]").is_err());
        assert!(estimate("[NH4+").is_err());
    }

    #[test]
    fn bracket_without_element_is_rejected() {
        assert!(matches!(estimate("C[]C"), Err(SmilesError::InvalidBracket { pos: 1, .. })));
        assert!(matches!(estimate("[13]"), Err(SmilesError::InvalidBracket { .. })));
    }

    #[test]
    fn bracket_atoms_and_fragments() {
        let d = estimate("[Na+].[Cl-]").unwrap();
        assert_eq!(d.hba, 0);
        assert!((d.molecular_weight - 58.44).abs() < 0.01);
    }

    #[test]
    fn fused_aromatics_count_rings() {
        assert_eq!(estimate("c1ccc2ccccc2c1").unwrap().aromatic_rings, 2);
        assert_eq!(estimate("c1cc[nH]c1").unwrap().aromatic_rings, 1);
    }
}
