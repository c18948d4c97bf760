//! Periodic table subset used by the parser and descriptor code.

/// Static element data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Element {
    pub number: u8,
    pub symbol: &'static str,
    /// Standard atomic weight (IUPAC, conventional value).
    pub weight: f64,
    /// Allowed valences for implicit-hydrogen assignment, ascending.
    /// Empty for elements that never take implicit hydrogens.
    pub valences: &'static [u8],
}

pub const HYDROGEN_WEIGHT: f64 = 1.008;

const ELEMENTS: &[Element] = &[
    Element { number: 1, symbol: "H", weight: 1.008, valences: &[1] },
    Element { number: 2, symbol: "He", weight: 4.0026, valences: &[] },
    Element { number: 3, symbol: "Li", weight: 6.94, valences: &[] },
    Element { number: 4, symbol: "Be", weight: 9.0122, valences: &[] },
    Element { number: 5, symbol: "B", weight: 10.81, valences: &[3] },
    Element { number: 6, symbol: "C", weight: 12.011, valences: &[4] },
    Element { number: 7, symbol: "N", weight: 14.007, valences: &[3, 5] },
    Element { number: 8, symbol: "O", weight: 15.999, valences: &[2] },
    Element { number: 9, symbol: "F", weight: 18.998, valences: &[1] },
    Element { number: 10, symbol: "Ne", weight: 20.180, valences: &[] },
    Element { number: 11, symbol: "Na", weight: 22.990, valences: &[] },
    Element { number: 12, symbol: "Mg", weight: 24.305, valences: &[] },
    Element { number: 13, symbol: "Al", weight: 26.982, valences: &[] },
    Element { number: 14, symbol: "Si", weight: 28.085, valences: &[4] },
    Element { number: 15, symbol: "P", weight: 30.974, valences: &[3, 5] },
    Element { number: 16, symbol: "S", weight: 32.06, valences: &[2, 4, 6] },
    Element { number: 17, symbol: "Cl", weight: 35.45, valences: &[1] },
    Element { number: 18, symbol: "Ar", weight: 39.948, valences: &[] },
    Element { number: 19, symbol: "K", weight: 39.098, valences: &[] },
    Element { number: 20, symbol: "Ca", weight: 40.078, valences: &[] },
    Element { number: 25, symbol: "Mn", weight: 54.938, valences: &[] },
    Element { number: 26, symbol: "Fe", weight: 55.845, valences: &[] },
    Element { number: 27, symbol: "Co", weight: 58.933, valences: &[] },
    Element { number: 28, symbol: "Ni", weight: 58.693, valences: &[] },
    Element { number: 29, symbol: "Cu", weight: 63.546, valences: &[] },
    Element { number: 30, symbol: "Zn", weight: 65.38, valences: &[] },
    Element { number: 32, symbol: "Ge", weight: 72.630, valences: &[4] },
    Element { number: 33, symbol: "As", weight: 74.922, valences: &[3, 5] },
    Element { number: 34, symbol: "Se", weight: 78.971, valences: &[2, 4, 6] },
    Element { number: 35, symbol: "Br", weight: 79.904, valences: &[1] },
    Element { number: 36, symbol: "Kr", weight: 83.798, valences: &[] },
    Element { number: 37, symbol: "Rb", weight: 85.468, valences: &[] },
    Element { number: 38, symbol: "Sr", weight: 87.62, valences: &[] },
    Element { number: 47, symbol: "Ag", weight: 107.87, valences: &[] },
    Element { number: 50, symbol: "Sn", weight: 118.71, valences: &[] },
    Element { number: 51, symbol: "Sb", weight: 121.76, valences: &[] },
    Element { number: 52, symbol: "Te", weight: 127.60, valences: &[2, 4, 6] },
    Element { number: 53, symbol: "I", weight: 126.90, valences: &[1] },
    Element { number: 54, symbol: "Xe", weight: 131.29, valences: &[] },
    Element { number: 55, symbol: "Cs", weight: 132.91, valences: &[] },
    Element { number: 56, symbol: "Ba", weight: 137.33, valences: &[] },
    Element { number: 64, symbol: "Gd", weight: 157.25, valences: &[] },
    Element { number: 78, symbol: "Pt", weight: 195.08, valences: &[] },
    Element { number: 79, symbol: "Au", weight: 196.97, valences: &[] },
    Element { number: 80, symbol: "Hg", weight: 200.59, valences: &[] },
    Element { number: 83, symbol: "Bi", weight: 208.98, valences: &[] },
];

/// Look up an element by its case-sensitive symbol (`"Cl"`, not `"CL"`).
pub fn by_symbol(symbol: &str) -> Option<&'static Element> {
    ELEMENTS.iter().find(|e| e.symbol == symbol)
}

pub fn by_number(number: u8) -> Option<&'static Element> {
    ELEMENTS.iter().find(|e| e.number == number)
}

/// Elements allowed to be written aromatic (lowercase) in SMILES.
pub fn aromatic_symbol(symbol: &str) -> Option<&'static Element> {
    match symbol {
        "b" => by_symbol("B"),
        "c" => by_symbol("C"),
        "n" => by_symbol("N"),
        "o" => by_symbol("O"),
        "p" => by_symbol("P"),
        "s" => by_symbol("S"),
        "se" => by_symbol("Se"),
        "as" => by_symbol("As"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_sensitive() {
        assert_eq!(by_symbol("Cl").map(|e| e.number), Some(17));
        assert!(by_symbol("CL").is_none());
        assert_eq!(by_number(8).map(|e| e.symbol), Some("O"));
    }

    #[test]
    fn aromatic_forms() {
        assert_eq!(aromatic_symbol("c").map(|e| e.number), Some(6));
        assert_eq!(aromatic_symbol("se").map(|e| e.number), Some(34));
        assert!(aromatic_symbol("f").is_none());
    }
}
