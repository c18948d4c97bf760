//! SVG depiction cards.
//!
//! Full 2D layout is out of scope; a card shows the molecular formula and
//! notation in a square of the requested pixel size.

use std::fmt::Write;

const MIN_SIZE: u32 = 64;

/// Card for a parsed structure.
pub fn structure_card(formula: &str, notation: &str, size: u32) -> Vec<u8> {
    let size = size.max(MIN_SIZE);
    let title_px = size / 8;
    let body_px = (size / 16).max(8);

    let mut svg = header(size);
    let _ = write!(
        svg,
        r##"<text x="50%" y="45%" text-anchor="middle" font-family="sans-serif" font-size="{title_px}" fill="#1b2a3a">{}</text>"##,
        escape(formula),
    );
    let _ = write!(
        svg,
        r##"<text x="50%" y="65%" text-anchor="middle" font-family="monospace" font-size="{body_px}" fill="#4a5a6a">{}</text>"##,
        escape(&truncate(notation, 48)),
    );
    svg.push_str("</svg>");
    svg.into_bytes()
}

/// Neutral card shown when no depiction is available.
pub fn placeholder_svg(size: u32) -> Vec<u8> {
    let size = size.max(MIN_SIZE);
    let mut svg = header(size);
    let _ = write!(
        svg,
        r##"<text x="50%" y="50%" text-anchor="middle" font-family="sans-serif" font-size="{}" fill="#8a96a3">no structure</text></svg>"##,
        (size / 12).max(8),
    );
    svg.into_bytes()
}

fn header(size: u32) -> String {
    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{size}" height="{size}" viewBox="0 0 {size} {size}"><rect width="100%" height="100%" fill="#f7f9fb" stroke="#c9d3dd"/>"##
    )
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max_chars - 1).collect();
    out.push('…');
    out
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_contains_formula_and_size() {
        let svg = String::from_utf8(structure_card("C8H9NO2", "CC(=O)Nc1ccc(O)cc1", 300)).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("C8H9NO2"));
        assert!(svg.contains(r#"width="300""#));
    }

    #[test]
    fn tiny_sizes_are_clamped() {
        let svg = String::from_utf8(placeholder_svg(1)).unwrap();
        assert!(svg.contains(r#"width="64""#));
    }

    #[test]
    fn long_notation_is_truncated_and_escaped() {
        let long = "C".repeat(200);
        let svg = String::from_utf8(structure_card("C200H402", &long, 200)).unwrap();
        assert!(svg.contains('…'));
        assert_eq!(escape("a<b&c"), "a&lt;b&amp;c");
    }
}
