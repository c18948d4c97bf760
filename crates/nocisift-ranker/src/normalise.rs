//! Descriptor normalisation into penalty terms.

/// Min-max normalisation within a given range [min_val, max_val], clamped.
pub fn minmax_normalise(value: f64, min_val: f64, max_val: f64) -> f64 {
    if (max_val - min_val).abs() < 1e-10 {
        // degenerate band: a step at min_val
        return if value > min_val { 1.0 } else { 0.0 };
    }
    ((value - min_val) / (max_val - min_val)).clamp(0.0, 1.0)
}

/// How far `value` exceeds `ideal_max`, scaled so reaching `saturation`
/// gives 1.0. Values inside the ideal band give 0.0.
/// Monotone non-decreasing in `value`.
pub fn excess(value: f64, ideal_max: f64, saturation: f64) -> f64 {
    if value <= ideal_max {
        return 0.0;
    }
    minmax_normalise(value, ideal_max, saturation)
}
