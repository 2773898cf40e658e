//! Precision helpers for values shown to users or written to documents.

/// Canonicalize a floating-point value for stable output.
///
/// Rules:
/// - `-0.0` becomes `0.0`
/// - all NaNs become a single canonical NaN
pub fn canonical_f64(v: f64) -> f64 {
    if v == 0.0 {
        // Handles +0.0 and -0.0.
        0.0
    } else if v.is_nan() {
        f64::NAN
    } else {
        v
    }
}

/// Round to a fixed number of decimals (half away from zero).
pub fn round_to(v: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    canonical_f64((v * factor).round() / factor)
}

pub fn round2(v: f64) -> f64 {
    round_to(v, 2)
}
