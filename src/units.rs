//! # Physical Units
//!
//! Every length in a template is authored in millimetres. Two consumers turn
//! those into device units:
//!
//! | Consumer | Unit | Conversion |
//! |----------|------|------------|
//! | Vector renderer (SVG) | CSS pixel, 96 DPI | `mm × 96 / 25.4` |
//! | Print compositor (PDF) | inch / point | `mm / 25.4`, `× 72` |
//!
//! Both paths go through the constants below. The preview shown in a browser
//! and the printed PDF only line up when they share the same constant, so it
//! is deliberately not configurable.
//!
//! ## Example
//!
//! ```
//! use etiqueta::units;
//!
//! let px = units::mm_to_px(25.4);
//! assert!((px - 96.0).abs() < 1e-9);
//! assert!((units::mm_to_in(25.4) - 1.0).abs() < 1e-12);
//! ```

/// Millimetres per inch.
pub const MM_PER_INCH: f64 = 25.4;

/// Rendering resolution of the vector document.
pub const RENDER_DPI: f64 = 96.0;

/// Millimetre to pixel factor (`K`), ≈ 3.7795.
pub const MM_TO_PX: f64 = RENDER_DPI / MM_PER_INCH;

/// PDF user space units per inch.
pub const POINTS_PER_INCH: f64 = 72.0;

/// Smallest accepted template edge, in millimetres.
pub const MIN_CANVAS_MM: f64 = 5.0;

/// Largest accepted template edge, in millimetres.
pub const MAX_CANVAS_MM: f64 = 500.0;

/// Convert millimetres to vector-document pixels.
#[inline]
pub fn mm_to_px(mm: f64) -> f64 {
    mm * MM_TO_PX
}

/// Convert millimetres to inches.
#[inline]
pub fn mm_to_in(mm: f64) -> f64 {
    mm / MM_PER_INCH
}

/// Convert inches back to millimetres.
#[inline]
pub fn in_to_mm(inches: f64) -> f64 {
    inches * MM_PER_INCH
}

/// Convert millimetres to PDF points.
#[inline]
pub fn mm_to_pt(mm: f64) -> f64 {
    mm_to_in(mm) * POINTS_PER_INCH
}

/// Whether a canvas edge length is inside the accepted range.
#[inline]
pub fn canvas_edge_in_bounds(mm: f64) -> bool {
    mm.is_finite() && (MIN_CANVAS_MM..=MAX_CANVAS_MM).contains(&mm)
}

/// Format a coordinate for SVG output: three decimals, trailing zeros trimmed.
pub fn fmt_num(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let s = format!("{:.3}", value);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    match s {
        "" | "-0" => "0".to_string(),
        other => other.to_string(),
    }
}
