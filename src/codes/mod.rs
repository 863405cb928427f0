//! # Code Generators
//!
//! Turn a resolved data string into a scannable vector fragment.
//!
//! ## Fragments
//!
//! A [`Fragment`] is SVG markup drawn in a local coordinate space whose
//! origin is the top-left corner of the element box. The renderer places it
//! with a single `translate`, and the editor preview wraps it into a
//! standalone `<svg>` with [`Fragment::to_svg`].
//!
//! ## Failure
//!
//! Encoders return `Result<Fragment, CodeError>`. The public `generate_*`
//! functions, and the renderer, turn an error into [`Fragment::error`]: a
//! light-grey box with a red outline and a "QR Error" / "Barcode Error"
//! caption, sized to the element box.

pub mod barcode;
pub mod qr;
mod upce;

use thiserror::Error;

use crate::units::fmt_num;

pub use barcode::{encode_barcode, generate_barcode, select_format};
pub use qr::{encode_qr, generate_qr};

/// Errors raised while encoding a single code element.
#[derive(Debug, Error)]
pub enum CodeError {
    #[error("QR encoding failed: {0}")]
    Qr(String),

    #[error("{format} encoding failed: {reason}")]
    Barcode { format: String, reason: String },

    #[error("nothing to encode")]
    EmptyData,

    #[error("element box {width}x{height}px is too small")]
    EmptyBox { width: f64, height: f64 },
}

/// Which generator produced a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    Qr,
    Barcode(crate::template::BarcodeFormat),
    Error,
}

/// SVG markup for one element, drawn from `(0, 0)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub kind: FragmentKind,
    pub width: f64,
    pub height: f64,
    pub body: String,
}

impl Fragment {
    /// Placeholder shown instead of a code that could not be encoded.
    pub fn error(caption: &str, width: f64, height: f64) -> Self {
        let width = width.max(1.0);
        let height = height.max(1.0);
        let font_size = (height / 2.0).clamp(4.0, 12.0);
        let body = format!(
            concat!(
                r#"<g class="code-error">"#,
                r#"<rect x="0" y="0" width="{w}" height="{h}" fill="lightgray" stroke="red" stroke-width="1"/>"#,
                r#"<text x="{cx}" y="{cy}" font-size="{fs}" font-family="sans-serif" "#,
                r#"text-anchor="middle" dominant-baseline="middle" fill="black">{caption}</text>"#,
                "</g>"
            ),
            w = fmt_num(width),
            h = fmt_num(height),
            cx = fmt_num(width / 2.0),
            cy = fmt_num(height / 2.0),
            fs = fmt_num(font_size),
            caption = caption,
        );
        Self {
            kind: FragmentKind::Error,
            width,
            height,
            body,
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == FragmentKind::Error
    }

    /// Standalone SVG document for the element preview.
    pub fn to_svg(&self) -> String {
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">{body}</svg>"#,
            w = fmt_num(self.width),
            h = fmt_num(self.height),
            body = self.body,
        )
    }
}

pub(crate) fn check_box(width: f64, height: f64) -> Result<(), CodeError> {
    if !(width.is_finite() && height.is_finite()) || width < 1.0 || height < 1.0 {
        return Err(CodeError::EmptyBox { width, height });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_fragment() {
        let fragment = Fragment::error("QR Error", 40.0, 30.0);
        assert!(fragment.is_error());
        assert!(fragment.body.contains("QR Error"));
        assert!(fragment.body.contains(r#"width="40" height="30""#));
        assert!(fragment.body.contains(r#"fill="lightgray""#));
    }

    #[test]
    fn test_error_fragment_degenerate_box() {
        let fragment = Fragment::error("Barcode Error", 0.0, -3.0);
        assert_eq!(fragment.width, 1.0);
        assert_eq!(fragment.height, 1.0);
    }

    #[test]
    fn test_to_svg_wraps_body() {
        let svg = Fragment::error("QR Error", 10.0, 10.0).to_svg();
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains(r#"viewBox="0 0 10 10""#));
    }
}
