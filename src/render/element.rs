//! Single-element preview for the template editor.
//!
//! The editor sends an unsaved element definition with literal content and
//! gets back just the code fragment, without any template or entity context.

use serde::Deserialize;

use crate::codes::{self, Fragment};
use crate::template::{BarcodeFormat, ErrorCorrection};
use crate::units::mm_to_px;

fn default_box_mm() -> f64 {
    10.0
}

/// An in-progress code element from the editor.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementPreview {
    Qr {
        #[serde(default)]
        content: String,
        #[serde(default = "default_box_mm")]
        width_mm: f64,
        #[serde(default = "default_box_mm")]
        height_mm: f64,
        #[serde(default)]
        error_correction: ErrorCorrection,
    },
    Barcode {
        #[serde(default)]
        content: String,
        #[serde(default = "default_box_mm")]
        width_mm: f64,
        #[serde(default = "default_box_mm")]
        height_mm: f64,
        #[serde(default)]
        format: BarcodeFormat,
        #[serde(default)]
        show_label: bool,
    },
}

/// Content shown when the editor has not typed anything yet.
const SAMPLE_CONTENT: &str = "Sample";

fn content_or_sample(content: &str) -> &str {
    if content.is_empty() {
        SAMPLE_CONTENT
    } else {
        content
    }
}

/// Generate the code fragment for an editor element. Content is used as-is,
/// placeholders included; the box is converted with the shared mm→px factor.
pub fn preview_element(element: &ElementPreview) -> Fragment {
    match element {
        ElementPreview::Qr {
            content,
            width_mm,
            height_mm,
            error_correction,
        } => codes::generate_qr(
            content_or_sample(content),
            mm_to_px(*width_mm),
            mm_to_px(*height_mm),
            *error_correction,
        ),
        ElementPreview::Barcode {
            content,
            width_mm,
            height_mm,
            format,
            show_label,
        } => codes::generate_barcode(
            content_or_sample(content),
            *format,
            mm_to_px(*width_mm),
            mm_to_px(*height_mm),
            *show_label,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::FragmentKind;

    #[test]
    fn test_qr_preview_from_json() {
        let json = r#"{"type": "qr", "content": "{ItemUUID}", "width_mm": 12, "height_mm": 12}"#;
        let element: ElementPreview = serde_json::from_str(json).unwrap();
        let fragment = preview_element(&element);
        assert_eq!(fragment.kind, FragmentKind::Qr);
        assert!((fragment.width - mm_to_px(12.0)).abs() < 1e-9);
    }

    #[test]
    fn test_barcode_preview_placeholder_content() {
        let json = r#"{"type": "barcode", "content": "{SKU}", "format": "EAN13", "show_label": true}"#;
        let element: ElementPreview = serde_json::from_str(json).unwrap();
        let fragment = preview_element(&element);
        assert_eq!(fragment.kind, FragmentKind::Barcode(BarcodeFormat::Code128));
        assert!(fragment.body.contains(">{SKU}</text>"));
    }

    #[test]
    fn test_empty_content_uses_sample() {
        let element = ElementPreview::Barcode {
            content: String::new(),
            width_mm: 30.0,
            height_mm: 10.0,
            format: BarcodeFormat::Code128,
            show_label: true,
        };
        assert!(preview_element(&element).body.contains(">Sample</text>"));
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let json = r#"{"type": "text", "content": "x"}"#;
        assert!(serde_json::from_str::<ElementPreview>(json).is_err());
    }
}
