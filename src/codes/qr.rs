//! QR code fragments.
//!
//! Uses the qrcode crate for encoding. The module matrix (plus a two-module
//! quiet border) is drawn as a single path, scaled uniformly to fit the
//! element box and centred inside it.

use qrcode::{Color, EcLevel, QrCode};

use super::{CodeError, Fragment, FragmentKind, check_box};
use crate::template::ErrorCorrection;
use crate::units::fmt_num;

/// Quiet border around the matrix, in modules.
pub const QUIET_ZONE: usize = 2;

fn ec_level(level: ErrorCorrection) -> EcLevel {
    match level {
        ErrorCorrection::L => EcLevel::L,
        ErrorCorrection::M => EcLevel::M,
        ErrorCorrection::Q => EcLevel::Q,
        ErrorCorrection::H => EcLevel::H,
    }
}

/// Encode `data` as a QR fragment filling a `width` x `height` pixel box.
pub fn encode_qr(
    data: &str,
    width: f64,
    height: f64,
    level: ErrorCorrection,
) -> Result<Fragment, CodeError> {
    if data.is_empty() {
        return Err(CodeError::EmptyData);
    }
    check_box(width, height)?;

    let code = QrCode::with_error_correction_level(data.as_bytes(), ec_level(level))
        .map_err(|e| CodeError::Qr(e.to_string()))?;

    let modules = code.width();
    let total = modules + 2 * QUIET_ZONE;
    let side = width.min(height);
    let scale = side / total as f64;
    let offset_x = (width - side) / 2.0;
    let offset_y = (height - side) / 2.0;

    // One subpath per dark module, in module units.
    let colors = code.to_colors();
    let mut path = String::with_capacity(colors.len() * 4);
    for (index, color) in colors.iter().enumerate() {
        if *color == Color::Dark {
            let x = index % modules + QUIET_ZONE;
            let y = index / modules + QUIET_ZONE;
            path.push_str(&format!("M{} {}h1v1h-1z", x, y));
        }
    }

    let body = format!(
        concat!(
            r#"<g class="qr" transform="translate({ox} {oy}) scale({s})" shape-rendering="crispEdges">"#,
            r#"<rect x="0" y="0" width="{n}" height="{n}" fill="white"/>"#,
            r#"<path d="{d}" fill="black"/>"#,
            "</g>"
        ),
        ox = fmt_num(offset_x),
        oy = fmt_num(offset_y),
        s = scale,
        n = total,
        d = path,
    );

    Ok(Fragment {
        kind: FragmentKind::Qr,
        width,
        height,
        body,
    })
}

/// Like [`encode_qr`], but never fails: errors become a "QR Error" box.
pub fn generate_qr(data: &str, width: f64, height: f64, level: ErrorCorrection) -> Fragment {
    match encode_qr(data, width, height, level) {
        Ok(fragment) => fragment,
        Err(e) => {
            tracing::warn!(error = %e, data_len = data.len(), "QR generation failed, using placeholder");
            Fragment::error("QR Error", width, height)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qr_encoding() {
        let fragment = encode_qr("AB12CD34EF56", 100.0, 100.0, ErrorCorrection::M).unwrap();
        assert_eq!(fragment.kind, FragmentKind::Qr);
        assert!(fragment.body.contains("<path d=\"M"));
        // Version 1 is 21 modules wide, plus the quiet border on both sides.
        assert!(fragment.body.contains(r#"width="25""#));
    }

    #[test]
    fn test_qr_is_square_and_centred() {
        let fragment = encode_qr("hello", 200.0, 100.0, ErrorCorrection::L).unwrap();
        assert_eq!(fragment.width, 200.0);
        assert!(fragment.body.contains("translate(50 0)"));
    }

    #[test]
    fn test_qr_is_deterministic() {
        let a = encode_qr("same", 80.0, 80.0, ErrorCorrection::Q).unwrap();
        let b = encode_qr("same", 80.0, 80.0, ErrorCorrection::Q).unwrap();
        assert_eq!(a, b);

        let c = encode_qr("different", 80.0, 80.0, ErrorCorrection::Q).unwrap();
        assert_ne!(a.body, c.body);
    }

    #[test]
    fn test_error_level_changes_matrix() {
        let low = encode_qr("https://example.com/item/42", 80.0, 80.0, ErrorCorrection::L).unwrap();
        let high = encode_qr("https://example.com/item/42", 80.0, 80.0, ErrorCorrection::H).unwrap();
        assert_ne!(low.body, high.body);
    }

    #[test]
    fn test_empty_data_is_error() {
        assert!(matches!(
            encode_qr("", 50.0, 50.0, ErrorCorrection::M),
            Err(CodeError::EmptyData)
        ));
        assert!(generate_qr("", 50.0, 50.0, ErrorCorrection::M).is_error());
    }

    #[test]
    fn test_oversized_data_falls_back() {
        let data = "X".repeat(5000);
        assert!(matches!(
            encode_qr(&data, 50.0, 50.0, ErrorCorrection::H),
            Err(CodeError::Qr(_))
        ));

        let fragment = generate_qr(&data, 50.0, 40.0, ErrorCorrection::H);
        assert!(fragment.is_error());
        assert!(fragment.body.contains("QR Error"));
        assert_eq!((fragment.width, fragment.height), (50.0, 40.0));
    }
}
