//! 1D barcode fragments.
//!
//! Uses the barcoders crate for Code 39, Code 128 and EAN encoding; UPC-A is
//! drawn as EAN-13 with a leading zero and UPC-E comes from [`super::upce`].
//!
//! ## Format Selection
//!
//! 1. Data that is still a bare `{Token}` always uses CODE128, since the
//!    numeric symbologies would reject the brace text.
//! 2. A numeric-only format (EAN13, EAN8, UPCA, UPCE) with non-digit data
//!    falls back to CODE128.
//! 3. If the chosen encoder still fails, CODE128 is tried once more.
//! 4. If that fails too the caller gets a "Barcode Error" box.
//!
//! EAN/UPC data given without its check digit gets one computed. Data that
//! carries a check digit must carry the right one: a wrong digit is an
//! encoder failure, so step 3 applies and the label prints as CODE128 with
//! the digits exactly as given. It is never silently rewritten into a
//! different EAN.

use barcoders::sym::code39::Code39;
use barcoders::sym::code128::Code128;
use barcoders::sym::ean8::EAN8;
use barcoders::sym::ean13::EAN13;

use super::{CodeError, Fragment, FragmentKind, check_box, upce};
use crate::placeholder::is_placeholder_token;
use crate::template::BarcodeFormat;
use crate::units::fmt_num;

/// Blank modules on each side of the bars.
pub const QUIET_ZONE: usize = 10;

/// Share of the box height used by the human-readable caption.
const LABEL_SHARE: f64 = 0.22;

/// Pick the symbology to encode `data` with.
pub fn select_format(data: &str, requested: BarcodeFormat) -> BarcodeFormat {
    if is_placeholder_token(data) {
        tracing::debug!(data, "unresolved placeholder, using CODE128");
        return BarcodeFormat::Code128;
    }
    if requested.is_numeric_only() && !is_all_digits(data) {
        tracing::debug!(data, format = %requested, "non-digit data, using CODE128");
        return BarcodeFormat::Code128;
    }
    requested
}

fn is_all_digits(data: &str) -> bool {
    !data.is_empty() && data.bytes().all(|b| b.is_ascii_digit())
}

/// Bars plus the text printed under them.
struct Encoded {
    format: BarcodeFormat,
    modules: Vec<u8>,
    text: String,
}

fn encode_error(format: BarcodeFormat, reason: impl ToString) -> CodeError {
    CodeError::Barcode {
        format: format.name().to_string(),
        reason: reason.to_string(),
    }
}

/// Strip a trailing check digit after verifying it, or pass the payload as-is.
fn ean_payload(data: &str, payload_len: usize, format: BarcodeFormat) -> Result<String, CodeError> {
    if !is_all_digits(data) {
        return Err(encode_error(format, "data must be digits only"));
    }
    let digits: Vec<u8> = data.bytes().map(|b| b - b'0').collect();
    if digits.len() == payload_len {
        return Ok(data.to_string());
    }
    if digits.len() != payload_len + 1 {
        return Err(encode_error(
            format,
            format!("needs {} or {} digits, got {}", payload_len, payload_len + 1, digits.len()),
        ));
    }

    let body = &digits[..payload_len];
    // EAN weights run 3,1,3,... from the digit next to the check digit.
    let sum: u32 = body
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| if i % 2 == 0 { 3 * d as u32 } else { d as u32 })
        .sum();
    let check = ((10 - sum % 10) % 10) as u8;
    if digits[payload_len] != check {
        return Err(encode_error(format, "check digit mismatch"));
    }
    Ok(data[..payload_len].to_string())
}

fn with_check_digit(payload: &str) -> String {
    let sum: u32 = payload
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let d = (b - b'0') as u32;
            if i % 2 == 0 { 3 * d } else { d }
        })
        .sum();
    format!("{}{}", payload, (10 - sum % 10) % 10)
}

fn encode_modules(data: &str, format: BarcodeFormat) -> Result<Encoded, CodeError> {
    if data.is_empty() {
        return Err(CodeError::EmptyData);
    }

    let (modules, text) = match format {
        BarcodeFormat::Code128 => {
            // Character set B covers printable ASCII, upper and lower case.
            let prefixed = format!("\u{0181}{}", data);
            let code = Code128::new(prefixed.as_str()).map_err(|e| encode_error(format, e))?;
            (code.encode(), data.to_string())
        }
        BarcodeFormat::Code39 => {
            let code = Code39::new(data).map_err(|e| encode_error(format, e))?;
            (code.encode(), data.to_string())
        }
        BarcodeFormat::Ean13 => {
            let payload = ean_payload(data, 12, format)?;
            let code = EAN13::new(payload.as_str()).map_err(|e| encode_error(format, e))?;
            (code.encode(), with_check_digit(&payload))
        }
        BarcodeFormat::Ean8 => {
            let payload = ean_payload(data, 7, format)?;
            let code = EAN8::new(payload.as_str()).map_err(|e| encode_error(format, e))?;
            (code.encode(), with_check_digit(&payload))
        }
        BarcodeFormat::UpcA => {
            let payload = ean_payload(data, 11, format)?;
            let ean = format!("0{}", payload);
            let code = EAN13::new(ean.as_str()).map_err(|e| encode_error(format, e))?;
            (code.encode(), with_check_digit(&payload))
        }
        BarcodeFormat::UpcE => {
            let code = upce::encode(data).map_err(|e| encode_error(format, e))?;
            (code.modules, code.text)
        }
    };

    if modules.is_empty() {
        return Err(encode_error(format, "encoder produced no bars"));
    }
    Ok(Encoded {
        format,
        modules,
        text,
    })
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn draw(encoded: &Encoded, width: f64, height: f64, show_label: bool) -> Fragment {
    let total = encoded.modules.len() + 2 * QUIET_ZONE;
    let module = width / total as f64;
    let label_height = if show_label { height * LABEL_SHARE } else { 0.0 };
    let bar_height = height - label_height;

    // Merge runs of dark modules into one rectangle each.
    let mut path = String::new();
    let mut i = 0;
    while i < encoded.modules.len() {
        if encoded.modules[i] == 1 {
            let start = i;
            while i < encoded.modules.len() && encoded.modules[i] == 1 {
                i += 1;
            }
            path.push_str(&format!(
                "M{} 0h{}v{}h-{}z",
                fmt_num((start + QUIET_ZONE) as f64 * module),
                fmt_num((i - start) as f64 * module),
                fmt_num(bar_height),
                fmt_num((i - start) as f64 * module),
            ));
        } else {
            i += 1;
        }
    }

    let mut body = format!(
        concat!(
            r#"<g class="barcode" data-symbology="{sym}" shape-rendering="crispEdges">"#,
            r#"<rect x="0" y="0" width="{w}" height="{h}" fill="white"/>"#,
            r#"<path d="{d}" fill="black"/>"#
        ),
        sym = encoded.format.name(),
        w = fmt_num(width),
        h = fmt_num(height),
        d = path,
    );
    if show_label {
        let font_size = label_height * 0.8;
        body.push_str(&format!(
            r#"<text x="{x}" y="{y}" font-size="{fs}" font-family="monospace" text-anchor="middle" fill="black">{text}</text>"#,
            x = fmt_num(width / 2.0),
            y = fmt_num(height - label_height * 0.15),
            fs = fmt_num(font_size),
            text = escape_text(&encoded.text),
        ));
    }
    body.push_str("</g>");

    Fragment {
        kind: FragmentKind::Barcode(encoded.format),
        width,
        height,
        body,
    }
}

/// Encode `data` following the format-selection policy.
///
/// Returns an error only when CODE128 also rejects the data.
pub fn encode_barcode(
    data: &str,
    requested: BarcodeFormat,
    width: f64,
    height: f64,
    show_label: bool,
) -> Result<Fragment, CodeError> {
    check_box(width, height)?;
    let format = select_format(data, requested);

    let encoded = encode_modules(data, format).or_else(|first| {
        tracing::warn!(error = %first, format = %format, "barcode encoding failed, retrying with CODE128");
        encode_modules(data, BarcodeFormat::Code128)
    })?;

    Ok(draw(&encoded, width, height, show_label))
}

/// Like [`encode_barcode`], but never fails: errors become a "Barcode Error" box.
pub fn generate_barcode(
    data: &str,
    requested: BarcodeFormat,
    width: f64,
    height: f64,
    show_label: bool,
) -> Fragment {
    match encode_barcode(data, requested, width, height, show_label) {
        Ok(fragment) => fragment,
        Err(e) => {
            tracing::warn!(error = %e, "barcode generation failed, using placeholder");
            Fragment::error("Barcode Error", width, height)
        }
    }
}
