//! # Vector Renderer
//!
//! Turns a template plus a placeholder context into one SVG document.
//!
//! ## Pipeline
//!
//! ```text
//! StickerTemplate + PlaceholderContext
//!        ↓
//!   canvas = mm × MM_TO_PX, white background with a thin border
//!        ↓
//!   @font-face for every project font used by a text element
//!        ↓
//!   elements in paint order:
//!     text    → resolve, escape, <text> with inline font-family
//!     qr      → resolve, encode_qr, translate into place
//!     barcode → resolve, encode_barcode, translate into place
//!        ↓
//!   VectorDocument
//! ```
//!
//! A failing element never aborts the document: each element yields a
//! `Result`, and one fold step swaps any `Err` for the error fragment of
//! that element's box.
//!
//! [`render_body`] and [`font_rules`] expose the two halves separately so a
//! sheet of many labels can declare its fonts once.
//!
//! ## Example
//!
//! ```
//! use etiqueta::fonts::FontCatalogue;
//! use etiqueta::placeholder::PlaceholderContext;
//! use etiqueta::render::render;
//! use etiqueta::template::{StickerTemplate, TemplateType};
//!
//! let template = StickerTemplate::new(1, "blank", TemplateType::Racks, 40.0, 20.0, vec![])?;
//! let doc = render(&template, &PlaceholderContext::empty(), &FontCatalogue::empty());
//! assert!(doc.as_str().starts_with("<svg"));
//! # Ok::<(), etiqueta::EtiquetaError>(())
//! ```

mod element;
mod text;

pub use element::{ElementPreview, preview_element};

use serde::Serialize;
use std::collections::BTreeSet;

use crate::codes::{self, CodeError, Fragment};
use crate::fonts::{FontCatalogue, is_system_font};
use crate::placeholder::{PlaceholderContext, resolve};
use crate::template::{Bounds, LayoutElement, StickerTemplate};
use crate::units::fmt_num;

/// A complete SVG document for one label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorDocument {
    svg: String,
}

impl VectorDocument {
    pub const CONTENT_TYPE: &'static str = "image/svg+xml";

    pub fn as_str(&self) -> &str {
        &self.svg
    }

    pub fn into_string(self) -> String {
        self.svg
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.svg.into_bytes()
    }

    pub fn len(&self) -> usize {
        self.svg.len()
    }

    pub fn is_empty(&self) -> bool {
        self.svg.is_empty()
    }
}

/// Preview payload for UIs: the document plus its physical size.
#[derive(Debug, Clone, Serialize)]
pub struct Preview {
    pub svg: String,
    pub width_mm: f64,
    pub height_mm: f64,
    pub template_name: String,
}

/// Distinct project fonts named by text elements, in first-use order.
fn used_project_fonts(template: &StickerTemplate) -> Vec<&str> {
    let mut seen = BTreeSet::new();
    let mut fonts = Vec::new();
    for element in template.layout() {
        if let LayoutElement::Text(text) = element {
            let name = text.font_family.trim();
            if !is_system_font(name) && seen.insert(name) {
                fonts.push(name);
            }
        }
    }
    fonts
}

/// `<g>` wrapper that moves a fragment to its element box.
fn place(bounds: &Bounds, fragment: &Fragment) -> String {
    format!(
        r#"<g transform="translate({} {})">{}</g>"#,
        fmt_num(bounds.x_px()),
        fmt_num(bounds.y_px()),
        fragment.body
    )
}

fn error_caption(element: &LayoutElement) -> &'static str {
    match element {
        LayoutElement::Barcode(_) => "Barcode Error",
        _ => "QR Error",
    }
}

/// Draw one element, positioned on the canvas.
fn render_element(
    element: &LayoutElement,
    context: &PlaceholderContext,
) -> Result<String, CodeError> {
    let bounds = element.bounds();
    match element {
        LayoutElement::Text(text) => {
            let content = resolve(context, &text.content);
            tracing::debug!(template = %text.content, resolved = %content, "text element");
            Ok(text::text_node(text, &content))
        }
        LayoutElement::Qr(qr) => {
            let data = resolve(context, &qr.source);
            tracing::debug!(template = %qr.source, resolved = %data, "qr element");
            let fragment = codes::encode_qr(
                &data,
                bounds.width_px(),
                bounds.height_px(),
                qr.error_correction,
            )?;
            Ok(place(bounds, &fragment))
        }
        LayoutElement::Barcode(barcode) => {
            let data = resolve(context, &barcode.source);
            tracing::debug!(template = %barcode.source, resolved = %data, "barcode element");
            let fragment = codes::encode_barcode(
                &data,
                barcode.format,
                bounds.width_px(),
                bounds.height_px(),
                barcode.show_label,
            )?;
            Ok(place(bounds, &fragment))
        }
    }
}

/// `@font-face` rules for the project fonts `template` uses. Fonts that
/// cannot be found are skipped and left to viewer substitution.
pub fn font_rules(template: &StickerTemplate, fonts: &FontCatalogue) -> Vec<String> {
    used_project_fonts(template)
        .into_iter()
        .filter_map(|name| match fonts.embed(name) {
            Some(font) => Some(font.css_rule()),
            None => {
                tracing::warn!(font = name, "font not found, relying on viewer substitution");
                None
            }
        })
        .collect()
}

/// `<defs>` block carrying `rules`, or nothing when there are none.
pub fn font_defs(rules: &[String]) -> String {
    if rules.is_empty() {
        return String::new();
    }
    format!(
        "<defs><style type=\"text/css\">{}</style></defs>\n",
        rules.join("\n")
    )
}

/// Canvas content of one label: background and elements in paint order,
/// without the root element or font declarations.
pub fn render_body(template: &StickerTemplate, context: &PlaceholderContext) -> String {
    let mut body = String::with_capacity(2048);
    body.push_str(&format!(
        r#"<rect x="0" y="0" width="{}" height="{}" fill="white" stroke="black" stroke-width="0.5"/>"#,
        fmt_num(template.width_px()),
        fmt_num(template.height_px())
    ));
    body.push('\n');

    for (index, element) in template.layout().iter().enumerate() {
        let node = render_element(element, context).unwrap_or_else(|e| {
            tracing::warn!(
                template = template.name(),
                element = index,
                kind = element.kind(),
                error = %e,
                "element failed, drawing placeholder"
            );
            let bounds = element.bounds();
            let fallback = Fragment::error(
                error_caption(element),
                bounds.width_px(),
                bounds.height_px(),
            );
            place(bounds, &fallback)
        });
        body.push_str(&node);
        body.push('\n');
    }
    body
}

/// Render `template` with `context` into an SVG document.
pub fn render(
    template: &StickerTemplate,
    context: &PlaceholderContext,
    fonts: &FontCatalogue,
) -> VectorDocument {
    let width = fmt_num(template.width_px());
    let height = fmt_num(template.height_px());

    let mut svg = String::with_capacity(4096);
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" overflow="hidden">"#,
        w = width,
        h = height,
    ));
    svg.push('\n');
    // Font declarations must precede their first use.
    svg.push_str(&font_defs(&font_rules(template, fonts)));
    svg.push_str(&render_body(template, context));
    svg.push_str("</svg>\n");

    tracing::debug!(
        template = template.name(),
        elements = template.layout().len(),
        bytes = svg.len(),
        "rendered vector document"
    );
    VectorDocument { svg }
}

/// Render and wrap with the template's physical size for UIs.
pub fn preview(
    template: &StickerTemplate,
    context: &PlaceholderContext,
    fonts: &FontCatalogue,
) -> Preview {
    Preview {
        svg: render(template, context, fonts).into_string(),
        width_mm: template.width_mm(),
        height_mm: template.height_mm(),
        template_name: template.name().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::generate_qr;
    use crate::template::{
        BarcodeElement, BarcodeFormat, ErrorCorrection, QrElement, TemplateType, TextAlign,
        TextElement,
    };

    fn context() -> PlaceholderContext {
        let mut ctx = PlaceholderContext::empty();
        ctx.insert("ItemName", "Resistor 10k");
        ctx.insert("ItemUUID", "AB12CD34EF56");
        ctx
    }

    fn template(layout: Vec<LayoutElement>) -> StickerTemplate {
        StickerTemplate::new(1, "test", TemplateType::Items, 30.0, 20.0, layout).unwrap()
    }

    #[test]
    fn test_canvas_and_background() {
        let doc = render(&template(vec![]), &context(), &FontCatalogue::empty());
        let svg = doc.as_str();
        assert!(svg.contains(r#"width="113.386" height="75.591""#));
        assert!(svg.contains(r#"viewBox="0 0 113.386 75.591""#));
        assert!(svg.contains(r#"fill="white" stroke="black" stroke-width="0.5""#));
        assert!(!svg.contains("<defs>"));
    }

    #[test]
    fn test_paint_order_follows_layout() {
        let layout = vec![
            LayoutElement::Text(TextElement::new(Bounds::new(0.0, 0.0, 10.0, 5.0), "first")),
            LayoutElement::Qr(QrElement::new(Bounds::new(0.0, 0.0, 10.0, 10.0), "{ItemUUID}")),
            LayoutElement::Text(TextElement::new(Bounds::new(0.0, 0.0, 10.0, 5.0), "last")),
        ];
        let doc = render(&template(layout), &context(), &FontCatalogue::empty());
        let svg = doc.as_str();
        let first = svg.find(">first<").unwrap();
        let qr = svg.find(r#"class="qr""#).unwrap();
        let last = svg.find(">last<").unwrap();
        assert!(first < qr && qr < last);
    }

    #[test]
    fn test_bad_element_does_not_abort() {
        let long = "Z".repeat(5000);
        let layout = vec![
            LayoutElement::Qr(QrElement {
                bounds: Bounds::new(2.0, 2.0, 10.0, 10.0),
                source: long,
                error_correction: ErrorCorrection::H,
            }),
            LayoutElement::Text(
                TextElement::new(Bounds::new(0.0, 14.0, 30.0, 5.0), "{ItemName}")
                    .align(TextAlign::Center),
            ),
        ];
        let doc = render(&template(layout), &context(), &FontCatalogue::empty());
        let svg = doc.as_str();
        assert!(svg.contains("QR Error"));
        assert!(svg.contains(r#"<g transform="translate(7.559 7.559)"><g class="code-error">"#));
        assert!(svg.contains(">Resistor 10k</text>"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_barcode_error_caption() {
        let layout = vec![LayoutElement::Barcode(BarcodeElement::new(
            Bounds::new(0.0, 0.0, 20.0, 8.0),
            "ünïcødé",
            BarcodeFormat::Code128,
        ))];
        let doc = render(&template(layout), &context(), &FontCatalogue::empty());
        assert!(doc.as_str().contains("Barcode Error"));
    }

    #[test]
    fn test_qr_fragment_matches_generator() {
        let bounds = Bounds::new(1.0, 1.0, 12.0, 12.0);
        let layout = vec![LayoutElement::Qr(QrElement::new(bounds, "{ItemUUID}"))];
        let doc = render(&template(layout), &context(), &FontCatalogue::empty());

        let expected = generate_qr(
            "AB12CD34EF56",
            bounds.width_px(),
            bounds.height_px(),
            ErrorCorrection::M,
        );
        assert!(doc.as_str().contains(&expected.body));
    }

    #[test]
    fn test_overflowing_element_is_clipped_not_dropped() {
        let layout = vec![LayoutElement::Qr(QrElement::new(
            Bounds::new(25.0, 15.0, 20.0, 20.0),
            "edge",
        ))];
        let doc = render(&template(layout), &context(), &FontCatalogue::empty());
        let svg = doc.as_str();
        assert!(svg.contains(r#"class="qr""#));
        assert!(svg.contains(r#"overflow="hidden""#));
    }

    #[test]
    fn test_missing_project_font_keeps_name() {
        let layout = vec![LayoutElement::Text(
            TextElement::new(Bounds::new(0.0, 0.0, 10.0, 5.0), "x").font("Ghost"),
        )];
        let doc = render(&template(layout), &context(), &FontCatalogue::empty());
        assert!(!doc.as_str().contains("@font-face"));
        assert!(doc.as_str().contains("Ghost"));
    }

    #[test]
    fn test_body_has_no_root_or_fonts() {
        let layout = vec![LayoutElement::Text(
            TextElement::new(Bounds::new(0.0, 0.0, 10.0, 5.0), "{ItemName}").font("Ghost"),
        )];
        let body = render_body(&template(layout), &context());
        assert!(body.starts_with("<rect"));
        assert!(!body.contains("<svg"));
        assert!(!body.contains("<defs>"));
        assert!(body.contains(">Resistor 10k</text>"));
        assert_eq!(font_defs(&[]), "");
    }

    #[test]
    fn test_preview_echoes_size() {
        let preview = preview(&template(vec![]), &context(), &FontCatalogue::empty());
        assert_eq!(preview.width_mm, 30.0);
        assert_eq!(preview.height_mm, 20.0);
        assert_eq!(preview.template_name, "test");
    }
}
