//! # Print Compositor
//!
//! Wraps rendered labels into physical pages.
//!
//! ```text
//! single:  render(template, ctx)                → sheet of 1 label  → PDF, 1 page
//! batch:   render_body(template, ctx_i) in par.
//!          + font_rules(template) once          → sheet of N labels → PDF, N pages
//!                                                         │
//!                             engine error / timeout ─────┴→ the sheet itself (SVG)
//! ```
//!
//! Every page is exactly `width_mm × height_mm` with no margin. A batch is
//! first stacked into one tall SVG sheet; the engine converts that sheet once
//! and each page shows its own slice, which keeps fonts embedded once per
//! file, in the PDF and in the SVG sheet alike. The same sheet is what
//! callers receive when PDF output fails, so a [`PrintPayload`] may be
//! either format: trust its [`content_type`](PrintPayload::content_type).

mod engine;

pub use engine::{PdfEngine, SvgPdfEngine};

use rayon::prelude::*;
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::EtiquetaError;
use crate::fonts::FontCatalogue;
use crate::placeholder::PlaceholderContext;
use crate::render::{VectorDocument, font_defs, font_rules, render, render_body};
use crate::template::StickerTemplate;
use crate::units::{fmt_num, in_to_mm, mm_to_in, mm_to_pt, mm_to_px};

/// Default time the PDF engine gets before the SVG fallback is used.
pub const DEFAULT_PDF_TIMEOUT: Duration = Duration::from_secs(30);

/// Physical page size of one label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width_mm: f64,
    pub height_mm: f64,
    pub width_in: f64,
    pub height_in: f64,
    /// PDF user space units (1/72 in).
    pub width_pt: f64,
    pub height_pt: f64,
}

impl PageGeometry {
    pub fn new(width_mm: f64, height_mm: f64) -> Self {
        Self {
            width_mm,
            height_mm,
            width_in: mm_to_in(width_mm),
            height_in: mm_to_in(height_mm),
            width_pt: mm_to_pt(width_mm),
            height_pt: mm_to_pt(height_mm),
        }
    }

    pub fn for_template(template: &StickerTemplate) -> Self {
        Self::new(template.width_mm(), template.height_mm())
    }

    /// Page size converted back from inches to millimetres.
    pub fn size_mm_from_inches(&self) -> (f64, f64) {
        (in_to_mm(self.width_in), in_to_mm(self.height_in))
    }
}

/// Format of a print payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Pdf,
    Svg,
}

impl PayloadKind {
    pub fn content_type(&self) -> &'static str {
        match self {
            PayloadKind::Pdf => "application/pdf",
            PayloadKind::Svg => VectorDocument::CONTENT_TYPE,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            PayloadKind::Pdf => "pdf",
            PayloadKind::Svg => "svg",
        }
    }
}

/// Bytes ready to hand to a printer or browser, with a suggested filename.
#[derive(Debug, Clone)]
pub struct PrintPayload {
    pub bytes: Vec<u8>,
    pub kind: PayloadKind,
    pub filename: String,
}

impl PrintPayload {
    pub fn content_type(&self) -> &'static str {
        self.kind.content_type()
    }

    pub fn is_pdf(&self) -> bool {
        self.kind == PayloadKind::Pdf
    }
}

/// Keep `[A-Za-z0-9._-]`, replace everything else with `_`.
pub fn sanitize_filename_part(part: &str) -> String {
    let cleaned: String = part
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "label".to_string()
    } else {
        cleaned
    }
}

/// `<template>_<identifier>.<ext>`.
pub fn single_filename(template: &StickerTemplate, identifier: &str, kind: PayloadKind) -> String {
    format!(
        "{}_{}.{}",
        sanitize_filename_part(template.name()),
        sanitize_filename_part(identifier),
        kind.extension()
    )
}

/// `stickers_<template>.<ext>`.
pub fn batch_filename(template: &StickerTemplate, kind: PayloadKind) -> String {
    format!(
        "stickers_{}.{}",
        sanitize_filename_part(template.name()),
        kind.extension()
    )
}

/// Stack label bodies top to bottom into one SVG sheet, one label height
/// apart. `font_rules` are declared once at the sheet root; each label is
/// clipped to its own box so overflow never reaches a neighbour.
pub fn stack_labels(
    bodies: &[String],
    font_rules: &[String],
    width_mm: f64,
    height_mm: f64,
) -> String {
    let width = fmt_num(mm_to_px(width_mm));
    let height = mm_to_px(height_mm);
    let total = height * bodies.len() as f64;

    let mut sheet = String::with_capacity(bodies.iter().map(|b| b.len() + 160).sum::<usize>() + 256);
    sheet.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = width,
        h = fmt_num(total),
    ));
    sheet.push('\n');
    sheet.push_str(&font_defs(font_rules));
    for (index, body) in bodies.iter().enumerate() {
        sheet.push_str(&format!(
            r#"<g class="label" transform="translate(0 {y})"><svg width="{w}" height="{h}" viewBox="0 0 {w} {h}" overflow="hidden">"#,
            y = fmt_num(height * index as f64),
            w = width,
            h = fmt_num(height),
        ));
        sheet.push('\n');
        sheet.push_str(body);
        sheet.push_str("</svg></g>\n");
    }
    sheet.push_str("</svg>\n");
    sheet
}

/// Number of page objects in a PDF written by [`SvgPdfEngine`].
pub fn count_pages(pdf: &[u8]) -> usize {
    const NEEDLE: &[u8] = b"/Type /Page";
    pdf.windows(NEEDLE.len() + 1)
        .filter(|w| w.starts_with(NEEDLE) && w[NEEDLE.len()] != b's')
        .count()
}

/// Renders labels and composes them into pages through a [`PdfEngine`].
#[derive(Clone)]
pub struct Compositor {
    engine: Arc<dyn PdfEngine>,
    fonts: Arc<FontCatalogue>,
    timeout: Duration,
}

impl Compositor {
    pub fn new(engine: Arc<dyn PdfEngine>, fonts: Arc<FontCatalogue>, timeout: Duration) -> Self {
        Self {
            engine,
            fonts,
            timeout,
        }
    }

    /// Compositor with the svg2pdf engine over `fonts`.
    pub fn with_svg_pdf(fonts: Arc<FontCatalogue>, timeout: Duration) -> Self {
        let engine = Arc::new(SvgPdfEngine::new(&fonts));
        Self::new(engine, fonts, timeout)
    }

    pub fn fonts(&self) -> &FontCatalogue {
        &self.fonts
    }

    /// One label on one page. `identifier` only feeds the filename.
    pub fn compose_single(
        &self,
        template: &StickerTemplate,
        context: &PlaceholderContext,
        identifier: &str,
    ) -> PrintPayload {
        let document = render(template, context, &self.fonts);
        let geometry = PageGeometry::for_template(template);
        let (bytes, kind) = self.to_pdf_or_svg(document.into_string(), geometry, 1);

        tracing::info!(
            template = template.name(),
            identifier,
            format = kind.extension(),
            bytes = bytes.len(),
            "composed sticker"
        );
        PrintPayload {
            filename: single_filename(template, identifier, kind),
            bytes,
            kind,
        }
    }

    /// One page per context, in order.
    pub fn compose_batch(
        &self,
        template: &StickerTemplate,
        contexts: &[PlaceholderContext],
    ) -> Result<PrintPayload, EtiquetaError> {
        if contexts.is_empty() {
            return Err(EtiquetaError::EmptyBatch);
        }

        let bodies: Vec<String> = contexts
            .par_iter()
            .map(|context| render_body(template, context))
            .collect();
        let rules = font_rules(template, &self.fonts);
        let sheet = stack_labels(&bodies, &rules, template.width_mm(), template.height_mm());
        let geometry = PageGeometry::for_template(template);
        let (bytes, kind) = self.to_pdf_or_svg(sheet, geometry, bodies.len());

        tracing::info!(
            template = template.name(),
            pages = bodies.len(),
            format = kind.extension(),
            bytes = bytes.len(),
            "composed sticker batch"
        );
        Ok(PrintPayload {
            filename: batch_filename(template, kind),
            bytes,
            kind,
        })
    }

    fn to_pdf_or_svg(
        &self,
        sheet: String,
        geometry: PageGeometry,
        pages: usize,
    ) -> (Vec<u8>, PayloadKind) {
        let sheet: Arc<str> = Arc::from(sheet);
        match self.run_engine(Arc::clone(&sheet), geometry, pages) {
            Ok(pdf) => (pdf, PayloadKind::Pdf),
            Err(e) => {
                tracing::warn!(error = %e, pages, "PDF generation failed, returning SVG");
                (sheet.as_bytes().to_vec(), PayloadKind::Svg)
            }
        }
    }

    /// Run the engine on its own thread, giving up after the timeout. A
    /// timed-out engine thread is left to finish on its own.
    fn run_engine(
        &self,
        sheet: Arc<str>,
        geometry: PageGeometry,
        pages: usize,
    ) -> Result<Vec<u8>, EtiquetaError> {
        let engine = Arc::clone(&self.engine);
        let (tx, rx) = mpsc::channel();
        let started = Instant::now();

        thread::Builder::new()
            .name("pdf-engine".to_string())
            .spawn(move || {
                let _ = tx.send(engine.write_pdf(&sheet, &geometry, pages));
            })?;

        match rx.recv_timeout(self.timeout) {
            Ok(result) => {
                tracing::debug!(elapsed = ?started.elapsed(), pages, "PDF engine finished");
                result
            }
            Err(mpsc::RecvTimeoutError::Timeout) => Err(EtiquetaError::PdfTimeout(self.timeout)),
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                Err(EtiquetaError::Pdf("PDF engine thread panicked".to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{Bounds, LayoutElement, TemplateType, TextElement};
    use pretty_assertions::assert_eq;

    struct FailingEngine;

    impl PdfEngine for FailingEngine {
        fn write_pdf(&self, _: &str, _: &PageGeometry, _: usize) -> Result<Vec<u8>, EtiquetaError> {
            Err(EtiquetaError::Pdf("engine unavailable".to_string()))
        }
    }

    struct SlowEngine;

    impl PdfEngine for SlowEngine {
        fn write_pdf(&self, _: &str, _: &PageGeometry, _: usize) -> Result<Vec<u8>, EtiquetaError> {
            thread::sleep(Duration::from_millis(500));
            Ok(b"%PDF-late".to_vec())
        }
    }

    fn template() -> StickerTemplate {
        let layout = vec![LayoutElement::Text(TextElement::new(
            Bounds::new(1.0, 1.0, 28.0, 5.0),
            "{ItemName}",
        ))];
        StickerTemplate::new(3, "Shelf Tag", TemplateType::Items, 30.0, 20.0, layout).unwrap()
    }

    fn named(name: &str) -> PlaceholderContext {
        let mut ctx = PlaceholderContext::empty();
        ctx.insert("ItemName", name);
        ctx
    }

    fn compositor(engine: Arc<dyn PdfEngine>, timeout: Duration) -> Compositor {
        Compositor::new(engine, Arc::new(FontCatalogue::empty()), timeout)
    }

    #[test]
    fn test_geometry_round_trip() {
        let geometry = PageGeometry::new(62.0, 29.0);
        let (w, h) = geometry.size_mm_from_inches();
        assert!((w - 62.0).abs() < 1e-6);
        assert!((h - 29.0).abs() < 1e-6);
        assert!((geometry.width_pt - 175.748_031_496).abs() < 1e-6);
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename_part("Shelf Tag/v2"), "Shelf_Tag_v2");
        assert_eq!(sanitize_filename_part("ok-1.2_x"), "ok-1.2_x");
        assert_eq!(sanitize_filename_part(""), "label");
    }

    #[test]
    fn test_failing_engine_falls_back_to_svg() {
        let compositor = compositor(Arc::new(FailingEngine), DEFAULT_PDF_TIMEOUT);
        let payload = compositor.compose_single(&template(), &named("Resistor 10k"), "AB12");
        assert_eq!(payload.kind, PayloadKind::Svg);
        assert_eq!(payload.content_type(), "image/svg+xml");
        assert_eq!(payload.filename, "Shelf_Tag_AB12.svg");
        let svg = String::from_utf8(payload.bytes).unwrap();
        assert!(svg.contains(">Resistor 10k</text>"));
    }

    #[test]
    fn test_slow_engine_times_out() {
        let compositor = compositor(Arc::new(SlowEngine), Duration::from_millis(20));
        let payload = compositor.compose_single(&template(), &named("x"), "1");
        assert!(!payload.is_pdf());
        assert!(payload.bytes.starts_with(b"<svg"));
    }

    #[test]
    fn test_batch_fallback_stacks_labels() {
        let compositor = compositor(Arc::new(FailingEngine), DEFAULT_PDF_TIMEOUT);
        let contexts = vec![named("first"), named("second"), named("third")];
        let payload = compositor.compose_batch(&template(), &contexts).unwrap();
        assert_eq!(payload.filename, "stickers_Shelf_Tag.svg");

        let svg = String::from_utf8(payload.bytes).unwrap();
        assert_eq!(svg.matches(r#"<g class="label""#).count(), 3);
        let first = svg.find(">first<").unwrap();
        let second = svg.find(">second<").unwrap();
        let third = svg.find(">third<").unwrap();
        assert!(first < second && second < third);
        assert!(svg.contains(r#"<g class="label" transform="translate(0 75.591)">"#));
    }

    #[test]
    fn test_batch_fallback_embeds_fonts_once() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Brand.woff2"), b"wOF2brand").unwrap();
        let fonts = Arc::new(FontCatalogue::scan(dir.path()).unwrap());
        let compositor = Compositor::new(Arc::new(FailingEngine), fonts, DEFAULT_PDF_TIMEOUT);

        let layout = vec![LayoutElement::Text(
            TextElement::new(Bounds::new(1.0, 1.0, 28.0, 5.0), "{ItemName}").font("Brand"),
        )];
        let template =
            StickerTemplate::new(4, "Branded", TemplateType::Items, 30.0, 20.0, layout).unwrap();
        let contexts: Vec<_> = (0..5).map(|i| named(&format!("label {}", i))).collect();

        let payload = compositor.compose_batch(&template, &contexts).unwrap();
        assert_eq!(payload.kind, PayloadKind::Svg);
        let svg = String::from_utf8(payload.bytes).unwrap();
        assert_eq!(svg.matches("@font-face").count(), 1);
        assert_eq!(svg.matches("<defs>").count(), 1);
        assert!(svg.find("<defs>").unwrap() < svg.find(r#"<g class="label""#).unwrap());
        assert_eq!(svg.matches(r#"<g class="label""#).count(), 5);
        assert!(svg.contains(">label 4</text>"));
    }

    #[test]
    fn test_empty_batch_is_rejected() {
        let compositor = compositor(Arc::new(FailingEngine), DEFAULT_PDF_TIMEOUT);
        assert!(matches!(
            compositor.compose_batch(&template(), &[]),
            Err(EtiquetaError::EmptyBatch)
        ));
    }

    #[test]
    fn test_count_pages_ignores_page_tree() {
        let pdf = b"<< /Type /Pages /Kids [3 0 R 5 0 R] >> << /Type /Page >> << /Type /Page\n>>";
        assert_eq!(count_pages(pdf), 2);
    }

    #[test]
    fn test_stack_height() {
        let template = template();
        let bodies = vec![render_body(&template, &named("a")); 2];
        let sheet = stack_labels(&bodies, &[], 30.0, 20.0);
        assert!(sheet.starts_with(r#"<svg xmlns="http://www.w3.org/2000/svg" width="113.386" height="151.181""#));
    }
}
