//! PDF engine seam and the svg2pdf-backed implementation.

use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref};
use std::collections::HashMap;
use std::sync::Arc;
use usvg::fontdb;

use super::PageGeometry;
use crate::error::EtiquetaError;
use crate::fonts::FontCatalogue;

/// Turns a label sheet into PDF bytes.
///
/// `sheet` is one SVG document holding `pages` labels stacked top to bottom,
/// each exactly one page tall. Implementations must emit one page per label.
pub trait PdfEngine: Send + Sync {
    fn write_pdf(
        &self,
        sheet: &str,
        geometry: &PageGeometry,
        pages: usize,
    ) -> Result<Vec<u8>, EtiquetaError>;
}

/// Vector PDF output through usvg + svg2pdf.
///
/// The sheet is converted once into a single form XObject which every page
/// draws with its own offset, so glyphs and fonts land in the file once no
/// matter how many labels it holds.
pub struct SvgPdfEngine {
    fontdb: Arc<fontdb::Database>,
}

impl SvgPdfEngine {
    /// Engine seeing the system fonts plus every TrueType/OpenType file of
    /// the catalogue. Web-only families are not available to it.
    pub fn new(fonts: &FontCatalogue) -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        for path in fonts.sfnt_files() {
            if let Err(e) = db.load_font_file(&path) {
                tracing::warn!(path = %path.display(), error = %e, "font not loadable by PDF engine");
            }
        }
        let web_only = fonts.web_only_families();
        if !web_only.is_empty() {
            tracing::warn!(families = ?web_only, "web-only fonts will be substituted in PDF output");
        }
        tracing::debug!(faces = db.len(), "PDF font database ready");

        Self {
            fontdb: Arc::new(db),
        }
    }
}

impl PdfEngine for SvgPdfEngine {
    fn write_pdf(
        &self,
        sheet: &str,
        geometry: &PageGeometry,
        pages: usize,
    ) -> Result<Vec<u8>, EtiquetaError> {
        if pages == 0 {
            return Err(EtiquetaError::EmptyBatch);
        }

        let options = usvg::Options {
            fontdb: Arc::clone(&self.fontdb),
            ..usvg::Options::default()
        };
        let tree = usvg::Tree::from_str(sheet, &options)
            .map_err(|e| EtiquetaError::Pdf(format!("SVG parse failed: {}", e)))?;
        let (chunk, sheet_ref) =
            svg2pdf::to_chunk(&tree, svg2pdf::ConversionOptions::default())
                .map_err(|e| EtiquetaError::Pdf(e.to_string()))?;

        let mut alloc = Ref::new(1);
        let catalog_id = alloc.bump();
        let page_tree_id = alloc.bump();

        let mut map = HashMap::new();
        let chunk = chunk.renumber(|old| *map.entry(old).or_insert_with(|| alloc.bump()));
        let sheet_id = map
            .get(&sheet_ref)
            .copied()
            .ok_or_else(|| EtiquetaError::Pdf("converted sheet has no XObject".into()))?;

        let mut pdf = Pdf::new();
        pdf.extend(&chunk);

        let width = geometry.width_pt as f32;
        let height = geometry.height_pt as f32;
        let sheet_height = height * pages as f32;
        let sheet_name = Name(b"L0");

        let mut page_ids = Vec::with_capacity(pages);
        for index in 0..pages {
            let page_id = alloc.bump();
            let content_id = alloc.bump();
            page_ids.push(page_id);

            let mut page = pdf.page(page_id);
            page.media_box(Rect::new(0.0, 0.0, width, height));
            page.parent(page_tree_id);
            page.contents(content_id);
            page.resources().x_objects().pair(sheet_name, sheet_id);
            page.finish();

            // The XObject is a unit square; label `index` counted from the
            // top must end up at y = 0.
            let offset = -((pages - 1 - index) as f32) * height;
            let mut content = Content::new();
            content.save_state();
            content.rect(0.0, 0.0, width, height);
            content.clip_nonzero();
            content.end_path();
            content.transform([width, 0.0, 0.0, sheet_height, 0.0, offset]);
            content.x_object(sheet_name);
            content.restore_state();
            pdf.stream(content_id, &content.finish());
        }

        pdf.catalog(catalog_id).pages(page_tree_id);
        pdf.pages(page_tree_id)
            .kids(page_ids.iter().copied())
            .count(pages as i32);

        Ok(pdf.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(width_px: f64, height_px: f64) -> String {
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}"><rect width="{w}" height="{h}" fill="black"/></svg>"#,
            w = width_px,
            h = height_px
        )
    }

    #[test]
    fn test_pdf_header_and_page_count() {
        let engine = SvgPdfEngine::new(&FontCatalogue::empty());
        let geometry = PageGeometry::new(30.0, 20.0);
        let bytes = engine.write_pdf(&label(113.0, 75.0), &geometry, 1).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        assert_eq!(crate::compose::count_pages(&bytes), 1);
    }

    /// `(sheet scale, vertical offset)` of every sheet draw, in file order.
    fn sheet_transforms(pdf: &[u8]) -> Vec<(f64, f64)> {
        let text = String::from_utf8_lossy(pdf);
        let lines: Vec<&str> = text.lines().map(str::trim).collect();
        lines
            .windows(2)
            .filter(|pair| pair[1] == "/L0 Do")
            .map(|pair| {
                assert!(pair[0].ends_with(" cm"), "unexpected operator: {}", pair[0]);
                let operands: Vec<f64> = pair[0]
                    .split_whitespace()
                    .filter_map(|t| t.parse().ok())
                    .collect();
                assert_eq!(operands.len(), 6);
                (operands[3], operands[5])
            })
            .collect()
    }

    #[test]
    fn test_each_page_shows_its_own_slice() {
        let engine = SvgPdfEngine::new(&FontCatalogue::empty());
        let geometry = PageGeometry::new(30.0, 20.0);
        let bytes = engine.write_pdf(&label(113.386, 226.772), &geometry, 3).unwrap();
        assert_eq!(crate::compose::count_pages(&bytes), 3);

        let transforms = sheet_transforms(&bytes);
        assert_eq!(transforms.len(), 3);
        let height = geometry.height_pt;
        for (index, (scale, offset)) in transforms.into_iter().enumerate() {
            // Label `index` from the top lands on the page when the sheet is
            // shifted down by the labels below it.
            let expected = -((2 - index) as f64) * height;
            assert!((offset - expected).abs() < 1e-3, "page {}: {} != {}", index, offset, expected);
            assert!((scale - 3.0 * height).abs() < 1e-3, "page {}: scale {}", index, scale);
        }
    }

    #[test]
    fn test_invalid_sheet_is_an_error() {
        let engine = SvgPdfEngine::new(&FontCatalogue::empty());
        let geometry = PageGeometry::new(30.0, 20.0);
        assert!(matches!(
            engine.write_pdf("not svg", &geometry, 1),
            Err(EtiquetaError::Pdf(_))
        ));
    }

    #[test]
    fn test_zero_pages_rejected() {
        let engine = SvgPdfEngine::new(&FontCatalogue::empty());
        let geometry = PageGeometry::new(30.0, 20.0);
        assert!(engine.write_pdf(&label(10.0, 10.0), &geometry, 0).is_err());
    }
}
