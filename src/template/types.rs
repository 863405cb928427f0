//! Template and element types.
//!
//! All types derive `Serialize + Deserialize` so the same types work for
//! both Rust API construction and the JSON documents kept by the template
//! store.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::EtiquetaError;
use crate::units::{self, MAX_CANVAS_MM, MIN_CANVAS_MM};

// ============================================================================
// TEMPLATE TYPE
// ============================================================================

/// Entity kind a template is bound to. Determines the placeholder vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TemplateType {
    Items,
    #[serde(alias = "Location")]
    Locations,
    Racks,
}

impl TemplateType {
    pub fn name(&self) -> &'static str {
        match self {
            TemplateType::Items => "Items",
            TemplateType::Locations => "Locations",
            TemplateType::Racks => "Racks",
        }
    }
}

impl fmt::Display for TemplateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// ELEMENT OPTIONS
// ============================================================================

/// Horizontal text alignment inside the element box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl From<String> for TextAlign {
    fn from(value: String) -> Self {
        match value.to_lowercase().as_str() {
            "center" | "middle" => TextAlign::Center,
            "right" | "end" => TextAlign::Right,
            _ => TextAlign::Left,
        }
    }
}

/// QR error-correction level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum ErrorCorrection {
    /// ~7% recovery
    L,
    /// ~15% recovery (default)
    #[default]
    M,
    /// ~25% recovery
    Q,
    /// ~30% recovery
    H,
}

impl From<String> for ErrorCorrection {
    fn from(value: String) -> Self {
        match value.to_uppercase().as_str() {
            "L" => ErrorCorrection::L,
            "Q" => ErrorCorrection::Q,
            "H" => ErrorCorrection::H,
            _ => ErrorCorrection::M,
        }
    }
}

/// 1D barcode symbology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", from = "String")]
pub enum BarcodeFormat {
    #[default]
    Code128,
    Code39,
    Ean13,
    Ean8,
    UpcA,
    UpcE,
}

impl BarcodeFormat {
    pub fn name(&self) -> &'static str {
        match self {
            BarcodeFormat::Code128 => "CODE128",
            BarcodeFormat::Code39 => "CODE39",
            BarcodeFormat::Ean13 => "EAN13",
            BarcodeFormat::Ean8 => "EAN8",
            BarcodeFormat::UpcA => "UPCA",
            BarcodeFormat::UpcE => "UPCE",
        }
    }

    /// Symbologies that only accept decimal digits.
    pub fn is_numeric_only(&self) -> bool {
        matches!(
            self,
            BarcodeFormat::Ean13 | BarcodeFormat::Ean8 | BarcodeFormat::UpcA | BarcodeFormat::UpcE
        )
    }
}

impl From<String> for BarcodeFormat {
    fn from(value: String) -> Self {
        match value.to_uppercase().replace(['-', '_', ' '], "").as_str() {
            "CODE39" => BarcodeFormat::Code39,
            "EAN13" => BarcodeFormat::Ean13,
            "EAN8" => BarcodeFormat::Ean8,
            "UPCA" | "UPC" => BarcodeFormat::UpcA,
            "UPCE" => BarcodeFormat::UpcE,
            "CODE128" => BarcodeFormat::Code128,
            other => {
                tracing::debug!(format = other, "unknown barcode format, using CODE128");
                BarcodeFormat::Code128
            }
        }
    }
}

impl fmt::Display for BarcodeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// ELEMENTS
// ============================================================================

fn default_box_mm() -> f64 {
    10.0
}

fn default_font_family() -> String {
    "Arial".to_string()
}

fn default_color() -> String {
    "#000000".to_string()
}

/// Position and size of an element, in millimetres from the canvas origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    #[serde(default)]
    pub x_mm: f64,
    #[serde(default)]
    pub y_mm: f64,
    #[serde(default = "default_box_mm")]
    pub width_mm: f64,
    #[serde(default = "default_box_mm")]
    pub height_mm: f64,
}

impl Bounds {
    pub fn new(x_mm: f64, y_mm: f64, width_mm: f64, height_mm: f64) -> Self {
        Self {
            x_mm,
            y_mm,
            width_mm,
            height_mm,
        }
    }

    pub fn x_px(&self) -> f64 {
        units::mm_to_px(self.x_mm)
    }

    pub fn y_px(&self) -> f64 {
        units::mm_to_px(self.y_mm)
    }

    pub fn width_px(&self) -> f64 {
        units::mm_to_px(self.width_mm)
    }

    pub fn height_px(&self) -> f64 {
        units::mm_to_px(self.height_mm)
    }

    fn validate(&self) -> Result<(), String> {
        let fields = [
            ("x_mm", self.x_mm),
            ("y_mm", self.y_mm),
            ("width_mm", self.width_mm),
            ("height_mm", self.height_mm),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{} must be a non-negative number, got {}", name, value));
            }
        }
        Ok(())
    }
}

/// Text run bound to a template string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextElement {
    #[serde(flatten)]
    pub bounds: Bounds,
    #[serde(default)]
    pub content: String,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size_mm: Option<f64>,
    /// Pixel size from templates saved before sizes were stored in mm.
    #[serde(default, rename = "font_size", skip_serializing_if = "Option::is_none")]
    pub legacy_font_size_px: Option<f64>,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub text_align: TextAlign,
}

impl TextElement {
    pub const DEFAULT_FONT_SIZE_PX: f64 = 12.0;

    pub fn new(bounds: Bounds, content: impl Into<String>) -> Self {
        Self {
            bounds,
            content: content.into(),
            font_family: default_font_family(),
            font_size_mm: None,
            legacy_font_size_px: None,
            color: default_color(),
            text_align: TextAlign::Left,
        }
    }

    pub fn font_size_mm(mut self, size: f64) -> Self {
        self.font_size_mm = Some(size);
        self
    }

    pub fn align(mut self, align: TextAlign) -> Self {
        self.text_align = align;
        self
    }

    pub fn font(mut self, family: impl Into<String>) -> Self {
        self.font_family = family.into();
        self
    }

    /// Font size in vector-document pixels.
    pub fn font_size_px(&self) -> f64 {
        match self.font_size_mm {
            Some(mm) if mm > 0.0 => units::mm_to_px(mm),
            _ => self
                .legacy_font_size_px
                .filter(|px| *px > 0.0)
                .unwrap_or(Self::DEFAULT_FONT_SIZE_PX),
        }
    }
}

/// QR code bound to a template string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QrElement {
    #[serde(flatten)]
    pub bounds: Bounds,
    #[serde(default, alias = "source_field")]
    pub source: String,
    #[serde(default)]
    pub error_correction: ErrorCorrection,
}

impl QrElement {
    pub fn new(bounds: Bounds, source: impl Into<String>) -> Self {
        Self {
            bounds,
            source: source.into(),
            error_correction: ErrorCorrection::M,
        }
    }
}

/// 1D barcode bound to a template string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarcodeElement {
    #[serde(flatten)]
    pub bounds: Bounds,
    #[serde(default, alias = "source_field")]
    pub source: String,
    #[serde(default)]
    pub format: BarcodeFormat,
    #[serde(default)]
    pub show_label: bool,
}

impl BarcodeElement {
    pub fn new(bounds: Bounds, source: impl Into<String>, format: BarcodeFormat) -> Self {
        Self {
            bounds,
            source: source.into(),
            format,
            show_label: false,
        }
    }
}

/// One drawable unit on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LayoutElement {
    Text(TextElement),
    Qr(QrElement),
    Barcode(BarcodeElement),
}

impl LayoutElement {
    pub fn bounds(&self) -> &Bounds {
        match self {
            LayoutElement::Text(text) => &text.bounds,
            LayoutElement::Qr(qr) => &qr.bounds,
            LayoutElement::Barcode(barcode) => &barcode.bounds,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            LayoutElement::Text(_) => "text",
            LayoutElement::Qr(_) => "qr",
            LayoutElement::Barcode(_) => "barcode",
        }
    }
}

// ============================================================================
// TEMPLATE
// ============================================================================

/// Unvalidated wire form; every deserialised template passes through
/// [`StickerTemplate::new`].
#[derive(Deserialize)]
struct RawTemplate {
    #[serde(default)]
    id: i64,
    name: String,
    template_type: TemplateType,
    width_mm: f64,
    height_mm: f64,
    #[serde(default)]
    layout: Vec<LayoutElement>,
}

impl TryFrom<RawTemplate> for StickerTemplate {
    type Error = EtiquetaError;

    fn try_from(raw: RawTemplate) -> Result<Self, Self::Error> {
        StickerTemplate::new(
            raw.id,
            raw.name,
            raw.template_type,
            raw.width_mm,
            raw.height_mm,
            raw.layout,
        )
    }
}

/// A validated, immutable label layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTemplate")]
pub struct StickerTemplate {
    id: i64,
    name: String,
    template_type: TemplateType,
    width_mm: f64,
    height_mm: f64,
    layout: Vec<LayoutElement>,
}

impl StickerTemplate {
    /// Build a template, rejecting canvas sizes outside 5–500 mm and
    /// negative or non-finite element geometry.
    pub fn new(
        id: i64,
        name: impl Into<String>,
        template_type: TemplateType,
        width_mm: f64,
        height_mm: f64,
        layout: Vec<LayoutElement>,
    ) -> Result<Self, EtiquetaError> {
        if !units::canvas_edge_in_bounds(width_mm) {
            return Err(EtiquetaError::InvalidTemplate(format!(
                "Width must be between {}mm and {}mm, got {}",
                MIN_CANVAS_MM, MAX_CANVAS_MM, width_mm
            )));
        }
        if !units::canvas_edge_in_bounds(height_mm) {
            return Err(EtiquetaError::InvalidTemplate(format!(
                "Height must be between {}mm and {}mm, got {}",
                MIN_CANVAS_MM, MAX_CANVAS_MM, height_mm
            )));
        }
        for (index, element) in layout.iter().enumerate() {
            element.bounds().validate().map_err(|e| {
                EtiquetaError::InvalidTemplate(format!(
                    "element {} ({}): {}",
                    index,
                    element.kind(),
                    e
                ))
            })?;
        }

        Ok(Self {
            id,
            name: name.into(),
            template_type,
            width_mm,
            height_mm,
            layout,
        })
    }

    /// Parse and validate a template from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, EtiquetaError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn template_type(&self) -> TemplateType {
        self.template_type
    }

    pub fn width_mm(&self) -> f64 {
        self.width_mm
    }

    pub fn height_mm(&self) -> f64 {
        self.height_mm
    }

    pub fn width_px(&self) -> f64 {
        units::mm_to_px(self.width_mm)
    }

    pub fn height_px(&self) -> f64 {
        units::mm_to_px(self.height_mm)
    }

    /// Elements in paint order.
    pub fn layout(&self) -> &[LayoutElement] {
        &self.layout
    }

    pub fn summary(&self) -> TemplateSummary {
        TemplateSummary {
            id: self.id,
            name: self.name.clone(),
            template_type: self.template_type,
            width_mm: self.width_mm,
            height_mm: self.height_mm,
        }
    }
}

/// Listing entry for a template.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateSummary {
    pub id: i64,
    pub name: String,
    pub template_type: TemplateType,
    pub width_mm: f64,
    pub height_mm: f64,
}
