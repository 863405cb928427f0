//! # Sticker Templates
//!
//! A template is a fixed-size canvas (millimetres) with an ordered list of
//! positioned elements. List order is paint order: later elements draw over
//! earlier ones.
//!
//! ## JSON Form
//!
//! ```json
//! {
//!   "id": 7,
//!   "name": "Small part",
//!   "template_type": "Items",
//!   "width_mm": 30,
//!   "height_mm": 20,
//!   "layout": [
//!     {"type": "text", "x_mm": 2, "y_mm": 2, "width_mm": 26, "height_mm": 5,
//!      "content": "{ItemName}", "font_size_mm": 3, "text_align": "center"},
//!     {"type": "qr", "x_mm": 2, "y_mm": 8, "width_mm": 10, "height_mm": 10,
//!      "source": "{ItemUUID}", "error_correction": "M"}
//!   ]
//! }
//! ```
//!
//! Deserialisation validates geometry, so a [`StickerTemplate`] value is
//! always inside the 5–500 mm bounds by construction.

mod types;

pub use types::{
    BarcodeElement, BarcodeFormat, Bounds, ErrorCorrection, LayoutElement, QrElement,
    StickerTemplate, TemplateSummary, TemplateType, TextAlign, TextElement,
};
