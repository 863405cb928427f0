//! # Etiqueta - Sticker Template Rendering
//!
//! Etiqueta renders label templates authored in millimetres into scalable
//! SVG previews and exact-size PDF pages. It provides:
//!
//! - **Placeholders**: `{Token}` substitution from typed item, location and
//!   rack records
//! - **Codes**: QR codes and 1D barcodes (CODE128, CODE39, EAN13, EAN8,
//!   UPC-A, UPC-E) with visible error boxes instead of failures
//! - **Fonts**: project font directory with embedding into previews and PDFs
//! - **Composition**: one page per label, PDF with SVG fallback
//!
//! ## Quick Start
//!
//! ```
//! use etiqueta::{
//!     fonts::FontCatalogue,
//!     placeholder::PlaceholderContext,
//!     render,
//!     template::{Bounds, LayoutElement, QrElement, StickerTemplate, TemplateType, TextAlign, TextElement},
//! };
//!
//! let template = StickerTemplate::new(
//!     1,
//!     "Part label",
//!     TemplateType::Items,
//!     30.0,
//!     20.0,
//!     vec![
//!         LayoutElement::Text(
//!             TextElement::new(Bounds::new(1.0, 1.0, 28.0, 5.0), "{ItemName}")
//!                 .align(TextAlign::Center),
//!         ),
//!         LayoutElement::Qr(QrElement::new(Bounds::new(1.0, 7.0, 12.0, 12.0), "{ItemUUID}")),
//!     ],
//! )?;
//!
//! let mut context = PlaceholderContext::empty();
//! context.insert("ItemName", "Resistor 10k");
//! context.insert("ItemUUID", "AB12CD34EF56");
//!
//! let doc = render::render(&template, &context, &FontCatalogue::empty());
//! assert!(doc.as_str().contains("Resistor 10k"));
//! # Ok::<(), etiqueta::EtiquetaError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`units`] | mm, pixel, inch and point conversions |
//! | [`template`] | Templates and layout elements |
//! | [`placeholder`] | Token vocabularies, contexts and resolution |
//! | [`codes`] | QR and barcode fragments |
//! | [`fonts`] | Font catalogue |
//! | [`render`] | SVG renderer and previews |
//! | [`compose`] | PDF pages with SVG fallback |
//! | [`store`] | Read-only template store |
//! | [`server`] | HTTP API |
//! | [`config`] | Server configuration |
//! | [`error`] | Error types |

pub mod codes;
pub mod compose;
pub mod config;
pub mod error;
pub mod fonts;
pub mod placeholder;
pub mod render;
pub mod server;
pub mod store;
pub mod template;
pub mod units;

// Re-exports for convenience
pub use compose::{Compositor, PrintPayload};
pub use error::EtiquetaError;
pub use fonts::FontCatalogue;
pub use placeholder::PlaceholderContext;
pub use template::StickerTemplate;
