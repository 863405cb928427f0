//! # Error Types
//!
//! This module defines error types used throughout the etiqueta library.
//!
//! Most rendering problems never reach this type: codec failures degrade to
//! placeholder fragments (see [`crate::codes::CodeError`]) and PDF failures
//! degrade to the SVG document. What remains are the conditions a caller has
//! to act on.

use thiserror::Error;

use crate::template::TemplateType;

/// Main error type for etiqueta operations
#[derive(Debug, Error)]
pub enum EtiquetaError {
    /// Template geometry outside the accepted bounds
    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    /// Entity bound to a template of another type
    #[error("Template must be for {expected}, got {actual} data")]
    TemplateTypeMismatch {
        expected: TemplateType,
        actual: TemplateType,
    },

    /// No template with the requested id
    #[error("Template {0} not found")]
    TemplateNotFound(i64),

    /// Batch print without any entity
    #[error("No entities selected")]
    EmptyBatch,

    /// PDF engine raised
    #[error("PDF error: {0}")]
    Pdf(String),

    /// PDF engine did not answer in time
    #[error("PDF generation timed out after {0:?}")]
    PdfTimeout(std::time::Duration),

    /// JSON parse error wrapper
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Server bind/serve errors
    #[error("Server error: {0}")]
    Server(String),
}
