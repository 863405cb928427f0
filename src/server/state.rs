//! Server state.

use std::sync::Arc;

use crate::compose::Compositor;
use crate::config::ServerConfig;
use crate::error::EtiquetaError;
use crate::fonts::FontCatalogue;
use crate::placeholder::CurrencyFormat;
use crate::store::{DirectoryStore, TemplateStore};

/// Application state shared across handlers. Everything in it is read-only
/// after startup.
pub struct AppState {
    pub store: Arc<dyn TemplateStore>,
    pub compositor: Compositor,
    pub currency: CurrencyFormat,
}

impl AppState {
    pub fn new(store: Arc<dyn TemplateStore>, compositor: Compositor, currency: CurrencyFormat) -> Self {
        Self {
            store,
            compositor,
            currency,
        }
    }

    /// Load templates and fonts from the configured directories.
    pub fn from_config(config: &ServerConfig) -> Result<Self, EtiquetaError> {
        let fonts = Arc::new(FontCatalogue::scan(&config.font_dir)?);
        let store = DirectoryStore::load(&config.template_dir)?;
        let compositor = Compositor::with_svg_pdf(fonts, config.pdf_timeout());
        Ok(Self::new(Arc::new(store), compositor, config.currency()))
    }

    pub fn fonts(&self) -> &FontCatalogue {
        self.compositor.fonts()
    }
}
