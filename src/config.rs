//! Runtime configuration for the HTTP service.
//!
//! Every option is a `serve` flag with an environment variable fallback.
//! The mm→px factor and canvas bounds live in [`crate::units`] and are not
//! configurable.

use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

use crate::compose::DEFAULT_PDF_TIMEOUT;
use crate::placeholder::CurrencyFormat;

/// Server configuration.
#[derive(Debug, Clone, Args)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:8080")
    #[arg(long = "listen", env = "ETIQUETA_LISTEN", default_value = "127.0.0.1:8080")]
    pub listen_addr: String,

    /// Directory of template JSON files
    #[arg(long = "templates", env = "ETIQUETA_TEMPLATES", default_value = "templates")]
    pub template_dir: PathBuf,

    /// Directory of project font files (woff2, woff, ttf, otf)
    #[arg(long = "fonts", env = "ETIQUETA_FONTS", default_value = "fonts")]
    pub font_dir: PathBuf,

    /// Seconds the PDF engine may take before the SVG is returned instead
    #[arg(
        long = "pdf-timeout",
        env = "ETIQUETA_PDF_TIMEOUT_SECS",
        default_value_t = DEFAULT_PDF_TIMEOUT.as_secs()
    )]
    pub pdf_timeout_secs: u64,

    /// Currency symbol for {Price}
    #[arg(long = "currency", env = "ETIQUETA_CURRENCY", default_value = "$")]
    pub currency_symbol: String,

    /// Decimal places for {Price}
    #[arg(long = "currency-decimals", env = "ETIQUETA_CURRENCY_DECIMALS", default_value_t = 2)]
    pub currency_decimals: usize,
}

impl ServerConfig {
    pub fn pdf_timeout(&self) -> Duration {
        Duration::from_secs(self.pdf_timeout_secs)
    }

    pub fn currency(&self) -> CurrencyFormat {
        CurrencyFormat {
            symbol: self.currency_symbol.clone(),
            decimal_places: self.currency_decimals,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        let currency = CurrencyFormat::default();
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            template_dir: PathBuf::from("templates"),
            font_dir: PathBuf::from("fonts"),
            pdf_timeout_secs: DEFAULT_PDF_TIMEOUT.as_secs(),
            currency_symbol: currency.symbol,
            currency_decimals: currency.decimal_places,
        }
    }
}
