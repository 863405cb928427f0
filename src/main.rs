//! # Etiqueta CLI
//!
//! Command-line interface for sticker rendering.
//!
//! ## Usage
//!
//! ```bash
//! # Run the HTTP API
//! etiqueta serve --listen 0.0.0.0:8080 --templates ./templates --fonts ./fonts
//!
//! # Render one sticker to PDF (falls back to SVG if PDF output fails)
//! etiqueta render label.json item.json --output label.pdf
//!
//! # Render the SVG document only
//! etiqueta render label.json item.json --svg
//!
//! # List system and project fonts
//! etiqueta fonts --dir ./fonts
//! ```

use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use etiqueta::{
    EtiquetaError,
    compose::{Compositor, DEFAULT_PDF_TIMEOUT, PayloadKind, single_filename},
    config::ServerConfig,
    fonts::FontCatalogue,
    placeholder::{CurrencyFormat, EntityPayload},
    render, server,
    template::StickerTemplate,
};

/// Etiqueta - Sticker template renderer
#[derive(Parser, Debug)]
#[command(name = "etiqueta")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API
    Serve(ServerConfig),

    /// Render a template for one entity
    Render {
        /// Template JSON file
        template: PathBuf,

        /// Entity JSON file: a typed record or a flat token map
        entity: PathBuf,

        /// Output file (defaults to the suggested filename)
        #[arg(long, short, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Write the SVG document instead of composing a PDF
        #[arg(long)]
        svg: bool,

        /// Project font directory
        #[arg(long, env = "ETIQUETA_FONTS", default_value = "fonts")]
        fonts: PathBuf,
    },

    /// List available fonts
    Fonts {
        /// Project font directory
        #[arg(long, env = "ETIQUETA_FONTS", default_value = "fonts")]
        dir: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("etiqueta=info,tower_http=info")),
        )
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), EtiquetaError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(config) => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(server::serve(config))?;
        }
        Commands::Render {
            template,
            entity,
            output,
            svg,
            fonts,
        } => render_file(&template, &entity, output, svg, &fonts)?,
        Commands::Fonts { dir } => {
            let list = FontCatalogue::scan(&dir)?.list_fonts();
            println!("System fonts:");
            for name in &list.system {
                println!("  {}", name);
            }
            println!("\nProject fonts ({}):", dir.display());
            if list.project.is_empty() {
                println!("  (none)");
            }
            for name in &list.project {
                if list.web_only.contains(name) {
                    println!("  {} (web only, substituted in PDF)", name);
                } else {
                    println!("  {}", name);
                }
            }
        }
    }

    Ok(())
}

fn render_file(
    template_path: &Path,
    entity_path: &Path,
    output: Option<PathBuf>,
    svg_only: bool,
    font_dir: &Path,
) -> Result<(), EtiquetaError> {
    let template = StickerTemplate::from_json(&fs::read_to_string(template_path)?)?;
    let entity: EntityPayload = serde_json::from_str(&fs::read_to_string(entity_path)?)?;
    let (context, identifier) = entity.bind(template.template_type(), &CurrencyFormat::default())?;
    let fonts = Arc::new(FontCatalogue::scan(font_dir)?);

    let (bytes, suggested) = if svg_only {
        let doc = render::render(&template, &context, &fonts);
        let name = single_filename(&template, &identifier, PayloadKind::Svg);
        (doc.into_bytes(), name)
    } else {
        let compositor = Compositor::with_svg_pdf(fonts, DEFAULT_PDF_TIMEOUT);
        let payload = compositor.compose_single(&template, &context, &identifier);
        (payload.bytes, payload.filename)
    };

    let path = output.unwrap_or_else(|| PathBuf::from(suggested));
    fs::write(&path, &bytes)?;
    println!("Wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}
