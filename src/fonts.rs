//! # Font Catalogue
//!
//! Two kinds of fonts can be named by a text element:
//!
//! - **System fonts** (`system`, `Arial`, ...): referenced by name only and
//!   never embedded. The browser or PDF engine is expected to provide them.
//! - **Project fonts**: files in the font directory, grouped by base name.
//!   `Roboto-Bold.ttf` and `Roboto.woff2` are both listed as `Roboto`.
//!
//! When a project font is used, the renderer asks [`FontCatalogue::embed`]
//! for its bytes and inlines them as a base64 `@font-face`. Files are looked
//! up in format order woff2, woff, ttf, otf; the first match wins.
//!
//! The catalogue is built once at startup and shared by reference. Font
//! bytes are cached in memory by (name, format); fonts are deployment
//! assets, so the cache is never invalidated.
//!
//! ## Example
//!
//! ```no_run
//! use etiqueta::fonts::FontCatalogue;
//!
//! let catalogue = FontCatalogue::scan("static/fonts")?;
//! let list = catalogue.list_fonts();
//! println!("{} project fonts", list.project.len());
//! if let Some(font) = catalogue.embed("Roboto") {
//!     println!("Roboto as {}", font.format.css_format());
//! }
//! # Ok::<(), etiqueta::EtiquetaError>(())
//! ```

use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::error::EtiquetaError;

/// Font faces assumed to exist wherever the label is displayed or printed.
pub const SYSTEM_FONTS: &[&str] = &[
    "system",
    "Arial",
    "Helvetica",
    "Times New Roman",
    "Courier New",
    "Verdana",
    "Georgia",
];

/// Font used when an element names nothing usable.
pub const FALLBACK_FAMILY: &str = "sans-serif";

/// Font file formats, in lookup order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum FontFormat {
    Woff2,
    Woff,
    TrueType,
    OpenType,
}

impl FontFormat {
    pub const LOOKUP_ORDER: [FontFormat; 4] = [
        FontFormat::Woff2,
        FontFormat::Woff,
        FontFormat::TrueType,
        FontFormat::OpenType,
    ];

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "woff2" => Some(FontFormat::Woff2),
            "woff" => Some(FontFormat::Woff),
            "ttf" => Some(FontFormat::TrueType),
            "otf" => Some(FontFormat::OpenType),
            _ => None,
        }
    }

    /// Value for the CSS `format()` hint.
    pub fn css_format(&self) -> &'static str {
        match self {
            FontFormat::Woff2 => "woff2",
            FontFormat::Woff => "woff",
            FontFormat::TrueType => "truetype",
            FontFormat::OpenType => "opentype",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            FontFormat::Woff2 => "font/woff2",
            FontFormat::Woff => "font/woff",
            FontFormat::TrueType => "font/ttf",
            FontFormat::OpenType => "font/otf",
        }
    }

    /// Formats the PDF engine's font database can parse.
    pub fn is_sfnt(&self) -> bool {
        matches!(self, FontFormat::TrueType | FontFormat::OpenType)
    }
}

/// Font bytes ready to be inlined into a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedFont {
    pub family: String,
    pub format: FontFormat,
    pub data_base64: String,
}

impl EmbeddedFont {
    /// `@font-face` rule with the font inlined as a data URL.
    pub fn css_rule(&self) -> String {
        format!(
            "@font-face {{ font-family: '{}'; src: url(data:{};base64,{}) format('{}'); }}",
            self.family,
            self.format.mime_type(),
            self.data_base64,
            self.format.css_format()
        )
    }
}

/// Fonts offered to the template editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FontList {
    pub system: Vec<String>,
    pub project: Vec<String>,
    /// Project families with no TrueType/OpenType file. They preview in the
    /// browser but the PDF engine substitutes them.
    pub web_only: Vec<String>,
}

#[derive(Debug, Clone)]
struct FontFile {
    /// File stem, e.g. `Roboto-Bold`.
    stem: String,
    format: FontFormat,
    path: PathBuf,
}

/// Case-insensitive check against [`SYSTEM_FONTS`] and generic CSS families.
pub fn is_system_font(name: &str) -> bool {
    let name = name.trim();
    name.is_empty()
        || SYSTEM_FONTS.iter().any(|f| f.eq_ignore_ascii_case(name))
        || ["default", "sans-serif", "serif", "monospace"]
            .iter()
            .any(|f| f.eq_ignore_ascii_case(name))
}

/// Base family name: the stem with an optional `-Style` suffix removed.
fn family_of(stem: &str) -> &str {
    match stem.rsplit_once('-') {
        Some((base, style)) if !base.is_empty() && !style.is_empty() => base,
        _ => stem,
    }
}

/// System fonts plus the project fonts found in one directory.
#[derive(Debug, Default)]
pub struct FontCatalogue {
    /// Family name to its files, sorted by stem.
    families: BTreeMap<String, Vec<FontFile>>,
    cache: RwLock<HashMap<(String, FontFormat), Arc<EmbeddedFont>>>,
}

impl FontCatalogue {
    /// A catalogue with system fonts only.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Scan `dir` for font files. A missing directory yields an empty
    /// project list rather than an error.
    pub fn scan(dir: impl AsRef<Path>) -> Result<Self, EtiquetaError> {
        let dir = dir.as_ref();
        let mut families: BTreeMap<String, Vec<FontFile>> = BTreeMap::new();

        if dir.is_dir() {
            for entry in fs::read_dir(dir)? {
                let path = entry?.path();
                if !path.is_file() {
                    continue;
                }
                let Some(format) = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .and_then(FontFormat::from_extension)
                else {
                    continue;
                };
                let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };
                families
                    .entry(family_of(stem).to_string())
                    .or_default()
                    .push(FontFile {
                        stem: stem.to_string(),
                        format,
                        path: path.clone(),
                    });
            }
        } else {
            tracing::warn!(dir = %dir.display(), "font directory not found, project fonts disabled");
        }

        for files in families.values_mut() {
            files.sort_by(|a, b| a.stem.cmp(&b.stem).then(a.format.cmp(&b.format)));
        }

        tracing::info!(
            dir = %dir.display(),
            families = families.len(),
            "font catalogue ready"
        );

        Ok(Self {
            families,
            cache: RwLock::new(HashMap::new()),
        })
    }

    /// System and project font names, project names de-duplicated and sorted.
    pub fn list_fonts(&self) -> FontList {
        FontList {
            system: SYSTEM_FONTS.iter().map(|s| s.to_string()).collect(),
            project: self.families.keys().cloned().collect(),
            web_only: self.web_only_families().into_iter().collect(),
        }
    }

    /// Best file for `name`: the plain or `-Regular` face first, then any
    /// style, each pass in woff2, woff, ttf, otf order.
    fn locate(&self, name: &str) -> Option<&FontFile> {
        let files = self.families.get(name)?;
        let regular = format!("{}-Regular", name);

        let preferred = FontFormat::LOOKUP_ORDER.iter().find_map(|format| {
            files
                .iter()
                .find(|f| f.format == *format && (f.stem == name || f.stem == regular))
        });
        preferred.or_else(|| {
            FontFormat::LOOKUP_ORDER
                .iter()
                .find_map(|format| files.iter().find(|f| f.format == *format))
        })
    }

    /// Base64 bytes of a project font, or `None` when it cannot be found
    /// or read. Callers keep the name and let the viewer substitute.
    pub fn embed(&self, name: &str) -> Option<Arc<EmbeddedFont>> {
        let file = self.locate(name)?;
        let key = (name.to_string(), file.format);

        if let Ok(cache) = self.cache.read()
            && let Some(font) = cache.get(&key)
        {
            return Some(Arc::clone(font));
        }

        let bytes = match fs::read(&file.path) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(font = name, path = %file.path.display(), error = %e, "failed to read font file");
                return None;
            }
        };
        tracing::debug!(font = name, format = ?file.format, bytes = bytes.len(), "embedding font");

        let font = Arc::new(EmbeddedFont {
            family: name.to_string(),
            format: file.format,
            data_base64: STANDARD.encode(&bytes),
        });
        if let Ok(mut cache) = self.cache.write() {
            cache.insert(key, Arc::clone(&font));
        }
        Some(font)
    }

    /// Files the PDF engine can load (TrueType / OpenType), all styles.
    pub fn sfnt_files(&self) -> Vec<PathBuf> {
        self.families
            .values()
            .flatten()
            .filter(|f| f.format.is_sfnt())
            .map(|f| f.path.clone())
            .collect()
    }

    /// Project families that only ship web formats.
    pub fn web_only_families(&self) -> BTreeSet<String> {
        self.families
            .iter()
            .filter(|(_, files)| !files.iter().any(|f| f.format.is_sfnt()))
            .map(|(name, _)| name.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn font_dir(files: &[(&str, &[u8])]) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (name, bytes) in files {
            fs::write(dir.path().join(name), bytes).unwrap();
        }
        dir
    }

    #[test]
    fn test_list_groups_styles() {
        let dir = font_dir(&[
            ("Roboto-Regular.ttf", b"r"),
            ("Roboto-Bold.ttf", b"b"),
            ("Roboto.woff2", b"w"),
            ("OpenDyslexic.otf", b"o"),
            ("readme.txt", b"not a font"),
        ]);
        let catalogue = FontCatalogue::scan(dir.path()).unwrap();
        let list = catalogue.list_fonts();
        assert_eq!(list.project, vec!["OpenDyslexic".to_string(), "Roboto".to_string()]);
        assert!(list.system.contains(&"system".to_string()));
    }

    #[test]
    fn test_embed_prefers_woff2() {
        let dir = font_dir(&[
            ("Roboto-Regular.ttf", b"ttf-bytes"),
            ("Roboto.woff2", b"woff2-bytes"),
        ]);
        let catalogue = FontCatalogue::scan(dir.path()).unwrap();
        let font = catalogue.embed("Roboto").unwrap();
        assert_eq!(font.format, FontFormat::Woff2);
        assert_eq!(font.data_base64, STANDARD.encode(b"woff2-bytes"));
        assert!(font.css_rule().contains("format('woff2')"));
    }

    #[test]
    fn test_embed_falls_back_to_styled_face() {
        let dir = font_dir(&[("Inter-Bold.otf", b"bold")]);
        let catalogue = FontCatalogue::scan(dir.path()).unwrap();
        let font = catalogue.embed("Inter").unwrap();
        assert_eq!(font.format, FontFormat::OpenType);
        assert_eq!(font.format.css_format(), "opentype");
    }

    #[test]
    fn test_embed_unknown_is_none() {
        let catalogue = FontCatalogue::empty();
        assert!(catalogue.embed("Nope").is_none());
        assert!(catalogue.list_fonts().project.is_empty());
    }

    #[test]
    fn test_embed_is_cached() {
        let dir = font_dir(&[("Mono.ttf", b"first")]);
        let catalogue = FontCatalogue::scan(dir.path()).unwrap();
        let first = catalogue.embed("Mono").unwrap();

        // Deployment assets: later edits on disk are not picked up.
        fs::write(dir.path().join("Mono.ttf"), b"second").unwrap();
        let second = catalogue.embed("Mono").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_missing_dir_is_empty() {
        let catalogue = FontCatalogue::scan("/definitely/not/here").unwrap();
        assert!(catalogue.list_fonts().project.is_empty());
    }

    #[test]
    fn test_system_fonts() {
        assert!(is_system_font("arial"));
        assert!(is_system_font("system"));
        assert!(is_system_font("sans-serif"));
        assert!(!is_system_font("Roboto"));
    }

    #[test]
    fn test_family_of() {
        assert_eq!(family_of("Roboto-Bold"), "Roboto");
        assert_eq!(family_of("Roboto"), "Roboto");
        assert_eq!(family_of("Source-Sans-Italic"), "Source-Sans");
        assert_eq!(family_of("-Odd"), "-Odd");
    }

    #[test]
    fn test_sfnt_and_web_only() {
        let dir = font_dir(&[("Web.woff2", b"w"), ("Desk-Regular.ttf", b"d")]);
        let catalogue = FontCatalogue::scan(dir.path()).unwrap();
        assert_eq!(catalogue.sfnt_files().len(), 1);
        assert!(catalogue.web_only_families().contains("Web"));
        assert_eq!(catalogue.list_fonts().web_only, vec!["Web".to_string()]);
    }
}
