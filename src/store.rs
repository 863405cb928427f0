//! # Template Store
//!
//! Templates are created and validated elsewhere; the renderer only reads
//! them. [`DirectoryStore`] loads every `*.json` file of a directory once and
//! serves immutable snapshots afterwards.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::error::EtiquetaError;
use crate::template::StickerTemplate;

/// Read access to persisted templates.
pub trait TemplateStore: Send + Sync {
    fn get(&self, id: i64) -> Option<Arc<StickerTemplate>>;

    /// All templates, ordered by id.
    fn list(&self) -> Vec<Arc<StickerTemplate>>;

    /// Like [`get`](Self::get), as an error for callers that need one.
    fn require(&self, id: i64) -> Result<Arc<StickerTemplate>, EtiquetaError> {
        self.get(id).ok_or(EtiquetaError::TemplateNotFound(id))
    }
}

/// Templates loaded from disk at startup.
#[derive(Debug, Default)]
pub struct DirectoryStore {
    templates: BTreeMap<i64, Arc<StickerTemplate>>,
}

impl DirectoryStore {
    /// Load `dir/*.json`. Files that fail to parse or validate are skipped;
    /// on duplicate ids the first file in name order wins.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, EtiquetaError> {
        let dir = dir.as_ref();
        let mut paths: Vec<_> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && p.extension().is_some_and(|e| e == "json"))
            .collect();
        paths.sort();

        let mut templates = Vec::with_capacity(paths.len());
        for path in paths {
            let parsed = fs::read_to_string(&path)
                .map_err(EtiquetaError::from)
                .and_then(|json| StickerTemplate::from_json(&json));
            match parsed {
                Ok(template) => templates.push(template),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping template file");
                }
            }
        }

        let store = Self::from_templates(templates);
        tracing::info!(dir = %dir.display(), templates = store.len(), "template store loaded");
        Ok(store)
    }

    pub fn from_templates(templates: impl IntoIterator<Item = StickerTemplate>) -> Self {
        let mut map = BTreeMap::new();
        for template in templates {
            let id = template.id();
            if map.contains_key(&id) {
                tracing::warn!(id, name = template.name(), "duplicate template id ignored");
                continue;
            }
            map.insert(id, Arc::new(template));
        }
        Self { templates: map }
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl TemplateStore for DirectoryStore {
    fn get(&self, id: i64) -> Option<Arc<StickerTemplate>> {
        self.templates.get(&id).cloned()
    }

    fn list(&self) -> Vec<Arc<StickerTemplate>> {
        self.templates.values().cloned().collect()
    }
}
