// Core directory registry — finds embedding and topic model sidecars and
// hands out loaded embeddings and models.
//
// A sidecar's id is its path relative to the core directory, minus the
// metadata extension ("bbc/nmf_k05/bbc_k05_001.meta" -> "bbc/nmf_k05/bbc_k05_001").
// Embeddings are loaded lazily on first use and cached for the registry's
// lifetime, so every validation against the same embedding shares one
// similarity cache.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::meta::{meta_kind, EmbeddingMeta, MetaKind, TopicModelMeta};
use super::model::TopicModel;
use crate::config::Config;
use crate::embedding::loader::load_embedding;
use crate::embedding::Embedding;

/// Metadata and loaded artifacts for one core directory.
pub struct CoreRegistry {
    core_dir: PathBuf,
    extension: String,
    top_terms: usize,
    extended_top_terms: usize,
    embedding_meta: HashMap<String, EmbeddingMeta>,
    model_meta: HashMap<String, TopicModelMeta>,
    embedding_cache: HashMap<String, Arc<Embedding>>,
}

impl CoreRegistry {
    /// Scan the configured core directory for metadata sidecars.
    pub fn open(config: &Config) -> Result<Self> {
        let mut registry = Self {
            core_dir: config.core_dir.clone(),
            extension: config.meta_extension.clone(),
            top_terms: config.top_terms,
            extended_top_terms: config.extended_top_terms,
            embedding_meta: HashMap::new(),
            model_meta: HashMap::new(),
            embedding_cache: HashMap::new(),
        };
        registry.scan()?;
        Ok(registry)
    }

    pub fn core_dir(&self) -> &Path {
        &self.core_dir
    }

    fn scan(&mut self) -> Result<()> {
        if !self.core_dir.is_dir() {
            anyhow::bail!(
                "Core directory not found: {}\nSet TOPICSCAN_DIR to the directory holding your .meta files.",
                self.core_dir.display()
            );
        }
        info!(dir = %self.core_dir.display(), "Scanning core directory");

        let mut paths = Vec::new();
        collect_meta_files(&self.core_dir, &self.extension, &mut paths)?;

        for path in paths {
            debug!(path = %path.display(), "Checking metadata");
            if let Err(e) = self.register(&path) {
                warn!(path = %path.display(), error = %e, "Skipping metadata file");
            }
        }

        info!(
            embeddings = self.embedding_meta.len(),
            models = self.model_meta.len(),
            "Found metadata"
        );
        Ok(())
    }

    fn register(&mut self, path: &Path) -> Result<()> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let data: Value = serde_json::from_str(&text)
            .with_context(|| format!("Invalid JSON in {}", path.display()))?;

        let id = self.meta_id(path)?;
        let base_dir = path.parent().unwrap_or(self.core_dir.as_path()).to_path_buf();

        match meta_kind(&data) {
            Some(MetaKind::Embedding) => {
                let meta = EmbeddingMeta::from_json(&id, data, &base_dir)?;
                self.embedding_meta.insert(id, meta);
            }
            Some(MetaKind::TopicModel) => {
                let meta = TopicModelMeta::from_json(&id, data, &base_dir)?;
                self.model_meta.insert(id, meta);
            }
            Some(MetaKind::Other) => info!(path = %path.display(), "Unknown metadata type"),
            None => debug!(path = %path.display(), "Not a metadata object"),
        }
        Ok(())
    }

    fn meta_id(&self, path: &Path) -> Result<String> {
        let relative = path
            .strip_prefix(&self.core_dir)
            .with_context(|| format!("{} is outside the core directory", path.display()))?;
        let relative = relative.to_string_lossy().replace('\\', "/");
        Ok(relative
            .strip_suffix(self.extension.as_str())
            .unwrap_or(&relative)
            .to_string())
    }

    /// Sorted embedding ids.
    pub fn embedding_ids(&self) -> Vec<String> {
        sorted_keys(&self.embedding_meta)
    }

    /// Sorted topic model ids.
    pub fn topic_model_ids(&self) -> Vec<String> {
        sorted_keys(&self.model_meta)
    }

    pub fn embedding_count(&self) -> usize {
        self.embedding_meta.len()
    }

    pub fn topic_model_count(&self) -> usize {
        self.model_meta.len()
    }

    pub fn embedding_metadata(&self, id: &str) -> Option<&EmbeddingMeta> {
        self.embedding_meta.get(id)
    }

    pub fn topic_model_metadata(&self, id: &str) -> Option<&TopicModelMeta> {
        self.model_meta.get(id)
    }

    /// The embedding with this id, loading it on first use.
    ///
    /// Returns `None` for unknown ids and for embeddings that fail to load;
    /// the failure is logged and callers degrade to empty results.
    pub fn embedding(&mut self, id: &str) -> Option<Arc<Embedding>> {
        if let Some(cached) = self.embedding_cache.get(id) {
            debug!(embedding = id, "Using cached embedding");
            return Some(Arc::clone(cached));
        }

        let meta = self.embedding_meta.get(id)?;
        let path = meta.file_path();
        info!(embedding = id, path = %path.display(), "Loading word embedding");

        match load_embedding(id, &path) {
            Ok(embedding) => {
                let embedding = Arc::new(embedding);
                self.embedding_cache
                    .insert(id.to_string(), Arc::clone(&embedding));
                Some(embedding)
            }
            Err(e) => {
                warn!(
                    embedding = id,
                    path = %path.display(),
                    error = %e,
                    "Failed to load word embedding"
                );
                None
            }
        }
    }

    /// Load every registered embedding up front. Returns how many loaded.
    pub fn preload_embeddings(&mut self) -> usize {
        info!("Preloading word embeddings");
        for id in self.embedding_ids() {
            let _ = self.embedding(&id);
        }
        info!(loaded = self.embedding_cache.len(), "Preloaded word embeddings");
        self.embedding_cache.len()
    }

    /// The topic model with this id, with its term rankings if they load.
    pub fn topic_model(&self, id: &str) -> Option<TopicModel> {
        let meta = self.model_meta.get(id)?.clone();
        let rankings = match meta.ranks_path() {
            Some(path) => match load_term_rankings(&path) {
                Ok(rankings) => Some(rankings),
                Err(e) => {
                    warn!(model = id, error = %e, "Failed to load term rankings");
                    None
                }
            },
            None => {
                warn!(model = id, "No term rankings file listed");
                None
            }
        };
        Some(
            TopicModel::new(meta, rankings)
                .with_top_terms(self.top_terms, self.extended_top_terms),
        )
    }
}

/// Read a JSON list of ranked term lists.
pub fn load_term_rankings(path: &Path) -> Result<Vec<Vec<String>>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read term rankings {}", path.display()))?;
    let rankings: Vec<Vec<String>> = serde_json::from_str(&text)
        .with_context(|| format!("Invalid term rankings in {}", path.display()))?;
    debug!(path = %path.display(), topics = rankings.len(), "Loaded term rankings");
    Ok(rankings)
}

fn collect_meta_files(dir: &Path, extension: &str, out: &mut Vec<PathBuf>) -> Result<()> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            collect_meta_files(&path, extension, out)?;
        } else if path.to_string_lossy().ends_with(extension) {
            out.push(path);
        }
    }
    Ok(())
}

fn sorted_keys<V>(map: &HashMap<String, V>) -> Vec<String> {
    let mut keys: Vec<String> = map.keys().cloned().collect();
    keys.sort();
    keys
}
