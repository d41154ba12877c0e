// Metadata records for embeddings and topic models.
//
// Each embedding or topic model on disk is described by a JSON sidecar
// ("<name>.meta") with a "type" field. The records below are the typed form of
// those sidecars: mandatory fields are checked once in the constructor and
// optional ones are filled with defaults, so nothing downstream has to probe
// for missing keys.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ValidationError;

const UNKNOWN: &str = "unknown";

fn unknown() -> String {
    UNKNOWN.to_string()
}

/// Which algorithm produced an embedding or topic model, and with what settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmInfo {
    #[serde(default = "unknown")]
    pub id: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

impl Default for AlgorithmInfo {
    fn default() -> Self {
        Self {
            id: unknown(),
            parameters: Map::new(),
        }
    }
}

/// Files belonging to a topic model, relative to its sidecar's directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelFiles {
    /// Term rankings: a JSON list of ranked term lists, one per topic.
    #[serde(default)]
    pub ranks: Option<String>,
    #[serde(default)]
    pub partition: Option<String>,
    #[serde(default)]
    pub factors: Option<String>,
}

/// Sidecar contents shared by both record kinds before validation.
#[derive(Debug, Deserialize)]
struct RawMeta {
    #[serde(rename = "type")]
    kind: Option<String>,
    file: Option<String>,
    files: Option<ModelFiles>,
    #[serde(default = "unknown")]
    description: String,
    #[serde(default = "unknown")]
    corpus: String,
    #[serde(default)]
    algorithm: AlgorithmInfo,
    #[serde(default)]
    k: usize,
    #[serde(default)]
    dimensions: usize,
    #[serde(default)]
    documents: usize,
    #[serde(default)]
    terms: usize,
}

/// The kind of artifact a sidecar describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaKind {
    Embedding,
    TopicModel,
    Other,
}

/// Read just the "type" field of a sidecar.
pub fn meta_kind(data: &Value) -> Option<MetaKind> {
    let kind = data.as_object()?.get("type")?.as_str()?;
    Some(match kind {
        "embedding" => MetaKind::Embedding,
        "topic_model" => MetaKind::TopicModel,
        _ => MetaKind::Other,
    })
}

fn parse_raw(id: &str, data: Value, expected: &str) -> Result<RawMeta, ValidationError> {
    let invalid = |reason: String| ValidationError::InvalidMetadata {
        id: id.to_string(),
        reason,
    };
    if !data.is_object() {
        return Err(invalid("metadata is not a JSON object".to_string()));
    }
    let raw: RawMeta = serde_json::from_value(data).map_err(|e| invalid(e.to_string()))?;
    match raw.kind.as_deref() {
        None => Err(invalid("no type specified".to_string())),
        Some(kind) if kind != expected => Err(invalid(format!(
            "type is '{kind}', expected '{expected}'"
        ))),
        Some(_) => Ok(raw),
    }
}

/// Metadata describing a pretrained word embedding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbeddingMeta {
    pub id: String,
    pub description: String,
    pub algorithm: AlgorithmInfo,
    pub dimensions: usize,
    pub documents: usize,
    pub terms: usize,
    /// Vector file, relative to `base_dir`.
    pub file: String,
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl EmbeddingMeta {
    /// Validate a parsed sidecar. Requires `type == "embedding"` and `file`.
    pub fn from_json(id: &str, data: Value, base_dir: &Path) -> Result<Self, ValidationError> {
        let raw = parse_raw(id, data, "embedding")?;
        let file = raw.file.ok_or_else(|| ValidationError::InvalidMetadata {
            id: id.to_string(),
            reason: "no file path specified".to_string(),
        })?;
        Ok(Self {
            id: id.to_string(),
            description: raw.description,
            algorithm: raw.algorithm,
            dimensions: raw.dimensions,
            documents: raw.documents,
            terms: raw.terms,
            file,
            base_dir: base_dir.to_path_buf(),
        })
    }

    /// Absolute path to the vector file.
    pub fn file_path(&self) -> PathBuf {
        self.base_dir.join(&self.file)
    }
}

/// Metadata describing a fitted topic model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicModelMeta {
    pub id: String,
    pub corpus: String,
    pub algorithm: AlgorithmInfo,
    pub k: usize,
    pub documents: usize,
    pub terms: usize,
    pub files: ModelFiles,
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl TopicModelMeta {
    /// Validate a parsed sidecar. Requires `type == "topic_model"` and `files`.
    pub fn from_json(id: &str, data: Value, base_dir: &Path) -> Result<Self, ValidationError> {
        let raw = parse_raw(id, data, "topic_model")?;
        let files = raw.files.ok_or_else(|| ValidationError::InvalidMetadata {
            id: id.to_string(),
            reason: "no file paths specified".to_string(),
        })?;
        Ok(Self {
            id: id.to_string(),
            corpus: raw.corpus,
            algorithm: raw.algorithm,
            k: raw.k,
            documents: raw.documents,
            terms: raw.terms,
            files,
            base_dir: base_dir.to_path_buf(),
        })
    }

    /// Metadata for a model built in memory, with no files behind it.
    pub fn in_memory(id: &str, corpus: &str, k: usize) -> Self {
        Self {
            id: id.to_string(),
            corpus: corpus.to_string(),
            algorithm: AlgorithmInfo::default(),
            k,
            documents: 0,
            terms: 0,
            files: ModelFiles::default(),
            base_dir: PathBuf::new(),
        }
    }

    /// Absolute path to the term rankings file, if one is listed.
    pub fn ranks_path(&self) -> Option<PathBuf> {
        self.files.ranks.as_ref().map(|ranks| self.base_dir.join(ranks))
    }
}
