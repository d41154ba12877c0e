// Composition tests — verifying that the layers chain together correctly.
//
// These tests exercise the data flow from files on disk to report tables:
//   core dir -> CoreRegistry -> Embedding + TopicModel -> TopicValidator / ModelValidator
// using a temporary core directory with a word2vec text file, metadata
// sidecars and term ranking files.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use topicscan::config::Config;
use topicscan::output::truncate_chars;
use topicscan::report::{ModelValidator, TopicValidator};
use topicscan::topics::registry::CoreRegistry;
use topicscan::validation::MeasureId;

const VECTORS: &str = "\
8 3
goal 1.0 0.1 0.0
match 0.9 0.2 0.0
league 0.8 0.1 0.1
vote 0.0 1.0 0.1
party 0.1 0.9 0.0
poll 0.0 0.8 0.2
film 0.0 0.1 1.0
actor 0.1 0.0 0.9
";

fn write(dir: &Path, name: &str, contents: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// Core directory with one embedding and three topic models, one of which
/// points at a rankings file that doesn't exist.
fn build_core_dir(dir: &Path) {
    write(dir, "embeddings/news.txt", VECTORS);
    write(
        dir,
        "embeddings/news.meta",
        r#"{"type": "embedding", "file": "news.txt", "description": "toy news vectors",
            "algorithm": {"id": "word2vec", "parameters": {"dimensions": 3}}, "dimensions": 3}"#,
    );

    write(
        dir,
        "news/good_k03.meta",
        r#"{"type": "topic_model", "corpus": "news", "k": 3,
            "algorithm": {"id": "nmf"}, "files": {"ranks": "good_k03.json"}}"#,
    );
    write(
        dir,
        "news/good_k03.json",
        r#"[["goal", "match", "league", "poll"],
            ["vote", "party", "poll", "goal"],
            ["film", "actor", "unseen", "goal"]]"#,
    );

    write(
        dir,
        "news/mixed_k02.meta",
        r#"{"type": "topic_model", "corpus": "news", "k": 2, "files": {"ranks": "mixed_k02.json"}}"#,
    );
    write(
        dir,
        "news/mixed_k02.json",
        r#"[["goal", "vote", "film"], ["match", "party", "actor"]]"#,
    );

    write(
        dir,
        "news/lost_k04.meta",
        r#"{"type": "topic_model", "corpus": "news", "k": 4, "files": {"ranks": "lost_k04.json"}}"#,
    );
}

fn open(dir: &Path, top_terms: usize) -> CoreRegistry {
    let config = Config {
        core_dir: dir.to_path_buf(),
        top_terms,
        ..Config::default()
    };
    CoreRegistry::open(&config).unwrap()
}

// ============================================================
// Chain: registry -> embedding + model -> topic tables
// ============================================================

#[test]
fn registry_feeds_validation_table() {
    let tmp = tempfile::tempdir().unwrap();
    build_core_dir(tmp.path());
    let mut registry = open(tmp.path(), 3);

    assert_eq!(registry.embedding_ids(), vec!["embeddings/news"]);
    assert_eq!(registry.topic_model_count(), 3);

    let embedding = registry.embedding("embeddings/news").unwrap();
    let model = registry.topic_model("news/good_k03").unwrap();
    let descriptors = model.default_descriptors().unwrap();
    assert_eq!(descriptors[0], vec!["goal", "match", "league"]);

    let rows = TopicValidator::default()
        .validation_table(Some(&descriptors), Some(&embedding), &MeasureId::ALL)
        .unwrap();
    assert_eq!(rows.len(), 3);

    // The sports and politics topics are tight; the third one has only two
    // known terms but is still well-defined.
    let coherence: Vec<f64> = rows
        .iter()
        .map(|r| r.score(MeasureId::Coherence).unwrap())
        .collect();
    assert!(coherence[0] > 0.9);
    assert!(coherence[1] > 0.9);
    assert!(coherence[2] > 0.9);
}

#[test]
fn in_vocabulary_descriptors_skip_unknown_terms() {
    let tmp = tempfile::tempdir().unwrap();
    build_core_dir(tmp.path());
    let mut registry = open(tmp.path(), 3);

    let embedding = registry.embedding("embeddings/news").unwrap();
    let model = registry.topic_model("news/good_k03").unwrap();

    let plain = model.default_descriptors().unwrap();
    assert_eq!(plain[2], vec!["film", "actor", "unseen"]);

    let filled = model.in_vocabulary_descriptors(&embedding).unwrap();
    assert_eq!(filled[2], vec!["film", "actor", "goal"]);
}

#[test]
fn coherent_model_separates_better_than_mixed_model() {
    let tmp = tempfile::tempdir().unwrap();
    build_core_dir(tmp.path());
    let mut registry = open(tmp.path(), 3);
    let embedding = registry.embedding("embeddings/news").unwrap();

    let good = registry.topic_model("news/good_k03").unwrap();
    let mixed = registry.topic_model("news/mixed_k02").unwrap();
    let rows = ModelValidator::default()
        .cross_model_table(&[good, mixed], Some(&embedding), &MeasureId::ALL)
        .unwrap();

    let good_row = &rows[0];
    let mixed_row = &rows[1];
    assert!(
        good_row.score(MeasureId::Coherence).unwrap()
            > mixed_row.score(MeasureId::Coherence).unwrap()
    );
    assert!(
        good_row.score(MeasureId::Silhouette).unwrap()
            > mixed_row.score(MeasureId::Silhouette).unwrap()
    );
}

#[test]
fn cross_model_skips_model_with_missing_rankings() {
    let tmp = tempfile::tempdir().unwrap();
    build_core_dir(tmp.path());
    let mut registry = open(tmp.path(), 3);
    let embedding = registry.embedding("embeddings/news").unwrap();

    let models: Vec<_> = registry
        .topic_model_ids()
        .iter()
        .filter_map(|id| registry.topic_model(id))
        .collect();
    assert_eq!(models.len(), 3);

    let rows = ModelValidator::default()
        .cross_model_table(&models, Some(&embedding), &[MeasureId::Coherence])
        .unwrap();
    assert_eq!(rows.len(), 2);
    let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["news/good_k03", "news/mixed_k02"]);
    assert!(rows.iter().all(|r| r.corpus == "news"));
}

#[test]
fn missing_embedding_file_degrades_to_empty_tables() {
    let tmp = tempfile::tempdir().unwrap();
    build_core_dir(tmp.path());
    fs::remove_file(tmp.path().join("embeddings/news.txt")).unwrap();
    let mut registry = open(tmp.path(), 3);

    let embedding = registry.embedding("embeddings/news");
    assert!(embedding.is_none());

    let model = registry.topic_model("news/good_k03").unwrap();
    let descriptors = model.default_descriptors();
    let validator = TopicValidator::default();
    assert!(validator
        .validation_table(descriptors.as_deref(), embedding.as_deref(), &MeasureId::ALL)
        .unwrap()
        .is_empty());
    assert!(validator
        .topic_pair_table(descriptors.as_deref(), embedding.as_deref(), false)
        .unwrap()
        .is_empty());
    assert!(ModelValidator::default()
        .cross_model_table(&[model], embedding.as_deref(), &MeasureId::ALL)
        .unwrap()
        .is_empty());
}

#[test]
fn corrupt_embedding_header_degrades_to_empty_tables() {
    let tmp = tempfile::tempdir().unwrap();
    build_core_dir(tmp.path());
    write(
        tmp.path(),
        "embeddings/news.txt",
        "18446744073709551615 3\ngoal 1.0 0.1 0.0\n",
    );
    let mut registry = open(tmp.path(), 3);

    let embedding = registry.embedding("embeddings/news");
    assert!(embedding.is_none());

    let model = registry.topic_model("news/good_k03").unwrap();
    let descriptors = model.default_descriptors();
    assert!(TopicValidator::default()
        .validation_table(descriptors.as_deref(), embedding.as_deref(), &MeasureId::ALL)
        .unwrap()
        .is_empty());
}

#[test]
fn embedding_cache_shared_between_tables() {
    let tmp = tempfile::tempdir().unwrap();
    build_core_dir(tmp.path());
    let mut registry = open(tmp.path(), 3);

    let first = registry.embedding("embeddings/news").unwrap();
    let model = registry.topic_model("news/good_k03").unwrap();
    let descriptors = model.default_descriptors().unwrap();
    TopicValidator::default()
        .topic_pair_table(Some(&descriptors), Some(&first), true)
        .unwrap();
    let cached = first.cached_pairs();
    assert!(cached > 0);

    // A second lookup hands back the same provider, cache included
    let second = registry.embedding("embeddings/news").unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(second.cached_pairs(), cached);
}

#[test]
fn descriptor_listing_splits_extended_terms() {
    let tmp = tempfile::tempdir().unwrap();
    build_core_dir(tmp.path());
    let registry = open(tmp.path(), 2);

    let model = registry.topic_model("news/good_k03").unwrap();
    let rows = model.extended_descriptor_rows().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].topic, "01");
    assert_eq!(rows[0].descriptor, "goal, match");
    assert_eq!(rows[0].extended, "league, poll");
    assert_eq!(truncate_chars(&rows[1].descriptor, 4), "vote...");
}
