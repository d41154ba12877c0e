// Unit tests for the validation measures.
//
// Uses a table-backed vector space so every pairwise similarity is known
// exactly. Covers the worked two-topic scenario, score ranges, output length
// and order, idempotence, and the degenerate single-topic and
// out-of-vocabulary cases.

use std::collections::{HashMap, HashSet};

use topicscan::embedding::{Embedding, VectorSpace};
use topicscan::error::ValidationError;
use topicscan::validation::{
    build_measures, CoherenceScore, Descriptor, InternalExternalScore, MeasureId, MinMaxScore,
    TopicDifferenceScore, TopicSilhouetteScore, ValidationMeasure,
};

/// Similarities looked up from a table; unlisted in-vocabulary pairs score
/// `fallback`, and a term is always fully similar to itself.
struct TableSpace {
    vocab: HashSet<String>,
    table: HashMap<(String, String), f64>,
    fallback: f64,
}

impl TableSpace {
    fn new(vocab: &[&str], pairs: &[(&str, &str, f64)], fallback: f64) -> Self {
        let mut table = HashMap::new();
        for (a, b, sim) in pairs {
            table.insert((a.to_string(), b.to_string()), *sim);
            table.insert((b.to_string(), a.to_string()), *sim);
        }
        Self {
            vocab: vocab.iter().map(|t| t.to_string()).collect(),
            table,
            fallback,
        }
    }
}

impl VectorSpace for TableSpace {
    fn contains(&self, term: &str) -> bool {
        self.vocab.contains(term)
    }

    fn raw_similarity(&self, term1: &str, term2: &str) -> Option<f64> {
        if !self.contains(term1) || !self.contains(term2) {
            return None;
        }
        if term1 == term2 {
            return Some(1.0);
        }
        Some(
            self.table
                .get(&(term1.to_string(), term2.to_string()))
                .copied()
                .unwrap_or(self.fallback),
        )
    }

    fn most_similar(&self, _positive: &[&str], _n: usize) -> anyhow::Result<Vec<(String, f64)>> {
        Ok(Vec::new())
    }

    fn len(&self) -> usize {
        self.vocab.len()
    }
}

fn terms(words: &[&str]) -> Descriptor {
    words.iter().map(|w| w.to_string()).collect()
}

/// a-b = 0.8, every a/b x c/d pair = 0.2, c-d undefined (0).
fn scenario_embedding() -> Embedding {
    Embedding::new(
        "scenario",
        TableSpace::new(
            &["a", "b", "c", "d"],
            &[
                ("a", "b", 0.8),
                ("a", "c", 0.2),
                ("a", "d", 0.2),
                ("b", "c", 0.2),
                ("b", "d", 0.2),
            ],
            0.0,
        ),
    )
}

fn scenario_descriptors() -> Vec<Descriptor> {
    vec![terms(&["a", "b"]), terms(&["c", "d"])]
}

/// A richer space with three loosely separated topics and some noise.
fn noisy_embedding() -> Embedding {
    let vocab = [
        "goal", "match", "league", "vote", "party", "poll", "film", "actor", "oscar", "season",
    ];
    let pairs = [
        ("goal", "match", 0.7),
        ("goal", "league", 0.6),
        ("match", "league", 0.65),
        ("vote", "party", 0.72),
        ("vote", "poll", 0.8),
        ("party", "poll", 0.55),
        ("film", "actor", 0.75),
        ("film", "oscar", 0.6),
        ("actor", "oscar", 0.58),
        ("season", "league", 0.5),
        ("season", "film", 0.3),
        ("party", "film", -0.2),
        ("goal", "vote", 0.1),
    ];
    Embedding::new("noisy", TableSpace::new(&vocab, &pairs, 0.05))
}

fn noisy_descriptors() -> Vec<Descriptor> {
    vec![
        terms(&["goal", "match", "league", "season"]),
        terms(&["vote", "party", "poll"]),
        terms(&["film", "actor", "oscar", "season"]),
    ]
}

// ============================================================
// Worked scenario
// ============================================================

#[test]
fn scenario_coherence() {
    let emb = scenario_embedding();
    let measure = CoherenceScore::new(&emb);
    let scores = measure.evaluate_topics(&scenario_descriptors()).unwrap();
    assert!((scores[0] - 0.8).abs() < 1e-9);
    assert!(scores[1].abs() < 1e-9);
    assert!((measure.evaluate_model(&scenario_descriptors()).unwrap() - 0.4).abs() < 1e-9);
}

#[test]
fn scenario_topic_difference() {
    let emb = scenario_embedding();
    let measure = TopicDifferenceScore::new(&emb);
    let descriptors = scenario_descriptors();
    let model = measure.evaluate_model(&descriptors).unwrap();
    assert!((model - 0.8).abs() < 1e-9);

    // With two topics, each topic's only partner is the other one
    let scores = measure.evaluate_topics(&descriptors).unwrap();
    assert!((scores[0] - 0.8).abs() < 1e-9);
    assert!((scores[1] - 0.8).abs() < 1e-9);
}

#[test]
fn scenario_internal_external() {
    let emb = scenario_embedding();
    let measure = InternalExternalScore::new(&emb);
    let scores = measure.evaluate_topics(&scenario_descriptors()).unwrap();
    // topic 1: 0.8 / (0.8 + 0.2)
    assert!((scores[0] - 0.8).abs() < 1e-9);
    // topic 2: 0 / (0 + 0.2)
    assert!(scores[1].abs() < 1e-9);
}

#[test]
fn scenario_min_max_uses_product_denominator() {
    let emb = scenario_embedding();
    let measure = MinMaxScore::new(&emb);
    let d = scenario_descriptors();

    // raw(1,1) = mean(1, .8, .8, 1) = 0.9; raw(2,2) = mean(1, 0, 0, 1) = 0.5
    // raw(1,2) = 0.2 -> 0.2 / (0.9 * 0.5)
    let expected = 0.2 / (0.9 * 0.5);
    assert!((measure.evaluate_similarity(&d[0], &d[1]) - expected).abs() < 1e-9);
    assert!((measure.evaluate_model(&d).unwrap() - expected).abs() < 1e-9);
    assert!(!measure.is_maximize());
}

// ============================================================
// Contract properties
// ============================================================

#[test]
fn every_measure_returns_one_score_per_topic() {
    let emb = noisy_embedding();
    let descriptors = noisy_descriptors();
    for measure in build_measures(&MeasureId::ALL, &emb) {
        let scores = measure.evaluate_topics(&descriptors).unwrap();
        assert_eq!(scores.len(), descriptors.len(), "{}", measure.id());
        for score in scores {
            assert!(score.is_finite(), "{} produced {}", measure.id(), score);
        }
    }
}

#[test]
fn topic_order_follows_input_order() {
    let emb = noisy_embedding();
    let descriptors = noisy_descriptors();
    let reversed: Vec<Descriptor> = descriptors.iter().rev().cloned().collect();

    for measure in build_measures(&MeasureId::ALL, &emb) {
        let forward = measure.evaluate_topics(&descriptors).unwrap();
        let mut backward = measure.evaluate_topics(&reversed).unwrap();
        backward.reverse();
        for (f, b) in forward.iter().zip(&backward) {
            assert!((f - b).abs() < 1e-9, "{}", measure.id());
        }
    }
}

#[test]
fn scores_stay_in_range() {
    let emb = noisy_embedding();
    let descriptors = noisy_descriptors();

    let unit = |scores: Vec<f64>| scores.iter().all(|s| (0.0..=1.0).contains(s));
    assert!(unit(CoherenceScore::new(&emb).evaluate_topics(&descriptors).unwrap()));
    assert!(unit(InternalExternalScore::new(&emb).evaluate_topics(&descriptors).unwrap()));
    assert!(unit(TopicDifferenceScore::new(&emb).evaluate_topics(&descriptors).unwrap()));

    let silhouette = TopicSilhouetteScore::new(&emb)
        .evaluate_topics(&descriptors)
        .unwrap();
    assert!(silhouette.iter().all(|s| (-1.0..=1.0).contains(s)));

    let minmax = MinMaxScore::new(&emb).evaluate_topics(&descriptors).unwrap();
    assert!(minmax.iter().all(|s| *s >= 0.0));
}

#[test]
fn evaluate_topics_is_idempotent() {
    let emb = noisy_embedding();
    let descriptors = noisy_descriptors();
    for measure in build_measures(&MeasureId::ALL, &emb) {
        let first = measure.evaluate_topics(&descriptors).unwrap();
        let second = measure.evaluate_topics(&descriptors).unwrap();
        let first_bits: Vec<u64> = first.iter().map(|s| s.to_bits()).collect();
        let second_bits: Vec<u64> = second.iter().map(|s| s.to_bits()).collect();
        assert_eq!(first_bits, second_bits, "{}", measure.id());
    }
}

#[test]
fn evaluate_topic_matches_table_for_coherence() {
    let emb = noisy_embedding();
    let descriptors = noisy_descriptors();
    let measure = CoherenceScore::new(&emb);
    let scores = measure.evaluate_topics(&descriptors).unwrap();
    for (descriptor, score) in descriptors.iter().zip(scores) {
        assert_eq!(measure.evaluate_topic(descriptor), score);
    }
}

#[test]
fn model_score_is_mean_of_topic_scores() {
    let emb = noisy_embedding();
    let descriptors = noisy_descriptors();
    for id in [MeasureId::Coherence, MeasureId::IntExt, MeasureId::Silhouette] {
        let measure = id.build(&emb);
        let scores = measure.evaluate_topics(&descriptors).unwrap();
        let mean = scores.iter().sum::<f64>() / scores.len() as f64;
        assert!((measure.evaluate_model(&descriptors).unwrap() - mean).abs() < 1e-9);
    }
}

// ============================================================
// Degenerate inputs
// ============================================================

#[test]
fn single_topic_model_is_well_defined() {
    let emb = scenario_embedding();
    let descriptors = vec![terms(&["a", "b"])];
    for measure in build_measures(&MeasureId::ALL, &emb) {
        let model = measure.evaluate_model(&descriptors).unwrap();
        assert!(model.is_finite(), "{}", measure.id());
        assert_eq!(measure.evaluate_topics(&descriptors).unwrap().len(), 1);
    }
    assert_eq!(
        TopicDifferenceScore::new(&emb).evaluate_model(&descriptors).unwrap(),
        0.0
    );
    assert_eq!(MinMaxScore::new(&emb).evaluate_model(&descriptors).unwrap(), 0.0);
    // No other topic: external is 0, so internal / internal = 1
    assert!(
        (InternalExternalScore::new(&emb).evaluate_model(&descriptors).unwrap() - 1.0).abs()
            < 1e-9
    );
}

#[test]
fn fewer_than_two_known_terms_scores_zero() {
    let emb = scenario_embedding();
    let descriptors = vec![terms(&["a", "unknown1", "unknown2"]), terms(&["c", "d"])];

    assert_eq!(CoherenceScore::new(&emb).evaluate_topic(&descriptors[0]), 0.0);
    let intext = InternalExternalScore::new(&emb)
        .evaluate_topics(&descriptors)
        .unwrap();
    assert_eq!(intext[0], 0.0);

    let silhouette = TopicSilhouetteScore::new(&emb);
    assert_eq!(
        silhouette.evaluate_term_topic_distance("a", &descriptors[0], true),
        0.0
    );
}

#[test]
fn fully_unknown_descriptors_score_zero() {
    let emb = scenario_embedding();
    let descriptors = vec![terms(&["x1", "x2"]), terms(&["y1", "y2"])];
    for measure in build_measures(&MeasureId::ALL, &emb) {
        let scores = measure.evaluate_topics(&descriptors).unwrap();
        assert!(scores.iter().all(|s| s.is_finite()), "{}", measure.id());
    }
    assert_eq!(
        CoherenceScore::new(&emb).evaluate_topics(&descriptors).unwrap(),
        vec![0.0, 0.0]
    );
}

#[test]
fn empty_topic_list_is_rejected() {
    let emb = scenario_embedding();
    for measure in build_measures(&MeasureId::ALL, &emb) {
        assert_eq!(
            measure.evaluate_topics(&[]),
            Err(ValidationError::NoTopics),
            "{}",
            measure.id()
        );
        assert_eq!(measure.evaluate_model(&[]), Err(ValidationError::NoTopics));
    }
}

// ============================================================
// Silhouette side channel
// ============================================================

#[test]
fn silhouette_retains_latest_term_scores_only() {
    let emb = noisy_embedding();
    let measure = TopicSilhouetteScore::new(&emb);

    measure.evaluate_topics(&noisy_descriptors()).unwrap();
    assert_eq!(measure.topic_term_scores().len(), 3);

    let smaller = vec![terms(&["goal", "match"]), terms(&["vote", "poll"])];
    measure.evaluate_topics(&smaller).unwrap();
    let retained = measure.topic_term_scores();
    assert_eq!(retained.len(), 2);
    assert!(retained[0].contains_key("goal"));
    assert!(!retained[0].contains_key("league"));
}

#[test]
fn silhouette_topic_score_is_mean_of_term_scores() {
    let emb = noisy_embedding();
    let measure = TopicSilhouetteScore::new(&emb);
    let descriptors = noisy_descriptors();
    let (topic_scores, term_scores) = measure.evaluate_with_terms(&descriptors).unwrap();

    for ((descriptor, topic_score), scores) in
        descriptors.iter().zip(&topic_scores).zip(&term_scores)
    {
        let mean = descriptor.iter().map(|t| scores[t]).sum::<f64>() / descriptor.len() as f64;
        assert!((topic_score - mean).abs() < 1e-9);
    }
}
