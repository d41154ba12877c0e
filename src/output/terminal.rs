// Colored terminal output for validation tables.
//
// This module handles all terminal-specific formatting: colors, column
// layout, best-score highlighting. The main.rs commands delegate here.

use colored::Colorize;

use super::{format_score, truncate_chars};
use crate::report::{
    ModelValidationRow, TermPairRow, TermSilhouetteRow, TopicPairRow, TopicSilhouetteRow,
    ValidationRow,
};
use crate::topics::meta::{EmbeddingMeta, TopicModelMeta};
use crate::topics::model::DescriptorRow;
use crate::validation::MeasureId;

const DESCRIPTOR_WIDTH: usize = 60;

/// List the embeddings and topic models found in the core directory.
pub fn display_registry(embeddings: &[&EmbeddingMeta], models: &[&TopicModelMeta]) {
    println!(
        "\n{}",
        format!("=== Word Embeddings ({}) ===", embeddings.len()).bold()
    );
    if embeddings.is_empty() {
        println!("  {}", "none found".dimmed());
    }
    for meta in embeddings {
        println!(
            "  {:<40} {:<10} {:>5}d  {}",
            meta.id,
            meta.algorithm.id,
            meta.dimensions,
            truncate_chars(&meta.description, 40).dimmed()
        );
    }

    println!(
        "\n{}",
        format!("=== Topic Models ({}) ===", models.len()).bold()
    );
    if models.is_empty() {
        println!("  {}", "none found".dimmed());
    }
    for meta in models {
        println!(
            "  {:<40} {:<16} {:<10} k={}",
            meta.id, meta.corpus, meta.algorithm.id, meta.k
        );
    }
    println!();
}

/// Per-topic scores, best topic per measure highlighted.
pub fn display_validation_table(
    model_id: &str,
    rows: &[ValidationRow],
    measures: &[MeasureId],
    precision: u32,
) {
    if rows.is_empty() {
        println!("No validation results for {model_id}.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Topic Validation: {model_id} ({} topics) ===", rows.len()).bold()
    );
    println!();

    print!("  {:<5} {:<width$}", "Topic".dimmed(), "Descriptor".dimmed(), width = DESCRIPTOR_WIDTH + 3);
    for measure in measures {
        print!(" {:>11}", measure.short_name().dimmed());
    }
    println!();
    println!("  {}", "-".repeat(DESCRIPTOR_WIDTH + 10 + 12 * measures.len()).dimmed());

    let best: Vec<Option<f64>> = measures
        .iter()
        .map(|&m| best_score(rows.iter().filter_map(|r| r.score(m)), m))
        .collect();

    for row in rows {
        print!(
            "  {:<5} {:<width$}",
            row.topic,
            truncate_chars(&row.descriptor, DESCRIPTOR_WIDTH),
            width = DESCRIPTOR_WIDTH + 3
        );
        for (measure, best) in measures.iter().zip(&best) {
            print!(" {:>11}", score_cell(row.score(*measure), *best, precision));
        }
        println!();
    }
    println!();
}

/// Model-level scores for several topic models.
pub fn display_model_table(
    embedding_id: &str,
    rows: &[ModelValidationRow],
    measures: &[MeasureId],
    precision: u32,
) {
    if rows.is_empty() {
        println!("No topic models could be scored against {embedding_id}.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Model Comparison ({} models, embedding {embedding_id}) ===", rows.len()).bold()
    );
    println!();

    print!(
        "  {:<40} {:<16} {:>4}",
        "Model".dimmed(),
        "Corpus".dimmed(),
        "K".dimmed()
    );
    for measure in measures {
        print!(" {:>11}", measure.short_name().dimmed());
    }
    println!();
    println!("  {}", "-".repeat(62 + 12 * measures.len()).dimmed());

    let best: Vec<Option<f64>> = measures
        .iter()
        .map(|&m| best_score(rows.iter().filter_map(|r| r.score(m)), m))
        .collect();

    for row in rows {
        print!(
            "  {:<40} {:<16} {:>4}",
            truncate_chars(&row.name, 37),
            truncate_chars(&row.corpus, 13),
            row.topics
        );
        for (measure, best) in measures.iter().zip(&best) {
            print!(" {:>11}", score_cell(row.score(*measure), *best, precision));
        }
        println!();
    }
    println!();
}

/// Topic pair similarities, most similar first.
pub fn display_topic_pairs(rows: &[TopicPairRow], precision: u32, limit: usize) {
    if rows.is_empty() {
        println!("No topic pairs to show.");
        return;
    }

    let mut sorted: Vec<&TopicPairRow> = rows.iter().collect();
    sorted.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));

    println!("\n{}", "=== Topic Pair Similarity ===".bold());
    println!();
    for row in sorted.into_iter().take(limit) {
        println!(
            "  {:<12} {:<12} {:>8}",
            row.topic1,
            row.topic2,
            format_score(row.similarity, precision)
        );
    }
    println!();
}

/// Term pair similarities, most similar first. Pairs sharing a topic are marked.
pub fn display_term_pairs(rows: &[TermPairRow], precision: u32, limit: usize) {
    if rows.is_empty() {
        println!("No term pairs to show.");
        return;
    }

    let mut sorted: Vec<&TermPairRow> = rows.iter().collect();
    sorted.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));

    let intra = rows.iter().filter(|r| r.intra).count();
    println!(
        "\n{}",
        format!("=== Term Pair Similarity ({intra} of {} within a topic) ===", rows.len()).bold()
    );
    println!();
    for row in sorted.into_iter().take(limit) {
        let marker = if row.intra {
            "intra".green()
        } else {
            "inter".dimmed()
        };
        println!(
            "  {:<20} {:<20} {:>8}  {}",
            row.term1,
            row.term2,
            format_score(row.similarity, precision),
            marker
        );
    }
    println!();
}

/// Topic silhouettes with each topic's term silhouettes beneath it.
pub fn display_silhouette(
    topics: &[TopicSilhouetteRow],
    terms: &[Vec<TermSilhouetteRow>],
    precision: u32,
) {
    if topics.is_empty() {
        println!("No silhouette results.");
        return;
    }

    println!("\n{}", "=== Topic Silhouette ===".bold());
    for (topic, term_rows) in topics.iter().zip(terms) {
        println!(
            "\n  {} {}  {}",
            topic.label.bold(),
            colorize_signed(topic.score, precision),
            truncate_chars(&topic.descriptor, DESCRIPTOR_WIDTH).dimmed()
        );
        for term in term_rows {
            println!(
                "      {:<24} {}",
                term.term,
                colorize_signed(term.score, precision)
            );
        }
    }
    println!();
}

/// Nearest neighbors of a query term or term list.
pub fn display_neighbors(embedding_id: &str, query: &[String], neighbors: &[String]) {
    let query = query.join(", ");
    if neighbors.is_empty() {
        println!("No neighbors for \"{query}\" in {embedding_id}.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Neighbors of \"{query}\" ({embedding_id}) ===").bold()
    );
    for (i, term) in neighbors.iter().enumerate() {
        println!("  {:>3}. {}", i + 1, term);
    }
    println!();
}

/// Descriptors with the extended ranking dimmed after them.
pub fn display_descriptors(model_id: &str, rows: &[DescriptorRow]) {
    if rows.is_empty() {
        println!("No term rankings available for {model_id}.");
        return;
    }

    println!("\n{}", format!("=== Descriptors: {model_id} ===").bold());
    for row in rows {
        println!("  {:<5} {}", row.topic, row.descriptor);
        if !row.extended.is_empty() {
            println!("        {}", row.extended.dimmed());
        }
    }
    println!();
}

/// The best value in a column, given the measure's direction.
fn best_score(scores: impl Iterator<Item = f64>, measure: MeasureId) -> Option<f64> {
    if measure.is_maximize() {
        scores.reduce(f64::max)
    } else {
        scores.reduce(f64::min)
    }
}

fn score_cell(score: Option<f64>, best: Option<f64>, precision: u32) -> colored::ColoredString {
    match score {
        Some(s) if Some(s) == best => format_score(s, precision).green().bold(),
        Some(s) => format_score(s, precision).normal(),
        None => "-".dimmed(),
    }
}

/// Silhouette values run from -1 to 1; negatives mean misplaced terms.
fn colorize_signed(score: f64, precision: u32) -> colored::ColoredString {
    let text = format_score(score, precision);
    if score < 0.0 {
        text.red()
    } else if score > 0.0 {
        text.green()
    } else {
        text.dimmed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_best_score_respects_direction() {
        let scores = [0.2, 0.7, 0.4];
        assert_eq!(best_score(scores.into_iter(), MeasureId::Coherence), Some(0.7));
        assert_eq!(best_score(scores.into_iter(), MeasureId::MinMax), Some(0.2));
        assert_eq!(best_score(std::iter::empty(), MeasureId::Coherence), None);
    }
}
