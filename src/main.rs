use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use topicscan::config::Config;
use topicscan::embedding::Embedding;
use topicscan::output::terminal;
use topicscan::report::{ModelValidator, TopicValidator};
use topicscan::topics::model::TopicModel;
use topicscan::topics::registry::CoreRegistry;
use topicscan::validation::MeasureId;

/// topicscan: validate topic models against word embeddings.
///
/// Scores topic descriptors for coherence, separation and silhouette using
/// term similarities from a pretrained word embedding.
#[derive(Parser)]
#[command(name = "topicscan", version, about)]
struct Cli {
    /// Print results as JSON instead of terminal tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the embeddings and topic models in the core directory
    List,

    /// Score every topic of one model
    Validate {
        /// Topic model id (path relative to the core directory, no extension)
        model: String,

        /// Embedding id
        embedding: String,

        /// Measures to compute, comma-separated (default: all)
        #[arg(long, short, value_delimiter = ',')]
        measure: Vec<String>,

        /// Fill descriptors only with terms the embedding knows
        #[arg(long)]
        in_vocab: bool,
    },

    /// Compare several topic models under one embedding
    Compare {
        /// Embedding id
        embedding: String,

        /// Topic model ids (default: every model in the core directory)
        models: Vec<String>,

        /// Measures to compute, comma-separated (default: TOPICSCAN_DEFAULT_MEASURE)
        #[arg(long, short, value_delimiter = ',')]
        measure: Vec<String>,

        /// Only include models built from this corpus
        #[arg(long)]
        corpus: Option<String>,
    },

    /// Topic and term silhouettes for one model
    Silhouette {
        model: String,
        embedding: String,
    },

    /// Pairwise topic (or term) similarities for one model
    Pairs {
        model: String,
        embedding: String,

        /// Compare descriptor terms instead of whole topics
        #[arg(long)]
        terms: bool,

        /// Show each unordered pair once, without self pairs
        #[arg(long)]
        unique: bool,

        /// Max pairs to display (default: 20)
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Nearest neighbors of one or more terms
    Neighbors {
        embedding: String,

        /// Query terms; several terms query their centroid
        #[arg(required = true)]
        terms: Vec<String>,

        /// Number of neighbors (default: TOPICSCAN_NUM_NEIGHBORS)
        #[arg(long, short = 'n')]
        count: Option<usize>,
    },

    /// Show a model's descriptors with their extended rankings
    Descriptors { model: String },
}

fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("topicscan=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;
    let mut registry = CoreRegistry::open(&config)?;
    if config.preload_embeddings {
        registry.preload_embeddings();
    }

    match cli.command {
        Commands::List => {
            let embeddings: Vec<_> = registry
                .embedding_ids()
                .iter()
                .filter_map(|id| registry.embedding_metadata(id))
                .collect();
            let models: Vec<_> = registry
                .topic_model_ids()
                .iter()
                .filter_map(|id| registry.topic_model_metadata(id))
                .collect();
            if cli.json {
                print_json(&serde_json::json!({ "embeddings": embeddings, "models": models }))?;
            } else {
                terminal::display_registry(&embeddings, &models);
            }
        }

        Commands::Validate {
            model,
            embedding,
            measure,
            in_vocab,
        } => {
            let measures = parse_measures(&measure, &MeasureId::ALL)?;
            let model = require_model(&registry, &model)?;
            let embedding = load_embedding(&mut registry, &embedding);

            let descriptors = match (&embedding, in_vocab) {
                (Some(emb), true) => model.in_vocabulary_descriptors(emb),
                _ => model.default_descriptors(),
            };

            let validator = TopicValidator::new(config.precision);
            let rows = validator.validation_table(
                descriptors.as_deref(),
                embedding.as_deref(),
                &measures,
            )?;

            if cli.json {
                print_json(&rows)?;
            } else {
                terminal::display_validation_table(model.id(), &rows, &measures, config.precision);
            }
        }

        Commands::Compare {
            embedding,
            models,
            measure,
            corpus,
        } => {
            let measures = parse_measures(&measure, &[config.default_measure])?;
            let ids = if models.is_empty() {
                registry.topic_model_ids()
            } else {
                models
            };

            let mut topic_models = Vec::with_capacity(ids.len());
            for id in &ids {
                let model = require_model(&registry, id)?;
                if corpus.as_deref().is_some_and(|c| c != model.meta.corpus) {
                    continue;
                }
                topic_models.push(model);
            }
            info!(models = topic_models.len(), "Comparing topic models");

            let embedding_id = embedding;
            let embedding = load_embedding(&mut registry, &embedding_id);

            let pb = ProgressBar::new(topic_models.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("  Models [{bar:30}] {pos}/{len} ({eta})")
                    .context("Invalid progress bar template")?,
            );
            if cli.json {
                pb.set_draw_target(indicatif::ProgressDrawTarget::hidden());
            }

            let rows = ModelValidator::new(config.precision).cross_model_table_with(
                &topic_models,
                embedding.as_deref(),
                &measures,
                |_| pb.inc(1),
            )?;
            pb.finish_and_clear();

            if cli.json {
                print_json(&rows)?;
            } else {
                terminal::display_model_table(&embedding_id, &rows, &measures, config.precision);
                let skipped = topic_models.len().saturating_sub(rows.len());
                if embedding.is_some() && skipped > 0 {
                    println!(
                        "  {} {} models skipped (no term rankings)",
                        "~".yellow(),
                        skipped
                    );
                }
            }
        }

        Commands::Silhouette { model, embedding } => {
            let model = require_model(&registry, &model)?;
            let embedding = load_embedding(&mut registry, &embedding);
            let descriptors = model.default_descriptors();

            let validator = TopicValidator::new(config.precision);
            let topics =
                validator.topic_silhouette_table(descriptors.as_deref(), embedding.as_deref())?;
            let terms =
                validator.term_silhouette_table(descriptors.as_deref(), embedding.as_deref())?;

            if cli.json {
                print_json(&serde_json::json!({ "topics": topics, "terms": terms }))?;
            } else {
                terminal::display_silhouette(&topics, &terms, config.precision);
            }
        }

        Commands::Pairs {
            model,
            embedding,
            terms,
            unique,
            limit,
        } => {
            let model = require_model(&registry, &model)?;
            let embedding = load_embedding(&mut registry, &embedding);
            let descriptors = model.default_descriptors();
            let validator = TopicValidator::new(config.precision);

            if terms {
                let rows = validator.term_pair_table(
                    descriptors.as_deref(),
                    embedding.as_deref(),
                    unique,
                )?;
                if cli.json {
                    print_json(&rows)?;
                } else {
                    terminal::display_term_pairs(&rows, config.precision, limit);
                }
            } else {
                let rows = validator.topic_pair_table(
                    descriptors.as_deref(),
                    embedding.as_deref(),
                    unique,
                )?;
                if cli.json {
                    print_json(&rows)?;
                } else {
                    terminal::display_topic_pairs(&rows, config.precision, limit);
                }
            }
        }

        Commands::Neighbors {
            embedding,
            terms,
            count,
        } => {
            let embedding_id = embedding;
            let Some(embedding) = load_embedding(&mut registry, &embedding_id) else {
                anyhow::bail!("Embedding {embedding_id} is unavailable");
            };
            let neighbors = embedding.neighbors(&terms, count.unwrap_or(config.num_neighbors));

            if cli.json {
                print_json(&neighbors)?;
            } else {
                terminal::display_neighbors(&embedding_id, &terms, &neighbors);
            }
        }

        Commands::Descriptors { model } => {
            let model = require_model(&registry, &model)?;
            let rows = model.extended_descriptor_rows().unwrap_or_default();
            if cli.json {
                print_json(&rows)?;
            } else {
                terminal::display_descriptors(model.id(), &rows);
            }
        }
    }

    Ok(())
}

/// Parse `--measure` values, falling back to `default` when none were given.
fn parse_measures(requested: &[String], default: &[MeasureId]) -> Result<Vec<MeasureId>> {
    if requested.is_empty() {
        return Ok(default.to_vec());
    }
    Ok(MeasureId::parse_list(requested)?)
}

/// Look up a topic model, or bail with the ids that do exist.
fn require_model(registry: &CoreRegistry, id: &str) -> Result<TopicModel> {
    match registry.topic_model(id) {
        Some(model) => Ok(model),
        None => anyhow::bail!(
            "Unknown topic model: {id}\nRun `topicscan list` to see the {} available models.",
            registry.topic_model_count()
        ),
    }
}

/// Load an embedding, warning (but not failing) when it is unavailable.
/// The report tables come back empty without one.
fn load_embedding(registry: &mut CoreRegistry, id: &str) -> Option<Arc<Embedding>> {
    if registry.embedding_metadata(id).is_none() {
        warn!(embedding = id, "Unknown embedding");
        eprintln!(
            "  {} Unknown embedding {id}. Run `topicscan list` to see what is available.",
            "Warning:".yellow()
        );
        return None;
    }
    let embedding = registry.embedding(id);
    if embedding.is_none() {
        eprintln!("  {} Embedding {id} could not be loaded.", "Warning:".yellow());
    }
    embedding
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
