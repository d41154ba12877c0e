// Model-level reporting: one row per topic model, for comparing models
// against each other under a shared embedding.

use tracing::debug;

use super::round_to;
use super::tables::{MeasureScore, ModelValidationRow};
use crate::config::DEFAULT_PRECISION;
use crate::embedding::Embedding;
use crate::error::{Result, ValidationError};
use crate::topics::model::TopicModel;
use crate::validation::{build_measures, MeasureId};

/// Compares topic models by their model-level scores.
#[derive(Debug, Clone)]
pub struct ModelValidator {
    precision: u32,
}

impl Default for ModelValidator {
    fn default() -> Self {
        Self::new(DEFAULT_PRECISION)
    }
}

impl ModelValidator {
    pub fn new(precision: u32) -> Self {
        Self { precision }
    }

    /// One row per model with rounded model-level scores.
    ///
    /// Models without descriptors are skipped. No embedding means no rows.
    pub fn cross_model_table(
        &self,
        models: &[TopicModel],
        embedding: Option<&Embedding>,
        measures: &[MeasureId],
    ) -> Result<Vec<ModelValidationRow>> {
        self.cross_model_table_with(models, embedding, measures, |_| {})
    }

    /// Like [`cross_model_table`](Self::cross_model_table), calling
    /// `on_model` after each model is handled (skipped or scored).
    pub fn cross_model_table_with(
        &self,
        models: &[TopicModel],
        embedding: Option<&Embedding>,
        measures: &[MeasureId],
        mut on_model: impl FnMut(&TopicModel),
    ) -> Result<Vec<ModelValidationRow>> {
        let Some(embedding) = embedding else {
            debug!("No embedding available, returning empty model table");
            return Ok(Vec::new());
        };
        if measures.is_empty() {
            return Err(ValidationError::NoMeasures);
        }

        let scorers = build_measures(measures, embedding);
        let mut rows = Vec::with_capacity(models.len());

        for model in models {
            let Some(descriptors) = model.default_descriptors() else {
                debug!(model = model.id(), "No term rankings, skipping model");
                on_model(model);
                continue;
            };

            let mut scores = Vec::with_capacity(scorers.len());
            for scorer in &scorers {
                let score = scorer.evaluate_model(&descriptors)?;
                scores.push(MeasureScore {
                    measure: scorer.id(),
                    score: round_to(score, self.precision),
                });
            }

            rows.push(ModelValidationRow {
                name: model.id().to_string(),
                corpus: model.meta.corpus.clone(),
                topics: descriptors.len(),
                scores,
            });
            on_model(model);
        }

        debug!(
            embedding = embedding.id(),
            models = models.len(),
            rows = rows.len(),
            "Built model comparison table"
        );
        Ok(rows)
    }
}
