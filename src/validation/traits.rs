// Validation measure trait — the uniform contract every score implements.
//
// The aggregators hold a list of `Box<dyn ValidationMeasure>` built from
// MeasureIds and never branch on which measure they are running.

use super::registry::MeasureId;
use super::Descriptor;
use crate::error::Result;

/// A topic quality measure evaluated against one word embedding.
pub trait ValidationMeasure: Send + Sync {
    /// Which registered measure this is.
    fn id(&self) -> MeasureId;

    /// Should good topics maximize this score?
    fn is_maximize(&self) -> bool {
        true
    }

    /// Score every topic, returning one value per descriptor in input order.
    ///
    /// Errors with `NoTopics` on an empty descriptor list.
    fn evaluate_topics(&self, descriptors: &[Descriptor]) -> Result<Vec<f64>>;

    /// Score a single descriptor in isolation.
    ///
    /// Measures that compare topics against each other see a one-topic model
    /// here, which is well-defined for all of them.
    fn evaluate_topic(&self, descriptor: &[String]) -> f64 {
        let single = [descriptor.to_vec()];
        self.evaluate_topics(&single)
            .ok()
            .and_then(|scores| scores.first().copied())
            .unwrap_or(0.0)
    }

    /// Single score for the whole model. Defaults to the mean topic score.
    fn evaluate_model(&self, descriptors: &[Descriptor]) -> Result<f64> {
        let scores = self.evaluate_topics(descriptors)?;
        Ok(super::mean_or_zero(scores))
    }
}
