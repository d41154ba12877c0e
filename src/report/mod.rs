// Aggregation of validation scores into tables.
//
// `TopicValidator` reports on the topics of a single model, `ModelValidator`
// compares whole models. Both take the embedding as an `Option`: `None` means
// it could not be loaded, and every table comes back empty rather than
// failing, so callers can degrade gracefully.

pub mod model;
pub mod tables;
pub mod topic;

pub use model::ModelValidator;
pub use tables::{
    MeasureScore, ModelValidationRow, TermPairRow, TermSilhouetteRow, TopicPairRow,
    TopicSilhouetteRow, ValidationRow,
};
pub use topic::{LabeledMatrix, TopicValidator};

use crate::config::MAX_PRECISION;

/// Round a score for display. Precision is capped at [`MAX_PRECISION`].
pub fn round_to(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision.min(MAX_PRECISION) as i32);
    (value * factor).round() / factor
}

/// Zero-padded topic number ("01".."K"), three digits once K reaches 100.
pub fn topic_number(index: usize, k: usize) -> String {
    if k < 100 {
        format!("{:02}", index + 1)
    } else {
        format!("{:03}", index + 1)
    }
}

/// Topic label ("Topic 01").
pub fn topic_label(index: usize, k: usize) -> String {
    format!("Topic {}", topic_number(index, k))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.123456, 3), 0.123);
        assert_eq!(round_to(0.9996, 3), 1.0);
        assert_eq!(round_to(-0.4449, 2), -0.44);
    }

    #[test]
    fn test_round_to_huge_precision_stays_finite() {
        let rounded = round_to(0.123456789, 400);
        assert!(rounded.is_finite());
        assert!((rounded - 0.123456789).abs() < 1e-12);
    }

    #[test]
    fn test_topic_number_padding() {
        assert_eq!(topic_number(0, 5), "01");
        assert_eq!(topic_number(9, 99), "10");
        assert_eq!(topic_number(9, 100), "010");
        assert_eq!(topic_label(2, 10), "Topic 03");
    }
}
