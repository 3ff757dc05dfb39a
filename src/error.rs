//! Error types for the insights engine

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum InsightsError {
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid weights: {0}")]
    InvalidWeights(String),

    #[error("Invalid goal: {0}")]
    InvalidGoal(String),

    #[error("Empty cohort: {0}")]
    EmptyCohort(String),

    #[error("Malformed input: {0}")]
    MalformedInput(String),
}

impl InsightsError {
    /// Stable identifier for the error kind, independent of the message text.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InsufficientData(_) => "insufficient_data",
            Self::InvalidWeights(_) => "invalid_weights",
            Self::InvalidGoal(_) => "invalid_goal",
            Self::EmptyCohort(_) => "empty_cohort",
            Self::MalformedInput(_) => "malformed_input",
        }
    }
}

pub type Result<T> = std::result::Result<T, InsightsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_distinct() {
        let errors = [
            InsightsError::InsufficientData(String::new()),
            InsightsError::InvalidWeights(String::new()),
            InsightsError::InvalidGoal(String::new()),
            InsightsError::EmptyCohort(String::new()),
            InsightsError::MalformedInput(String::new()),
        ];
        let mut kinds: Vec<&str> = errors.iter().map(InsightsError::kind).collect();
        kinds.sort_unstable();
        kinds.dedup();
        assert_eq!(kinds.len(), errors.len());
    }

    #[test]
    fn display_includes_detail() {
        let err = InsightsError::InvalidGoal("horizon must be > 0".to_string());
        assert_eq!(err.to_string(), "Invalid goal: horizon must be > 0");
    }
}
