use super::types::{
    AffordabilityInputs, CompositeScore, FactorPolicy, ScoreFactor, ScoreLabel, ScoringPolicy,
};
use crate::error::{InsightsError, Result};

pub const WEIGHT_TOLERANCE: f64 = 1e-6;

const EXCELLENT_FLOOR: u8 = 80;
const GOOD_FLOOR: u8 = 60;
const FAIR_FLOOR: u8 = 40;

/// Weighted composite of already-normalized factors.
///
/// Factor scores are clamped to [0, 100] before weighting and the composite is
/// rounded half away from zero. Factors come back in input order.
pub fn score(factors: &[ScoreFactor]) -> Result<CompositeScore> {
    if factors.is_empty() {
        return Err(InsightsError::MalformedInput(
            "at least one score factor is required".to_string(),
        ));
    }

    for factor in factors {
        validate_factor(factor)?;
    }
    validate_weights(factors.iter().map(|f| f.weight))?;

    let clamped: Vec<ScoreFactor> = factors
        .iter()
        .map(|f| ScoreFactor {
            normalized_score: f.normalized_score.clamp(0.0, 100.0),
            ..f.clone()
        })
        .collect();

    let weighted: f64 = clamped
        .iter()
        .map(|f| f.weight * f.normalized_score)
        .sum();
    let value = weighted.round().clamp(0.0, 100.0) as u8;
    let label = label_for(value);

    tracing::debug!(factors = clamped.len(), weighted, value, ?label, "composed score");

    Ok(CompositeScore {
        value,
        label,
        factors: clamped,
    })
}

pub fn label_for(value: u8) -> ScoreLabel {
    if value >= EXCELLENT_FLOOR {
        ScoreLabel::Excellent
    } else if value >= GOOD_FLOOR {
        ScoreLabel::Good
    } else if value >= FAIR_FLOOR {
        ScoreLabel::Fair
    } else {
        ScoreLabel::Poor
    }
}

/// Checks that every weight lies in [0, 1] and that they sum to 1, both within
/// `WEIGHT_TOLERANCE`.
pub fn validate_weights(weights: impl IntoIterator<Item = f64>) -> Result<()> {
    let mut sum = 0.0;
    for weight in weights {
        if !weight.is_finite() || !(0.0..=1.0 + WEIGHT_TOLERANCE).contains(&weight) {
            return Err(InsightsError::InvalidWeights(format!(
                "weight {weight} must be between 0 and 1"
            )));
        }
        sum += weight;
    }
    if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
        return Err(InsightsError::InvalidWeights(format!(
            "weights sum to {sum}, expected 1"
        )));
    }
    Ok(())
}

fn validate_factor(factor: &ScoreFactor) -> Result<()> {
    if !factor.normalized_score.is_finite() {
        return Err(InsightsError::MalformedInput(format!(
            "normalized score for '{}' must be a finite number",
            factor.name
        )));
    }
    if !factor.raw_value.is_finite() {
        return Err(InsightsError::MalformedInput(format!(
            "raw value for '{}' must be a finite number",
            factor.name
        )));
    }
    Ok(())
}

/// Maps a raw measurement linearly from `worst` (0) to `best` (100).
pub fn normalize(policy: &FactorPolicy, raw_value: f64) -> Result<ScoreFactor> {
    if !raw_value.is_finite() {
        return Err(InsightsError::MalformedInput(format!(
            "raw value for '{}' must be a finite number",
            policy.name
        )));
    }
    let span = policy.best - policy.worst;
    if !span.is_finite() || span == 0.0 {
        return Err(InsightsError::MalformedInput(format!(
            "factor '{}' needs distinct finite worst and best bounds",
            policy.name
        )));
    }

    let normalized_score = (100.0 * (raw_value - policy.worst) / span).clamp(0.0, 100.0);
    Ok(ScoreFactor {
        name: policy.name.clone(),
        raw_value,
        normalized_score,
        weight: policy.weight,
    })
}

pub fn build_factors(
    policy: &ScoringPolicy,
    inputs: &AffordabilityInputs,
) -> Result<Vec<ScoreFactor>> {
    Ok(vec![
        normalize(&policy.net_worth, inputs.net_worth)?,
        normalize(&policy.credit_score, inputs.credit_score)?,
        normalize(&policy.debt_to_income, inputs.debt_to_income)?,
    ])
}

pub fn assess(policy: &ScoringPolicy, inputs: &AffordabilityInputs) -> Result<CompositeScore> {
    score(&build_factors(policy, inputs)?)
}
