use super::types::{Goal, PlanSummary, SavingsPlan};
use crate::error::{InsightsError, Result};

const MONTHS_PER_YEAR: u32 = 12;

impl Goal {
    pub fn from_years(target_amount: f64, years: u32, saved_so_far: f64) -> Result<Self> {
        let horizon_months = years.checked_mul(MONTHS_PER_YEAR).ok_or_else(|| {
            InsightsError::InvalidGoal(format!("horizon of {years} years is too long"))
        })?;
        Ok(Self {
            target_amount,
            horizon_months,
            saved_so_far,
        })
    }
}

/// Linear savings plan: the remaining gap split evenly over the horizon,
/// rounded up so the goal is never under-funded. No interest is assumed.
pub fn plan(goal: &Goal) -> Result<SavingsPlan> {
    validate_goal(goal)?;

    let monthly_required = if goal.saved_so_far < goal.target_amount {
        ((goal.target_amount - goal.saved_so_far) / goal.horizon_months as f64).ceil()
    } else {
        0.0
    };
    let progress_percent = (100.0 * goal.saved_so_far / goal.target_amount)
        .round()
        .min(100.0) as u8;

    tracing::debug!(
        target = goal.target_amount,
        horizon_months = goal.horizon_months,
        monthly_required,
        progress_percent,
        "planned goal"
    );

    Ok(SavingsPlan {
        monthly_required,
        progress_percent,
    })
}

pub fn summarize(goal: &Goal) -> Result<PlanSummary> {
    let plan = plan(goal)?;
    Ok(PlanSummary {
        plan,
        target_amount: goal.target_amount,
        remaining_amount: (goal.target_amount - goal.saved_so_far).max(0.0),
        horizon_years: goal.horizon_months as f64 / MONTHS_PER_YEAR as f64,
    })
}

fn validate_goal(goal: &Goal) -> Result<()> {
    if !goal.target_amount.is_finite() || goal.target_amount <= 0.0 {
        return Err(InsightsError::InvalidGoal(
            "target amount must be > 0".to_string(),
        ));
    }
    if goal.horizon_months == 0 {
        return Err(InsightsError::InvalidGoal(
            "horizon must be at least one month".to_string(),
        ));
    }
    if !goal.saved_so_far.is_finite() || goal.saved_so_far < 0.0 {
        return Err(InsightsError::MalformedInput(
            "saved amount must be a finite number >= 0".to_string(),
        ));
    }
    Ok(())
}
