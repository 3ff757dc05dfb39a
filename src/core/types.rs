use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Asset,
    Liability,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub name: String,
    pub amount: f64,
    pub category: Category,
}

impl LineItem {
    pub fn asset(name: impl Into<String>, amount: f64) -> Self {
        Self {
            name: name.into(),
            amount,
            category: Category::Asset,
        }
    }

    pub fn liability(name: impl Into<String>, amount: f64) -> Self {
        Self {
            name: name.into(),
            amount,
            category: Category::Liability,
        }
    }
}

/// Line items in display order. Order does not affect any total.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialRecord {
    pub items: Vec<LineItem>,
}

impl FinancialRecord {
    pub fn new(items: Vec<LineItem>) -> Self {
        Self { items }
    }

    pub fn from_parts(assets: Vec<LineItem>, liabilities: Vec<LineItem>) -> Self {
        let mut items = assets;
        items.extend(liabilities);
        Self { items }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetWorthSummary {
    pub total_assets: f64,
    pub total_liabilities: f64,
    pub net_worth: f64,
    pub asset_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemShare {
    pub name: String,
    pub category: Category,
    pub amount: f64,
    pub share_of_category: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreFactor {
    pub name: String,
    pub raw_value: f64,
    pub normalized_score: f64,
    pub weight: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum ScoreLabel {
    Poor,
    Fair,
    Good,
    Excellent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeScore {
    pub value: u8,
    pub label: ScoreLabel,
    pub factors: Vec<ScoreFactor>,
}

/// Linear mapping of a raw measurement onto a 0-100 factor score.
///
/// `best` may sit below `worst` for measurements where lower is better.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorPolicy {
    pub name: String,
    pub weight: f64,
    pub worst: f64,
    pub best: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    pub net_worth: FactorPolicy,
    pub credit_score: FactorPolicy,
    pub debt_to_income: FactorPolicy,
}

impl ScoringPolicy {
    pub fn factors(&self) -> [&FactorPolicy; 3] {
        [&self.net_worth, &self.credit_score, &self.debt_to_income]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffordabilityInputs {
    pub net_worth: f64,
    pub credit_score: f64,
    pub debt_to_income: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GoalKind {
    House,
    EmergencyFund,
    Retirement,
}

impl GoalKind {
    pub fn all() -> &'static [GoalKind] {
        &[Self::House, Self::EmergencyFund, Self::Retirement]
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::House => "Buy House",
            Self::EmergencyFund => "Emergency Fund",
            Self::Retirement => "Retirement",
        }
    }

    pub fn suggested_amount(self) -> f64 {
        match self {
            Self::House => 3_000_000.0,
            Self::EmergencyFund => 300_000.0,
            Self::Retirement => 5_000_000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub target_amount: f64,
    pub horizon_months: u32,
    pub saved_so_far: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsPlan {
    pub monthly_required: f64,
    pub progress_percent: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSummary {
    #[serde(flatten)]
    pub plan: SavingsPlan,
    pub target_amount: f64,
    pub remaining_amount: f64,
    pub horizon_years: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkResult {
    pub percentile_rank: f64,
    pub delta_from_mean: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionBar {
    pub label: String,
    pub value: f64,
    pub width_percent: f64,
    pub is_subject: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortDefinition {
    pub age_band: String,
    pub income_band: String,
    pub values: Vec<f64>,
}
