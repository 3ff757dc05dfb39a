mod benchmark;
mod networth;
mod planner;
mod scoring;
mod types;

pub use benchmark::{CohortCatalog, benchmark, distribution_bars};
pub use networth::{aggregate, composition};
pub use planner::{plan, summarize};
pub use scoring::{
    WEIGHT_TOLERANCE, assess, build_factors, label_for, normalize, score, validate_weights,
};
pub use types::{
    AffordabilityInputs, BenchmarkResult, Category, CohortDefinition, CompositeScore,
    DistributionBar, FactorPolicy, FinancialRecord, Goal, GoalKind, LineItem, LineItemShare,
    NetWorthSummary, PlanSummary, SavingsPlan, ScoreFactor, ScoreLabel, ScoringPolicy,
};
