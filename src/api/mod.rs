use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    extract::{Json, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

use crate::config::EngineConfig;
use crate::core::{
    AffordabilityInputs, BenchmarkResult, Category, CohortCatalog, CompositeScore,
    DistributionBar, FinancialRecord, Goal, GoalKind, LineItem, LineItemShare, NetWorthSummary,
    PlanSummary, ScoreFactor, aggregate, assess, benchmark, composition, distribution_bars, score,
    summarize,
};
use crate::error::{InsightsError, Result};

#[derive(Clone)]
struct AppState {
    config: Arc<EngineConfig>,
    catalog: Arc<CohortCatalog>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InsightsPayload {
    assets: Option<Vec<LineItemPayload>>,
    liabilities: Option<Vec<LineItemPayload>>,

    score_factors: Option<Vec<ScoreFactorPayload>>,
    affordability: Option<AffordabilityPayload>,

    goal: Option<GoalPayload>,

    cohort: Option<Vec<f64>>,
    age_band: Option<String>,
    income_band: Option<String>,
    subject_value: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct LineItemPayload {
    name: Option<String>,
    amount: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ScoreFactorPayload {
    name: Option<String>,
    raw_value: Option<f64>,
    normalized_score: Option<f64>,
    weight: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct AffordabilityPayload {
    net_worth: Option<f64>,
    credit_score: Option<f64>,
    debt_to_income: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct GoalPayload {
    kind: Option<GoalKind>,
    target_amount: Option<f64>,
    horizon_months: Option<i64>,
    horizon_years: Option<i64>,
    saved_so_far: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetWorthResponse {
    #[serde(flatten)]
    summary: NetWorthSummary,
    composition: Vec<LineItemShare>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkResponse {
    #[serde(flatten)]
    result: BenchmarkResult,
    subject_value: f64,
    bars: Vec<DistributionBar>,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    net_worth: Option<NetWorthResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    affordability: Option<CompositeScore>,
    #[serde(skip_serializing_if = "Option::is_none")]
    goal_plan: Option<PlanSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    benchmark: Option<BenchmarkResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GoalPreset {
    kind: GoalKind,
    name: &'static str,
    suggested_amount: f64,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    kind: &'static str,
}

pub async fn run_http_server(port: u16, config: EngineConfig) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let state = AppState {
        catalog: Arc::new(config.cohort_catalog()),
        config: Arc::new(config),
    };
    let app = Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/goal-presets", get(goal_presets_handler))
        .route("/api/networth", post(networth_handler))
        .route("/api/affordability", post(affordability_handler))
        .route("/api/goal-plan", post(goal_plan_handler))
        .route("/api/benchmark", post(benchmark_handler))
        .route("/api/insights", post(insights_handler))
        .fallback(not_found_handler)
        .with_state(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "insights HTTP API listening");

    axum::serve(listener, app).await
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, serde_json::json!({ "status": "ok" }))
}

async fn goal_presets_handler() -> Response {
    json_response(StatusCode::OK, goal_presets())
}

async fn not_found_handler() -> Response {
    json_response(
        StatusCode::NOT_FOUND,
        ErrorResponse {
            error: "Not found".to_string(),
            kind: "not_found",
        },
    )
}

async fn networth_handler(body: String) -> Response {
    respond(parse_payload(&body).and_then(|p| networth_section(&p)))
}

async fn affordability_handler(State(state): State<AppState>, body: String) -> Response {
    respond(parse_payload(&body).and_then(|p| {
        let net_worth = match (&p.assets, &p.liabilities) {
            (None, None) => None,
            _ => Some(networth_section(&p)?.summary.net_worth),
        };
        affordability_section(&state.config, &p, net_worth)
    }))
}

async fn goal_plan_handler(body: String) -> Response {
    respond(parse_payload(&body).and_then(|p| goal_section(&p)))
}

async fn benchmark_handler(State(state): State<AppState>, body: String) -> Response {
    respond(parse_payload(&body).and_then(|p| benchmark_section(&state.catalog, &p, None)))
}

async fn insights_handler(State(state): State<AppState>, body: String) -> Response {
    respond(parse_payload(&body).and_then(|p| evaluate(&state.config, &state.catalog, &p)))
}

fn respond<T: Serialize>(result: Result<T>) -> Response {
    match result {
        Ok(body) => json_response(StatusCode::OK, body),
        Err(err) => {
            tracing::warn!(kind = err.kind(), error = %err, "rejected request");
            error_response(StatusCode::BAD_REQUEST, &err)
        }
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn error_response(status: StatusCode, err: &InsightsError) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: err.to_string(),
            kind: err.kind(),
        },
    )
}

fn parse_payload(raw: &str) -> Result<InsightsPayload> {
    serde_json::from_str(raw)
        .map_err(|e| InsightsError::MalformedInput(format!("invalid JSON payload: {e}")))
}

fn goal_presets() -> Vec<GoalPreset> {
    GoalKind::all()
        .iter()
        .map(|kind| GoalPreset {
            kind: *kind,
            name: kind.display_name(),
            suggested_amount: kind.suggested_amount(),
        })
        .collect()
}

/// Runs every section present in the payload. The first failing section fails
/// the whole request.
pub fn evaluate(
    config: &EngineConfig,
    catalog: &CohortCatalog,
    payload: &InsightsPayload,
) -> Result<InsightsResponse> {
    let mut response = InsightsResponse::default();

    if payload.assets.is_some() || payload.liabilities.is_some() {
        response.net_worth = Some(networth_section(payload)?);
    }
    let net_worth = response.net_worth.as_ref().map(|n| n.summary.net_worth);

    if payload.score_factors.is_some() || payload.affordability.is_some() {
        response.affordability = Some(affordability_section(config, payload, net_worth)?);
    }
    if payload.goal.is_some() {
        response.goal_plan = Some(goal_section(payload)?);
    }
    if payload.subject_value.is_some()
        || payload.cohort.is_some()
        || payload.age_band.is_some()
        || payload.income_band.is_some()
    {
        response.benchmark = Some(benchmark_section(catalog, payload, net_worth)?);
    }

    if response.net_worth.is_none()
        && response.affordability.is_none()
        && response.goal_plan.is_none()
        && response.benchmark.is_none()
    {
        return Err(InsightsError::MalformedInput(
            "payload contains no computable section".to_string(),
        ));
    }
    Ok(response)
}

/// Parses a combined payload and evaluates it against `config`.
pub fn evaluate_json(config: &EngineConfig, raw: &str) -> Result<InsightsResponse> {
    let payload = parse_payload(raw)?;
    evaluate(config, &config.cohort_catalog(), &payload)
}

fn networth_section(payload: &InsightsPayload) -> Result<NetWorthResponse> {
    let record = record_from_payload(payload)?;
    Ok(NetWorthResponse {
        summary: aggregate(&record)?,
        composition: composition(&record)?,
    })
}

fn record_from_payload(payload: &InsightsPayload) -> Result<FinancialRecord> {
    Ok(FinancialRecord::from_parts(
        line_items(payload.assets.as_deref(), Category::Asset, "assets")?,
        line_items(payload.liabilities.as_deref(), Category::Liability, "liabilities")?,
    ))
}

fn line_items(
    items: Option<&[LineItemPayload]>,
    category: Category,
    section: &str,
) -> Result<Vec<LineItem>> {
    items
        .unwrap_or_default()
        .iter()
        .enumerate()
        .map(|(idx, item)| -> Result<LineItem> {
            let amount = item.amount.ok_or_else(|| {
                InsightsError::MalformedInput(format!("{section}[{idx}].amount is required"))
            })?;
            Ok(LineItem {
                name: item
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("{section} {}", idx + 1)),
                amount,
                category,
            })
        })
        .collect()
}

fn affordability_section(
    config: &EngineConfig,
    payload: &InsightsPayload,
    aggregated_net_worth: Option<f64>,
) -> Result<CompositeScore> {
    if let Some(factors) = &payload.score_factors {
        let factors = factors
            .iter()
            .enumerate()
            .map(|(idx, f)| score_factor_from_payload(idx, f))
            .collect::<Result<Vec<_>>>()?;
        return score(&factors);
    }

    let Some(raw) = &payload.affordability else {
        return Err(InsightsError::MalformedInput(
            "scoreFactors or affordability is required".to_string(),
        ));
    };
    let net_worth = raw.net_worth.or(aggregated_net_worth).ok_or_else(|| {
        InsightsError::MalformedInput(
            "affordability.netWorth is required when no assets or liabilities are given"
                .to_string(),
        )
    })?;
    let inputs = AffordabilityInputs {
        net_worth,
        credit_score: raw.credit_score.ok_or_else(|| {
            InsightsError::MalformedInput("affordability.creditScore is required".to_string())
        })?,
        debt_to_income: raw.debt_to_income.ok_or_else(|| {
            InsightsError::MalformedInput("affordability.debtToIncome is required".to_string())
        })?,
    };
    assess(&config.scoring, &inputs)
}

fn score_factor_from_payload(idx: usize, factor: &ScoreFactorPayload) -> Result<ScoreFactor> {
    let missing = |field: &str| {
        InsightsError::MalformedInput(format!("scoreFactors[{idx}].{field} is required"))
    };
    let normalized_score = factor
        .normalized_score
        .ok_or_else(|| missing("normalizedScore"))?;
    Ok(ScoreFactor {
        name: factor.name.clone().ok_or_else(|| missing("name"))?,
        raw_value: factor.raw_value.unwrap_or(normalized_score),
        normalized_score,
        weight: factor.weight.ok_or_else(|| missing("weight"))?,
    })
}

fn goal_section(payload: &InsightsPayload) -> Result<PlanSummary> {
    let Some(raw) = &payload.goal else {
        return Err(InsightsError::MalformedInput("goal is required".to_string()));
    };
    let target_amount = raw
        .target_amount
        .or(raw.kind.map(GoalKind::suggested_amount))
        .ok_or_else(|| {
            InsightsError::MalformedInput("goal.targetAmount or goal.kind is required".to_string())
        })?;
    let saved_so_far = raw.saved_so_far.unwrap_or(0.0);

    let goal = match (raw.horizon_months, raw.horizon_years) {
        (Some(months), _) => Goal {
            target_amount,
            horizon_months: positive_horizon(months, "horizonMonths")?,
            saved_so_far,
        },
        (None, Some(years)) => Goal::from_years(
            target_amount,
            positive_horizon(years, "horizonYears")?,
            saved_so_far,
        )?,
        (None, None) => {
            return Err(InsightsError::MalformedInput(
                "goal.horizonMonths or goal.horizonYears is required".to_string(),
            ));
        }
    };
    summarize(&goal)
}

fn positive_horizon(value: i64, field: &str) -> Result<u32> {
    match u32::try_from(value) {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(InsightsError::InvalidGoal(format!(
            "goal.{field} must be between 1 and {}",
            u32::MAX
        ))),
    }
}

fn benchmark_section(
    catalog: &CohortCatalog,
    payload: &InsightsPayload,
    aggregated_net_worth: Option<f64>,
) -> Result<BenchmarkResponse> {
    let subject_value = payload
        .subject_value
        .or(aggregated_net_worth)
        .ok_or_else(|| {
            InsightsError::MalformedInput(
                "subjectValue is required when no assets or liabilities are given".to_string(),
            )
        })?;

    let cohort: &[f64] = match (&payload.cohort, &payload.age_band, &payload.income_band) {
        (Some(values), _, _) => values,
        (None, Some(age_band), Some(income_band)) => catalog.lookup(age_band, income_band)?,
        _ => {
            return Err(InsightsError::MalformedInput(
                "cohort or both ageBand and incomeBand are required".to_string(),
            ));
        }
    };

    Ok(BenchmarkResponse {
        result: benchmark(subject_value, cohort)?,
        subject_value,
        bars: distribution_bars(subject_value, cohort)?,
    })
}
