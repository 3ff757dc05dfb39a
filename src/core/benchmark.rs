use super::types::{BenchmarkResult, CohortDefinition, DistributionBar};
use crate::error::{InsightsError, Result};

const QUARTILE_LABELS: [&str; 4] = ["Bottom 25%", "25-50%", "50-75%", "Top 25%"];
const SUBJECT_LABEL: &str = "You";

/// Percentile-of-score rank with ties counted at half weight, plus the
/// subject's distance from the cohort mean.
pub fn benchmark(subject_value: f64, cohort: &[f64]) -> Result<BenchmarkResult> {
    validate_cohort(subject_value, cohort)?;

    let (below, equal) = cohort.iter().fold((0usize, 0usize), |(below, equal), v| {
        if *v < subject_value {
            (below + 1, equal)
        } else if *v == subject_value {
            (below, equal + 1)
        } else {
            (below, equal)
        }
    });
    let n = cohort.len() as f64;
    let percentile_rank = 100.0 * (below as f64 + 0.5 * equal as f64) / n;
    let mean = cohort.iter().sum::<f64>() / n;
    let delta_from_mean = subject_value - mean;
    if !delta_from_mean.is_finite() {
        return Err(InsightsError::MalformedInput(
            "cohort values exceed the representable range".to_string(),
        ));
    }

    tracing::debug!(
        cohort_size = cohort.len(),
        below,
        equal,
        percentile_rank,
        "benchmarked subject against cohort"
    );

    Ok(BenchmarkResult {
        percentile_rank,
        delta_from_mean,
    })
}

/// Cohort values followed by the subject, each scaled against the largest
/// value so the biggest bar is 100% wide.
pub fn distribution_bars(subject_value: f64, cohort: &[f64]) -> Result<Vec<DistributionBar>> {
    validate_cohort(subject_value, cohort)?;

    let max_value = cohort
        .iter()
        .copied()
        .fold(subject_value, f64::max);
    let width = |value: f64| {
        if max_value > 0.0 {
            (value / max_value * 100.0).max(0.0)
        } else {
            0.0
        }
    };

    let mut bars: Vec<DistributionBar> = cohort
        .iter()
        .enumerate()
        .map(|(idx, value)| DistributionBar {
            label: bucket_label(idx, cohort.len()),
            value: *value,
            width_percent: width(*value),
            is_subject: false,
        })
        .collect();
    bars.push(DistributionBar {
        label: SUBJECT_LABEL.to_string(),
        value: subject_value,
        width_percent: width(subject_value),
        is_subject: true,
    });
    Ok(bars)
}

fn bucket_label(idx: usize, len: usize) -> String {
    if len == QUARTILE_LABELS.len() {
        QUARTILE_LABELS[idx].to_string()
    } else {
        format!("Bucket {}", idx + 1)
    }
}

fn validate_cohort(subject_value: f64, cohort: &[f64]) -> Result<()> {
    if cohort.is_empty() {
        return Err(InsightsError::EmptyCohort(
            "cohort has no reference values".to_string(),
        ));
    }
    if !subject_value.is_finite() {
        return Err(InsightsError::MalformedInput(
            "subject value must be a finite number".to_string(),
        ));
    }
    if let Some(bad) = cohort.iter().position(|v| !v.is_finite()) {
        return Err(InsightsError::MalformedInput(format!(
            "cohort value at index {bad} must be a finite number"
        )));
    }
    Ok(())
}

/// Reference distributions keyed by peer filters (age band, income band).
#[derive(Debug, Clone, Default)]
pub struct CohortCatalog {
    cohorts: Vec<CohortDefinition>,
}

impl CohortCatalog {
    pub fn new(cohorts: Vec<CohortDefinition>) -> Self {
        Self { cohorts }
    }

    pub fn lookup(&self, age_band: &str, income_band: &str) -> Result<&[f64]> {
        self.cohorts
            .iter()
            .find(|c| c.age_band == age_band && c.income_band == income_band)
            .map(|c| c.values.as_slice())
            .ok_or_else(|| {
                InsightsError::EmptyCohort(format!(
                    "no cohort for age band '{age_band}' and income band '{income_band}'"
                ))
            })
    }

    pub fn benchmark(
        &self,
        age_band: &str,
        income_band: &str,
        subject_value: f64,
    ) -> Result<BenchmarkResult> {
        benchmark(subject_value, self.lookup(age_band, income_band)?)
    }

    pub fn bands(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cohorts
            .iter()
            .map(|c| (c.age_band.as_str(), c.income_band.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    const EPS: f64 = 1e-9;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    const COHORT: [f64; 4] = [400_000.0, 650_000.0, 950_000.0, 1_500_000.0];

    fn sample_catalog() -> CohortCatalog {
        CohortCatalog::new(vec![CohortDefinition {
            age_band: "25-30".to_string(),
            income_band: "5-8L".to_string(),
            values: COHORT.to_vec(),
        }])
    }

    #[test]
    fn benchmark_ranks_between_buckets() {
        let result = benchmark(1_265_000.0, &COHORT).expect("non-empty cohort");
        assert_approx(result.percentile_rank, 75.0);
        assert_approx(result.delta_from_mean, 390_000.0);
    }

    #[test]
    fn benchmark_counts_ties_at_half_weight() {
        let result = benchmark(650_000.0, &COHORT).expect("non-empty cohort");
        assert_approx(result.percentile_rank, 37.5);

        let all_equal = benchmark(5.0, &[5.0, 5.0, 5.0]).expect("non-empty cohort");
        assert_approx(all_equal.percentile_rank, 50.0);
        assert_approx(all_equal.delta_from_mean, 0.0);
    }

    #[test]
    fn benchmark_extremes() {
        let lowest = benchmark(0.0, &COHORT).expect("non-empty cohort");
        assert_approx(lowest.percentile_rank, 0.0);
        let highest = benchmark(10_000_000.0, &COHORT).expect("non-empty cohort");
        assert_approx(highest.percentile_rank, 100.0);
    }

    #[test]
    fn benchmark_rejects_empty_cohort() {
        let err = benchmark(1.0, &[]).expect_err("empty cohort");
        assert!(matches!(err, InsightsError::EmptyCohort(_)));
    }

    #[test]
    fn benchmark_rejects_non_finite_values() {
        let err = benchmark(f64::INFINITY, &COHORT).expect_err("infinite subject");
        assert_eq!(err.kind(), "malformed_input");
        let err = benchmark(1.0, &[1.0, f64::NAN]).expect_err("nan cohort value");
        assert_eq!(err.kind(), "malformed_input");
    }

    #[test]
    fn benchmark_rejects_cohort_sum_overflow() {
        let err = benchmark(0.0, &[f64::MAX, f64::MAX]).expect_err("mean overflows");
        assert_eq!(err.kind(), "malformed_input");
        let err = benchmark(-f64::MAX, &[f64::MAX]).expect_err("delta overflows");
        assert_eq!(err.kind(), "malformed_input");
    }

    #[test]
    fn distribution_bars_scale_to_largest_value() {
        let bars = distribution_bars(1_265_000.0, &COHORT).expect("non-empty cohort");
        let labels: Vec<&str> = bars.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, ["Bottom 25%", "25-50%", "50-75%", "Top 25%", "You"]);
        assert_approx(bars[3].width_percent, 100.0);
        assert_approx(bars[0].width_percent, 100.0 * 400_000.0 / 1_500_000.0);
        assert!(bars[4].is_subject);
        assert!(!bars[0].is_subject);
    }

    #[test]
    fn distribution_bars_use_generic_labels_for_other_sizes() {
        let bars = distribution_bars(-50.0, &[10.0, 20.0]).expect("non-empty cohort");
        assert_eq!(bars[0].label, "Bucket 1");
        assert_eq!(bars[1].label, "Bucket 2");
        assert_approx(bars[1].width_percent, 100.0);
        assert_approx(bars[2].width_percent, 0.0);
    }

    #[test]
    fn catalog_lookup_by_peer_filters() {
        let catalog = sample_catalog();
        let result = catalog
            .benchmark("25-30", "5-8L", 1_265_000.0)
            .expect("known bands");
        assert_approx(result.percentile_rank, 75.0);
        assert_eq!(catalog.bands().collect::<Vec<_>>(), [("25-30", "5-8L")]);
    }

    #[test]
    fn catalog_unknown_bands_is_empty_cohort() {
        let err = sample_catalog()
            .lookup("35-40", "12L+")
            .expect_err("unknown bands");
        assert_eq!(err.kind(), "empty_cohort");
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_percentile_bounded_and_idempotent(
            cohort in proptest::collection::vec(0u32..2_000_000, 1..12),
            subject in 0u32..2_000_000
        ) {
            let cohort: Vec<f64> = cohort.into_iter().map(f64::from).collect();
            let first = benchmark(subject as f64, &cohort).expect("non-empty cohort");
            let second = benchmark(subject as f64, &cohort).expect("non-empty cohort");
            prop_assert_eq!(first, second);
            prop_assert!((0.0..=100.0).contains(&first.percentile_rank));
        }

        #[test]
        fn prop_percentile_non_decreasing_in_subject(
            cohort in proptest::collection::vec(0u32..1_000, 1..12),
            subject in 0u32..1_000,
            step in 0u32..500
        ) {
            let cohort: Vec<f64> = cohort.into_iter().map(f64::from).collect();
            let low = benchmark(subject as f64, &cohort).expect("non-empty cohort");
            let high = benchmark((subject + step) as f64, &cohort).expect("non-empty cohort");
            prop_assert!(high.percentile_rank >= low.percentile_rank);
        }
    }
}
