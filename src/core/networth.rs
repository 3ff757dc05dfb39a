use super::types::{Category, FinancialRecord, LineItem, LineItemShare, NetWorthSummary};
use crate::error::{InsightsError, Result};

#[derive(Debug, Clone, Copy, Default)]
struct CategoryTotals {
    assets: f64,
    liabilities: f64,
}

impl CategoryTotals {
    fn of(self, category: Category) -> f64 {
        match category {
            Category::Asset => self.assets,
            Category::Liability => self.liabilities,
        }
    }

    fn combined(self) -> f64 {
        self.assets + self.liabilities
    }
}

pub fn aggregate(record: &FinancialRecord) -> Result<NetWorthSummary> {
    let totals = category_totals(record)?;
    let summary = NetWorthSummary {
        total_assets: totals.assets,
        total_liabilities: totals.liabilities,
        net_worth: totals.assets - totals.liabilities,
        asset_ratio: totals.assets / totals.combined(),
    };
    tracing::debug!(
        items = record.items.len(),
        net_worth = summary.net_worth,
        asset_ratio = summary.asset_ratio,
        "aggregated financial record"
    );
    Ok(summary)
}

/// Share of each line item within its own category, in record order.
pub fn composition(record: &FinancialRecord) -> Result<Vec<LineItemShare>> {
    let totals = category_totals(record)?;
    Ok(record
        .items
        .iter()
        .map(|item| {
            let category_total = totals.of(item.category);
            LineItemShare {
                name: item.name.clone(),
                category: item.category,
                amount: item.amount,
                share_of_category: if category_total > 0.0 {
                    item.amount / category_total
                } else {
                    0.0
                },
            }
        })
        .collect())
}

fn category_totals(record: &FinancialRecord) -> Result<CategoryTotals> {
    let mut totals = CategoryTotals::default();
    for item in &record.items {
        validate_line_item(item)?;
        match item.category {
            Category::Asset => totals.assets += item.amount,
            Category::Liability => totals.liabilities += item.amount,
        }
    }

    if !totals.combined().is_finite() {
        return Err(InsightsError::MalformedInput(
            "asset and liability totals exceed the representable range".to_string(),
        ));
    }
    if totals.combined() <= 0.0 {
        return Err(InsightsError::InsufficientData(
            "record has no non-zero assets or liabilities".to_string(),
        ));
    }
    Ok(totals)
}

fn validate_line_item(item: &LineItem) -> Result<()> {
    if !item.amount.is_finite() {
        return Err(InsightsError::MalformedInput(format!(
            "amount for '{}' must be a finite number",
            item.name
        )));
    }
    if item.amount < 0.0 {
        return Err(InsightsError::MalformedInput(format!(
            "amount for '{}' must be >= 0; sign is carried by category",
            item.name
        )));
    }
    Ok(())
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

    fn sample_record() -> FinancialRecord {
        FinancialRecord::from_parts(
            vec![
                LineItem::asset("Savings Account", 285_000.0),
                LineItem::asset("Mutual Funds", 450_000.0),
                LineItem::asset("Car", 650_000.0),
                LineItem::asset("Property", 850_000.0),
            ],
            vec![
                LineItem::liability("Home Loan", 320_000.0),
                LineItem::liability("Credit Card", 45_000.0),
                LineItem::liability("Personal Loan", 85_000.0),
            ],
        )
    }

    #[test]
    fn aggregate_sums_by_category() {
        let summary = aggregate(&sample_record()).expect("valid record");
        assert_approx(summary.total_assets, 2_235_000.0);
        assert_approx(summary.total_liabilities, 450_000.0);
        assert_approx(summary.net_worth, 1_785_000.0);
        assert_approx(summary.asset_ratio, 2_235_000.0 / 2_685_000.0);
    }

    #[test]
    fn aggregate_allows_negative_net_worth() {
        let record = FinancialRecord::from_parts(
            vec![LineItem::asset("Cash", 1_000.0)],
            vec![LineItem::liability("Loan", 5_000.0)],
        );
        let summary = aggregate(&record).expect("negative net worth is valid");
        assert_approx(summary.net_worth, -4_000.0);
        assert_approx(summary.asset_ratio, 1_000.0 / 6_000.0);
    }

    #[test]
    fn aggregate_liabilities_only_gives_zero_ratio() {
        let record = FinancialRecord::new(vec![LineItem::liability("Loan", 10.0)]);
        let summary = aggregate(&record).expect("valid record");
        assert_approx(summary.asset_ratio, 0.0);
    }

    #[test]
    fn aggregate_rejects_empty_record() {
        let err = aggregate(&FinancialRecord::default()).expect_err("empty record");
        assert!(matches!(err, InsightsError::InsufficientData(_)));
    }

    #[test]
    fn aggregate_rejects_all_zero_record() {
        let record = FinancialRecord::from_parts(
            vec![LineItem::asset("Cash", 0.0)],
            vec![LineItem::liability("Loan", 0.0)],
        );
        let err = aggregate(&record).expect_err("zero totals");
        assert_eq!(err.kind(), "insufficient_data");
    }

    #[test]
    fn aggregate_rejects_negative_amount() {
        let record = FinancialRecord::new(vec![LineItem::asset("Cash", -5.0)]);
        let err = aggregate(&record).expect_err("negative amount");
        assert!(matches!(err, InsightsError::MalformedInput(_)));
    }

    #[test]
    fn aggregate_rejects_nan_amount() {
        let record = FinancialRecord::new(vec![LineItem::asset("Cash", f64::NAN)]);
        let err = aggregate(&record).expect_err("nan amount");
        assert_eq!(err.kind(), "malformed_input");
    }

    #[test]
    fn aggregate_rejects_totals_that_overflow() {
        let record = FinancialRecord::new(vec![
            LineItem::asset("Gold", f64::MAX),
            LineItem::asset("Land", f64::MAX),
        ]);
        let err = aggregate(&record).expect_err("assets overflow");
        assert_eq!(err.kind(), "malformed_input");

        let record = FinancialRecord::from_parts(
            vec![LineItem::asset("Gold", f64::MAX)],
            vec![LineItem::liability("Loan", f64::MAX)],
        );
        let err = composition(&record).expect_err("combined total overflows");
        assert!(matches!(err, InsightsError::MalformedInput(_)));
    }

    #[test]
    fn composition_preserves_order_and_shares_sum_to_one_per_category() {
        let shares = composition(&sample_record()).expect("valid record");
        assert_eq!(shares.len(), 7);
        assert_eq!(shares[0].name, "Savings Account");
        assert_eq!(shares[6].name, "Personal Loan");

        let asset_share: f64 = shares
            .iter()
            .filter(|s| s.category == Category::Asset)
            .map(|s| s.share_of_category)
            .sum();
        let liability_share: f64 = shares
            .iter()
            .filter(|s| s.category == Category::Liability)
            .map(|s| s.share_of_category)
            .sum();
        assert_approx(asset_share, 1.0);
        assert_approx(liability_share, 1.0);
        assert_approx(shares[4].share_of_category, 320_000.0 / 450_000.0);
    }

    #[test]
    fn composition_zero_category_total_gives_zero_share() {
        let record = FinancialRecord::from_parts(
            vec![LineItem::asset("Cash", 100.0)],
            vec![LineItem::liability("Paid off", 0.0)],
        );
        let shares = composition(&record).expect("valid record");
        assert_approx(shares[0].share_of_category, 1.0);
        assert_approx(shares[1].share_of_category, 0.0);
    }

    #[test]
    fn aggregate_is_idempotent() {
        let record = sample_record();
        assert_eq!(aggregate(&record), aggregate(&record));
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_net_worth_is_exact_difference_and_ratio_bounded(
            assets in proptest::collection::vec(0u32..5_000_000, 0..8),
            liabilities in proptest::collection::vec(0u32..5_000_000, 0..8),
            extra in 1u32..1_000
        ) {
            let mut record = FinancialRecord::from_parts(
                assets.iter().map(|a| LineItem::asset("a", *a as f64)).collect(),
                liabilities.iter().map(|l| LineItem::liability("l", *l as f64)).collect(),
            );
            record.items.push(LineItem::asset("floor", extra as f64));

            let summary = aggregate(&record).expect("non-zero record");
            prop_assert_eq!(summary.net_worth, summary.total_assets - summary.total_liabilities);
            prop_assert!((0.0..=1.0).contains(&summary.asset_ratio));
        }
    }
}
