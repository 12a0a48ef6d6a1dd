// Property-based tests for metrics and reconciliation.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use proptest::prelude::*;
use profitgrid_recon::metrics::{
    compute_activity_metrics, compute_promotion_metrics, round2, MetricsOptions,
};
use profitgrid_recon::{reconcile, CellValue, ExternalRow, Product};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

fn arb_price() -> impl Strategy<Value = f64> {
    (0u32..1_000_000).prop_map(|cents| cents as f64 / 100.0)
}

/// Revenue cell: mostly numeric, sometimes numeric text, sometimes junk.
fn arb_revenue_cell() -> impl Strategy<Value = CellValue> {
    prop_oneof![
        3 => (-100_000i64..100_000).prop_map(|c| CellValue::Number(c as f64 / 100.0)),
        1 => r"-?[0-9]{1,5}(\.[0-9]{1,2})?".prop_map(CellValue::Text),
        1 => r"[a-z ]{0,6}".prop_map(CellValue::Text),
        1 => Just(CellValue::Empty),
    ]
}

fn arb_sku() -> impl Strategy<Value = String> {
    r"[a-dA-D][0-9]"
}

fn arb_products() -> impl Strategy<Value = Vec<Product>> {
    prop::collection::vec((arb_sku(), arb_price()), 0..8).prop_map(|items| {
        items
            .into_iter()
            .map(|(sku, cost)| Product {
                cost_price: CellValue::Number(cost),
                ..Product::with_sku(&sku)
            })
            .collect()
    })
}

fn arb_rows() -> impl Strategy<Value = Vec<ExternalRow>> {
    prop::collection::vec((arb_sku(), arb_revenue_cell()), 0..20).prop_map(|items| {
        items
            .into_iter()
            .enumerate()
            .map(|(i, (sku, revenue))| {
                [
                    ("line".to_string(), CellValue::Number(i as f64)),
                    ("SKU".to_string(), CellValue::Text(sku)),
                    ("Revenue".to_string(), revenue),
                ]
                .into_iter()
                .collect()
            })
            .collect()
    })
}

// ---------------------------------------------------------------------------
// Metrics properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn non_positive_ratio_has_no_ad_fee(
        cost in arb_price(),
        declare in arb_price(),
        ratio in -50.0..=0.0f64,
    ) {
        let p = Product {
            cost_price: cost.into(),
            declare_price: declare.into(),
            ad_bid_ratio: ratio.into(),
            ..Product::default()
        };
        let m = compute_promotion_metrics(&p, &MetricsOptions::default());
        prop_assert_eq!(m.ad_fee, 0.0);
        prop_assert_eq!(m.promotion_profit, round2(declare - cost));
    }

    #[test]
    fn activity_profit_is_rounded_discounted_margin(
        cost in arb_price(),
        declare in arb_price(),
    ) {
        let p = Product {
            cost_price: cost.into(),
            declare_price: declare.into(),
            ..Product::default()
        };
        let m = compute_activity_metrics(&p, &MetricsOptions::default());
        prop_assert_eq!(m.profit, round2(declare * 0.95 - cost));
    }
}

// ---------------------------------------------------------------------------
// Reconciliation properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn order_and_length_preserved(products in arb_products(), rows in arb_rows()) {
        let result = reconcile(&products, &rows).unwrap();
        prop_assert_eq!(result.rows.len(), rows.len());
        for (out, input) in result.rows.iter().zip(rows.iter()) {
            prop_assert_eq!(&out.cells, input);
        }
    }

    #[test]
    fn totals_equal_row_sums(products in arb_products(), rows in arb_rows()) {
        let result = reconcile(&products, &rows).unwrap();
        let sum = |f: fn(&profitgrid_recon::ReconciledRow) -> f64| {
            result.rows.iter().map(f).fold(0.0, |acc, x| acc + x)
        };
        prop_assert_eq!(result.summary.total_profit, sum(|r| r.profit));
        prop_assert_eq!(result.summary.total_cost, sum(|r| r.cost));
        prop_assert_eq!(result.summary.total_revenue, sum(|r| r.revenue));
    }

    #[test]
    fn unmatched_rows_keep_full_revenue(rows in arb_rows()) {
        let result = reconcile(&[], &rows).unwrap();
        for r in &result.rows {
            prop_assert!(!r.matched);
            prop_assert_eq!(r.cost, 0.0);
            prop_assert_eq!(r.profit, r.revenue);
        }
    }

    #[test]
    fn deterministic(products in arb_products(), rows in arb_rows()) {
        let a = reconcile(&products, &rows).unwrap();
        let b = reconcile(&products, &rows).unwrap();
        prop_assert_eq!(a, b);
    }
}
