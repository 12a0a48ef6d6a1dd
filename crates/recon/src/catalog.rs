use crate::metrics::{compute_metrics, MetricsOptions, ProductMetrics};
use crate::model::Product;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Profit at the activity (discounted) price.
    ActivityProfit,
    /// Profit after the ad fee.
    PromotionProfit,
}

impl SortKey {
    fn value(self, metrics: &ProductMetrics) -> f64 {
        match self {
            Self::ActivityProfit => metrics.activity.profit,
            Self::PromotionProfit => metrics.promotion.promotion_profit,
        }
    }
}

/// Pair every product with its metrics and stable-sort by the chosen one.
pub fn sort_by_metric(
    products: Vec<Product>,
    key: SortKey,
    ascending: bool,
    options: &MetricsOptions,
) -> Vec<(Product, ProductMetrics)> {
    let mut scored: Vec<(Product, ProductMetrics)> = products
        .into_iter()
        .map(|p| {
            let m = compute_metrics(&p, options);
            (p, m)
        })
        .collect();

    scored.sort_by(|(_, a), (_, b)| {
        let ord = key.value(a).total_cmp(&key.value(b));
        if ascending { ord } else { ord.reverse() }
    });
    scored
}
