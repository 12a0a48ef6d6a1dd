//! Per-product profitability under the two promotional models.
//!
//! Both metric sets are total: bad or missing inputs degrade to the documented
//! defaults and every field is always populated.

use serde::Serialize;

use crate::model::Product;

/// Activity price discount (95% of the declared price).
pub const ACTIVITY_DISCOUNT: f64 = 0.95;

/// Ratio used when a product carries no usable ad bid ratio.
pub const DEFAULT_AD_BID_RATIO: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricsOptions {
    pub activity_discount: f64,
    /// Applied when the product's ratio is absent or unparseable. A value
    /// `<= 0` here disables the ad fee for such products.
    pub default_ad_bid_ratio: f64,
}

impl Default for MetricsOptions {
    fn default() -> Self {
        Self {
            activity_discount: ACTIVITY_DISCOUNT,
            default_ad_bid_ratio: DEFAULT_AD_BID_RATIO,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionMetrics {
    pub ad_fee: f64,
    pub promotion_profit: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityMetrics {
    pub sell_price: f64,
    pub profit: f64,
    /// Percentage, one decimal place.
    pub profit_rate: f64,
}

/// Both metric sets for one product.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProductMetrics {
    pub activity: ActivityMetrics,
    pub promotion: PromotionMetrics,
}

pub fn compute_promotion_metrics(product: &Product, options: &MetricsOptions) -> PromotionMetrics {
    let declare = product.declared();
    let cost = product.cost();
    let ratio = product.ratio().unwrap_or(options.default_ad_bid_ratio);

    let ad_fee = if ratio > 0.0 { round2(declare / ratio) } else { 0.0 };

    PromotionMetrics {
        ad_fee,
        promotion_profit: round2(declare - ad_fee - cost),
    }
}

pub fn compute_activity_metrics(product: &Product, options: &MetricsOptions) -> ActivityMetrics {
    let declare = product.declared();
    let cost = product.cost();

    let sell = declare * options.activity_discount;
    let profit = sell - cost;
    let profit_rate = if sell > 0.0 { round1(profit / sell * 100.0) } else { 0.0 };

    ActivityMetrics {
        sell_price: round2(sell),
        profit: round2(profit),
        profit_rate,
    }
}

pub fn compute_metrics(product: &Product, options: &MetricsOptions) -> ProductMetrics {
    ProductMetrics {
        activity: compute_activity_metrics(product, options),
        promotion: compute_promotion_metrics(product, options),
    }
}

/// Round half away from zero to 2 decimal places.
pub fn round2(x: f64) -> f64 {
    round_to(x, 100.0)
}

/// Round half away from zero to 1 decimal place.
pub fn round1(x: f64) -> f64 {
    round_to(x, 10.0)
}

fn round_to(x: f64, scale: f64) -> f64 {
    if !x.is_finite() {
        return 0.0;
    }
    let r = (x * scale).round() / scale;
    // Normalise -0.0 so output never prints as "-0.00".
    if r == 0.0 { 0.0 } else { r }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::CellValue;

    fn product(cost: impl Into<CellValue>, declare: impl Into<CellValue>, ratio: impl Into<CellValue>) -> Product {
        Product {
            cost_price: cost.into(),
            declare_price: declare.into(),
            ad_bid_ratio: ratio.into(),
            ..Product::default()
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn promotion_with_ratio() {
        let m = compute_promotion_metrics(&product(30.0, 100.0, 4.0), &MetricsOptions::default());
        assert!(approx(m.ad_fee, 25.0));
        assert!(approx(m.promotion_profit, 45.0));
    }

    #[test]
    fn promotion_missing_ratio_uses_default() {
        let m = compute_promotion_metrics(&product(30.0, 100.0, CellValue::Empty), &MetricsOptions::default());
        assert!(approx(m.ad_fee, 100.0));
        assert!(approx(m.promotion_profit, -30.0));
    }

    #[test]
    fn promotion_non_positive_ratio_has_no_fee() {
        for ratio in [0.0, -2.0] {
            let m = compute_promotion_metrics(&product(30.0, 100.0, ratio), &MetricsOptions::default());
            assert_eq!(m.ad_fee, 0.0);
            assert!(approx(m.promotion_profit, 70.0));
        }
    }

    #[test]
    fn promotion_default_ratio_can_disable_fee() {
        let options = MetricsOptions { default_ad_bid_ratio: 0.0, ..MetricsOptions::default() };
        let m = compute_promotion_metrics(&product(30.0, 100.0, "n/a"), &options);
        assert_eq!(m.ad_fee, 0.0);
        assert!(approx(m.promotion_profit, 70.0));
    }

    #[test]
    fn activity_metrics() {
        let m = compute_activity_metrics(&product(50.0, 100.0, CellValue::Empty), &MetricsOptions::default());
        assert!(approx(m.sell_price, 95.0));
        assert!(approx(m.profit, 45.0));
        assert!(approx(m.profit_rate, 47.4));
    }

    #[test]
    fn activity_zero_sell_price_has_zero_rate() {
        let m = compute_activity_metrics(&product(10.0, CellValue::Empty, CellValue::Empty), &MetricsOptions::default());
        assert_eq!(m.sell_price, 0.0);
        assert!(approx(m.profit, -10.0));
        assert_eq!(m.profit_rate, 0.0);
    }

    #[test]
    fn text_prices_parse() {
        let m = compute_activity_metrics(&product("20", "40.00", "2"), &MetricsOptions::default());
        assert!(approx(m.sell_price, 38.0));
        assert!(approx(m.profit, 18.0));
    }

    #[test]
    fn garbage_inputs_default_to_zero() {
        let p = product("abc", "xyz", "??");
        let m = compute_metrics(&p, &MetricsOptions::default());
        assert_eq!(m.activity.sell_price, 0.0);
        assert_eq!(m.activity.profit, 0.0);
        assert_eq!(m.activity.profit_rate, 0.0);
        assert_eq!(m.promotion.ad_fee, 0.0);
        assert_eq!(m.promotion.promotion_profit, 0.0);
    }

    #[test]
    fn rounding_is_half_away_from_zero() {
        assert_eq!(round2(2.345_000_1), 2.35);
        assert_eq!(round2(-2.345_000_1), -2.35);
        assert_eq!(round1(12.25), 12.3);
        assert_eq!(round2(-0.001), 0.0);
        assert!(round2(-0.001).is_sign_positive());
    }
}
