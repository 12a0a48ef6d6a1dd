use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::metrics::round2;
use crate::value::CellValue;

// ---------------------------------------------------------------------------
// Product
// ---------------------------------------------------------------------------

/// A catalog record. Identity is assigned by the store on first save.
///
/// Price fields keep whatever the user or the source sheet supplied (text or
/// number); the accessors apply the numeric defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Product {
    pub id: Option<i64>,
    pub sku: Option<String>,
    pub skc: Option<String>,
    pub spu: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub image: Option<String>,
    pub purchase_link: Option<String>,
    pub cost_price: CellValue,
    pub declare_price: CellValue,
    pub ad_bid_ratio: CellValue,
    pub update_time: Option<String>,
}

impl Product {
    pub fn with_sku(sku: &str) -> Self {
        Self {
            sku: Some(sku.to_string()),
            ..Self::default()
        }
    }

    /// Cost price, 0 when absent or unparseable.
    pub fn cost(&self) -> f64 {
        self.cost_price.number_or(0.0)
    }

    /// Declared price, 0 when absent or unparseable.
    pub fn declared(&self) -> f64 {
        self.declare_price.number_or(0.0)
    }

    /// Raw ad bid ratio; `None` lets the caller apply its default.
    pub fn ratio(&self) -> Option<f64> {
        self.ad_bid_ratio.as_number()
    }

    /// SKU when present and non-empty.
    pub fn sku(&self) -> Option<&str> {
        self.sku.as_deref().filter(|s| !s.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Input rows
// ---------------------------------------------------------------------------

/// One row of an externally supplied sheet. Column names are arbitrary and
/// keep their source order.
pub type ExternalRow = IndexMap<String, CellValue>;

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// An input row plus the looked-up cost and the derived profit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciledRow {
    pub cells: ExternalRow,
    /// Whether the SKU was found in the product snapshot.
    pub matched: bool,
    pub revenue: f64,
    pub cost: f64,
    pub profit: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationSummary {
    pub total_cost: f64,
    pub total_profit: f64,
    pub total_revenue: f64,
}

impl ReconciliationSummary {
    /// Totals rounded to cents for display. Sums stay exact internally.
    pub fn rounded(self) -> Self {
        Self {
            total_cost: round2(self.total_cost),
            total_profit: round2(self.total_profit),
            total_revenue: round2(self.total_revenue),
        }
    }
}

/// Columns that drove a run, as discovered on the first row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveredColumns {
    pub sku: String,
    pub revenue: String,
}

/// Output of one reconciliation run. Owned by the caller; nothing is retained
/// between runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reconciliation {
    /// `None` only when the input had no rows.
    pub columns: Option<DiscoveredColumns>,
    pub rows: Vec<ReconciledRow>,
    pub summary: ReconciliationSummary,
}

impl Reconciliation {
    pub fn empty() -> Self {
        Self {
            columns: None,
            rows: Vec::new(),
            summary: ReconciliationSummary::default(),
        }
    }

    pub fn matched_count(&self) -> usize {
        self.rows.iter().filter(|r| r.matched).count()
    }
}
