use std::collections::HashMap;

use crate::columns::ColumnRules;
use crate::error::ReconError;
use crate::key::{normalize_cell, normalize_key};
use crate::model::{ExternalRow, Product, ReconciledRow, Reconciliation, ReconciliationSummary};

/// Normalized SKU → cost price. Products without a SKU are skipped; on
/// duplicate keys the later product wins.
pub fn build_cost_index(products: &[Product]) -> HashMap<String, f64> {
    let mut index = HashMap::with_capacity(products.len());
    for product in products {
        if let Some(sku) = product.sku() {
            index.insert(normalize_key(sku), product.cost());
        }
    }
    index
}

/// Reconcile revenue rows against the product snapshot using the default
/// column rules.
pub fn reconcile(products: &[Product], rows: &[ExternalRow]) -> Result<Reconciliation, ReconError> {
    reconcile_with(products, rows, &ColumnRules::default())
}

/// Reconcile revenue rows against the product snapshot.
///
/// Columns are discovered on the first row before anything else runs. Rows
/// keep their input order; totals accumulate in the same pass.
pub fn reconcile_with(
    products: &[Product],
    rows: &[ExternalRow],
    rules: &ColumnRules,
) -> Result<Reconciliation, ReconError> {
    let Some(first) = rows.first() else {
        return Ok(Reconciliation::empty());
    };

    let columns = rules.discover(first)?;
    log::debug!(
        "reconcile: sku column '{}', revenue column '{}', {} rows, {} products",
        columns.sku,
        columns.revenue,
        rows.len(),
        products.len()
    );

    let costs = build_cost_index(products);
    let mut summary = ReconciliationSummary::default();
    let mut out = Vec::with_capacity(rows.len());

    for row in rows {
        let key = normalize_cell(row.get(&columns.sku));
        let matched_cost = if key.is_empty() { None } else { costs.get(&key).copied() };
        let cost = matched_cost.unwrap_or(0.0);

        let revenue = row
            .get(&columns.revenue)
            .and_then(|v| v.as_number())
            .unwrap_or(0.0);
        let profit = revenue - cost;

        summary.total_cost += cost;
        summary.total_revenue += revenue;
        summary.total_profit += profit;

        out.push(ReconciledRow {
            cells: row.clone(),
            matched: matched_cost.is_some(),
            revenue,
            cost,
            profit,
        });
    }

    Ok(Reconciliation {
        columns: Some(columns),
        rows: out,
        summary,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
