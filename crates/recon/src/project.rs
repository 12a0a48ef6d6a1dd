//! Projection of a reconciliation into plain rows for a tabular writer.

use crate::config::OutputConfig;
use crate::model::{ExternalRow, Reconciliation};
use crate::value::CellValue;

/// Plain rows ready for a sheet writer: every original column plus the cost
/// and profit columns. The summary is not part of the row sequence.
///
/// When a source column already carries one of the output labels its value is
/// replaced in place, so column order is stable.
pub fn project_rows(result: &Reconciliation, output: &OutputConfig) -> Vec<ExternalRow> {
    result
        .rows
        .iter()
        .map(|row| {
            let mut cells = row.cells.clone();
            cells.insert(output.cost_column.clone(), CellValue::Number(row.cost));
            cells.insert(output.profit_column.clone(), CellValue::Number(row.profit));
            cells
        })
        .collect()
}

/// Column headers for the projected rows, in first-seen order across all rows.
pub fn projected_headers(rows: &[ExternalRow]) -> Vec<String> {
    let mut headers: Vec<String> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::reconcile;
    use crate::model::Product;

    fn row(cells: &[(&str, CellValue)]) -> ExternalRow {
        cells.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn appends_cost_and_profit() {
        let products = vec![Product { cost_price: 10.0.into(), ..Product::with_sku("abc123") }];
        let rows = vec![row(&[("SKU", "ABC123".into()), ("收入", 50.0.into())])];
        let result = reconcile(&products, &rows).unwrap();

        let projected = project_rows(&result, &OutputConfig::default());
        assert_eq!(projected.len(), 1);
        let keys: Vec<&str> = projected[0].keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["SKU", "收入", "cost", "profit"]);
        assert_eq!(projected[0]["cost"], CellValue::Number(10.0));
        assert_eq!(projected[0]["profit"], CellValue::Number(40.0));
    }

    #[test]
    fn existing_label_is_overwritten_in_place() {
        let rows = vec![row(&[("cost", "old".into()), ("sku", "x".into()), ("revenue", 3.0.into())])];
        let result = reconcile(&[], &rows).unwrap();

        let projected = project_rows(&result, &OutputConfig::default());
        let keys: Vec<&str> = projected[0].keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["cost", "sku", "revenue", "profit"]);
        assert_eq!(projected[0]["cost"], CellValue::Number(0.0));
    }

    #[test]
    fn custom_labels() {
        let rows = vec![row(&[("sku", "x".into()), ("revenue", 3.0.into())])];
        let result = reconcile(&[], &rows).unwrap();
        let output = OutputConfig { cost_column: "成本".into(), profit_column: "利润".into() };

        let projected = project_rows(&result, &output);
        assert_eq!(projected[0]["利润"], CellValue::Number(3.0));
        assert!(!projected[0].contains_key("profit"));
    }

    #[test]
    fn headers_union_in_order() {
        let rows = vec![
            row(&[("a", CellValue::Empty), ("b", CellValue::Empty)]),
            row(&[("b", CellValue::Empty), ("c", CellValue::Empty)]),
        ];
        assert_eq!(projected_headers(&rows), vec!["a", "b", "c"]);
    }
}
