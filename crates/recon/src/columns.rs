//! Heuristic discovery of the SKU and revenue columns.
//!
//! Each column class owns an ordered list of case-insensitive substring
//! patterns. Columns are scanned in source order; the first column matching
//! any pattern of a class wins for that class.

use std::fmt;

use serde::Serialize;

use crate::error::ReconError;
use crate::model::{DiscoveredColumns, ExternalRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnClass {
    Sku,
    Revenue,
}

impl fmt::Display for ColumnClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sku => write!(f, "sku"),
            Self::Revenue => write!(f, "revenue"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRules {
    pub sku: Vec<String>,
    pub revenue: Vec<String>,
}

impl Default for ColumnRules {
    fn default() -> Self {
        Self {
            sku: vec!["sku".into()],
            revenue: vec!["收入".into(), "revenue".into(), "金额".into()],
        }
    }
}

impl ColumnRules {
    pub fn patterns(&self, class: ColumnClass) -> &[String] {
        match class {
            ColumnClass::Sku => &self.sku,
            ColumnClass::Revenue => &self.revenue,
        }
    }

    pub fn matches(&self, class: ColumnClass, column: &str) -> bool {
        let lower = column.to_lowercase();
        self.patterns(class)
            .iter()
            .any(|p| lower.contains(&p.to_lowercase()))
    }

    /// First of `columns` belonging to `class`.
    pub fn find<'a, I>(&self, class: ColumnClass, columns: I) -> Option<&'a str>
    where
        I: IntoIterator<Item = &'a String>,
    {
        columns
            .into_iter()
            .find(|c| self.matches(class, c))
            .map(String::as_str)
    }

    /// Discover both columns from the first row. Fails on the first class
    /// (SKU, then revenue) with no matching column.
    pub fn discover(&self, first_row: &ExternalRow) -> Result<DiscoveredColumns, ReconError> {
        let sku = self
            .find(ColumnClass::Sku, first_row.keys())
            .ok_or(ReconError::MissingColumn { class: ColumnClass::Sku })?;
        let revenue = self
            .find(ColumnClass::Revenue, first_row.keys())
            .ok_or(ReconError::MissingColumn { class: ColumnClass::Revenue })?;

        Ok(DiscoveredColumns {
            sku: sku.to_string(),
            revenue: revenue.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
