//! `profitgrid-recon`: product profitability metrics and revenue reconciliation.
//!
//! Pure engine crate: receives a product snapshot and pre-parsed sheet rows,
//! returns metrics and reconciled rows. No CLI or IO dependencies.

pub mod catalog;
pub mod columns;
pub mod config;
pub mod engine;
pub mod error;
pub mod key;
pub mod metrics;
pub mod model;
pub mod project;
pub mod session;
pub mod value;

pub use columns::{ColumnClass, ColumnRules};
pub use config::{OutputConfig, ReconConfig};
pub use engine::{reconcile, reconcile_with};
pub use error::ReconError;
pub use metrics::{compute_activity_metrics, compute_promotion_metrics, MetricsOptions};
pub use model::{ExternalRow, Product, ReconciledRow, Reconciliation, ReconciliationSummary};
pub use project::project_rows;
pub use session::ResultSlot;
pub use value::CellValue;
