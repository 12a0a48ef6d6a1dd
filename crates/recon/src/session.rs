//! Holder for the most recent reconciliation between import and export.

use crate::config::OutputConfig;
use crate::model::{ExternalRow, Reconciliation};
use crate::project::project_rows;

/// Single-writer slot for the current result. A new run replaces the previous
/// one wholesale; results are never merged.
#[derive(Debug, Default)]
pub struct ResultSlot {
    current: Option<Reconciliation>,
}

impl ResultSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invalidate the current result at the start of a new import.
    pub fn begin_import(&mut self) {
        self.current = None;
    }

    /// Store a fresh result, returning the one it replaced.
    pub fn replace(&mut self, result: Reconciliation) -> Option<Reconciliation> {
        self.current.replace(result)
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<&Reconciliation> {
        self.current.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none()
    }

    /// Projected rows of the current result, or `None` when nothing is held.
    pub fn export_rows(&self, output: &OutputConfig) -> Option<Vec<ExternalRow>> {
        self.current.as_ref().map(|r| project_rows(r, output))
    }
}
