//! Tabular files as named sequences of header-keyed rows.
//!
//! The first row of every sheet is the header row. Each following row becomes
//! an [`ExternalRow`] keyed by header name, in column order. Rows with no
//! non-empty cell are dropped.

use std::path::Path;

use profitgrid_recon::project::projected_headers;
use profitgrid_recon::{CellValue, ExternalRow};

use crate::error::IoError;

/// One named sheet of header-keyed rows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<ExternalRow>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, rows: Vec<ExternalRow>) -> Self {
        Self { name: name.into(), rows }
    }

    /// Column headers across all rows, in first-seen order.
    pub fn headers(&self) -> Vec<String> {
        projected_headers(&self.rows)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabularFormat {
    Csv,
    Excel,
}

impl TabularFormat {
    pub fn from_path(path: &Path) -> Result<Self, IoError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "csv" | "tsv" | "txt" => Ok(Self::Csv),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(Self::Excel),
            other => Err(IoError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Read every sheet of a tabular file.
pub fn read_workbook(path: &Path) -> Result<Vec<Sheet>, IoError> {
    let sheets = match TabularFormat::from_path(path)? {
        TabularFormat::Csv => vec![crate::csv::read_csv(path)?],
        TabularFormat::Excel => crate::xlsx::read_xlsx(path)?,
    };
    if sheets.is_empty() {
        return Err(IoError::EmptyWorkbook);
    }
    log::debug!(
        "read {}: {} sheet(s), {} row(s) in first",
        path.display(),
        sheets.len(),
        sheets[0].rows.len()
    );
    Ok(sheets)
}

/// Read the named sheet, or the first sheet when `name` is `None`.
pub fn read_sheet(path: &Path, name: Option<&str>) -> Result<Sheet, IoError> {
    let mut sheets = read_workbook(path)?;
    match name {
        None => Ok(sheets.swap_remove(0)),
        Some(wanted) => {
            let idx = sheets
                .iter()
                .position(|s| s.name == wanted)
                .ok_or_else(|| IoError::SheetNotFound(wanted.to_string()))?;
            Ok(sheets.swap_remove(idx))
        }
    }
}

/// Write sheets to `path`. CSV targets accept exactly the first sheet.
pub fn write_workbook(path: &Path, sheets: &[Sheet]) -> Result<(), IoError> {
    match TabularFormat::from_path(path)? {
        TabularFormat::Csv => {
            let sheet = sheets.first().ok_or(IoError::EmptyWorkbook)?;
            if sheets.len() > 1 {
                log::warn!(
                    "{} sheet(s) dropped: CSV output holds a single sheet",
                    sheets.len() - 1
                );
            }
            crate::csv::write_csv(path, sheet)
        }
        TabularFormat::Excel => crate::xlsx::write_xlsx(path, sheets),
    }
}

/// Turn a header row plus data rows into keyed rows.
///
/// Blank headers become `__EMPTY`, `__EMPTY_1`, …; repeated headers get a
/// `_1`, `_2`, … suffix. Blank cells are kept as [`CellValue::Empty`] so every
/// row carries every column.
pub fn rows_from_grid<I>(mut grid: I) -> Vec<ExternalRow>
where
    I: Iterator<Item = Vec<CellValue>>,
{
    let Some(header_cells) = grid.next() else {
        return Vec::new();
    };
    let headers = unique_headers(&header_cells);

    grid.filter(|cells| cells.iter().any(|c| !c.is_empty()))
        .map(|cells| {
            let mut cells = cells.into_iter();
            headers
                .iter()
                .map(|h| (h.clone(), cells.next().unwrap_or_default()))
                .collect()
        })
        .collect()
}

fn unique_headers(cells: &[CellValue]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(cells.len());
    for cell in cells {
        let base = match cell.to_text() {
            s if s.trim().is_empty() => "__EMPTY".to_string(),
            s => s,
        };
        let mut name = base.clone();
        let mut n = 1;
        while out.contains(&name) {
            name = format!("{base}_{n}");
            n += 1;
        }
        out.push(name);
    }
    out
}

/// Make a string acceptable as an Excel sheet name: no `[]:*?/\`, at most
/// 31 characters, never blank.
pub fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\') { '_' } else { c })
        .take(31)
        .collect();
    let trimmed = cleaned.trim_matches('\'').trim();
    if trimmed.is_empty() {
        "Sheet".to_string()
    } else {
        trimmed.to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
