// Excel import (xlsx, xlsm, xlsb, xls, ods) and xlsx export

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook};

use profitgrid_recon::CellValue;

use crate::error::IoError;
use crate::sheet::{rows_from_grid, sanitize_sheet_name, Sheet};

/// Maximum rows read per sheet.
pub const MAX_ROWS: usize = 1_048_576;

/// Read every sheet of an Excel-family workbook.
pub fn read_xlsx(path: &Path) -> Result<Vec<Sheet>, IoError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| IoError::Open {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    if sheet_names.is_empty() {
        return Err(IoError::EmptyWorkbook);
    }

    let mut sheets = Vec::with_capacity(sheet_names.len());
    for sheet_name in &sheet_names {
        let range = workbook
            .worksheet_range(sheet_name)
            .map_err(|e| IoError::Read(format!("sheet '{sheet_name}': {e}")))?;

        let (height, _) = range.get_size();
        if height > MAX_ROWS {
            log::warn!("sheet '{sheet_name}' truncated from {height} to {MAX_ROWS} rows");
        }

        let grid = range
            .rows()
            .take(MAX_ROWS)
            .map(|row| row.iter().map(cell_from_data).collect::<Vec<_>>());
        sheets.push(Sheet::new(sheet_name.clone(), rows_from_grid(grid)));
    }

    Ok(sheets)
}

fn cell_from_data(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) if s.is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Number(*n as f64),
        Data::Bool(b) => CellValue::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        // Serial date number; callers that care can convert
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(format!("#{:?}", e)),
    }
}

/// Write sheets to an xlsx file. The header row is bold; numbers stay numeric.
pub fn write_xlsx(path: &Path, sheets: &[Sheet]) -> Result<(), IoError> {
    let mut xlsx_workbook = XlsxWorkbook::new();
    let header_format = Format::new().set_bold();
    let mut used_names: Vec<String> = Vec::with_capacity(sheets.len());

    for sheet in sheets {
        let name = unique_sheet_name(&sheet.name, &used_names);
        used_names.push(name.clone());

        let worksheet = xlsx_workbook
            .add_worksheet()
            .set_name(&name)
            .map_err(|e| IoError::Write(format!("cannot create sheet '{name}': {e}")))?;

        let headers = sheet.headers();
        for (col, header) in headers.iter().enumerate() {
            worksheet
                .write_string_with_format(0, col as u16, header, &header_format)
                .map_err(|e| IoError::Write(e.to_string()))?;
        }

        for (row_idx, row) in sheet.rows.iter().enumerate() {
            let target_row = row_idx as u32 + 1;
            for (col, header) in headers.iter().enumerate() {
                let col = col as u16;
                match row.get(header) {
                    Some(CellValue::Number(n)) => {
                        worksheet
                            .write_number(target_row, col, *n)
                            .map_err(|e| IoError::Write(e.to_string()))?;
                    }
                    Some(CellValue::Text(s)) => {
                        worksheet
                            .write_string(target_row, col, s)
                            .map_err(|e| IoError::Write(e.to_string()))?;
                    }
                    Some(CellValue::Empty) | None => {}
                }
            }
        }
    }

    xlsx_workbook
        .save(path)
        .map_err(|e| IoError::Write(format!("cannot save {}: {e}", path.display())))
}

/// Excel sheet names are unique case-insensitively.
fn unique_sheet_name(name: &str, used: &[String]) -> String {
    let base = sanitize_sheet_name(name);
    let taken = |candidate: &str| used.iter().any(|u| u.eq_ignore_ascii_case(candidate));

    if !taken(&base) {
        return base;
    }
    let mut n = 2;
    loop {
        let suffix = format!(" ({n})");
        let stem: String = base.chars().take(31 - suffix.chars().count()).collect();
        let candidate = format!("{stem}{suffix}");
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
