use crate::value::CellValue;

/// Canonical matching key for a SKU-like value: uppercased, otherwise verbatim.
///
/// No trimming is applied, so `" abc"` and `"ABC"` are different keys.
/// Absent values normalize to the empty string, which never matches.
pub fn normalize_key(raw: &str) -> String {
    raw.to_uppercase()
}

/// Normalize a sheet cell. Numbers render without a trailing `.0`.
pub fn normalize_cell(cell: Option<&CellValue>) -> String {
    match cell {
        Some(value) => normalize_key(&value.to_text()),
        None => String::new(),
    }
}
