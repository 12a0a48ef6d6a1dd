// CSV/TSV import/export

use std::io::Read;
use std::path::Path;

use profitgrid_recon::CellValue;

use crate::error::IoError;
use crate::sheet::{rows_from_grid, Sheet};

/// Read a delimited text file as a single sheet named after the file stem.
///
/// Cells are kept as text so identifiers like `00123` survive unchanged;
/// numeric columns parse later where they are needed.
pub fn read_csv(path: &Path) -> Result<Sheet, IoError> {
    let content = read_file_as_utf8(path)?;
    let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
    let delimiter = sniff_delimiter(content);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut grid = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| IoError::Read(e.to_string()))?;
        grid.push(
            record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        CellValue::Empty
                    } else {
                        CellValue::Text(field.to_string())
                    }
                })
                .collect::<Vec<_>>(),
        );
    }

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Sheet1")
        .to_string();
    Ok(Sheet::new(name, rows_from_grid(grid.into_iter())))
}

/// Write a sheet as comma-separated UTF-8 with a header row.
pub fn write_csv(path: &Path, sheet: &Sheet) -> Result<(), IoError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| IoError::Write(e.to_string()))?;
    let headers = sheet.headers();

    writer
        .write_record(&headers)
        .map_err(|e| IoError::Write(e.to_string()))?;

    for row in &sheet.rows {
        let record: Vec<String> = headers
            .iter()
            .map(|h| row.get(h).map(CellValue::to_text).unwrap_or_default())
            .collect();
        writer
            .write_record(&record)
            .map_err(|e| IoError::Write(e.to_string()))?;
    }

    writer.flush().map_err(|e| IoError::Write(e.to_string()))
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        // Consistent lines × field count; more columns breaks ties
        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read file and convert to UTF-8 if needed (Excel on Windows often saves GBK
/// or Windows-1252 CSVs).
pub fn read_file_as_utf8(path: &Path) -> Result<String, IoError> {
    let open_err = |e: std::io::Error| IoError::Open {
        path: path.display().to_string(),
        message: e.to_string(),
    };
    let mut file = std::fs::File::open(path).map_err(open_err)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(open_err)?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            // GBK first (Chinese-locale Excel), then Windows-1252
            let (decoded, _, had_errors) = encoding_rs::GBK.decode(&bytes);
            if !had_errors {
                return Ok(decoded.into_owned());
            }
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(ext: &str, bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut f = tempfile::Builder::new().suffix(ext).tempfile().unwrap();
        f.write_all(bytes).unwrap();
        f
    }

    #[test]
    fn sniff_semicolon() {
        assert_eq!(sniff_delimiter("a;b;c\n1;2;3\n"), b';');
        assert_eq!(sniff_delimiter("a,b\n1,2\n"), b',');
        assert_eq!(sniff_delimiter("a\tb\n1\t2\n"), b'\t');
    }

    #[test]
    fn read_with_bom_and_text_cells() {
        let f = write_temp(".csv", "\u{feff}SKU,收入\n00123,50\n,\nabc,7.5\n".as_bytes());
        let sheet = read_csv(f.path()).unwrap();
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.headers(), vec!["SKU", "收入"]);
        assert_eq!(sheet.rows[0]["SKU"], CellValue::Text("00123".into()));
        assert_eq!(sheet.rows[1]["收入"].as_number(), Some(7.5));
    }

    #[test]
    fn read_gbk_encoded() {
        let (encoded, _, _) = encoding_rs::GBK.encode("SKU,收入\nA,1\n");
        let f = write_temp(".csv", &encoded);
        let sheet = read_csv(f.path()).unwrap();
        assert_eq!(sheet.headers(), vec!["SKU", "收入"]);
    }

    #[test]
    fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let row = [
            ("SKU".to_string(), CellValue::from("A")),
            ("profit".to_string(), CellValue::Number(40.0)),
        ]
        .into_iter()
        .collect();
        write_csv(&path, &Sheet::new("out", vec![row])).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "SKU,profit\nA,40\n");
    }
}
