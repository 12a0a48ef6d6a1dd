//! `pgrid profit`: reconcile a revenue report against stored costs.

use std::path::{Path, PathBuf};

use clap::Args;
use serde::Serialize;

use profitgrid_io::{read_sheet, write_workbook, Sheet};
use profitgrid_recon::model::DiscoveredColumns;
use profitgrid_recon::project::projected_headers;
use profitgrid_recon::{
    project_rows, reconcile_with, ExternalRow, OutputConfig, ReconConfig, ReconciliationSummary,
};

use crate::util::{money, render_table};
use crate::{print_json, App, CliError};

const PREVIEW_COLUMN_WIDTH: usize = 24;

#[derive(Args)]
pub struct ProfitArgs {
    /// Revenue report (.xlsx, .xls, .ods or .csv)
    file: PathBuf,

    /// Sheet to read (default: first sheet)
    #[arg(long)]
    sheet: Option<String>,

    /// TOML file with column patterns and output labels
    #[arg(long, value_name = "PATH")]
    rules: Option<PathBuf>,

    /// Write results here (a directory gets 利润计算结果_<date>.xlsx)
    #[arg(long, short = 'o', value_name = "PATH")]
    out: Option<PathBuf>,

    /// Label for the appended cost column
    #[arg(long, value_name = "NAME")]
    cost_column: Option<String>,

    /// Label for the appended profit column
    #[arg(long, value_name = "NAME")]
    profit_column: Option<String>,

    /// Output JSON to stdout instead of the preview table
    #[arg(long)]
    json: bool,
}

/// `--json` payload. Totals are rounded to cents.
#[derive(Serialize)]
struct ProfitReport<'a> {
    sheet: &'a str,
    columns: Option<&'a DiscoveredColumns>,
    matched: usize,
    rows: &'a [ExternalRow],
    summary: ReconciliationSummary,
}

pub fn cmd_profit(app: &App, args: ProfitArgs) -> Result<(), CliError> {
    let rules_text = match &args.rules {
        Some(path) => Some(std::fs::read_to_string(path).map_err(|e| {
            CliError::io(format!("cannot read rules {}: {e}", path.display()))
        })?),
        None => None,
    };
    let config = resolve_config(
        app.output_config(),
        rules_text.as_deref(),
        args.cost_column,
        args.profit_column,
    )?;

    let sheet = read_sheet(&args.file, args.sheet.as_deref())?;
    if sheet.rows.is_empty() {
        eprintln!("sheet is empty: '{}' in {}", sheet.name, args.file.display());
        return Ok(());
    }

    let store = app.open_store()?;
    let products = store.get_all()?;
    log::debug!("{} product(s) in snapshot, {} row(s) in '{}'", products.len(), sheet.rows.len(), sheet.name);

    let result = reconcile_with(&products, &sheet.rows, &config.rules())?;
    let rows = project_rows(&result, &config.output);

    if args.json {
        print_json(&ProfitReport {
            sheet: &sheet.name,
            columns: result.columns.as_ref(),
            matched: result.matched_count(),
            rows: &rows,
            summary: result.summary.rounded(),
        })?;
    } else {
        print_preview(&rows, app.settings.preview_rows);
    }

    let s = result.summary;
    eprintln!(
        "{} row(s), {} matched: revenue {}, cost {}, profit {}",
        result.rows.len(),
        result.matched_count(),
        money(s.total_revenue),
        money(s.total_cost),
        money(s.total_profit)
    );

    if let Some(out) = args.out {
        let path = resolve_output(&out, &chrono::Local::now().format("%Y-%m-%d").to_string());
        write_workbook(&path, &[Sheet::new(sheet.name.clone(), rows)])?;
        eprintln!("wrote {}", path.display());
    }

    Ok(())
}

/// Layer rules over settings, then apply command-line labels.
fn resolve_config(
    settings_output: OutputConfig,
    rules: Option<&str>,
    cost_column: Option<String>,
    profit_column: Option<String>,
) -> Result<ReconConfig, CliError> {
    let base = ReconConfig {
        output: settings_output,
        ..ReconConfig::default()
    };
    let mut config = match rules {
        Some(text) => ReconConfig::from_toml_over(text, &base)?,
        None => base,
    };

    if let Some(label) = cost_column {
        config.output.cost_column = label;
    }
    if let Some(label) = profit_column {
        config.output.profit_column = label;
    }
    config.validate()?;
    Ok(config)
}

/// A directory target gets the dated default file name.
fn resolve_output(out: &Path, date: &str) -> PathBuf {
    if out.is_dir() {
        out.join(format!("利润计算结果_{date}.xlsx"))
    } else {
        out.to_path_buf()
    }
}

fn print_preview(rows: &[ExternalRow], limit: usize) {
    let headers = projected_headers(rows);
    let preview: Vec<Vec<String>> = rows
        .iter()
        .take(limit)
        .map(|row| {
            headers
                .iter()
                .map(|h| row.get(h).map(|v| v.to_text()).unwrap_or_default())
                .collect()
        })
        .collect();
    print!("{}", render_table(&headers, &preview, PREVIEW_COLUMN_WIDTH));
    if rows.len() > limit {
        eprintln!("showing first {} of {} rows", limit, rows.len());
    }
}
