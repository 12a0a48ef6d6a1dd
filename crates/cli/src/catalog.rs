//! `pgrid catalog` and `pgrid backup`.

use std::path::PathBuf;

use clap::Subcommand;

use profitgrid_io::backup::{read_backup, write_backup};
use profitgrid_io::catalog::{export_catalog, import_catalog};
use profitgrid_io::CatalogLayout;

use crate::{print_json, App, CliError};

#[derive(Subcommand)]
pub enum CatalogCommands {
    /// Write all products to a workbook, one sheet per category
    #[command(after_help = "\
Examples:
  pgrid catalog export products.xlsx
  pgrid catalog export promotion.xlsx --layout promotion")]
    Export {
        /// Output workbook (.xlsx; .csv keeps only the first category)
        output: PathBuf,

        /// Column layout: products or promotion
        #[arg(long, default_value = "products")]
        layout: CatalogLayout,
    },

    /// Add products from a catalog workbook; existing SKUs are skipped
    #[command(after_help = "\
Examples:
  pgrid catalog import products.xlsx
  pgrid catalog import products.xlsx --json")]
    Import {
        /// Workbook whose sheet names are categories
        input: PathBuf,

        /// Output the import summary as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum BackupCommands {
    /// Write products and categories to a JSON file
    Export {
        /// Output file
        output: PathBuf,
    },

    /// Restore products and categories from a JSON backup
    Import {
        /// Backup file
        input: PathBuf,
    },
}

pub fn cmd_catalog(app: &App, cmd: CatalogCommands) -> Result<(), CliError> {
    let store = app.open_store()?;
    match cmd {
        CatalogCommands::Export { output, layout } => {
            let products = store.get_all()?;
            if products.is_empty() {
                return Err(CliError::not_found("no products to export")
                    .with_hint("add products with: pgrid product add --sku ..."));
            }
            let sheets = export_catalog(&output, &products, layout, &app.metrics_options())?;
            eprintln!(
                "exported {} product(s) in {} sheet(s) to {}",
                products.len(),
                sheets,
                output.display()
            );
            Ok(())
        }
        CatalogCommands::Import { input, json } => {
            let summary = import_catalog(&store, &input)?;
            if json {
                return print_json(&summary);
            }
            eprintln!(
                "imported {} product(s), skipped {} already present or without SKU",
                summary.imported, summary.skipped
            );
            Ok(())
        }
    }
}

pub fn cmd_backup(app: &App, cmd: BackupCommands) -> Result<(), CliError> {
    let mut store = app.open_store()?;
    match cmd {
        BackupCommands::Export { output } => {
            let backup = store.export_backup()?;
            write_backup(&output, &backup)?;
            eprintln!(
                "backed up {} product(s), {} category(ies) from {} to {}",
                backup.products.len(),
                backup.categories.len(),
                app.db_path().display(),
                output.display()
            );
            Ok(())
        }
        BackupCommands::Import { input } => {
            let backup = read_backup(&input)?;
            store.import_backup(&backup)?;
            eprintln!(
                "restored {} product(s), {} category(ies) into {}",
                backup.products.len(),
                backup.categories.len(),
                app.db_path().display()
            );
            Ok(())
        }
    }
}
