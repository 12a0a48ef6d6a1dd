// ProfitGrid CLI - product catalog profitability and revenue reconciliation

mod catalog;
mod config;
mod exit_codes;
mod product;
mod profit;
mod util;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use profitgrid_config::Settings;
use profitgrid_io::{IoError, ProductStore};
use profitgrid_recon::metrics::MetricsOptions;
use profitgrid_recon::{OutputConfig, ReconError};

use exit_codes::{
    io_exit_code, recon_exit_code, EXIT_CONFLICT, EXIT_IO, EXIT_NOT_FOUND, EXIT_PARSE, EXIT_SUCCESS,
    EXIT_USAGE,
};

#[derive(Parser)]
#[command(name = "pgrid")]
#[command(about = "Product catalog profitability and revenue-vs-cost reconciliation")]
#[command(version)]
struct Cli {
    /// Product database file (overrides store.path from settings)
    #[arg(long, global = true, env = "PROFITGRID_DB", value_name = "PATH")]
    db: Option<PathBuf>,

    /// Settings file (default: <config dir>/profitgrid/settings.json)
    #[arg(long, global = true, env = "PROFITGRID_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log debug details to stderr (RUST_LOG takes precedence)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add, edit, copy, delete and list products
    Product {
        #[command(subcommand)]
        command: product::ProductCommands,
    },

    /// Manage product categories
    Category {
        #[command(subcommand)]
        command: product::CategoryCommands,
    },

    /// Show promotion and activity metrics for stored products
    #[command(after_help = "\
Examples:
  pgrid metrics
  pgrid metrics --id 12
  pgrid metrics --json")]
    Metrics {
        /// Only this product
        #[arg(long)]
        id: Option<i64>,

        /// Output JSON to stdout
        #[arg(long)]
        json: bool,
    },

    /// Export or import catalog workbooks (one sheet per category)
    Catalog {
        #[command(subcommand)]
        command: catalog::CatalogCommands,
    },

    /// Export or import a JSON backup of the product store
    Backup {
        #[command(subcommand)]
        command: catalog::BackupCommands,
    },

    /// Show or change settings
    Config {
        #[command(subcommand)]
        command: config::ConfigCommands,
    },

    /// Reconcile a revenue report against stored product costs
    #[command(after_help = "\
Examples:
  pgrid profit orders.xlsx
  pgrid profit orders.csv --out result.csv
  pgrid profit orders.xlsx --sheet March --rules rules.toml --out results/
  pgrid profit orders.xlsx --json")]
    Profit(profit::ProfitArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();

    let app = App::new(cli.db, cli.config);

    let result = match cli.command {
        Commands::Product { command } => product::cmd_product(&app, command),
        Commands::Category { command } => product::cmd_category(&app, command),
        Commands::Metrics { id, json } => product::cmd_metrics(&app, id, json),
        Commands::Catalog { command } => catalog::cmd_catalog(&app, command),
        Commands::Backup { command } => catalog::cmd_backup(&app, command),
        Commands::Config { command } => config::cmd_config(&app, command),
        Commands::Profit(args) => profit::cmd_profit(&app, args),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

// ============================================================================
// Shared command context
// ============================================================================

/// Settings plus the resolved database path.
pub struct App {
    pub settings: Settings,
    config: Option<PathBuf>,
    db: PathBuf,
}

impl App {
    fn new(db: Option<PathBuf>, config: Option<PathBuf>) -> Self {
        let settings = match &config {
            Some(path) => Settings::load_from(path),
            None => Settings::load(),
        };
        let db = db.unwrap_or_else(|| settings.effective_store_path());
        log::debug!("product store: {}", db.display());
        Self { settings, config, db }
    }

    /// Settings file in use: `--config` or the platform default.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Settings::config_path)
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<(), CliError> {
        let saved = match &self.config {
            Some(path) => settings.save_to(path),
            None => settings.save(),
        };
        saved.map_err(|e| CliError::io(format!("cannot write {}: {e}", self.config_path().display())))
    }

    pub fn db_path(&self) -> &Path {
        &self.db
    }

    pub fn open_store(&self) -> Result<ProductStore, CliError> {
        ProductStore::open(&self.db).map_err(|e| {
            CliError::from(e).with_hint("pass --db or set store.path in settings.json")
        })
    }

    pub fn metrics_options(&self) -> MetricsOptions {
        MetricsOptions {
            activity_discount: self.settings.activity_discount,
            default_ad_bid_ratio: self.settings.default_ad_bid_ratio,
        }
    }

    /// Output column labels from settings.
    pub fn output_config(&self) -> OutputConfig {
        OutputConfig {
            cost_column: self.settings.cost_column.clone(),
            profit_column: self.settings.profit_column.clone(),
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self { code: EXIT_PARSE, message: msg.into(), hint: None }
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self { code: EXIT_NOT_FOUND, message: msg.into(), hint: None }
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self { code: EXIT_CONFLICT, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<IoError> for CliError {
    fn from(err: IoError) -> Self {
        Self { code: io_exit_code(&err), message: err.to_string(), hint: None }
    }
}

impl From<ReconError> for CliError {
    fn from(err: ReconError) -> Self {
        let hint = match &err {
            ReconError::MissingColumn { .. } => {
                Some("add the header pattern under [columns] in a --rules file".to_string())
            }
            _ => None,
        };
        Self { code: recon_exit_code(&err), message: err.to_string(), hint }
    }
}

/// Print a value as pretty JSON on stdout.
pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
    println!("{json}");
    Ok(())
}
