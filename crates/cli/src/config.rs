//! `pgrid config`: inspect and change settings.json.

use clap::Subcommand;

use crate::{print_json, App, CliError};

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the settings file path
    Path,

    /// Print the effective settings as JSON
    Show,

    /// Change one setting and write the file
    #[command(after_help = "\
Examples:
  pgrid config set export.profitColumn 利润
  pgrid config set metrics.defaultAdBidRatio 0
  pgrid config set store.path null")]
    Set {
        /// Dotted key, e.g. metrics.activityDiscount
        key: String,

        /// New value (JSON, or plain text for strings)
        value: String,
    },
}

pub fn cmd_config(app: &App, cmd: ConfigCommands) -> Result<(), CliError> {
    match cmd {
        ConfigCommands::Path => {
            println!("{}", app.config_path().display());
            Ok(())
        }
        ConfigCommands::Show => print_json(&app.settings),
        ConfigCommands::Set { key, value } => {
            let mut settings = app.settings.clone();
            settings.set(&key, &value).map_err(CliError::args)?;
            app.save_settings(&settings)?;
            eprintln!("set {} in {}", key, app.config_path().display());
            Ok(())
        }
    }
}
