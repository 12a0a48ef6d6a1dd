use std::fmt;

use crate::columns::ColumnClass;

#[derive(Debug)]
pub enum ReconError {
    /// No column of the given class was found on the first row.
    MissingColumn { class: ColumnClass },
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty pattern list, clashing labels, etc.).
    ConfigValidation(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingColumn { class } => {
                write!(f, "missing column: no {class} column found on the first row")
            }
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}
