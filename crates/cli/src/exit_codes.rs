//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | Success                                              |
//! | 1    | General error (unspecified)                          |
//! | 2    | Usage error (bad args, unsupported file type)        |
//! | 3    | I/O error (cannot open, read or write a file)        |
//! | 4    | Parse error (malformed rules, settings or backup)    |
//! | 5    | Required column missing from the input sheet         |
//! | 6    | Not found (product id, sheet name)                   |
//! | 7    | Conflict (duplicate category, unchanged copy SKU)    |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant error mapping

use profitgrid_io::IoError;
use profitgrid_recon::ReconError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// File could not be opened, read or written.
pub const EXIT_IO: u8 = 3;

/// Malformed rules file, backup or numeric argument.
pub const EXIT_PARSE: u8 = 4;

/// The input sheet has no SKU or no revenue column.
pub const EXIT_MISSING_COLUMN: u8 = 5;

/// A product id or sheet name does not exist.
pub const EXIT_NOT_FOUND: u8 = 6;

/// The change would collide with existing data.
pub const EXIT_CONFLICT: u8 = 7;

/// Map an I/O-layer error to its exit code.
pub fn io_exit_code(err: &IoError) -> u8 {
    match err {
        IoError::Open { .. } | IoError::Read(_) | IoError::Write(_) | IoError::EmptyWorkbook => EXIT_IO,
        IoError::UnsupportedFormat(_) => EXIT_USAGE,
        IoError::SheetNotFound(_) | IoError::NotFound { .. } => EXIT_NOT_FOUND,
        IoError::Json(_) => EXIT_PARSE,
        IoError::UnchangedSku(_) => EXIT_CONFLICT,
        IoError::Store(_) => EXIT_ERROR,
    }
}

/// Map a reconciliation error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::MissingColumn { .. } => EXIT_MISSING_COLUMN,
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_PARSE,
    }
}
