use std::fmt;

#[derive(Debug)]
pub enum IoError {
    /// The file could not be opened or decoded.
    Open { path: String, message: String },
    /// A sheet or record inside an opened file could not be read.
    Read(String),
    /// Writing an output file failed.
    Write(String),
    /// The workbook has no sheets.
    EmptyWorkbook,
    /// A named sheet was requested that the workbook does not contain.
    SheetNotFound(String),
    /// File extension is not a known tabular format.
    UnsupportedFormat(String),
    /// SQLite error from the product store.
    Store(String),
    /// No product with this id.
    NotFound { id: i64 },
    /// JSON backup (de)serialization error.
    Json(String),
    /// Copying a product requires a SKU different from the original.
    UnchangedSku(String),
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open { path, message } => write!(f, "cannot open {path}: {message}"),
            Self::Read(msg) => write!(f, "read error: {msg}"),
            Self::Write(msg) => write!(f, "write error: {msg}"),
            Self::EmptyWorkbook => write!(f, "workbook contains no sheets"),
            Self::SheetNotFound(name) => write!(f, "sheet not found: '{name}'"),
            Self::UnsupportedFormat(ext) => write!(f, "unsupported file format: '{ext}'"),
            Self::Store(msg) => write!(f, "store error: {msg}"),
            Self::NotFound { id } => write!(f, "no product with id {id}"),
            Self::Json(msg) => write!(f, "JSON error: {msg}"),
            Self::UnchangedSku(sku) => {
                if sku.is_empty() {
                    write!(f, "copy requires a non-empty SKU")
                } else {
                    write!(f, "copy requires a new SKU (got the original '{sku}')")
                }
            }
        }
    }
}

impl std::error::Error for IoError {}

impl From<rusqlite::Error> for IoError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Store(e.to_string())
    }
}
