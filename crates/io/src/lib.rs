// File I/O and persistence: tabular sheets, product store, catalog workbooks

pub mod backup;
pub mod catalog;
pub mod csv;
pub mod error;
pub mod sheet;
pub mod store;
pub mod xlsx;

pub use catalog::{CatalogLayout, ImportSummary};
pub use error::IoError;
pub use sheet::{read_sheet, read_workbook, write_workbook, Sheet, TabularFormat};
pub use store::{Backup, Category, ProductStore};
