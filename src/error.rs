use miette::Diagnostic;
use thiserror::Error;

/// Input rejected before anything reaches the store.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} is required")]
    #[diagnostic(code(jewelbook::validation::required))]
    Required { field: &'static str },

    #[error("{field} must not be negative")]
    #[diagnostic(code(jewelbook::validation::negative))]
    Negative { field: &'static str },

    #[error("{field} is not a valid number: {value:?}")]
    #[diagnostic(
        code(jewelbook::validation::not_a_number),
        help("enter a plain decimal such as 50000 or 1.5")
    )]
    NotANumber { field: &'static str, value: String },

    #[error("at least one item is required")]
    #[diagnostic(code(jewelbook::validation::no_items))]
    NoItems,
}

#[derive(Error, Diagnostic, Debug)]
pub enum LedgerError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Validation(#[from] ValidationError),

    #[error("CSV error: {0}")]
    #[diagnostic(code(jewelbook::store::csv))]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    #[diagnostic(
        code(jewelbook::store::io),
        help("check that the workbook file exists and is not read-only")
    )]
    IoError(#[from] std::io::Error),

    #[error("sheet {0:?} not found in workbook")]
    #[diagnostic(
        code(jewelbook::store::sheet_not_found),
        help("the workbook looks damaged; restore it from a backup")
    )]
    SheetNotFound(String),

    #[error("sheet {sheet:?} is missing column {column:?}")]
    #[diagnostic(code(jewelbook::store::missing_column))]
    MissingColumn { sheet: String, column: String },

    #[error("sheet {sheet:?} row {row} is corrupt: {reason}")]
    #[diagnostic(code(jewelbook::store::corrupt_row))]
    CorruptRow {
        sheet: String,
        row: usize,
        reason: String,
    },

    #[error("failed to save {what}")]
    #[diagnostic(code(jewelbook::engine::persist))]
    Persist {
        what: String,
        #[source]
        source: Box<LedgerError>,
    },

    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    #[diagnostic(code(jewelbook::store::rocksdb))]
    RocksDbError(#[from] rocksdb::Error),

    #[error("internal error: {0}")]
    #[diagnostic(code(jewelbook::internal))]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

impl LedgerError {
    /// True for failures caused by user input rather than the store.
    pub fn is_validation(&self) -> bool {
        matches!(self, LedgerError::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
