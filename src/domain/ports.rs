use super::customer::CustomerUpsert;
use super::sheet::{Appended, Record, Sheet};
use crate::error::Result;
use async_trait::async_trait;

/// Result of [`RowStore::test_connection`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthReport {
    pub ok: bool,
    pub message: String,
}

impl HealthReport {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

/// Row-oriented persistence for the three shop collections.
///
/// Mutations (`append_row`, `upsert_customer_by_phone`) are serialized by the
/// implementation; a caller never sees two writes in flight. Reads do not wait
/// for writers but always observe a complete state.
#[async_trait]
pub trait RowStore: Send + Sync {
    /// Creates the backing store with all sheets and headers if it is missing.
    async fn ensure_initialized(&self) -> Result<()>;

    /// Every data row of `sheet`, in row order.
    async fn load_all(&self, sheet: Sheet) -> Result<Vec<Record>>;

    /// Appends one row. A blank `ID` is assigned inside the same critical
    /// section as the append.
    async fn append_row(&self, sheet: Sheet, record: Record) -> Result<Appended>;

    /// Returns the customer id, or `None` when the phone is blank.
    async fn upsert_customer_by_phone(&self, upsert: CustomerUpsert) -> Result<Option<String>>;

    /// The identifier the next append to `sheet` would get. Not reserved.
    async fn next_identifier(&self, sheet: Sheet) -> Result<String>;

    async fn test_connection(&self) -> HealthReport;
}

pub type RowStoreBox = Box<dyn RowStore>;
pub type RowStoreFactory = Box<dyn Fn() -> RowStoreBox + Send + Sync>;
