use crate::domain::customer::CustomerUpsert;
use crate::domain::ports::{HealthReport, RowStore};
use crate::domain::sheet::{Appended, Record, Sheet, Workbook};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory row store.
///
/// Holds one `Workbook` behind `Arc<RwLock<_>>`; the write half of the lock is
/// the writer gate. Nothing is persisted, which makes it the store of choice
/// for tests and previews.
#[derive(Clone)]
pub struct InMemoryStore {
    workbook: Arc<RwLock<Workbook>>,
    id_width: usize,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new(3)
    }
}

impl InMemoryStore {
    /// Creates an empty store with every sheet present.
    pub fn new(id_width: usize) -> Self {
        Self::with_workbook(Workbook::new(), id_width)
    }

    pub fn with_workbook(workbook: Workbook, id_width: usize) -> Self {
        Self {
            workbook: Arc::new(RwLock::new(workbook)),
            id_width,
        }
    }

    /// Copy of the current contents.
    pub async fn snapshot(&self) -> Workbook {
        self.workbook.read().await.clone()
    }
}

#[async_trait]
impl RowStore for InMemoryStore {
    async fn ensure_initialized(&self) -> Result<()> {
        Ok(())
    }

    async fn load_all(&self, sheet: Sheet) -> Result<Vec<Record>> {
        let workbook = self.workbook.read().await;
        Ok(workbook.records(sheet))
    }

    async fn append_row(&self, sheet: Sheet, record: Record) -> Result<Appended> {
        let mut workbook = self.workbook.write().await;
        Ok(workbook.append(sheet, record, self.id_width))
    }

    async fn upsert_customer_by_phone(&self, upsert: CustomerUpsert) -> Result<Option<String>> {
        let mut workbook = self.workbook.write().await;
        workbook.upsert_customer(&upsert, self.id_width)
    }

    async fn next_identifier(&self, sheet: Sheet) -> Result<String> {
        let workbook = self.workbook.read().await;
        Ok(workbook.next_identifier(sheet, self.id_width))
    }

    async fn test_connection(&self) -> HealthReport {
        HealthReport::ok("in-memory store ready")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::customer::CustomerActivity;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_in_memory_append_and_load() {
        let store = InMemoryStore::default();
        let record = Record::from([("CustomerName".to_string(), "Meena".to_string())]);

        let appended = store.append_row(Sheet::Loans, record).await.unwrap();
        assert_eq!(appended.row, 1);
        assert_eq!(appended.id, "L-001");

        let rows = store.load_all(Sheet::Loans).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["CustomerName"], "Meena");
        assert!(store.load_all(Sheet::Invoices).await.unwrap().is_empty());
        assert_eq!(store.next_identifier(Sheet::Loans).await.unwrap(), "L-002");
    }

    #[tokio::test]
    async fn test_in_memory_upsert() {
        let store = InMemoryStore::new(0);
        let upsert = CustomerUpsert {
            name: "Ravi".to_string(),
            phone: "12345".to_string(),
            address: String::new(),
            tax_id: String::new(),
            activity: CustomerActivity::Loan,
            date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        };
        let id = store.upsert_customer_by_phone(upsert.clone()).await.unwrap();
        assert_eq!(id.as_deref(), Some("C1"));
        store.upsert_customer_by_phone(upsert).await.unwrap();

        let rows = store.load_all(Sheet::Customers).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["ActiveLoans"], "2");
        assert!(store.test_connection().await.ok);
    }
}
