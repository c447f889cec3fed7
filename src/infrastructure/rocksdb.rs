use crate::domain::customer::CustomerUpsert;
use crate::domain::ports::{HealthReport, RowStore};
use crate::domain::sheet::{Appended, Record, Sheet, Workbook, assign_identifier, normalize_record};
use crate::error::{LedgerError, Result};
use crate::infrastructure::workbook_file::write_workbook;
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// A row store on RocksDB, one column family per sheet.
///
/// Keys are big-endian row numbers so iteration yields row order; values
/// are the JSON-encoded records. [`RocksDbStore::export_workbook`] writes the
/// same file layout `WorkbookFileStore` uses.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDbStore {
    db: Arc<DB>,
    id_width: usize,
    gate: Arc<Mutex<()>>,
}

impl RocksDbStore {
    /// Opens or creates a RocksDB instance at `path` with a column family
    /// for every sheet.
    pub fn open<P: AsRef<Path>>(path: P, id_width: usize) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let families = Sheet::ALL
            .into_iter()
            .map(|sheet| ColumnFamilyDescriptor::new(sheet.name(), Options::default()));
        let db = DB::open_cf_descriptors(&opts, path, families)?;

        Ok(Self {
            db: Arc::new(db),
            id_width,
            gate: Arc::new(Mutex::new(())),
        })
    }

    fn family(&self, sheet: Sheet) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(sheet.name())
            .ok_or_else(|| LedgerError::SheetNotFound(sheet.name().to_string()))
    }

    fn rows(&self, sheet: Sheet) -> Result<Vec<Record>> {
        let cf = self.family(sheet)?;
        let mut records = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            let record: Record = serde_json::from_slice(&value).map_err(|e| {
                LedgerError::InternalError(Box::new(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("Deserialization error: {}", e),
                )))
            })?;
            records.push(record);
        }
        Ok(records)
    }

    fn put(&self, sheet: Sheet, row: usize, record: &Record) -> Result<()> {
        let cf = self.family(sheet)?;
        let value = serde_json::to_vec(record).map_err(|e| {
            LedgerError::InternalError(Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Serialization error: {}", e),
            )))
        })?;
        self.db.put_cf(cf, (row as u64).to_be_bytes(), value)?;
        Ok(())
    }

    fn row_count(&self, sheet: Sheet) -> Result<usize> {
        let cf = self.family(sheet)?;
        match self.db.iterator_cf(cf, IteratorMode::End).next() {
            None => Ok(0),
            Some(item) => {
                let (key, _) = item?;
                let bytes: [u8; 8] = key.as_ref().try_into().map_err(|_| {
                    LedgerError::InternalError(Box::new(std::io::Error::other(
                        "row key is not eight bytes",
                    )))
                })?;
                Ok(u64::from_be_bytes(bytes) as usize)
            }
        }
    }

    /// Copies every sheet into a workbook value.
    pub fn to_workbook(&self) -> Result<Workbook> {
        let mut workbook = Workbook::new();
        for sheet in Sheet::ALL {
            for record in self.rows(sheet)? {
                workbook.append(sheet, record, self.id_width);
            }
        }
        Ok(workbook)
    }

    /// Writes all rows to a workbook file readable by `WorkbookFileStore`.
    pub fn export_workbook<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_workbook(path.as_ref(), &self.to_workbook()?)
    }
}

#[async_trait]
impl RowStore for RocksDbStore {
    async fn ensure_initialized(&self) -> Result<()> {
        for sheet in Sheet::ALL {
            self.family(sheet)?;
        }
        Ok(())
    }

    async fn load_all(&self, sheet: Sheet) -> Result<Vec<Record>> {
        self.rows(sheet)
    }

    async fn append_row(&self, sheet: Sheet, record: Record) -> Result<Appended> {
        let _gate = self.gate.lock().await;
        let row = self.row_count(sheet)? + 1;
        let mut record = normalize_record(sheet, &record);
        let id = assign_identifier(sheet, &mut record, row, self.id_width);
        self.put(sheet, row, &record)?;
        debug!(%sheet, %id, row, "Appended row");
        Ok(Appended { row, id })
    }

    async fn upsert_customer_by_phone(&self, upsert: CustomerUpsert) -> Result<Option<String>> {
        let _gate = self.gate.lock().await;
        let mut workbook = Workbook::new();
        for record in self.rows(Sheet::Customers)? {
            workbook.append(Sheet::Customers, record, self.id_width);
        }
        let before = workbook.records(Sheet::Customers);

        let id = workbook.upsert_customer(&upsert, self.id_width)?;

        for (i, record) in workbook.records(Sheet::Customers).iter().enumerate() {
            if before.get(i) != Some(record) {
                self.put(Sheet::Customers, i + 1, record)?;
            }
        }
        Ok(id)
    }

    async fn next_identifier(&self, sheet: Sheet) -> Result<String> {
        Ok(sheet.identifier(self.row_count(sheet)? + 1, self.id_width))
    }

    async fn test_connection(&self) -> HealthReport {
        match Sheet::ALL.into_iter().find(|sheet| self.family(*sheet).is_err()) {
            Some(missing) => HealthReport::failed(format!("column family {missing} is missing")),
            None => HealthReport::ok(format!("RocksDB open at {}", self.db.path().display())),
        }
    }
}
