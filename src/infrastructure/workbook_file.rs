use crate::config::StoreConfig;
use crate::domain::customer::CustomerUpsert;
use crate::domain::ports::{HealthReport, RowStore};
use crate::domain::sheet::{Appended, Record, Sheet, Workbook};
use crate::error::{LedgerError, Result};
use crate::interfaces::csv::workbook_codec::{WorkbookReader, WorkbookWriter};
use async_trait::async_trait;
use std::fs::{File, OpenOptions};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// The durable store: a single workbook file rewritten whole on every change.
///
/// Writers queue on an in-process gate for the full read, mutate, write-back
/// cycle. The write goes to a temporary file in the same directory which then
/// replaces the workbook, so readers (which skip the gate) see either the old
/// or the new file. A call whose caller stops waiting still completes and
/// commits before the next writer starts. No handle outlives a call, and reads open the file with
/// every share flag set so a sync or backup agent holding it does not block us.
///
/// Nothing coordinates with other processes: an external edit between our
/// read and write-back is overwritten.
#[derive(Clone)]
pub struct WorkbookFileStore {
    path: Arc<PathBuf>,
    id_width: usize,
    gate: Arc<Mutex<()>>,
}

impl WorkbookFileStore {
    pub fn new(path: impl Into<PathBuf>, id_width: usize) -> Self {
        Self {
            path: Arc::new(path.into()),
            id_width,
            gate: Arc::new(Mutex::new(())),
        }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(config.workbook_path.clone(), config.id_width)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<Workbook> {
        let path = Arc::clone(&self.path);
        blocking(move || read_workbook(&path)).await
    }

    /// Runs `change` against the current file contents under the writer gate
    /// and writes the result back. If `change` fails nothing is written.
    ///
    /// The gate guard moves into the blocking task, so a caller that stops
    /// waiting does not open the gate before the write-back lands.
    async fn mutate<T, F>(&self, change: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Workbook) -> Result<T> + Send + 'static,
    {
        let gate = Arc::clone(&self.gate).lock_owned().await;
        let path = Arc::clone(&self.path);
        blocking(move || {
            let _gate = gate;
            let mut workbook = read_workbook(&path)?;
            let outcome = change(&mut workbook)?;
            write_workbook(&path, &workbook)?;
            Ok(outcome)
        })
        .await
    }
}

#[async_trait]
impl RowStore for WorkbookFileStore {
    async fn ensure_initialized(&self) -> Result<()> {
        let gate = Arc::clone(&self.gate).lock_owned().await;
        let path = Arc::clone(&self.path);
        blocking(move || {
            let _gate = gate;
            if path.exists() {
                return Ok(());
            }
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir)?;
            }
            write_workbook(&path, &Workbook::new())?;
            info!(path = %path.display(), "Created workbook");
            Ok(())
        })
        .await
    }

    async fn load_all(&self, sheet: Sheet) -> Result<Vec<Record>> {
        let records = self.read().await?.records(sheet);
        debug!(%sheet, count = records.len(), "Loaded rows");
        Ok(records)
    }

    async fn append_row(&self, sheet: Sheet, record: Record) -> Result<Appended> {
        let width = self.id_width;
        let appended = self
            .mutate(move |workbook| Ok(workbook.append(sheet, record, width)))
            .await?;
        debug!(%sheet, id = %appended.id, row = appended.row, "Appended row");
        Ok(appended)
    }

    async fn upsert_customer_by_phone(&self, upsert: CustomerUpsert) -> Result<Option<String>> {
        let width = self.id_width;
        let id = self
            .mutate(move |workbook| workbook.upsert_customer(&upsert, width))
            .await?;
        debug!(customer = ?id, "Upserted customer");
        Ok(id)
    }

    async fn next_identifier(&self, sheet: Sheet) -> Result<String> {
        Ok(self.read().await?.next_identifier(sheet, self.id_width))
    }

    async fn test_connection(&self) -> HealthReport {
        let shown = self.path.display().to_string();
        let path = Arc::clone(&self.path);
        if !blocking(move || Ok(path.exists())).await.unwrap_or(false) {
            return HealthReport::failed(format!("workbook not found at {shown}"));
        }
        match self.read().await {
            Ok(workbook) => HealthReport::ok(format!(
                "connected to {shown}: {} customers, {} invoices, {} loans",
                workbook.table(Sheet::Customers).len(),
                workbook.table(Sheet::Invoices).len(),
                workbook.table(Sheet::Loans).len(),
            )),
            Err(e) => HealthReport::failed(format!("workbook at {shown} is unreadable: {e}")),
        }
    }
}

async fn blocking<T, F>(work: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| LedgerError::InternalError(Box::new(e)))?
}

/// Opens for reading without denying other openers anything.
fn open_shared(path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.read(true);
    #[cfg(windows)]
    {
        use std::os::windows::fs::OpenOptionsExt;
        // FILE_SHARE_READ | FILE_SHARE_WRITE | FILE_SHARE_DELETE
        options.share_mode(0x1 | 0x2 | 0x4);
    }
    options.open(path)
}

fn read_workbook(path: &Path) -> Result<Workbook> {
    let file = open_shared(path)?;
    WorkbookReader::new(BufReader::new(file)).read()
}

pub(crate) fn write_workbook(path: &Path, workbook: &Workbook) -> Result<()> {
    let dir = path
        .parent()
        .filter(|d| !d.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(dir)?;
    WorkbookWriter::new(&mut temp).write(workbook)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| LedgerError::IoError(e.error))?;
    Ok(())
}
