//! The three record collections and the in-memory workbook every store
//! mutates before writing back.

use super::amount::Money;
use super::customer::{CustomerActivity, CustomerType, CustomerUpsert};
use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// One row, keyed by column name.
pub type Record = BTreeMap<String, String>;

/// How dates are written to and read from cells.
pub const DATE_FORMAT: &str = "%d-%m-%Y";

pub const ID: &str = "ID";

const CUSTOMER_HEADERS: &[&str] = &[
    "ID",
    "Name",
    "Phone",
    "Address",
    "TaxID",
    "TotalPurchases",
    "ActiveLoans",
    "LoyaltyPoints",
    "JoinDate",
    "CustomerType",
];

const INVOICE_HEADERS: &[&str] = &[
    "ID",
    "CustomerID",
    "Address",
    "Date",
    "BillType",
    "Item",
    "Metal",
    "Weight",
    "Purity",
    "RatePerGram",
    "Making",
    "Discount",
    "SubTotal",
    "CGST%",
    "SGST%",
    "IGST%",
    "GSTAmount",
    "Total",
    "ReturnWeight",
    "ReturnAmount",
    "NetAmount",
    "Status",
    "Phone",
];

const LOAN_HEADERS: &[&str] = &[
    "ID",
    "CustomerName",
    "Phone",
    "Address",
    "GovID",
    "Metal",
    "Product",
    "Weight",
    "Purity",
    "Principal",
    "Interest%",
    "StartDate",
    "Repaid",
    "Status",
    "IDType",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Sheet {
    Customers,
    Invoices,
    Loans,
}

impl Sheet {
    pub const ALL: [Sheet; 3] = [Sheet::Customers, Sheet::Invoices, Sheet::Loans];

    pub fn name(&self) -> &'static str {
        match self {
            Sheet::Customers => "Customers",
            Sheet::Invoices => "Invoices",
            Sheet::Loans => "Loans",
        }
    }

    /// Column headers in file order.
    pub fn headers(&self) -> &'static [&'static str] {
        match self {
            Sheet::Customers => CUSTOMER_HEADERS,
            Sheet::Invoices => INVOICE_HEADERS,
            Sheet::Loans => LOAN_HEADERS,
        }
    }

    pub fn id_prefix(&self) -> &'static str {
        match self {
            Sheet::Customers => "C",
            Sheet::Invoices => "INV-",
            Sheet::Loans => "L-",
        }
    }

    /// `prefix + n`, zero-padded to `width` digits.
    pub fn identifier(&self, row: usize, width: usize) -> String {
        format_identifier(self.id_prefix(), row, width)
    }
}

impl fmt::Display for Sheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Sheet {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        Sheet::ALL
            .into_iter()
            .find(|sheet| sheet.name() == s.trim())
            .ok_or_else(|| LedgerError::SheetNotFound(s.to_string()))
    }
}

pub fn format_identifier(prefix: &str, n: usize, width: usize) -> String {
    format!("{prefix}{n:0width$}")
}

/// Fills a blank `ID` cell with the identifier for `row` and returns the
/// record's identifier.
pub fn assign_identifier(sheet: Sheet, record: &mut Record, row: usize, width: usize) -> String {
    let id = match record.get(ID).map(|id| id.trim()) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => sheet.identifier(row, width),
    };
    record.insert(ID.to_string(), id.clone());
    id
}

/// Restricts `record` to the sheet's columns, adding blanks for absent ones.
pub fn normalize_record(sheet: Sheet, record: &Record) -> Record {
    sheet
        .headers()
        .iter()
        .map(|h| (h.to_string(), record.get(*h).cloned().unwrap_or_default()))
        .collect()
}

/// Header plus data rows of one collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(sheet: Sheet) -> Self {
        Self {
            headers: sheet.headers().iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Fails if any of the sheet's expected columns is absent.
    pub fn check_columns(&self, sheet: Sheet) -> Result<()> {
        match sheet.headers().iter().find(|h| self.column(h).is_none()) {
            Some(missing) => Err(LedgerError::MissingColumn {
                sheet: sheet.name().to_string(),
                column: missing.to_string(),
            }),
            None => Ok(()),
        }
    }

    pub fn records(&self) -> Vec<Record> {
        self.rows
            .iter()
            .map(|row| {
                self.headers
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect()
            })
            .collect()
    }

    /// Appends `record` in header order; returns the 1-based row number.
    /// Columns the record lacks are left blank.
    pub fn push(&mut self, record: &Record) -> usize {
        let row = self
            .headers
            .iter()
            .map(|h| record.get(h).cloned().unwrap_or_default())
            .collect();
        self.rows.push(row);
        self.rows.len()
    }

    fn cell(&self, row: usize, column: usize) -> &str {
        self.rows[row].get(column).map(String::as_str).unwrap_or("")
    }

    fn set(&mut self, row: usize, column: usize, value: String) {
        let cells = &mut self.rows[row];
        if cells.len() <= column {
            cells.resize(column + 1, String::new());
        }
        cells[column] = value;
    }
}

/// Outcome of an append: the 1-based data row and the row's identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appended {
    pub row: usize,
    pub id: String,
}

/// All three collections, as held in memory between read and write-back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workbook {
    tables: BTreeMap<Sheet, Table>,
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}

impl Workbook {
    /// A workbook with every sheet present and no data rows.
    pub fn new() -> Self {
        Self {
            tables: Sheet::ALL
                .into_iter()
                .map(|sheet| (sheet, Table::new(sheet)))
                .collect(),
        }
    }

    /// Builds a workbook from tables read off disk, checking each sheet exists
    /// and carries its expected columns.
    pub fn from_tables(mut tables: BTreeMap<Sheet, Table>) -> Result<Self> {
        for sheet in Sheet::ALL {
            let table = tables
                .get_mut(&sheet)
                .ok_or_else(|| LedgerError::SheetNotFound(sheet.name().to_string()))?;
            table.check_columns(sheet)?;
        }
        Ok(Self { tables })
    }

    pub fn table(&self, sheet: Sheet) -> &Table {
        &self.tables[&sheet]
    }

    pub fn tables(&self) -> impl Iterator<Item = (Sheet, &Table)> {
        self.tables.iter().map(|(sheet, table)| (*sheet, table))
    }

    fn table_mut(&mut self, sheet: Sheet) -> &mut Table {
        self.tables
            .entry(sheet)
            .or_insert_with(|| Table::new(sheet))
    }

    pub fn records(&self, sheet: Sheet) -> Vec<Record> {
        self.table(sheet).records()
    }

    /// Row number the next append will get.
    pub fn next_row(&self, sheet: Sheet) -> usize {
        self.table(sheet).len() + 1
    }

    pub fn next_identifier(&self, sheet: Sheet, width: usize) -> String {
        sheet.identifier(self.next_row(sheet), width)
    }

    /// Appends one row. A blank `ID` field is filled with the identifier
    /// derived from the assigned row number.
    pub fn append(&mut self, sheet: Sheet, mut record: Record, width: usize) -> Appended {
        let id = assign_identifier(sheet, &mut record, self.next_row(sheet), width);
        let row = self.table_mut(sheet).push(&record);
        Appended { row, id }
    }

    /// Finds a customer by trimmed phone and merges `upsert` into it, or adds
    /// a new customer. Returns the customer id, `None` for a blank phone.
    pub fn upsert_customer(&mut self, upsert: &CustomerUpsert, width: usize) -> Result<Option<String>> {
        let phone = upsert.phone.trim();
        if phone.is_empty() {
            return Ok(None);
        }

        let table = self.table_mut(Sheet::Customers);
        let col = |name: &str| {
            table.column(name).ok_or_else(|| LedgerError::MissingColumn {
                sheet: Sheet::Customers.name().to_string(),
                column: name.to_string(),
            })
        };
        let (id_col, phone_col, type_col) = (col(ID)?, col("Phone")?, col("CustomerType")?);
        let (name_col, address_col, tax_col) = (col("Name")?, col("Address")?, col("TaxID")?);
        let (total_col, loans_col, points_col) =
            (col("TotalPurchases")?, col("ActiveLoans")?, col("LoyaltyPoints")?);

        let existing = (0..table.len()).find(|&row| table.cell(row, phone_col).trim() == phone);

        let Some(row) = existing else {
            let (total, loans) = match upsert.activity {
                CustomerActivity::Purchase { amount } => (amount, 0),
                CustomerActivity::Loan => (Money::ZERO, 1),
            };
            let record = Record::from([
                ("Name".to_string(), upsert.name.trim().to_string()),
                ("Phone".to_string(), phone.to_string()),
                ("Address".to_string(), upsert.address.trim().to_string()),
                ("TaxID".to_string(), upsert.tax_id.trim().to_string()),
                ("TotalPurchases".to_string(), total.to_string()),
                ("ActiveLoans".to_string(), loans.to_string()),
                ("LoyaltyPoints".to_string(), upsert.activity.loyalty_points().to_string()),
                ("JoinDate".to_string(), upsert.date.format(DATE_FORMAT).to_string()),
                ("CustomerType".to_string(), upsert.activity.customer_type().to_string()),
            ]);
            let appended = self.append(Sheet::Customers, record, width);
            return Ok(Some(appended.id));
        };

        let merged = CustomerType::merge_str(table.cell(row, type_col), upsert.activity.customer_type());
        table.set(row, type_col, merged.to_string());

        for (value, column) in [
            (&upsert.name, name_col),
            (&upsert.address, address_col),
            (&upsert.tax_id, tax_col),
        ] {
            if !value.trim().is_empty() {
                table.set(row, column, value.trim().to_string());
            }
        }

        let parse_err = |column: &str, reason: String| LedgerError::CorruptRow {
            sheet: Sheet::Customers.name().to_string(),
            row: row + 1,
            reason: format!("{column}: {reason}"),
        };
        match upsert.activity {
            CustomerActivity::Purchase { amount } => {
                let total = parse_cell::<Decimal>(table.cell(row, total_col))
                    .map_err(|e| parse_err("TotalPurchases", e))?;
                let points = parse_cell::<u32>(table.cell(row, points_col))
                    .map_err(|e| parse_err("LoyaltyPoints", e))?;
                table.set(row, total_col, (Money::new(total) + amount).to_string());
                table.set(
                    row,
                    points_col,
                    points.saturating_add(upsert.activity.loyalty_points()).to_string(),
                );
            }
            CustomerActivity::Loan => {
                let loans = parse_cell::<u32>(table.cell(row, loans_col))
                    .map_err(|e| parse_err("ActiveLoans", e))?;
                table.set(row, loans_col, loans.saturating_add(1).to_string());
            }
        }

        Ok(Some(table.cell(row, id_col).to_string()))
    }
}

/// Parses a numeric cell; blank counts as zero.
pub(crate) fn parse_cell<T>(raw: &str) -> std::result::Result<T, String>
where
    T: FromStr + Default,
    T::Err: fmt::Display,
{
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(T::default());
    }
    raw.parse::<T>()
        .map_err(|e| format!("{raw:?} is not a number ({e})"))
}
