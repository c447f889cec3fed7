//! Mapping between domain values and flat sheet rows.

use super::amount::{Grams, Money};
use super::customer::Customer;
use super::invoice::{Invoice, InvoiceRow};
use super::loan::{Loan, LoanRow};
use super::sheet::{DATE_FORMAT, ID, Record, Sheet, parse_cell};
use crate::error::{LedgerError, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fmt::Display;
use std::str::FromStr;

/// Separator for the joined item columns.
pub const ITEM_SEPARATOR: &str = ", ";

fn join<T, F>(items: &[T], field: F) -> String
where
    F: Fn(&T) -> String,
{
    items.iter().map(field).collect::<Vec<_>>().join(ITEM_SEPARATOR)
}

fn record<const N: usize>(cells: [(&str, String); N]) -> Record {
    cells
        .into_iter()
        .map(|(column, value)| (column.to_string(), value))
        .collect()
}

impl Invoice {
    /// The row written to the Invoices sheet. An empty `id` lets the store
    /// assign one.
    ///
    /// Cells carry money to paise and weights to the milligram. Totals are
    /// computed from the exact inputs before this rounding.
    pub fn to_record(&self) -> Record {
        let t = &self.totals;
        record([
            (ID, self.id.clone()),
            ("CustomerID", self.customer_name.clone()),
            ("Address", self.address.clone()),
            ("Date", self.date.format(DATE_FORMAT).to_string()),
            ("BillType", self.bill_type.to_string()),
            ("Item", join(&self.items, |i| i.description.clone())),
            ("Metal", join(&self.items, |i| i.metal.to_string())),
            ("Weight", t.weight.to_string()),
            ("Purity", join(&self.items, |i| i.purity.clone())),
            ("RatePerGram", join(&self.items, |i| i.rate.to_string())),
            ("Making", join(&self.items, |i| i.making.to_string())),
            ("Discount", t.discount.to_string()),
            ("SubTotal", t.sub_total.to_string()),
            ("CGST%", t.cgst_rate.to_string()),
            ("SGST%", t.sgst_rate.to_string()),
            ("IGST%", t.igst_rate.to_string()),
            ("GSTAmount", t.gst_amount.to_string()),
            ("Total", t.total.to_string()),
            ("ReturnWeight", t.return_weight.to_string()),
            ("ReturnAmount", t.return_amount.to_string()),
            ("NetAmount", t.net_amount.to_string()),
            ("Status", self.status.to_string()),
            ("Phone", self.phone.clone()),
        ])
    }
}

impl Loan {
    pub fn to_record(&self) -> Record {
        record([
            (ID, self.id.clone()),
            ("CustomerName", self.name.clone()),
            ("Phone", self.phone.clone()),
            ("Address", self.address.clone()),
            ("GovID", self.gov_id.clone()),
            ("Metal", join(&self.items, |i| i.metal.to_string())),
            ("Product", join(&self.items, |i| i.description.clone())),
            ("Weight", self.weight.to_string()),
            ("Purity", join(&self.items, |i| i.purity.clone())),
            ("Principal", self.principal.to_string()),
            ("Interest%", self.interest_rate.to_string()),
            ("StartDate", self.start_date.format(DATE_FORMAT).to_string()),
            ("Repaid", self.repaid.to_string()),
            ("Status", self.status.to_string()),
            ("IDType", self.id_type.to_string()),
        ])
    }
}

/// Typed access to the cells of one stored row.
pub struct RowReader<'a> {
    sheet: Sheet,
    row: usize,
    record: &'a Record,
}

impl<'a> RowReader<'a> {
    /// `row` is the 1-based data row, used in error messages.
    pub fn new(sheet: Sheet, row: usize, record: &'a Record) -> Self {
        Self { sheet, row, record }
    }

    fn corrupt(&self, column: &str, reason: impl Display) -> LedgerError {
        LedgerError::CorruptRow {
            sheet: self.sheet.name().to_string(),
            row: self.row,
            reason: format!("{column}: {reason}"),
        }
    }

    pub fn text(&self, column: &str) -> String {
        self.record
            .get(column)
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    }

    /// Blank cells parse as the type's default.
    pub fn number<T>(&self, column: &str) -> Result<T>
    where
        T: FromStr + Default,
        T::Err: Display,
    {
        parse_cell(&self.text(column)).map_err(|e| self.corrupt(column, e))
    }

    pub fn money(&self, column: &str) -> Result<Money> {
        self.number::<Decimal>(column).map(Money::new)
    }

    pub fn grams(&self, column: &str) -> Result<Grams> {
        self.number::<Decimal>(column).map(Grams::new)
    }

    pub fn date(&self, column: &str) -> Result<Option<NaiveDate>> {
        let raw = self.text(column);
        if raw.is_empty() {
            return Ok(None);
        }
        NaiveDate::parse_from_str(&raw, DATE_FORMAT)
            .map(Some)
            .map_err(|e| self.corrupt(column, e))
    }

    /// Parses an enum-like cell; blank is an error.
    pub fn parsed<T>(&self, column: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.text(column)
            .parse::<T>()
            .map_err(|e| self.corrupt(column, e))
    }

    pub fn optional<T>(&self, column: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: Display,
    {
        if self.text(column).is_empty() {
            Ok(None)
        } else {
            self.parsed(column).map(Some)
        }
    }
}

impl Customer {
    pub fn from_row(r: &RowReader<'_>) -> Result<Self> {
        Ok(Self {
            id: r.text(ID),
            name: r.text("Name"),
            phone: r.text("Phone"),
            address: r.text("Address"),
            tax_id: r.text("TaxID"),
            total_purchases: r.money("TotalPurchases")?,
            active_loans: r.number("ActiveLoans")?,
            loyalty_points: r.number("LoyaltyPoints")?,
            join_date: r.date("JoinDate")?,
            customer_type: r.optional("CustomerType")?,
        })
    }
}

impl InvoiceRow {
    pub fn from_row(r: &RowReader<'_>) -> Result<Self> {
        Ok(Self {
            id: r.text(ID),
            customer_name: r.text("CustomerID"),
            phone: r.text("Phone"),
            address: r.text("Address"),
            date: r.date("Date")?,
            bill_type: r.parsed("BillType")?,
            items: r.text("Item"),
            metals: r.text("Metal"),
            purities: r.text("Purity"),
            weight: r.grams("Weight")?,
            discount: r.money("Discount")?,
            sub_total: r.money("SubTotal")?,
            gst_amount: r.money("GSTAmount")?,
            total: r.money("Total")?,
            return_weight: r.grams("ReturnWeight")?,
            return_amount: r.money("ReturnAmount")?,
            net_amount: r.money("NetAmount")?,
            status: r.optional("Status")?.unwrap_or_default(),
        })
    }
}

impl LoanRow {
    pub fn from_row(r: &RowReader<'_>) -> Result<Self> {
        Ok(Self {
            id: r.text(ID),
            name: r.text("CustomerName"),
            phone: r.text("Phone"),
            address: r.text("Address"),
            id_type: r.text("IDType"),
            gov_id: r.text("GovID"),
            metals: r.text("Metal"),
            products: r.text("Product"),
            purities: r.text("Purity"),
            weight: r.grams("Weight")?,
            principal: r.money("Principal")?,
            interest_rate: r.number("Interest%")?,
            start_date: r.date("StartDate")?,
            repaid: r.money("Repaid")?,
            status: r.optional("Status")?.unwrap_or_default(),
        })
    }
}

/// Parses every record of a sheet with `parse`, numbering rows from 1.
pub fn parse_records<T>(
    sheet: Sheet,
    records: &[Record],
    parse: impl Fn(&RowReader<'_>) -> Result<T>,
) -> Result<Vec<T>> {
    records
        .iter()
        .enumerate()
        .map(|(i, record)| parse(&RowReader::new(sheet, i + 1, record)))
        .collect()
}
