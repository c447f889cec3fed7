use crate::config::BillingConfig;
use crate::domain::amount::{Grams, Money};
use crate::domain::customer::{Customer, CustomerActivity, CustomerUpsert};
use crate::domain::invoice::{Invoice, InvoiceDraft, InvoiceRow, InvoiceTotals};
use crate::domain::loan::{Loan, LoanDraft, LoanRow, LoanStatus};
use crate::domain::ports::{HealthReport, RowStoreBox};
use crate::domain::records::parse_records;
use crate::domain::sheet::Sheet;
use crate::error::{LedgerError, Result};
use chrono::{Local, NaiveDate};
use tracing::{info, warn};

/// A persisted record and the 1-based data row it landed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Saved<T> {
    pub record: T,
    pub row: usize,
}

/// Everything the shell displays, loaded in one go.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub customers: Vec<Customer>,
    pub invoices: Vec<InvoiceRow>,
    pub loans: Vec<LoanRow>,
}

/// Turns validated form input into invoices and loans and hands them to the
/// store.
///
/// Input is checked in full before the store is touched, so a rejected draft
/// writes nothing. Store failures are returned as [`LedgerError::Persist`]
/// naming what was being saved; nothing is retried.
pub struct BillingEngine {
    store: RowStoreBox,
    config: BillingConfig,
}

impl BillingEngine {
    pub fn new(store: RowStoreBox, config: BillingConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &BillingConfig {
        &self.config
    }

    /// Creates the backing collections if they do not exist yet.
    pub async fn ensure_initialized(&self) -> Result<()> {
        self.store.ensure_initialized().await
    }

    pub async fn test_connection(&self) -> HealthReport {
        self.store.test_connection().await
    }

    /// Computes and persists an invoice, then credits the purchase to the
    /// customer with the same phone number.
    pub async fn save_invoice(&self, draft: InvoiceDraft) -> Result<Saved<Invoice>> {
        draft.validate()?;

        let totals = InvoiceTotals::compute(
            &draft.items,
            draft.discount,
            draft.bill_type,
            self.config.cgst_rate,
            draft.returned,
        );
        let mut invoice = Invoice {
            id: String::new(),
            customer_name: draft.customer_name.trim().to_string(),
            phone: draft.phone.trim().to_string(),
            address: draft.address.trim().to_string(),
            date: draft.date.unwrap_or_else(today),
            bill_type: draft.bill_type,
            items: draft.items,
            totals,
            status: draft.status,
        };

        let appended = self
            .store
            .append_row(Sheet::Invoices, invoice.to_record())
            .await
            .map_err(persist("invoice"))?;
        invoice.id = appended.id;
        info!(
            id = %invoice.id,
            bill_type = %invoice.bill_type,
            net_amount = %invoice.totals.net_amount,
            "Saved invoice"
        );

        self.record_activity(
            &invoice.id,
            CustomerUpsert {
                name: invoice.customer_name.clone(),
                phone: invoice.phone.clone(),
                address: invoice.address.clone(),
                tax_id: draft.tax_id.trim().to_string(),
                activity: CustomerActivity::Purchase {
                    amount: invoice.totals.net_amount,
                },
                date: invoice.date,
            },
        )
        .await?;

        Ok(Saved {
            record: invoice,
            row: appended.row,
        })
    }

    /// Persists a new active loan and counts it against the borrower.
    pub async fn save_loan(&self, draft: LoanDraft) -> Result<Saved<Loan>> {
        let principal = draft.validate()?;

        let weight: Grams = draft.items.iter().map(|item| item.weight).sum();
        let mut loan = Loan {
            id: String::new(),
            name: draft.name.trim().to_string(),
            phone: draft.phone.trim().to_string(),
            address: draft.address.trim().to_string(),
            id_type: draft.id_type,
            gov_id: draft.gov_id.trim().to_string(),
            items: draft.items,
            weight,
            principal,
            interest_rate: draft.interest_rate,
            start_date: draft.start_date.unwrap_or_else(today),
            repaid: Money::ZERO,
            status: LoanStatus::Active,
        };

        let appended = self
            .store
            .append_row(Sheet::Loans, loan.to_record())
            .await
            .map_err(persist("loan"))?;
        loan.id = appended.id;
        info!(id = %loan.id, principal = %loan.principal, "Saved loan");

        self.record_activity(
            &loan.id,
            CustomerUpsert {
                name: loan.name.clone(),
                phone: loan.phone.clone(),
                address: loan.address.clone(),
                tax_id: String::new(),
                activity: CustomerActivity::Loan,
                date: loan.start_date,
            },
        )
        .await?;

        Ok(Saved {
            record: loan,
            row: appended.row,
        })
    }

    async fn record_activity(&self, source: &str, upsert: CustomerUpsert) -> Result<()> {
        if upsert.phone.is_empty() {
            return Ok(());
        }
        self.store
            .upsert_customer_by_phone(upsert)
            .await
            .map_err(persist(format!("customer for {source}")))?;
        Ok(())
    }

    pub async fn customers(&self) -> Result<Vec<Customer>> {
        let records = self.store.load_all(Sheet::Customers).await?;
        parse_records(Sheet::Customers, &records, Customer::from_row)
    }

    pub async fn invoices(&self) -> Result<Vec<InvoiceRow>> {
        let records = self.store.load_all(Sheet::Invoices).await?;
        parse_records(Sheet::Invoices, &records, InvoiceRow::from_row)
    }

    pub async fn loans(&self) -> Result<Vec<LoanRow>> {
        let records = self.store.load_all(Sheet::Loans).await?;
        parse_records(Sheet::Loans, &records, LoanRow::from_row)
    }

    /// Loads all three collections. A collection that fails to load is shown
    /// empty and the failure is logged.
    pub async fn snapshot(&self) -> Snapshot {
        Snapshot {
            customers: or_empty(Sheet::Customers, self.customers().await),
            invoices: or_empty(Sheet::Invoices, self.invoices().await),
            loans: or_empty(Sheet::Loans, self.loans().await),
        }
    }

    /// Identifier the next saved invoice would get, for display only.
    pub async fn next_invoice_number(&self) -> Result<String> {
        self.store.next_identifier(Sheet::Invoices).await
    }

    pub async fn next_loan_number(&self) -> Result<String> {
        self.store.next_identifier(Sheet::Loans).await
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn persist(what: impl Into<String>) -> impl FnOnce(LedgerError) -> LedgerError {
    let what = what.into();
    move |source| LedgerError::Persist {
        what,
        source: Box::new(source),
    }
}

fn or_empty<T>(sheet: Sheet, loaded: Result<Vec<T>>) -> Vec<T> {
    loaded.unwrap_or_else(|e| {
        warn!(%sheet, error = %e, "Could not load sheet, showing it empty");
        Vec::new()
    })
}
