//! Billing and pledge-loan records for a jewellery shop.
//!
//! The crate is embedded by a desktop shell. It computes invoices and loans
//! ([`application::engine::BillingEngine`]) and keeps them, together with the
//! customer register, in a row-oriented store ([`domain::ports::RowStore`]).
//! The default store is a single workbook file on disk
//! ([`infrastructure::workbook_file::WorkbookFileStore`]).

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;
pub mod telemetry;
