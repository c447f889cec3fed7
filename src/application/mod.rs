//! Application layer: turns form input into persisted records.
//!
//! [`engine::BillingEngine`] validates drafts, computes invoice totals and loan
//! figures, and writes through whichever `RowStore` it was given.

pub mod engine;
