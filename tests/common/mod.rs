#![allow(dead_code)]

use chrono::NaiveDate;
use jewelbook::domain::amount::{Grams, Money};
use jewelbook::domain::invoice::{BillType, InvoiceDraft, InvoiceItem, Metal};
use jewelbook::domain::loan::{GovIdType, LoanDraft, LoanItem};
use jewelbook::domain::ports::RowStore;
use jewelbook::infrastructure::workbook_file::WorkbookFileStore;
use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::path::Path;

pub const PHONE: &str = "9999999999";

pub fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, day).unwrap()
}

pub fn ring() -> InvoiceItem {
    InvoiceItem {
        description: "Ring".to_string(),
        metal: Metal::Gold,
        purity: "22K".to_string(),
        weight: Grams::new(dec!(10.000)),
        rate: Money::new(dec!(6000)),
        making: Money::new(dec!(500)),
    }
}

pub fn invoice(customer_name: &str, phone: &str, bill_type: BillType, items: Vec<InvoiceItem>) -> InvoiceDraft {
    let mut draft = InvoiceDraft::new(customer_name, bill_type);
    draft.phone = phone.to_string();
    draft.address = "Main Bazaar".to_string();
    draft.date = Some(date(16));
    draft.items = items;
    draft
}

pub fn loan(name: &str, phone: &str, principal: &str) -> LoanDraft {
    LoanDraft {
        name: name.to_string(),
        phone: phone.to_string(),
        address: "Main Bazaar".to_string(),
        id_type: GovIdType::aadhaar(),
        gov_id: "1234 5678 9012".to_string(),
        items: vec![LoanItem {
            description: "Bangle".to_string(),
            metal: Metal::Gold,
            purity: "22K".to_string(),
            weight: Grams::new(dec!(20.000)),
        }],
        principal: principal.to_string(),
        interest_rate: dec!(1.5),
        start_date: Some(date(1)),
    }
}

/// Random but valid items: up to 9.999 g at up to 9999.99 per gram.
pub fn random_items(rng: &mut impl Rng, count: usize) -> Vec<InvoiceItem> {
    (0..count)
        .map(|i| InvoiceItem {
            description: format!("Item {i}"),
            metal: if rng.gen_bool(0.5) { Metal::Gold } else { Metal::Silver },
            purity: "22K".to_string(),
            weight: Grams::new(Decimal::new(rng.gen_range(1..10_000), 3)),
            rate: Money::new(Decimal::new(rng.gen_range(100..1_000_000), 2)),
            making: Money::new(Decimal::new(rng.gen_range(0..100_000), 2)),
        })
        .collect()
}

pub async fn file_store(path: &Path) -> WorkbookFileStore {
    let store = WorkbookFileStore::new(path, 3);
    store.ensure_initialized().await.unwrap();
    store
}
