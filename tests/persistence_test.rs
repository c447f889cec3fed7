use jewelbook::application::engine::BillingEngine;
use jewelbook::config::{BillingConfig, StoreConfig};
use jewelbook::domain::amount::{Grams, Money};
use jewelbook::domain::customer::CustomerType;
use jewelbook::domain::invoice::{BillType, InvoiceStatus, ReturnEntry};
use jewelbook::domain::loan::LoanStatus;
use jewelbook::infrastructure::workbook_file::WorkbookFileStore;
use rust_decimal_macros::dec;
use std::path::Path;
use tempfile::tempdir;

mod common;

fn engine_at(path: &Path) -> BillingEngine {
    let config = StoreConfig {
        workbook_path: path.to_path_buf(),
        ..StoreConfig::default()
    };
    BillingEngine::new(
        Box::new(WorkbookFileStore::from_config(&config)),
        BillingConfig::default(),
    )
}

#[tokio::test]
async fn test_workbook_survives_restart() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("shop").join("jewelbook.csv");

    // 1. First session: a bill with a return, then a loan for the same phone
    {
        let engine = engine_at(&path);
        engine.ensure_initialized().await.unwrap();

        let mut draft = common::invoice("Asha", common::PHONE, BillType::Pakka, vec![common::ring()]);
        draft.returned = ReturnEntry::ByWeight {
            weight: Grams::new(dec!(2.000)),
            rate: Money::new(dec!(5800)),
        };
        let saved = engine.save_invoice(draft).await.unwrap();
        assert_eq!(saved.record.totals.net_amount, Money::new(dec!(50715.00)));

        let saved = engine.save_loan(common::loan("Asha", common::PHONE, "50000")).await.unwrap();
        assert_eq!(saved.record.id, "L-001");
    }

    // 2. Second session reads everything back from disk
    let engine = engine_at(&path);
    engine.ensure_initialized().await.unwrap();
    assert!(engine.test_connection().await.ok);

    let invoices = engine.invoices().await.unwrap();
    assert_eq!(invoices.len(), 1);
    let invoice = &invoices[0];
    assert_eq!(invoice.id, "INV-001");
    assert_eq!(invoice.customer_name, "Asha");
    assert_eq!(invoice.date, Some(common::date(16)));
    assert_eq!(invoice.bill_type, BillType::Pakka);
    assert_eq!(invoice.sub_total, Money::new(dec!(60500)));
    assert_eq!(invoice.gst_amount, Money::new(dec!(1815)));
    assert_eq!(invoice.total, Money::new(dec!(62315)));
    assert_eq!(invoice.return_weight, Grams::new(dec!(2)));
    assert_eq!(invoice.return_amount, Money::new(dec!(11600)));
    assert_eq!(invoice.net_amount, Money::new(dec!(50715)));
    assert_eq!(invoice.status, InvoiceStatus::Paid);

    let loans = engine.loans().await.unwrap();
    assert_eq!(loans.len(), 1);
    assert_eq!(loans[0].status, LoanStatus::Active);
    assert_eq!(loans[0].products, "Bangle");
    assert_eq!(loans[0].monthly_interest(), Money::new(dec!(750.00)));

    let customers = engine.customers().await.unwrap();
    assert_eq!(customers.len(), 1);
    assert_eq!(customers[0].phone, common::PHONE);
    assert_eq!(customers[0].customer_type, Some(CustomerType::PurchaseAndLoan));
    assert_eq!(customers[0].total_purchases, Money::new(dec!(50715.00)));
    assert_eq!(customers[0].active_loans, 1);

    assert_eq!(engine.next_invoice_number().await.unwrap(), "INV-002");
    assert_eq!(engine.next_loan_number().await.unwrap(), "L-002");
}

#[tokio::test]
async fn test_file_layout_is_tagged_per_sheet() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("jewelbook.csv");
    let engine = engine_at(&path);
    engine.ensure_initialized().await.unwrap();
    engine
        .save_invoice(common::invoice("Asha", "", BillType::Kacha, vec![common::ring()]))
        .await
        .unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("Customers,ID,Name,Phone,Address,TaxID"));
    assert!(lines[1].starts_with("Invoices,ID,CustomerID,Address,Date,BillType"));
    assert!(lines[2].starts_with("Invoices,INV-001,Asha,Main Bazaar,16-10-2026,KACHA,Ring,GOLD"));
    assert!(lines[3].starts_with("Loans,ID,CustomerName"));
}

#[cfg(feature = "storage-rocksdb")]
#[tokio::test]
async fn test_rocksdb_persistence_recovery() {
    use jewelbook::infrastructure::rocksdb::RocksDbStore;

    let dir = tempdir().unwrap();
    let db_path = dir.path().join("db");

    {
        let store = RocksDbStore::open(&db_path, 3).unwrap();
        let engine = BillingEngine::new(Box::new(store), BillingConfig::default());
        engine
            .save_invoice(common::invoice("Asha", common::PHONE, BillType::Pakka, vec![common::ring()]))
            .await
            .unwrap();
    }

    let store = RocksDbStore::open(&db_path, 3).unwrap();
    let export = dir.path().join("export.csv");
    store.export_workbook(&export).unwrap();

    let engine = BillingEngine::new(Box::new(store), BillingConfig::default());
    let saved = engine
        .save_loan(common::loan("Asha", common::PHONE, "50000"))
        .await
        .unwrap();
    assert_eq!(saved.record.id, "L-001");
    assert_eq!(engine.customers().await.unwrap()[0].active_loans, 1);

    let exported = engine_at(&export);
    let invoices = exported.invoices().await.unwrap();
    assert_eq!(invoices[0].total, Money::new(dec!(62315)));
}
