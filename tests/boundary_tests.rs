use jewelbook::application::engine::BillingEngine;
use jewelbook::config::BillingConfig;
use jewelbook::domain::amount::{Grams, Money};
use jewelbook::domain::invoice::{BillType, InvoiceItem, Metal, ReturnEntry};
use jewelbook::error::{LedgerError, ValidationError};
use jewelbook::infrastructure::in_memory::InMemoryStore;
use rust_decimal_macros::dec;

mod common;

fn engine() -> BillingEngine {
    BillingEngine::new(Box::new(InMemoryStore::default()), BillingConfig::default())
}

#[tokio::test]
async fn test_discount_above_items_goes_negative() {
    let mut draft = common::invoice("Asha", "", BillType::Pakka, vec![common::ring()]);
    draft.discount = Money::new(dec!(60600));

    let saved = engine().save_invoice(draft).await.unwrap();
    let totals = saved.record.totals;
    assert_eq!(totals.sub_total, Money::new(dec!(-100)));
    assert_eq!(totals.cgst, Money::new(dec!(-1.50)));
    assert_eq!(totals.total, Money::new(dec!(-103.00)));
}

#[tokio::test]
async fn test_return_above_total_goes_negative() {
    let mut draft = common::invoice("Asha", "", BillType::Kacha, vec![common::ring()]);
    draft.returned = ReturnEntry::ByAmount {
        amount: Money::new(dec!(70000)),
        weight: Grams::new(dec!(12)),
    };

    let engine = engine();
    let saved = engine.save_invoice(draft).await.unwrap();
    assert_eq!(saved.record.totals.net_amount, Money::new(dec!(-9500)));
    assert_eq!(saved.record.totals.return_weight, Grams::new(dec!(12)));

    let stored = engine.invoices().await.unwrap();
    assert_eq!(stored[0].net_amount, Money::new(dec!(-9500.00)));
}

#[tokio::test]
async fn test_negative_purchase_earns_no_points() {
    let engine = engine();
    let mut draft = common::invoice("Asha", common::PHONE, BillType::Kacha, vec![common::ring()]);
    draft.returned = ReturnEntry::ByAmount {
        amount: Money::new(dec!(70000)),
        weight: Grams::ZERO,
    };
    engine.save_invoice(draft).await.unwrap();

    let customers = engine.customers().await.unwrap();
    assert_eq!(customers[0].total_purchases, Money::new(dec!(-9500)));
    assert_eq!(customers[0].loyalty_points, 0);
}

#[tokio::test]
async fn test_gst_rounds_half_paise_up() {
    let item = InvoiceItem {
        description: "Toe ring".to_string(),
        metal: Metal::Silver,
        purity: "92.5".to_string(),
        weight: Grams::new(dec!(0.010)),
        rate: Money::new(dec!(100)),
        making: Money::ZERO,
    };
    let draft = common::invoice("Asha", "", BillType::Pakka, vec![item]);

    let saved = engine().save_invoice(draft).await.unwrap();
    assert_eq!(saved.record.totals.sub_total, Money::new(dec!(1.00)));
    assert_eq!(saved.record.totals.cgst, Money::new(dec!(0.02)));
    assert_eq!(saved.record.totals.gst_amount, Money::new(dec!(0.04)));
}

#[tokio::test]
async fn test_zero_weight_and_zero_principal_are_accepted() {
    let engine = engine();
    let mut item = common::ring();
    item.weight = Grams::ZERO;
    let saved = engine
        .save_invoice(common::invoice("Asha", "", BillType::Pakka, vec![item]))
        .await
        .unwrap();
    assert_eq!(saved.record.totals.sub_total, Money::new(dec!(500)));

    let saved = engine.save_loan(common::loan("Asha", common::PHONE, "0")).await.unwrap();
    assert_eq!(saved.record.monthly_interest(), Money::ZERO);
}

#[tokio::test]
async fn test_configured_rate_applies_to_pakka_only() {
    let config = BillingConfig { cgst_rate: dec!(2.5) };
    let engine = BillingEngine::new(Box::new(InMemoryStore::default()), config);

    let pakka = engine
        .save_invoice(common::invoice("Asha", "", BillType::Pakka, vec![common::ring()]))
        .await
        .unwrap();
    assert_eq!(pakka.record.totals.cgst, Money::new(dec!(1512.50)));
    assert_eq!(pakka.record.totals.cgst_rate, dec!(2.5));

    let kacha = engine
        .save_invoice(common::invoice("Asha", "", BillType::Kacha, vec![common::ring()]))
        .await
        .unwrap();
    assert_eq!(kacha.record.totals.cgst_rate, dec!(0));
    assert_eq!(kacha.record.totals.gst_amount, Money::ZERO);
}

#[tokio::test]
async fn test_negative_inputs_are_rejected() {
    let engine = engine();

    let mut discount = common::invoice("Asha", "", BillType::Pakka, vec![common::ring()]);
    discount.discount = Money::new(dec!(-1));
    let mut returned = common::invoice("Asha", "", BillType::Pakka, vec![common::ring()]);
    returned.returned = ReturnEntry::ByWeight {
        weight: Grams::new(dec!(-1)),
        rate: Money::new(dec!(5800)),
    };
    let mut blank_item = common::invoice("Asha", "", BillType::Pakka, vec![common::ring()]);
    blank_item.items[0].description = "  ".to_string();

    for draft in [discount, returned, blank_item] {
        let err = engine.save_invoice(draft).await.unwrap_err();
        assert!(err.is_validation(), "{err:?}");
    }

    let err = engine
        .save_loan(common::loan("Asha", common::PHONE, "-500"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::Validation(ValidationError::Negative { field: "principal" })
    ));
    assert!(engine.invoices().await.unwrap().is_empty());
    assert!(engine.loans().await.unwrap().is_empty());
}
