use super::amount::Money;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What a customer has done with the shop. Only ever moves towards
/// `PurchaseAndLoan`, see [`CustomerType::merge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CustomerType {
    Purchase,
    Loan,
    #[serde(rename = "Purchase+Loan")]
    PurchaseAndLoan,
}

impl CustomerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerType::Purchase => "Purchase",
            CustomerType::Loan => "Loan",
            CustomerType::PurchaseAndLoan => "Purchase+Loan",
        }
    }

    /// Combines the tag already stored for a phone number with the tag of a
    /// new transaction.
    pub fn merge(existing: Option<CustomerType>, incoming: CustomerType) -> CustomerType {
        use CustomerType::*;
        match (existing, incoming) {
            (None, incoming) => incoming,
            (Some(PurchaseAndLoan), _) => PurchaseAndLoan,
            (Some(existing), incoming) if existing == incoming => existing,
            (Some(Purchase), Loan) | (Some(Loan), Purchase) => PurchaseAndLoan,
            (Some(_), incoming) => incoming,
        }
    }

    /// Same rule over the raw cell text. Unknown existing text is overwritten.
    pub fn merge_str(existing: &str, incoming: CustomerType) -> CustomerType {
        let existing = existing.trim();
        if existing.is_empty() {
            return incoming;
        }
        Self::merge(existing.parse().ok(), incoming)
    }
}

impl fmt::Display for CustomerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CustomerType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Purchase" => Ok(CustomerType::Purchase),
            "Loan" => Ok(CustomerType::Loan),
            "Purchase+Loan" => Ok(CustomerType::PurchaseAndLoan),
            other => Err(format!("unknown customer type {other:?}")),
        }
    }
}

/// The transaction that caused a customer upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomerActivity {
    Purchase { amount: Money },
    Loan,
}

impl CustomerActivity {
    pub fn customer_type(&self) -> CustomerType {
        match self {
            CustomerActivity::Purchase { .. } => CustomerType::Purchase,
            CustomerActivity::Loan => CustomerType::Loan,
        }
    }

    /// One point per full hundred rupees spent.
    pub fn loyalty_points(&self) -> u32 {
        match self {
            CustomerActivity::Purchase { amount } if amount.0 > Decimal::ZERO => {
                (amount.0 / Decimal::ONE_HUNDRED)
                    .floor()
                    .to_u32()
                    .unwrap_or(u32::MAX)
            }
            _ => 0,
        }
    }
}

/// Input for `RowStore::upsert_customer_by_phone`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerUpsert {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub tax_id: String,
    pub activity: CustomerActivity,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub address: String,
    pub tax_id: String,
    pub total_purchases: Money,
    pub active_loans: u32,
    pub loyalty_points: u32,
    pub join_date: Option<NaiveDate>,
    pub customer_type: Option<CustomerType>,
}
