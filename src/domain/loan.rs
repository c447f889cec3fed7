use super::amount::{Grams, Money};
use super::invoice::Metal;
use crate::error::ValidationError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LoanStatus {
    #[default]
    Active,
    Closed,
    Overdue,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Active => "ACTIVE",
            LoanStatus::Closed => "CLOSED",
            LoanStatus::Overdue => "OVERDUE",
        }
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ACTIVE" => Ok(LoanStatus::Active),
            "CLOSED" => Ok(LoanStatus::Closed),
            "OVERDUE" => Ok(LoanStatus::Overdue),
            other => Err(format!("unknown loan status {other:?}")),
        }
    }
}

/// Government identity document pledged against. The label is stored in
/// the IDType column as entered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GovIdType(pub String);

impl GovIdType {
    pub fn aadhaar() -> Self {
        Self("Aadhaar".to_string())
    }
}

impl fmt::Display for GovIdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One pledged piece.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanItem {
    pub description: String,
    pub metal: Metal,
    pub purity: String,
    pub weight: Grams,
}

/// Loan form input. `principal` is the raw text typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanDraft {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub id_type: GovIdType,
    pub gov_id: String,
    pub items: Vec<LoanItem>,
    pub principal: String,
    /// Percent per month.
    pub interest_rate: Decimal,
    /// Defaults to today.
    pub start_date: Option<NaiveDate>,
}

impl LoanDraft {
    /// Checks required fields and returns the parsed principal.
    pub fn validate(&self) -> Result<Money, ValidationError> {
        for (field, value) in [
            ("name", &self.name),
            ("phone", &self.phone),
            ("address", &self.address),
            ("government id", &self.gov_id),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::Required { field });
            }
        }
        if self.items.is_empty() {
            return Err(ValidationError::NoItems);
        }
        if self.items.iter().any(|item| item.weight.is_negative()) {
            return Err(ValidationError::Negative {
                field: "item weight",
            });
        }
        if self.interest_rate < Decimal::ZERO {
            return Err(ValidationError::Negative {
                field: "interest rate",
            });
        }
        Money::parse_non_negative(&self.principal, "principal")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub address: String,
    pub id_type: GovIdType,
    pub gov_id: String,
    pub items: Vec<LoanItem>,
    pub weight: Grams,
    pub principal: Money,
    pub interest_rate: Decimal,
    pub start_date: NaiveDate,
    pub repaid: Money,
    pub status: LoanStatus,
}

impl Loan {
    /// `principal * interest_rate / 100`
    pub fn monthly_interest(&self) -> Money {
        monthly_interest(self.principal, self.interest_rate)
    }
}

pub fn monthly_interest(principal: Money, interest_rate: Decimal) -> Money {
    principal.percent(interest_rate)
}

/// A loan as read back from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanRow {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub address: String,
    pub id_type: String,
    pub gov_id: String,
    pub metals: String,
    pub products: String,
    pub purities: String,
    pub weight: Grams,
    pub principal: Money,
    pub interest_rate: Decimal,
    pub start_date: Option<NaiveDate>,
    pub repaid: Money,
    pub status: LoanStatus,
}

impl LoanRow {
    pub fn monthly_interest(&self) -> Money {
        monthly_interest(self.principal, self.interest_rate)
    }
}
