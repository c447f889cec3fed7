use super::amount::{Grams, Money};
use crate::error::ValidationError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Metal {
    Gold,
    Silver,
}

/// PAKKA bills carry GST, KACHA bills do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BillType {
    Pakka,
    Kacha,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InvoiceStatus {
    Pending,
    #[default]
    Paid,
}

macro_rules! upper_case_text {
    ($ty:ty { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_uppercase().as_str() {
                    $($text => Ok(Self::$variant),)+
                    other => Err(format!("unexpected value {other:?}")),
                }
            }
        }
    };
}

upper_case_text!(Metal { Gold => "GOLD", Silver => "SILVER" });
upper_case_text!(BillType { Pakka => "PAKKA", Kacha => "KACHA" });
upper_case_text!(InvoiceStatus { Pending => "PENDING", Paid => "PAID" });

/// One line of an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceItem {
    pub description: String,
    pub metal: Metal,
    pub purity: String,
    pub weight: Grams,
    /// Rate per gram.
    pub rate: Money,
    pub making: Money,
}

impl InvoiceItem {
    /// `weight * rate + making`
    pub fn amount(&self) -> Money {
        self.weight * self.rate + self.making
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.description.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "item description",
            });
        }
        if self.weight.is_negative() {
            return Err(ValidationError::Negative {
                field: "item weight",
            });
        }
        if self.rate.is_negative() {
            return Err(ValidationError::Negative { field: "item rate" });
        }
        if self.making.is_negative() {
            return Err(ValidationError::Negative {
                field: "making charge",
            });
        }
        Ok(())
    }
}

/// Goods handed back against the bill. Only one mode can be active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReturnEntry {
    #[default]
    None,
    /// Amount is `weight * rate`.
    ByWeight { weight: Grams, rate: Money },
    /// Amount taken as entered; the weight is informational.
    ByAmount { amount: Money, weight: Grams },
}

impl ReturnEntry {
    pub fn weight(&self) -> Grams {
        match self {
            ReturnEntry::None => Grams::ZERO,
            ReturnEntry::ByWeight { weight, .. } | ReturnEntry::ByAmount { weight, .. } => *weight,
        }
    }

    pub fn amount(&self) -> Money {
        match self {
            ReturnEntry::None => Money::ZERO,
            ReturnEntry::ByWeight { weight, rate } => *weight * *rate,
            ReturnEntry::ByAmount { amount, .. } => *amount,
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let negative = match self {
            ReturnEntry::None => false,
            ReturnEntry::ByWeight { weight, rate } => weight.is_negative() || rate.is_negative(),
            ReturnEntry::ByAmount { amount, weight } => amount.is_negative() || weight.is_negative(),
        };
        if negative {
            Err(ValidationError::Negative { field: "return" })
        } else {
            Ok(())
        }
    }
}

/// Every derived figure of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    pub weight: Grams,
    pub discount: Money,
    /// Sum of item amounts minus discount. May be negative.
    pub sub_total: Money,
    pub cgst_rate: Decimal,
    pub sgst_rate: Decimal,
    pub igst_rate: Decimal,
    pub cgst: Money,
    pub sgst: Money,
    pub gst_amount: Money,
    pub total: Money,
    pub return_weight: Grams,
    pub return_amount: Money,
    /// `total - return_amount`. May be negative.
    pub net_amount: Money,
}

impl InvoiceTotals {
    pub fn compute(
        items: &[InvoiceItem],
        discount: Money,
        bill_type: BillType,
        cgst_rate: Decimal,
        returned: ReturnEntry,
    ) -> Self {
        let weight: Grams = items.iter().map(|item| item.weight).sum();
        let sub_total = items.iter().map(InvoiceItem::amount).sum::<Money>() - discount;

        let (cgst_rate, cgst) = match bill_type {
            BillType::Pakka => (cgst_rate, sub_total.percent(cgst_rate).round_paise()),
            BillType::Kacha => (Decimal::ZERO, Money::ZERO),
        };
        let sgst = cgst;
        let gst_amount = cgst + sgst;
        let total = sub_total + gst_amount;

        let return_amount = returned.amount();

        Self {
            weight,
            discount,
            sub_total,
            cgst_rate,
            sgst_rate: cgst_rate,
            igst_rate: Decimal::ZERO,
            cgst,
            sgst,
            gst_amount,
            total,
            return_weight: returned.weight(),
            return_amount,
            net_amount: total - return_amount,
        }
    }
}

/// Invoice form input, already trimmed by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceDraft {
    /// Name as entered at the counter. The register's `C<n>` id is assigned
    /// separately by the customer upsert.
    pub customer_name: String,
    pub phone: String,
    pub address: String,
    pub tax_id: String,
    /// Defaults to today.
    pub date: Option<NaiveDate>,
    pub bill_type: BillType,
    pub items: Vec<InvoiceItem>,
    pub discount: Money,
    pub returned: ReturnEntry,
    pub status: InvoiceStatus,
}

impl InvoiceDraft {
    pub fn new(customer_name: impl Into<String>, bill_type: BillType) -> Self {
        Self {
            customer_name: customer_name.into(),
            phone: String::new(),
            address: String::new(),
            tax_id: String::new(),
            date: None,
            bill_type,
            items: Vec::new(),
            discount: Money::ZERO,
            returned: ReturnEntry::None,
            status: InvoiceStatus::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.customer_name.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "customer name",
            });
        }
        if self.items.is_empty() {
            return Err(ValidationError::NoItems);
        }
        for item in &self.items {
            item.validate()?;
        }
        if self.discount.is_negative() {
            return Err(ValidationError::Negative { field: "discount" });
        }
        self.returned.validate()
    }
}

/// A computed invoice. Never changes once saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    /// Written to the `CustomerID` column.
    pub customer_name: String,
    pub phone: String,
    pub address: String,
    pub date: NaiveDate,
    pub bill_type: BillType,
    pub items: Vec<InvoiceItem>,
    pub totals: InvoiceTotals,
    pub status: InvoiceStatus,
}

/// An invoice as read back from the store. Item fields hold the joined
/// display text written at save time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceRow {
    pub id: String,
    pub customer_name: String,
    pub phone: String,
    pub address: String,
    pub date: Option<NaiveDate>,
    pub bill_type: BillType,
    pub items: String,
    pub metals: String,
    pub purities: String,
    pub weight: Grams,
    pub discount: Money,
    pub sub_total: Money,
    pub gst_amount: Money,
    pub total: Money,
    pub return_weight: Grams,
    pub return_amount: Money,
    pub net_amount: Money,
    pub status: InvoiceStatus,
}
