//! Runtime settings for the store and the billing rules.
//!
//! Values come from defaults, overridden by environment variables:
//! - `JEWELBOOK_WORKBOOK_PATH` - workbook file location
//! - `JEWELBOOK_ID_WIDTH` - zero-padding of row numbers in identifiers
//! - `JEWELBOOK_CGST_RATE` - CGST percent on PAKKA bills (SGST is equal)

use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

pub const ENV_WORKBOOK_PATH: &str = "JEWELBOOK_WORKBOOK_PATH";
pub const ENV_ID_WIDTH: &str = "JEWELBOOK_ID_WIDTH";
pub const ENV_CGST_RATE: &str = "JEWELBOOK_CGST_RATE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub workbook_path: PathBuf,
    /// Digits the row number is padded to, `3` gives `INV-001`.
    pub id_width: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            workbook_path: PathBuf::from("jewelbook.csv"),
            id_width: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BillingConfig {
    /// Percent. SGST always equals CGST.
    pub cgst_rate: Decimal,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            cgst_rate: dec!(1.5),
        }
    }
}

impl StoreConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(path) = lookup(ENV_WORKBOOK_PATH) {
            config.workbook_path = PathBuf::from(path);
        }
        if let Some(width) = lookup(ENV_ID_WIDTH) {
            config.id_width = parse_setting(ENV_ID_WIDTH, &width)?;
        }
        Ok(config)
    }
}

impl BillingConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(rate) = lookup(ENV_CGST_RATE) {
            config.cgst_rate = parse_setting(ENV_CGST_RATE, &rate)?;
        }
        Ok(config)
    }
}

fn parse_setting<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim().parse().map_err(|e: T::Err| {
        LedgerError::InternalError(format!("invalid {key} {raw:?}: {e}").into())
    })
}
