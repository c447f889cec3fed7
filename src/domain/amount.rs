use crate::error::ValidationError;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use std::str::FromStr;

/// A rupee amount held as an exact decimal.
///
/// Arithmetic never rounds; rounding to paise happens only where a rule asks
/// for it (see [`Money::round_paise`]). Negative values are legal, a discount
/// or a return may exceed what it is taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(pub Decimal);

/// A metal weight in grams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grams(pub Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Rejects negative input for fields that must be zero or more.
    pub fn non_negative(value: Decimal, field: &'static str) -> Result<Self, ValidationError> {
        let money = Self(value);
        if money.is_negative() {
            Err(ValidationError::Negative { field })
        } else {
            Ok(money)
        }
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Parses raw form text, rejecting anything that is not a decimal `>= 0`.
    pub fn parse_non_negative(raw: &str, field: &'static str) -> Result<Self, ValidationError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ValidationError::Required { field });
        }
        let value = Decimal::from_str(raw).map_err(|_| ValidationError::NotANumber {
            field,
            value: raw.to_string(),
        })?;
        Self::non_negative(value, field)
    }

    /// Rounds to two places, halves away from zero.
    pub fn round_paise(self) -> Self {
        Self(self.0.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }

    /// `self * percent / 100`, unrounded.
    pub fn percent(self, percent: Decimal) -> Self {
        Self(self.0 * percent / Decimal::ONE_HUNDRED)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl Grams {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    pub fn non_negative(value: Decimal, field: &'static str) -> Result<Self, ValidationError> {
        Money::non_negative(value, field).map(|m| Self(m.0))
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

/// Always two places, rounded like [`Money::round_paise`]. This is the form
/// stored in sheet cells, so finer amounts read back rounded to paise.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.round_paise().0)
    }
}

/// Always three places, halves away from zero. Stored cells use this form, so
/// anything finer than a milligram reads back rounded.
impl fmt::Display for Grams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self
            .0
            .round_dp_with_strategy(3, RoundingStrategy::MidpointAwayFromZero);
        write!(f, "{rounded:.3}")
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl From<Decimal> for Grams {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Neg for Money {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Mul<Decimal> for Money {
    type Output = Self;
    fn mul(self, rhs: Decimal) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl Add for Grams {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Grams {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

/// Weight times a per-gram rate.
impl Mul<Money> for Grams {
    type Output = Money;
    fn mul(self, rate: Money) -> Money {
        Money(self.0 * rate.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_arithmetic() {
        let a = Money::new(dec!(10.50));
        let b = Money::new(dec!(0.25));
        assert_eq!(a + b, Money::new(dec!(10.75)));
        assert_eq!(a - b, Money::new(dec!(10.25)));
        assert_eq!(b - a, Money::new(dec!(-10.25)));
    }

    #[test]
    fn test_weight_times_rate_is_exact() {
        let value = Grams::new(dec!(3)) * Money::new(dec!(6000));
        assert_eq!(value, Money::new(dec!(18000)));

        let value = Grams::new(dec!(0.1)) * Money::new(dec!(0.2));
        assert_eq!(value, Money::new(dec!(0.02)));
    }

    #[test]
    fn test_round_paise_halves_away_from_zero() {
        assert_eq!(Money::new(dec!(1.005)).round_paise(), Money::new(dec!(1.01)));
        assert_eq!(Money::new(dec!(1.015)).round_paise(), Money::new(dec!(1.02)));
        assert_eq!(Money::new(dec!(-1.005)).round_paise(), Money::new(dec!(-1.01)));
        assert_eq!(Money::new(dec!(907.5)).round_paise(), Money::new(dec!(907.50)));
    }

    #[test]
    fn test_parse_non_negative() {
        assert_eq!(
            Money::parse_non_negative(" 50000 ", "principal").unwrap(),
            Money::new(dec!(50000))
        );
        assert!(Money::parse_non_negative("0", "principal").is_ok());
        assert!(matches!(
            Money::parse_non_negative("", "principal"),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            Money::parse_non_negative("abc", "principal"),
            Err(ValidationError::NotANumber { .. })
        ));
        assert!(matches!(
            Money::parse_non_negative("-1", "principal"),
            Err(ValidationError::Negative { .. })
        ));
    }

    #[test]
    fn test_display_precision() {
        assert_eq!(Money::new(dec!(60500)).to_string(), "60500.00");
        assert_eq!(Grams::new(dec!(10)).to_string(), "10.000");
        assert_eq!(Money::new(dec!(0.125)).to_string(), "0.13");
        assert_eq!(Money::new(dec!(-0.125)).to_string(), "-0.13");
        assert_eq!(Grams::new(dec!(1.0005)).to_string(), "1.001");
    }
}
