use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Currency, EngineError, ResultEngine};

/// Signed money amount represented as an integer number of **minor units**
/// (cents for EUR, yen for JPY).
///
/// Use this type for **all** monetary values in the engine (expense totals,
/// owed amounts, balances, transfers) to avoid floating-point drift.
///
/// Arithmetic is always checked: an operation that leaves the `i64` range
/// returns [`EngineError::ArithmeticOverflow`] instead of wrapping.
///
/// # Examples
///
/// ```rust
/// use engine::{Currency, Money};
///
/// let amount = Money::new(12_34);
/// assert_eq!(amount.minor(), 1234);
///
/// let jpy = Currency::try_from("JPY").unwrap();
/// assert_eq!(Money::parse("1200", jpy).unwrap().minor(), 1200);
/// assert!(Money::parse("12.5", jpy).is_err());
/// ```
///
/// Parsing with the default two fraction digits (accepts `.` or `,` as
/// decimal separator):
///
/// ```rust
/// use engine::Money;
///
/// assert_eq!("10".parse::<Money>().unwrap().minor(), 1000);
/// assert_eq!("10,5".parse::<Money>().unwrap().minor(), 1050);
/// assert!("12.345".parse::<Money>().is_err());
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Creates a new amount from integer minor units.
    #[must_use]
    pub const fn new(minor: i64) -> Self {
        Self(minor)
    }

    /// Returns the raw value in minor units.
    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    /// Returns `true` if the amount is 0.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the amount is positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Returns `true` if the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Absolute value. Fails only for `i64::MIN`.
    pub fn abs(self) -> ResultEngine<Money> {
        self.0
            .checked_abs()
            .map(Money)
            .ok_or_else(|| overflow("abs", self.0, None))
    }

    pub fn checked_add(self, rhs: Money) -> ResultEngine<Money> {
        self.0
            .checked_add(rhs.0)
            .map(Money)
            .ok_or_else(|| overflow("add", self.0, Some(rhs.0)))
    }

    pub fn checked_sub(self, rhs: Money) -> ResultEngine<Money> {
        self.0
            .checked_sub(rhs.0)
            .map(Money)
            .ok_or_else(|| overflow("sub", self.0, Some(rhs.0)))
    }

    pub fn checked_neg(self) -> ResultEngine<Money> {
        self.0
            .checked_neg()
            .map(Money)
            .ok_or_else(|| overflow("neg", self.0, None))
    }

    /// Multiplies the amount by an integer count.
    pub fn checked_mul(self, count: i64) -> ResultEngine<Money> {
        self.0
            .checked_mul(count)
            .map(Money)
            .ok_or_else(|| overflow("mul", self.0, Some(count)))
    }

    /// Euclidean division by a positive count.
    ///
    /// Returns the quotient and the remainder in minor units. For a
    /// non-negative amount `quotient * count + remainder == self` and
    /// `0 <= remainder < count`.
    pub fn div_rem(self, count: i64) -> ResultEngine<(Money, i64)> {
        if count <= 0 {
            return Err(EngineError::ArithmeticOverflow(format!(
                "cannot divide {} by {count}",
                self.0
            )));
        }
        let quotient = self
            .0
            .checked_div_euclid(count)
            .ok_or_else(|| overflow("div", self.0, Some(count)))?;
        Ok((Money(quotient), self.0.rem_euclid(count)))
    }

    /// Sums amounts, failing on overflow.
    pub fn try_sum<I>(amounts: I) -> ResultEngine<Money>
    where
        I: IntoIterator<Item = Money>,
    {
        amounts
            .into_iter()
            .try_fold(Money::ZERO, |acc, amount| acc.checked_add(amount))
    }

    /// Parses a decimal string using the precision of `currency`.
    ///
    /// Accepts `.` or `,` as decimal separator and an optional leading `+`/`-`.
    ///
    /// Validation rules:
    /// - at most `currency.minor_units()` fractional digits (rejects `12.345`
    ///   for EUR, `12.5` for JPY)
    /// - rejects empty/invalid strings
    pub fn parse(input: &str, currency: Currency) -> ResultEngine<Money> {
        let empty = || EngineError::InvalidAmount("empty amount".to_string());
        let invalid = || EngineError::InvalidAmount(format!("invalid amount: {}", input.trim()));
        let too_large = || EngineError::InvalidAmount("amount too large".to_string());

        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(empty());
        }

        let (negative, rest) = if let Some(stripped) = trimmed.strip_prefix('-') {
            (true, stripped)
        } else if let Some(stripped) = trimmed.strip_prefix('+') {
            (false, stripped)
        } else {
            (false, trimmed)
        };

        let rest = rest.trim();
        if rest.is_empty() {
            return Err(empty());
        }

        let rest = rest.replace(',', ".");
        let mut parts = rest.split('.');
        let major_str = parts.next().ok_or_else(invalid)?;
        let fraction_str = parts.next().unwrap_or("");
        if parts.next().is_some() {
            return Err(invalid());
        }

        if major_str.is_empty() || !major_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        if !fraction_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let digits = usize::from(currency.minor_units());
        if fraction_str.len() > digits {
            return Err(EngineError::InvalidAmount(format!(
                "too many decimals: {} allows at most {digits}",
                currency.code()
            )));
        }

        let major: i64 = major_str.parse().map_err(|_| too_large())?;
        let fraction: i64 = if fraction_str.is_empty() {
            0
        } else {
            // Right-pad to the currency precision: "5" with 2 digits is 50.
            let padded = format!("{fraction_str:0<digits$}");
            padded.parse().map_err(|_| invalid())?
        };

        let total = major
            .checked_mul(currency.scale())
            .and_then(|v| v.checked_add(fraction))
            .ok_or_else(too_large)?;

        Ok(Money(if negative { -total } else { total }))
    }

    /// Like [`Money::parse`], but rejects negative values.
    pub fn parse_non_negative(input: &str, currency: Currency) -> ResultEngine<Money> {
        let amount = Self::parse(input, currency)?;
        if amount.is_negative() {
            return Err(EngineError::InvalidAmount(
                "amount must not be negative".to_string(),
            ));
        }
        Ok(amount)
    }

    /// Builds an amount from whole major units (e.g. `12` EUR → `1200`).
    pub fn from_major(major: i64, currency: Currency) -> ResultEngine<Money> {
        major
            .checked_mul(currency.scale())
            .map(Money)
            .ok_or_else(|| overflow("mul", major, Some(currency.scale())))
    }
}

fn overflow(op: &str, lhs: i64, rhs: Option<i64>) -> EngineError {
    let msg = match rhs {
        Some(rhs) => format!("{op}({lhs}, {rhs}) is out of range"),
        None => format!("{op}({lhs}) is out of range"),
    };
    EngineError::ArithmeticOverflow(msg)
}

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Money> for i64 {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl FromStr for Money {
    type Err = EngineError;

    /// Parses a decimal string with two fraction digits (the EUR default).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::parse(s, Currency::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_dot_or_comma() {
        assert_eq!("10".parse::<Money>().unwrap().minor(), 1000);
        assert_eq!("10.5".parse::<Money>().unwrap().minor(), 1050);
        assert_eq!("10,50".parse::<Money>().unwrap().minor(), 1050);
        assert_eq!("10.".parse::<Money>().unwrap().minor(), 1000);
        assert_eq!("-0.01".parse::<Money>().unwrap().minor(), -1);
        assert_eq!("+1.00".parse::<Money>().unwrap().minor(), 100);
        assert_eq!("  2.30 ".parse::<Money>().unwrap().minor(), 230);
    }

    #[test]
    fn parse_honors_currency_precision() {
        let jpy = Currency::try_from("JPY").unwrap();
        let kwd = Currency::try_from("KWD").unwrap();
        assert_eq!(Money::parse("1500", jpy).unwrap().minor(), 1500);
        assert!(Money::parse("1500.5", jpy).is_err());
        assert_eq!(Money::parse("1.5", kwd).unwrap().minor(), 1500);
        assert_eq!(Money::parse("1.234", kwd).unwrap().minor(), 1234);
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert!("12.345".parse::<Money>().is_err());
        assert!("0.001".parse::<Money>().is_err());
        assert!("".parse::<Money>().is_err());
        assert!("-".parse::<Money>().is_err());
        assert!("1.2.3".parse::<Money>().is_err());
        assert!(".5".parse::<Money>().is_err());
        assert!("1e3".parse::<Money>().is_err());
        assert!("99999999999999999999".parse::<Money>().is_err());
    }

    #[test]
    fn parse_non_negative_rejects_sign() {
        let err = Money::parse_non_negative("-1", Currency::EUR).unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidAmount("amount must not be negative".to_string())
        );
        assert_eq!(
            Money::parse_non_negative("0", Currency::EUR).unwrap(),
            Money::ZERO
        );
    }

    #[test]
    fn arithmetic_overflow_is_an_error() {
        let max = Money::new(i64::MAX);
        assert!(matches!(
            max.checked_add(Money::new(1)),
            Err(EngineError::ArithmeticOverflow(_))
        ));
        assert!(matches!(
            Money::new(i64::MIN).checked_neg(),
            Err(EngineError::ArithmeticOverflow(_))
        ));
        assert!(matches!(
            max.checked_mul(2),
            Err(EngineError::ArithmeticOverflow(_))
        ));
        assert!(matches!(
            Money::try_sum([max, Money::new(1)]),
            Err(EngineError::ArithmeticOverflow(_))
        ));
    }

    #[test]
    fn div_rem_splits_exactly() {
        let (quotient, remainder) = Money::new(100).div_rem(3).unwrap();
        assert_eq!(quotient, Money::new(33));
        assert_eq!(remainder, 1);
        assert_eq!(
            quotient.checked_mul(3).unwrap().minor() + remainder,
            100
        );
        assert!(Money::new(100).div_rem(0).is_err());
    }
}
