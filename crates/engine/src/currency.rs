use serde::{Deserialize, Serialize};

use crate::EngineError;

/// ISO 4217 currency code used by a group and every money value inside it.
///
/// A group is mono-currency: all expenses, balances and transfers of a group
/// share its currency, and the engine never converts between currencies.
///
/// ## Minor units
///
/// The engine stores monetary values as an `i64` number of **minor units**
/// (see `Money`). `minor_units()` returns how many decimal digits are used
/// when converting between:
/// - major units (human input, e.g. `10.50 EUR`)
/// - minor units (stored integers, e.g. `1050`)
///
/// Example: EUR has 2 minor units, so `10.50 EUR` ⇄ `1050`; JPY has none, so
/// `1050 JPY` ⇄ `1050`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency {
    code: [u8; 3],
    minor_units: u8,
}

/// Digits used for well-formed codes missing from [`MINOR_UNITS`].
pub const DEFAULT_MINOR_UNITS: u8 = 2;

/// Currencies whose precision differs from [`DEFAULT_MINOR_UNITS`].
const MINOR_UNITS: &[(&str, u8)] = &[
    ("BHD", 3),
    ("BIF", 0),
    ("CLP", 0),
    ("DJF", 0),
    ("GNF", 0),
    ("IQD", 3),
    ("ISK", 0),
    ("JOD", 3),
    ("JPY", 0),
    ("KMF", 0),
    ("KRW", 0),
    ("KWD", 3),
    ("LYD", 3),
    ("OMR", 3),
    ("PYG", 0),
    ("RWF", 0),
    ("TND", 3),
    ("UGX", 0),
    ("VND", 0),
    ("VUV", 0),
    ("XAF", 0),
    ("XOF", 0),
    ("XPF", 0),
];

impl Currency {
    pub const EUR: Currency = Currency {
        code: *b"EUR",
        minor_units: 2,
    };

    /// Canonical currency code.
    #[must_use]
    pub fn code(&self) -> &str {
        // `code` only ever holds ASCII uppercase letters.
        std::str::from_utf8(&self.code).unwrap_or("???")
    }

    /// Number of fraction digits used when parsing amounts.
    #[must_use]
    pub const fn minor_units(self) -> u8 {
        self.minor_units
    }

    /// `10^minor_units`: how many minor units make one major unit.
    #[must_use]
    pub const fn scale(self) -> i64 {
        10i64.pow(self.minor_units as u32)
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::EUR
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_uppercase();
        let code: [u8; 3] = normalized
            .as_bytes()
            .try_into()
            .ok()
            .filter(|bytes: &[u8; 3]| bytes.iter().all(u8::is_ascii_uppercase))
            .ok_or_else(|| {
                EngineError::InvalidCurrency(format!("invalid currency code: {}", value.trim()))
            })?;

        let minor_units = MINOR_UNITS
            .iter()
            .find_map(|(known, digits)| (*known == normalized).then_some(*digits))
            .unwrap_or(DEFAULT_MINOR_UNITS);

        Ok(Self { code, minor_units })
    }
}

impl TryFrom<String> for Currency {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Currency::try_from(value.as_str())
    }
}

impl From<Currency> for String {
    fn from(value: Currency) -> Self {
        value.code().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_use_table_precision() {
        assert_eq!(Currency::try_from("JPY").unwrap().minor_units(), 0);
        assert_eq!(Currency::try_from("kwd").unwrap().minor_units(), 3);
        assert_eq!(Currency::try_from(" eur ").unwrap(), Currency::EUR);
    }

    #[test]
    fn unknown_codes_default_to_two_digits() {
        let currency = Currency::try_from("XYZ").unwrap();
        assert_eq!(currency.code(), "XYZ");
        assert_eq!(currency.minor_units(), DEFAULT_MINOR_UNITS);
        assert_eq!(currency.scale(), 100);
    }

    #[test]
    fn malformed_codes_are_rejected() {
        for input in ["", "EU", "EURO", "E1R", "€€€"] {
            assert!(matches!(
                Currency::try_from(input),
                Err(EngineError::InvalidCurrency(_))
            ));
        }
    }

    #[test]
    fn serializes_as_code() {
        let json = serde_json::to_string(&Currency::try_from("USD").unwrap()).unwrap();
        assert_eq!(json, "\"USD\"");
        let back: Currency = serde_json::from_str("\"jpy\"").unwrap();
        assert_eq!(back.minor_units(), 0);
    }
}
