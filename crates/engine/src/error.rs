//! The module contains the errors the engine can return.
//!
//! The core computation errors are:
//!
//! - [`InvalidAmount`] for malformed or out-of-precision money literals.
//! - [`InvalidSplit`] when split weights fail the mode-specific validation.
//! - [`ArithmeticOverflow`] when a [`Money`] operation leaves the `i64` range.
//! - [`UnbalancedLedger`] when balances that must sum to zero do not.
//!
//! The remaining variants are raised by the write path ([`Engine`]) and the
//! storage port. [`Conflict`] means a concurrent write won the race.
//!
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`InvalidSplit`]: EngineError::InvalidSplit
//!  [`ArithmeticOverflow`]: EngineError::ArithmeticOverflow
//!  [`UnbalancedLedger`]: EngineError::UnbalancedLedger
//!  [`Conflict`]: EngineError::Conflict
//!  [`Money`]: super::money::Money
//!  [`Engine`]: super::Engine
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid split: {0}")]
    InvalidSplit(String),
    #[error("Arithmetic overflow: {0}")]
    ArithmeticOverflow(String),
    #[error("Unbalanced ledger: {0}")]
    UnbalancedLedger(String),
    #[error("Invalid currency: {0}")]
    InvalidCurrency(String),
    #[error("Currency mismatch: {0}")]
    CurrencyMismatch(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Storage error: {0}")]
    Storage(String),
    /// The group changed between validation and write. Safe to retry.
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl EngineError {
    /// Returns `true` when the error is caused by user input and its message
    /// can be shown as-is (e.g. "percentages must total 100").
    ///
    /// Everything else signals a defect or corrupted data upstream and should
    /// be logged and reported as a generic failure.
    #[must_use]
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::InvalidAmount(_)
                | Self::InvalidSplit(_)
                | Self::InvalidCurrency(_)
                | Self::CurrencyMismatch(_)
                | Self::InvalidInput(_)
                | Self::Conflict(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_input_errors_are_user_facing() {
        assert!(EngineError::InvalidSplit("percentages must total 100".to_string()).is_user_facing());
        assert!(EngineError::InvalidAmount("too many decimals".to_string()).is_user_facing());
        assert!(!EngineError::UnbalancedLedger("sum is 1".to_string()).is_user_facing());
        assert!(!EngineError::ArithmeticOverflow("add".to_string()).is_user_facing());
        assert!(!EngineError::Storage("poisoned".to_string()).is_user_facing());
        assert!(EngineError::Conflict("group changed".to_string()).is_user_facing());
    }
}
