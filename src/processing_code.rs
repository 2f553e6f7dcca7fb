//! Processing code (field 3): transaction type plus from/to account types.
//!
//! Six digits, split 2+2+2. This is a convenience view over the field
//! value; the field itself packs as a plain n-6.

use crate::{Error, Result};

/// Parsed processing code: `ttffoo` where `tt` is the transaction type,
/// `ff` the from-account type and `oo` the to-account type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingCode {
    tran_type: String,
    from_account: String,
    to_account: String,
}

impl ProcessingCode {
    /// Parses a six-digit processing code.
    pub fn parse(value: &str) -> Result<Self> {
        if value.len() != 6 || !value.chars().all(|c| c.is_ascii_digit()) {
            return Err(Error::InvalidValue(format!(
                "processing code must be 6 digits, got {value:?}"
            )));
        }
        Ok(Self {
            tran_type: value[0..2].to_string(),
            from_account: value[2..4].to_string(),
            to_account: value[4..6].to_string(),
        })
    }

    /// The transaction type (digits 1-2).
    pub fn tran_type(&self) -> &str {
        &self.tran_type
    }

    /// The from-account type (digits 3-4).
    pub fn from_account(&self) -> &str {
        &self.from_account
    }

    /// The to-account type (digits 5-6).
    pub fn to_account(&self) -> &str {
        &self.to_account
    }
}

impl std::fmt::Display for ProcessingCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.tran_type, self.from_account, self.to_account)
    }
}

/// Account type codes used in processing codes and additional amounts.
pub mod account_type {
    /// Default account.
    pub const DEFAULT: &str = "00";
    /// Savings account.
    pub const SAVINGS: &str = "10";
    /// Cheque account.
    pub const CHECK: &str = "20";
    /// Credit account.
    pub const CREDIT: &str = "30";
    /// Universal account.
    pub const UNIVERSAL: &str = "40";
    /// Investment account.
    pub const INVESTMENT: &str = "50";
    /// Electronic purse (default).
    pub const ELECTRONIC_PURSE: &str = "60";
}
