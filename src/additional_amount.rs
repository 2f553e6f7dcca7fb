//! Additional amounts (field 54): one fixed-width 20-character occurrence.
//!
//! Layout: account type (2) + amount type (2) + currency code (3) + sign
//! ('C' credit / 'D' debit) + amount (12, zero padded). The signed numeric
//! value is derived from sign and amount together.

use crate::{Error, Result};

const AMOUNT_WIDTH: usize = 12;

/// One additional-amount occurrence of field 54.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdditionalAmount {
    account_type: String,
    amount_type: String,
    currency_code: String,
    sign: char,
    amount: String,
}

impl Default for AdditionalAmount {
    fn default() -> Self {
        Self {
            account_type: "00".to_string(),
            amount_type: "00".to_string(),
            currency_code: "000".to_string(),
            sign: 'C',
            amount: "0".repeat(AMOUNT_WIDTH),
        }
    }
}

impl AdditionalAmount {
    /// Parses a 20-character occurrence.
    pub fn parse(value: &str) -> Result<Self> {
        // ASCII-Check zuerst, sonst schneiden die festen Offsets in Zeichen.
        if value.len() != 20 || !value.is_ascii() {
            return Err(Error::InvalidValue(format!(
                "additional amount must be 20 ASCII characters, got {:?}",
                value
            )));
        }
        let sign = value[7..8].chars().next().unwrap_or('C');
        if sign != 'C' && sign != 'D' {
            return Err(Error::InvalidValue(format!(
                "additional amount sign must be C or D, got {sign:?}"
            )));
        }
        let amount = &value[8..20];
        if !amount.chars().all(|c| c.is_ascii_digit()) {
            return Err(Error::InvalidValue(
                "additional amount value must be 12 digits".to_string(),
            ));
        }
        Ok(Self {
            account_type: value[0..2].to_string(),
            amount_type: value[2..4].to_string(),
            currency_code: value[4..7].to_string(),
            sign,
            amount: amount.to_string(),
        })
    }

    /// The account type (2 characters).
    pub fn account_type(&self) -> &str {
        &self.account_type
    }

    /// Sets the account type.
    pub fn set_account_type(&mut self, value: &str) {
        self.account_type = value.to_string();
    }

    /// The amount type (2 characters).
    pub fn amount_type(&self) -> &str {
        &self.amount_type
    }

    /// Sets the amount type.
    pub fn set_amount_type(&mut self, value: &str) {
        self.amount_type = value.to_string();
    }

    /// The ISO 4217 numeric currency code (3 characters).
    pub fn currency_code(&self) -> &str {
        &self.currency_code
    }

    /// Sets the currency code.
    pub fn set_currency_code(&mut self, value: &str) {
        self.currency_code = value.to_string();
    }

    /// The sign character: 'C' credit, 'D' debit.
    pub fn sign(&self) -> char {
        self.sign
    }

    /// The zero-padded 12-digit amount.
    pub fn amount(&self) -> &str {
        &self.amount
    }

    /// Sets the amount, zero-padding to 12 digits.
    pub fn set_amount(&mut self, value: &str) {
        self.amount = format!("{value:0>width$}", width = AMOUNT_WIDTH);
    }

    /// The signed value: negative for debits.
    pub fn value(&self) -> i64 {
        let magnitude: i64 = self.amount.parse().unwrap_or(0);
        if self.sign == 'D' {
            -magnitude
        } else {
            magnitude
        }
    }

    /// Sets sign and amount from a signed value.
    pub fn set_value(&mut self, value: i64) {
        self.sign = if value < 0 { 'D' } else { 'C' };
        self.amount = format!("{:0width$}", value.unsigned_abs(), width = AMOUNT_WIDTH);
    }
}

impl std::fmt::Display for AdditionalAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{}{}{}{}",
            self.account_type, self.amount_type, self.currency_code, self.sign, self.amount
        )
    }
}
