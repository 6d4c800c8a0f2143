use super::investment::{Investment, InvestmentFactor, UnitSource};
use rust_decimal::prelude::*;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Eq, Ord, Hash)]
pub struct AccountNumber(i32);

impl AccountNumber {
    pub fn new(number: i32) -> Self {
        Self(number)
    }
}

impl fmt::Display for AccountNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Branch code, kept exactly as typed
#[derive(Debug, Clone, PartialEq, PartialOrd, Eq, Ord, Hash)]
pub struct Branch(String);

impl From<String> for Branch {
    fn from(code: String) -> Self {
        Self(code)
    }
}

impl From<&str> for Branch {
    fn from(code: &str) -> Self {
        Self(code.to_owned())
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Composite lookup key. Neither half is unique on its own.
#[derive(Debug, Clone, PartialEq, PartialOrd, Eq, Ord, Hash)]
pub struct AccountKey {
    number: AccountNumber,
    branch: Branch,
}

impl AccountKey {
    pub fn new(number: AccountNumber, branch: impl Into<Branch>) -> Self {
        Self {
            number,
            branch: branch.into(),
        }
    }
}

impl fmt::Display for AccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.number, self.branch)
    }
}

#[derive(Error, Debug, PartialEq)]
pub(crate) enum AccountError {
    #[error("Cannot take {requested} out of an account holding {available}")]
    InsufficientFunds {
        requested: Decimal,
        available: Decimal,
    },

    #[error("Amount {0} pushes the balance out of range")]
    Overflow(Decimal),
}

impl AccountError {
    /// Text shown to the account holder
    pub(crate) fn notice(&self) -> &'static str {
        match self {
            AccountError::InsufficientFunds { .. } => "Insufficient balance.",
            AccountError::Overflow(_) => "Amount out of range.",
        }
    }
}

type AccountResult<T> = anyhow::Result<T, AccountError>;

/// Renders an amount with two decimals, rounding half away from zero.
pub(crate) fn format_money(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}", rounded)
}

/// Renders a percentage with no decimals, rounding half away from zero.
pub(crate) fn format_percent(percent: f64) -> String {
    format!("{:.0}", percent.round())
}

/// Customer Account
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    key: AccountKey,
    owner_name: String,
    /// No lower bound. Negative deposits can take it below zero.
    balance: Decimal,
}

impl Account {
    pub(crate) fn new(key: AccountKey, owner_name: impl Into<String>, balance: Decimal) -> Self {
        Self {
            key,
            owner_name: owner_name.into(),
            balance,
        }
    }

    pub fn key(&self) -> &AccountKey {
        &self.key
    }

    pub fn owner_name(&self) -> &str {
        &self.owner_name
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub(crate) fn welcome_message(&self) -> String {
        format!(
            "\nHello {}, thank you for opening an account with our bank. Your branch is {}, account {}, and your balance of {} is already available for withdrawal.",
            self.owner_name,
            self.key.branch,
            self.key.number,
            format_money(self.balance)
        )
    }

    fn ensure_covers(&self, amount: Decimal) -> AccountResult<()> {
        if amount > self.balance {
            return Err(AccountError::InsufficientFunds {
                requested: amount,
                available: self.balance,
            });
        }
        Ok(())
    }

    /// Returns the new balance. Negative amounts pass the funds check.
    pub(crate) fn withdraw(&mut self, amount: Decimal) -> AccountResult<Decimal> {
        self.ensure_covers(amount)?;
        self.balance = self
            .balance
            .checked_sub(amount)
            .ok_or(AccountError::Overflow(amount))?;
        Ok(self.balance)
    }

    pub(crate) fn deposit(&mut self, amount: Decimal) -> AccountResult<Decimal> {
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(AccountError::Overflow(amount))?;
        Ok(self.balance)
    }

    /// Draws a factor only once the principal is covered.
    pub(crate) fn invest<U: UnitSource + ?Sized>(
        &mut self,
        amount: Decimal,
        units: &mut U,
    ) -> AccountResult<Investment> {
        self.ensure_covers(amount)?;

        let factor = InvestmentFactor::draw(units);
        let balance = amount
            .checked_mul(factor.to_decimal())
            .and_then(|change| self.balance.checked_add(change))
            .ok_or(AccountError::Overflow(amount))?;
        self.balance = balance;

        Ok(Investment { factor, balance })
    }
}
