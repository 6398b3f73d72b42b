use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A bank transaction as exchanged with the bank container.
///
/// This is a declared shape only; no field is validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct Transaction {
    /// When the transaction was made.
    pub created_at: DateTime<Utc>,
    /// Transaction amount in `currency` units.
    pub amount: f64,
    /// Free-text memo attached by the bank.
    pub info: String,
    /// Short human-readable title.
    pub title: String,
    /// Always [`Currency::Thb`].
    pub currency: Currency,
}

impl Transaction {
    /// Create a THB transaction.
    #[must_use]
    pub fn new(
        created_at: DateTime<Utc>,
        amount: f64,
        info: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            created_at,
            amount,
            info: info.into(),
            title: title.into(),
            currency: Currency::Thb,
        }
    }
}

/// Currency tag carried by every [`Transaction`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Currency {
    /// Thai baht.
    #[default]
    #[serde(rename = "THB")]
    Thb,
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Currency::Thb => f.write_str("THB"),
        }
    }
}
