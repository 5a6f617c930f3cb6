//! Transaction record types: the canonical shape of a single spending event.

use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::time::{self, DayKey};

/// A single spending event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    /// Opaque unique identifier, never reused
    pub id: String,
    /// Timestamp text as supplied (ISO-8601 / RFC 3339, or date only)
    pub date: String,
    /// Non-negative magnitude in rupees
    pub amount: f64,
    pub category: Category,
    pub description: String,
}

impl Transaction {
    /// Create a record with a freshly generated id.
    pub fn new(
        date: impl Into<String>,
        amount: f64,
        category: Category,
        description: impl Into<String>,
    ) -> Self {
        Self::with_id(new_id(), date, amount, category, description)
    }

    /// Create a record with a caller-chosen id (seed data).
    pub fn with_id(
        id: impl Into<String>,
        date: impl Into<String>,
        amount: f64,
        category: Category,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            date: date.into(),
            amount,
            category,
            description: description.into(),
        }
    }

    /// Parsed timestamp, if the date text is in a recognized format.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        time::parse_timestamp(&self.date)
    }

    /// Calendar-day bucket used by the daily totals view.
    pub fn day_key(&self) -> DayKey {
        time::day_key(&self.date)
    }

    /// Short ledger date, e.g. "May 1".
    pub fn display_date(&self) -> String {
        match self.timestamp() {
            Some(ts) => ts.format("%b %-d").to_string(),
            None => self.date.clone(),
        }
    }
}

/// Generate a fresh opaque transaction id.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Spending categories.
///
/// The eight named variants are the closed set offered for manual entry. Imported data may
/// carry any other label, which is kept as `Other` instead of being rejected or silently
/// rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    FoodDining,
    Shopping,
    Transportation,
    Entertainment,
    BillsUtilities,
    Health,
    Subscriptions,
    Misc,
    Other(String),
}

impl Category {
    /// The closed set, in display order.
    pub const KNOWN: [Category; 8] = [
        Category::FoodDining,
        Category::Shopping,
        Category::Transportation,
        Category::Entertainment,
        Category::BillsUtilities,
        Category::Health,
        Category::Subscriptions,
        Category::Misc,
    ];

    pub fn label(&self) -> &str {
        match self {
            Category::FoodDining => "Food & Dining",
            Category::Shopping => "Shopping",
            Category::Transportation => "Transportation",
            Category::Entertainment => "Entertainment",
            Category::BillsUtilities => "Bills & Utilities",
            Category::Health => "Health",
            Category::Subscriptions => "Subscriptions",
            Category::Misc => "Misc",
            Category::Other(label) => label,
        }
    }

    /// Whether this is one of the closed-set categories.
    pub fn is_known(&self) -> bool {
        !matches!(self, Category::Other(_))
    }

    /// Accept any label: known labels match case-insensitively, blank becomes `Misc`,
    /// anything else is kept verbatim as `Other`.
    pub fn parse_lenient(raw: &str) -> Category {
        let raw = raw.trim();
        if raw.is_empty() {
            return Category::Misc;
        }
        Self::find_known(raw).unwrap_or_else(|| Category::Other(raw.to_string()))
    }

    fn find_known(raw: &str) -> Option<Category> {
        Self::KNOWN
            .iter()
            .find(|c| c.label().eq_ignore_ascii_case(raw))
            .cloned()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Strict parse: only the closed set is accepted.
impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::find_known(s.trim()).with_context(|| {
            let known: Vec<&str> = Self::KNOWN.iter().map(|c| c.label()).collect();
            format!("unknown category '{}' (expected one of: {})", s.trim(), known.join(", "))
        })
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        Category::parse_lenient(&value)
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        match value {
            Category::Other(label) => label,
            known => known.label().to_string(),
        }
    }
}

/// A manually entered transaction, before validation.
#[derive(Debug, Clone)]
pub struct TransactionEntry {
    /// Amount as typed by the user
    pub amount: String,
    pub description: String,
    pub category: Category,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl TransactionEntry {
    /// Entry for `date` with the form defaults (Food & Dining at 12:00).
    pub fn new(amount: impl Into<String>, description: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            amount: amount.into(),
            description: description.into(),
            category: Category::FoodDining,
            date,
            time: NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default(),
        }
    }

    /// Validate the entry and build a record with a fresh id.
    pub fn into_transaction(self) -> Result<Transaction> {
        let amount_raw = self.amount.trim();
        let description = self.description.trim();
        if amount_raw.is_empty() {
            bail!("amount is required");
        }
        if description.is_empty() {
            bail!("description is required");
        }
        let amount: f64 = amount_raw
            .parse()
            .with_context(|| format!("invalid amount '{amount_raw}'"))?;
        if !amount.is_finite() || amount < 0.0 {
            bail!("amount must be a non-negative number, got {amount_raw}");
        }

        let date = format!("{}T{}:00", self.date.format("%Y-%m-%d"), self.time.format("%H:%M"));
        Ok(Transaction::new(date, amount, self.category, description))
    }
}
