//! Lenient CSV ingestion.
//!
//! Expected text:
//!   date,amount,category,description
//!   2024-05-01T23:45:00,85.20,Shopping,Amazon Late Night Order
//!
//! Columns are matched by header name (case-insensitive); unknown headers are ignored.
//! Rows are split on bare commas, so a quoted field containing a comma shifts every column
//! after it. Bad fields fall back to defaults instead of failing the row, and a file that
//! yields nothing comes back as an empty vec.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use moneymood_core::{Category, Transaction, timestamp_now};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

const NO_DESCRIPTION: &str = "No description";

/// Parse CSV text, stamping undated rows with the current time.
pub fn parse_transactions_csv(text: &str) -> Vec<Transaction> {
    parse_transactions_csv_at(text, Utc::now())
}

/// Parse CSV text, stamping undated rows with `now`.
pub fn parse_transactions_csv_at(text: &str, now: DateTime<Utc>) -> Vec<Transaction> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut lines = text.split('\n').filter(|line| !line.trim().is_empty());

    let Some(header_line) = lines.next() else {
        return Vec::new();
    };
    let headers: Vec<String> = header_line
        .split(',')
        .map(|h| h.trim().to_lowercase())
        .collect();

    lines
        .enumerate()
        .map(|(i, line)| parse_row(i + 1, &headers, line, now))
        .collect()
}

/// Read a CSV file from disk and parse it. Invalid UTF-8 is replaced, not rejected.
pub fn read_transactions_file(path: impl AsRef<Path>) -> Result<Vec<Transaction>> {
    let path = path.as_ref();
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let text = String::from_utf8_lossy(&bytes);
    let txns = parse_transactions_csv(&text);
    debug!(path = %path.display(), rows = txns.len(), "parsed transactions file");
    Ok(txns)
}

fn parse_row(row: usize, headers: &[String], line: &str, now: DateTime<Utc>) -> Transaction {
    let values: Vec<&str> = line.split(',').collect();
    let mut fields: HashMap<&str, &str> = HashMap::new();
    for (i, header) in headers.iter().enumerate() {
        if let Some(value) = values.get(i) {
            fields.insert(header.as_str(), clean(value));
        }
    }
    let field = |name: &str| fields.get(name).copied().filter(|v| !v.is_empty());

    let date = match field("date") {
        Some(d) => d.to_string(),
        None => {
            debug!(row, "missing date, using current time");
            timestamp_now(now)
        }
    };

    let amount = field("amount").map(|raw| parse_amount(row, raw)).unwrap_or(0.0);

    let category = field("category")
        .map(Category::parse_lenient)
        .unwrap_or(Category::Misc);
    if !category.is_known() {
        debug!(row, category = %category, "keeping unlisted category");
    }

    let description = field("description").unwrap_or(NO_DESCRIPTION);

    Transaction::new(date, amount, category, description)
}

fn clean(value: &str) -> &str {
    value.trim().trim_matches('"').trim()
}

fn parse_amount(row: usize, raw: &str) -> f64 {
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => {
            if v < 0.0 {
                debug!(row, raw, "negative amount stored as magnitude");
            }
            v.abs()
        }
        _ => {
            debug!(row, raw, "unreadable amount, using 0");
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashSet;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_parses_well_formed_rows_in_order() {
        let text = "date,amount,category,description\n\
                    2024-05-01,100,Food & Dining,A\n\
                    2024-05-01,50,Food & Dining,B\n\
                    2024-05-02,30,Shopping,C\n";
        let txns = parse_transactions_csv(text);
        assert_eq!(txns.len(), 3);
        let descs: Vec<_> = txns.iter().map(|t| t.description.as_str()).collect();
        assert_eq!(descs, vec!["A", "B", "C"]);
        assert_eq!(txns[0].amount, 100.0);
        assert_eq!(txns[0].category, Category::FoodDining);
        assert_eq!(txns[2].date, "2024-05-02");

        let ids: HashSet<_> = txns.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn test_bad_amount_and_missing_category() {
        let txns = parse_transactions_csv("date,amount,category,description\n2024-01-01,abc,,Coffee");
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].amount, 0.0);
        assert_eq!(txns[0].category, Category::Misc);
        assert_eq!(txns[0].description, "Coffee");
    }

    #[test]
    fn test_absent_columns_use_defaults() {
        let txns = parse_transactions_csv_at("amount\n42.5\n", fixed_now());
        assert_eq!(txns.len(), 1);
        let t = &txns[0];
        assert_eq!(t.amount, 42.5);
        assert_eq!(t.category, Category::Misc);
        assert_eq!(t.description, "No description");
        assert_eq!(t.date, "2024-06-01T09:30:00.000Z");
    }

    #[test]
    fn test_short_rows_default_missing_fields() {
        let txns = parse_transactions_csv("date,amount,category,description\n2024-05-03");
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].date, "2024-05-03");
        assert_eq!(txns[0].amount, 0.0);
        assert_eq!(txns[0].category, Category::Misc);
    }

    #[test]
    fn test_empty_and_header_only_inputs() {
        assert!(parse_transactions_csv("").is_empty());
        assert!(parse_transactions_csv("\n  \n\r\n").is_empty());
        assert!(parse_transactions_csv("date,amount,category,description\n").is_empty());
    }

    #[test]
    fn test_headers_are_case_insensitive_and_reorderable() {
        let text = " Description , AMOUNT,Notes,Date,Category\r\nTea,20,ignored,2024-05-04,health\r\n";
        let txns = parse_transactions_csv(text);
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].description, "Tea");
        assert_eq!(txns[0].amount, 20.0);
        assert_eq!(txns[0].date, "2024-05-04");
        assert_eq!(txns[0].category, Category::Health);
    }

    #[test]
    fn test_quotes_and_whitespace_are_stripped() {
        let text = "date,amount,category,description\n\"2024-05-01\", \"12.50\" ,\"Shopping\",\"  Shoes \"";
        let txns = parse_transactions_csv(text);
        assert_eq!(txns[0].date, "2024-05-01");
        assert_eq!(txns[0].amount, 12.5);
        assert_eq!(txns[0].category, Category::Shopping);
        assert_eq!(txns[0].description, "Shoes");
    }

    #[test]
    fn test_quoted_comma_misaligns_columns() {
        let text = "date,amount,description,category\n2024-05-01,10,\"Tea, biscuits\",Food & Dining";
        let txns = parse_transactions_csv(text);
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].description, "Tea");
        assert_eq!(txns[0].category, Category::Other("biscuits".to_string()));
    }

    #[test]
    fn test_unlisted_category_is_kept() {
        let txns = parse_transactions_csv("date,amount,category\n2024-05-01,5,Groceries");
        assert_eq!(txns[0].category, Category::Other("Groceries".to_string()));
    }

    #[test]
    fn test_odd_amounts() {
        let text = "amount\n-25\nNaN\ninf\n1e3\n\u{20b9}40\n";
        let amounts: Vec<f64> = parse_transactions_csv(text).iter().map(|t| t.amount).collect();
        assert_eq!(amounts, vec![25.0, 0.0, 0.0, 1000.0, 0.0]);
    }

    #[test]
    fn test_byte_order_mark_is_ignored() {
        let txns = parse_transactions_csv("\u{feff}date,amount\n2024-05-01,3\n");
        assert_eq!(txns[0].date, "2024-05-01");
    }

    #[test]
    fn test_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload.csv");
        fs::write(&path, "date,amount,category,description\n2024-05-01,9,Health,Vitamins\n").unwrap();
        let txns = read_transactions_file(&path).unwrap();
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].description, "Vitamins");
    }

    #[test]
    fn test_read_missing_file_names_path() {
        let err = read_transactions_file("/definitely/not/here.csv").unwrap_err();
        assert!(format!("{err:#}").contains("/definitely/not/here.csv"));
    }
}
