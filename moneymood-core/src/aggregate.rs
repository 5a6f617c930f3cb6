//! Derived views over a transaction collection.
//!
//! Everything here is recomputed from scratch on each call; nothing is cached.

use chrono::{Datelike, Timelike, Weekday};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::finance::Transaction;
use crate::time::{DayKey, has_clock_time};

/// Summed amount for one category label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: f64,
}

/// Summed amount for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTotal {
    pub day: DayKey,
    pub amount: f64,
}

/// Per-category totals, in order of each category's first occurrence.
pub fn category_totals(txns: &[Transaction]) -> Vec<CategoryTotal> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<CategoryTotal> = Vec::new();

    for txn in txns {
        let label = txn.category.label();
        match index.get(label) {
            Some(&i) => totals[i].amount += txn.amount,
            None => {
                index.insert(label, totals.len());
                totals.push(CategoryTotal {
                    category: label.to_string(),
                    amount: txn.amount,
                });
            }
        }
    }

    totals
}

/// Per-day totals, ascending by date.
pub fn daily_totals(txns: &[Transaction]) -> Vec<DailyTotal> {
    let mut days: BTreeMap<DayKey, f64> = BTreeMap::new();
    for txn in txns {
        *days.entry(txn.day_key()).or_insert(0.0) += txn.amount;
    }
    days.into_iter()
        .map(|(day, amount)| DailyTotal { day, amount })
        .collect()
}

/// Sum of every amount in the collection.
pub fn total_spent(txns: &[Transaction]) -> f64 {
    txns.iter().map(|t| t.amount).sum()
}

/// Headline numbers for the dashboard cards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpendingSummary {
    pub count: usize,
    pub total: f64,
    pub average: f64,
    pub largest: Option<f64>,
    /// Category with the largest total; ties keep the first seen
    pub dominant_category: Option<CategoryTotal>,
}

impl SpendingSummary {
    pub fn from_transactions(txns: &[Transaction]) -> Self {
        let total = total_spent(txns);
        let count = txns.len();
        let average = if count == 0 { 0.0 } else { total / count as f64 };
        let largest = txns.iter().map(|t| t.amount).reduce(f64::max);

        let mut dominant: Option<CategoryTotal> = None;
        for ct in category_totals(txns) {
            if dominant.as_ref().is_none_or(|d| ct.amount > d.amount) {
                dominant = Some(ct);
            }
        }

        Self {
            count,
            total,
            average,
            largest,
            dominant_category: dominant,
        }
    }
}

/// Count and amount falling inside one behavioral time window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct WindowTotal {
    pub count: usize,
    pub amount: f64,
}

impl WindowTotal {
    fn add(&mut self, amount: f64) {
        self.count += 1;
        self.amount += amount;
    }
}

/// Spending inside the time windows the behavioral analysis looks at.
///
/// Records without a readable timestamp are counted in no window. Date-only records
/// count toward weekend and post-payday but never late night.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BehaviorWindows {
    /// 23:00 to 04:59
    pub late_night: WindowTotal,
    /// Saturday and Sunday
    pub weekend: WindowTotal,
    /// First five days of the month
    pub post_payday: WindowTotal,
}

impl BehaviorWindows {
    pub fn from_transactions(txns: &[Transaction]) -> Self {
        let mut out = Self::default();
        for txn in txns {
            let Some(ts) = txn.timestamp() else {
                continue;
            };
            if has_clock_time(&txn.date) && (ts.hour() >= 23 || ts.hour() < 5) {
                out.late_night.add(txn.amount);
            }
            if matches!(ts.weekday(), Weekday::Sat | Weekday::Sun) {
                out.weekend.add(txn.amount);
            }
            if ts.day() <= 5 {
                out.post_payday.add(txn.amount);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finance::Category;
    use crate::seed::mock_transactions;
    use chrono::NaiveDate;

    fn txn(date: &str, amount: f64, category: &str, desc: &str) -> Transaction {
        Transaction::new(date, amount, Category::parse_lenient(category), desc)
    }

    fn example() -> Vec<Transaction> {
        vec![
            txn("2024-05-01", 100.0, "Food", "A"),
            txn("2024-05-01", 50.0, "Food", "B"),
            txn("2024-05-02", 30.0, "Shopping", "C"),
        ]
    }

    #[test]
    fn test_category_totals_example() {
        let totals = category_totals(&example());
        assert_eq!(
            totals,
            vec![
                CategoryTotal { category: "Food".to_string(), amount: 150.0 },
                CategoryTotal { category: "Shopping".to_string(), amount: 30.0 },
            ]
        );
    }

    #[test]
    fn test_daily_totals_example() {
        let daily = daily_totals(&example());
        let d = |day| DayKey::Date(NaiveDate::from_ymd_opt(2024, 5, day).unwrap());
        assert_eq!(
            daily,
            vec![
                DailyTotal { day: d(1), amount: 150.0 },
                DailyTotal { day: d(2), amount: 30.0 },
            ]
        );
    }

    #[test]
    fn test_category_totals_first_occurrence_order() {
        let txns = vec![
            txn("2024-05-01", 1.0, "Health", "a"),
            txn("2024-05-01", 1.0, "Shopping", "b"),
            txn("2024-05-01", 1.0, "health", "c"),
        ];
        let labels: Vec<_> = category_totals(&txns).into_iter().map(|c| c.category).collect();
        assert_eq!(labels, vec!["Health", "Shopping"]);
    }

    #[test]
    fn test_totals_conserve_amounts() {
        let mut txns = mock_transactions();
        txns.push(txn("not-a-date", 7.5, "Snacks", "odd row"));
        let expected = total_spent(&txns);

        let by_category: f64 = category_totals(&txns).iter().map(|c| c.amount).sum();
        let by_day: f64 = daily_totals(&txns).iter().map(|d| d.amount).sum();
        assert!((by_category - expected).abs() < 1e-9);
        assert!((by_day - expected).abs() < 1e-9);
    }

    #[test]
    fn test_daily_totals_sorted_by_date_value() {
        // Lexical order would put 05/10/2024 before 2024-05-02.
        let txns = vec![
            txn("05/10/2024", 5.0, "Misc", "a"),
            txn("2024-05-02T08:00:00", 2.0, "Misc", "b"),
            txn("2024-04-30", 1.0, "Misc", "c"),
            txn("garbage", 3.0, "Misc", "d"),
        ];
        let daily = daily_totals(&txns);
        for w in daily.windows(2) {
            assert!(w[0].day <= w[1].day, "not sorted: {:?}", daily);
        }
        assert_eq!(daily.first().unwrap().day.to_string(), "2024-04-30");
        assert_eq!(daily.last().unwrap().day.to_string(), "garbage");
    }

    #[test]
    fn test_summary() {
        let summary = SpendingSummary::from_transactions(&mock_transactions());
        assert_eq!(summary.count, 7);
        assert!((summary.total - 1808.69).abs() < 1e-6);
        assert_eq!(summary.largest, Some(1200.0));
        let dominant = summary.dominant_category.unwrap();
        assert_eq!(dominant.category, "Bills & Utilities");
    }

    #[test]
    fn test_summary_of_nothing() {
        let summary = SpendingSummary::from_transactions(&[]);
        assert_eq!(summary.count, 0);
        assert_eq!(summary.average, 0.0);
        assert_eq!(summary.largest, None);
        assert!(summary.dominant_category.is_none());
    }

    #[test]
    fn test_behavior_windows() {
        let windows = BehaviorWindows::from_transactions(&mock_transactions());
        // 23:45 on May 1, 01:15 on May 5
        assert_eq!(windows.late_night.count, 2);
        assert!((windows.late_night.amount - 130.2).abs() < 1e-9);
        // May 5 (Sun), May 25 (Sat), May 26 (Sun)
        assert_eq!(windows.weekend.count, 3);
        // May 1, 2, 5
        assert_eq!(windows.post_payday.count, 3);
    }

    #[test]
    fn test_date_only_rows_skip_late_night() {
        let txns = vec![txn("2024-05-04", 40.0, "Misc", "Saturday, no time")];
        let windows = BehaviorWindows::from_transactions(&txns);
        assert_eq!(windows.late_night.count, 0);
        assert_eq!(windows.weekend.count, 1);
        assert_eq!(windows.post_payday.count, 1);
    }
}
