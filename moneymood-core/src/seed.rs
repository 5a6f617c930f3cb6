//! Demo transactions loaded at startup.

use crate::finance::{Category, Transaction};

/// The fixed May 2024 sample set.
pub fn mock_transactions() -> Vec<Transaction> {
    vec![
        Transaction::with_id("1", "2024-05-01T23:45:00", 85.20, Category::Shopping, "Amazon Late Night Order"),
        Transaction::with_id("2", "2024-05-02T12:30:00", 15.50, Category::FoodDining, "Lunch"),
        Transaction::with_id("3", "2024-05-05T01:15:00", 45.00, Category::Entertainment, "Bar/Club"),
        Transaction::with_id("4", "2024-05-15T09:00:00", 1200.00, Category::BillsUtilities, "Rent"),
        Transaction::with_id("5", "2024-05-25T18:00:00", 150.00, Category::Shopping, "Weekend Splurge"),
        Transaction::with_id("6", "2024-05-26T22:30:00", 12.99, Category::Subscriptions, "Netflix"),
        Transaction::with_id("7", "2024-05-30T10:00:00", 300.00, Category::Shopping, "Payday Reward"),
    ]
}
