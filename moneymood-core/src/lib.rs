//! moneymood-core: transaction model, derived views, analysis model and dashboard state

pub mod aggregate;
pub mod analysis;
pub mod dashboard;
pub mod finance;
pub mod format;
pub mod seed;
pub mod time;

pub use aggregate::{
    BehaviorWindows, CategoryTotal, DailyTotal, SpendingSummary, WindowTotal, category_totals,
    daily_totals, total_spent,
};
pub use analysis::{
    AnalysisRecord, AnalysisResult, BehavioralProfile, InsightTag, MoodInsight, RiskLevel,
    Severity, SpendingAnalyzer,
};
pub use dashboard::{Dashboard, View};
pub use finance::{Category, Transaction, TransactionEntry, new_id};
pub use format::format_currency;
pub use seed::mock_transactions;
pub use time::{DayKey, day_key, has_clock_time, parse_timestamp, timestamp_now};
