//! moneymood-ingest: delimited-text ingestion into transactions, and CSV export.

pub mod csv_export;
pub mod csv_import;

pub use csv_export::{export_transactions_file, write_transactions_csv};
pub use csv_import::{parse_transactions_csv, parse_transactions_csv_at, read_transactions_file};
