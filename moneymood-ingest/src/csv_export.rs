//! Write transactions back out as `date,amount,category,description` CSV.
//!
//! Output is standard CSV: fields are quoted when needed and embedded `"` is doubled, which
//! spreadsheet tools read fine. The importer is not a full CSV reader, so two kinds of
//! description do not survive a re-import here: one containing a comma (bare-comma
//! splitting) and one containing `"` (only the surrounding quotes are trimmed, so
//! `He said "hi"` comes back as `He said ""hi`).

use anyhow::{Context, Result};
use moneymood_core::{AnalysisRecord, Transaction};
use std::fs::File;
use std::io::Write;
use std::path::Path;

const HEADER: [&str; 4] = ["date", "amount", "category", "description"];

pub fn write_transactions_csv<W: Write>(writer: W, txns: &[Transaction]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(HEADER)?;
    for txn in txns {
        wtr.serialize(AnalysisRecord::from(txn))
            .with_context(|| format!("writing transaction {}", txn.id))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn export_transactions_file(path: impl AsRef<Path>, txns: &[Transaction]) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write_transactions_csv(file, txns).with_context(|| format!("writing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv_import::read_transactions_file;
    use moneymood_core::{Category, mock_transactions};

    #[test]
    fn test_writes_header_and_rows() {
        let txns = vec![Transaction::with_id(
            "1",
            "2024-05-02T12:30:00",
            15.5,
            Category::FoodDining,
            "Lunch",
        )];
        let mut out = Vec::new();
        write_transactions_csv(&mut out, &txns).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "date,amount,category,description\n2024-05-02T12:30:00,15.5,Food & Dining,Lunch\n"
        );
    }

    #[test]
    fn test_empty_export_still_has_header() {
        let mut out = Vec::new();
        write_transactions_csv(&mut out, &[]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "date,amount,category,description\n");
    }

    #[test]
    fn test_export_reimports() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.csv");
        let seeded = mock_transactions();
        export_transactions_file(&path, &seeded).unwrap();

        let back = read_transactions_file(&path).unwrap();
        assert_eq!(back.len(), seeded.len());
        for (a, b) in seeded.iter().zip(&back) {
            assert_eq!(a.date, b.date);
            assert_eq!(a.amount, b.amount);
            assert_eq!(a.category, b.category);
            assert_eq!(a.description, b.description);
            assert_ne!(a.id, b.id);
        }
    }

    #[test]
    fn test_embedded_quotes_are_standard_csv() {
        let txns = vec![Transaction::with_id(
            "1",
            "2024-05-03T19:00:00",
            220.0,
            Category::Entertainment,
            "He said \"hi\", then left",
        )];
        let mut out = Vec::new();
        write_transactions_csv(&mut out, &txns).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with(",\"He said \"\"hi\"\", then left\"\n"));

        let mut rdr = csv::Reader::from_reader(text.as_bytes());
        let row = rdr.records().next().unwrap().unwrap();
        assert_eq!(&row[3], "He said \"hi\", then left");
    }

    #[test]
    fn test_embedded_quotes_do_not_survive_reimport() {
        let txns = vec![Transaction::with_id(
            "1",
            "2024-05-03T19:00:00",
            220.0,
            Category::Entertainment,
            "He said \"hi\"",
        )];
        let mut out = Vec::new();
        write_transactions_csv(&mut out, &txns).unwrap();
        let back = crate::parse_transactions_csv(&String::from_utf8(out).unwrap());
        assert_eq!(back[0].description, "He said \"\"hi");
    }
}
