//! Application state for the dashboard: the transaction collection, the active view and
//! the latest analysis.
//!
//! The collection is only ever replaced whole. Manual entries go to the front, imports to
//! the back, and nothing is removed.

use anyhow::{Result, anyhow, bail};
use tracing::{debug, info, warn};

use crate::aggregate::{
    BehaviorWindows, CategoryTotal, DailyTotal, SpendingSummary, category_totals, daily_totals,
};
use crate::analysis::{AnalysisResult, SpendingAnalyzer};
use crate::finance::Transaction;
use crate::seed::mock_transactions;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    Dashboard,
    Transactions,
}

#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    transactions: Vec<Transaction>,
    analysis: Option<AnalysisResult>,
    analyzing: bool,
    view: View,
}

impl Dashboard {
    pub fn new(transactions: Vec<Transaction>) -> Self {
        Self {
            transactions,
            ..Self::default()
        }
    }

    /// Dashboard seeded with the demo transactions.
    pub fn with_mock_data() -> Self {
        Self::new(mock_transactions())
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn analysis(&self) -> Option<&AnalysisResult> {
        self.analysis.as_ref()
    }

    pub fn is_analyzing(&self) -> bool {
        self.analyzing
    }

    pub fn active_view(&self) -> View {
        self.view
    }

    pub fn set_view(&mut self, view: View) {
        self.view = view;
    }

    /// Add a manual entry at the front of the collection.
    pub fn add_transaction(&mut self, txn: Transaction) {
        debug!(id = %txn.id, "adding manual transaction");
        let mut next = Vec::with_capacity(self.transactions.len() + 1);
        next.push(txn);
        next.extend(self.transactions.iter().cloned());
        self.transactions = next;
    }

    /// Append parsed records. An empty batch means the import failed.
    pub fn import(&mut self, parsed: Vec<Transaction>) -> Result<usize> {
        if parsed.is_empty() {
            warn!("import produced no transactions");
            bail!("Could not parse CSV. Please check formatting.");
        }
        let added = parsed.len();
        let mut next = self.transactions.clone();
        next.extend(parsed);
        self.transactions = next;
        info!(added, total = self.transactions.len(), "imported transactions");
        Ok(added)
    }

    pub fn category_totals(&self) -> Vec<CategoryTotal> {
        category_totals(&self.transactions)
    }

    pub fn daily_totals(&self) -> Vec<DailyTotal> {
        daily_totals(&self.transactions)
    }

    pub fn summary(&self) -> SpendingSummary {
        SpendingSummary::from_transactions(&self.transactions)
    }

    pub fn behavior_windows(&self) -> BehaviorWindows {
        BehaviorWindows::from_transactions(&self.transactions)
    }

    /// Whether the analyze control should be enabled.
    pub fn can_analyze(&self) -> bool {
        !self.analyzing && !self.transactions.is_empty()
    }

    /// Run one analysis over a snapshot of the collection.
    ///
    /// On failure the collection and any earlier result are left as they were, and the
    /// single returned error carries the message to show the user.
    pub async fn run_analysis(&mut self, analyzer: &dyn SpendingAnalyzer) -> Result<&AnalysisResult> {
        if self.analyzing {
            bail!("an analysis is already in progress");
        }
        if self.transactions.is_empty() {
            bail!("no transactions to analyze");
        }

        let snapshot = self.transactions.clone();
        debug!(count = snapshot.len(), "starting analysis");
        let outcome = {
            let _in_flight = InFlight::start(&mut self.analyzing);
            analyzer.analyze(&snapshot).await
        };

        match outcome {
            Ok(result) => {
                info!(score = result.profile.score, "analysis complete");
                Ok(&*self.analysis.insert(result))
            }
            Err(e) => {
                warn!("analysis failed: {e:#}");
                Err(anyhow!("AI Analysis failed: {e:#}"))
            }
        }
    }
}

/// Holds the in-progress flag for one analysis. Clears it when dropped, including when the
/// analysis future itself is dropped mid-request.
struct InFlight<'a>(&'a mut bool);

impl<'a> InFlight<'a> {
    fn start(flag: &'a mut bool) -> Self {
        *flag = true;
        Self(flag)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}
