//! Plain-text views for the terminal. Everything returns a `String` so the
//! commands stay thin and the layouts can be tested.

use moneymood_core::{
    AnalysisResult, BehaviorWindows, CategoryTotal, DailyTotal, Dashboard, SpendingSummary,
    Transaction, WindowTotal, format_currency,
};
use std::fmt::Write;

const BAR_WIDTH: usize = 28;
const ITEM_WIDTH: usize = 30;

pub fn kpi_cards(summary: &SpendingSummary, analysis: Option<&AnalysisResult>) -> String {
    let score = analysis
        .map(|a| format!("{:.0}/100", a.profile.score))
        .unwrap_or_else(|| "--".to_string());
    let trait_name = analysis
        .map(|a| a.profile.primary_trait.clone())
        .unwrap_or_else(|| "Pending...".to_string());
    let risk = analysis
        .map(|a| a.profile.risk_level.to_string())
        .unwrap_or_else(|| "Healthy".to_string());
    let stability = match analysis {
        Some(a) if a.profile.is_stable() => " (stable)",
        Some(_) => " (volatile)",
        None => "",
    };

    let mut out = String::new();
    let _ = writeln!(out, "{:<18}{}", "Aggregate Outlay", format_currency(summary.total));
    let _ = writeln!(out, "{:<18}{score}{stability}", "Stability Score");
    let _ = writeln!(out, "{:<18}{trait_name}", "Dominant Trait");
    let _ = writeln!(out, "{:<18}{risk}", "Risk Tier");
    let _ = writeln!(
        out,
        "{:<18}{} entries, avg {}, largest {}",
        "Activity",
        summary.count,
        format_currency(summary.average),
        summary.largest.map(format_currency).unwrap_or_else(|| "--".to_string()),
    );
    if let Some(top) = &summary.dominant_category {
        let _ = writeln!(out, "{:<18}{} ({})", "Top Category", top.category, format_currency(top.amount));
    }
    out
}

/// Category totals, largest first, with each one's share of the whole.
pub fn allocation_map(totals: &[CategoryTotal]) -> String {
    let mut sorted = totals.to_vec();
    // stable sort keeps first-occurrence order among equal amounts
    sorted.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    let sum: f64 = sorted.iter().map(|c| c.amount).sum();
    let max = sorted.first().map(|c| c.amount).unwrap_or(0.0);

    let mut out = String::from("Allocation Map\n");
    if sorted.is_empty() {
        out.push_str("  (no spending yet)\n");
        return out;
    }
    for c in &sorted {
        let share = if sum > 0.0 { c.amount / sum * 100.0 } else { 0.0 };
        let _ = writeln!(
            out,
            "  {:<18} {:>10} {:>5.1}%  {}",
            c.category,
            format_currency(c.amount),
            share,
            bar(c.amount, max)
        );
    }
    out
}

pub fn outlay_momentum(days: &[DailyTotal]) -> String {
    let max = days.iter().map(|d| d.amount).fold(0.0, f64::max);
    let mut out = String::from("Outlay Momentum\n");
    if days.is_empty() {
        out.push_str("  (no spending yet)\n");
        return out;
    }
    for d in days {
        let _ = writeln!(
            out,
            "  {:<12} {:>10}  {}",
            d.day.to_string(),
            format_currency(d.amount),
            bar(d.amount, max)
        );
    }
    out
}

pub fn behavior_windows(windows: &BehaviorWindows) -> String {
    let row = |label: &str, w: &WindowTotal| {
        format!("  {label:<18} {:>3} x {:>10}\n", w.count, format_currency(w.amount))
    };
    let mut out = String::from("Behavior Windows\n");
    out.push_str(&row("Late night", &windows.late_night));
    out.push_str(&row("Weekend", &windows.weekend));
    out.push_str(&row("Post-payday", &windows.post_payday));
    out
}

/// The full dashboard view.
pub fn summary(dash: &Dashboard) -> String {
    [
        kpi_cards(&dash.summary(), dash.analysis()),
        allocation_map(&dash.category_totals()),
        outlay_momentum(&dash.daily_totals()),
        behavior_windows(&dash.behavior_windows()),
    ]
    .join("\n")
}

pub fn ledger(txns: &[Transaction]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<8} {:<w$} {:<18} {:>10}",
        "Timeline",
        "Item",
        "Category",
        "Magnitude",
        w = ITEM_WIDTH
    );
    for t in txns {
        let _ = writeln!(
            out,
            "{:<8} {:<w$} {:<18} {:>10}",
            t.display_date(),
            truncate(&t.description, ITEM_WIDTH),
            t.category.label(),
            format_currency(t.amount),
            w = ITEM_WIDTH
        );
    }
    out
}

pub fn analysis(result: &AnalysisResult) -> String {
    let profile = &result.profile;
    let mut out = String::from("Neural Interpretation\n");
    for p in result.paragraphs() {
        let _ = writeln!(out, "  {p}\n");
    }

    out.push_str("Behavioral Anomalies\n");
    if result.insights.is_empty() {
        out.push_str("  (none detected)\n");
    }
    for i in &result.insights {
        let _ = writeln!(out, "  [{}] {} ({})", i.tag.label(), i.title, i.severity);
        let _ = writeln!(out, "      {}", i.description);
    }

    let _ = writeln!(out, "\nSummary\n  {}", profile.summary);
    let _ = writeln!(out, "Priority Deviation\n  {}", result.priority_tag().label());
    let _ = writeln!(
        out,
        "Strategic Correction\n  Your \"{}\" pattern indicates susceptibility to \
         environment-driven spending. Implementing a 48-hour cooling period for UPI \
         transactions over \u{20b9}1,000 is recommended.",
        profile.primary_trait
    );
    out
}

fn bar(value: f64, max: f64) -> String {
    if max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    let len = ((value / max) * BAR_WIDTH as f64).round().max(1.0) as usize;
    "\u{2588}".repeat(len)
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let mut cut: String = s.chars().take(width - 1).collect();
    cut.push('\u{2026}');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use moneymood_core::{
        BehavioralProfile, Category, InsightTag, MoodInsight, RiskLevel, Severity,
        mock_transactions,
    };

    fn result(score: f64) -> AnalysisResult {
        AnalysisResult {
            profile: BehavioralProfile {
                score,
                primary_trait: "Night Owl".to_string(),
                risk_level: RiskLevel::Moderate,
                summary: "Late orders add up.".to_string(),
            },
            insights: vec![MoodInsight {
                title: "After-hours carts".to_string(),
                description: "Two purchases after 11PM.".to_string(),
                severity: Severity::Medium,
                tag: InsightTag::LateNight,
            }],
            psychological_profile: "First thought.\n\nSecond thought.".to_string(),
        }
    }

    #[test]
    fn test_kpis_before_analysis() {
        let dash = Dashboard::with_mock_data();
        let out = kpi_cards(&dash.summary(), None);
        assert!(out.contains("Aggregate Outlay  \u{20b9}1,809"));
        assert!(out.contains("Stability Score   --"));
        assert!(out.contains("Pending..."));
        assert!(out.contains("Healthy"));
        assert!(out.contains("Top Category      Bills & Utilities"));
    }

    #[test]
    fn test_kpis_after_analysis() {
        let dash = Dashboard::with_mock_data();
        let r = result(82.4);
        let out = kpi_cards(&dash.summary(), Some(&r));
        assert!(out.contains("82/100 (stable)"));
        assert!(out.contains("Night Owl"));
        assert!(out.contains("Moderate"));
    }

    #[test]
    fn test_allocation_sorted_by_amount() {
        let totals = vec![
            CategoryTotal { category: "Food & Dining".to_string(), amount: 150.0 },
            CategoryTotal { category: "Shopping".to_string(), amount: 30.0 },
            CategoryTotal { category: "Health".to_string(), amount: 300.0 },
        ];
        let out = allocation_map(&totals);
        let health = out.find("Health").unwrap();
        let food = out.find("Food & Dining").unwrap();
        let shopping = out.find("Shopping").unwrap();
        assert!(health < food && food < shopping);
        assert!(out.contains("62.5%"));
    }

    #[test]
    fn test_empty_views() {
        assert!(allocation_map(&[]).contains("(no spending yet)"));
        assert!(outlay_momentum(&[]).contains("(no spending yet)"));
    }

    #[test]
    fn test_momentum_in_date_order() {
        let dash = Dashboard::with_mock_data();
        let out = outlay_momentum(&dash.daily_totals());
        let first = out.find("2024-05-01").unwrap();
        let last = out.find("2024-05-15").unwrap();
        assert!(first < last);
    }

    #[test]
    fn test_ledger_rows() {
        let txns = vec![Transaction::with_id(
            "x",
            "2024-05-02T12:30:00",
            1234.0,
            Category::Shopping,
            "A very long description that will not fit in the column",
        )];
        let out = ledger(&txns);
        let mut lines = out.lines();
        assert!(lines.next().unwrap().starts_with("Timeline"));
        let row = lines.next().unwrap();
        assert!(row.starts_with("May 2"));
        assert!(row.contains('\u{2026}'));
        assert!(row.ends_with("\u{20b9}1,234"));
    }

    #[test]
    fn test_analysis_sections() {
        let out = analysis(&result(40.0));
        assert!(out.contains("  First thought.\n"));
        assert!(out.contains("  Second thought.\n"));
        assert!(out.contains("[Late-Night] After-hours carts (medium)"));
        assert!(out.contains("Priority Deviation\n  Late-Night"));
        assert!(out.contains("Your \"Night Owl\" pattern"));
        assert!(out.contains("\u{20b9}1,000 is recommended."));
    }

    #[test]
    fn test_summary_has_every_panel() {
        let mut dash = Dashboard::new(mock_transactions());
        dash.add_transaction(Transaction::new("2024-05-20T10:00:00", 10.0, Category::Health, "Pharmacy"));
        let out = summary(&dash);
        for heading in ["Aggregate Outlay", "Allocation Map", "Outlay Momentum", "Behavior Windows"] {
            assert!(out.contains(heading), "missing {heading}");
        }
    }
}
