//! Behavioral analysis: the result model and the capability that produces it.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::finance::{Category, Transaction};

/// Turns a transaction list into a behavioral profile, or an error.
///
/// Implementations own their transport; callers only see the result or one error.
#[async_trait]
pub trait SpendingAnalyzer: Send + Sync {
    async fn analyze(&self, transactions: &[Transaction]) -> Result<AnalysisResult>;
}

/// The fields of a transaction that are sent out for analysis.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRecord<'a> {
    pub date: &'a str,
    pub amount: f64,
    pub category: &'a Category,
    pub description: &'a str,
}

impl<'a> From<&'a Transaction> for AnalysisRecord<'a> {
    fn from(t: &'a Transaction) -> Self {
        Self {
            date: &t.date,
            amount: t.amount,
            category: &t.category,
            description: &t.description,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub profile: BehavioralProfile,
    pub insights: Vec<MoodInsight>,
    /// Several paragraphs separated by blank lines
    pub psychological_profile: String,
}

impl AnalysisResult {
    /// Parse and validate a model or proxy payload. Nothing partial is accepted.
    pub fn from_json(text: &str) -> Result<Self> {
        let result: AnalysisResult =
            serde_json::from_str(text.trim()).context("malformed analysis payload")?;
        result.validate()?;
        Ok(result)
    }

    pub fn validate(&self) -> Result<()> {
        let score = self.profile.score;
        if !score.is_finite() || !(0.0..=100.0).contains(&score) {
            bail!("profile score {score} is outside 0-100");
        }
        Ok(())
    }

    /// Narrative paragraphs, blank-line separated in the payload.
    pub fn paragraphs(&self) -> Vec<&str> {
        self.psychological_profile
            .split("\n\n")
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect()
    }

    /// Tag of the leading insight ("priority deviation"), defaulting to Impulse.
    pub fn priority_tag(&self) -> InsightTag {
        self.insights.first().map(|i| i.tag).unwrap_or(InsightTag::Impulse)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehavioralProfile {
    /// 0-100, higher is more disciplined
    pub score: f64,
    pub primary_trait: String,
    pub risk_level: RiskLevel,
    pub summary: String,
}

impl BehavioralProfile {
    /// Scores above 70 read as stable spending.
    pub fn is_stable(&self) -> bool {
        self.score > 70.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(alias = "low", alias = "LOW")]
    Low,
    #[serde(alias = "moderate", alias = "MODERATE")]
    Moderate,
    #[serde(alias = "high", alias = "HIGH")]
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RiskLevel::Low => "Low",
            RiskLevel::Moderate => "Moderate",
            RiskLevel::High => "High",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodInsight {
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub tag: InsightTag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[serde(alias = "Low")]
    Low,
    #[serde(alias = "Medium")]
    Medium,
    #[serde(alias = "High")]
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InsightTag {
    Impulse,
    #[serde(rename = "Post-Payday")]
    PostPayday,
    Weekend,
    #[serde(rename = "Late-Night")]
    LateNight,
    Subscription,
    General,
}

impl InsightTag {
    pub const ALL: [InsightTag; 6] = [
        InsightTag::Impulse,
        InsightTag::PostPayday,
        InsightTag::Weekend,
        InsightTag::LateNight,
        InsightTag::Subscription,
        InsightTag::General,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            InsightTag::Impulse => "Impulse",
            InsightTag::PostPayday => "Post-Payday",
            InsightTag::Weekend => "Weekend",
            InsightTag::LateNight => "Late-Night",
            InsightTag::Subscription => "Subscription",
            InsightTag::General => "General",
        }
    }
}

impl fmt::Display for InsightTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
