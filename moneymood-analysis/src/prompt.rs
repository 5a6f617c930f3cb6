//! Prompt text and the structured-output schema sent to the model.

use moneymood_core::{InsightTag, Transaction};
use regex::Regex;
use serde_json::{Value, json};
use std::sync::LazyLock;

const INSTRUCTIONS: &str = "\
Analyze these personal spending transactions (amounts are in Indian Rupees - INR) and provide psychological insights.
Focus on behavior patterns common in urban India:
1. Impulse spending (quick UPI transfers, small irregular shopping)
2. Post-payday splurges (big purchases right after the 1st of the month)
3. Weekend overspending (heavy food delivery or dining on Sat/Sun)
4. Late-night purchases (spending between 11PM and 5AM on apps)
5. Subscription fatigue (small recurring monthly charges)";

/// The user prompt: instructions, then one `date | ₹amount | category | description` line
/// per transaction.
pub fn build_prompt(transactions: &[Transaction]) -> String {
    let lines: Vec<String> = transactions
        .iter()
        .map(|t| format!("{} | \u{20b9}{} | {} | {}", t.date, t.amount, t.category, t.description))
        .collect();
    format!("{INSTRUCTIONS}\n\nTransactions:\n{}\n", lines.join("\n"))
}

/// Response schema in the OpenAPI subset Gemini accepts for structured output.
pub fn response_schema() -> Value {
    let tags: Vec<&str> = InsightTag::ALL.iter().map(|t| t.label()).collect();
    json!({
        "type": "OBJECT",
        "properties": {
            "profile": {
                "type": "OBJECT",
                "properties": {
                    "score": { "type": "NUMBER", "description": "Discipline score 0-100" },
                    "primaryTrait": { "type": "STRING" },
                    "riskLevel": { "type": "STRING", "format": "enum", "enum": ["Low", "Moderate", "High"] },
                    "summary": { "type": "STRING" }
                },
                "required": ["score", "primaryTrait", "riskLevel", "summary"]
            },
            "insights": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "title": { "type": "STRING" },
                        "description": { "type": "STRING" },
                        "severity": { "type": "STRING", "format": "enum", "enum": ["low", "medium", "high"] },
                        "tag": { "type": "STRING", "format": "enum", "enum": tags }
                    },
                    "required": ["title", "description", "severity", "tag"]
                }
            },
            "psychologicalProfile": {
                "type": "STRING",
                "description": "A few paragraphs explaining the psychology behind the user behavior in a modern Indian context."
            }
        },
        "required": ["profile", "insights", "psychologicalProfile"]
    })
}

/// System prompt for providers without native schema support.
pub fn json_only_system_prompt() -> String {
    let schema = serde_json::to_string_pretty(&response_schema()).unwrap_or_default();
    format!(
        "You are a behavioral finance analyst. Respond with a single JSON object and nothing else. \
It must match this schema (OBJECT/ARRAY/STRING/NUMBER are JSON types):\n{schema}"
    )
}

static FENCED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*(\{.*\})\s*```").expect("static regex")
});

/// Pull the JSON object out of model text that may be wrapped in a markdown fence or
/// surrounded by chatter.
pub fn extract_json(text: &str) -> &str {
    if let Some(m) = FENCED.captures(text).and_then(|c| c.get(1)) {
        return m.as_str();
    }
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text.trim(),
    }
}
