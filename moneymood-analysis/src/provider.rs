use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Gemini,
    OpenAI,
    Anthropic,
    /// A server that holds the key and exposes `POST /api/analyze`
    Proxy,
}

impl Provider {
    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini-3-flash-preview",
            Provider::OpenAI => "gpt-4o-mini",
            Provider::Anthropic => "claude-3-5-sonnet-latest",
            Provider::Proxy => "",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::Gemini => "https://generativelanguage.googleapis.com",
            Provider::OpenAI => "https://api.openai.com",
            Provider::Anthropic => "https://api.anthropic.com",
            Provider::Proxy => "http://localhost:3000",
        }
    }

    /// Environment variable holding the key. Empty for the proxy, which needs none.
    pub fn default_api_key_env(&self) -> &'static str {
        match self {
            Provider::Gemini => "GEMINI_API_KEY",
            Provider::OpenAI => "OPENAI_API_KEY",
            Provider::Anthropic => "ANTHROPIC_API_KEY",
            Provider::Proxy => "",
        }
    }

    pub fn needs_api_key(&self) -> bool {
        !matches!(self, Provider::Proxy)
    }

    /// Normalize model names.
    /// - Accept Gemini's `models/<name>` resource form and return `<name>`.
    pub fn normalize_model(&self, model: &str) -> String {
        match self {
            Provider::Gemini => model.strip_prefix("models/").unwrap_or(model).to_string(),
            _ => model.to_string(),
        }
    }
}

impl FromStr for Provider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" => Ok(Provider::Gemini),
            "openai" => Ok(Provider::OpenAI),
            "anthropic" | "claude" => Ok(Provider::Anthropic),
            "proxy" => Ok(Provider::Proxy),
            other => bail!("unknown analysis provider '{other}' (expected gemini, openai, anthropic or proxy)"),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Provider::Gemini => "gemini",
            Provider::OpenAI => "openai",
            Provider::Anthropic => "anthropic",
            Provider::Proxy => "proxy",
        })
    }
}
