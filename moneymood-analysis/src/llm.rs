use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use moneymood_core::{AnalysisRecord, AnalysisResult, SpendingAnalyzer, Transaction};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::prompt::{build_prompt, extract_json, json_only_system_prompt, response_schema};
use crate::provider::Provider;

/// Variable checked when the provider-specific one is unset.
const FALLBACK_KEY_ENV: &str = "API_KEY";

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub provider: Provider,
    pub model: String,
    pub base_url: String,
    /// Name of the variable the key came from, for error messages
    pub api_key_env: String,
    pub api_key: Option<String>,
    pub temperature: f32,
    pub timeout: Duration,
}

impl LlmConfig {
    /// Defaults for `provider`, with the key looked up in the environment.
    pub fn for_provider(provider: Provider) -> Self {
        let api_key_env = provider.default_api_key_env().to_string();
        Self {
            provider,
            model: provider.default_model().to_string(),
            base_url: provider.default_base_url().to_string(),
            api_key: resolve_api_key(&api_key_env),
            api_key_env,
            temperature: 0.4,
            timeout: Duration::from_secs(60),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn require_key(&self) -> Result<&str> {
        let name = if self.api_key_env.is_empty() {
            FALLBACK_KEY_ENV
        } else {
            self.api_key_env.as_str()
        };
        self.api_key.as_deref().ok_or_else(|| {
            anyhow!("API_KEY is missing. Please ensure the environment variable {name} is set.")
        })
    }
}

/// Read a key from `env_name`, falling back to `API_KEY`. Blank values count as unset.
pub fn resolve_api_key(env_name: &str) -> Option<String> {
    resolve_api_key_with(env_name, |name| std::env::var(name).ok())
}

fn resolve_api_key_with(env_name: &str, lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    [env_name, FALLBACK_KEY_ENV]
        .into_iter()
        .filter(|name| !name.is_empty())
        .find_map(|name| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        })
}

/// `SpendingAnalyzer` backed by a hosted model or an analysis proxy.
pub struct LlmAnalyzer {
    config: LlmConfig,
    client: reqwest::Client,
}

impl LlmAnalyzer {
    pub fn new(config: LlmConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("build http client")?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        match self.config.provider {
            Provider::Gemini => self.gemini_complete(prompt).await,
            Provider::OpenAI => self.openai_complete(prompt).await,
            Provider::Anthropic => self.anthropic_complete(prompt).await,
            Provider::Proxy => bail!("the proxy provider does not take a prompt"),
        }
    }

    async fn gemini_complete(&self, prompt: &str) -> Result<String> {
        let key = self.config.require_key()?;

        #[derive(Serialize)]
        struct Part<'a> {
            text: &'a str,
        }

        #[derive(Serialize)]
        struct Content<'a> {
            role: &'a str,
            parts: Vec<Part<'a>>,
        }

        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct GenerationConfig {
            response_mime_type: &'static str,
            response_schema: Value,
            temperature: f32,
        }

        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Req<'a> {
            contents: Vec<Content<'a>>,
            generation_config: GenerationConfig,
        }

        #[derive(Deserialize)]
        struct Resp {
            #[serde(default)]
            candidates: Vec<Candidate>,
        }

        #[derive(Deserialize)]
        struct Candidate {
            content: Option<CandidateContent>,
        }

        #[derive(Deserialize)]
        struct CandidateContent {
            #[serde(default)]
            parts: Vec<PartOut>,
        }

        #[derive(Deserialize)]
        struct PartOut {
            text: Option<String>,
        }

        let body = Req {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: response_schema(),
                temperature: self.config.temperature,
            },
        };

        let model = self.config.provider.normalize_model(&self.config.model);
        let url = self.config.endpoint(&format!("/v1beta/models/{model}:generateContent"));
        debug!(%url, "sending gemini request");

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", key)
            .json(&body)
            .send()
            .await
            .context("gemini request")?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            bail!("gemini error: {status} {txt}");
        }

        let out: Resp = resp.json().await.context("parse gemini response")?;
        let text: String = out
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();
        Ok(text)
    }

    async fn openai_complete(&self, prompt: &str) -> Result<String> {
        let key = self.config.require_key()?;

        #[derive(Serialize)]
        struct Msg {
            role: &'static str,
            content: String,
        }

        #[derive(Serialize)]
        struct ResponseFormat {
            #[serde(rename = "type")]
            t: &'static str,
        }

        #[derive(Serialize)]
        struct Req {
            model: String,
            messages: Vec<Msg>,
            temperature: f32,
            response_format: ResponseFormat,
        }

        #[derive(Deserialize)]
        struct Resp {
            choices: Vec<Choice>,
        }

        #[derive(Deserialize)]
        struct Choice {
            message: MsgOut,
        }

        #[derive(Deserialize)]
        struct MsgOut {
            content: Option<String>,
        }

        let body = Req {
            model: self.config.model.clone(),
            messages: vec![
                Msg {
                    role: "system",
                    content: json_only_system_prompt(),
                },
                Msg {
                    role: "user",
                    content: prompt.to_string(),
                },
            ],
            temperature: self.config.temperature,
            response_format: ResponseFormat { t: "json_object" },
        };

        let url = self.config.endpoint("/v1/chat/completions");
        debug!(%url, "sending openai request");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(key)
            .json(&body)
            .send()
            .await
            .context("openai request")?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            bail!("openai error: {status} {txt}");
        }

        let out: Resp = resp.json().await.context("parse openai response")?;
        Ok(out
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }

    async fn anthropic_complete(&self, prompt: &str) -> Result<String> {
        let key = self.config.require_key()?;

        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }

        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            max_tokens: i32,
            temperature: f32,
            system: String,
            messages: Vec<Msg<'a>>,
        }

        #[derive(Deserialize)]
        struct Resp {
            content: Vec<ContentBlock>,
        }

        #[derive(Deserialize)]
        struct ContentBlock {
            #[serde(rename = "type")]
            t: String,
            text: Option<String>,
        }

        let body = Req {
            model: &self.config.model,
            max_tokens: 4096,
            temperature: self.config.temperature,
            system: json_only_system_prompt(),
            messages: vec![Msg {
                role: "user",
                content: prompt,
            }],
        };

        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_str(key).context("api key header")?);
        headers.insert("anthropic-version", HeaderValue::from_static("2023-06-01"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let url = self.config.endpoint("/v1/messages");
        debug!(%url, "sending anthropic request");

        let resp = self
            .client
            .post(&url)
            .headers(headers)
            .json(&body)
            .send()
            .await
            .context("anthropic request")?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            bail!("anthropic error: {status} {txt}");
        }

        let out: Resp = resp.json().await.context("parse anthropic response")?;
        let mut s = String::new();
        for b in out.content {
            if b.t == "text" {
                if let Some(t) = b.text {
                    s.push_str(&t);
                }
            }
        }
        Ok(s)
    }

    /// Hand the transactions to an analysis server, which returns the result JSON or
    /// `{"error": "..."}`.
    async fn proxy_analyze(&self, transactions: &[Transaction]) -> Result<AnalysisResult> {
        #[derive(Serialize)]
        struct Req<'a> {
            transactions: Vec<AnalysisRecord<'a>>,
        }

        #[derive(Deserialize)]
        struct ErrorBody {
            error: String,
        }

        let body = Req {
            transactions: transactions.iter().map(AnalysisRecord::from).collect(),
        };

        let url = self.config.endpoint("/api/analyze");
        debug!(%url, count = transactions.len(), "sending proxy request");

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("analysis proxy request")?;

        let status = resp.status();
        let txt = resp.text().await.context("read analysis proxy response")?;
        if !status.is_success() {
            let detail = serde_json::from_str::<ErrorBody>(&txt)
                .map(|e| e.error)
                .unwrap_or(txt);
            bail!("analysis proxy error: {status} {detail}");
        }
        if txt.trim().is_empty() {
            bail!("Empty response from analysis proxy");
        }
        AnalysisResult::from_json(&txt)
    }
}

#[async_trait]
impl SpendingAnalyzer for LlmAnalyzer {
    async fn analyze(&self, transactions: &[Transaction]) -> Result<AnalysisResult> {
        if self.config.provider == Provider::Proxy {
            return self.proxy_analyze(transactions).await;
        }

        let prompt = build_prompt(transactions);
        let text = self.complete(&prompt).await?;
        if text.trim().is_empty() {
            bail!("Empty response from AI model");
        }
        AnalysisResult::from_json(extract_json(&text))
    }
}
