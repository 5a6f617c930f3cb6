//! moneymood-analysis: behavioral analysis over HTTP (Gemini, OpenAI, Anthropic, or a proxy)

pub mod llm;
pub mod prompt;
pub mod provider;

pub use llm::{LlmAnalyzer, LlmConfig, resolve_api_key};
pub use prompt::{build_prompt, extract_json, response_schema};
pub use provider::Provider;
