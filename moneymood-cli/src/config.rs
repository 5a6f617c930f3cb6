use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use moneymood_analysis::{LlmConfig, Provider, resolve_api_key};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub analysis: AnalysisSection,
    pub data: DataSection,
}

/// Blank or missing `model`, `base_url` and `api_key_env` resolve to the provider's
/// defaults, so switching provider only takes one line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSection {
    /// gemini | openai | anthropic | proxy
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub base_url: String,
    /// Environment variable holding the key; `API_KEY` is tried after it
    #[serde(default)]
    pub api_key_env: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_provider() -> String {
    Provider::Gemini.to_string()
}

fn default_temperature() -> f32 {
    0.4
}

fn default_timeout_secs() -> u64 {
    60
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSection {
    /// Start each session from the demo transactions
    pub seed_mock: bool,
    /// IANA zone used for "today" on manual entries
    pub timezone: String,
}

impl Default for AnalysisSection {
    fn default() -> Self {
        let provider = Provider::Gemini;
        Self {
            provider: provider.to_string(),
            model: provider.default_model().to_string(),
            base_url: provider.default_base_url().to_string(),
            api_key_env: provider.default_api_key_env().to_string(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for DataSection {
    fn default() -> Self {
        Self {
            seed_mock: true,
            timezone: "Asia/Kolkata".to_string(),
        }
    }
}

impl AnalysisSection {
    pub fn provider(&self) -> Result<Provider> {
        self.provider.parse()
    }

    /// Resolve into a transport config, filling blanks with provider defaults and reading
    /// the key from the environment.
    pub fn to_llm_config(&self) -> Result<LlmConfig> {
        let provider = self.provider()?;
        let or_default = |value: &str, default: &str| {
            if value.trim().is_empty() {
                default.to_string()
            } else {
                value.trim().to_string()
            }
        };
        let api_key_env = or_default(&self.api_key_env, provider.default_api_key_env());
        Ok(LlmConfig {
            provider,
            model: or_default(&self.model, provider.default_model()),
            base_url: or_default(&self.base_url, provider.default_base_url()),
            api_key: resolve_api_key(&api_key_env),
            api_key_env,
            temperature: self.temperature,
            timeout: Duration::from_secs(self.timeout_secs.max(1)),
        })
    }
}

impl DataSection {
    pub fn timezone(&self) -> Result<Tz> {
        self.timezone
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid timezone: {}", self.timezone))
    }

    pub fn today(&self) -> Result<NaiveDate> {
        Ok(Utc::now().with_timezone(&self.timezone()?).date_naive())
    }
}

/// `$MONEYMOOD_HOME`, or `~/.moneymood`.
pub fn moneymood_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("MONEYMOOD_HOME") {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".moneymood"))
}

pub fn config_path() -> Result<PathBuf> {
    Ok(moneymood_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", path.display()))
}

pub fn save_config_to(path: &Path, cfg: &Config) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Write the default config unless one already exists. Returns the path and whether it
/// was written.
pub fn init_config() -> Result<(PathBuf, bool)> {
    let p = config_path()?;
    if p.exists() {
        return Ok((p, false));
    }
    save_config_to(&p, &Config::default())?;
    Ok((p, true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.analysis.provider, "gemini");
        assert!(cfg.data.seed_mock);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        cfg.analysis.provider = "openai".to_string();
        cfg.data.seed_mock = false;
        save_config_to(&path, &cfg).unwrap();
        assert_eq!(load_config_from(&path).unwrap(), cfg);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[analysis]\nprovider = \"anthropic\"\nmodel = \"\"\n").unwrap();
        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.analysis.timeout_secs, 60);
        assert_eq!(cfg.data.timezone, "Asia/Kolkata");

        let llm = cfg.analysis.to_llm_config().unwrap();
        assert_eq!(llm.provider, Provider::Anthropic);
        assert_eq!(llm.model, "claude-3-5-sonnet-latest");
        assert_eq!(llm.base_url, "https://api.anthropic.com");
        assert_eq!(llm.api_key_env, "ANTHROPIC_API_KEY");
    }

    #[test]
    fn test_bad_values_are_reported() {
        let mut cfg = Config::default();
        cfg.analysis.provider = "bard".to_string();
        assert!(cfg.analysis.to_llm_config().is_err());

        cfg.data.timezone = "Mars/Olympus".to_string();
        let err = cfg.data.today().unwrap_err();
        assert!(err.to_string().contains("Mars/Olympus"));
    }

    #[test]
    fn test_garbage_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "this is = = not toml").unwrap();
        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().contains("config.toml"));
    }
}
