use serde::{Deserialize, Serialize};

/// Main configuration structure loaded from decision_lab.toml and environment variables
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    /// Runtime configuration loaded from environment variables
    #[serde(skip)]
    pub runtime: RuntimeConfig,
}

/// Chat-completions endpoint settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            max_tokens: 1000,
            timeout_ms: 30_000,
        }
    }
}

/// Retry budget and input gating for the analysis pipeline
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub max_attempts: u32,
    pub min_input_chars: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            min_input_chars: 50,
        }
    }
}

/// Runtime configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub openai_api_key: Option<String>,
    pub http_bind: std::net::SocketAddr,
    pub log_level: String,
    pub log_json: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            http_bind: std::net::SocketAddr::from(([127, 0, 0, 1], 8787)),
            log_level: "decision_lab=info,tower_http=info".to_string(),
            log_json: false,
        }
    }
}

impl RuntimeConfig {
    /// Load runtime configuration from environment variables
    pub fn load_from_env() -> Self {
        let mut cfg = Self {
            openai_api_key: std::env::var("OPENAI_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            log_level: std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "decision_lab=info,tower_http=info".to_string()),
            log_json: std::env::var("DECISION_LAB_LOG_JSON")
                .ok()
                .is_some_and(|v| v == "true" || v == "1"),
            ..Self::default()
        };

        if let Ok(v) = std::env::var("DECISION_LAB_HTTP_BIND") {
            match v.parse::<std::net::SocketAddr>() {
                Ok(bind) => cfg.http_bind = bind,
                Err(_) => tracing::warn!("Ignoring invalid DECISION_LAB_HTTP_BIND '{}'", v),
            }
        }

        cfg
    }
}

impl Config {
    /// Load configuration from TOML file and environment variables
    /// Uses DECISION_LAB_CONFIG environment variable or defaults to "decision_lab.toml"
    pub fn load() -> anyhow::Result<Self> {
        if let Ok(env_path) = std::env::var("DECISION_LAB_ENV_FILE") {
            let _ = dotenvy::from_path(env_path);
        } else {
            let _ = dotenvy::from_path(".env");
        }

        let config_path = std::env::var("DECISION_LAB_CONFIG")
            .unwrap_or_else(|_| "decision_lab.toml".to_string());

        let mut config = Self::from_file_or_default(&config_path)?;
        config.apply_env_overrides();
        config.runtime = RuntimeConfig::load_from_env();
        config.normalize();

        Ok(config)
    }

    /// Parse `path` if it exists, otherwise fall back to defaults
    pub fn from_file_or_default(path: &str) -> anyhow::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(_) => {
                tracing::warn!("Config file {} not found, using defaults", path);
                Ok(Self::default())
            }
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("OPENAI_BASE_URL") {
            self.llm.base_url = url;
            tracing::debug!("OPENAI_BASE_URL env override applied");
        }
        if let Ok(model) = std::env::var("OPENAI_MODEL") {
            self.llm.model = model;
            tracing::debug!("OPENAI_MODEL env override applied");
        }
        if let Some(attempts) = std::env::var("DECISION_LAB_MAX_ATTEMPTS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
        {
            self.analysis.max_attempts = attempts;
        }
    }

    /// Clamp values into their supported ranges
    pub fn normalize(&mut self) {
        if self.analysis.max_attempts == 0 {
            self.analysis.max_attempts = 1;
        } else if self.analysis.max_attempts > 5 {
            tracing::warn!(
                "max_attempts {} exceeds max 5, clamping to 5",
                self.analysis.max_attempts
            );
            self.analysis.max_attempts = 5;
        }

        if !self.llm.base_url.starts_with("http://") && !self.llm.base_url.starts_with("https://")
        {
            tracing::warn!(
                "LLM base URL '{}' doesn't start with http:// or https://",
                self.llm.base_url
            );
        }
        self.llm.temperature = self.llm.temperature.clamp(0.0, 2.0);
    }
}
