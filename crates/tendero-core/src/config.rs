use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Top-level config (tendero.toml + TENDERO_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TenderoConfig {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

/// TTLs for the session store keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Session lifetime. Sessions expire, they are never deleted explicitly.
    #[serde(default = "default_session_ttl")]
    pub session_ttl_seconds: u64,
    /// Per-session mutex TTL — a crashed worker's lock is reclaimable after
    /// this many seconds.
    #[serde(default = "default_lock_ttl")]
    pub lock_ttl_seconds: u64,
    /// How long a message id stays marked as processed.
    #[serde(default = "default_idempotency_ttl")]
    pub idempotency_ttl_seconds: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_ttl_seconds: default_session_ttl(),
            lock_ttl_seconds: default_lock_ttl(),
            idempotency_ttl_seconds: default_idempotency_ttl(),
        }
    }
}

/// LLM enablement and call bounds. Credentials come from the environment;
/// the core only sees enablement, model selection and timeouts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// When false, the router never calls the LLM and goes straight to the
    /// rule table. Tests routinely run in this mode.
    #[serde(default)]
    pub routing_enabled: bool,
    #[serde(default)]
    pub provider: LlmProviderKind,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_llm_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Override for the provider API key; falls back to the provider's
    /// conventional env var when unset.
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            routing_enabled: false,
            provider: LlmProviderKind::default(),
            model: default_model(),
            timeout_ms: default_llm_timeout_ms(),
            temperature: default_temperature(),
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProviderKind {
    #[default]
    Openai,
    Anthropic,
    Gemini,
}

/// Bounds on a single turn's dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Maximum baton handoffs per turn, so at most `max_baton_hops + 1`
    /// agents run.
    #[serde(default = "default_max_baton_hops")]
    pub max_baton_hops: u32,
    /// Truncation length for user text in logs and router summaries.
    #[serde(default = "default_max_dialogue_text")]
    pub max_dialogue_text: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_baton_hops: default_max_baton_hops(),
            max_dialogue_text: default_max_dialogue_text(),
        }
    }
}

impl TenderoConfig {
    /// Load config from a TOML file with TENDERO_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. TENDERO_CONFIG env var
    ///   3. ./tendero.toml
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .or_else(|| std::env::var("TENDERO_CONFIG").ok())
            .unwrap_or_else(|| "tendero.toml".to_string());

        let config: TenderoConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("TENDERO_").split("__"))
            .extract()
            .map_err(|e| crate::error::CoreError::Config(e.to_string()))?;

        Ok(config)
    }
}

fn default_session_ttl() -> u64 {
    86_400
}

fn default_lock_ttl() -> u64 {
    30
}

fn default_idempotency_ttl() -> u64 {
    3_600
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_llm_timeout_ms() -> u64 {
    900
}

fn default_temperature() -> f64 {
    0.3
}

fn default_max_baton_hops() -> u32 {
    2
}

fn default_max_dialogue_text() -> usize {
    200
}
