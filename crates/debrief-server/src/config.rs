use debrief_core::ParsePolicy;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// Full `debrief.toml` configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DebriefConfig {
    pub server: ServerConfig,
    pub gemini: GeminiConfig,
    pub analysis: AnalysisConfig,
    pub progress: ProgressConfig,
    pub sessions: SessionsConfig,
    pub history: HistoryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub http_addr: String,
    /// Uploads arrive inline as base64, so this needs to be generous.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: "0.0.0.0:9191".to_string(),
            max_body_bytes: 50 * 1024 * 1024, // 50MB
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub api_base: String,
    pub model: String,
    /// Name of the environment variable holding the API key. Read on every call.
    pub api_key_env: String,
    /// Unset means no client-side timeout.
    pub request_timeout_secs: Option<u64>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_base: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-2.5-flash".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            request_timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub parse_policy: ParsePolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressConfig {
    pub tick_ms: u64,
    pub step: u8,
    pub cap: u8,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            tick_ms: 500,
            step: 5,
            cap: 90,
        }
    }
}

impl ProgressConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

/// Retention of settled session records kept for polling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionsConfig {
    /// Settled sessions older than this are evicted.
    pub retain_secs: u64,
    /// Upper bound on settled sessions kept, oldest evicted first.
    pub max_settled: usize,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            retain_secs: 600,
            max_settled: 256,
        }
    }
}

impl SessionsConfig {
    pub fn retain(&self) -> Duration {
        Duration::from_secs(self.retain_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub seed_demo: bool,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { seed_demo: true }
    }
}

impl DebriefConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    /// Missing file means defaults. A file that exists must parse.
    pub fn load_if_exists(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path).map_err(|e| anyhow::anyhow!("Failed to load {}: {}", path.display(), e))
    }

    /// Missing file means defaults. A file that exists but fails to parse is
    /// reported and also falls back to defaults.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load {}: {}; using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn http_addr(&self) -> anyhow::Result<SocketAddr> {
        self.server
            .http_addr
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid [server] http_addr '{}': {}", self.server.http_addr, e))
    }

    /// All problems found, empty when the configuration is usable.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.server.http_addr.parse::<SocketAddr>().is_err() {
            errors.push(format!("[server] http_addr '{}' is not a socket address", self.server.http_addr));
        }
        if self.server.max_body_bytes == 0 {
            errors.push("[server] max_body_bytes must be > 0".to_string());
        }
        if self.gemini.model.trim().is_empty() {
            errors.push("[gemini] model must not be empty".to_string());
        }
        if !self.gemini.api_base.starts_with("http://") && !self.gemini.api_base.starts_with("https://") {
            errors.push(format!("[gemini] api_base '{}' must be an http(s) URL", self.gemini.api_base));
        }
        if self.gemini.api_key_env.trim().is_empty() {
            errors.push("[gemini] api_key_env must not be empty".to_string());
        }
        if self.gemini.request_timeout_secs == Some(0) {
            errors.push("[gemini] request_timeout_secs must be > 0 when set".to_string());
        }
        if self.progress.tick_ms == 0 {
            errors.push("[progress] tick_ms must be > 0".to_string());
        }
        if self.progress.cap > 100 {
            errors.push("[progress] cap must be <= 100".to_string());
        }
        if self.sessions.retain_secs == 0 {
            errors.push("[sessions] retain_secs must be > 0".to_string());
        }
        errors
    }
}
