use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub proxy: ProxyConfig,
    #[serde(default)]
    pub preferences: PreferencesConfig,
    #[serde(default)]
    pub view: ViewConfig,
}

/// Execution context that decides where the API client sends requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Requests go through the local proxy forwarder.
    Development,
    /// Requests go straight to the remote content service.
    #[default]
    Production,
}

impl Environment {
    /// Env var that overrides `api.environment` from the file.
    pub const ENV_VAR: &'static str = "AYAHHUB_ENV";

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Some(Self::Development),
            "production" | "prod" => Some(Self::Production),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

/// Settings for the content API client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub environment: Environment,
    /// Remote content service base (used in production).
    #[serde(default = "default_direct_base_url")]
    pub direct_base_url: String,
    /// Proxy forwarder base (used in development).
    #[serde(default = "default_proxy_base_url")]
    pub proxy_base_url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_api_timeout")]
    pub timeout_seconds: u32,
    /// Language used when nothing has been persisted yet.
    #[serde(default = "default_language")]
    pub default_language: String,
}

/// Settings for the proxy forwarder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Bind address for the local proxy server (host:port).
    #[serde(default = "default_proxy_bind_addr")]
    pub bind_addr: String,
    /// Inbound path prefix stripped before forwarding.
    #[serde(default = "default_proxy_prefix")]
    pub prefix: String,
    /// Upstream base; the stripped sub-path is appended verbatim.
    #[serde(default = "default_upstream_base_url")]
    pub upstream_base_url: String,
    /// Upper bound for one upstream exchange, in seconds.
    #[serde(default = "default_proxy_timeout")]
    pub timeout_seconds: u32,
    /// Forward the inbound method instead of always issuing GET.
    #[serde(default)]
    pub forward_method: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreferencesConfig {
    /// Override for the preference file location.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Idle time after the last keystroke before a search is issued.
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,
    /// Minimum trimmed query length that may reach the network.
    #[serde(default = "default_min_search_chars")]
    pub min_search_chars: usize,
}

fn default_direct_base_url() -> String {
    "https://alquran-api.pages.dev/api/quran".to_string()
}

fn default_proxy_base_url() -> String {
    "http://127.0.0.1:8787/api/quran".to_string()
}

fn default_api_timeout() -> u32 {
    15
}

fn default_language() -> String {
    "ur".to_string()
}

fn default_proxy_bind_addr() -> String {
    "127.0.0.1:8787".to_string()
}

fn default_proxy_prefix() -> String {
    "/api/quran".to_string()
}

fn default_upstream_base_url() -> String {
    "https://alquran-api.pages.dev/api/quran/".to_string()
}

fn default_proxy_timeout() -> u32 {
    30
}

fn default_search_debounce_ms() -> u64 {
    500
}

fn default_min_search_chars() -> usize {
    2
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            direct_base_url: default_direct_base_url(),
            proxy_base_url: default_proxy_base_url(),
            timeout_seconds: default_api_timeout(),
            default_language: default_language(),
        }
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_proxy_bind_addr(),
            prefix: default_proxy_prefix(),
            upstream_base_url: default_upstream_base_url(),
            timeout_seconds: default_proxy_timeout(),
            forward_method: false,
        }
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            search_debounce_ms: default_search_debounce_ms(),
            min_search_chars: default_min_search_chars(),
        }
    }
}
