use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::api::error::ApiError;
use crate::api::types::{Language, LanguageList, SearchResults, SurahDetail, SurahList, VerseDetail};
use crate::config::{ApiConfig, Environment};

/// Language used when a caller does not pass one.
pub const DEFAULT_LANGUAGE: &str = "ur";

/// Typed wrapper over the read endpoints of the content service.
///
/// Every call is a single GET bounded by the client timeout. Failures are
/// returned to the caller as-is; retrying is the page's decision.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::Client)?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    /// Build a client for the configured environment.
    ///
    /// Development goes through the proxy forwarder, everything else hits
    /// the content service directly. There is no fallback between the two.
    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        let timeout = Duration::from_secs(u64::from(config.timeout_seconds));
        Self::new(resolve_base_url(config), timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn fetch_all_surahs(&self, lang: Option<&str>) -> Result<SurahList, ApiError> {
        let url = self.endpoint("/", &[("lang", lang_or_default(lang))]);
        self.get_json(url).await
    }

    pub async fn fetch_surah(&self, surah: u16, lang: Option<&str>) -> Result<SurahDetail, ApiError> {
        let url = self.endpoint(
            &format!("/surah/{}", surah),
            &[("lang", lang_or_default(lang))],
        );
        self.get_json(url).await
    }

    pub async fn fetch_verse(
        &self,
        surah: u16,
        verse: u32,
        lang: Option<&str>,
    ) -> Result<VerseDetail, ApiError> {
        let url = self.endpoint(
            &format!("/surah/{}/verse/{}", surah, verse),
            &[("lang", lang_or_default(lang))],
        );
        self.get_json(url).await
    }

    /// Free-text search. No minimum length is enforced here.
    pub async fn search(&self, query: &str, lang: Option<&str>) -> Result<SearchResults, ApiError> {
        let url = self.endpoint(
            "/search",
            &[("q", query), ("lang", lang_or_default(lang))],
        );
        self.get_json(url).await
    }

    pub async fn fetch_languages(&self) -> Result<Vec<Language>, ApiError> {
        let url = self.endpoint("/languages", &[]);
        let list: LanguageList = self.get_json(url).await?;
        Ok(list.languages)
    }

    fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> String {
        build_url(&self.base_url, path, query)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, ApiError> {
        tracing::debug!(url = %url, "GET");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.transport_error(&url, e))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(&url, e))?;

        if !status.is_success() {
            let err = ApiError::from_status(status.as_u16(), &body);
            tracing::warn!(url = %url, status = status.as_u16(), error = %err, "Request rejected");
            return Err(err);
        }

        serde_json::from_slice(&body).map_err(|e| {
            tracing::warn!(url = %url, error = %e, "Malformed response body");
            ApiError::Decode(e)
        })
    }

    fn transport_error(&self, url: &str, err: reqwest::Error) -> ApiError {
        tracing::warn!(url = %url, error = %err, "Request failed");
        if err.is_timeout() {
            ApiError::Timeout {
                millis: self.timeout.as_millis(),
            }
        } else {
            ApiError::Network { source: err }
        }
    }
}

/// Base URL for the configured environment.
pub fn resolve_base_url(config: &ApiConfig) -> &str {
    match config.environment {
        Environment::Development => &config.proxy_base_url,
        Environment::Production => &config.direct_base_url,
    }
}

fn lang_or_default(lang: Option<&str>) -> &str {
    lang.filter(|l| !l.is_empty()).unwrap_or(DEFAULT_LANGUAGE)
}

/// Joins base and path with exactly one slash and appends an encoded query.
fn build_url(base: &str, path: &str, query: &[(&str, &str)]) -> String {
    let mut url = format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    if !query.is_empty() {
        let encoded: Vec<String> = query
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect();
        url.push('?');
        url.push_str(&encoded.join("&"));
    }
    url
}
