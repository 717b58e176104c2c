//! Shared test utilities and mock infrastructure.

#![allow(dead_code, unused_imports)]

pub mod mock_backend;

use ayahhub::api::ApiClient;
use ayahhub::config::ProxyConfig;
use ayahhub::preferences::{MemoryBackend, PreferenceStore};
use std::net::{SocketAddr, TcpListener};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Find an available port for testing.
pub fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind to free port");
    listener.local_addr().unwrap().port()
}

/// Write `content` as `config.toml` inside a fresh temp dir.
pub fn temp_config(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, content).expect("Failed to write config");
    (temp_dir, config_path)
}

/// Wait for a server to become available.
pub async fn wait_for_server(addr: SocketAddr, timeout: Duration) -> bool {
    let start = std::time::Instant::now();
    while start.elapsed() < timeout {
        if tokio::net::TcpStream::connect(addr).await.is_ok() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

// -- Content helpers ----------------------------------------------------------

/// Client pointed at `base_url` with a short timeout.
pub fn api_client(base_url: &str) -> Arc<ApiClient> {
    Arc::new(ApiClient::new(base_url, Duration::from_secs(5)).expect("client"))
}

/// Preference store backed by memory with `lang` already selected.
pub fn preferences(lang: &str) -> Arc<PreferenceStore> {
    Arc::new(PreferenceStore::open(
        Arc::new(MemoryBackend::with_language(lang)),
        "ur",
    ))
}

/// Proxy config forwarding `/api/quran` to `upstream`.
pub fn proxy_config(upstream: &str) -> ProxyConfig {
    ProxyConfig {
        bind_addr: "127.0.0.1:0".to_string(),
        upstream_base_url: upstream.to_string(),
        timeout_seconds: 5,
        ..ProxyConfig::default()
    }
}

pub fn surah_json(id: u16, transliteration: &str) -> String {
    format!(
        r#"{{"id":{id},"name":"سورة","transliteration":"{transliteration}","translation":"Translation {id}","type":"meccan","total_verses":7}}"#
    )
}

pub fn surah_list_json(surahs: &[(u16, &str)]) -> String {
    let items: Vec<String> = surahs.iter().map(|(id, t)| surah_json(*id, t)).collect();
    format!(r#"{{"surahs":[{}]}}"#, items.join(","))
}
