//! TOML configuration parsing and validation.
//!
//! Every command reads the same file (default `./config/insights.toml`).
//! Sections other than `[db]` and `[server]` are optional and fall back to
//! defaults that keep analytics disabled and the cache in memory.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub site: SiteConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

/// Site-level settings used for permalinks and local timestamp conversion.
#[derive(Debug, Deserialize, Clone)]
pub struct SiteConfig {
    #[serde(default = "default_site_url")]
    pub url: String,
    /// Offset of the site's local clock from UTC, in minutes.
    #[serde(default)]
    pub utc_offset_minutes: i32,
    /// Permalink template; `{id}` and `{slug}` are substituted.
    #[serde(default = "default_permalink_structure")]
    pub permalink_structure: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            url: default_site_url(),
            utc_offset_minutes: 0,
            permalink_structure: default_permalink_structure(),
        }
    }
}

fn default_site_url() -> String {
    "http://localhost".to_string()
}
fn default_permalink_structure() -> String {
    "/?p={id}".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_cache_backend")]
    pub backend: String,
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default = "default_cache_prefix")]
    pub prefix: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: default_cache_backend(),
            ttl_secs: default_ttl_secs(),
            prefix: default_cache_prefix(),
        }
    }
}

fn default_cache_backend() -> String {
    "memory".to_string()
}
fn default_ttl_secs() -> u64 {
    900
}
fn default_cache_prefix() -> String {
    "editorial_insights_".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct AnalyticsConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub site_id: Option<String>,
    #[serde(default)]
    pub api_token: Option<String>,
    /// Whether the stats module is enabled on the analytics account.
    #[serde(default = "default_stats_enabled")]
    pub stats_enabled: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            base_url: None,
            site_id: None,
            api_token: None,
            stats_enabled: default_stats_enabled(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_provider() -> String {
    "disabled".to_string()
}
fn default_stats_enabled() -> bool {
    true
}
fn default_timeout_secs() -> u64 {
    15
}

impl AnalyticsConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// Capability every ability requires of its caller.
    #[serde(default = "default_capability")]
    pub capability: String,
    #[serde(default)]
    pub users: Vec<ApiUser>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            capability: default_capability(),
            users: Vec::new(),
        }
    }
}

fn default_capability() -> String {
    "edit_posts".to_string()
}

/// A bearer-token identity allowed to call the server.
#[derive(Debug, Deserialize, Clone)]
pub struct ApiUser {
    pub name: String,
    /// Hex-encoded SHA-256 of the bearer token.
    pub token_sha256: String,
    #[serde(default)]
    pub capabilities: Vec<String>,
}

impl Config {
    /// Defaults for commands that can run without a config file.
    pub fn minimal() -> Self {
        Self {
            db: DbConfig {
                path: PathBuf::from("./data/insights.sqlite"),
            },
            site: SiteConfig::default(),
            server: ServerConfig {
                bind: "127.0.0.1:7341".to_string(),
            },
            cache: CacheConfig::default(),
            analytics: AnalyticsConfig::default(),
            auth: AuthConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

pub fn validate(config: &Config) -> Result<()> {
    if config.cache.ttl_secs == 0 {
        anyhow::bail!("cache.ttl_secs must be > 0");
    }

    match config.cache.backend.as_str() {
        "memory" | "sqlite" => {}
        other => anyhow::bail!(
            "Unknown cache backend: '{}'. Must be memory or sqlite.",
            other
        ),
    }

    if config.site.utc_offset_minutes.abs() > 18 * 60 {
        anyhow::bail!("site.utc_offset_minutes must be within +/- 1080");
    }

    match config.analytics.provider.as_str() {
        "disabled" => {}
        "http" => {
            let missing = [
                ("base_url", &config.analytics.base_url),
                ("site_id", &config.analytics.site_id),
                ("api_token", &config.analytics.api_token),
            ]
            .into_iter()
            .find(|(_, v)| v.as_deref().map(str::trim).unwrap_or("").is_empty());
            if let Some((field, _)) = missing {
                anyhow::bail!("analytics.{} must be specified when provider is 'http'", field);
            }
        }
        other => anyhow::bail!(
            "Unknown analytics provider: '{}'. Must be disabled or http.",
            other
        ),
    }

    for user in &config.auth.users {
        let hash = &user.token_sha256;
        if hash.len() != 64 || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
            anyhow::bail!(
                "auth.users '{}': token_sha256 must be 64 hex characters",
                user.name
            );
        }
    }

    Ok(())
}
