use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::services::settings::ImportantLink;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub site: SiteConfig,

    #[serde(default)]
    pub security: SecurityConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// Event bus buffer size (default: 100)
    pub event_bus_buffer_size: usize,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    /// Maximum database connections (default: 5)
    pub max_db_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/patrika.db".to_string(),
            log_level: "info".to_string(),
            event_bus_buffer_size: 100,
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,

    pub cors_allowed_origins: Vec<String>,

    /// Whether to set the Secure flag on session cookies.
    /// Default: true for production safety. Set to false for local development without HTTPS.
    pub secure_cookies: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 7420,
            cors_allowed_origins: vec![
                "http://localhost:7420".to_string(),
                "http://127.0.0.1:7420".to_string(),
            ],
            secure_cookies: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Directory the reader-facing frontend build is served from.
    pub assets_path: String,

    /// Category preselected in the publish form.
    pub default_category: String,

    /// Category list used until the admin saves their own.
    pub default_categories: Vec<String>,

    /// Important-links list used until the admin saves their own.
    pub default_links: Vec<ImportantLink>,

    pub hero_title: String,

    pub hero_description: String,

    pub headline: String,

    pub sub_headline: String,

    pub footer_text: String,

    pub footer_address: String,

    pub footer_phone: String,

    pub footer_email: String,

    /// Background image behind the devotional section; empty hides it.
    pub divine_bg_url: String,

    /// Visitor logs older than this are eligible for pruning.
    pub visitor_log_retention_days: i64,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            assets_path: "public".to_string(),
            default_category: "Monthly".to_string(),
            default_categories: vec![
                "Monthly".to_string(),
                "Special Issue".to_string(),
                "Annual".to_string(),
            ],
            default_links: Vec::new(),
            hero_title: "The Digital Library".to_string(),
            hero_description: "Browse every issue of the magazine, past and present.".to_string(),
            headline: "Patrika".to_string(),
            sub_headline: "A magazine archive".to_string(),
            footer_text: "All rights reserved.".to_string(),
            footer_address: String::new(),
            footer_phone: String::new(),
            footer_email: String::new(),
            divine_bg_url: String::new(),
            visitor_log_retention_days: 365,
        }
    }
}

impl SiteConfig {
    /// Settings keys that fall back to config values when the table has no row.
    #[must_use]
    pub fn default_values(&self) -> Vec<(String, String)> {
        vec![
            ("hero_title".to_string(), self.hero_title.clone()),
            (
                "hero_description".to_string(),
                self.hero_description.clone(),
            ),
            ("headline".to_string(), self.headline.clone()),
            ("sub_headline".to_string(), self.sub_headline.clone()),
            ("footer_text".to_string(), self.footer_text.clone()),
            ("footer_address".to_string(), self.footer_address.clone()),
            ("footer_phone".to_string(), self.footer_phone.clone()),
            ("footer_email".to_string(), self.footer_email.clone()),
            ("divine_bg_url".to_string(), self.divine_bg_url.clone()),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Argon2 memory cost in KiB (default: 8192 = 8MB)
    pub argon2_memory_cost_kib: u32,

    /// Argon2 time cost (iterations)
    pub argon2_time_cost: u32,

    /// Argon2 parallelism (default: 1)
    pub argon2_parallelism: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            argon2_memory_cost_kib: 8192,
            argon2_time_cost: 3,
            argon2_parallelism: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub loki_enabled: bool,

    pub loki_url: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            server: ServerConfig::default(),
            site: SiteConfig::default(),
            security: SecurityConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        paths.push(PathBuf::from("config.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("patrika").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".patrika").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port must be > 0");
        }

        if self.general.database_path.is_empty() {
            anyhow::bail!("Database path cannot be empty");
        }

        if self.site.default_categories.is_empty() {
            anyhow::bail!("At least one default publication category is required");
        }

        if self.security.argon2_parallelism == 0 {
            anyhow::bail!("Argon2 parallelism must be > 0");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 7420);
        assert!(config.site.default_categories.contains(&"Monthly".to_string()));
        assert_eq!(config.security.argon2_time_cost, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_site_defaults_cover_footer_and_background() {
        let defaults = SiteConfig::default().default_values();
        for key in ["footer_address", "footer_phone", "footer_email", "divine_bg_url"] {
            assert!(
                defaults.iter().any(|(k, _)| k == key),
                "missing default for {key}"
            );
        }
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[server]"));
        assert!(toml_str.contains("[site]"));
    }

    #[test]
    fn test_invalid_port_rejected() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }
}
