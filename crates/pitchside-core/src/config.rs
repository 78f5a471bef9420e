//! Configuration management for Pitchside.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration.
///
/// This is loaded from `~/.config/pitchside/config.toml` (or platform
/// equivalent), or from the file named by `PITCHSIDE_CONFIG`. If no file
/// exists, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listener settings
    pub server: ServerConfig,
    /// Browser session settings
    pub browser: BrowserConfig,
    /// Extraction behavior settings
    pub scraping: ScrapingConfig,
    /// Freshness TTLs per entity kind
    pub cache: CacheConfig,
    /// Background refresh settings
    pub scheduler: SchedulerConfig,
    /// Persistence settings
    pub store: StoreConfig,
    /// Readiness and marker selectors for the target site
    pub selectors: SelectorConfig,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - `PITCHSIDE_CONFIG` names a file that does not exist
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        if let Ok(explicit) = std::env::var("PITCHSIDE_CONFIG") {
            return Self::load_from(Path::new(&explicit));
        }

        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.display().to_string(),
            });
        }

        tracing::debug!("Loading config from {}", path.display());
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `PITCHSIDE_HEADLESS`: Override browser headless mode (true/false)
    /// - `PITCHSIDE_PORT`: Override HTTP port
    /// - `PITCHSIDE_DATABASE`: Override the store database path
    /// - `PITCHSIDE_SESSION_DIR`: Override the persisted browser identity directory
    /// - `PITCHSIDE_REFRESH_SECS`: Override the background refresh interval
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;
        config.apply_env_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup. Unparseable values are ignored.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(headless) = lookup("PITCHSIDE_HEADLESS").and_then(|v| v.parse().ok()) {
            self.browser.headless = headless;
            tracing::debug!("Override browser.headless from env: {}", headless);
        }

        if let Some(port) = lookup("PITCHSIDE_PORT").and_then(|v| v.parse().ok()) {
            self.server.port = port;
            tracing::debug!("Override server.port from env: {}", port);
        }

        if let Some(path) = lookup("PITCHSIDE_DATABASE") {
            tracing::debug!("Override store.database_path from env: {}", path);
            self.store.database_path = PathBuf::from(path);
        }

        if let Some(dir) = lookup("PITCHSIDE_SESSION_DIR") {
            tracing::debug!("Override browser.session_dir from env: {}", dir);
            self.browser.session_dir = PathBuf::from(dir);
        }

        if let Some(secs) = lookup("PITCHSIDE_REFRESH_SECS").and_then(|v| v.parse().ok()) {
            self.scheduler.interval_secs = secs;
            tracing::debug!("Override scheduler.interval_secs from env: {}", secs);
        }
    }

    /// Reject values the rest of the service cannot work with.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.scheduler.interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scheduler.interval_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        let readiness_lists = [
            ("selectors.fixture_cards", &self.selectors.fixture_cards),
            ("selectors.live_scorebook", &self.selectors.live_scorebook),
            ("selectors.contest_cards", &self.selectors.contest_cards),
            ("selectors.scoreboard", &self.selectors.scoreboard),
            ("selectors.roster", &self.selectors.roster),
        ];
        for (field, list) in readiness_lists {
            if list.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: "at least one readiness selector is required".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> ConfigResult<()> {
        let config_path = Self::config_path()?;
        let config_dir = config_path
            .parent()
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "config_path".to_string(),
                reason: "no parent directory".to_string(),
            })?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", config_path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/pitchside/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("com", "pitchside", "pitchside").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind
    pub bind_address: String,
    /// TCP port
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

/// Browser session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run browser in headless mode
    pub headless: bool,
    /// Pass `--no-sandbox` to Chromium
    pub no_sandbox: bool,
    /// Explicit Chromium executable; auto-detected when unset
    pub executable: Option<PathBuf>,
    /// Directory holding the persisted browser identity (cookies, storage)
    pub session_dir: PathBuf,
    /// Navigation timeout in seconds
    pub navigation_timeout_secs: u64,
    /// Launch attempts before the session is declared unavailable
    pub launch_attempts: u32,
    /// Base delay between launch attempts in seconds
    pub launch_retry_delay_secs: u64,
    /// Login checks before the session is treated as signed out
    pub login_check_attempts: u32,
    /// How long each login check waits for the signed-in marker, in seconds
    pub login_check_timeout_secs: u64,
    /// Base delay between login checks in seconds
    pub login_check_retry_delay_secs: u64,
    /// Resource types aborted before they load
    pub blocked_resources: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            no_sandbox: true,
            executable: None,
            session_dir: PathBuf::from("session_data"),
            navigation_timeout_secs: 60,
            launch_attempts: 3,
            launch_retry_delay_secs: 5,
            login_check_attempts: 3,
            login_check_timeout_secs: 30,
            login_check_retry_delay_secs: 2,
            blocked_resources: vec![
                "image".to_string(),
                "stylesheet".to_string(),
                "font".to_string(),
                "media".to_string(),
            ],
        }
    }
}

/// Extraction behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapingConfig {
    /// Lobby URL; every other page family hangs off it
    pub base_url: String,
    /// Timeout per readiness selector in seconds
    pub readiness_timeout_secs: u64,
    /// How long to look for a dismissable popup in seconds
    pub popup_timeout_secs: u64,
    /// Pause after a tab click before reading content, in milliseconds
    pub settle_ms: u64,
    /// Attempts per extraction
    pub max_attempts: u32,
    /// Base retry delay for detail pages in seconds
    pub retry_delay_secs: u64,
    /// Base retry delay for fixture lists in seconds
    pub fixtures_retry_delay_secs: u64,
    /// Base retry delay for rosters in seconds
    pub roster_retry_delay_secs: u64,
    /// Where failure screenshots are written; disabled when unset
    pub diagnostics_dir: Option<PathBuf>,
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.my11circle.com/mecspa/lobby".to_string(),
            readiness_timeout_secs: 30,
            popup_timeout_secs: 2,
            settle_ms: 1000,
            max_attempts: 3,
            retry_delay_secs: 2,
            fixtures_retry_delay_secs: 3,
            roster_retry_delay_secs: 3,
            diagnostics_dir: None,
        }
    }
}

/// Freshness TTLs in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Upcoming fixture list
    pub fixtures_upcoming_secs: u64,
    /// Live fixture list
    pub fixtures_live_secs: u64,
    /// Completed fixture list
    pub fixtures_completed_secs: u64,
    /// Live match detail
    pub live_match_secs: u64,
    /// Contest list
    pub contests_secs: u64,
    /// Scoreboard
    pub scoreboard_secs: u64,
    /// Player roster
    pub roster_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            fixtures_upcoming_secs: 5 * 60,
            fixtures_live_secs: 60,
            fixtures_completed_secs: 60 * 60,
            live_match_secs: 60,
            contests_secs: 5 * 60,
            scoreboard_secs: 5 * 60,
            roster_secs: 5 * 60,
        }
    }
}

/// Background refresh settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Start the refresh loop with the server
    pub enabled: bool,
    /// Pause between cycles in seconds
    pub interval_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 30,
        }
    }
}

/// Persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database file (or `:memory:`)
    pub database_path: PathBuf,
    /// Attempts per store operation
    pub max_attempts: u32,
    /// Base delay between store attempts in seconds
    pub retry_delay_secs: u64,
    /// Capacity of the update broadcast channel
    pub update_channel_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("pitchside.db"),
            max_attempts: 3,
            retry_delay_secs: 2,
            update_channel_capacity: 256,
        }
    }
}

/// Selectors describing the target site's current markup.
///
/// Readiness lists are tried in order; the first that appears wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Only renders for an authenticated session
    pub login_signal: String,
    /// Present when the site asks for a login
    pub login_required: String,
    /// Close control of promotional popups
    pub popup_close: String,
    /// Class carried by an inactive lobby tab
    pub tab_inactive_class: String,
    /// Fixture card readiness
    pub fixture_cards: Vec<String>,
    /// Live score readiness
    pub live_scorebook: Vec<String>,
    /// Contest card readiness
    pub contest_cards: Vec<String>,
    /// Scoreboard readiness
    pub scoreboard: Vec<String>,
    /// Team-builder category bar; must render before any player card
    pub roster_categories: String,
    /// Player card readiness
    pub roster: Vec<String>,
    /// Text that must appear on the contests page
    pub contests_page_marker: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            login_signal: "div[testid='ft_Tabs_Upcoming']".to_string(),
            login_required: "input[name=\"mobile\"]".to_string(),
            popup_close: ".close-button, .modal-close".to_string(),
            tab_inactive_class: "ft-tab-inactive".to_string(),
            fixture_cards: vec!["div[id^='ft-fixture-card-new']".to_string()],
            live_scorebook: vec![
                ".score-book".to_string(),
                ".score-container".to_string(),
                ".match-score".to_string(),
            ],
            contest_cards: vec![
                "div[id^=\"ft-contest-card\"]".to_string(),
                "div[class*=\"contest-card\"]".to_string(),
                "div[testid*=\"contest-card\"]".to_string(),
            ],
            scoreboard: vec![".page_coninner_autoheight".to_string()],
            roster_categories: ".player-category-tabs".to_string(),
            roster: vec![".player-box".to_string()],
            contests_page_marker: "Contests".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 5000);
        assert!(config.browser.headless);
        assert_eq!(config.browser.launch_attempts, 3);
        assert_eq!(config.browser.login_check_attempts, 3);
        assert_eq!(config.browser.login_check_timeout_secs, 30);
        assert_eq!(config.scheduler.interval_secs, 30);
        assert_eq!(config.cache.fixtures_completed_secs, 3600);
        assert_eq!(config.selectors.live_scorebook.len(), 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("[server]"));
        assert!(toml_str.contains("[browser]"));
        assert!(toml_str.contains("[selectors]"));

        let parsed: AppConfig = toml::from_str(&toml_str).expect("parse serialized config");
        assert_eq!(parsed.scraping.base_url, config.scraping.base_url);
        assert_eq!(parsed.selectors.contest_cards, config.selectors.contest_cards);
    }

    #[test]
    fn test_load_from_file() {
        let tmp = TempDir::new().expect("create temp dir");
        let config_path = tmp.path().join("config.toml");

        let mut config = AppConfig::default();
        config.server.port = 8080;
        config.cache.live_match_secs = 20;

        let contents = toml::to_string_pretty(&config).expect("serialize config");
        fs::write(&config_path, contents).expect("write config file");

        let loaded = AppConfig::load_from(&config_path).expect("load config");
        assert_eq!(loaded.server.port, 8080);
        assert_eq!(loaded.cache.live_match_secs, 20);
    }

    #[test]
    fn test_load_from_missing_file() {
        let tmp = TempDir::new().expect("create temp dir");
        let result = AppConfig::load_from(&tmp.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound { .. })));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("PITCHSIDE_HEADLESS", "false"),
            ("PITCHSIDE_PORT", "9000"),
            ("PITCHSIDE_DATABASE", "/tmp/cache.db"),
            ("PITCHSIDE_REFRESH_SECS", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_env_overrides(|name| vars.get(name).map(ToString::to_string));

        assert!(!config.browser.headless);
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.store.database_path, PathBuf::from("/tmp/cache.db"));
        // Unparseable values leave the default in place
        assert_eq!(config.scheduler.interval_secs, 30);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[browser]
headless = false

[selectors]
scoreboard = [".scorecard-root", ".page_coninner_autoheight"]
"#;

        let config: AppConfig = toml::from_str(toml_str).expect("parse partial config");
        assert!(!config.browser.headless);
        assert_eq!(config.selectors.scoreboard[0], ".scorecard-root");
        // These should be defaults
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.selectors.fixture_cards.len(), 1);
    }

    #[test]
    fn test_validate_rejects_empty_readiness_list() {
        let mut config = AppConfig::default();
        config.selectors.contest_cards.clear();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("selectors.contest_cards"));
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let mut config = AppConfig::default();
        config.scheduler.interval_secs = 0;
        assert!(config.validate().is_err());
    }
}
