use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;

use crate::error::{Context, Result};

use super::{validator, Config, NavTab, SearchMode};

pub const DEFAULT_CONFIG_PATH: &str = "assets/config.json";

/// Load the client configuration, layering the JSON file over the built-in defaults.
///
/// A missing file is not an error: the built-in configuration is used as is.
pub fn load_config(path: &Path) -> Result<Config> {
    let mut config = Config::builtin();

    if path.exists() {
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read config JSON at {}", path.display()))?;
        let raw: RawConfig = serde_json::from_str(&json)
            .with_context(|| format!("failed to parse config JSON at {}", path.display()))?;
        raw.apply(&mut config);
        log::info!("Loaded configuration from {}", path.display());
    } else {
        log::info!(
            "No configuration at {}; using built-in defaults",
            path.display()
        );
    }

    validator::validate_config(&config)?;
    Ok(config)
}

/// Parse a configuration document from a string without touching the filesystem.
pub fn parse_config(json: &str) -> Result<Config> {
    let raw: RawConfig = serde_json::from_str(json).context("failed to parse config JSON")?;
    let mut config = Config::builtin();
    raw.apply(&mut config);
    validator::validate_config(&config)?;
    Ok(config)
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    api: RawApiConfig,
    #[serde(default)]
    session: RawSessionConfig,
    #[serde(default)]
    search: RawSearchConfig,
    #[serde(default)]
    notifications: RawNotificationConfig,
    #[serde(default)]
    navbar: RawNavbarConfig,
    #[serde(default)]
    storage: RawStorageConfig,
    #[serde(default)]
    refresh_delay_ms: Option<u64>,
    #[serde(default)]
    debug: Option<bool>,
}

impl RawConfig {
    fn apply(self, config: &mut Config) {
        self.api.apply(config);
        self.session.apply(config);
        self.search.apply(config);
        self.notifications.apply(config);
        self.navbar.apply(config);
        self.storage.apply(config);

        if let Some(ms) = self.refresh_delay_ms {
            config.refresh_delay = Duration::from_millis(ms);
        }
        if let Some(debug) = self.debug {
            config.debug = debug;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct RawApiConfig {
    base_url: Option<String>,
    session_cookie: Option<String>,
    csrf_token: Option<String>,
    csrf_page: Option<String>,
    #[serde(default)]
    headers: HashMap<String, String>,
    timeout_secs: Option<u64>,
}

impl RawApiConfig {
    fn apply(self, config: &mut Config) {
        let api = &mut config.api;
        if let Some(base_url) = self.base_url {
            api.base_url = base_url.trim_end_matches('/').to_string();
        }
        if self.session_cookie.is_some() {
            api.session_cookie = self.session_cookie;
        }
        if self.csrf_token.is_some() {
            api.csrf_token = self.csrf_token;
        }
        if let Some(page) = self.csrf_page {
            api.csrf_page = page;
        }
        api.headers.extend(self.headers);
        if let Some(secs) = self.timeout_secs {
            api.timeout = Duration::from_secs(secs);
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct RawSessionConfig {
    length_secs: Option<u64>,
    warning_lead_secs: Option<u64>,
}

impl RawSessionConfig {
    fn apply(self, config: &mut Config) {
        if let Some(secs) = self.length_secs {
            config.session.length = Duration::from_secs(secs);
        }
        if let Some(secs) = self.warning_lead_secs {
            config.session.warning_lead = Duration::from_secs(secs);
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct RawSearchConfig {
    mode: Option<SearchMode>,
    quiet_ms: Option<u64>,
    min_length: Option<usize>,
}

impl RawSearchConfig {
    fn apply(self, config: &mut Config) {
        if let Some(mode) = self.mode {
            config.search.mode = mode;
        }
        if let Some(ms) = self.quiet_ms {
            config.search.quiet = Duration::from_millis(ms);
        }
        if let Some(min) = self.min_length {
            config.search.min_length = min;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct RawNotificationConfig {
    default_duration_ms: Option<u64>,
    server_duration_ms: Option<u64>,
    load_on_start: Option<bool>,
}

impl RawNotificationConfig {
    fn apply(self, config: &mut Config) {
        let notifications = &mut config.notifications;
        if let Some(ms) = self.default_duration_ms {
            notifications.default_duration = Duration::from_millis(ms);
        }
        if let Some(ms) = self.server_duration_ms {
            notifications.server_duration = Duration::from_millis(ms);
        }
        if let Some(load) = self.load_on_start {
            notifications.load_on_start = load;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct RawNavbarConfig {
    tabs: Option<Vec<NavTab>>,
    compact_breakpoint: Option<u16>,
}

impl RawNavbarConfig {
    fn apply(self, config: &mut Config) {
        if let Some(tabs) = self.tabs {
            config.navbar.tabs = tabs;
        }
        if let Some(breakpoint) = self.compact_breakpoint {
            config.navbar.compact_breakpoint = breakpoint;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct RawStorageConfig {
    preferences_file: Option<PathBuf>,
}

impl RawStorageConfig {
    fn apply(self, config: &mut Config) {
        if let Some(path) = self.preferences_file {
            config.storage.preferences_file = path;
        }
    }
}
