use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

pub mod loader;
pub mod validator;

pub use loader::{load_config, DEFAULT_CONFIG_PATH};
pub use validator::validate_config;

/// Connection settings for the grocery tracker API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    /// Value of the `sessionid` cookie; `${VAR}` placeholders are expanded at startup.
    pub session_cookie: Option<String>,
    pub csrf_token: Option<String>,
    /// Page fetched once at startup to scrape the CSRF token from.
    pub csrf_page: String,
    pub headers: HashMap<String, String>,
    pub timeout: Duration,
}

#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    pub length: Duration,
    pub warning_lead: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Rewrite the current path with a `search` parameter and refresh the page.
    Navigate,
    /// Query `/api/search/` and replace the results in place.
    Fetch,
}

#[derive(Debug, Clone, Copy)]
pub struct SearchConfig {
    pub mode: SearchMode,
    pub quiet: Duration,
    pub min_length: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct NotificationConfig {
    pub default_duration: Duration,
    pub server_duration: Duration,
    pub load_on_start: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuKind {
    Dropdown,
    Mega,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavLink {
    pub label: String,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavMenu {
    pub kind: MenuKind,
    pub links: Vec<NavLink>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavTab {
    pub label: String,
    pub path: String,
    #[serde(default)]
    pub menu: Option<NavMenu>,
}

#[derive(Debug, Clone)]
pub struct NavbarConfig {
    pub tabs: Vec<NavTab>,
    /// Terminal width below which the tabs collapse into the compact menu.
    pub compact_breakpoint: u16,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub preferences_file: PathBuf,
}

/// Fully resolved client configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub search: SearchConfig,
    pub notifications: NotificationConfig,
    pub navbar: NavbarConfig,
    pub storage: StorageConfig,
    pub refresh_delay: Duration,
    pub debug: bool,
}

impl Config {
    pub fn builtin() -> Self {
        let tabs = vec![
            tab("Home", "/", None),
            tab("Dashboard", "/dashboard/", None),
            tab("Groceries", "/mongodb/", None),
            tab(
                "Analytics",
                "/analytics/",
                Some(NavMenu {
                    kind: MenuKind::Dropdown,
                    links: vec![
                        link("Reports", "/reports/"),
                        link("Sustainability", "/sustainability/"),
                        link("Status", "/status/"),
                    ],
                }),
            ),
            tab(
                "Smart Tools",
                "/smart-suggestions/",
                Some(NavMenu {
                    kind: MenuKind::Mega,
                    links: vec![
                        link("Smart Suggestions", "/smart-suggestions/"),
                        link("Meal Planner", "/meal-planner/"),
                        link("Price Comparison", "/price-comparison/"),
                    ],
                }),
            ),
            tab(
                "Account",
                "/accounts/",
                Some(NavMenu {
                    kind: MenuKind::Dropdown,
                    links: vec![
                        link("Profile", "/accounts/profile/"),
                        link("Settings", "/accounts/settings/"),
                        link("Logout", "/accounts/logout/"),
                    ],
                }),
            ),
        ];

        Config {
            api: ApiConfig {
                base_url: "http://127.0.0.1:8000".to_string(),
                session_cookie: None,
                csrf_token: None,
                csrf_page: "/".to_string(),
                headers: HashMap::from([(
                    "Accept".to_string(),
                    "application/json".to_string(),
                )]),
                timeout: Duration::from_secs(10),
            },
            session: SessionConfig {
                length: Duration::from_secs(30 * 60),
                warning_lead: Duration::from_secs(5 * 60),
            },
            search: SearchConfig {
                mode: SearchMode::Navigate,
                quiet: Duration::from_millis(300),
                min_length: 2,
            },
            notifications: NotificationConfig {
                default_duration: Duration::from_millis(4000),
                server_duration: Duration::from_millis(10_000),
                load_on_start: true,
            },
            navbar: NavbarConfig {
                tabs,
                compact_breakpoint: 80,
            },
            storage: StorageConfig {
                preferences_file: PathBuf::from("assets/state/preferences.json"),
            },
            refresh_delay: Duration::from_millis(1500),
            debug: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::builtin()
    }
}

fn tab(label: &str, path: &str, menu: Option<NavMenu>) -> NavTab {
    NavTab {
        label: label.to_string(),
        path: path.to_string(),
        menu,
    }
}

fn link(label: &str, path: &str) -> NavLink {
    NavLink {
        label: label.to_string(),
        path: path.to_string(),
    }
}
