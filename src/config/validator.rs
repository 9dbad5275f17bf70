use std::collections::HashSet;
use std::time::Duration;

use reqwest::Url;

use crate::error::{AppError, Result};

use super::{ApiConfig, Config, NavTab, NotificationConfig, SearchConfig, SessionConfig};

const MAX_REFRESH_DELAY: Duration = Duration::from_secs(60);

/// Validate the resolved configuration and surface every problem at once.
pub fn validate_config(config: &Config) -> Result<()> {
    let mut issues = Vec::new();

    validate_api(&config.api, &mut issues);
    validate_session(&config.session, &mut issues);
    validate_search(&config.search, &mut issues);
    validate_notifications(&config.notifications, &mut issues);
    validate_tabs(&config.navbar.tabs, &mut issues);

    if config.refresh_delay > MAX_REFRESH_DELAY {
        issues.push(format!(
            "refresh_delay_ms must not exceed {} ms",
            MAX_REFRESH_DELAY.as_millis()
        ));
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(AppError::message(format!(
            "configuration invalid:\n  - {}",
            issues.join("\n  - ")
        )))
    }
}

fn validate_api(api: &ApiConfig, issues: &mut Vec<String>) {
    match Url::parse(&api.base_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => issues.push(format!(
            "api.base_url must use http or https, found `{}`",
            url.scheme()
        )),
        Err(err) => issues.push(format!("api.base_url `{}` is invalid: {err}", api.base_url)),
    }

    if !api.csrf_page.starts_with('/') {
        issues.push("api.csrf_page must be an absolute path".to_string());
    }

    if api.timeout.is_zero() {
        issues.push("api.timeout_secs must be greater than zero".to_string());
    }
}

fn validate_session(session: &SessionConfig, issues: &mut Vec<String>) {
    if session.length.is_zero() {
        issues.push("session.length_secs must be greater than zero".to_string());
    }
    if session.warning_lead >= session.length {
        issues.push(format!(
            "session.warning_lead_secs ({}) must be shorter than session.length_secs ({})",
            session.warning_lead.as_secs(),
            session.length.as_secs()
        ));
    }
}

fn validate_search(search: &SearchConfig, issues: &mut Vec<String>) {
    if search.quiet.is_zero() {
        issues.push("search.quiet_ms must be greater than zero".to_string());
    }
    if search.min_length == 0 {
        issues.push("search.min_length must be at least 1".to_string());
    }
}

fn validate_notifications(notifications: &NotificationConfig, issues: &mut Vec<String>) {
    if notifications.default_duration.is_zero() || notifications.server_duration.is_zero() {
        issues.push("notification durations must be greater than zero".to_string());
    }
}

fn validate_tabs(tabs: &[NavTab], issues: &mut Vec<String>) {
    if tabs.is_empty() {
        issues.push("navbar.tabs must define at least one tab".to_string());
        return;
    }

    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();

    for tab in tabs {
        if tab.label.trim().is_empty() {
            issues.push(format!("navbar tab `{}` has an empty label", tab.path));
        }
        if !is_valid_path(&tab.path) {
            issues.push(format!(
                "navbar tab `{}` path `{}` must start with `/` or be `#`",
                tab.label, tab.path
            ));
        }
        if tab.path != "#" && !seen.insert(tab.path.as_str()) {
            duplicates.push(tab.path.clone());
        }

        if let Some(menu) = &tab.menu {
            if menu.links.is_empty() {
                issues.push(format!("navbar tab `{}` menu has no links", tab.label));
            }
            for link in &menu.links {
                if !is_valid_path(&link.path) {
                    issues.push(format!(
                        "menu link `{}` path `{}` must start with `/` or be `#`",
                        link.label, link.path
                    ));
                }
            }
        }
    }

    if !duplicates.is_empty() {
        issues.push(format!(
            "navbar.tabs contains duplicate paths: {}",
            duplicates.join(", ")
        ));
    }
}

fn is_valid_path(path: &str) -> bool {
    path == "#" || path.starts_with('/')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{NavLink, NavMenu, MenuKind};

    #[test]
    fn builtin_config_is_valid() {
        validate_config(&Config::builtin()).expect("builtin config should be valid");
    }

    #[test]
    fn rejects_warning_lead_longer_than_session() {
        let mut config = Config::builtin();
        config.session.warning_lead = config.session.length;

        let err = validate_config(&config).expect_err("validation should fail");
        assert!(
            err.to_string().contains("must be shorter"),
            "unexpected error message: {err}"
        );
    }

    #[test]
    fn rejects_non_http_base_url() {
        let mut config = Config::builtin();
        config.api.base_url = "ftp://groceries.local".to_string();

        let err = validate_config(&config).expect_err("validation should fail");
        assert!(err.to_string().contains("http or https"), "{err}");
    }

    #[test]
    fn reports_duplicate_tabs_and_empty_menus_together() {
        let mut config = Config::builtin();
        config.navbar.tabs.push(NavTab {
            label: "Again".to_string(),
            path: "/dashboard/".to_string(),
            menu: Some(NavMenu {
                kind: MenuKind::Dropdown,
                links: Vec::<NavLink>::new(),
            }),
        });

        let err = validate_config(&config).expect_err("validation should fail");
        let message = err.to_string();
        assert!(message.contains("duplicate paths: /dashboard/"), "{message}");
        assert!(message.contains("menu has no links"), "{message}");
    }

    #[test]
    fn rejects_zero_min_length() {
        let mut config = Config::builtin();
        config.search.min_length = 0;
        assert!(validate_config(&config).is_err());
    }
}
