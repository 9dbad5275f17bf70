use std::time::Instant;

use crate::api::ApiClient;
use crate::app::controller::{AppController, ExitReason};
use crate::app::state::PageState;
use crate::cli::Cli;
use crate::config::{load_config, validate_config, Config};
use crate::error::Result;
use crate::storage::{origin_of, PreferenceStore};

/// Entry point used by `main`: resolve configuration, build the page and run it.
pub async fn run(cli: &Cli) -> Result<ExitReason> {
    let config = resolve_config(cli)?;
    let client = ApiClient::new(&config.api)?;
    let origin = origin_of(&config.api.base_url)?;
    let preferences = PreferenceStore::open(config.storage.preferences_file.clone(), origin)?;

    let path = start_path(&cli.path);
    log::info!(
        "Starting at {}{path} (session cookie: {})",
        config.api.base_url,
        client.has_session()
    );
    let state = PageState::new(
        &config,
        preferences,
        &path,
        client.has_session(),
        Instant::now(),
    );

    AppController::new(client, state, config.storage.preferences_file.clone())
        .run()
        .await
}

/// Layer command-line overrides over the loaded file and validate the result.
fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = load_config(&cli.config)?;
    if let Some(base_url) = &cli.base_url {
        config.api.base_url = base_url.trim_end_matches('/').to_string();
    }
    if cli.debug {
        config.debug = true;
    }
    validate_config(&config)?;
    Ok(config)
}

fn start_path(raw: &str) -> String {
    let raw = raw.trim();
    if raw.starts_with('/') {
        raw.to_string()
    } else {
        format!("/{raw}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn start_path_is_rooted() {
        assert_eq!(start_path("mongodb/"), "/mongodb/");
        assert_eq!(start_path(" /dashboard/ "), "/dashboard/");
        assert_eq!(start_path(""), "/");
    }

    #[test]
    fn cli_overrides_config_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cli = Cli::parse_from([
            "grocery-tui",
            "--config",
            dir.path().join("missing.json").to_str().expect("utf-8 path"),
            "--base-url",
            "https://groceries.example",
            "--debug",
        ]);

        let config = resolve_config(&cli).expect("config resolves");
        assert_eq!(config.api.base_url, "https://groceries.example");
        assert!(config.debug);
    }

    #[test]
    fn invalid_base_url_override_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cli = Cli::parse_from([
            "grocery-tui",
            "--config",
            dir.path().join("missing.json").to_str().expect("utf-8 path"),
            "--base-url",
            "not a url",
        ]);
        assert!(resolve_config(&cli).is_err());
    }
}
