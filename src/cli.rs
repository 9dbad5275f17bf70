use std::path::PathBuf;

use clap::Parser;

use crate::config::DEFAULT_CONFIG_PATH;

#[derive(Parser, Debug)]
#[command(name = "grocery-tui")]
#[command(about = "Terminal client for the grocery tracker web app")]
#[command(version)]
pub struct Cli {
    /// Client configuration; built-in defaults are used when the file is missing
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Override the server base URL from the configuration
    #[arg(long)]
    pub base_url: Option<String>,

    /// Page to open first, e.g. /mongodb/?search=milk
    #[arg(short, long, default_value = "/")]
    pub path: String,

    /// Verbose logging and toasts for background failures
    #[arg(long)]
    pub debug: bool,

    /// The terminal belongs to the UI, so logs go here
    #[arg(long, default_value = "grocery-tui.log")]
    pub log_file: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_open_the_home_page() {
        let cli = Cli::parse_from(["grocery-tui"]);
        assert_eq!(cli.path, "/");
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_PATH));
        assert!(!cli.debug);
        assert!(cli.base_url.is_none());
    }

    #[test]
    fn overrides_are_parsed() {
        let cli = Cli::parse_from([
            "grocery-tui",
            "--base-url",
            "https://groceries.example",
            "--path",
            "/mongodb/",
            "--debug",
        ]);
        assert_eq!(cli.base_url.as_deref(), Some("https://groceries.example"));
        assert_eq!(cli.path, "/mongodb/");
        assert!(cli.debug);
    }
}
