use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use reqwest::Url;

use crate::error::{AppError, Context, Result};

pub const THEME_KEY: &str = "theme";
pub const ACTIVE_TAB_KEY: &str = "activeTab";

type OriginEntries = BTreeMap<String, String>;

/// Durable key-value preferences, partitioned by API origin.
///
/// The file holds one JSON object per origin so several servers can be used
/// from the same machine without their preferences bleeding into each other.
#[derive(Debug)]
pub struct PreferenceStore {
    path: PathBuf,
    origin: String,
    documents: BTreeMap<String, OriginEntries>,
}

impl PreferenceStore {
    /// Open the store at `path` for `origin`. A missing file yields an empty store.
    pub fn open(path: impl Into<PathBuf>, origin: impl Into<String>) -> Result<Self> {
        let path = path.into();
        let documents = read_documents(&path)?;
        Ok(Self {
            path,
            origin: origin.into(),
            documents,
        })
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.documents
            .get(&self.origin)
            .and_then(|entries| entries.get(key))
            .map(String::as_str)
    }

    /// Store a value and write the whole document back to disk.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        self.documents
            .entry(self.origin.clone())
            .or_default()
            .insert(key.to_string(), value.into());
        self.persist()
    }

    /// Re-read the file, picking up writes made by other client instances.
    pub fn reload(&mut self) -> Result<()> {
        self.documents = read_documents(&self.path)?;
        Ok(())
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create preferences directory {:?}", parent)
                })?;
            }
        }

        let json = serde_json::to_string_pretty(&self.documents)
            .context("Failed to serialize preferences")?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write preferences file {:?}", self.path))?;
        Ok(())
    }
}

/// Scheme, host and port of `base_url`, used as the partition key.
pub fn origin_of(base_url: &str) -> Result<String> {
    let url = Url::parse(base_url)
        .map_err(|err| AppError::message(format!("Invalid base URL `{base_url}`: {err}")))?;
    Ok(url.origin().ascii_serialization())
}

fn read_documents(path: &Path) -> Result<BTreeMap<String, OriginEntries>> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }

    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read preferences file {:?}", path))?;
    if data.trim().is_empty() {
        return Ok(BTreeMap::new());
    }

    let documents = serde_json::from_str(&data)
        .with_context(|| format!("Failed to parse preferences file {:?}", path))?;
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = PreferenceStore::open(dir.path().join("prefs.json"), "http://a").expect("open");
        assert_eq!(store.get(THEME_KEY), None);
    }

    #[test]
    fn values_survive_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("prefs.json");

        let mut store = PreferenceStore::open(&path, "http://a").expect("open");
        store.set(THEME_KEY, "dark").expect("set theme");
        store.set(ACTIVE_TAB_KEY, "/dashboard/").expect("set tab");

        let reopened = PreferenceStore::open(&path, "http://a").expect("reopen");
        assert_eq!(reopened.get(THEME_KEY), Some("dark"));
        assert_eq!(reopened.get(ACTIVE_TAB_KEY), Some("/dashboard/"));
    }

    #[test]
    fn origins_are_isolated() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("prefs.json");

        let mut first = PreferenceStore::open(&path, "http://a").expect("open a");
        first.set(THEME_KEY, "dark").expect("set");

        let mut second = PreferenceStore::open(&path, "http://b").expect("open b");
        assert_eq!(second.get(THEME_KEY), None);
        second.set(THEME_KEY, "light").expect("set");

        first.reload().expect("reload");
        assert_eq!(first.get(THEME_KEY), Some("dark"));
    }

    #[test]
    fn origin_ignores_path_and_query() {
        let origin = origin_of("https://groceries.example.com:8443/app/?x=1").expect("origin");
        assert_eq!(origin, "https://groceries.example.com:8443");
        assert!(origin_of("not a url").is_err());
    }
}
