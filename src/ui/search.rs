use std::time::{Duration, Instant};

use reqwest::Url;

use crate::config::SearchConfig;
use crate::error::{AppError, Result};

pub const SEARCH_PARAM: &str = "search";

/// What a settled search box asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchTrigger {
    Query(String),
    Clear,
}

#[derive(Debug)]
struct Pending {
    value: String,
    fire_at: Instant,
}

/// Holds keystrokes back until the input has been quiet for a full window.
#[derive(Debug)]
pub struct SearchDebouncer {
    quiet: Duration,
    min_length: usize,
    value: String,
    pending: Option<Pending>,
}

impl SearchDebouncer {
    pub fn with_initial(config: &SearchConfig, value: &str) -> Self {
        Self {
            quiet: config.quiet,
            min_length: config.min_length,
            value: value.to_string(),
            pending: None,
        }
    }

    /// Current contents of the search box.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Record the new box contents and restart the quiet window.
    pub fn input(&mut self, value: impl Into<String>, now: Instant) {
        self.value = value.into();
        self.pending = Some(Pending {
            value: self.value.clone(),
            fire_at: now + self.quiet,
        });
    }

    pub fn push_char(&mut self, ch: char, now: Instant) {
        let mut value = self.value.clone();
        value.push(ch);
        self.input(value, now);
    }

    pub fn backspace(&mut self, now: Instant) {
        let mut value = self.value.clone();
        if value.pop().is_some() {
            self.input(value, now);
        }
    }

    /// Drop any pending trigger without firing it.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Fire once the quiet window has elapsed. Short queries are swallowed.
    pub fn poll(&mut self, now: Instant) -> Option<SearchTrigger> {
        if self.pending.as_ref()?.fire_at > now {
            return None;
        }
        let pending = self.pending.take()?;
        self.classify(&pending.value)
    }

    /// Fire immediately, skipping the quiet window (Enter in the search box).
    pub fn flush(&mut self) -> Option<SearchTrigger> {
        self.pending = None;
        let value = self.value.clone();
        self.classify(&value)
    }

    fn classify(&self, value: &str) -> Option<SearchTrigger> {
        let query = value.trim();
        if query.is_empty() {
            Some(SearchTrigger::Clear)
        } else if query.chars().count() < self.min_length {
            log::debug!("search `{query}` below minimum length {}", self.min_length);
            None
        } else {
            Some(SearchTrigger::Query(query.to_string()))
        }
    }
}

/// Rewrite `path` so that its `search` parameter reflects `trigger`, keeping other parameters.
pub fn navigate_path(path: &str, trigger: &SearchTrigger) -> Result<String> {
    let base = Url::parse("http://localhost/")
        .map_err(|err| AppError::message(format!("Invalid search base: {err}")))?;
    let mut url = base
        .join(path)
        .map_err(|err| AppError::message(format!("Invalid path `{path}`: {err}")))?;

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != SEARCH_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    url.set_query(None);
    url.set_fragment(None);
    if !kept.is_empty() || matches!(trigger, SearchTrigger::Query(_)) {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in &kept {
            pairs.append_pair(key, value);
        }
        if let SearchTrigger::Query(query) = trigger {
            pairs.append_pair(SEARCH_PARAM, query);
        }
    }

    Ok(match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    })
}

/// The `search` parameter carried by `path`, if any.
pub fn search_param(path: &str) -> Option<String> {
    let url = Url::parse("http://localhost/").ok()?.join(path).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == SEARCH_PARAM)
        .map(|(_, value)| value.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchMode;

    fn config() -> SearchConfig {
        SearchConfig {
            mode: SearchMode::Navigate,
            quiet: Duration::from_millis(300),
            min_length: 2,
        }
    }

    #[test]
    fn typing_milk_quickly_fires_once_with_full_word() {
        let start = Instant::now();
        let mut debouncer = SearchDebouncer::with_initial(&config(), "");

        for (offset, ch) in "milk".chars().enumerate() {
            let now = start + Duration::from_millis(60 * offset as u64);
            debouncer.push_char(ch, now);
            assert_eq!(debouncer.poll(now), None);
        }

        let last = start + Duration::from_millis(180);
        assert_eq!(debouncer.poll(last + Duration::from_millis(299)), None);
        assert_eq!(
            debouncer.poll(last + Duration::from_millis(300)),
            Some(SearchTrigger::Query("milk".to_string()))
        );
        assert_eq!(debouncer.poll(last + Duration::from_secs(5)), None);
    }

    #[test]
    fn n_keystrokes_in_window_produce_one_trigger_with_last_value() {
        let start = Instant::now();
        let mut debouncer = SearchDebouncer::with_initial(&config(), "");
        let values = ["ap", "app", "appl", "apple", "apples"];
        let mut fired = Vec::new();

        let mut now = start;
        for value in values {
            debouncer.input(value, now);
            fired.extend(debouncer.poll(now));
            now += Duration::from_millis(100);
        }
        now += Duration::from_millis(300);
        fired.extend(debouncer.poll(now));

        assert_eq!(fired, vec![SearchTrigger::Query("apples".to_string())]);
    }

    #[test]
    fn empty_input_clears() {
        let now = Instant::now();
        let mut debouncer = SearchDebouncer::with_initial(&config(), "milk");
        debouncer.input("   ", now);
        assert_eq!(
            debouncer.poll(now + Duration::from_millis(300)),
            Some(SearchTrigger::Clear)
        );
    }

    #[test]
    fn short_queries_are_suppressed() {
        let now = Instant::now();
        let mut debouncer = SearchDebouncer::with_initial(&config(), "");
        debouncer.input("m", now);
        assert_eq!(debouncer.poll(now + Duration::from_secs(1)), None);
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn flush_skips_the_quiet_window() {
        let now = Instant::now();
        let mut debouncer = SearchDebouncer::with_initial(&config(), "");
        debouncer.input("eggs", now);
        assert_eq!(
            debouncer.flush(),
            Some(SearchTrigger::Query("eggs".to_string()))
        );
        assert_eq!(debouncer.poll(now + Duration::from_secs(1)), None);
    }

    #[test]
    fn backspace_restarts_window() {
        let start = Instant::now();
        let mut debouncer = SearchDebouncer::with_initial(&config(), "milks");
        debouncer.backspace(start);
        assert_eq!(debouncer.value(), "milk");
        assert!(debouncer.is_pending());
    }

    #[test]
    fn navigate_path_sets_and_removes_search_param() {
        let query = SearchTrigger::Query("oat milk".to_string());
        assert_eq!(
            navigate_path("/mongodb/", &query).unwrap(),
            "/mongodb/?search=oat+milk"
        );
        assert_eq!(
            navigate_path("/mongodb/?category=dairy&search=old", &query).unwrap(),
            "/mongodb/?category=dairy&search=oat+milk"
        );
        assert_eq!(
            navigate_path("/mongodb/?search=old", &SearchTrigger::Clear).unwrap(),
            "/mongodb/"
        );
        assert_eq!(
            navigate_path("/mongodb/?category=dairy&search=old", &SearchTrigger::Clear).unwrap(),
            "/mongodb/?category=dairy"
        );
    }

    #[test]
    fn reads_search_param_back() {
        assert_eq!(search_param("/mongodb/?search=oat+milk").as_deref(), Some("oat milk"));
        assert_eq!(search_param("/mongodb/"), None);
    }
}
