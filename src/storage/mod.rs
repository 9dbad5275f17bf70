pub mod preferences;
pub mod watch;

pub use preferences::{origin_of, PreferenceStore, ACTIVE_TAB_KEY, THEME_KEY};
pub use watch::{watch_preferences, PreferenceWatcher};
