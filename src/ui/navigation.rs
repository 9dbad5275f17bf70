use super::navbar::normalize_path;

pub const DASHBOARD_PATH: &str = "/dashboard/";
pub const PROFILE_PATH: &str = "/accounts/profile/";
pub const LOGOUT_PATH: &str = "/accounts/logout/";

/// Screens the client can draw for a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Overview,
    Inventory,
    Settings,
    Profile,
}

impl Screen {
    pub fn for_path(path: &str) -> Self {
        let path = normalize_path(path);
        if path.starts_with("/mongodb/") {
            Screen::Inventory
        } else if path.starts_with("/accounts/settings/") {
            Screen::Settings
        } else if path.starts_with("/accounts/") {
            Screen::Profile
        } else {
            Screen::Overview
        }
    }

    /// Human readable label used by headers and logs.
    pub fn title(self) -> &'static str {
        match self {
            Screen::Overview => "Overview",
            Screen::Inventory => "Groceries",
            Screen::Settings => "Settings",
            Screen::Profile => "Profile",
        }
    }
}

/// Entries on the settings screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsEntry {
    Theme,
    Notifications,
}

impl SettingsEntry {
    pub const ALL: [SettingsEntry; 2] = [SettingsEntry::Theme, SettingsEntry::Notifications];

    pub fn label(self) -> &'static str {
        match self {
            SettingsEntry::Theme => "Theme",
            SettingsEntry::Notifications => "Notifications",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_pick_screens() {
        assert_eq!(Screen::for_path("/"), Screen::Overview);
        assert_eq!(Screen::for_path("/reports/"), Screen::Overview);
        assert_eq!(Screen::for_path("/mongodb/?search=milk"), Screen::Inventory);
        assert_eq!(Screen::for_path("/accounts/settings/"), Screen::Settings);
        assert_eq!(Screen::for_path(PROFILE_PATH), Screen::Profile);
    }
}
