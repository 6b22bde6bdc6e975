use std::fmt;

/// Local storage key holding the chosen theme
pub const THEME_KEY: &str = "theme";

/// Body class applied in dark mode
pub const DARK_CLASS: &str = "dark-mode";

/// Media query consulted when nothing is stored
pub const PREFERS_DARK_QUERY: &str = "(prefers-color-scheme: dark)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    /// Theme to start with: the stored value if there is one, otherwise the
    /// system preference. Only the exact value `dark` selects dark mode.
    pub fn resolve(stored: Option<&str>, prefers_dark: bool) -> Self {
        match stored.filter(|value| !value.is_empty()) {
            Some("dark") => Theme::Dark,
            Some(_) => Theme::Light,
            None if prefers_dark => Theme::Dark,
            None => Theme::Light,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted theme flag
pub trait ThemeStore {
    fn load(&self) -> Option<String>;
    fn store(&mut self, theme: Theme);
}

pub fn initial_theme(store: &impl ThemeStore, prefers_dark: bool) -> Theme {
    Theme::resolve(store.load().as_deref(), prefers_dark)
}

/// Flip the theme the page is currently showing and persist the result.
pub fn toggle_theme(store: &mut impl ThemeStore, showing: Theme) -> Theme {
    let next = showing.toggled();
    store.store(next);
    next
}
