//! Light and dark themes, remembered across visits.
//!
//! An explicit choice is stored under [`THEME_KEY`]. Until the visitor makes one, the site follows the system's
//! `prefers-color-scheme`, including when it changes while the page is open.
use std::fmt;

use log::debug;

use crate::ports::{ColorScheme, Storage, ThemeDisplay};

pub const THEME_KEY: &str = "portfolio-theme";

/// Class set on `<body>` while the dark theme is active.
pub const DARK_MODE_CLASS: &str = "dark-mode";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Reads a stored preference. Anything but `dark`, including values written by older versions of the site, is
    /// the light theme.
    pub fn from_stored(value: &str) -> Self {
        if value == Theme::Dark.as_str() {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Icon shown on the toggles: the theme a click switches to.
    pub fn toggle_icon(&self) -> &'static str {
        match self {
            Theme::Dark => "☀️",
            Theme::Light => "🌙",
        }
    }

    pub fn toggle_title(&self) -> &'static str {
        match self {
            Theme::Dark => "Switch to Light Mode",
            Theme::Light => "Switch to Dark Mode",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct ThemeSwitcher<S, C, D> {
    storage: S,
    scheme: C,
    display: D,
}

impl<S, C, D> ThemeSwitcher<S, C, D>
where
    S: Storage,
    C: ColorScheme,
    D: ThemeDisplay,
{
    pub fn new(storage: S, scheme: C, display: D) -> Self {
        Self {
            storage,
            scheme,
            display,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn scheme(&self) -> &C {
        &self.scheme
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    /// The stored preference. An empty value counts as none.
    fn stored_choice(&self) -> Option<String> {
        self.storage.get(THEME_KEY).filter(|value| !value.is_empty())
    }

    pub fn has_explicit_choice(&self) -> bool {
        self.stored_choice().is_some()
    }

    /// The stored theme, or the system's preference if none was stored.
    pub fn saved_theme(&self) -> Theme {
        match self.stored_choice() {
            Some(value) => Theme::from_stored(&value),
            None if self.scheme.prefers_dark() => Theme::Dark,
            None => Theme::Light,
        }
    }

    /// Applies the saved theme. Called once the document is ready.
    pub fn init(&self) -> Theme {
        let theme = self.saved_theme();
        self.apply(theme);
        theme
    }

    pub fn apply(&self, theme: Theme) {
        debug!("applying {} theme", theme);
        self.display.set_dark(theme == Theme::Dark);
        self.display
            .update_toggles(theme.toggle_icon(), theme.toggle_title());
    }

    /// Switches to the other theme and remembers the choice.
    pub fn toggle(&self) -> Theme {
        let current = if self.display.is_dark() {
            Theme::Dark
        } else {
            Theme::Light
        };
        let next = current.toggled();

        self.storage.set(THEME_KEY, next.as_str());
        self.apply(next);
        next
    }

    /// Follows a change of the system's color scheme, unless the visitor picked a theme. Returns the applied theme.
    pub fn on_system_change(&self, prefers_dark: bool) -> Option<Theme> {
        if self.has_explicit_choice() {
            return None;
        }

        let theme = if prefers_dark { Theme::Dark } else { Theme::Light };
        self.apply(theme);
        Some(theme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{FixedColorScheme, MemoryStorage, MemoryThemeDisplay};

    fn switcher(
        storage: MemoryStorage,
        scheme: FixedColorScheme,
    ) -> ThemeSwitcher<MemoryStorage, FixedColorScheme, MemoryThemeDisplay> {
        ThemeSwitcher::new(storage, scheme, MemoryThemeDisplay::default())
    }

    #[test]
    fn test_system_preference_applies_first() {
        let themes = switcher(MemoryStorage::default(), FixedColorScheme::dark());

        assert_eq!(themes.init(), Theme::Dark);
        assert!(themes.display().is_dark());
        assert_eq!(
            themes.display().toggle(),
            Some(("☀️".to_string(), "Switch to Light Mode".to_string()))
        );
        assert!(!themes.has_explicit_choice());
    }

    #[test]
    fn test_light_without_preference() {
        let themes = switcher(MemoryStorage::default(), FixedColorScheme::default());

        assert_eq!(themes.init(), Theme::Light);
        assert!(!themes.display().is_dark());
        assert_eq!(
            themes.display().toggle(),
            Some(("🌙".to_string(), "Switch to Dark Mode".to_string()))
        );
    }

    #[test]
    fn test_stored_choice_beats_system() {
        let themes = switcher(
            MemoryStorage::with_value(THEME_KEY, "light"),
            FixedColorScheme::dark(),
        );
        assert_eq!(themes.init(), Theme::Light);
    }

    #[test]
    fn test_unknown_stored_value_is_light() {
        let themes = switcher(
            MemoryStorage::with_value(THEME_KEY, "frutiger"),
            FixedColorScheme::dark(),
        );
        assert_eq!(themes.init(), Theme::Light);
        assert!(themes.has_explicit_choice());
    }

    #[test]
    fn test_toggle_persists_and_cycles() {
        let themes = switcher(MemoryStorage::default(), FixedColorScheme::dark());
        themes.init();

        assert_eq!(themes.toggle(), Theme::Light);
        assert_eq!(themes.storage().get(THEME_KEY).as_deref(), Some("light"));
        assert!(!themes.display().is_dark());

        assert_eq!(themes.toggle(), Theme::Dark);
        assert_eq!(themes.storage().get(THEME_KEY).as_deref(), Some("dark"));
        assert!(themes.display().is_dark());
    }

    #[test]
    fn test_system_change_followed_until_explicit_choice() {
        let themes = switcher(MemoryStorage::default(), FixedColorScheme::default());
        themes.init();

        themes.scheme().set_dark(true);
        assert_eq!(themes.on_system_change(true), Some(Theme::Dark));
        assert!(themes.display().is_dark());

        assert_eq!(themes.toggle(), Theme::Light);

        assert_eq!(themes.on_system_change(true), None);
        assert!(!themes.display().is_dark());
    }

    #[test]
    fn test_empty_stored_value_follows_system() {
        let themes = switcher(
            MemoryStorage::with_value(THEME_KEY, ""),
            FixedColorScheme::dark(),
        );

        assert!(!themes.has_explicit_choice());
        assert_eq!(themes.init(), Theme::Dark);
        assert_eq!(themes.on_system_change(false), Some(Theme::Light));
        assert!(!themes.display().is_dark());
    }
}
