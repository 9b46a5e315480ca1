use std::time::Duration;

use crate::errors::ConfigError;

/// Router options. Should be passed to [`Router::new()`](crate::router::Router::new()).
///
/// ## Examples
/// Default values:
/// ```rust
/// use folio::RouterOptions;
///
/// let options = RouterOptions::default();
/// assert_eq!(options.content_id, "page-content");
/// ```
/// Custom values:
/// ```rust
/// use std::time::Duration;
/// use folio::{RouterOptions, StaleNavigation};
///
/// let options = RouterOptions {
///     fade_delay: Duration::from_millis(120),
///     fade_transition: "opacity 0.12s ease-out".into(),
///     stale_navigation: StaleNavigation::Discard,
///     ..Default::default()
/// };
/// assert!(options.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct RouterOptions {
    /// Id of the element whose inner markup is swapped between pages, both in the live page and in fetched ones.
    pub content_id: String,

    /// Class of the navigation links that get bolded when their page is displayed.
    pub nav_link_class: String,

    /// CSS `transition` applied to the content region before fading it out.
    pub fade_transition: String,

    /// How long to wait after starting the fade out before fetching. Should match `fade_transition`.
    pub fade_delay: Duration,

    /// What to do with a page that finishes loading after a newer navigation started.
    pub stale_navigation: StaleNavigation,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StaleNavigation {
    /// Render every response as it arrives, the last one to resolve wins.
    #[default]
    Apply,
    /// Drop responses belonging to a navigation that has since been superseded.
    Discard,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            content_id: "page-content".into(),
            nav_link_class: "nav-link".into(),
            fade_transition: "opacity 0.05s ease-out".into(),
            fade_delay: Duration::from_millis(50),
            stale_navigation: StaleNavigation::Apply,
        }
    }
}

impl RouterOptions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_identifier("content id", &self.content_id)?;
        check_identifier("nav link class", &self.nav_link_class)
    }

    /// CSS selector matching the content region.
    pub fn content_selector(&self) -> String {
        format!("#{}", self.content_id)
    }

    /// CSS selector matching the navigation links.
    pub fn nav_link_selector(&self) -> String {
        format!(".{}", self.nav_link_class)
    }
}

fn check_identifier(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if is_css_identifier(value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidIdentifier {
            field,
            value: value.to_string(),
        })
    }
}

/// A deliberately narrow subset of CSS identifiers, enough for ids and classes written by hand.
pub(crate) fn is_css_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' || first == '-' => {}
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_are_valid() {
        assert!(RouterOptions::default().validate().is_ok());
    }

    #[test]
    fn test_selectors() {
        let options = RouterOptions::default();
        assert_eq!(options.content_selector(), "#page-content");
        assert_eq!(options.nav_link_selector(), ".nav-link");
    }

    #[test]
    fn test_invalid_content_id() {
        for id in ["", "9lives", "page content", "main>div", "#page-content"] {
            let options = RouterOptions {
                content_id: id.into(),
                ..Default::default()
            };
            assert!(
                matches!(
                    options.validate(),
                    Err(ConfigError::InvalidIdentifier { field: "content id", .. })
                ),
                "{id:?}"
            );
        }
    }

    #[test]
    fn test_invalid_nav_link_class() {
        let options = RouterOptions {
            nav_link_class: "nav link".into(),
            ..Default::default()
        };
        assert!(options.validate().is_err());
    }
}
