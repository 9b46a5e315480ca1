//! Capabilities the core borrows from its host.
//!
//! Every browser facility the router, the navigation toggle and the theme switcher touch is expressed as one of these
//! traits. The browser implementations live in [`crate::web`] (behind the `web` feature), the in-memory ones in
//! [`crate::memory`]. All methods take `&self`: hosts are single-threaded and keep their state behind interior
//! mutability.
#![allow(async_fn_in_trait)]

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::NavigationError;

/// State attached to each history entry created by the router.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryState {
    pub page: String,
}

impl HistoryState {
    pub fn new(page: impl Into<String>) -> Self {
        Self { page: page.into() }
    }
}

/// A fetched page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub trait Fetcher {
    /// Fetches `resource`, relative to the site root. Only transport failures are errors, any status is a response.
    async fn fetch(&self, resource: &str) -> Result<FetchResponse, NavigationError>;
}

pub trait History {
    fn push_state(&self, state: &HistoryState, path: &str) -> Result<(), NavigationError>;
    fn replace_state(&self, state: &HistoryState, path: &str) -> Result<(), NavigationError>;
    /// Path of the current location, e.g. `/about.html`.
    fn current_path(&self) -> String;
}

/// Full, conventional navigation. Used whenever an in-page swap cannot be completed.
pub trait Location {
    fn assign(&self, resource: &str);
}

pub trait Timer {
    async fn sleep(&self, duration: Duration);
}

/// A navigation link as currently displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub href: Option<String>,
    /// Visible text of the link.
    pub text: String,
    /// Whether the link currently contains a `<b>` element.
    pub emphasized: bool,
}

/// Access to the live document.
pub trait Renderer {
    fn has_content_region(&self) -> bool;
    fn content_region(&self) -> Option<String>;
    /// Replaces the inner markup of the live content region. Does nothing if the region is absent.
    fn set_content_region(&self, html: &str) -> Result<(), NavigationError>;
    fn set_title(&self, title: &str);
    fn scroll_to_top(&self);
    /// Applies `transition` to the content region and sets its opacity to zero.
    fn fade_out(&self, transition: &str) -> Result<(), NavigationError>;
    /// Brings the content region back to full opacity. Layout must be recomputed between resetting the opacity to
    /// zero and raising it to one, otherwise the browser merges both changes and no transition runs.
    fn restore_opacity(&self) -> Result<(), NavigationError>;
    fn nav_links(&self) -> Vec<NavLink>;
    fn set_nav_link_html(&self, index: usize, html: &str) -> Result<(), NavigationError>;
}

/// Persistent key/value storage, e.g. `localStorage`.
pub trait Storage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}

/// The system's `prefers-color-scheme` media query.
pub trait ColorScheme {
    fn prefers_dark(&self) -> bool;
}

/// Elements affected by the theme: the body class and every `.theme-toggle`.
pub trait ThemeDisplay {
    fn is_dark(&self) -> bool;
    fn set_dark(&self, dark: bool);
    fn update_toggles(&self, icon: &str, title: &str);
}

/// The `.nav-toggle` control and the `.nav-links` list it opens.
pub trait NavDisplay {
    fn set_links_active(&self, active: bool);
    fn set_expanded(&self, expanded: bool);
    fn set_label(&self, label: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_state_shape() {
        let state = HistoryState::new("about.html");
        assert_eq!(
            serde_json::to_value(&state).unwrap(),
            serde_json::json!({ "page": "about.html" })
        );

        let parsed: HistoryState = serde_json::from_str(r#"{"page":"log.html"}"#).unwrap();
        assert_eq!(parsed.page, "log.html");
    }

    #[test]
    fn test_response_success_range() {
        assert!(FetchResponse::ok("").is_success());
        assert!(
            FetchResponse {
                status: 204,
                body: String::new()
            }
            .is_success()
        );
        for status in [199, 301, 404, 500] {
            assert!(
                !FetchResponse {
                    status,
                    body: String::new()
                }
                .is_success()
            );
        }
    }
}
