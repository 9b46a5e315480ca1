//! Error types for folio.
use std::fmt::{self, Debug, Formatter};
use thiserror::Error;

macro_rules! impl_debug_for_error {
    ($($t:ty),*) => {
        $(
            impl Debug for $t {
                fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                    // Errors returned from `main` are shown through Debug, thiserror only implements Display.
                    write!(f, "{}", self)
                }
            }
        )*
    };
}

/// Everything that can make an in-page navigation fail.
///
/// None of these ever reach the visitor: the router turns every one of them into a full navigation to the
/// requested resource.
#[derive(Error)]
pub enum NavigationError {
    #[error("Server answered with status {status}")]
    Retrieval { status: u16 },

    #[error("Failed to fetch the page: {0}")]
    Transport(String),

    #[error("Could not parse the fetched page: {0}")]
    MalformedDocument(String),

    #[error("`{resource}` has no content region")]
    MissingContentRegion { resource: String },

    #[error("Failed to update the page: {0}")]
    Dom(String),
}

impl NavigationError {
    /// Whether this is the expected degradation for pages that don't use the fragment layout, as opposed to a real
    /// failure.
    pub fn is_degradation(&self) -> bool {
        matches!(self, NavigationError::MissingContentRegion { .. })
    }
}

impl From<lol_html::errors::RewritingError> for NavigationError {
    fn from(err: lol_html::errors::RewritingError) -> Self {
        NavigationError::MalformedDocument(err.to_string())
    }
}

#[derive(Error)]
pub enum ConfigError {
    #[error(
        "`{value}` is not a valid {field}. Only ASCII letters, digits, `-` and `_` are allowed, and it must not start with a digit."
    )]
    InvalidIdentifier { field: &'static str, value: String },

    #[error("A route path must start with `/`, got `{path}`")]
    InvalidRoutePath { path: String },
}

#[derive(Error, Debug)]
pub enum FolioError {
    #[error(transparent)]
    Navigation(#[from] NavigationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl_debug_for_error!(NavigationError, ConfigError);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_matches_display() {
        let err = NavigationError::Retrieval { status: 404 };
        assert_eq!(format!("{:?}", err), "Server answered with status 404");
    }

    #[test]
    fn test_only_missing_region_is_degradation() {
        assert!(
            NavigationError::MissingContentRegion {
                resource: "log.html".into()
            }
            .is_degradation()
        );
        assert!(!NavigationError::Retrieval { status: 500 }.is_degradation());
        assert!(!NavigationError::Transport("offline".into()).is_degradation());
    }
}
