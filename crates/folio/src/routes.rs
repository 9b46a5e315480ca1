//! The fixed table of pages the router is allowed to swap in place, and the rules deciding which links it takes over.
use rustc_hash::FxHashMap;

use crate::errors::ConfigError;

/// Resource served for the site root.
pub const ROOT_FRAGMENT: &str = "index.html";

const EXTERNAL_PREFIXES: [&str; 3] = ["http://", "https://", "mailto:"];

/// The attributes of a clicked `<a>` element that matter for interception.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Anchor {
    pub href: Option<String>,
    pub target: Option<String>,
}

impl Anchor {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: Some(href.into()),
            target: None,
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }
}

/// Mapping from URL path to fragment resource name.
///
/// Built once and never mutated afterwards. Use [`RouteTable::portfolio()`] for the site's six pages, or
/// [`RouteTable::builder()`] for anything else.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: FxHashMap<String, String>,
}

impl RouteTable {
    /// The portfolio's pages: the root and five named pages.
    pub fn portfolio() -> Self {
        let routes = [
            ("/", ROOT_FRAGMENT),
            ("/index.html", ROOT_FRAGMENT),
            ("/about.html", "about.html"),
            ("/experience.html", "experience.html"),
            ("/log.html", "log.html"),
            ("/contact.html", "contact.html"),
        ]
        .into_iter()
        .map(|(path, resource)| (path.to_string(), resource.to_string()))
        .collect();

        Self { routes }
    }

    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder::default()
    }

    /// Resource name for a URL path, if the path is routed.
    pub fn resolve(&self, path: &str) -> Option<&str> {
        self.routes.get(path).map(String::as_str)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.routes.contains_key(path)
    }

    /// Whether a click on `anchor` should be handled in place instead of by the browser.
    pub fn is_internal(&self, anchor: &Anchor) -> bool {
        let Some(href) = anchor.href.as_deref() else {
            return false;
        };

        if href.is_empty()
            || EXTERNAL_PREFIXES
                .iter()
                .any(|prefix| href.starts_with(prefix))
            || href.starts_with('#')
            || anchor.target.as_deref() == Some("_blank")
        {
            return false;
        }

        self.contains(&format!("/{href}")) || self.contains(href)
    }

    /// Routes sorted by path.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        let mut routes: Vec<_> = self
            .routes
            .iter()
            .map(|(path, resource)| (path.as_str(), resource.as_str()))
            .collect();
        routes.sort_unstable();
        routes.into_iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::portfolio()
    }
}

#[derive(Debug, Default)]
pub struct RouteTableBuilder {
    routes: Vec<(String, String)>,
}

impl RouteTableBuilder {
    pub fn route(mut self, path: impl Into<String>, resource: impl Into<String>) -> Self {
        self.routes.push((path.into(), resource.into()));
        self
    }

    pub fn build(self) -> Result<RouteTable, ConfigError> {
        let mut routes = FxHashMap::default();

        for (path, resource) in self.routes {
            if !path.starts_with('/') {
                return Err(ConfigError::InvalidRoutePath { path });
            }
            routes.insert(path, resource);
        }

        Ok(RouteTable { routes })
    }
}

/// Whether `page` designates the site root, either as a path or as a resource name.
pub fn is_root(page: &str) -> bool {
    matches!(page, "" | "/" | ROOT_FRAGMENT | "/index.html")
}

/// Fragment resource for the path the page was loaded at.
pub fn resource_from_path(path: &str) -> String {
    if path.is_empty() || path == "/" {
        return ROOT_FRAGMENT.to_string();
    }

    path.strip_prefix('/').unwrap_or(path).to_string()
}

/// Resource name for a link's href, as passed to [`crate::router::Router::navigate`].
pub fn normalize_href(url: &str) -> String {
    let page = url.strip_prefix('/').unwrap_or(url);
    if page.is_empty() {
        ROOT_FRAGMENT.to_string()
    } else {
        page.to_string()
    }
}

/// URL path shown in the address bar once `resource` is displayed.
pub fn history_path(resource: &str) -> String {
    if is_root(resource) {
        "/".to_string()
    } else {
        format!("/{}", resource.trim_start_matches('/'))
    }
}
