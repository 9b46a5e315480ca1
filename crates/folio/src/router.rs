//! In-page navigation between the pages of the route table.
//!
//! The router takes over clicks on internal links, fetches the target page, swaps its content region into the live
//! document and records the move in the browser history, so back and forward keep working as with regular pages.
//! Whenever any of this cannot be completed, it gives up on the in-page swap and lets the browser navigate normally.
use std::cell::Cell;

use log::{debug, error, warn};

use crate::{
    active_link::active_link_updates,
    errors::{ConfigError, NavigationError},
    fragment::Fragment,
    options::{RouterOptions, StaleNavigation},
    ports::{Fetcher, History, HistoryState, Location, Renderer, Timer},
    routes::{Anchor, RouteTable, history_path, normalize_href, resource_from_path},
};

/// Capabilities a [`Router`] needs from its host.
pub struct Ports<F, H, R, L, T> {
    pub fetcher: F,
    pub history: H,
    pub renderer: R,
    pub location: L,
    pub timer: T,
}

/// How a call to [`Router::load_page`] ended.
#[derive(Debug)]
pub enum NavigationOutcome {
    /// The page was swapped in place.
    Rendered,
    /// The in-page swap was abandoned and the browser was sent to the page instead.
    FullReload { reason: NavigationError },
    /// A newer navigation started while this one was in flight, its response was dropped.
    Superseded,
}

impl NavigationOutcome {
    pub fn is_rendered(&self) -> bool {
        matches!(self, NavigationOutcome::Rendered)
    }
}

enum Swap {
    Done,
    Stale,
}

pub struct Router<F, H, R, L, T> {
    routes: RouteTable,
    options: RouterOptions,
    ports: Ports<F, H, R, L, T>,
    latest_navigation: Cell<u64>,
}

impl<F, H, R, L, T> Router<F, H, R, L, T>
where
    F: Fetcher,
    H: History,
    R: Renderer,
    L: Location,
    T: Timer,
{
    pub fn new(
        routes: RouteTable,
        options: RouterOptions,
        ports: Ports<F, H, R, L, T>,
    ) -> Result<Self, ConfigError> {
        options.validate()?;

        Ok(Self {
            routes,
            options,
            ports,
            latest_navigation: Cell::new(0),
        })
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn options(&self) -> &RouterOptions {
        &self.options
    }

    pub fn ports(&self) -> &Ports<F, H, R, L, T> {
        &self.ports
    }

    /// Records the page the site was opened on as the current history entry, without navigating.
    pub fn start(&self) -> Result<(), NavigationError> {
        let path = self.ports.history.current_path();
        let page = resource_from_path(&path);

        debug!("starting on `{}` ({})", page, path);
        self.ports
            .history
            .replace_state(&HistoryState::new(page), &path)
    }

    /// The href to navigate to if a click on `anchor` should be handled in place, `None` to leave it to the browser.
    pub fn internal_href<'a>(&self, anchor: &'a Anchor) -> Option<&'a str> {
        if self.routes.is_internal(anchor) {
            anchor.href.as_deref()
        } else {
            None
        }
    }

    /// Navigates to `url`, an href from the route table, and records it in the history.
    pub async fn navigate(&self, url: &str) -> NavigationOutcome {
        let page = normalize_href(url);
        self.load_page(&page, true).await
    }

    /// Renders the page stored in a popped history entry. The browser already moved through the history, so nothing is
    /// pushed. Entries without a page, like the ones the browser creates for in-page anchors, are ignored.
    pub async fn handle_pop(&self, state: Option<&HistoryState>) -> Option<NavigationOutcome> {
        let state = state.filter(|state| !state.page.is_empty())?;
        Some(self.load_page(&state.page, false).await)
    }

    /// Swaps `resource` into the page, falling back to a full navigation if anything goes wrong.
    pub async fn load_page(&self, resource: &str, record_history: bool) -> NavigationOutcome {
        let navigation = self.latest_navigation.get() + 1;
        self.latest_navigation.set(navigation);

        match self.swap_page(resource, record_history, navigation).await {
            Ok(Swap::Done) => {
                debug!("rendered `{}` in place", resource);
                NavigationOutcome::Rendered
            }
            Ok(Swap::Stale) => {
                debug!("dropped `{}`, a newer navigation is in progress", resource);
                NavigationOutcome::Superseded
            }
            Err(reason) if self.is_stale(navigation) => {
                debug!("dropped `{}` ({}), a newer navigation is in progress", resource, reason);
                NavigationOutcome::Superseded
            }
            Err(reason) => {
                if reason.is_degradation() {
                    warn!("{}, falling back to a full page load", reason);
                } else {
                    error!("Error loading `{}`: {}", resource, reason);
                }

                self.ports.location.assign(resource);
                NavigationOutcome::FullReload { reason }
            }
        }
    }

    async fn swap_page(
        &self,
        resource: &str,
        record_history: bool,
        navigation: u64,
    ) -> Result<Swap, NavigationError> {
        let Ports {
            fetcher,
            history,
            renderer,
            timer,
            ..
        } = &self.ports;

        if renderer.has_content_region() {
            renderer.fade_out(&self.options.fade_transition)?;
            timer.sleep(self.options.fade_delay).await;
        }

        let response = fetcher.fetch(resource).await?;
        if !response.is_success() {
            return Err(NavigationError::Retrieval {
                status: response.status,
            });
        }

        let fragment = Fragment::parse(&response.body, &self.options.content_id)?;
        let Some(content) = fragment.content else {
            return Err(NavigationError::MissingContentRegion {
                resource: resource.to_string(),
            });
        };

        if self.is_stale(navigation) {
            return Ok(Swap::Stale);
        }

        renderer.set_content_region(&content)?;

        if let Some(title) = fragment.title {
            renderer.set_title(&title);
        }

        self.update_active_links(resource)?;
        renderer.scroll_to_top();
        renderer.restore_opacity()?;

        if record_history {
            history.push_state(&HistoryState::new(resource), &history_path(resource))?;
        }

        Ok(Swap::Done)
    }

    /// Whether `navigation` was overtaken by a newer one and its result should be dropped.
    fn is_stale(&self, navigation: u64) -> bool {
        self.options.stale_navigation == StaleNavigation::Discard
            && navigation != self.latest_navigation.get()
    }

    fn update_active_links(&self, resource: &str) -> Result<(), NavigationError> {
        let renderer = &self.ports.renderer;

        for update in active_link_updates(&renderer.nav_links(), resource) {
            renderer.set_nav_link_html(update.index, &update.html)?;
        }

        Ok(())
    }
}
