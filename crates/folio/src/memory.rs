//! In-memory implementations of every port.
//!
//! They record what was asked of them so the effects of a navigation or a theme change can be inspected without a
//! browser. The `check` command of the CLI drives the real router through them as well.
use std::{
    cell::{Cell, RefCell},
    future::Future,
    pin::Pin,
    task::{Context, Poll},
    time::Duration,
};

use rustc_hash::FxHashMap;

use crate::{
    errors::NavigationError,
    ports::{
        ColorScheme, FetchResponse, Fetcher, History, HistoryState, Location, NavDisplay, NavLink,
        Renderer, Storage, ThemeDisplay, Timer,
    },
};

/// Serves pages from a map. Unknown resources answer `404`.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    pages: RefCell<FxHashMap<String, Result<FetchResponse, String>>>,
    requests: RefCell<Vec<String>>,
}

impl MemoryFetcher {
    pub fn insert(&self, resource: impl Into<String>, body: impl Into<String>) {
        self.pages
            .borrow_mut()
            .insert(resource.into(), Ok(FetchResponse::ok(body)));
    }

    pub fn insert_status(&self, resource: impl Into<String>, status: u16, body: impl Into<String>) {
        self.pages.borrow_mut().insert(
            resource.into(),
            Ok(FetchResponse {
                status,
                body: body.into(),
            }),
        );
    }

    /// Makes every fetch of `resource` fail as if the network were down.
    pub fn fail(&self, resource: impl Into<String>, message: impl Into<String>) {
        self.pages
            .borrow_mut()
            .insert(resource.into(), Err(message.into()));
    }

    /// Resources fetched so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl Fetcher for MemoryFetcher {
    async fn fetch(&self, resource: &str) -> Result<FetchResponse, NavigationError> {
        self.requests.borrow_mut().push(resource.to_string());

        match self.pages.borrow().get(resource) {
            Some(Ok(response)) => Ok(response.clone()),
            Some(Err(message)) => Err(NavigationError::Transport(message.clone())),
            None => Ok(FetchResponse {
                status: 404,
                body: "Not found".into(),
            }),
        }
    }
}

/// A history stack behaving like the browser's: pushing drops every entry after the current one.
#[derive(Debug)]
pub struct MemoryHistory {
    entries: RefCell<Vec<(Option<HistoryState>, String)>>,
    index: Cell<usize>,
}

impl MemoryHistory {
    /// A history holding a single entry, without state, at `path`.
    pub fn at(path: impl Into<String>) -> Self {
        Self {
            entries: RefCell::new(vec![(None, path.into())]),
            index: Cell::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// State and path of the current entry, if the entry has state.
    pub fn current(&self) -> Option<(HistoryState, String)> {
        let entries = self.entries.borrow();
        let (state, path) = entries.get(self.index.get())?;
        state.clone().map(|state| (state, path.clone()))
    }

    /// Moves one entry back and returns its state, like the browser's back button before it fires `popstate`.
    pub fn back(&self) -> Option<HistoryState> {
        let index = self.index.get().checked_sub(1)?;
        self.index.set(index);
        self.entries.borrow()[index].0.clone()
    }

    /// Moves one entry forward and returns its state.
    pub fn forward(&self) -> Option<HistoryState> {
        let index = self.index.get() + 1;
        if index >= self.len() {
            return None;
        }
        self.index.set(index);
        self.entries.borrow()[index].0.clone()
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::at("/")
    }
}

impl History for MemoryHistory {
    fn push_state(&self, state: &HistoryState, path: &str) -> Result<(), NavigationError> {
        let mut entries = self.entries.borrow_mut();
        entries.truncate(self.index.get() + 1);
        entries.push((Some(state.clone()), path.to_string()));
        self.index.set(entries.len() - 1);
        Ok(())
    }

    fn replace_state(&self, state: &HistoryState, path: &str) -> Result<(), NavigationError> {
        let mut entries = self.entries.borrow_mut();
        let index = self.index.get();
        match entries.get_mut(index) {
            Some(entry) => *entry = (Some(state.clone()), path.to_string()),
            None => entries.push((Some(state.clone()), path.to_string())),
        }
        Ok(())
    }

    fn current_path(&self) -> String {
        self.entries
            .borrow()
            .get(self.index.get())
            .map(|(_, path)| path.clone())
            .unwrap_or_else(|| "/".to_string())
    }
}

/// Records full navigations instead of performing them.
#[derive(Debug, Default)]
pub struct MemoryLocation {
    assigned: RefCell<Vec<String>>,
}

impl MemoryLocation {
    pub fn assigned(&self) -> Vec<String> {
        self.assigned.borrow().clone()
    }
}

impl Location for MemoryLocation {
    fn assign(&self, resource: &str) {
        self.assigned.borrow_mut().push(resource.to_string());
    }
}

/// A timer that doesn't wait. A yielding timer suspends once, letting other navigations interleave.
#[derive(Debug, Default)]
pub struct ImmediateTimer {
    yielding: bool,
    sleeps: RefCell<Vec<Duration>>,
}

impl ImmediateTimer {
    pub fn yielding() -> Self {
        Self {
            yielding: true,
            ..Default::default()
        }
    }

    /// Durations requested so far.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.borrow().clone()
    }
}

impl Timer for ImmediateTimer {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.borrow_mut().push(duration);
        if self.yielding {
            YieldNow { yielded: false }.await;
        }
    }
}

struct YieldNow {
    yielded: bool,
}

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded {
            return Poll::Ready(());
        }

        self.yielded = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}

#[derive(Debug, Clone)]
struct MemoryLink {
    link: NavLink,
    html: String,
}

/// A document with an optional content region and a list of navigation links.
#[derive(Debug)]
pub struct MemoryRenderer {
    content: RefCell<Option<String>>,
    title: RefCell<String>,
    opacity: Cell<f32>,
    transitions: RefCell<Vec<String>>,
    scrolls: Cell<usize>,
    reflows: Cell<usize>,
    links: RefCell<Vec<MemoryLink>>,
    fail_writes: Cell<bool>,
}

impl Default for MemoryRenderer {
    /// A document without content region.
    fn default() -> Self {
        Self {
            content: RefCell::new(None),
            title: RefCell::new(String::new()),
            opacity: Cell::new(1.0),
            transitions: RefCell::new(Vec::new()),
            scrolls: Cell::new(0),
            reflows: Cell::new(0),
            links: RefCell::new(Vec::new()),
            fail_writes: Cell::new(false),
        }
    }
}

impl MemoryRenderer {
    pub fn with_content(html: impl Into<String>) -> Self {
        let renderer = Self::default();
        *renderer.content.borrow_mut() = Some(html.into());
        renderer
    }

    pub fn add_nav_link(&self, href: impl Into<String>, text: impl Into<String>) {
        let text = text.into();
        self.links.borrow_mut().push(MemoryLink {
            link: NavLink {
                href: Some(href.into()),
                text: text.clone(),
                emphasized: false,
            },
            html: text,
        });
    }

    /// Makes every subsequent write to the content region fail.
    pub fn fail_writes(&self) {
        self.fail_writes.set(true);
    }

    pub fn title(&self) -> String {
        self.title.borrow().clone()
    }

    pub fn opacity(&self) -> f32 {
        self.opacity.get()
    }

    /// Transitions applied by fade outs, in order.
    pub fn transitions(&self) -> Vec<String> {
        self.transitions.borrow().clone()
    }

    pub fn scrolls(&self) -> usize {
        self.scrolls.get()
    }

    pub fn reflows(&self) -> usize {
        self.reflows.get()
    }

    pub fn nav_link_html(&self, index: usize) -> Option<String> {
        self.links.borrow().get(index).map(|link| link.html.clone())
    }
}

impl Renderer for MemoryRenderer {
    fn has_content_region(&self) -> bool {
        self.content.borrow().is_some()
    }

    fn content_region(&self) -> Option<String> {
        self.content.borrow().clone()
    }

    fn set_content_region(&self, html: &str) -> Result<(), NavigationError> {
        if self.fail_writes.get() {
            return Err(NavigationError::Dom("content region is read-only".into()));
        }

        if let Some(content) = self.content.borrow_mut().as_mut() {
            *content = html.to_string();
        }
        Ok(())
    }

    fn set_title(&self, title: &str) {
        *self.title.borrow_mut() = title.to_string();
    }

    fn scroll_to_top(&self) {
        self.scrolls.set(self.scrolls.get() + 1);
    }

    fn fade_out(&self, transition: &str) -> Result<(), NavigationError> {
        self.transitions.borrow_mut().push(transition.to_string());
        self.opacity.set(0.0);
        Ok(())
    }

    fn restore_opacity(&self) -> Result<(), NavigationError> {
        if !self.has_content_region() {
            return Ok(());
        }

        self.opacity.set(0.0);
        self.reflows.set(self.reflows.get() + 1);
        self.opacity.set(1.0);
        Ok(())
    }

    fn nav_links(&self) -> Vec<NavLink> {
        self.links
            .borrow()
            .iter()
            .map(|link| link.link.clone())
            .collect()
    }

    fn set_nav_link_html(&self, index: usize, html: &str) -> Result<(), NavigationError> {
        let mut links = self.links.borrow_mut();
        let link = links
            .get_mut(index)
            .ok_or_else(|| NavigationError::Dom(format!("no navigation link at index {index}")))?;

        link.link.emphasized = html.starts_with("<b>");
        link.html = html.to_string();
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: RefCell<FxHashMap<String, String>>,
}

impl MemoryStorage {
    pub fn with_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        let storage = Self::default();
        storage.values.borrow_mut().insert(key.into(), value.into());
        storage
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }
}

/// A system color scheme that only changes when told to.
#[derive(Debug, Default)]
pub struct FixedColorScheme {
    dark: Cell<bool>,
}

impl FixedColorScheme {
    pub fn dark() -> Self {
        Self {
            dark: Cell::new(true),
        }
    }

    pub fn set_dark(&self, dark: bool) {
        self.dark.set(dark);
    }
}

impl ColorScheme for FixedColorScheme {
    fn prefers_dark(&self) -> bool {
        self.dark.get()
    }
}

#[derive(Debug, Default)]
pub struct MemoryThemeDisplay {
    dark: Cell<bool>,
    toggle: RefCell<Option<(String, String)>>,
}

impl MemoryThemeDisplay {
    /// Icon and title last written to the theme toggles.
    pub fn toggle(&self) -> Option<(String, String)> {
        self.toggle.borrow().clone()
    }
}

impl ThemeDisplay for MemoryThemeDisplay {
    fn is_dark(&self) -> bool {
        self.dark.get()
    }

    fn set_dark(&self, dark: bool) {
        self.dark.set(dark);
    }

    fn update_toggles(&self, icon: &str, title: &str) {
        *self.toggle.borrow_mut() = Some((icon.to_string(), title.to_string()));
    }
}

#[derive(Debug, Default)]
pub struct MemoryNavDisplay {
    active: Cell<bool>,
    expanded: Cell<bool>,
    label: RefCell<String>,
}

impl MemoryNavDisplay {
    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded.get()
    }

    pub fn label(&self) -> String {
        self.label.borrow().clone()
    }
}

impl NavDisplay for MemoryNavDisplay {
    fn set_links_active(&self, active: bool) {
        self.active.set(active);
    }

    fn set_expanded(&self, expanded: bool) {
        self.expanded.set(expanded);
    }

    fn set_label(&self, label: &str) {
        *self.label.borrow_mut() = label.to_string();
    }
}
