//! Browser implementations of the ports, and the wiring of the page's event listeners.
//!
//! Built with the `web` feature for `wasm32-unknown-unknown`. Loading the module runs [`start()`], which mounts the
//! navigation toggle, the theme switcher and the router once the document is ready.
use std::{rc::Rc, time::Duration};

use log::{Level, LevelFilter, Log, Metadata, Record};
use wasm_bindgen::{JsCast, prelude::*};
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{
    Document, Element, HtmlElement, MediaQueryList, MediaQueryListEvent,
    MouseEvent, PopStateEvent, Window, console,
};

use crate::{
    errors::NavigationError,
    nav::NavToggle,
    options::RouterOptions,
    ports::{
        ColorScheme, FetchResponse, Fetcher, History, HistoryState, Location, NavDisplay, NavLink,
        Renderer, Storage, ThemeDisplay, Timer,
    },
    router::{Ports, Router},
    routes::{Anchor, RouteTable},
    theme::{DARK_MODE_CLASS, ThemeSwitcher},
};

fn describe(value: JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

fn transport(value: JsValue) -> NavigationError {
    NavigationError::Transport(describe(value))
}

fn dom(value: JsValue) -> NavigationError {
    NavigationError::Dom(describe(value))
}

pub struct BrowserFetcher {
    window: Window,
}

impl Fetcher for BrowserFetcher {
    async fn fetch(&self, resource: &str) -> Result<FetchResponse, NavigationError> {
        let response: web_sys::Response = JsFuture::from(self.window.fetch_with_str(resource))
            .await
            .map_err(transport)?
            .dyn_into()
            .map_err(transport)?;

        let body = JsFuture::from(response.text().map_err(transport)?)
            .await
            .map_err(transport)?;

        Ok(FetchResponse {
            status: response.status(),
            body: body.as_string().unwrap_or_default(),
        })
    }
}

pub struct BrowserHistory {
    window: Window,
}

impl BrowserHistory {
    fn history(&self) -> Result<web_sys::History, NavigationError> {
        self.window.history().map_err(dom)
    }
}

impl History for BrowserHistory {
    fn push_state(&self, state: &HistoryState, path: &str) -> Result<(), NavigationError> {
        let state = serde_wasm_bindgen::to_value(state)
            .map_err(|err| NavigationError::Dom(err.to_string()))?;
        self.history()?
            .push_state_with_url(&state, "", Some(path))
            .map_err(dom)
    }

    fn replace_state(&self, state: &HistoryState, path: &str) -> Result<(), NavigationError> {
        let state = serde_wasm_bindgen::to_value(state)
            .map_err(|err| NavigationError::Dom(err.to_string()))?;
        self.history()?
            .replace_state_with_url(&state, "", Some(path))
            .map_err(dom)
    }

    fn current_path(&self) -> String {
        self.window
            .location()
            .pathname()
            .unwrap_or_else(|_| "/".to_string())
    }
}

pub struct BrowserLocation {
    window: Window,
}

impl Location for BrowserLocation {
    fn assign(&self, resource: &str) {
        if let Err(err) = self.window.location().set_href(resource) {
            log::error!("Could not navigate to `{}`: {}", resource, describe(err));
        }
    }
}

pub struct BrowserTimer {
    window: Window,
}

impl Timer for BrowserTimer {
    async fn sleep(&self, duration: Duration) {
        let millis = i32::try_from(duration.as_millis()).unwrap_or(i32::MAX);
        let promise = js_sys::Promise::new(&mut |resolve, _reject| {
            let scheduled = self
                .window
                .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, millis);
            resolve_unless_scheduled(scheduled, &resolve);
        });
        let _ = JsFuture::from(promise).await;
    }
}

/// Resolves right away when the timeout could not be scheduled, so the navigation goes on without the delay.
fn resolve_unless_scheduled(scheduled: Result<i32, JsValue>, resolve: &js_sys::Function) {
    if let Err(err) = scheduled {
        log::warn!("Could not schedule the fade delay: {}", describe(err));
        let _ = resolve.call0(&JsValue::UNDEFINED);
    }
}

pub struct DomRenderer {
    window: Window,
    document: Document,
    content_id: String,
    nav_link_selector: String,
}

impl DomRenderer {
    fn content(&self) -> Option<HtmlElement> {
        self.document
            .get_element_by_id(&self.content_id)
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    }

    fn link_elements(&self) -> Vec<Element> {
        query_all(&self.document, &self.nav_link_selector)
    }
}

impl Renderer for DomRenderer {
    fn has_content_region(&self) -> bool {
        self.content().is_some()
    }

    fn content_region(&self) -> Option<String> {
        self.content().map(|el| el.inner_html())
    }

    fn set_content_region(&self, html: &str) -> Result<(), NavigationError> {
        if let Some(content) = self.content() {
            content.set_inner_html(html);
        }
        Ok(())
    }

    fn set_title(&self, title: &str) {
        self.document.set_title(title);
    }

    fn scroll_to_top(&self) {
        self.window.scroll_to_with_x_and_y(0.0, 0.0);
    }

    fn fade_out(&self, transition: &str) -> Result<(), NavigationError> {
        let Some(content) = self.content() else {
            return Ok(());
        };

        let style = content.style();
        style.set_property("transition", transition).map_err(dom)?;
        style.set_property("opacity", "0").map_err(dom)
    }

    fn restore_opacity(&self) -> Result<(), NavigationError> {
        let Some(content) = self.content() else {
            return Ok(());
        };

        let style = content.style();
        style.set_property("opacity", "0").map_err(dom)?;
        // Reading a layout property flushes the pending style change.
        let _ = content.offset_height();
        style.set_property("opacity", "1").map_err(dom)
    }

    fn nav_links(&self) -> Vec<NavLink> {
        self.link_elements()
            .into_iter()
            .map(|link| {
                let text = match link.dyn_ref::<HtmlElement>() {
                    Some(html) => html.inner_text(),
                    None => link.text_content().unwrap_or_default(),
                };

                NavLink {
                    href: link.get_attribute("href"),
                    text,
                    emphasized: link.query_selector("b").ok().flatten().is_some(),
                }
            })
            .collect()
    }

    fn set_nav_link_html(&self, index: usize, html: &str) -> Result<(), NavigationError> {
        let link = self
            .link_elements()
            .into_iter()
            .nth(index)
            .ok_or_else(|| NavigationError::Dom(format!("no navigation link at index {index}")))?;

        link.set_inner_html(html);
        Ok(())
    }
}

pub struct LocalStorage {
    window: Window,
}

impl Storage for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.window
            .local_storage()
            .ok()
            .flatten()
            .and_then(|storage| storage.get_item(key).ok().flatten())
    }

    fn set(&self, key: &str, value: &str) {
        if let Ok(Some(storage)) = self.window.local_storage() {
            let _ = storage.set_item(key, value);
        }
    }
}

pub struct MediaColorScheme {
    query: Option<MediaQueryList>,
}

impl ColorScheme for MediaColorScheme {
    fn prefers_dark(&self) -> bool {
        self.query.as_ref().is_some_and(MediaQueryList::matches)
    }
}

pub struct DomThemeDisplay {
    document: Document,
}

impl ThemeDisplay for DomThemeDisplay {
    fn is_dark(&self) -> bool {
        self.document
            .body()
            .is_some_and(|body| body.class_list().contains(DARK_MODE_CLASS))
    }

    fn set_dark(&self, dark: bool) {
        if let Some(body) = self.document.body() {
            let _ = body.class_list().toggle_with_force(DARK_MODE_CLASS, dark);
        }
    }

    fn update_toggles(&self, icon: &str, title: &str) {
        for button in query_all(&self.document, ".theme-toggle") {
            button.set_text_content(Some(icon));
            let _ = button.set_attribute("title", title);
            let _ = button.set_attribute("aria-label", title);
        }
    }
}

pub struct DomNavDisplay {
    toggle: Element,
    links: Element,
}

impl NavDisplay for DomNavDisplay {
    fn set_links_active(&self, active: bool) {
        let _ = self.links.class_list().toggle_with_force("active", active);
    }

    fn set_expanded(&self, expanded: bool) {
        let _ = self
            .toggle
            .set_attribute("aria-expanded", if expanded { "true" } else { "false" });
    }

    fn set_label(&self, label: &str) {
        self.toggle.set_text_content(Some(label));
    }
}

fn query_all(root: &Document, selector: &str) -> Vec<Element> {
    let Ok(nodes) = root.query_selector_all(selector) else {
        return Vec::new();
    };

    (0..nodes.length())
        .filter_map(|index| nodes.item(index))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

fn listen<E: wasm_bindgen::convert::FromWasmAbi + 'static>(
    target: &web_sys::EventTarget,
    event: &str,
    handler: impl FnMut(E) + 'static,
) -> Result<(), JsValue> {
    let closure = Closure::<dyn FnMut(E)>::new(handler);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn mount_nav(document: &Document) -> Result<(), JsValue> {
    let (Some(toggle), Some(links)) = (
        document.query_selector(".nav-toggle")?,
        document.query_selector(".nav-links")?,
    ) else {
        return Ok(());
    };

    let link_anchors = links.query_selector_all("a")?;
    let nav = Rc::new(NavToggle::new(DomNavDisplay {
        toggle: toggle.clone(),
        links,
    }));

    let on_toggle = Rc::clone(&nav);
    listen(&toggle, "click", move |_: MouseEvent| {
        on_toggle.toggle();
    })?;

    for index in 0..link_anchors.length() {
        if let Some(anchor) = link_anchors.item(index) {
            let on_link = Rc::clone(&nav);
            listen(&anchor, "click", move |_: MouseEvent| on_link.close())?;
        }
    }

    Ok(())
}

fn mount_theme(window: &Window, document: &Document) -> Result<(), JsValue> {
    let query = window.match_media("(prefers-color-scheme: dark)")?;
    let themes = Rc::new(ThemeSwitcher::new(
        LocalStorage {
            window: window.clone(),
        },
        MediaColorScheme {
            query: query.clone(),
        },
        DomThemeDisplay {
            document: document.clone(),
        },
    ));

    themes.init();

    for button in query_all(document, ".theme-toggle") {
        let on_click = Rc::clone(&themes);
        listen(&button, "click", move |_: MouseEvent| {
            on_click.toggle();
        })?;
    }

    if let Some(query) = query {
        let on_change = Rc::clone(&themes);
        listen(&query, "change", move |event: MediaQueryListEvent| {
            on_change.on_system_change(event.matches());
        })?;
    }

    Ok(())
}

type BrowserRouter = Router<BrowserFetcher, BrowserHistory, DomRenderer, BrowserLocation, BrowserTimer>;

fn mount_router(window: &Window, document: &Document) -> Result<(), JsValue> {
    let options = RouterOptions::default();
    let renderer = DomRenderer {
        window: window.clone(),
        document: document.clone(),
        content_id: options.content_id.clone(),
        nav_link_selector: options.nav_link_selector(),
    };

    let router: Rc<BrowserRouter> = Rc::new(
        Router::new(
            RouteTable::portfolio(),
            options,
            Ports {
                fetcher: BrowserFetcher {
                    window: window.clone(),
                },
                history: BrowserHistory {
                    window: window.clone(),
                },
                renderer,
                location: BrowserLocation {
                    window: window.clone(),
                },
                timer: BrowserTimer {
                    window: window.clone(),
                },
            },
        )
        .map_err(|err| JsValue::from_str(&err.to_string()))?,
    );

    let on_click = Rc::clone(&router);
    listen(document, "click", move |event: MouseEvent| {
        let Some(href) = intercept_click(on_click.routes(), &event) else {
            return;
        };

        let router = Rc::clone(&on_click);
        spawn_local(async move {
            router.navigate(&href).await;
        });
    })?;

    let on_pop = Rc::clone(&router);
    listen(window, "popstate", move |event: PopStateEvent| {
        let state = popped_state(event.state());
        let router = Rc::clone(&on_pop);
        spawn_local(async move {
            router.handle_pop(state.as_ref()).await;
        });
    })?;

    router
        .start()
        .map_err(|err| JsValue::from_str(&err.to_string()))
}

/// Takes over a click if it landed inside an internal link: the default navigation is cancelled and the href to load
/// in place is returned.
fn intercept_click(routes: &RouteTable, event: &MouseEvent) -> Option<String> {
    let link = event
        .target()
        .and_then(|target| target.dyn_into::<Element>().ok())
        .and_then(|el| el.closest("a").ok().flatten())?;

    let anchor = Anchor {
        href: link.get_attribute("href"),
        target: link.get_attribute("target"),
    };
    if !routes.is_internal(&anchor) {
        return None;
    }

    event.prevent_default();
    anchor.href
}

/// State of a popped history entry. Entries the router didn't create have none.
fn popped_state(state: JsValue) -> Option<HistoryState> {
    serde_wasm_bindgen::from_value(state).ok()
}

fn mount(window: &Window, document: &Document) -> Result<(), JsValue> {
    mount_nav(document)?;
    mount_theme(window, document)?;
    mount_router(window, document)
}

/// Mounts everything once the document is parsed.
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let _ = init_console_logging(LevelFilter::Info);

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    if document.ready_state() != "loading" {
        return mount(&window, &document);
    }

    let target = document.clone();
    let on_ready = Closure::once_into_js(move || {
        if let Err(err) = mount(&window, &document) {
            console::error_1(&err);
        }
    });
    target.add_event_listener_with_callback("DOMContentLoaded", on_ready.unchecked_ref())
}

/// Sends `log` records to the browser console.
struct ConsoleLogger;

static CONSOLE_LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let message = JsValue::from_str(&format!("[{}] {}", record.target(), record.args()));
        match record.level() {
            Level::Error => console::error_1(&message),
            Level::Warn => console::warn_1(&message),
            _ => console::log_1(&message),
        }
    }

    fn flush(&self) {}
}

pub fn init_console_logging(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    log::set_logger(&CONSOLE_LOGGER).map(|()| log::set_max_level(level))
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use std::cell::RefCell;

    use wasm_bindgen_test::*;
    use web_sys::MouseEventInit;

    use super::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn document() -> Document {
        web_sys::window().unwrap().document().unwrap()
    }

    fn append(parent: &Element, tag: &str, attributes: &[(&str, &str)]) -> Element {
        let el = document().create_element(tag).unwrap();
        for (name, value) in attributes {
            el.set_attribute(name, value).unwrap();
        }
        parent.append_child(&el).unwrap();
        el
    }

    /// Clicks on a `<span>` inside a link. A custom event type is used so the browser never follows the link.
    fn click_inside_link(attributes: &[(&str, &str)]) -> (Option<String>, bool) {
        let body: Element = document().body().unwrap().into();
        let link = append(&body, "a", attributes);
        let label = append(&link, "span", &[]);

        let intercepted = Rc::new(RefCell::new(None));
        let on_click = Rc::clone(&intercepted);
        listen(&link, "folio-click", move |event: MouseEvent| {
            *on_click.borrow_mut() = intercept_click(&RouteTable::portfolio(), &event);
        })
        .unwrap();

        let init = MouseEventInit::new();
        init.set_bubbles(true);
        init.set_cancelable(true);
        let event = MouseEvent::new_with_mouse_event_init_dict("folio-click", &init).unwrap();
        label.dispatch_event(&event).unwrap();
        link.remove();

        (intercepted.take(), event.default_prevented())
    }

    #[wasm_bindgen_test]
    fn test_click_inside_internal_link_is_intercepted() {
        let (href, prevented) = click_inside_link(&[("href", "about.html")]);
        assert_eq!(href.as_deref(), Some("about.html"));
        assert!(prevented);

        let (href, prevented) = click_inside_link(&[("href", "/")]);
        assert_eq!(href.as_deref(), Some("/"));
        assert!(prevented);
    }

    #[wasm_bindgen_test]
    fn test_click_on_other_links_is_left_to_the_browser() {
        for attributes in [
            &[("href", "https://example.com/about.html")][..],
            &[("href", "mailto:me@example.com")][..],
            &[("href", "#contact")][..],
            &[("href", "resume.pdf")][..],
            &[("href", "about.html"), ("target", "_blank")][..],
            &[][..],
        ] {
            let (href, prevented) = click_inside_link(attributes);
            assert_eq!(href, None, "{attributes:?}");
            assert!(!prevented, "{attributes:?}");
        }
    }

    #[wasm_bindgen_test]
    fn test_history_state_crosses_into_js() {
        let value = serde_wasm_bindgen::to_value(&HistoryState::new("about.html")).unwrap();
        let page = js_sys::Reflect::get(&value, &JsValue::from_str("page")).unwrap();
        assert_eq!(page.as_string().as_deref(), Some("about.html"));
        assert_eq!(popped_state(value), Some(HistoryState::new("about.html")));

        let written_by_js = js_sys::Object::new();
        js_sys::Reflect::set(&written_by_js, &"page".into(), &"log.html".into()).unwrap();
        assert_eq!(
            popped_state(written_by_js.into()),
            Some(HistoryState::new("log.html"))
        );

        assert_eq!(popped_state(JsValue::NULL), None);
        assert_eq!(popped_state(JsValue::UNDEFINED), None);
    }

    #[wasm_bindgen_test]
    fn test_browser_history_stores_router_state() {
        let window = web_sys::window().unwrap();
        let history = BrowserHistory {
            window: window.clone(),
        };
        let path = history.current_path();

        history
            .replace_state(&HistoryState::new("contact.html"), &path)
            .unwrap();

        let state = window.history().unwrap().state().unwrap();
        assert_eq!(popped_state(state), Some(HistoryState::new("contact.html")));
        assert_eq!(history.current_path(), path);
    }

    fn page_fixture(content_id: &str, nav_class: &str) -> (Element, DomRenderer) {
        let window = web_sys::window().unwrap();
        let body: Element = document().body().unwrap().into();
        let page = append(&body, "div", &[]);

        let nav = append(&page, "nav", &[]);
        let home = append(&nav, "a", &[("class", nav_class), ("href", "index.html")]);
        home.set_inner_html("<b>Home</b>");
        let log = append(&nav, "a", &[("class", nav_class), ("href", "log.html")]);
        log.set_inner_html("Log");

        let content = append(&page, "div", &[("id", content_id)]);
        content.set_inner_html("<h1>Home</h1>");

        let renderer = DomRenderer {
            window,
            document: document(),
            content_id: content_id.to_string(),
            nav_link_selector: format!(".{nav_class}"),
        };
        (page, renderer)
    }

    #[wasm_bindgen_test]
    fn test_dom_renderer_nav_links() {
        let (page, renderer) = page_fixture("links-content", "links-nav");

        let links = renderer.nav_links();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].href.as_deref(), Some("index.html"));
        assert_eq!(links[0].text, "Home");
        assert!(links[0].emphasized);
        assert!(!links[1].emphasized);

        renderer.set_nav_link_html(0, "Home").unwrap();
        renderer.set_nav_link_html(1, "<b>Log</b>").unwrap();
        let links = renderer.nav_links();
        assert!(!links[0].emphasized);
        assert!(links[1].emphasized);
        assert_eq!(links[1].text, "Log");

        assert!(matches!(
            renderer.set_nav_link_html(2, "x"),
            Err(NavigationError::Dom(_))
        ));

        page.remove();
    }

    #[wasm_bindgen_test]
    fn test_dom_renderer_swaps_and_fades_content() {
        let (page, renderer) = page_fixture("fade-content", "fade-nav");
        let style = renderer.content().unwrap().style();

        assert!(renderer.has_content_region());
        renderer.fade_out("opacity 0.05s ease-out").unwrap();
        assert_eq!(style.get_property_value("opacity").unwrap(), "0");
        assert!(style.get_property_value("transition").unwrap().contains("opacity"));

        renderer.set_content_region("<h1>Log</h1>").unwrap();
        assert_eq!(renderer.content_region().as_deref(), Some("<h1>Log</h1>"));

        renderer.restore_opacity().unwrap();
        assert_eq!(style.get_property_value("opacity").unwrap(), "1");

        page.remove();
        assert!(!renderer.has_content_region());
        assert!(renderer.set_content_region("<p>gone</p>").is_ok());
        assert!(renderer.fade_out("opacity 1s").is_ok());
    }

    #[wasm_bindgen_test]
    async fn test_unscheduled_timeout_still_resolves() {
        let promise = js_sys::Promise::new(&mut |resolve, _reject| {
            resolve_unless_scheduled(Err(JsValue::from_str("blocked")), &resolve);
        });
        assert!(JsFuture::from(promise).await.is_ok());

        let timer = BrowserTimer {
            window: web_sys::window().unwrap(),
        };
        timer.sleep(Duration::from_millis(1)).await;
    }
}
