use maud::html;

use crate::{ports::NavLink, routes::is_root};

/// New markup for one navigation link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkUpdate {
    pub index: usize,
    pub html: String,
}

/// Computes which navigation links need new markup once `resource` is displayed.
///
/// The link pointing at `resource` gets its text wrapped in `<b>`, every other link loses its emphasis. Links already
/// in the right state are left alone, so applying the updates twice changes nothing.
pub fn active_link_updates(links: &[NavLink], resource: &str) -> Vec<LinkUpdate> {
    links
        .iter()
        .enumerate()
        .filter_map(|(index, link)| {
            let is_active = link
                .href
                .as_deref()
                .is_some_and(|href| same_page(href, resource));

            let html = match (is_active, link.emphasized) {
                (true, false) => html! { b { (link.text) } },
                (false, true) => html! { (link.text) },
                _ => return None,
            };

            Some(LinkUpdate {
                index,
                html: html.into_string(),
            })
        })
        .collect()
}

/// Whether two hrefs or resource names designate the same page. The root path and the root fragment are the same page.
pub fn same_page(a: &str, b: &str) -> bool {
    if is_root(a) || is_root(b) {
        return is_root(a) && is_root(b);
    }

    a.trim_start_matches('/') == b.trim_start_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(href: &str, text: &str, emphasized: bool) -> NavLink {
        NavLink {
            href: Some(href.to_string()),
            text: text.to_string(),
            emphasized,
        }
    }

    #[test]
    fn test_marks_target_and_clears_others() {
        let links = vec![
            link("index.html", "Home", true),
            link("about.html", "About", false),
            link("log.html", "Log", false),
        ];

        let updates = active_link_updates(&links, "about.html");

        assert_eq!(
            updates,
            vec![
                LinkUpdate {
                    index: 0,
                    html: "Home".into()
                },
                LinkUpdate {
                    index: 1,
                    html: "<b>About</b>".into()
                },
            ]
        );
    }

    #[test]
    fn test_already_marked_link_is_left_alone() {
        let links = vec![link("about.html", "About", true), link("log.html", "Log", false)];
        assert!(active_link_updates(&links, "about.html").is_empty());
    }

    #[test]
    fn test_root_and_index_are_equivalent() {
        let links = vec![link("/", "Home", false), link("index.html", "Index", false)];

        let updates = active_link_updates(&links, "index.html");
        assert_eq!(updates.len(), 2);

        let updates = active_link_updates(&links, "/");
        assert_eq!(updates.len(), 2);
        assert!(updates.iter().all(|update| update.html.starts_with("<b>")));
    }

    #[test]
    fn test_link_text_is_escaped() {
        let links = vec![link("log.html", "R&D <notes>", false)];
        let updates = active_link_updates(&links, "log.html");
        assert_eq!(updates[0].html, "<b>R&amp;D &lt;notes&gt;</b>");
    }

    #[test]
    fn test_link_without_href_is_never_active() {
        let links = vec![NavLink {
            href: None,
            text: "Menu".into(),
            emphasized: true,
        }];
        let updates = active_link_updates(&links, "index.html");
        assert_eq!(updates[0].html, "Menu");
    }

    #[test]
    fn test_same_page() {
        assert!(same_page("/", "index.html"));
        assert!(same_page("/about.html", "about.html"));
        assert!(!same_page("/", "about.html"));
        assert!(!same_page("about.html", "log.html"));
    }
}
