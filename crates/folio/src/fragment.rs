//! Extraction of the swappable region and title from a fetched page.
//!
//! The fetched document is never inserted into the live page. It is streamed through `lol_html` once, which marks
//! the boundaries of the content region so its inner markup can be sliced out of the output untouched.
use std::cell::{Cell, RefCell};

use lol_html::{RewriteStrSettings, element, html_content::ContentType, rewrite_str, text};

use crate::{errors::NavigationError, options::is_css_identifier};

const START_MARKER: &str = "<!--folio:fragment-start-->";
const END_MARKER: &str = "<!--folio:fragment-end-->";

/// The parts of a fetched page the router cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    /// Inner markup of the first element with the content id, if any.
    pub content: Option<String>,
    /// Decoded text of the first `<title>`, if any.
    pub title: Option<String>,
}

impl Fragment {
    pub fn parse(html: &str, content_id: &str) -> Result<Self, NavigationError> {
        if !is_css_identifier(content_id) {
            return Err(NavigationError::MalformedDocument(format!(
                "`{content_id}` cannot be used as a content id"
            )));
        }

        let selector = format!("#{content_id}");
        let content_seen = Cell::new(false);
        let titles_seen = Cell::new(0usize);
        let title: RefCell<Option<String>> = RefCell::new(None);

        let output = rewrite_str(
            html,
            RewriteStrSettings {
                element_content_handlers: vec![
                    element!(selector, |el| {
                        if !content_seen.replace(true) {
                            el.prepend(START_MARKER, ContentType::Html);
                            el.append(END_MARKER, ContentType::Html);
                        }
                        Ok(())
                    }),
                    element!("title", |_el| {
                        titles_seen.set(titles_seen.get() + 1);
                        if titles_seen.get() == 1 {
                            *title.borrow_mut() = Some(String::new());
                        }
                        Ok(())
                    }),
                    text!("title", |chunk| {
                        if titles_seen.get() == 1 {
                            if let Some(title) = title.borrow_mut().as_mut() {
                                title.push_str(chunk.as_str());
                            }
                        }
                        Ok(())
                    }),
                ],
                ..RewriteStrSettings::new()
            },
        )?;

        let content = if content_seen.get() {
            Some(slice_between_markers(&output)?)
        } else {
            None
        };

        Ok(Fragment {
            content,
            title: title
                .into_inner()
                .map(|raw| html_escape::decode_html_entities(&raw).into_owned()),
        })
    }
}

fn slice_between_markers(output: &str) -> Result<String, NavigationError> {
    let start = output
        .find(START_MARKER)
        .map(|index| index + START_MARKER.len())
        .ok_or_else(|| NavigationError::MalformedDocument("content region could not be located".into()))?;

    let end = output[start..]
        .find(END_MARKER)
        .ok_or_else(|| NavigationError::MalformedDocument("content region is never closed".into()))?;

    Ok(output[start..start + end].to_string())
}
