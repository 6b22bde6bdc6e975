use serde::{Deserialize, Serialize};

/// Distance kept between the fixed navbar and a section scrolled to from
/// an in-page anchor.
pub const ANCHOR_OFFSET: f64 = 80.0;

/// A page section as laid out by the browser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// The section's `id` attribute, if it has one
    #[serde(default)]
    pub id: Option<String>,
    /// Offset of the section's top edge from the top of the document
    pub top: f64,
    #[serde(default)]
    pub height: f64,
}

impl Section {
    pub fn new(id: &str, top: f64, height: f64) -> Self {
        Self {
            id: Some(id.to_string()),
            top,
            height,
        }
    }
}

/// A navigation link pointing at a page fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub href: String,
    pub active: bool,
}

impl NavLink {
    pub fn new(href: &str) -> Self {
        Self {
            href: href.to_string(),
            active: false,
        }
    }

    /// Whether this link addresses the section with the given id.
    pub fn targets(&self, id: &str) -> bool {
        self.href.strip_prefix('#') == Some(id)
    }
}

/// Selector to resolve for an in-page anchor click.
///
/// A bare `#` is a placeholder link and scrolls nowhere; anything that is
/// not a fragment is left to the browser.
pub fn anchor_selector(href: &str) -> Option<&str> {
    match href {
        "#" => None,
        href if href.starts_with('#') => Some(href),
        _ => None,
    }
}

/// Scroll offset that brings a section's top just below the navbar.
pub fn anchor_scroll_top(section_top: f64, offset: f64) -> f64 {
    section_top - offset
}
