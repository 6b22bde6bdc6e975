//! Pure functions of the scroll offset.

use crate::layout::Section;

/// How far above a section's top the reader may be while its nav link is
/// already highlighted.
pub const NAV_OFFSET: f64 = 200.0;

/// Offset past which the back-to-top button shows.
pub const BACK_TO_TOP_AFTER: f64 = 300.0;

/// Id of the section the reader is currently in.
///
/// Sections are walked in document order and the last one whose
/// `top - nav_offset` is at or above `offset` wins, so later sections
/// take ties. A winning section without an id highlights nothing.
pub fn active_section(sections: &[Section], offset: f64, nav_offset: f64) -> Option<&str> {
    let mut current: Option<&Section> = None;
    for section in sections {
        if offset >= section.top - nav_offset {
            current = Some(section);
        }
    }
    current.and_then(|section| section.id.as_deref())
}

/// Back-to-top visibility. Strictly greater than the threshold, no
/// hysteresis.
pub fn back_to_top_visible(offset: f64, threshold: f64) -> bool {
    offset > threshold
}

/// What the page last showed for the scroll-driven widgets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrollState {
    pub offset: f64,
    pub active: Option<String>,
    pub back_to_top: bool,
}
