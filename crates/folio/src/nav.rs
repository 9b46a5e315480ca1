//! The hamburger menu shown on narrow screens.
use std::cell::Cell;

use crate::ports::NavDisplay;

pub const MENU_LABEL: &str = "[ MENU ]";
pub const CLOSE_LABEL: &str = "[ CLOSE ]";

/// Open/closed state of the `.nav-links` list, driven by the `.nav-toggle` control.
///
/// The menu starts closed. The display is only written to once the visitor interacts with it, the markup ships in the
/// closed state.
pub struct NavToggle<D> {
    display: D,
    open: Cell<bool>,
}

impl<D: NavDisplay> NavToggle<D> {
    pub fn new(display: D) -> Self {
        Self {
            display,
            open: Cell::new(false),
        }
    }

    pub fn is_open(&self) -> bool {
        self.open.get()
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    /// Opens a closed menu and closes an open one. Returns whether the menu is now open.
    pub fn toggle(&self) -> bool {
        self.set_open(!self.open.get());
        self.open.get()
    }

    /// Closes the menu, e.g. after one of its links was followed.
    pub fn close(&self) {
        self.set_open(false);
    }

    fn set_open(&self, open: bool) {
        self.open.set(open);
        self.display.set_links_active(open);
        self.display.set_expanded(open);
        self.display
            .set_label(if open { CLOSE_LABEL } else { MENU_LABEL });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryNavDisplay;

    #[test]
    fn test_starts_closed_and_untouched() {
        let nav = NavToggle::new(MemoryNavDisplay::default());
        assert!(!nav.is_open());
        assert_eq!(nav.display().label(), "");
    }

    #[test]
    fn test_toggle_opens_then_closes() {
        let nav = NavToggle::new(MemoryNavDisplay::default());

        assert!(nav.toggle());
        assert!(nav.display().is_active());
        assert!(nav.display().is_expanded());
        assert_eq!(nav.display().label(), CLOSE_LABEL);

        assert!(!nav.toggle());
        assert!(!nav.display().is_active());
        assert!(!nav.display().is_expanded());
        assert_eq!(nav.display().label(), MENU_LABEL);
    }

    #[test]
    fn test_link_click_closes_menu() {
        let nav = NavToggle::new(MemoryNavDisplay::default());
        nav.toggle();

        nav.close();
        assert!(!nav.is_open());
        assert!(!nav.display().is_active());
        assert_eq!(nav.display().label(), MENU_LABEL);

        nav.close();
        assert!(!nav.is_open());
    }
}
