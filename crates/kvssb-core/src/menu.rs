/// Class toggled on the hamburger and the menu panel while open
pub const OPEN_CLASS: &str = "active";

/// Body class that locks scrolling behind the open menu
pub const NO_SCROLL_CLASS: &str = "no-scroll";

/// Open/closed state of the mobile navigation drawer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MobileMenu {
    open: bool,
}

impl MobileMenu {
    /// Hamburger clicked. Returns the new state.
    pub fn toggle(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }

    /// A nav link inside the drawer was followed.
    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }
}
