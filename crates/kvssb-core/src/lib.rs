//! Page state for the KVSSB site.
//!
//! Browser-independent logic behind the page's interactive pieces. The
//! scroll-driven widgets are reduced by [`sync::Synchronizer`]; the rest
//! are small state values and lookup tables used by the wasm runtime.

pub mod cards;
pub mod config;
pub mod counter;
pub mod forms;
pub mod layout;
pub mod menu;
pub mod reveal;
pub mod scenario;
pub mod scroll;
pub mod sync;
pub mod theme;
pub mod toast;
pub mod trigger;
pub mod tween;
pub mod typewriter;
