//! Event-handler glue for everything outside the synchronizer. Each
//! feature looks up its elements and quietly stays off if any are missing.

use std::cell::Cell;
use std::rc::Rc;

use kvssb_core::cards::{CardFace, HoverPart, HoverTarget};
use kvssb_core::config::Config;
use kvssb_core::layout::{self, anchor_selector};
use kvssb_core::menu::{MobileMenu, NO_SCROLL_CLASS, OPEN_CLASS};
use kvssb_core::theme::{self, DARK_CLASS, PREFERS_DARK_QUERY, THEME_KEY, Theme, ThemeStore};
use kvssb_core::{forms, tween};
use tracing::debug;
use wasm_bindgen::JsCast;
use web_sys::{
    Element, HtmlElement, HtmlFormElement, HtmlInputElement, Storage,
};

use crate::app::Notifier;
use crate::runtime::Runtime;
use crate::{dom, ffi};

const HIDDEN_CLASS: &str = "hidden";

/// Install every page feature.
pub fn install(config: &Config, notifier: Notifier) {
    let features: [(&str, Option<()>); 12] = [
        ("preloader", preloader(config)),
        ("theme", theme_toggle()),
        ("mobile menu", mobile_menu()),
        ("typewriter", typewriter(config)),
        ("card flip", card_flips()),
        ("smooth anchors", smooth_anchors(config.anchor_offset)),
        ("back to top", back_to_top()),
        ("hover", hover_tweens()),
        ("cubes", cubes()),
        ("contact form", contact_form(notifier)),
        ("newsletter", newsletter_form(notifier)),
        ("download cv", download_cv(notifier)),
    ];
    for (feature, installed) in features {
        if installed.is_none() {
            debug!(feature, "elements missing, feature disabled");
        }
    }

    // The runtime keeps itself alive through its listeners.
    if Runtime::install(config.sync()).is_none() {
        debug!("no window, scroll sync disabled");
    }
}

fn preloader(config: &Config) -> Option<()> {
    let preloader = dom::query(".preloader")?;
    let window = dom::window()?;
    let delay = config.preloader_delay();

    let hide = move || {
        let preloader = preloader.clone();
        dom::after(delay, move || {
            dom::set_class(&preloader, HIDDEN_CLASS, true);
            if let Some(body) = dom::body() {
                dom::set_class(&body, NO_SCROLL_CLASS, false);
            }
        });
    };

    // `load` has already fired when the module finishes loading late.
    if dom::document()?.ready_state() == "complete" {
        hide();
    } else {
        dom::listen(&window, "load", move |_| hide());
    }
    Some(())
}

/// `localStorage`-backed theme flag. Storage may be disabled, in which
/// case the theme simply isn't remembered.
struct LocalThemeStore(Option<Storage>);

impl LocalThemeStore {
    fn open() -> Self {
        Self(dom::window().and_then(|w| w.local_storage().ok().flatten()))
    }
}

impl ThemeStore for LocalThemeStore {
    fn load(&self) -> Option<String> {
        self.0.as_ref()?.get_item(THEME_KEY).ok().flatten()
    }

    fn store(&mut self, theme: Theme) {
        if let Some(storage) = &self.0 {
            if storage.set_item(THEME_KEY, theme.as_str()).is_err() {
                debug!(%theme, "could not persist theme");
            }
        }
    }
}

fn prefers_dark() -> bool {
    dom::window()
        .and_then(|w| w.match_media(PREFERS_DARK_QUERY).ok().flatten())
        .is_some_and(|query| query.matches())
}

fn theme_toggle() -> Option<()> {
    let body = dom::body()?;
    let mut store = LocalThemeStore::open();
    if theme::initial_theme(&store, prefers_dark()).is_dark() {
        dom::set_class(&body, DARK_CLASS, true);
    }

    let toggle = dom::query(".theme-toggle")?;
    dom::listen(&toggle, "click", move |_| {
        let showing = if dom::has_class(&body, DARK_CLASS) {
            Theme::Dark
        } else {
            Theme::Light
        };
        let next = theme::toggle_theme(&mut store, showing);
        dom::set_class(&body, DARK_CLASS, next.is_dark());
    });
    Some(())
}

fn mobile_menu() -> Option<()> {
    let hamburger = dom::query(".hamburger")?;
    let menu = dom::query(".navbar-menu")?;
    let body = dom::body()?;
    let state = Rc::new(Cell::new(MobileMenu::default()));

    let render = {
        let (hamburger, menu, body) = (hamburger.clone(), menu.clone(), body.clone());
        move |open: bool| {
            dom::set_class(&hamburger, OPEN_CLASS, open);
            dom::set_class(&menu, OPEN_CLASS, open);
            dom::set_class(&body, NO_SCROLL_CLASS, open);
        }
    };

    {
        let (state, render) = (Rc::clone(&state), render.clone());
        dom::listen(&hamburger, "click", move |_| {
            let mut menu = state.get();
            menu.toggle();
            state.set(menu);
            render(menu.is_open());
        });
    }

    for link in dom::query_all(".navbar-menu .nav-link") {
        let (state, render) = (Rc::clone(&state), render.clone());
        dom::listen(&link, "click", move |_| {
            let mut menu = state.get();
            menu.close();
            state.set(menu);
            render(menu.is_open());
        });
    }
    Some(())
}

fn typewriter(config: &Config) -> Option<()> {
    dom::query("#typewriter")?;
    ffi::start_typewriter("#typewriter", &config.typewriter);
    Some(())
}

fn show_face(card: &HtmlElement, face: CardFace) {
    if card.style().set_property("transform", face.transform()).is_err() {
        debug!("could not flip card");
    }
}

fn card_flips() -> Option<()> {
    let cards = dom::query_all_as::<HtmlElement>(".member-card");
    if cards.is_empty() {
        return None;
    }
    for card in cards {
        for (selector, face) in [(".contact-btn", CardFace::Back), (".close-btn", CardFace::Front)] {
            let Ok(Some(button)) = card.query_selector(selector) else {
                continue;
            };
            let card = card.clone();
            dom::listen(&button, "click", move |event| {
                event.stop_propagation();
                show_face(&card, face);
            });
        }
    }
    Some(())
}

fn smooth_anchors(offset: f64) -> Option<()> {
    let anchors = dom::query_all("a[href^=\"#\"]");
    if anchors.is_empty() {
        return None;
    }
    for anchor in anchors {
        let target = anchor.get_attribute("href").unwrap_or_default();
        dom::listen(&anchor, "click", move |event| {
            event.prevent_default();
            let Some(selector) = anchor_selector(&target) else {
                return;
            };
            if let Some(section) = dom::query_as::<HtmlElement>(selector) {
                let top = f64::from(section.offset_top());
                dom::smooth_scroll_to(layout::anchor_scroll_top(top, offset));
            }
        });
    }
    Some(())
}

fn back_to_top() -> Option<()> {
    let button = dom::query(".back-to-top")?;
    dom::listen(&button, "click", |_| dom::smooth_scroll_to(0.0));
    Some(())
}

fn hover_tweens() -> Option<()> {
    let mut found = false;
    for target in HoverTarget::ALL {
        for element in dom::query_all(target.selector()) {
            found = true;
            for (event, tweens) in [("mouseenter", target.enter()), ("mouseleave", target.leave())] {
                let hovered = element.clone();
                dom::listen(&element, event, move |_| {
                    for (part, tween) in &tweens {
                        if let Some(node) = hover_part(&hovered, *part) {
                            ffi::tween_to(&node, tween);
                        }
                    }
                });
            }
        }
    }
    found.then_some(())
}

fn hover_part(element: &Element, part: HoverPart) -> Option<Element> {
    match part {
        HoverPart::Itself => Some(element.clone()),
        HoverPart::Icon => element.query_selector("i").ok().flatten(),
    }
}

fn cubes() -> Option<()> {
    let cubes = dom::query_all(".cube");
    if cubes.is_empty() {
        return None;
    }
    for (index, cube) in cubes.iter().enumerate() {
        let rolls = std::array::from_fn(|_| js_sys::Math::random());
        ffi::tween_to(cube, &tween::cube_spin(index, rolls));
    }
    Some(())
}

fn contact_form(notifier: Notifier) -> Option<()> {
    let form = dom::query_as::<HtmlFormElement>(".contact-form")?;
    let submitted = form.clone();
    dom::listen(&form, "submit", move |event| {
        event.prevent_default();
        let fields = dom::form_fields(&submitted);
        notifier.show(forms::contact_submitted(&fields));
        submitted.reset();
    });
    Some(())
}

fn newsletter_form(notifier: Notifier) -> Option<()> {
    let form = dom::query(".newsletter-form")?;
    let input = form
        .query_selector("input")
        .ok()
        .flatten()?
        .dyn_into::<HtmlInputElement>()
        .ok()?;
    dom::listen(&form, "submit", move |event| {
        event.prevent_default();
        if let Some(notice) = forms::newsletter_submitted(&input.value()) {
            notifier.show(notice);
            input.set_value("");
        }
    });
    Some(())
}

fn download_cv(notifier: Notifier) -> Option<()> {
    let buttons = dom::query_all(".download-cv");
    if buttons.is_empty() {
        return None;
    }
    for button in buttons {
        dom::listen(&button, "click", move |event| {
            event.stop_propagation();
            notifier.show(forms::cv_download_requested());
        });
    }
    Some(())
}
