//! Thin helpers over web-sys. Lookups return `None` for anything missing
//! so callers can disable a feature with `?`.

use std::collections::BTreeMap;
use std::time::Duration;

use kvssb_core::forms;
use tracing::debug;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, Event, EventTarget, FormData, HtmlElement, HtmlFormElement, ScrollBehavior,
    ScrollToOptions, Window,
};

pub fn window() -> Option<Window> {
    web_sys::window()
}

pub fn document() -> Option<Document> {
    window()?.document()
}

pub fn body() -> Option<HtmlElement> {
    document()?.body()
}

pub fn query(selector: &str) -> Option<Element> {
    document()?.query_selector(selector).ok().flatten()
}

pub fn query_as<T: JsCast>(selector: &str) -> Option<T> {
    query(selector)?.dyn_into::<T>().ok()
}

pub fn query_all(selector: &str) -> Vec<Element> {
    query_all_as(selector)
}

pub fn query_all_as<T: JsCast>(selector: &str) -> Vec<T> {
    let Some(nodes) = document().and_then(|doc| doc.query_selector_all(selector).ok()) else {
        return Vec::new();
    };
    (0..nodes.length())
        .filter_map(|i| nodes.get(i))
        .filter_map(|node| node.dyn_into::<T>().ok())
        .collect()
}

pub fn set_class(element: &Element, class: &str, on: bool) {
    let _ = element.class_list().toggle_with_force(class, on);
}

pub fn has_class(element: &Element, class: &str) -> bool {
    element.class_list().contains(class)
}

/// Attach a listener for the lifetime of the page.
pub fn listen(target: &EventTarget, event: &str, handler: impl FnMut(Event) + 'static) {
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    if target
        .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
        .is_err()
    {
        debug!(event, "failed to attach listener");
    }
    closure.forget();
}

/// Run `f` once after `delay`.
pub fn after(delay: Duration, f: impl FnOnce() + 'static) {
    let Some(window) = window() else {
        return;
    };
    let callback = Closure::once_into_js(f);
    let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
    if window
        .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), millis)
        .is_err()
    {
        debug!(millis, "failed to schedule timeout");
    }
}

pub fn smooth_scroll_to(top: f64) {
    let Some(window) = window() else {
        return;
    };
    let options = ScrollToOptions::new();
    options.set_top(top);
    options.set_behavior(ScrollBehavior::Smooth);
    window.scroll_to_with_scroll_to_options(&options);
}

pub fn scroll_offset() -> f64 {
    window().and_then(|w| w.scroll_y().ok()).unwrap_or(0.0)
}

pub fn viewport_height() -> f64 {
    window()
        .and_then(|w| w.inner_height().ok())
        .and_then(|height| height.as_f64())
        .unwrap_or(0.0)
}

/// Text fields of a form. File inputs are skipped.
pub fn form_fields(form: &HtmlFormElement) -> BTreeMap<String, String> {
    let Ok(data) = FormData::new_with_form(form) else {
        return BTreeMap::new();
    };
    let Ok(Some(entries)) = js_sys::try_iter(&data) else {
        return BTreeMap::new();
    };
    forms::collect_fields(entries.filter_map(Result::ok).filter_map(|entry| {
        let pair = js_sys::Array::from(&entry);
        Some((pair.get(0).as_string()?, pair.get(1).as_string()?))
    }))
}
