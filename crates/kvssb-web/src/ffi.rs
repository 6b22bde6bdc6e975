//! Bindings to the page's script-tag libraries: gsap for tweens and Typed
//! for the hero typewriter. Either may be missing, in which case calls are
//! logged and dropped.

use kvssb_core::tween::Tween;
use kvssb_core::typewriter::TypewriterOptions;
use serde::Serialize;
use tracing::debug;
use wasm_bindgen::prelude::*;
use web_sys::Element;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = gsap, js_name = to, catch)]
    fn gsap_to(target: &JsValue, vars: &JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_namespace = gsap, js_name = from, catch)]
    fn gsap_from(target: &JsValue, vars: &JsValue) -> Result<JsValue, JsValue>;

    type Typed;

    #[wasm_bindgen(constructor, catch, js_class = "Typed")]
    fn new(selector: &str, options: &JsValue) -> Result<Typed, JsValue>;
}

fn to_js<T: Serialize>(value: &T) -> Option<JsValue> {
    let json = serde_json::to_string(value).ok()?;
    js_sys::JSON::parse(&json).ok()
}

/// Tween `target` to the given values.
pub fn tween_to(target: &Element, tween: &Tween) {
    let Some(vars) = to_js(tween) else { return };
    if gsap_to(target.as_ref(), &vars).is_err() {
        debug!("gsap.to unavailable");
    }
}

/// Tween `target` from the given values to its current style.
pub fn tween_from(target: &Element, tween: &Tween) {
    let Some(vars) = to_js(tween) else { return };
    if gsap_from(target.as_ref(), &vars).is_err() {
        debug!("gsap.from unavailable");
    }
}

pub fn start_typewriter(selector: &str, options: &TypewriterOptions) {
    let Some(options) = to_js(options) else { return };
    match Typed::new(selector, &options) {
        Ok(_typed) => debug!(selector, "typewriter started"),
        Err(_) => debug!(selector, "Typed unavailable"),
    }
}
