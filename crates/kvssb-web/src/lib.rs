#[allow(clippy::unit_arg, clippy::unused_unit)]
mod app;
mod dom;
mod ffi;
mod logging;
mod page;
mod runtime;

use kvssb_core::config::Config;
use kvssb_core::toast::Notice;
use tracing::{debug, info, warn};
use wasm_bindgen::prelude::*;

/// Id of an optional `<script type="application/toml">` block carrying
/// config overrides
const CONFIG_ELEMENT: &str = "kvssb-config";

/// Entry point for the WASM module.
///
/// Called automatically when the module is loaded in the browser. Sets up
/// the panic hook and console logging, mounts the toast host and wires the
/// page's event handlers.
#[wasm_bindgen(start)]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    logging::init();

    let config = page_config();
    let notifier = app::mount_toasts(config.toast_ttl());
    page::install(&config, notifier);
    info!("page runtime ready");
}

fn page_config() -> Config {
    let Some(text) = dom::query(&format!("#{CONFIG_ELEMENT}")).and_then(|el| el.text_content())
    else {
        return Config::default();
    };
    match Config::from_toml(&text) {
        Ok(config) => config,
        Err(err) => {
            warn!("ignoring #{CONFIG_ELEMENT}: {err:#}");
            Config::default()
        }
    }
}

/// Show a toast from other page scripts, e.g.
/// `showToast("Saved", "success")`. The kind defaults to info.
#[wasm_bindgen(js_name = showToast)]
pub fn show_toast(message: String, kind: Option<String>) {
    let notice = Notice::named(message, kind.as_deref().unwrap_or_default());
    match app::notifier() {
        Some(notifier) => notifier.show(notice),
        None => debug!("toast host not mounted, dropping toast"),
    }
}
