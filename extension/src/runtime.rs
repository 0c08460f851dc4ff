//! Extension runtime bindings
//!
//! The background script announces SPA navigations with a message on
//! `chrome.runtime.onMessage`; this module forwards them to the engine.

use gallery_wall_core::{HostDom, InboundMessage, KeyValueStorage, LifecycleCoordinator, StyleHost};
use tracing::{debug, warn};
use wasm_bindgen::prelude::*;

// ─────────────────────────────────────────────────────────────────────────────
// Raw Extension Bindings
// ─────────────────────────────────────────────────────────────────────────────

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_namespace = ["chrome", "runtime", "onMessage"], js_name = "addListener")]
    fn add_message_listener(
        listener: &Closure<dyn FnMut(JsValue, JsValue, JsValue)>,
    ) -> Result<(), JsValue>;
}

/// Deserialize an incoming message. Anything without a string `message`
/// field decodes to an empty message, which never matches the signal.
fn decode(value: JsValue) -> InboundMessage {
    serde_wasm_bindgen::from_value(value).unwrap_or_default()
}

/// Register the route-change listener for the lifetime of the page
pub fn listen<S, H, D>(engine: LifecycleCoordinator<S, H, D>)
where
    S: KeyValueStorage + 'static,
    H: StyleHost + 'static,
    D: HostDom + 'static,
{
    let listener = Closure::<dyn FnMut(JsValue, JsValue, JsValue)>::new(
        move |message: JsValue, _sender: JsValue, _respond: JsValue| {
            let message = decode(message);
            if !engine.handle_message(&message) {
                debug!(message = %message.message, "ignored runtime message");
            }
        },
    );

    match add_message_listener(&listener) {
        // The page never unregisters, so the closure lives as long as it does
        Ok(()) => listener.forget(),
        Err(e) => warn!(error = ?e, "chrome.runtime unavailable, route changes will not re-decorate"),
    }
}
