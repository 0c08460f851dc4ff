//! Gallery Wall content script
//!
//! Wires the engine in gallery-wall-core to the page: `localStorage` for
//! preferences, the root element's style for the `--gw-*` variables, the live
//! document for decoration and `setTimeout` for the settle delay. The settings
//! UI talks to the running engine through the exported functions below.

mod runtime;
mod timer;
mod web_dom;
mod web_storage;

use std::cell::RefCell;
use std::rc::Rc;

use gallery_wall_core::{
    EngineConfig, EngineConfigExt, LifecycleCoordinator, Preference, PreferenceEdit,
};
use tracing::{Level, info, warn};
use wasm_bindgen::prelude::*;

pub use timer::BrowserScheduler;
pub use web_dom::WebDom;
pub use web_storage::{LocalStorage, RootStyle};

type Engine = LifecycleCoordinator<LocalStorage, RootStyle, WebDom>;

const ENGINE_CONFIG: &str = include_str!("../engine.toml");

thread_local! {
    static ENGINE: RefCell<Option<Engine>> = const { RefCell::new(None) };
}

fn with_engine<T>(f: impl FnOnce(&Engine) -> T) -> Option<T> {
    ENGINE.with(|slot| slot.borrow().as_ref().map(f))
}

fn init_logging() {
    let level = if cfg!(debug_assertions) {
        Level::DEBUG
    } else {
        Level::INFO
    };
    // A second content-script instance in the same realm already has a logger
    let _ = dioxus_logger::init(level);
}

// ─────────────────────────────────────────────────────────────────────────────
// Entry Point
// ─────────────────────────────────────────────────────────────────────────────

#[wasm_bindgen(start)]
pub fn start() {
    init_logging();

    let config = EngineConfig::load_or_default(ENGINE_CONFIG);
    let Some(window) = web_sys::window() else {
        warn!("no window, content script inactive");
        return;
    };

    let host = window.location().hostname().unwrap_or_default();
    if !config.site_scope().allows(&host) {
        info!(%host, "host not in site scope, content script inactive");
        return;
    }

    let Some(dom) = WebDom::from_window(&window) else {
        warn!("no document, content script inactive");
        return;
    };

    let engine = LifecycleCoordinator::new(
        &config,
        LocalStorage::open(&window),
        RootStyle::from_document(dom.document()),
        dom,
        Rc::new(BrowserScheduler::new()),
    );
    engine.activate();
    runtime::listen(engine.clone());

    ENGINE.with(|slot| *slot.borrow_mut() = Some(engine));
    info!(%host, "gallery wall engine started");
}

// ─────────────────────────────────────────────────────────────────────────────
// Settings API
// ─────────────────────────────────────────────────────────────────────────────

/// Apply an edit from the settings UI, e.g.
/// `{ kind: "step", preference: "frameWidth", delta: 1 }`.
///
/// Returns false if the engine is not running or the edit was rejected.
#[wasm_bindgen(js_name = "applyPreferenceEdit")]
pub fn apply_preference_edit(edit: JsValue) -> bool {
    let edit: PreferenceEdit = match serde_wasm_bindgen::from_value(edit) {
        Ok(edit) => edit,
        Err(e) => {
            warn!(error = %e, "malformed preference edit");
            return false;
        }
    };
    with_engine(|engine| match engine.edit(&edit) {
        Ok(_) => true,
        Err(e) => {
            info!(reason = %e, "preference edit rejected");
            false
        }
    })
    .unwrap_or(false)
}

#[wasm_bindgen(js_name = "setWallColor")]
pub fn set_wall_color(value: String) -> bool {
    apply(PreferenceEdit::WallColor { value })
}

#[wasm_bindgen(js_name = "setFrameColor")]
pub fn set_frame_color(value: String) -> bool {
    apply(PreferenceEdit::FrameColor { value })
}

/// +/- buttons for frame width
#[wasm_bindgen(js_name = "stepFrameWidth")]
pub fn step_frame_width(delta: i32) -> bool {
    apply(PreferenceEdit::Step {
        preference: Preference::FrameWidth,
        delta,
    })
}

/// +/- buttons for images per row
#[wasm_bindgen(js_name = "stepCountPerRow")]
pub fn step_count_per_row(delta: i32) -> bool {
    apply(PreferenceEdit::Step {
        preference: Preference::CountPerRow,
        delta,
    })
}

fn apply(edit: PreferenceEdit) -> bool {
    with_engine(|engine| engine.edit(&edit).is_ok()).unwrap_or(false)
}

/// Current preference snapshot as `{ wallColor, frameColor, frameWidth, countPerRow }`
#[wasm_bindgen(js_name = "currentPreferences")]
pub fn current_preferences() -> JsValue {
    with_engine(|engine| engine.preferences())
        .and_then(|prefs| serde_wasm_bindgen::to_value(&prefs).ok())
        .unwrap_or(JsValue::NULL)
}
