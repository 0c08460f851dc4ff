//! `localStorage` and root-style backends

use gallery_wall_core::{KeyValueStorage, StorageError, StyleError, StyleHost};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlElement, Storage, Window};

fn js_reason(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

/// Per-origin `localStorage`. Blocked storage (privacy modes, sandboxed
/// frames) shows up as [`StorageError::Unavailable`] on every call.
pub struct LocalStorage {
    storage: Option<Storage>,
}

impl LocalStorage {
    pub fn open(window: &Window) -> Self {
        Self {
            storage: window.local_storage().ok().flatten(),
        }
    }
}

impl KeyValueStorage for LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let storage = self.storage.as_ref().ok_or(StorageError::Unavailable)?;
        storage.get_item(key).map_err(|e| StorageError::Read {
            key: key.to_string(),
            reason: js_reason(&e),
        })
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let storage = self.storage.as_ref().ok_or(StorageError::Unavailable)?;
        storage.set_item(key, value).map_err(|e| StorageError::Write {
            key: key.to_string(),
            reason: js_reason(&e),
        })
    }
}

/// `document.documentElement.style`
pub struct RootStyle {
    root: Option<HtmlElement>,
}

impl RootStyle {
    pub fn from_document(document: &Document) -> Self {
        Self {
            root: document
                .document_element()
                .and_then(|element| element.dyn_into::<HtmlElement>().ok()),
        }
    }
}

impl StyleHost for RootStyle {
    fn set_property(&self, name: &str, value: &str) -> Result<(), StyleError> {
        let root = self.root.as_ref().ok_or(StyleError::NoRoot)?;
        root.style()
            .set_property(name, value)
            .map_err(|e| StyleError::SetProperty {
                name: name.to_string(),
                reason: js_reason(&e),
            })
    }
}
