//! Browser DOM backend
//!
//! Thin [`HostDom`] over web-sys. Invalid selectors throw in the browser; they
//! are treated the same as "no match".

use gallery_wall_core::HostDom;
use tracing::warn;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, NodeList, Window};

pub struct WebDom {
    document: Document,
}

impl WebDom {
    pub fn from_window(window: &Window) -> Option<Self> {
        window.document().map(|document| Self { document })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }
}

fn elements(list: NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

impl HostDom for WebDom {
    type Node = Element;

    fn query(&self, scope: Option<&Element>, selector: &str) -> Option<Element> {
        let found = match scope {
            Some(element) => element.query_selector(selector),
            None => self.document.query_selector(selector),
        };
        found.ok().flatten()
    }

    fn query_all(&self, scope: Option<&Element>, selector: &str) -> Vec<Element> {
        let found = match scope {
            Some(element) => element.query_selector_all(selector),
            None => self.document.query_selector_all(selector),
        };
        found.map(elements).unwrap_or_default()
    }

    fn parent(&self, node: &Element) -> Option<Element> {
        node.parent_element()
    }

    fn first_child(&self, node: &Element) -> Option<Element> {
        node.first_element_child()
    }

    fn inline_style(&self, node: &Element) -> Option<String> {
        node.get_attribute("style")
    }

    fn set_inline_style(&self, node: &Element, style: &str) {
        if let Err(e) = node.set_attribute("style", style) {
            warn!(error = ?e, tag = %node.tag_name(), "failed to write inline style");
        }
    }

    fn location_path(&self) -> String {
        self.document
            .location()
            .and_then(|location| location.pathname().ok())
            .unwrap_or_default()
    }
}
