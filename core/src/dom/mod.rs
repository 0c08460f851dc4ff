//! Host page access
//!
//! The engine never owns host nodes. [`HostDom`] is the capability it needs
//! from the page: synchronous queries that may come back empty, parent/child
//! navigation, and reading/writing the inline `style` attribute.

mod error;
mod memory;
pub mod selector;
pub mod style;

pub use error::SelectorError;
pub use memory::{MemoryDom, NodeId};
pub use selector::Selector;
pub use style::{Declaration, InlineStyle};

/// The host document as seen by the decorator.
///
/// Handles are only valid for the pass that located them; the host may
/// replace any node between passes.
pub trait HostDom {
    type Node: Clone;

    /// First match in document order, searching descendants of `scope`
    /// (or the whole document)
    fn query(&self, scope: Option<&Self::Node>, selector: &str) -> Option<Self::Node>;

    /// All matches in document order
    fn query_all(&self, scope: Option<&Self::Node>, selector: &str) -> Vec<Self::Node>;

    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    /// First element child
    fn first_child(&self, node: &Self::Node) -> Option<Self::Node>;

    fn inline_style(&self, node: &Self::Node) -> Option<String>;

    fn set_inline_style(&self, node: &Self::Node, style: &str);

    /// Path component of the document's current location
    fn location_path(&self) -> String;
}
