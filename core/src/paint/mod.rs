//! Variable binder ("paint")
//!
//! Projects preferences onto the four `--gw-*` custom properties on the
//! document root. Inline styles written by the decorator only reference these
//! variables, so a preference edit repaints the page without another
//! decoration pass.

mod error;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use gallery_wall_types::{HexColor, Preference, PreferenceSet};
use tracing::{debug, warn};

use crate::preferences::PreferenceStore;
use crate::storage::KeyValueStorage;

pub use error::StyleError;

/// Where custom properties live (the document root's style declaration).
pub trait StyleHost {
    fn set_property(&self, name: &str, value: &str) -> Result<(), StyleError>;
}

impl<T: StyleHost + ?Sized> StyleHost for Rc<T> {
    fn set_property(&self, name: &str, value: &str) -> Result<(), StyleError> {
        (**self).set_property(name, value)
    }
}

/// In-memory root style. Clones share the same properties.
#[derive(Debug, Clone, Default)]
pub struct MemoryStyleHost {
    properties: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MemoryStyleHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.properties.borrow().get(name).cloned()
    }

    /// Number of properties written so far
    pub fn len(&self) -> usize {
        self.properties.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.borrow().is_empty()
    }
}

impl StyleHost for MemoryStyleHost {
    fn set_property(&self, name: &str, value: &str) -> Result<(), StyleError> {
        self.properties
            .borrow_mut()
            .insert(name.to_string(), value.to_string());
        Ok(())
    }
}

/// The values behind the four style variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleVariableSet {
    pub wall_color: HexColor,
    pub frame_color: HexColor,
    pub frame_width: u8,
    pub count_per_row: u8,
}

impl Default for StyleVariableSet {
    fn default() -> Self {
        Self::from_preferences(&PreferenceSet::default())
    }
}

impl StyleVariableSet {
    pub fn from_preferences(prefs: &PreferenceSet) -> Self {
        Self {
            wall_color: prefs.wall_color.clone(),
            frame_color: prefs.frame_color.clone(),
            frame_width: prefs.frame_width,
            count_per_row: prefs.count_per_row,
        }
    }

    /// Serialized value for one preference's variable.
    ///
    /// Frame width carries a `px` suffix; the row count stays a bare number
    /// because it is used inside `repeat()`.
    pub fn serialized(&self, preference: Preference) -> String {
        match preference {
            Preference::WallColor => self.wall_color.to_string(),
            Preference::FrameColor => self.frame_color.to_string(),
            Preference::FrameWidth => format!("{}px", self.frame_width),
            Preference::CountPerRow => self.count_per_row.to_string(),
        }
    }

    /// `(variable name, serialized value)` for all four variables
    pub fn entries(&self) -> [(&'static str, String); 4] {
        Preference::ALL.map(|p| (p.css_variable(), self.serialized(p)))
    }

    /// Value of a variable by name (`--gw-frame-width` etc.)
    pub fn value_of(&self, name: &str) -> Option<String> {
        Preference::ALL
            .into_iter()
            .find(|p| p.css_variable() == name)
            .map(|p| self.serialized(p))
    }

    /// Substitute `var(--gw-*)` references with their current values.
    ///
    /// Unknown variables are left as written.
    pub fn resolve(&self, style: &str) -> String {
        let mut out = String::with_capacity(style.len());
        let mut rest = style;
        while let Some(start) = rest.find("var(") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 4..];
            let Some(end) = after.find(')') else {
                out.push_str(&rest[start..]);
                return out;
            };
            let name = after[..end].trim();
            match self.value_of(name) {
                Some(value) => out.push_str(&value),
                None => out.push_str(&rest[start..start + 4 + end + 1]),
            }
            rest = &after[end + 1..];
        }
        out.push_str(rest);
        out
    }
}

/// Single writer of the style variables.
#[derive(Debug)]
pub struct VariableBinder<H> {
    host: H,
    current: StyleVariableSet,
}

impl<H: StyleHost> VariableBinder<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            current: StyleVariableSet::default(),
        }
    }

    /// Write all four variables.
    ///
    /// Stored values win over `fallback`; the fallback only covers entries
    /// storage cannot supply. A preference whose last write failed paints
    /// from the store's in-memory value, never the stale stored one. Host
    /// failures are logged per variable and never abort the remaining writes.
    pub fn paint<S: KeyValueStorage>(
        &mut self,
        store: &PreferenceStore<S>,
        fallback: &PreferenceSet,
    ) -> &StyleVariableSet {
        let mut effective = fallback.clone();
        for preference in Preference::ALL {
            let value = if store.is_persisted(preference) {
                store.stored(preference)
            } else {
                Some(store.snapshot().get(preference))
            };
            if let Some(value) = value {
                effective.set(preference, value);
            }
        }
        self.apply(StyleVariableSet::from_preferences(&effective))
    }

    /// Write an explicit variable set, bypassing storage
    pub fn apply(&mut self, variables: StyleVariableSet) -> &StyleVariableSet {
        for (name, value) in variables.entries() {
            if let Err(e) = self.host.set_property(name, &value) {
                warn!(name, error = %e, "failed to set style variable");
            }
        }
        debug!(
            wall = %variables.wall_color,
            frame = %variables.frame_color,
            frame_width = variables.frame_width,
            count_per_row = variables.count_per_row,
            "painted style variables"
        );
        self.current = variables;
        &self.current
    }

    /// Variables as last painted
    pub fn variables(&self) -> &StyleVariableSet {
        &self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gallery_wall_types::PreferenceEdit;
    use crate::storage::MemoryStorage;

    #[test]
    fn frame_width_gets_px_suffix() {
        let host = MemoryStyleHost::new();
        let mut binder = VariableBinder::new(host.clone());
        let store = PreferenceStore::new(MemoryStorage::new());
        binder.paint(&store, &PreferenceSet::default());

        assert_eq!(host.get("--gw-frame-width").as_deref(), Some("5px"));
        assert_eq!(host.get("--gw-count-per-row").as_deref(), Some("4"));
        assert_eq!(host.get("--gw-wall-color").as_deref(), Some("#e3e3e3"));
        assert_eq!(host.get("--gw-frame-color").as_deref(), Some("#000000"));
    }

    #[test]
    fn storage_wins_over_fallback() {
        let host = MemoryStyleHost::new();
        let mut binder = VariableBinder::new(host.clone());
        let store = PreferenceStore::new(MemoryStorage::with_items([("wallColor", "#111111")]));
        let fallback = PreferenceSet {
            wall_color: HexColor::parse("#abcdef").unwrap(),
            frame_width: 9,
            ..PreferenceSet::default()
        };
        binder.paint(&store, &fallback);

        assert_eq!(host.get("--gw-wall-color").as_deref(), Some("#111111"));
        // nothing stored for frame width, so the fallback applies
        assert_eq!(host.get("--gw-frame-width").as_deref(), Some("9px"));
    }

    #[test]
    fn unsaved_edit_beats_stale_storage() {
        let host = MemoryStyleHost::new();
        let mut binder = VariableBinder::new(host.clone());
        let storage = MemoryStorage::with_items([("wallColor", "#111111")]);
        let mut store = PreferenceStore::new(storage.clone());
        store.load();
        storage.set_writable(false);
        store.apply(&PreferenceEdit::WallColor { value: "#abcdef".into() }).unwrap();

        binder.paint(&store, &PreferenceSet::default());
        assert_eq!(host.get("--gw-wall-color").as_deref(), Some("#abcdef"));
        assert_eq!(storage.peek("wallColor").as_deref(), Some("#111111"));
    }

    #[test]
    fn paint_is_idempotent() {
        let host = MemoryStyleHost::new();
        let mut binder = VariableBinder::new(host.clone());
        let store = PreferenceStore::new(MemoryStorage::with_items([("frameWidth", "8")]));
        let first = binder.paint(&store, &PreferenceSet::default()).clone();
        let second = binder.paint(&store, &PreferenceSet::default()).clone();
        assert_eq!(first, second);
        assert_eq!(host.len(), 4);
    }

    #[test]
    fn resolve_substitutes_known_variables() {
        let vars = StyleVariableSet {
            frame_color: HexColor::parse("#ff0000").unwrap(),
            frame_width: 8,
            ..StyleVariableSet::default()
        };
        assert_eq!(
            vars.resolve("background-color: var(--gw-frame-color) !important; padding: var(--gw-frame-width)"),
            "background-color: #ff0000 !important; padding: 8px"
        );
        assert_eq!(vars.resolve("color: var(--other)"), "color: var(--other)");
        assert_eq!(vars.resolve("broken: var(--gw"), "broken: var(--gw");
    }
}
