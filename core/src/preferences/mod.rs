//! Preference store - the four user settings backed by durable storage
//!
//! Storage is the source of truth. Reads never fail: a missing, malformed or
//! out-of-range entry reads as the typed default, and an unavailable store
//! degrades to in-memory state. Writes never fail either; a lost write is
//! logged and the in-memory snapshot keeps the new value.

mod error;

use std::collections::HashSet;

use gallery_wall_types::{Preference, PreferenceEdit, PreferenceSet, PreferenceValue, HexColor};
use tracing::{debug, warn};

use crate::storage::KeyValueStorage;

pub use error::EditRejected;

/// Parse a stored string for the given preference.
///
/// Returns `None` for anything that is not a valid value of the right kind,
/// including integers outside the preference's range.
pub fn parse_value(preference: Preference, raw: &str) -> Option<PreferenceValue> {
    match preference.bounds() {
        None => HexColor::parse(raw).map(PreferenceValue::Color),
        Some(range) => {
            let raw = raw.trim();
            let number = match raw.parse::<i64>() {
                Ok(n) => n,
                // "8.0" is what a number input can hand back
                Err(_) => {
                    let f = raw.parse::<f64>().ok()?;
                    if !f.is_finite() || f.fract() != 0.0 {
                        return None;
                    }
                    f as i64
                }
            };
            let number = u8::try_from(number).ok()?;
            range.contains(&number).then_some(PreferenceValue::Number(number))
        }
    }
}

/// Typed access to the persisted preferences.
#[derive(Debug)]
pub struct PreferenceStore<S> {
    storage: S,
    current: PreferenceSet,
    /// Preferences whose latest value failed to reach storage
    unsaved: HashSet<Preference>,
}

impl<S: KeyValueStorage> PreferenceStore<S> {
    /// Create a store with default in-memory values. Storage is not touched
    /// until [`load`](Self::load) or [`get`](Self::get).
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            current: PreferenceSet::default(),
            unsaved: HashSet::new(),
        }
    }

    /// Read every preference and mirror defaults back into storage for any
    /// entry that is absent or malformed, so storage and memory agree.
    pub fn load(&mut self) -> &PreferenceSet {
        for preference in Preference::ALL {
            let stored = self.stored(preference);
            let value = match stored {
                Some(value) => {
                    self.unsaved.remove(&preference);
                    value
                }
                None => {
                    let default = PreferenceSet::default().get(preference);
                    debug!(%preference, value = %default.to_storage_string(), "seeding preference default");
                    self.write(preference, &default);
                    default
                }
            };
            self.current.set(preference, value);
        }
        &self.current
    }

    /// Stored value, or the typed default if absent or malformed.
    ///
    /// A preference whose last write failed reads from memory instead, so a
    /// full quota never hands back the value the user just replaced.
    pub fn get(&self, preference: Preference) -> PreferenceValue {
        if !self.is_persisted(preference) {
            return self.current.get(preference);
        }
        self.stored(preference)
            .unwrap_or_else(|| PreferenceSet::default().get(preference))
    }

    /// False when the in-memory value is newer than storage
    pub fn is_persisted(&self, preference: Preference) -> bool {
        !self.unsaved.contains(&preference)
    }

    /// The parsed stored value, `None` if absent, malformed or unreadable
    pub fn stored(&self, preference: Preference) -> Option<PreferenceValue> {
        let key = preference.storage_key();
        let raw = match self.storage.get_item(key) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(key, error = %e, "preference read failed, using default");
                return None;
            }
        };
        let parsed = parse_value(preference, &raw);
        if parsed.is_none() {
            warn!(key, raw = %raw, "malformed preference, using default");
        }
        parsed
    }

    /// Write a value. A failed storage write is logged and the in-memory
    /// snapshot still updates.
    ///
    /// Returns false, touching neither memory nor storage, when the value's
    /// kind does not fit the preference.
    pub fn set(&mut self, preference: Preference, value: PreferenceValue) -> bool {
        if !self.current.set(preference, value.clone()) {
            warn!(%preference, value = %value.to_storage_string(), "value kind does not fit preference");
            return false;
        }
        self.write(preference, &value);
        true
    }

    /// In-memory snapshot, equal to storage after [`load`](Self::load)
    pub fn snapshot(&self) -> &PreferenceSet {
        &self.current
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Apply a settings-panel edit, returning the preference that changed.
    pub fn apply(&mut self, edit: &PreferenceEdit) -> Result<Preference, EditRejected> {
        let (preference, value) = match edit {
            PreferenceEdit::WallColor { value } => (Preference::WallColor, parse_color(value)?),
            PreferenceEdit::FrameColor { value } => (Preference::FrameColor, parse_color(value)?),
            PreferenceEdit::FrameWidth { value } => {
                (Preference::FrameWidth, clamped(Preference::FrameWidth, *value))
            }
            PreferenceEdit::CountPerRow { value } => {
                (Preference::CountPerRow, clamped(Preference::CountPerRow, *value))
            }
            PreferenceEdit::Step { preference, delta } => {
                (*preference, self.stepped(*preference, *delta)?)
            }
        };
        self.set(preference, value);
        Ok(preference)
    }

    fn stepped(&self, preference: Preference, delta: i32) -> Result<PreferenceValue, EditRejected> {
        let range = preference
            .bounds()
            .ok_or(EditRejected::NotNumeric { preference })?;
        let PreferenceValue::Number(current) = self.current.get(preference) else {
            return Err(EditRejected::NotNumeric { preference });
        };
        let next = i32::from(current).saturating_add(delta);
        match u8::try_from(next) {
            Ok(n) if range.contains(&n) => Ok(PreferenceValue::Number(n)),
            _ => Err(EditRejected::OutOfRange { preference, value: next }),
        }
    }

    fn write(&mut self, preference: Preference, value: &PreferenceValue) {
        let key = preference.storage_key();
        match self.storage.set_item(key, &value.to_storage_string()) {
            Ok(()) => {
                self.unsaved.remove(&preference);
            }
            Err(e) => {
                warn!(key, error = %e, "preference write failed, keeping value in memory");
                self.unsaved.insert(preference);
            }
        }
    }
}

fn parse_color(value: &str) -> Result<PreferenceValue, EditRejected> {
    HexColor::parse(value)
        .map(PreferenceValue::Color)
        .ok_or_else(|| EditRejected::InvalidColor {
            value: value.to_string(),
        })
}

fn clamped(preference: Preference, value: i32) -> PreferenceValue {
    let (min, max) = preference
        .bounds()
        .map(|r| (i32::from(*r.start()), i32::from(*r.end())))
        .unwrap_or((0, i32::from(u8::MAX)));
    PreferenceValue::Number(value.clamp(min, max) as u8)
}
