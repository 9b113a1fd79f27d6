//! Parameter Storage Types
//!
//! A bounded name/value store. Persistence belongs to the platform; the
//! store only tracks whether it has unsaved changes.

use super::error::ParameterError;
use bitflags::bitflags;
use heapless::index_map::FnvIndexMap;
use heapless::String;

/// Maximum parameter name length
pub const PARAM_NAME_LEN: usize = 17;

/// Maximum number of parameters
pub const MAX_PARAMS: usize = 32;

bitflags! {
    /// Parameter flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ParamFlags: u8 {
        /// Not listed to ground stations
        const HIDDEN = 0b00000001;
        /// Cannot be changed after registration
        const READ_ONLY = 0b00000010;
    }
}

/// Parameter value types
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    Bool(bool),
    /// 32-bit signed integer, also used for bitmasks and enums
    Int(i32),
    Float(f32),
}

#[derive(Debug, Clone)]
struct Entry {
    value: ParamValue,
    flags: ParamFlags,
}

type Key = String<PARAM_NAME_LEN>;

fn key(name: &str) -> Result<Key, ParameterError> {
    let mut key = Key::new();
    key.push_str(name)
        .map_err(|_| ParameterError::InvalidConfig)?;
    Ok(key)
}

/// Parameter store for configuration management
pub struct ParameterStore {
    entries: FnvIndexMap<Key, Entry, MAX_PARAMS>,
    dirty: bool,
}

impl ParameterStore {
    pub fn new() -> Self {
        Self {
            entries: FnvIndexMap::new(),
            dirty: false,
        }
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        let key = key(name).ok()?;
        self.entries.get(&key).map(|e| &e.value)
    }

    /// Set an existing parameter. Marks the store dirty.
    pub fn set(&mut self, name: &str, value: ParamValue) -> Result<(), ParameterError> {
        let key = key(name)?;
        let entry = self
            .entries
            .get_mut(&key)
            .ok_or(ParameterError::InvalidConfig)?;
        if entry.flags.contains(ParamFlags::READ_ONLY) {
            return Err(ParameterError::ReadOnly);
        }
        entry.value = value;
        self.dirty = true;
        Ok(())
    }

    /// Register a parameter with its default value.
    ///
    /// Re-registering an existing name keeps the stored value.
    pub fn register(
        &mut self,
        name: &str,
        default_value: ParamValue,
        flags: ParamFlags,
    ) -> Result<(), ParameterError> {
        let key = key(name)?;
        if self.entries.contains_key(&key) {
            return Ok(());
        }
        self.entries
            .insert(
                key,
                Entry {
                    value: default_value,
                    flags,
                },
            )
            .map_err(|_| ParameterError::StoreFull)?;
        self.dirty = true;
        Ok(())
    }

    pub fn is_hidden(&self, name: &str) -> bool {
        key(name)
            .ok()
            .and_then(|k| self.entries.get(&k))
            .is_some_and(|e| e.flags.contains(ParamFlags::HIDDEN))
    }

    /// Visible parameter names
    pub fn iter_names(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, e)| !e.flags.contains(ParamFlags::HIDDEN))
            .map(|(k, _)| k.as_str())
    }

    /// Visible parameter count
    pub fn count(&self) -> usize {
        self.iter_names().count()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Total parameter count, hidden included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_store_new() {
        let store = ParameterStore::new();
        assert_eq!(store.count(), 0);
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_parameter_store_register_and_get() {
        let mut store = ParameterStore::new();
        store
            .register("TEST", ParamValue::Int(42), ParamFlags::empty())
            .unwrap();
        assert_eq!(store.get("TEST"), Some(&ParamValue::Int(42)));
    }

    #[test]
    fn test_parameter_store_set() {
        let mut store = ParameterStore::new();
        store
            .register("TEST", ParamValue::Int(42), ParamFlags::empty())
            .unwrap();
        store.clear_dirty();
        store.set("TEST", ParamValue::Int(100)).unwrap();
        assert_eq!(store.get("TEST"), Some(&ParamValue::Int(100)));
        assert!(store.is_dirty());
    }

    #[test]
    fn test_parameter_store_set_unknown() {
        let mut store = ParameterStore::new();
        assert_eq!(
            store.set("UNKNOWN", ParamValue::Int(1)),
            Err(ParameterError::InvalidConfig)
        );
    }

    #[test]
    fn test_parameter_store_register_idempotent() {
        let mut store = ParameterStore::new();
        store
            .register("TEST", ParamValue::Int(42), ParamFlags::empty())
            .unwrap();
        store.set("TEST", ParamValue::Int(100)).unwrap();
        store
            .register("TEST", ParamValue::Int(42), ParamFlags::empty())
            .unwrap();
        assert_eq!(store.get("TEST"), Some(&ParamValue::Int(100)));
    }

    #[test]
    fn test_name_too_long() {
        let mut store = ParameterStore::new();
        assert_eq!(
            store.register(
                "ARMING_NAME_TOO_LONG",
                ParamValue::Int(0),
                ParamFlags::empty()
            ),
            Err(ParameterError::InvalidConfig)
        );
        assert_eq!(store.get("ARMING_NAME_TOO_LONG"), None);
    }

    #[test]
    fn test_store_full() {
        use core::fmt::Write;

        let mut store = ParameterStore::new();
        for i in 0..MAX_PARAMS {
            let mut name: String<8> = String::new();
            write!(name, "P{}", i).unwrap();
            store
                .register(&name, ParamValue::Int(0), ParamFlags::empty())
                .unwrap();
        }
        assert_eq!(
            store.register("LAST", ParamValue::Int(0), ParamFlags::empty()),
            Err(ParameterError::StoreFull)
        );
    }

    #[test]
    fn test_parameter_hidden() {
        let mut store = ParameterStore::new();
        store
            .register("SECRET", ParamValue::Int(7), ParamFlags::HIDDEN)
            .unwrap();
        store
            .register("VISIBLE", ParamValue::Int(1), ParamFlags::empty())
            .unwrap();
        assert!(store.is_hidden("SECRET"));
        assert_eq!(store.count(), 1);
        assert_eq!(store.len(), 2);
        assert_eq!(store.iter_names().collect::<std::vec::Vec<_>>(), ["VISIBLE"]);
    }

    #[test]
    fn test_parameter_read_only() {
        let mut store = ParameterStore::new();
        store
            .register("READONLY", ParamValue::Int(42), ParamFlags::READ_ONLY)
            .unwrap();
        assert_eq!(
            store.set("READONLY", ParamValue::Int(100)),
            Err(ParameterError::ReadOnly)
        );
    }
}
