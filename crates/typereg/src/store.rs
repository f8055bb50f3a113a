//! The two-level entry map: type key -> instance name -> value.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use typereg_access::TypeKey;

/// A stored value. Shared so snapshots and clones never copy user data.
pub type Value = Arc<dyn Any + Send + Sync>;

/// A snapshot of entries, keyed by type then instance name.
pub type Entries = HashMap<TypeKey, HashMap<String, Value>>;

/// Entry storage.
///
/// Invariant: a type key is present only while it has at least one
/// instance.
#[derive(Clone, Debug, Default)]
pub(crate) struct Store {
    entries: Entries,
}

impl Store {
    pub fn instances(&self, ty: &TypeKey) -> Option<&HashMap<String, Value>> {
        self.entries.get(ty)
    }

    /// Number of instances stored for `ty`.
    pub fn count(&self, ty: &TypeKey) -> usize {
        self.entries.get(ty).map_or(0, HashMap::len)
    }

    pub fn contains(&self, ty: &TypeKey, name: &str) -> bool {
        self.entries.get(ty).is_some_and(|m| m.contains_key(name))
    }

    /// Insert or replace; returns the replaced value.
    pub fn insert(&mut self, ty: TypeKey, name: String, value: Value) -> Option<Value> {
        self.entries.entry(ty).or_default().insert(name, value)
    }

    /// Remove one instance, dropping the type key with its last instance.
    pub fn remove(&mut self, ty: &TypeKey, name: &str) -> Option<Value> {
        let instances = self.entries.get_mut(ty)?;
        let removed = instances.remove(name);
        if instances.is_empty() {
            self.entries.remove(ty);
        }
        removed
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TypeKey, &HashMap<String, Value>)> {
        self.entries.iter()
    }

    /// Total number of instances across all types.
    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    pub fn type_count(&self) -> usize {
        self.entries.len()
    }

    pub fn into_entries(self) -> Entries {
        self.entries
    }
}
