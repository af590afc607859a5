//! # Type Registry
//!
//! The registry maps (namespace hash, type hash) pairs to their canonical
//! [`TupleType`]. Decoding cannot proceed without it: the wire carries
//! only the hash pair, and the registry supplies the schema that makes the
//! offset table addressable by name.

use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::Mutex;

use crate::hash::SyncFnv32;
use crate::tuple::TupleType;

/// A process-wide, cheaply cloneable map from hash pair to tuple type.
///
/// All operations serialize through a single mutex. Clones share the same
/// underlying map, so one registry populated at startup can be handed to
/// every decoder. The registry stores schemas only; it never holds tuple
/// payloads.
#[derive(Debug, Clone)]
pub struct Registry {
    inner: Arc<RegistryInner>,
}

#[derive(Debug)]
struct RegistryInner {
    content: Mutex<HashMap<(u32, u32), TupleType>>,
    hasher: SyncFnv32,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                content: Mutex::new(HashMap::new()),
                hasher: SyncFnv32::new(),
            }),
        }
    }

    /// Inserts the type if its hash pair is not already present.
    /// Duplicate registrations are silently ignored, so the final state
    /// depends only on the set of distinct hash pairs.
    pub fn register(&self, tuple_type: TupleType) {
        let key = (tuple_type.namespace_hash(), tuple_type.type_hash());
        self.inner
            .content
            .lock()
            .entry(key)
            .or_insert(tuple_type);
    }

    /// Removes the type by its hash pair, if present.
    pub fn unregister(&self, tuple_type: &TupleType) {
        let key = (tuple_type.namespace_hash(), tuple_type.type_hash());
        self.inner.content.lock().remove(&key);
    }

    /// Looks up the type for a hash pair, returning an owned copy so the
    /// caller is independent of later registry mutations.
    pub fn get(&self, namespace_hash: u32, type_hash: u32) -> Option<TupleType> {
        self.inner
            .content
            .lock()
            .get(&(namespace_hash, type_hash))
            .cloned()
    }

    pub fn contains(&self, tuple_type: &TupleType) -> bool {
        self.contains_hash(tuple_type.namespace_hash(), tuple_type.type_hash())
    }

    pub fn contains_hash(&self, namespace_hash: u32, type_hash: u32) -> bool {
        self.inner
            .content
            .lock()
            .contains_key(&(namespace_hash, type_hash))
    }

    pub fn contains_name(&self, namespace: &str, name: &str) -> bool {
        let namespace_hash = self.inner.hasher.hash(namespace.as_bytes());
        let type_hash = self.inner.hasher.hash(name.as_bytes());
        self.contains_hash(namespace_hash, type_hash)
    }

    pub fn len(&self) -> usize {
        self.inner.content.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuple::{Field, FieldType};

    fn user_type() -> TupleType {
        let mut t = TupleType::new("testing", "user");
        t.add_version(vec![Field::new("uuid", true, FieldType::String)])
            .unwrap();
        t
    }

    #[test]
    fn register_and_get() {
        let registry = Registry::new();
        let user = user_type();
        registry.register(user.clone());

        let found = registry
            .get(user.namespace_hash(), user.type_hash())
            .unwrap();
        assert_eq!(found, user);
        assert!(registry.contains(&user));
        assert!(registry.contains_name("testing", "user"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn duplicate_registration_is_ignored() {
        let registry = Registry::new();
        registry.register(user_type());
        registry.register(user_type());
        registry.register(user_type());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unregister_removes_by_key() {
        let registry = Registry::new();
        let user = user_type();
        registry.register(user.clone());
        registry.unregister(&user);
        assert!(!registry.contains(&user));
        assert!(registry.is_empty());
    }

    #[test]
    fn missing_type_returns_none() {
        let registry = Registry::new();
        assert!(registry.get(1, 2).is_none());
        assert!(!registry.contains_hash(1, 2));
    }

    #[test]
    fn clones_share_the_map() {
        let registry = Registry::new();
        let clone = registry.clone();
        clone.register(user_type());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn concurrent_registration_converges() {
        let registry = Registry::new();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                std::thread::spawn(move || registry.register(user_type()))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(registry.len(), 1);
    }
}
