//! Configuration handle passed to `DefaultsRegistry::configure`

use crate::registry::entry::{DefaultFor, Entry};
use crate::types::DefaultsError;
use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};
use tracing::debug;

/// Stages inserts against the registry's committed entries.
///
/// Nothing reaches the registry until the mutator that received the builder
/// returns `Ok`.
pub struct DefaultsBuilder<'a> {
    committed: &'a HashMap<TypeId, Entry>,
    staged: HashMap<TypeId, Entry>,
}

impl<'a> DefaultsBuilder<'a> {
    pub(crate) fn new(committed: &'a HashMap<TypeId, Entry>) -> Self {
        Self {
            committed,
            staged: HashMap::new(),
        }
    }

    /// Register `value` under `K`, failing if `K` already has a default
    pub fn insert_exclusive<K, V>(
        &mut self,
        value: V,
    ) -> Result<StagedDefault<'_, 'a, V>, DefaultsError>
    where
        K: ?Sized + Send + Sync + 'static,
        V: DefaultFor<K>,
    {
        let key = TypeId::of::<K>();
        if self.committed.contains_key(&key) || self.staged.contains_key(&key) {
            return Err(DefaultsError::DuplicateKey(type_name::<K>()));
        }

        debug!("Staged default {} for {}", type_name::<V>(), type_name::<K>());
        self.staged.insert(key, Entry::new::<K, V>(value));
        Ok(StagedDefault::new(self, key))
    }

    /// Register `value` under `K`, replacing any existing default
    pub fn insert_or_replace<K, V>(&mut self, value: V) -> StagedDefault<'_, 'a, V>
    where
        K: ?Sized + Send + Sync + 'static,
        V: DefaultFor<K>,
    {
        let key = TypeId::of::<K>();
        if self.committed.contains_key(&key) || self.staged.contains_key(&key) {
            debug!("Replacing default for {} with {}", type_name::<K>(), type_name::<V>());
        } else {
            debug!("Staged default {} for {}", type_name::<V>(), type_name::<K>());
        }

        self.staged.insert(key, Entry::new::<K, V>(value));
        StagedDefault::new(self, key)
    }

    pub(crate) fn into_staged(self) -> HashMap<TypeId, Entry> {
        self.staged
    }
}

/// The default just staged by an insert.
///
/// Derefs to the builder, so inserts can be chained.
pub struct StagedDefault<'b, 'a, V> {
    builder: &'b mut DefaultsBuilder<'a>,
    key: TypeId,
    _value: PhantomData<fn() -> V>,
}

impl<'b, 'a, V: Send + Sync + 'static> StagedDefault<'b, 'a, V> {
    fn new(builder: &'b mut DefaultsBuilder<'a>, key: TypeId) -> Self {
        Self {
            builder,
            key,
            _value: PhantomData,
        }
    }

    /// Also resolve this default when `A` is requested under its key.
    ///
    /// ```
    /// use defaults_registry::{default_for, DefaultsRegistry};
    ///
    /// trait Store: Send + Sync {}
    /// trait Health: Send + Sync {
    ///     fn healthy(&self) -> bool;
    /// }
    ///
    /// struct MemoryStore;
    /// impl Store for MemoryStore {}
    /// impl Health for MemoryStore {
    ///     fn healthy(&self) -> bool {
    ///         true
    ///     }
    /// }
    ///
    /// default_for!(MemoryStore => dyn Store, dyn Health);
    ///
    /// let mut registry = DefaultsRegistry::new();
    /// registry
    ///     .configure(|defaults| {
    ///         defaults
    ///             .insert_exclusive::<dyn Store, _>(MemoryStore)?
    ///             .also_as::<dyn Health>();
    ///         Ok(())
    ///     })
    ///     .unwrap();
    ///
    /// let health = registry.resolve_keyed::<dyn Store, dyn Health>().unwrap();
    /// assert!(health.healthy());
    /// assert!(registry.resolve::<dyn Health>().is_err());
    /// ```
    pub fn also_as<A>(self) -> Self
    where
        A: ?Sized + Send + Sync + 'static,
        V: DefaultFor<A>,
    {
        if let Some(entry) = self.builder.staged.get_mut(&self.key) {
            debug!("Added view {} to default for {}", type_name::<A>(), entry.key());
            entry.add_view::<A, V>();
        }
        self
    }
}

impl<'a, V> Deref for StagedDefault<'_, 'a, V> {
    type Target = DefaultsBuilder<'a>;

    fn deref(&self) -> &Self::Target {
        self.builder
    }
}

impl<V> DerefMut for StagedDefault<'_, '_, V> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.builder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    impl<V> std::fmt::Debug for StagedDefault<'_, '_, V> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("StagedDefault").field("key", &self.key).finish()
        }
    }

    #[test]
    fn test_exclusive_rejects_committed_key() {
        let mut committed = HashMap::new();
        committed.insert(TypeId::of::<u8>(), Entry::new::<u8, u8>(1));

        let mut builder = DefaultsBuilder::new(&committed);
        let err = builder.insert_exclusive::<u8, _>(2u8).unwrap_err();
        assert!(matches!(err, DefaultsError::DuplicateKey(name) if name == "u8"));
        assert!(builder.into_staged().is_empty());
    }

    #[test]
    fn test_exclusive_rejects_staged_key() {
        let committed = HashMap::new();
        let mut builder = DefaultsBuilder::new(&committed);
        builder.insert_exclusive::<String, _>("first".to_string()).unwrap();

        let err = builder
            .insert_exclusive::<String, _>("second".to_string())
            .unwrap_err();
        assert!(matches!(err, DefaultsError::DuplicateKey(_)));

        let staged = builder.into_staged();
        let kept = staged[&TypeId::of::<String>()].view::<String>().unwrap();
        assert_eq!(kept.as_str(), "first");
    }

    #[test]
    fn test_replace_overwrites_staged_key() {
        let committed = HashMap::new();
        let mut builder = DefaultsBuilder::new(&committed);
        builder
            .insert_or_replace::<i64, _>(1i64)
            .insert_or_replace::<i64, _>(2i64);

        let staged = builder.into_staged();
        assert_eq!(staged.len(), 1);
        assert_eq!(*staged[&TypeId::of::<i64>()].view::<i64>().unwrap(), 2);
    }

    trait Label: Send + Sync {
        fn label(&self) -> String;
    }

    impl Label for u16 {
        fn label(&self) -> String {
            format!("port {}", self)
        }
    }

    crate::default_for!(u16 => dyn Label);

    #[test]
    fn test_also_as_adds_view_to_staged_entry() {
        let committed = HashMap::new();
        let mut builder = DefaultsBuilder::new(&committed);
        builder.insert_exclusive::<u16, _>(8080u16).unwrap().also_as::<dyn Label>();

        let staged = builder.into_staged();
        let entry = &staged[&TypeId::of::<u16>()];
        assert_eq!(entry.view::<dyn Label>().unwrap().label(), "port 8080");
        assert!(!staged.contains_key(&TypeId::of::<dyn Label>()));
    }
}
