//! The defaults registry
//!
//! A registry starts out configuring: `configure` may be called any number
//! of times to add or replace defaults. The first resolution (or an explicit
//! `initialize`) locks it, after which the entries never change and every
//! further `configure` fails.

use crate::config::RegistryOptions;
use crate::registry::builder::DefaultsBuilder;
use crate::registry::entry::Entry;
use crate::registry::report::{EntryReport, RegistryReport};
use crate::types::DefaultsError;
use chrono::{DateTime, Utc};
use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};

pub struct DefaultsRegistry {
    options: RegistryOptions,
    entries: HashMap<TypeId, Entry>,
    /// Set exactly once, by the lock transition
    locked_at: OnceLock<DateTime<Utc>>,
}

impl DefaultsRegistry {
    pub fn new() -> Self {
        Self::with_options(RegistryOptions::default())
    }

    pub fn with_options(options: RegistryOptions) -> Self {
        Self {
            options,
            entries: HashMap::new(),
            locked_at: OnceLock::new(),
        }
    }

    pub fn options(&self) -> &RegistryOptions {
        &self.options
    }

    /// Add or replace defaults.
    ///
    /// The mutator's inserts are applied together when it returns `Ok`; if
    /// it returns an error the registry is left exactly as it was.
    pub fn configure<F>(&mut self, mutator: F) -> Result<(), DefaultsError>
    where
        F: FnOnce(&mut DefaultsBuilder<'_>) -> Result<(), DefaultsError>,
    {
        if self.is_initialized() {
            warn!(registry = %self.options.name, "Rejected configuration of locked defaults registry");
            return Err(DefaultsError::ConfigurationLocked);
        }

        let mut builder = DefaultsBuilder::new(&self.entries);
        if let Err(e) = mutator(&mut builder) {
            warn!(registry = %self.options.name, "Discarded configuration batch: {}", e);
            return Err(e);
        }

        let staged = builder.into_staged();
        debug!(
            registry = %self.options.name,
            "Committing {} default(s)",
            staged.len()
        );
        self.entries.extend(staged);

        Ok(())
    }

    /// Lock the registry. Calling this more than once has no further effect.
    pub fn initialize(&self) {
        self.locked_at.get_or_init(|| {
            info!(
                registry = %self.options.name,
                entries = self.entries.len(),
                "Defaults registry locked"
            );
            Utc::now()
        });
    }

    pub fn is_initialized(&self) -> bool {
        self.locked_at.get().is_some()
    }

    pub fn locked_at(&self) -> Option<DateTime<Utc>> {
        self.locked_at.get().copied()
    }

    /// Resolve the default registered under exactly `T`.
    ///
    /// A value registered under a trait object key is not found by asking for
    /// its concrete type, and the reverse; use [`resolve_keyed`] for that.
    ///
    /// [`resolve_keyed`]: DefaultsRegistry::resolve_keyed
    pub fn resolve<T>(&self) -> Result<Arc<T>, DefaultsError>
    where
        T: ?Sized + 'static,
    {
        self.resolve_keyed::<T, T>()
    }

    /// Resolve the default registered under `K`, viewed as `T`.
    ///
    /// `T` may be the key type itself, the concrete type that was registered,
    /// or any type added with [`StagedDefault::also_as`].
    ///
    /// [`StagedDefault::also_as`]: crate::registry::StagedDefault::also_as
    pub fn resolve_keyed<K, T>(&self) -> Result<Arc<T>, DefaultsError>
    where
        K: ?Sized + 'static,
        T: ?Sized + 'static,
    {
        self.initialize();

        let result = self.lookup::<K, T>();

        if self.options.trace_resolutions {
            match &result {
                Ok(_) => debug!(
                    registry = %self.options.name,
                    "Resolved {} as {}",
                    type_name::<K>(),
                    type_name::<T>()
                ),
                Err(e) if e.is_resolution_failure() => {
                    debug!(registry = %self.options.name, "Resolution failed: {}", e)
                }
                Err(_) => {}
            }
        }

        result
    }

    fn lookup<K, T>(&self) -> Result<Arc<T>, DefaultsError>
    where
        K: ?Sized + 'static,
        T: ?Sized + 'static,
    {
        let entry = self
            .entries
            .get(&TypeId::of::<K>())
            .ok_or(DefaultsError::Unresolved(type_name::<K>()))?;

        entry.view::<T>().ok_or_else(|| DefaultsError::TypeMismatch {
            key: entry.key(),
            stored: entry.concrete(),
            requested: type_name::<T>(),
        })
    }

    /// Check for a default under `K` without locking the registry
    pub fn contains<K: ?Sized + 'static>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<K>())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of the registry's status, for diagnostics
    pub fn report(&self) -> RegistryReport {
        let mut entries: Vec<EntryReport> = self
            .entries
            .values()
            .map(|entry| EntryReport {
                key: entry.key().to_string(),
                concrete: entry.concrete().to_string(),
                views: entry.view_names().map(str::to_string).collect(),
            })
            .collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));

        RegistryReport {
            name: self.options.name.clone(),
            initialized: self.is_initialized(),
            locked_at: self.locked_at(),
            entries,
        }
    }
}

impl Default for DefaultsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DefaultsRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultsRegistry")
            .field("name", &self.options.name)
            .field("entries", &self.entries.len())
            .field("locked_at", &self.locked_at.get())
            .finish()
    }
}
