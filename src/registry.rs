//! Schema Registry
//!
//! Process-wide mapping from schema name to its current version, constructor,
//! and per-version upgrade functions. Deserialization resolves every
//! `Name.Version` tag through [`SchemaRegistry::construct`], which walks the
//! upgrade chain so documents written by older schema versions load into the
//! current one. The registry is append-mostly: registrations happen once per
//! concrete type at startup and are never removed.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::sync::{Mutex, MutexGuard};

use once_cell::sync::Lazy;
use tracing::debug;

use crate::error::{CoreError, Result};
use crate::object::{Composable, ObjectRef, SerializableObject};
use crate::value::Dictionary;

/// Field map consumed and produced by upgrade functions
pub type FieldMap = Dictionary;

/// Produces a default instance of a concrete schema
pub type Constructor = Box<dyn Fn() -> SerializableObject + Send + Sync>;

/// Pure transform from an older field map to the next version's field map
pub type UpgradeFn = Box<dyn Fn(FieldMap) -> FieldMap + Send + Sync>;

/// Registry entry for one schema name
struct SchemaRecord {
    current_version: u32,
    constructor: Constructor,
    /// Keyed by target version; targets are contiguous starting at 2.
    upgrades: BTreeMap<u32, UpgradeFn>,
}

/// Mapping from schema name to record
///
/// The process-wide instance lives behind [`registry()`]; independent
/// instances are constructible for tests.
#[derive(Default)]
pub struct SchemaRegistry {
    records: HashMap<String, SchemaRecord>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-loaded with the builtin schemas
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry
            .register(
                SerializableObject::SCHEMA_NAME,
                SerializableObject::SCHEMA_VERSION,
                Box::new(SerializableObject::new),
            )
            .expect("builtin base schema registers into an empty registry");
        registry
            .register(
                Composable::SCHEMA_NAME,
                Composable::SCHEMA_VERSION,
                Box::new(|| {
                    SerializableObject::with_schema(
                        Composable::SCHEMA_NAME,
                        Composable::SCHEMA_VERSION,
                    )
                }),
            )
            .expect("builtin Composable schema registers into an empty registry");
        registry
    }

    /// Register a schema name at a version
    ///
    /// A later registration of the same name at a higher version updates the
    /// current version and constructor while keeping the upgrade map.
    /// Redefinition at an already-registered version fails.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        version: u32,
        constructor: Constructor,
    ) -> Result<()> {
        let name = name.into();
        if version == 0 {
            return Err(CoreError::UnsupportedSchema { name, version });
        }
        match self.records.entry(name) {
            Entry::Occupied(mut entry) => {
                if version <= entry.get().current_version {
                    return Err(CoreError::SchemaAlreadyRegistered {
                        name: entry.key().clone(),
                        version,
                    });
                }
                debug!(
                    schema = %entry.key(),
                    from = entry.get().current_version,
                    to = version,
                    "schema version updated"
                );
                let record = entry.get_mut();
                record.current_version = version;
                record.constructor = constructor;
            }
            Entry::Vacant(entry) => {
                debug!(schema = %entry.key(), version, "schema registered");
                entry.insert(SchemaRecord {
                    current_version: version,
                    constructor,
                    upgrades: BTreeMap::new(),
                });
            }
        }
        Ok(())
    }

    /// Attach the upgrade function producing `target_version`'s field map
    ///
    /// Targets must arrive contiguously: 2, then 3, and so on, never past
    /// one above the current version. A gap or an out-of-order target is a
    /// registration error, not something resolved at construct time.
    pub fn register_upgrade(
        &mut self,
        name: &str,
        target_version: u32,
        upgrade: UpgradeFn,
    ) -> Result<()> {
        let record = self
            .records
            .get_mut(name)
            .ok_or_else(|| CoreError::UnsupportedSchema {
                name: name.to_string(),
                version: target_version,
            })?;
        let highest = record.upgrades.keys().next_back().copied().unwrap_or(1);
        let expected = highest + 1;
        if target_version != expected || target_version > record.current_version + 1 {
            return Err(CoreError::InvalidUpgradeOrder {
                name: name.to_string(),
                expected,
                got: target_version,
            });
        }
        debug!(schema = %name, target_version, "upgrade function registered");
        record.upgrades.insert(target_version, upgrade);
        Ok(())
    }

    /// The polymorphic factory: build an instance from a name+version tag
    ///
    /// Constructing at the current version is the identity transform on the
    /// field map. An older version walks every registered upgrade function
    /// with a target above it, in ascending order, each consuming the
    /// previous output; each function runs exactly once per call, with no
    /// caching across calls. A version newer than the current one has no
    /// downgrade path and is refused.
    pub fn construct(&self, name: &str, version: u32, fields: FieldMap) -> Result<ObjectRef> {
        let record = self.records.get(name).ok_or_else(|| CoreError::UnsupportedSchema {
            name: name.to_string(),
            version,
        })?;
        if version == 0 || version > record.current_version {
            return Err(CoreError::UnsupportedSchema {
                name: name.to_string(),
                version,
            });
        }

        let mut fields = fields;
        let active = record
            .upgrades
            .range((Bound::Excluded(version), Bound::Included(record.current_version)));
        for (target, upgrade) in active {
            debug!(schema = %name, from = version, to = target, "applying upgrade function");
            fields = upgrade(fields);
        }

        let mut object = (record.constructor)();
        object.fields.absorb(fields);
        Ok(ObjectRef::new(object))
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    pub fn current_version(&self, name: &str) -> Option<u32> {
        self.records.get(name).map(|record| record.current_version)
    }
}

static REGISTRY: Lazy<Mutex<SchemaRegistry>> =
    Lazy::new(|| Mutex::new(SchemaRegistry::with_builtins()));

/// Lock the process-wide registry
///
/// Registration is rare and construct is read-mostly, so a single guard
/// around all three operations is sufficient. A poisoned lock is recovered:
/// the registry's state is append-mostly and stays consistent across a
/// panicking registrant.
pub fn registry() -> MutexGuard<'static, SchemaRegistry> {
    REGISTRY.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Register a concrete type with the process-wide registry
pub fn register_type(name: impl Into<String>, version: u32, constructor: Constructor) -> Result<()> {
    registry().register(name, version, constructor)
}

/// Attach an upgrade function to a schema in the process-wide registry
pub fn register_upgrade_function_for(
    name: &str,
    target_version: u32,
    upgrade: UpgradeFn,
) -> Result<()> {
    registry().register_upgrade(name, target_version, upgrade)
}

/// Construct an instance through the process-wide registry
pub fn construct_from_schema(name: &str, version: u32, fields: FieldMap) -> Result<ObjectRef> {
    registry().construct(name, version, fields)
}
