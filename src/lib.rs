//! Sceneline Core
//!
//! Object model and schema-versioned persistence core for the Sceneline
//! media-timeline interchange format.
//!
//! ## Features
//!
//! - **Runtime type registry**: heterogeneous record types are constructed
//!   polymorphically from a `Name.Version` tag registered at startup
//! - **Schema evolution**: per-version upgrade functions walk older field
//!   maps forward to the current schema; unknown fields are preserved as
//!   dynamic fields rather than discarded
//! - **Self-describing JSON**: every object node carries a discriminator tag
//!   and a reserved metadata mapping, nested inline
//! - **Deep clone with cycle rejection**: copies share no ownership with the
//!   source graph, and a cyclic graph is a detected error, never a
//!   silently truncated copy
//! - **Structural equivalence**: recursive, identity-independent comparison
//!   that terminates even on self-referential metadata
//!
//! ## Data flow
//!
//! ```text
//! construct / read_from_string
//!         │
//!         ▼
//! SchemaRegistry ──► constructor + upgrade chain ──► FieldStore
//!         │                                              │
//!         ▼                                              ▼
//! SerializableObject ◄── metadata / typed / dynamic fields
//!         │
//!         ├── deep_clone (cycle-checked)
//!         ├── is_equivalent_to (identity-guarded)
//!         ▼
//! write_to_string / write_to_file
//! ```

mod clone;
mod equivalence;
pub mod error;
pub mod fields;
pub mod json;
pub mod object;
pub mod opentime;
pub mod registry;
pub mod value;

pub use error::{CoreError, Result};
pub use fields::FieldStore;
pub use json::{read_from_file, read_from_string, write_to_file, write_to_string};
pub use object::{Composable, ObjectRef, SerializableObject};
pub use opentime::{RationalTime, TimeRange, TimeTransform};
pub use registry::{
    construct_from_schema, register_type, register_upgrade_function_for, registry, Constructor,
    FieldMap, SchemaRegistry, UpgradeFn,
};
pub use value::{Dictionary, Value};
