//! A process-local, type-keyed value registry.
//!
//! Values are stored by their type and an instance name. A registry can
//! require that each type or each name hold a single instance, and that
//! stored types meet a minimum namedness and accessibility. Every
//! operation takes options; the same options configure a registry when it
//! is built and shape a single call afterwards.
//!
//! ```rust
//! use typereg::{describe, with_name, with_unique_name, Registry};
//!
//! #[derive(Clone, Debug, PartialEq)]
//! pub struct Endpoint(&'static str);
//! describe!(pub Endpoint);
//!
//! let registry = Registry::new(with_unique_name()).unwrap();
//! registry.set(Endpoint("primary"), with_name("a")).unwrap();
//! registry.set(Endpoint("backup"), with_name("b")).unwrap();
//! assert!(registry.set(Endpoint("again"), with_name("b")).is_err());
//!
//! assert_eq!(registry.get::<Endpoint>(with_name("b")).unwrap(), Endpoint("backup"));
//! assert_eq!(registry.get_all(()).unwrap().len(), 1);
//! ```
//!
//! # Crate layout
//!
//! - [`registry`] -- [`Registry`] and its four operations.
//! - [`options`] -- option constructors, the chaining [`Options`] builder
//!   and the priority engine.
//! - [`global`] -- the swappable default registry and free functions.
//! - [`config`] -- [`RegistryConfig`], the declarative configuration.
//! - [`error`] -- [`RegistryError`] and [`ErrorKind`].
//!
//! Type classification lives in the `typereg-access` crate and is
//! re-exported here.

pub mod config;
pub mod error;
pub mod global;
pub mod options;
pub mod registry;
pub mod store;

mod call;
mod clone;
mod construct;
#[cfg(test)]
mod fixtures;

pub use config::RegistryConfig;
pub use error::{ErrorKind, RegistryError, Result};
pub use global::{default_registry, get, get_all, set, set_default_registry, unset};
pub use options::{
    with_accessibility, with_clone_config, with_clone_entries, with_clone_registry, with_name,
    with_namedness, with_registry, with_unique_name, with_unique_type, Opt, OptionSource, Options,
};
pub use registry::Registry;
pub use store::{Entries, Value};

pub use typereg_access as access;
pub use typereg_access::{
    describe, Accessibility, Classification, Context, Describe, Namedness, TypeDescriptor, TypeKey,
    Visibility,
};
