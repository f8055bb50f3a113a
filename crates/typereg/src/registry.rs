//! The registry: a lock-guarded store plus its persistent configuration.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;
use typereg_access::{classify, Context, Describe, TypeKey};

use crate::call::CallState;
use crate::clone::{copy_entries, EntryFilter};
use crate::config::{Config, RegistryConfig};
use crate::construct::Construction;
use crate::error::{RegistryError, Result};
use crate::options::{apply_source, OptionSource};
use crate::store::{Entries, Store};

/// A process-local map from type to named instances of that type.
///
/// Every operation takes the registry's lock for its whole duration, so
/// each `set`, `get`, `get_all` and `unset` is atomic. Operations that are
/// redirected with `with_registry` lock only the target registry.
///
/// Operations record their call site with `#[track_caller]`; accessibility
/// checks treat the caller's source file as its context.
pub struct Registry {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
pub(crate) struct Inner {
    pub store: Store,
    pub config: Config,
}

impl Registry {
    /// Build a registry from construction options.
    ///
    /// Fails with `NotSupported` for `with_registry` and with `BadOption`
    /// for repeated or conflicting options. Nothing is built on failure.
    ///
    /// ```rust
    /// use typereg::{with_name, Registry};
    ///
    /// let r = Registry::new(with_name("primary").with_unique_type()).unwrap();
    /// assert_eq!(r.config().default_name, "primary");
    /// assert!(r.config().unique_types);
    /// ```
    #[track_caller]
    pub fn new<'a>(opts: impl OptionSource<'a>) -> Result<Self> {
        let mut construction = Construction::new(Context::caller());
        apply_source(&mut construction, &opts)?;
        let (store, config) = construction.finish();

        debug!(
            entries = store.len(),
            default_name = %config.settings.default_name,
            "registry constructed"
        );
        Ok(Self {
            inner: Mutex::new(Inner { store, config }),
        })
    }

    /// Build a registry from a declarative configuration.
    #[track_caller]
    pub fn from_config(config: &RegistryConfig) -> Result<Self> {
        Self::new(crate::Options::from_config(config))
    }

    /// The persistent configuration.
    pub fn config(&self) -> RegistryConfig {
        self.lock().config.settings.clone()
    }

    /// Total number of stored instances.
    pub fn len(&self) -> usize {
        self.lock().store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Store `value` under the effective name.
    ///
    /// Checks, in order: namedness and accessibility of `T` against the
    /// stricter of the registry's and the call's floors, type uniqueness,
    /// then name uniqueness. Without uniqueness a same-named entry is
    /// replaced.
    #[track_caller]
    pub fn set<'a, T>(&self, value: T, opts: impl OptionSource<'a>) -> Result<()>
    where
        T: Describe + Send + Sync,
    {
        let caller = Context::caller();
        let call = CallState::resolve(opts)?;
        call.target(self).insert(value, &call, caller)
    }

    /// Fetch a clone of the instance of `T` under the effective name.
    ///
    /// `with_unique_name`, `with_accessibility` and `with_namedness` are not
    /// supported here.
    pub fn get<'a, T>(&self, opts: impl OptionSource<'a>) -> Result<T>
    where
        T: Describe + Clone,
    {
        let call = CallState::resolve(opts)?;
        call.target(self).fetch(&call)
    }

    /// Snapshot of the entries matching the call's filters.
    ///
    /// Level options select types whose level is *exactly* the one given;
    /// `with_unique_type` drops types with more than one instance; a name
    /// keeps only instances under that name. The snapshot is detached from
    /// the registry.
    #[track_caller]
    pub fn get_all<'a>(&self, opts: impl OptionSource<'a>) -> Result<Entries> {
        let caller = Context::caller();
        let call = CallState::resolve(opts)?;
        call.target(self).snapshot(&call, caller)
    }

    /// Remove the instance of `T` under the effective name.
    pub fn unset<'a, T>(&self, opts: impl OptionSource<'a>) -> Result<()>
    where
        T: Describe,
    {
        let call = CallState::resolve(opts)?;
        call.target(self).remove::<T>(&call)
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn insert<T>(&self, value: T, call: &CallState<'_>, caller: Context) -> Result<()>
    where
        T: Describe + Send + Sync,
    {
        let key = TypeKey::of::<T>();
        let class = classify(key, &caller);

        let mut guard = self.lock();
        let Inner { store, config } = &mut *guard;
        let eff = call.effective(&config.settings);

        if class.namedness < eff.namedness {
            return Err(RegistryError::NamednessTooLow {
                ty: key.name(),
                actual: class.namedness,
                required: eff.namedness,
            });
        }
        if class.accessibility < eff.accessibility {
            return Err(RegistryError::AccessibilityTooLow {
                ty: key.name(),
                actual: class.accessibility,
                required: eff.accessibility,
            });
        }

        let count = store.count(&key);
        if eff.unique_type && count > 0 {
            return Err(RegistryError::NotUniqueType {
                ty: key.name(),
                count,
            });
        }
        if eff.unique_name && store.contains(&key, eff.name) {
            return Err(RegistryError::NotUniqueName {
                ty: key.name(),
                name: eff.name.to_owned(),
            });
        }

        let replaced = store.insert(key, eff.name.to_owned(), Arc::new(value));
        debug!(
            ty = key.name(),
            name = eff.name,
            replaced = replaced.is_some(),
            caller = %caller,
            "entry set"
        );
        Ok(())
    }

    fn fetch<T>(&self, call: &CallState<'_>) -> Result<T>
    where
        T: Describe + Clone,
    {
        call.reject_unique_name("on get")?;
        call.reject_levels("on get")?;

        let key = TypeKey::of::<T>();
        let guard = self.lock();
        let eff = call.effective(&guard.config.settings);

        let Some(instances) = guard.store.instances(&key) else {
            return Err(RegistryError::NotFound {
                ty: key.name(),
                name: None,
            });
        };
        if eff.unique_type && instances.len() > 1 {
            return Err(RegistryError::NotUniqueType {
                ty: key.name(),
                count: instances.len(),
            });
        }
        let Some(value) = instances.get(eff.name) else {
            return Err(RegistryError::NotFound {
                ty: key.name(),
                name: Some(eff.name.to_owned()),
            });
        };

        let value = (**value)
            .downcast_ref::<T>()
            .expect("entry stored under a type key holds that type");
        Ok(value.clone())
    }

    fn snapshot(&self, call: &CallState<'_>, caller: Context) -> Result<Entries> {
        call.reject_unique_name("on get_all")?;

        let filter = EntryFilter::for_call(call, caller);
        let mut out = Store::default();
        let guard = self.lock();
        copy_entries(&guard.store, &filter, None, &mut out);
        Ok(out.into_entries())
    }

    fn remove<T>(&self, call: &CallState<'_>) -> Result<()>
    where
        T: Describe,
    {
        call.reject_unique_name("on unset")?;
        call.reject_levels("on unset")?;

        let key = TypeKey::of::<T>();
        let mut guard = self.lock();
        let Inner { store, config } = &mut *guard;
        let eff = call.effective(&config.settings);

        let count = store.count(&key);
        if count == 0 {
            return Err(RegistryError::NotFound {
                ty: key.name(),
                name: None,
            });
        }
        if eff.unique_type && count > 1 {
            return Err(RegistryError::NotUniqueType {
                ty: key.name(),
                count,
            });
        }
        if store.remove(&key, eff.name).is_none() {
            return Err(RegistryError::NotFound {
                ty: key.name(),
                name: Some(eff.name.to_owned()),
            });
        }

        debug!(ty = key.name(), name = eff.name, "entry unset");
        Ok(())
    }
}

impl Default for Registry {
    /// An empty registry with the default configuration.
    fn default() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
        }
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("Registry")
            .field("config", &inner.config.settings)
            .field("types", &inner.store.type_count())
            .field("entries", &inner.store.len())
            .finish()
    }
}
