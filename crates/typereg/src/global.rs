//! The process-wide default registry.
//!
//! The free functions operate on whatever registry is current when they are
//! called. Replacing the default is a single atomic pointer swap: calls
//! already holding the previous registry finish against it, later calls see
//! the new one.

use std::sync::{Arc, LazyLock};

use arc_swap::ArcSwap;
use tracing::info;
use typereg_access::Describe;

use crate::error::Result;
use crate::options::OptionSource;
use crate::registry::Registry;
use crate::store::Entries;

static DEFAULT: LazyLock<ArcSwap<Registry>> =
    LazyLock::new(|| ArcSwap::from_pointee(Registry::default()));

/// The current default registry.
pub fn default_registry() -> Arc<Registry> {
    DEFAULT.load_full()
}

/// Install `registry` as the default, returning the one it replaced.
pub fn set_default_registry(registry: Arc<Registry>) -> Arc<Registry> {
    let previous = DEFAULT.swap(registry);
    info!(replaced_entries = previous.len(), "default registry replaced");
    previous
}

/// [`Registry::set`] on the default registry.
#[track_caller]
pub fn set<'a, T>(value: T, opts: impl OptionSource<'a>) -> Result<()>
where
    T: Describe + Send + Sync,
{
    DEFAULT.load().set(value, opts)
}

/// [`Registry::get`] on the default registry.
pub fn get<'a, T>(opts: impl OptionSource<'a>) -> Result<T>
where
    T: Describe + Clone,
{
    DEFAULT.load().get(opts)
}

/// [`Registry::get_all`] on the default registry.
#[track_caller]
pub fn get_all<'a>(opts: impl OptionSource<'a>) -> Result<Entries> {
    DEFAULT.load().get_all(opts)
}

/// [`Registry::unset`] on the default registry.
pub fn unset<'a, T>(opts: impl OptionSource<'a>) -> Result<()>
where
    T: Describe,
{
    DEFAULT.load().unset::<T>(opts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::options::{with_name, with_registry, with_unique_type};

    #[derive(Clone, Debug, PartialEq)]
    struct Setting(u32);

    crate::describe!(Setting);

    // The default registry is process-wide state, so every check that
    // touches it lives in this one test.
    #[test]
    fn default_registry_lifecycle() {
        // ---- Free functions act on the default ----
        set(Setting(1), with_name("global")).unwrap();
        assert_eq!(get::<Setting>(with_name("global")).unwrap(), Setting(1));
        assert!(get_all(with_name("global"))
            .unwrap()
            .contains_key(&typereg_access::TypeKey::of::<Setting>()));
        assert!(default_registry().len() >= 1);

        // ---- Redirection still works through the free functions ----
        let side = Registry::default();
        set(Setting(2), with_registry(&side)).unwrap();
        assert_eq!(side.get::<Setting>(()).unwrap(), Setting(2));

        // ---- Swap returns the previous registry ----
        let fresh = Arc::new(Registry::new(with_unique_type()).unwrap());
        let previous = set_default_registry(Arc::clone(&fresh));
        assert_eq!(previous.get::<Setting>(with_name("global")).unwrap(), Setting(1));
        assert!(Arc::ptr_eq(&default_registry(), &fresh));
        assert!(get::<Setting>(with_name("global")).unwrap_err().is(ErrorKind::NotFound));

        set(Setting(3), ()).unwrap();
        assert!(set(Setting(4), with_name("x")).unwrap_err().is(ErrorKind::NotUniqueType));
        unset::<Setting>(()).unwrap();
        assert!(fresh.is_empty());

        // ---- Restore ----
        let swapped_out = set_default_registry(previous);
        assert!(Arc::ptr_eq(&swapped_out, &fresh));
        unset::<Setting>(with_name("global")).unwrap();
    }
}
