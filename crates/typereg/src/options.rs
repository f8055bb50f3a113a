//! Options: prioritized modifiers, the chaining builder, and the engine that
//! applies them.
//!
//! An option is a `(priority, modifier)` pair. The same modifier means
//! different things depending on who consumes it: while a registry is
//! being built it changes the persistent configuration, afterwards it only
//! shapes a single call. Both consumers implement `Acceptor`; each one
//! rejects the modifiers it has no meaning for.
//!
//! # Ordering
//!
//! Options are stably sorted by descending priority before they are
//! applied, so ties keep the order in which they were supplied:
//!
//! 1. `with_registry`
//! 2. `with_accessibility`, `with_namedness`
//! 3. `with_name`, `with_unique_type`, `with_unique_name`
//! 4. `with_clone_entries`, then `with_clone_config`, then
//!    `with_clone_registry`

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use typereg_access::{Accessibility, Namedness};

use crate::config::RegistryConfig;
use crate::error::Result;
use crate::registry::Registry;

/// Application order of an option; higher applies first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct Priority(i32);

impl Priority {
    pub(crate) const REDIRECT: Self = Self(2);
    pub(crate) const CONSTRAINT: Self = Self(1);
    pub(crate) const ORDINARY: Self = Self(0);
    pub(crate) const CLONE_ENTRIES: Self = Self(i32::MIN + 2);
    pub(crate) const CLONE_CONFIG: Self = Self(i32::MIN + 1);
    pub(crate) const CLONE_REGISTRY: Self = Self(i32::MIN);
}

/// What an option does once accepted.
#[derive(Clone, Debug)]
pub(crate) enum Modifier<'a> {
    Registry(&'a Registry),
    Name(String),
    UniqueType,
    UniqueName,
    Accessibility(Accessibility),
    Namedness(Namedness),
    CloneConfig(&'a Registry),
    CloneEntries(&'a Registry),
    CloneRegistry(&'a Registry),
}

impl Modifier<'_> {
    fn priority(&self) -> Priority {
        match self {
            Self::Registry(_) => Priority::REDIRECT,
            Self::Accessibility(_) | Self::Namedness(_) => Priority::CONSTRAINT,
            Self::Name(_) | Self::UniqueType | Self::UniqueName => Priority::ORDINARY,
            Self::CloneEntries(_) => Priority::CLONE_ENTRIES,
            Self::CloneConfig(_) => Priority::CLONE_CONFIG,
            Self::CloneRegistry(_) => Priority::CLONE_REGISTRY,
        }
    }

    /// The public constructor name, for diagnostics.
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Self::Registry(_) => "with_registry",
            Self::Name(_) => "with_name",
            Self::UniqueType => "with_unique_type",
            Self::UniqueName => "with_unique_name",
            Self::Accessibility(_) => "with_accessibility",
            Self::Namedness(_) => "with_namedness",
            Self::CloneConfig(_) => "with_clone_config",
            Self::CloneEntries(_) => "with_clone_entries",
            Self::CloneRegistry(_) => "with_clone_registry",
        }
    }
}

/// A single prioritized option, produced by the `with_*` constructors.
#[derive(Clone, Debug)]
pub struct Opt<'a> {
    priority: Priority,
    modifier: Modifier<'a>,
}

impl<'a> Opt<'a> {
    pub(crate) fn new(modifier: Modifier<'a>) -> Self {
        Self {
            priority: modifier.priority(),
            modifier,
        }
    }
}

/// A consumer of modifiers: construction or a single call.
pub(crate) trait Acceptor<'a> {
    fn accept(&mut self, modifier: &Modifier<'a>) -> Result<()>;
}

/// Stably sort `opts` by descending priority and apply them in turn,
/// stopping at the first error.
pub(crate) fn apply_options<'a, A: Acceptor<'a>>(target: &mut A, mut opts: Vec<Opt<'a>>) -> Result<()> {
    opts.sort_by(|a, b| b.priority.cmp(&a.priority));
    for opt in &opts {
        target.accept(&opt.modifier)?;
    }
    Ok(())
}

/// Apply everything `source` holds, then let it know the application
/// succeeded.
pub(crate) fn apply_source<'a, A, S>(target: &mut A, source: &S) -> Result<()>
where
    A: Acceptor<'a>,
    S: OptionSource<'a> + ?Sized,
{
    apply_options(target, source.to_options())?;
    source.applied();
    Ok(())
}

/// Anything that can be flattened into an ordered option list.
///
/// Implemented for `()` (no options), a single [`Options`] (owned or
/// borrowed) and arrays or vectors of them, so these are equivalent:
///
/// ```rust
/// # use typereg::{with_name, with_unique_type, Registry};
/// # let r = Registry::default();
/// # r.set(1u8, with_name("a")).unwrap();
/// let chained = r.get::<u8>(with_name("a").with_unique_type());
/// let listed = r.get::<u8>([with_name("a"), with_unique_type()]);
/// assert_eq!(chained, listed);
/// ```
pub trait OptionSource<'a> {
    /// Snapshot the options, preserving supplied order.
    fn to_options(&self) -> Vec<Opt<'a>>;

    /// Called once the snapshot was applied without error.
    fn applied(&self) {}
}

impl<'a> OptionSource<'a> for () {
    fn to_options(&self) -> Vec<Opt<'a>> {
        Vec::new()
    }
}

impl<'a> OptionSource<'a> for Options<'a> {
    fn to_options(&self) -> Vec<Opt<'a>> {
        self.lock().clone()
    }

    fn applied(&self) {
        if self.shared {
            self.lock().clear();
        }
    }
}

impl<'a, S: OptionSource<'a> + ?Sized> OptionSource<'a> for &S {
    fn to_options(&self) -> Vec<Opt<'a>> {
        (**self).to_options()
    }

    fn applied(&self) {
        (**self).applied();
    }
}

impl<'a, S: OptionSource<'a>> OptionSource<'a> for [S] {
    fn to_options(&self) -> Vec<Opt<'a>> {
        self.iter().flat_map(OptionSource::to_options).collect()
    }

    fn applied(&self) {
        self.iter().for_each(OptionSource::applied);
    }
}

impl<'a, S: OptionSource<'a>, const N: usize> OptionSource<'a> for [S; N] {
    fn to_options(&self) -> Vec<Opt<'a>> {
        self.as_slice().to_options()
    }

    fn applied(&self) {
        self.as_slice().applied();
    }
}

impl<'a, S: OptionSource<'a>> OptionSource<'a> for Vec<S> {
    fn to_options(&self) -> Vec<Opt<'a>> {
        self.as_slice().to_options()
    }

    fn applied(&self) {
        self.as_slice().applied();
    }
}

/// An ordered, chainable list of options.
///
/// Every `with_*` free function returns a fresh builder and every builder
/// has the same `with_*` methods, so options can be chained
/// (`with_name("a").with_unique_type()`) or listed
/// (`[with_name("a"), with_unique_type()]`) with identical results.
///
/// The list is guarded by its own lock, so a builder can be extended in
/// place through [`Options::and`] from several threads. A builder made
/// with [`Options::shared`] empties its list each time its options are
/// applied successfully, so reusing it never applies the same options
/// twice; after a failed application the list is kept.
pub struct Options<'a> {
    opts: Mutex<Vec<Opt<'a>>>,
    shared: bool,
}

impl<'a> Options<'a> {
    /// An empty builder that keeps its options after use.
    pub fn new() -> Self {
        Self {
            opts: Mutex::new(Vec::new()),
            shared: false,
        }
    }

    /// An empty builder that is emptied every time it is consumed.
    pub fn shared() -> Self {
        Self {
            opts: Mutex::new(Vec::new()),
            shared: true,
        }
    }

    /// Construction options reproducing every non-default field of `config`.
    pub fn from_config(config: &RegistryConfig) -> Self {
        let defaults = RegistryConfig::default();
        let mut opts = Self::new();
        if config.default_name != defaults.default_name {
            opts = opts.with_name(config.default_name.clone());
        }
        if config.unique_types {
            opts = opts.with_unique_type();
        }
        if config.unique_names {
            opts = opts.with_unique_name();
        }
        if config.accessibility != defaults.accessibility {
            opts = opts.with_accessibility(config.accessibility);
        }
        if config.namedness != defaults.namedness {
            opts = opts.with_namedness(config.namedness);
        }
        opts
    }

    /// Number of accumulated options.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if no options have been accumulated.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Returns `true` for builders created with [`Options::shared`].
    pub fn is_shared(&self) -> bool {
        self.shared
    }

    /// Append `other` in place after the options already accumulated.
    ///
    /// Works through a shared reference, so several threads can extend
    /// one builder. Use [`Options::chain`] to keep chaining `with_*`
    /// calls on an owned builder.
    pub fn and(&self, other: impl OptionSource<'a>) -> &Self {
        let more = other.to_options();
        self.lock().extend(more);
        other.applied();
        self
    }

    /// Append `other` and return the builder for further chaining.
    pub fn chain(self, other: impl OptionSource<'a>) -> Self {
        self.and(other);
        self
    }

    /// Redirect a single call to `registry`. Not valid during construction.
    pub fn with_registry(self, registry: &'a Registry) -> Self {
        self.push(Modifier::Registry(registry))
    }

    /// Instance name for a call, or the default name during construction.
    pub fn with_name(self, name: impl Into<String>) -> Self {
        self.push(Modifier::Name(name.into()))
    }

    /// Require at most one instance per type.
    pub fn with_unique_type(self) -> Self {
        self.push(Modifier::UniqueType)
    }

    /// Require the instance name to be unused. Only meaningful on
    /// construction and `set`.
    pub fn with_unique_name(self) -> Self {
        self.push(Modifier::UniqueName)
    }

    /// Minimum accessibility on construction and `set`; exact-match filter
    /// on `get_all`.
    pub fn with_accessibility(self, level: Accessibility) -> Self {
        self.push(Modifier::Accessibility(level))
    }

    /// Minimum namedness on construction and `set`; exact-match filter on
    /// `get_all`.
    pub fn with_namedness(self, level: Namedness) -> Self {
        self.push(Modifier::Namedness(level))
    }

    /// Copy `src`'s configuration into the registry being constructed.
    pub fn with_clone_config(self, src: &'a Registry) -> Self {
        self.push(Modifier::CloneConfig(src))
    }

    /// Copy `src`'s entries into the registry being constructed.
    pub fn with_clone_entries(self, src: &'a Registry) -> Self {
        self.push(Modifier::CloneEntries(src))
    }

    /// Copy `src`'s configuration and entries into the registry being
    /// constructed. Cannot be combined with the other clone options.
    pub fn with_clone_registry(self, src: &'a Registry) -> Self {
        self.push(Modifier::CloneRegistry(src))
    }

    fn push(self, modifier: Modifier<'a>) -> Self {
        self.lock().push(Opt::new(modifier));
        self
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Opt<'a>>> {
        self.opts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Options<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Options<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&'static str> = self.lock().iter().map(|o| o.modifier.name()).collect();
        f.debug_struct("Options")
            .field("options", &names)
            .field("shared", &self.shared)
            .finish()
    }
}

/// See [`Options::with_registry`].
pub fn with_registry(registry: &Registry) -> Options<'_> {
    Options::new().with_registry(registry)
}

/// See [`Options::with_name`].
pub fn with_name<'a>(name: impl Into<String>) -> Options<'a> {
    Options::new().with_name(name)
}

/// See [`Options::with_unique_type`].
pub fn with_unique_type<'a>() -> Options<'a> {
    Options::new().with_unique_type()
}

/// See [`Options::with_unique_name`].
pub fn with_unique_name<'a>() -> Options<'a> {
    Options::new().with_unique_name()
}

/// See [`Options::with_accessibility`].
pub fn with_accessibility<'a>(level: Accessibility) -> Options<'a> {
    Options::new().with_accessibility(level)
}

/// See [`Options::with_namedness`].
pub fn with_namedness<'a>(level: Namedness) -> Options<'a> {
    Options::new().with_namedness(level)
}

/// See [`Options::with_clone_config`].
pub fn with_clone_config(src: &Registry) -> Options<'_> {
    Options::new().with_clone_config(src)
}

/// See [`Options::with_clone_entries`].
pub fn with_clone_entries(src: &Registry) -> Options<'_> {
    Options::new().with_clone_entries(src)
}

/// See [`Options::with_clone_registry`].
pub fn with_clone_registry(src: &Registry) -> Options<'_> {
    Options::new().with_clone_registry(src)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RegistryError;
    use proptest::prelude::*;

    /// Records the names carried by `Modifier::Name`, failing on "boom".
    #[derive(Default)]
    struct Recorder(Vec<String>);

    impl<'a> Acceptor<'a> for Recorder {
        fn accept(&mut self, modifier: &Modifier<'a>) -> Result<()> {
            match modifier {
                Modifier::Name(n) if n == "boom" => Err(RegistryError::BadOption {
                    option: "with_name",
                    reason: "boom".into(),
                }),
                Modifier::Name(n) => {
                    self.0.push(n.clone());
                    Ok(())
                }
                other => {
                    self.0.push(other.name().to_string());
                    Ok(())
                }
            }
        }
    }

    fn named(priority: i32, name: &str) -> Opt<'static> {
        Opt {
            priority: Priority(priority),
            modifier: Modifier::Name(name.into()),
        }
    }

    fn names(opts: &[Opt<'_>]) -> Vec<&'static str> {
        opts.iter().map(|o| o.modifier.name()).collect()
    }

    // -----------------------------------------------------------------------
    // 1. Builder accumulates in order
    // -----------------------------------------------------------------------
    #[test]
    fn and_appends_in_order() {
        let builder = Options::new();
        builder.and(with_name("a"));
        assert_eq!(builder.len(), 1);
        builder.and(with_unique_type());
        assert_eq!(builder.len(), 2);

        let opts = builder.to_options();
        assert_eq!(names(&opts), vec!["with_name", "with_unique_type"]);
    }

    // -----------------------------------------------------------------------
    // 2. Chaining and listing produce identical lists
    // -----------------------------------------------------------------------
    #[test]
    fn chained_and_listed_are_equivalent() {
        let chained = with_name("x").with_unique_name().to_options();
        let listed = [with_name("x"), with_unique_name()].to_options();
        assert_eq!(names(&chained), names(&listed));

        let vec_form = vec![with_name("x"), with_unique_name()].to_options();
        assert_eq!(names(&vec_form), names(&listed));
        assert!(().to_options().is_empty());

        let appended = Options::new()
            .chain(with_name("x"))
            .with_unique_name()
            .to_options();
        assert_eq!(names(&appended), names(&listed));
    }

    // -----------------------------------------------------------------------
    // 3. Priority ordering across tiers
    // -----------------------------------------------------------------------
    #[test]
    fn applies_by_descending_priority() {
        let r = Registry::default();
        let opts = [
            with_clone_registry(&r),
            with_clone_config(&r),
            with_name("n"),
            with_clone_entries(&r),
            with_accessibility(Accessibility::Everywhere),
            with_registry(&r),
        ]
        .to_options();

        let mut rec = Recorder::default();
        apply_options(&mut rec, opts).unwrap();
        assert_eq!(
            rec.0,
            vec![
                "with_registry",
                "with_accessibility",
                "n",
                "with_clone_entries",
                "with_clone_config",
                "with_clone_registry",
            ]
        );
    }

    // -----------------------------------------------------------------------
    // 4. Errors short-circuit
    // -----------------------------------------------------------------------
    #[test]
    fn first_error_stops_application() {
        let mut rec = Recorder::default();
        let err = apply_options(
            &mut rec,
            vec![named(5, "first"), named(0, "boom"), named(-1, "never")],
        )
        .unwrap_err();
        assert!(matches!(err, RegistryError::BadOption { .. }));
        assert_eq!(rec.0, vec!["first"]);

        let mut empty = Recorder::default();
        apply_options(&mut empty, Vec::new()).unwrap();
        assert!(empty.0.is_empty());
    }

    // -----------------------------------------------------------------------
    // 5. Shared builders drain after success, plain builders keep their list
    // -----------------------------------------------------------------------
    #[test]
    fn shared_builder_drains_after_success_only() {
        let plain = with_name("kept");
        let mut rec = Recorder::default();
        apply_source(&mut rec, &plain).unwrap();
        apply_source(&mut rec, &plain).unwrap();
        assert_eq!(plain.len(), 1);
        assert!(!plain.is_shared());

        let shared = Options::shared();
        shared.and(with_name("once"));
        assert!(shared.is_shared());
        apply_source(&mut rec, &shared).unwrap();
        assert!(shared.is_empty());
        assert_eq!(rec.0, vec!["kept", "kept", "once"]);

        // A failed application leaves the list in place.
        shared.and(with_name("boom"));
        assert!(apply_source(&mut rec, &shared).is_err());
        assert_eq!(shared.len(), 1);
    }

    #[test]
    fn shared_builder_through_registry_calls() {
        let r = Registry::default();
        let shared = Options::shared();
        shared.and(with_name("a"));
        r.set(1u8, &shared).unwrap();
        assert!(shared.is_empty());
        assert_eq!(r.get::<u8>(with_name("a")).unwrap(), 1);

        shared.and(with_clone_config(&r));
        assert!(r.set(2u8, &shared).is_err());
        assert_eq!(shared.len(), 1);
        assert_eq!(r.len(), 1);
    }

    // -----------------------------------------------------------------------
    // 6. Builder is usable from several threads
    // -----------------------------------------------------------------------
    #[test]
    fn and_is_thread_safe() {
        let builder = Options::new();
        std::thread::scope(|s| {
            for i in 0..8 {
                let b = &builder;
                s.spawn(move || {
                    b.and(with_name(format!("t{i}")));
                });
            }
        });
        assert_eq!(builder.len(), 8);
    }

    // -----------------------------------------------------------------------
    // 7. Config expands into non-default construction options
    // -----------------------------------------------------------------------
    #[test]
    fn from_config_emits_only_non_defaults() {
        assert!(Options::from_config(&RegistryConfig::default()).is_empty());

        let cfg = RegistryConfig {
            default_name: "main".into(),
            unique_types: true,
            namedness: Namedness::Named,
            ..Default::default()
        };
        let opts = Options::from_config(&cfg).to_options();
        assert_eq!(
            names(&opts),
            vec!["with_name", "with_unique_type", "with_namedness"]
        );
    }

    proptest! {
        #[test]
        fn sort_is_stable_and_descending(priorities in proptest::collection::vec(-3i32..3, 0..24)) {
            let opts: Vec<Opt<'static>> = priorities
                .iter()
                .enumerate()
                .map(|(i, p)| named(*p, &i.to_string()))
                .collect();

            let mut rec = Recorder::default();
            apply_options(&mut rec, opts).unwrap();

            let mut expected: Vec<(i32, usize)> =
                priorities.iter().copied().zip(0..).collect();
            expected.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
            let expected: Vec<String> = expected.iter().map(|(_, i)| i.to_string()).collect();
            prop_assert_eq!(rec.0, expected);
        }
    }
}
