//! Construction-time option handling.

use tracing::debug;
use typereg_access::{Context, TypeKey};

use crate::clone::{copy_entries, EntryFilter};
use crate::config::Config;
use crate::error::{RegistryError, Result};
use crate::options::{Acceptor, Modifier};
use crate::registry::Registry;
use crate::store::{Store, Value};

/// A registry being built. Discarded on the first failing option, so a
/// failed construction leaves nothing behind.
#[derive(Debug)]
pub(crate) struct Construction {
    store: Store,
    config: Config,
    caller: Context,
    /// Source entries stored under the source's default name, placed under
    /// this registry's default name once every option has been applied.
    defaults: Vec<(TypeKey, Value)>,
    cloned_config: bool,
    cloned_entries: bool,
    cloned_registry: bool,
}

impl Construction {
    pub fn new(caller: Context) -> Self {
        Self {
            store: Store::default(),
            config: Config::default(),
            caller,
            defaults: Vec::new(),
            cloned_config: false,
            cloned_entries: false,
            cloned_registry: false,
        }
    }

    /// Copy from `src` under a single lock of the source.
    ///
    /// A config copy replaces this registry's config with the source's.
    /// Entries are filtered by the constraints given explicitly here before
    /// the clone; the source's default-named entries are held back for
    /// [`Construction::finish`].
    fn clone_from(&mut self, src: &Registry, option: &'static str, what: CloneKind) -> Result<()> {
        let src = src.lock();
        self.config.check_compatible(&src.config, option)?;
        let filter = EntryFilter::for_destination(&self.config, self.caller);

        if matches!(what, CloneKind::Config | CloneKind::Registry) {
            self.config = src.config.clone();
            debug!(option, default_name = %self.config.settings.default_name, "cloned config");
        }

        if matches!(what, CloneKind::Entries | CloneKind::Registry) {
            let held = copy_entries(
                &src.store,
                &filter,
                Some(&src.config.settings.default_name),
                &mut self.store,
            );
            debug!(option, held_back = held.len(), total = self.store.len(), "cloned entries");
            self.defaults.extend(held);
        }
        Ok(())
    }

    /// Place held-back default entries under the final default name. They
    /// are written last, so they replace any entry already stored there.
    pub fn finish(mut self) -> (Store, Config) {
        let name = &self.config.settings.default_name;
        for (ty, value) in self.defaults.drain(..) {
            self.store.insert(ty, name.clone(), value);
        }
        (self.store, self.config)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CloneKind {
    Config,
    Entries,
    Registry,
}

fn duplicate(option: &'static str) -> RegistryError {
    RegistryError::BadOption {
        option,
        reason: "given more than once".into(),
    }
}

impl<'a> Acceptor<'a> for Construction {
    fn accept(&mut self, modifier: &Modifier<'a>) -> Result<()> {
        let option = modifier.name();
        let explicit = &mut self.config.explicit;
        let settings = &mut self.config.settings;

        match modifier {
            Modifier::Registry(_) => {
                return Err(RegistryError::NotSupported {
                    option,
                    usage: "during registry construction",
                });
            }
            Modifier::Name(name) => {
                if explicit.default_name {
                    return Err(duplicate(option));
                }
                settings.default_name = name.clone();
                explicit.default_name = true;
            }
            Modifier::UniqueType => {
                if explicit.unique_types {
                    return Err(duplicate(option));
                }
                settings.unique_types = true;
                explicit.unique_types = true;
            }
            Modifier::UniqueName => {
                if explicit.unique_names {
                    return Err(duplicate(option));
                }
                settings.unique_names = true;
                explicit.unique_names = true;
            }
            Modifier::Accessibility(level) => {
                if explicit.accessibility {
                    return Err(duplicate(option));
                }
                settings.accessibility = *level;
                explicit.accessibility = true;
            }
            Modifier::Namedness(level) => {
                if explicit.namedness {
                    return Err(duplicate(option));
                }
                settings.namedness = *level;
                explicit.namedness = true;
            }
            Modifier::CloneEntries(src) => {
                if self.cloned_entries {
                    return Err(duplicate(option));
                }
                self.clone_from(src, option, CloneKind::Entries)?;
                self.cloned_entries = true;
            }
            Modifier::CloneConfig(src) => {
                if self.cloned_config {
                    return Err(duplicate(option));
                }
                self.clone_from(src, option, CloneKind::Config)?;
                self.cloned_config = true;
            }
            Modifier::CloneRegistry(src) => {
                if self.cloned_registry {
                    return Err(duplicate(option));
                }
                if self.cloned_config || self.cloned_entries {
                    return Err(RegistryError::BadOption {
                        option,
                        reason: "cannot be combined with with_clone_config or with_clone_entries"
                            .into(),
                    });
                }
                self.clone_from(src, option, CloneKind::Registry)?;
                self.cloned_registry = true;
            }
        }
        Ok(())
    }
}
