//! Per-call option state.

use typereg_access::{Accessibility, Namedness};

use crate::config::RegistryConfig;
use crate::error::{RegistryError, Result};
use crate::options::{apply_source, Acceptor, Modifier, OptionSource};
use crate::registry::Registry;

/// Options resolved for a single `set`/`get`/`get_all`/`unset` call.
///
/// Lives only for the duration of the call; nothing here touches the
/// registry's persistent configuration.
#[derive(Debug, Default)]
pub(crate) struct CallState<'a> {
    pub registry: Option<&'a Registry>,
    pub name: String,
    pub unique_type: bool,
    pub unique_name: bool,
    pub accessibility: Accessibility,
    pub namedness: Namedness,
}

/// Settings in force for one call: persistent config merged with the
/// call's overrides.
#[derive(Debug)]
pub(crate) struct Effective<'c> {
    pub name: &'c str,
    pub unique_type: bool,
    pub unique_name: bool,
    pub accessibility: Accessibility,
    pub namedness: Namedness,
}

impl<'a> CallState<'a> {
    pub fn resolve(opts: impl OptionSource<'a>) -> Result<Self> {
        let mut state = Self::default();
        apply_source(&mut state, &opts)?;
        Ok(state)
    }

    /// The registry the call operates on.
    pub fn target<'s>(&self, home: &'s Registry) -> &'s Registry
    where
        'a: 's,
    {
        self.registry.unwrap_or(home)
    }

    /// The call name if given, otherwise the registry default. Flags and
    /// level floors are the stricter of the two scopes.
    pub fn effective<'c>(&'c self, config: &'c RegistryConfig) -> Effective<'c> {
        Effective {
            name: if self.name.is_empty() {
                &config.default_name
            } else {
                &self.name
            },
            unique_type: self.unique_type || config.unique_types,
            unique_name: self.unique_name || config.unique_names,
            accessibility: self.accessibility.max(config.accessibility),
            namedness: self.namedness.max(config.namedness),
        }
    }

    pub fn reject_unique_name(&self, usage: &'static str) -> Result<()> {
        if self.unique_name {
            return Err(RegistryError::NotSupported {
                option: "with_unique_name",
                usage,
            });
        }
        Ok(())
    }

    /// Level floors only make sense where a type is being admitted or
    /// filtered.
    pub fn reject_levels(&self, usage: &'static str) -> Result<()> {
        if self.accessibility.is_defined() {
            return Err(RegistryError::NotSupported {
                option: "with_accessibility",
                usage,
            });
        }
        if self.namedness.is_defined() {
            return Err(RegistryError::NotSupported {
                option: "with_namedness",
                usage,
            });
        }
        Ok(())
    }
}

impl<'a> Acceptor<'a> for CallState<'a> {
    fn accept(&mut self, modifier: &Modifier<'a>) -> Result<()> {
        match modifier {
            Modifier::Registry(r) => self.registry = Some(*r),
            Modifier::Name(name) => self.name = name.clone(),
            Modifier::UniqueType => self.unique_type = true,
            Modifier::UniqueName => self.unique_name = true,
            Modifier::Accessibility(level) => self.accessibility = *level,
            Modifier::Namedness(level) => self.namedness = *level,
            Modifier::CloneConfig(_) | Modifier::CloneEntries(_) | Modifier::CloneRegistry(_) => {
                return Err(RegistryError::NotSupported {
                    option: modifier.name(),
                    usage: "outside registry construction",
                });
            }
        }
        Ok(())
    }
}
