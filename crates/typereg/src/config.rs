use serde::{Deserialize, Serialize};

use typereg_access::{Accessibility, Namedness};

use crate::error::{RegistryError, Result};

/// Persistent, registry-scoped settings.
///
/// This is the declarative form of a registry's configuration. It can be
/// loaded from a config file and turned into construction options with
/// [`Options::from_config`](crate::Options::from_config), and it is what
/// [`Registry::config`](crate::Registry::config) reports.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Instance name used when a call does not supply one.
    pub default_name: String,
    /// Allow at most one instance per type.
    pub unique_types: bool,
    /// Reject a second instance under an already used name.
    pub unique_names: bool,
    /// Minimum accessibility of stored types.
    pub accessibility: Accessibility,
    /// Minimum namedness of stored types.
    pub namedness: Namedness,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            default_name: String::new(),
            unique_types: false,
            unique_names: false,
            accessibility: Accessibility::WithinContext,
            namedness: Namedness::Undefined,
        }
    }
}

impl RegistryConfig {
    /// A configuration with no constraints at all.
    pub fn unconstrained() -> Self {
        Self {
            accessibility: Accessibility::Undefined,
            ..Default::default()
        }
    }
}

/// Which settings were given explicitly while the registry was built.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Explicit {
    pub default_name: bool,
    pub unique_types: bool,
    pub unique_names: bool,
    pub accessibility: bool,
    pub namedness: bool,
}

/// A registry's persistent configuration together with its provenance.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Config {
    pub settings: RegistryConfig,
    pub explicit: Explicit,
}

impl Config {
    /// Fail with `BadOption` when `src` and `self` both set a constraint
    /// explicitly and disagree on it. `Undefined` levels never conflict.
    pub fn check_compatible(&self, src: &Config, option: &'static str) -> Result<()> {
        let (ours, theirs) = (&self.settings, &src.settings);

        if self.explicit.unique_types
            && src.explicit.unique_types
            && ours.unique_types != theirs.unique_types
        {
            return Err(conflict(option, "unique_types", theirs.unique_types, ours.unique_types));
        }

        if self.explicit.unique_names
            && src.explicit.unique_names
            && ours.unique_names != theirs.unique_names
        {
            return Err(conflict(option, "unique_names", theirs.unique_names, ours.unique_names));
        }

        if self.explicit.accessibility
            && src.explicit.accessibility
            && ours.accessibility.is_defined()
            && theirs.accessibility.is_defined()
            && ours.accessibility != theirs.accessibility
        {
            return Err(conflict(option, "accessibility", theirs.accessibility, ours.accessibility));
        }

        if self.explicit.namedness
            && src.explicit.namedness
            && ours.namedness.is_defined()
            && theirs.namedness.is_defined()
            && ours.namedness != theirs.namedness
        {
            return Err(conflict(option, "namedness", theirs.namedness, ours.namedness));
        }

        Ok(())
    }
}

fn conflict(
    option: &'static str,
    setting: &str,
    theirs: impl std::fmt::Display,
    ours: impl std::fmt::Display,
) -> RegistryError {
    RegistryError::BadOption {
        option,
        reason: format!("source {setting} ({theirs}) conflicts with destination ({ours})"),
    }
}
