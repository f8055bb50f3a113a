//! Entry filtering and copying, shared by `get_all` snapshots and
//! construction-time cloning.

use typereg_access::{classify, Accessibility, Context, Namedness, TypeKey};

use crate::call::CallState;
use crate::config::Config;
use crate::store::{Store, Value};

/// How a level filter compares against a classified type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum LevelMatch {
    /// `get_all` filters: the type's level must equal the requested one.
    Exact,
    /// Clone filters: the type must meet the destination's floor.
    AtLeast,
}

/// Which entries survive a copy. `Undefined` levels and `None` names do
/// not filter.
#[derive(Clone, Debug)]
pub(crate) struct EntryFilter<'f> {
    pub accessibility: Accessibility,
    pub namedness: Namedness,
    pub level_match: LevelMatch,
    pub unique_type: bool,
    pub name: Option<&'f str>,
    pub caller: Context,
}

impl<'f> EntryFilter<'f> {
    pub fn for_call(call: &'f CallState<'_>, caller: Context) -> Self {
        Self {
            accessibility: call.accessibility,
            namedness: call.namedness,
            level_match: LevelMatch::Exact,
            unique_type: call.unique_type,
            name: (!call.name.is_empty()).then_some(call.name.as_str()),
            caller,
        }
    }
}

impl EntryFilter<'static> {
    /// Filter enforcing the constraints a registry under construction has
    /// explicitly set on itself.
    pub fn for_destination(config: &Config, caller: Context) -> Self {
        let explicit = config.explicit;
        let settings = &config.settings;
        Self {
            accessibility: if explicit.accessibility {
                settings.accessibility
            } else {
                Accessibility::Undefined
            },
            namedness: if explicit.namedness {
                settings.namedness
            } else {
                Namedness::Undefined
            },
            level_match: LevelMatch::AtLeast,
            unique_type: settings.unique_types,
            name: None,
            caller,
        }
    }
}

impl EntryFilter<'_> {
    fn admits_type(&self, ty: TypeKey, instances: usize) -> bool {
        if self.unique_type && instances > 1 {
            return false;
        }
        if !self.accessibility.is_defined() && !self.namedness.is_defined() {
            return true;
        }
        let class = classify(ty, &self.caller);
        self.level_admits(class.accessibility, self.accessibility, self.accessibility.is_defined())
            && self.level_admits(class.namedness, self.namedness, self.namedness.is_defined())
    }

    fn admits_name(&self, name: &str) -> bool {
        self.name.map_or(true, |wanted| wanted == name)
    }

    fn level_admits<L: Ord>(&self, actual: L, wanted: L, defined: bool) -> bool {
        !defined
            || match self.level_match {
                LevelMatch::Exact => actual == wanted,
                LevelMatch::AtLeast => actual >= wanted,
            }
    }
}

/// Copy every admitted entry of `src` into `dest`.
///
/// Admitted entries named `held_back` are not written; they are returned
/// so the caller can place them once the destination's default name is
/// final.
pub(crate) fn copy_entries(
    src: &Store,
    filter: &EntryFilter<'_>,
    held_back: Option<&str>,
    dest: &mut Store,
) -> Vec<(TypeKey, Value)> {
    let mut held = Vec::new();
    for (ty, instances) in src.iter() {
        if !filter.admits_type(*ty, instances.len()) {
            continue;
        }
        for (name, value) in instances {
            if !filter.admits_name(name) {
                continue;
            }
            if held_back == Some(name.as_str()) {
                held.push((*ty, value.clone()));
            } else {
                dest.insert(*ty, name.clone(), value.clone());
            }
        }
    }
    held
}
