//! Visibility and nameability levels.
//!
//! Both enums are totally ordered from "no requirement" upwards, so a
//! registry floor is enforced with a plain `<` comparison.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How widely a type can be named from a calling context.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Accessibility {
    /// No accessibility requirement (the lowest level).
    #[default]
    Undefined,
    /// The type cannot be named from the calling context.
    NotAccessible,
    /// The type can be named only from its declaring context.
    WithinContext,
    /// The type can be named from any context.
    Everywhere,
}

impl Accessibility {
    /// Returns `true` unless this is [`Accessibility::Undefined`].
    pub fn is_defined(self) -> bool {
        self != Self::Undefined
    }
}

impl fmt::Display for Accessibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Undefined => "accessibility undefined",
            Self::NotAccessible => "not accessible",
            Self::WithinContext => "accessible within context",
            Self::Everywhere => "accessible everywhere",
        };
        f.write_str(s)
    }
}

/// Whether a type carries a declared name.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Namedness {
    /// No namedness requirement (the lowest level).
    #[default]
    Undefined,
    /// A structurally declared type without a name.
    Anonymous,
    /// A declared or predeclared type.
    Named,
}

impl Namedness {
    /// Returns `true` unless this is [`Namedness::Undefined`].
    pub fn is_defined(self) -> bool {
        self != Self::Undefined
    }
}

impl fmt::Display for Namedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Undefined => "namedness undefined",
            Self::Anonymous => "anonymous type",
            Self::Named => "named type",
        };
        f.write_str(s)
    }
}
