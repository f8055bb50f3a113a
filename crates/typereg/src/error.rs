//! Error types for registry operations.

use thiserror::Error;

use typereg_access::{Accessibility, Namedness};

/// Errors that can occur during registry construction and operations.
///
/// Every variant maps to a stable [`ErrorKind`] via [`RegistryError::kind`];
/// compare kinds rather than messages.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// No entry exists for the resolved type and name.
    #[error("{ty} not found{}", name_suffix(.name))]
    NotFound {
        ty: &'static str,
        /// `None` when the type has no entries at all.
        name: Option<String>,
    },

    /// Type uniqueness was required but the type already has entries.
    #[error("type {ty} is not unique: {count} instance(s) registered")]
    NotUniqueType { ty: &'static str, count: usize },

    /// Name uniqueness was required but the name is already taken.
    #[error("name {name:?} is already registered for {ty}")]
    NotUniqueName { ty: &'static str, name: String },

    /// An option was used where it has no defined meaning.
    #[error("{option} is not supported {usage}")]
    NotSupported {
        option: &'static str,
        usage: &'static str,
    },

    /// The type is less accessible than the effective minimum.
    #[error("{ty} is {actual}, registry requires at least {required}")]
    AccessibilityTooLow {
        ty: &'static str,
        actual: Accessibility,
        required: Accessibility,
    },

    /// The type is less named than the effective minimum.
    #[error("{ty} is a(n) {actual}, registry requires at least {required}")]
    NamednessTooLow {
        ty: &'static str,
        actual: Namedness,
        required: Namedness,
    },

    /// Conflicting or duplicated construction-time options.
    #[error("bad option {option}: {reason}")]
    BadOption {
        option: &'static str,
        reason: String,
    },
}

/// The sentinel kind of a [`RegistryError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    NotUniqueType,
    NotUniqueName,
    NotSupported,
    AccessibilityTooLow,
    NamednessTooLow,
    BadOption,
}

impl RegistryError {
    /// The sentinel kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::NotUniqueType { .. } => ErrorKind::NotUniqueType,
            Self::NotUniqueName { .. } => ErrorKind::NotUniqueName,
            Self::NotSupported { .. } => ErrorKind::NotSupported,
            Self::AccessibilityTooLow { .. } => ErrorKind::AccessibilityTooLow,
            Self::NamednessTooLow { .. } => ErrorKind::NamednessTooLow,
            Self::BadOption { .. } => ErrorKind::BadOption,
        }
    }

    /// Returns `true` if this error is of the given kind.
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind() == kind
    }
}

fn name_suffix(name: &Option<String>) -> String {
    match name {
        Some(name) => format!(" under name {name:?}"),
        None => String::new(),
    }
}

/// Convenience type alias for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
