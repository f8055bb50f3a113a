//! Test types declared apart from the modules that store them.

/// Nameable anywhere in this crate.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct CrateScoped(pub u32);

crate::describe!(pub(crate) CrateScoped);
