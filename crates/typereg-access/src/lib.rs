//! Type classification for the typereg registry.
//!
//! A registry can require that stored types be *named* and *accessible*
//! from the code that registers them. This crate answers both questions
//! for any type implementing [`Describe`]:
//!
//! - [`Namedness`] -- does the type (behind any pointers) carry a declared
//!   name, or is it a structural composite such as a tuple or `Vec`?
//! - [`Accessibility`] -- can the type be named from every context, only
//!   from the context that declared it, or not at all?
//!
//! # Contexts
//!
//! A [`Context`] is the source file a type was described in, or the file
//! a registry call was made from. Rust has no runtime stack inspection, so
//! registry operations capture their caller with `#[track_caller]`.
//!
//! A type's [`Visibility`] decides which callers count as its context:
//! `pub(crate)` admits every file under the same `src/` directory,
//! `pub(super)` the parent module's files, and a private type its own
//! module only.
//!
//! # Describing types
//!
//! ```rust
//! use typereg_access::{describe, Accessibility, Classification, Context, Namedness};
//!
//! pub struct Widget;
//! struct Secret;
//!
//! describe!(pub Widget);
//! describe!(Secret);
//!
//! let here = Context::caller();
//! let widget = Classification::of::<Widget>(&here);
//! assert_eq!(widget.namedness, Namedness::Named);
//! assert_eq!(widget.accessibility, Accessibility::Everywhere);
//!
//! let secret = Classification::of::<Secret>(&here);
//! assert_eq!(secret.accessibility, Accessibility::WithinContext);
//! ```

pub mod classify;
pub mod descriptor;
pub mod level;

pub use classify::{accessibility, classify, namedness, Classification};
pub use descriptor::{Context, Describe, TypeDescriptor, TypeKey, Visibility};
pub use level::{Accessibility, Namedness};

/// Implement [`Describe`] for a declared type or trait object.
///
/// The visibility given to the macro should match the declaration. Plain
/// `pub` makes the type accessible everywhere; a restricted visibility is
/// scoped to modules resolved from the file of the invocation.
///
/// ```rust
/// # use typereg_access::describe;
/// pub struct Config;
/// pub trait Service: Send + Sync {}
///
/// pub(crate) struct Pool;
///
/// describe!(pub Config);
/// describe!(pub dyn Service);
/// describe!(pub(crate) Pool);
/// ```
#[macro_export]
macro_rules! describe {
    ($vis:vis dyn $name:ident) => {
        impl $crate::Describe for dyn $name {
            fn describe() -> $crate::TypeDescriptor {
                $crate::TypeDescriptor::named(
                    ::core::stringify!($name),
                    $crate::Context::new(::core::file!()),
                    $crate::Visibility::from_tokens(::core::stringify!($vis)),
                )
            }
        }
    };
    ($vis:vis $name:ident) => {
        impl $crate::Describe for $name {
            fn describe() -> $crate::TypeDescriptor {
                $crate::TypeDescriptor::named(
                    ::core::stringify!($name),
                    $crate::Context::new(::core::file!()),
                    $crate::Visibility::from_tokens(::core::stringify!($vis)),
                )
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) struct Pool;
    pub(super) struct Slot;
    struct Handle;

    describe!(pub(crate) Pool);
    describe!(pub(super) Slot);
    describe!(Handle);

    fn visibility<T: Describe>() -> Visibility {
        match TypeKey::of::<T>().descriptor() {
            TypeDescriptor::Named { visibility, .. } => visibility,
            other => panic!("not a named type: {other:?}"),
        }
    }

    #[test]
    fn macro_records_the_declared_visibility() {
        assert_eq!(visibility::<Pool>(), Visibility::Crate);
        assert_eq!(visibility::<Slot>(), Visibility::Super);
        assert_eq!(visibility::<Handle>(), Visibility::Private);
    }
}
