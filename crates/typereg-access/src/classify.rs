//! Namedness and accessibility classification.
//!
//! Accessibility is computed in two tiers. A type is accessible
//! *everywhere* when every named type reachable through its structure is
//! predeclared or `pub`; failing that, it is accessible *within context*
//! when the caller lies inside the visibility scope of every restricted
//! named type it reaches. Revisited types count as accessible, which breaks
//! cycles in hand-written descriptors.

use std::any::TypeId;
use std::collections::HashSet;

use crate::descriptor::{Context, Describe, TypeDescriptor, TypeKey, Visibility};
use crate::level::{Accessibility, Namedness};

/// The two facts a registry needs about a type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Classification {
    pub namedness: Namedness,
    pub accessibility: Accessibility,
}

impl Classification {
    /// Classify `T` relative to `caller`.
    pub fn of<T: Describe + ?Sized>(caller: &Context) -> Self {
        classify(TypeKey::of::<T>(), caller)
    }
}

/// Classify `ty` relative to the calling context.
pub fn classify(ty: TypeKey, caller: &Context) -> Classification {
    Classification {
        namedness: namedness(ty),
        accessibility: accessibility(ty, caller),
    }
}

/// Namedness of `ty`, looking through pointer indirection.
pub fn namedness(ty: TypeKey) -> Namedness {
    let mut seen = HashSet::new();
    let mut current = ty;
    loop {
        if !seen.insert(current.id()) {
            return Namedness::Anonymous;
        }
        match current.descriptor() {
            TypeDescriptor::Pointer(target) => current = target,
            d if d.has_name() => return Namedness::Named,
            _ => return Namedness::Anonymous,
        }
    }
}

/// The highest accessibility tier `ty` satisfies from `caller`.
pub fn accessibility(ty: TypeKey, caller: &Context) -> Accessibility {
    if reachable(ty, None, &mut HashSet::new()) {
        Accessibility::Everywhere
    } else if reachable(ty, Some(caller), &mut HashSet::new()) {
        Accessibility::WithinContext
    } else {
        Accessibility::NotAccessible
    }
}

/// Whether every named type reachable from `ty` can be named.
///
/// With `caller == None` only `pub` and predeclared types qualify.
fn reachable(ty: TypeKey, caller: Option<&Context>, seen: &mut HashSet<TypeId>) -> bool {
    if !seen.insert(ty.id()) {
        return true;
    }

    match ty.descriptor() {
        TypeDescriptor::Predeclared(_) => true,
        TypeDescriptor::Named {
            context,
            visibility,
            ..
        } => {
            visibility == Visibility::Public
                || caller.is_some_and(|caller| context.admits(visibility, caller))
        }
        TypeDescriptor::Pointer(inner)
        | TypeDescriptor::Slice(inner)
        | TypeDescriptor::Channel(inner)
        | TypeDescriptor::Array { element: inner, .. } => reachable(inner, caller, seen),
        TypeDescriptor::Map { key, value } => {
            reachable(key, caller, seen) && reachable(value, caller, seen)
        }
        TypeDescriptor::Function { params, results } => params
            .iter()
            .chain(results.iter())
            .all(|t| reachable(*t, caller, seen)),
        TypeDescriptor::Struct(members) | TypeDescriptor::Interface(members) => {
            members.iter().all(|t| reachable(*t, caller, seen))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;

    const HERE: Context = Context::new(file!());
    const ELSEWHERE: Context = Context::new("src/elsewhere.rs");

    struct Public;
    struct Private;
    struct Foreign;
    trait Handler {}

    crate::describe!(pub Public);
    crate::describe!(Private);
    crate::describe!(pub dyn Handler);

    impl Describe for Foreign {
        fn describe() -> TypeDescriptor {
            TypeDescriptor::named("Foreign", ELSEWHERE, Visibility::Private)
        }
    }

    /// An anonymous interface whose method takes a private type.
    struct PrivateMethods;

    impl Describe for PrivateMethods {
        fn describe() -> TypeDescriptor {
            TypeDescriptor::Interface(vec![TypeKey::of::<fn(Private) -> bool>()])
        }
    }

    /// A descriptor that refers back to itself through a slice.
    struct Recursive;

    impl Describe for Recursive {
        fn describe() -> TypeDescriptor {
            TypeDescriptor::Struct(vec![TypeKey::of::<Vec<Recursive>>(), TypeKey::of::<u8>()])
        }
    }

    // -----------------------------------------------------------------------
    // Namedness
    // -----------------------------------------------------------------------

    #[test]
    fn primitives_are_named() {
        assert_eq!(namedness(TypeKey::of::<i64>()), Namedness::Named);
        assert_eq!(namedness(TypeKey::of::<String>()), Namedness::Named);
    }

    #[test]
    fn pointers_are_dereferenced() {
        assert_eq!(namedness(TypeKey::of::<Box<Public>>()), Namedness::Named);
        assert_eq!(namedness(TypeKey::of::<Arc<dyn Handler>>()), Namedness::Named);
        assert_eq!(namedness(TypeKey::of::<&'static str>()), Namedness::Named);
    }

    #[test]
    fn composites_are_anonymous() {
        assert_eq!(namedness(TypeKey::of::<(u8, Public)>()), Namedness::Anonymous);
        assert_eq!(namedness(TypeKey::of::<Vec<Public>>()), Namedness::Anonymous);
        assert_eq!(namedness(TypeKey::of::<Arc<Vec<u8>>>()), Namedness::Anonymous);
        assert_eq!(namedness(TypeKey::of::<fn() -> u8>()), Namedness::Anonymous);
        assert_eq!(namedness(TypeKey::of::<PrivateMethods>()), Namedness::Anonymous);
    }

    // -----------------------------------------------------------------------
    // Accessibility
    // -----------------------------------------------------------------------

    #[test]
    fn exported_and_predeclared_types_are_accessible_everywhere() {
        assert_eq!(accessibility(TypeKey::of::<Public>(), &ELSEWHERE), Accessibility::Everywhere);
        assert_eq!(accessibility(TypeKey::of::<u8>(), &ELSEWHERE), Accessibility::Everywhere);
        assert_eq!(
            accessibility(TypeKey::of::<Arc<dyn Handler>>(), &ELSEWHERE),
            Accessibility::Everywhere
        );
    }

    #[test]
    fn private_type_is_accessible_only_from_its_context() {
        assert_eq!(accessibility(TypeKey::of::<Private>(), &HERE), Accessibility::WithinContext);
        assert_eq!(
            accessibility(TypeKey::of::<Private>(), &ELSEWHERE),
            Accessibility::NotAccessible
        );
        assert_eq!(accessibility(TypeKey::of::<Foreign>(), &HERE), Accessibility::NotAccessible);
        assert_eq!(
            accessibility(TypeKey::of::<Foreign>(), &ELSEWHERE),
            Accessibility::WithinContext
        );
    }

    #[test]
    fn composites_take_their_least_accessible_member() {
        assert_eq!(
            accessibility(TypeKey::of::<HashMap<String, Vec<Public>>>(), &ELSEWHERE),
            Accessibility::Everywhere
        );
        assert_eq!(
            accessibility(TypeKey::of::<(Public, Box<Private>)>(), &HERE),
            Accessibility::WithinContext
        );
        assert_eq!(
            accessibility(TypeKey::of::<[Option<Private>; 2]>(), &ELSEWHERE),
            Accessibility::NotAccessible
        );
        assert_eq!(
            accessibility(TypeKey::of::<fn(u8) -> Foreign>(), &HERE),
            Accessibility::NotAccessible
        );
        assert_eq!(
            accessibility(TypeKey::of::<PrivateMethods>(), &HERE),
            Accessibility::WithinContext
        );
    }

    /// Declared `pub(crate)` in another file of a `demo` crate.
    struct Pooled;

    impl Describe for Pooled {
        fn describe() -> TypeDescriptor {
            TypeDescriptor::named(
                "Pooled",
                Context::new("crates/demo/src/net/pool.rs"),
                Visibility::Crate,
            )
        }
    }

    #[test]
    fn crate_visible_type_is_accessible_across_its_crate() {
        let sibling = Context::new("crates/demo/src/store.rs");
        let outsider = Context::new("crates/other/src/lib.rs");
        assert_eq!(accessibility(TypeKey::of::<Pooled>(), &sibling), Accessibility::WithinContext);
        assert_eq!(
            accessibility(TypeKey::of::<Vec<Pooled>>(), &sibling),
            Accessibility::WithinContext
        );
        assert_eq!(
            accessibility(TypeKey::of::<Pooled>(), &outsider),
            Accessibility::NotAccessible
        );
        // Both restricted members must be nameable from the caller.
        assert_eq!(
            accessibility(TypeKey::of::<(Pooled, Foreign)>(), &sibling),
            Accessibility::NotAccessible
        );
    }

    #[test]
    fn recursive_descriptors_terminate() {
        let c = Classification::of::<Recursive>(&HERE);
        assert_eq!(c.namedness, Namedness::Anonymous);
        assert_eq!(c.accessibility, Accessibility::Everywhere);
    }

    #[test]
    fn classify_reports_both_facts() {
        let c = classify(TypeKey::of::<Private>(), &Context::caller());
        assert_eq!(
            c,
            Classification {
                namedness: Namedness::Named,
                accessibility: Accessibility::WithinContext,
            }
        );
    }
}
