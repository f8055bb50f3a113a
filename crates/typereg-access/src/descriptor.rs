//! Structural type descriptors.
//!
//! Rust erases type structure at runtime, so every storable type states its
//! own shape through [`Describe`]. Children are referenced through
//! [`TypeKey`] handles whose descriptors are produced lazily, which keeps
//! recursive shapes finite and lets the classifier memoize by [`TypeId`].

use std::any::TypeId;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::panic::Location;
use std::sync::mpsc::{Receiver, Sender, SyncSender};
use std::sync::{Arc, Mutex, RwLock};

/// The declaring or calling context of a type: the source file it lives in.
///
/// Types record the file of their [`describe!`](crate::describe)
/// invocation; callers are identified by the file of the call site via
/// `#[track_caller]`. A file under a crate's `src/` directory maps to the
/// module it defines, which is how restricted visibilities are scoped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Context(&'static str);

impl Context {
    /// A context for an explicit source path.
    pub const fn new(path: &'static str) -> Self {
        Self(path)
    }

    /// The context of the nearest caller not marked `#[track_caller]`.
    #[track_caller]
    pub fn caller() -> Self {
        Self(Location::caller().file())
    }

    /// The source path identifying this context.
    pub fn path(&self) -> &'static str {
        self.0
    }

    /// Whether code in `caller` can name a type declared here with
    /// `visibility`.
    ///
    /// Both files must sit under the same `src/` directory and the
    /// caller's module must lie inside the visibility's scope. A path that
    /// does not resolve to a module only admits its own file.
    pub fn admits(&self, visibility: Visibility, caller: &Context) -> bool {
        if visibility == Visibility::Public || self == caller {
            return true;
        }
        let (Some(declared), Some(calling)) = (self.module(), caller.module()) else {
            return false;
        };
        declared.root == calling.root
            && visibility
                .scope(&declared.path)
                .is_some_and(|scope| calling.path.starts_with(&scope))
    }

    fn module(&self) -> Option<Module> {
        let file = self.0.replace('\\', "/");
        let split = match file.rfind("/src/") {
            Some(at) => at + "/src/".len(),
            None if file.starts_with("src/") => "src/".len(),
            None => return None,
        };
        let (root, relative) = file.split_at(split);
        let mut path: Vec<String> = relative
            .strip_suffix(".rs")?
            .split('/')
            .map(str::to_owned)
            .collect();
        match path.last().map(String::as_str) {
            Some("mod") => {
                path.pop();
            }
            Some("lib" | "main") if path.len() == 1 => {
                path.pop();
            }
            _ => {}
        }
        Some(Module {
            root: root.to_owned(),
            path,
        })
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// A source file resolved to its crate source root and module path.
struct Module {
    root: String,
    path: Vec<String>,
}

/// The declared visibility of a named type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// No qualifier, or `pub(self)`.
    Private,
    /// `pub(super)`.
    Super,
    /// `pub(crate)`.
    Crate,
    /// `pub(in path)`, holding the path as written.
    In(&'static str),
    /// Plain `pub`.
    Public,
}

impl Visibility {
    /// Parse a visibility qualifier as rendered by `stringify!`.
    ///
    /// Unrecognised input is treated as private.
    pub fn from_tokens(tokens: &'static str) -> Self {
        let Some(rest) = tokens.trim().strip_prefix("pub") else {
            return Self::Private;
        };
        let rest = rest.trim();
        if rest.is_empty() {
            return Self::Public;
        }
        let Some(restriction) = rest
            .strip_prefix('(')
            .and_then(|r| r.strip_suffix(')'))
            .map(str::trim)
        else {
            return Self::Private;
        };
        match restriction {
            "self" => Self::Private,
            "super" => Self::Super,
            "crate" => Self::Crate,
            _ => match restriction.strip_prefix("in ") {
                Some(path) => Self::In(path.trim()),
                None => Self::Private,
            },
        }
    }

    /// The module path within which the type can be named, given the
    /// module it was declared in. `None` when the path leaves the crate.
    fn scope(self, declared: &[String]) -> Option<Vec<String>> {
        match self {
            Self::Public | Self::Crate => Some(Vec::new()),
            Self::Private => Some(declared.to_vec()),
            Self::Super => declared.split_last().map(|(_, parent)| parent.to_vec()),
            Self::In(path) => {
                let mut segments = path.split("::").map(str::trim).peekable();
                let mut scope = if segments.peek() == Some(&"crate") {
                    segments.next();
                    Vec::new()
                } else {
                    declared.to_vec()
                };
                for segment in segments {
                    match segment {
                        "self" => {}
                        "super" => {
                            scope.pop()?;
                        }
                        name => scope.push(name.to_owned()),
                    }
                }
                Some(scope)
            }
        }
    }
}

/// A type that can describe its own structure.
pub trait Describe: 'static {
    /// The structural descriptor of `Self`.
    fn describe() -> TypeDescriptor;
}

/// Identity token for a described type.
///
/// Equality and hashing use the [`TypeId`] only; the name is carried for
/// diagnostics and the describe function for lazy classification.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
    describe: fn() -> TypeDescriptor,
}

impl TypeKey {
    /// The key of `T`.
    pub fn of<T: Describe + ?Sized>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            describe: <T as Describe>::describe,
        }
    }

    /// The underlying [`TypeId`].
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The compiler-provided type name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Produce the structural descriptor of this type.
    pub fn descriptor(&self) -> TypeDescriptor {
        (self.describe)()
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeKey").field(&self.name).finish()
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// The shape of a type as seen by the classifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeDescriptor {
    /// A language-provided type (primitives, `str`, `String`).
    Predeclared(&'static str),
    /// A declared type.
    Named {
        name: &'static str,
        context: Context,
        visibility: Visibility,
    },
    /// An indirection (`Box`, `Arc`, `&'static T`, `Option`, locks).
    Pointer(TypeKey),
    /// A variable-length sequence.
    Slice(TypeKey),
    /// A fixed-length sequence.
    Array { element: TypeKey, len: usize },
    /// A key/value mapping.
    Map { key: TypeKey, value: TypeKey },
    /// A channel endpoint.
    Channel(TypeKey),
    /// A function pointer.
    Function {
        params: Vec<TypeKey>,
        results: Vec<TypeKey>,
    },
    /// An anonymous product type (tuples, unit).
    Struct(Vec<TypeKey>),
    /// An anonymous interface, listed by its method signatures.
    Interface(Vec<TypeKey>),
}

impl TypeDescriptor {
    /// A declared type.
    pub const fn named(name: &'static str, context: Context, visibility: Visibility) -> Self {
        Self::Named {
            name,
            context,
            visibility,
        }
    }

    /// Returns `true` for predeclared and declared types.
    pub fn has_name(&self) -> bool {
        matches!(self, Self::Predeclared(_) | Self::Named { .. })
    }
}

macro_rules! predeclared {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Describe for $ty {
                fn describe() -> TypeDescriptor {
                    TypeDescriptor::Predeclared(stringify!($ty))
                }
            }
        )+
    };
}

predeclared!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, str,
    String,
);

macro_rules! pointer {
    ($($wrapper:ident),+) => {
        $(
            impl<T: Describe + ?Sized> Describe for $wrapper<T> {
                fn describe() -> TypeDescriptor {
                    TypeDescriptor::Pointer(TypeKey::of::<T>())
                }
            }
        )+
    };
}

pointer!(Box, Arc, Mutex, RwLock);

impl<T: Describe + ?Sized> Describe for &'static T {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::Pointer(TypeKey::of::<T>())
    }
}

impl<T: Describe> Describe for Option<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::Pointer(TypeKey::of::<T>())
    }
}

impl<T: Describe> Describe for [T] {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::Slice(TypeKey::of::<T>())
    }
}

impl<T: Describe> Describe for Vec<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::Slice(TypeKey::of::<T>())
    }
}

impl<T: Describe> Describe for VecDeque<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::Slice(TypeKey::of::<T>())
    }
}

impl<T: Describe, const N: usize> Describe for [T; N] {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::Array {
            element: TypeKey::of::<T>(),
            len: N,
        }
    }
}

impl<K: Describe, V: Describe, S: 'static> Describe for HashMap<K, V, S> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::Map {
            key: TypeKey::of::<K>(),
            value: TypeKey::of::<V>(),
        }
    }
}

impl<K: Describe, V: Describe> Describe for BTreeMap<K, V> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::Map {
            key: TypeKey::of::<K>(),
            value: TypeKey::of::<V>(),
        }
    }
}

macro_rules! channel {
    ($($endpoint:ident),+) => {
        $(
            impl<T: Describe> Describe for $endpoint<T> {
                fn describe() -> TypeDescriptor {
                    TypeDescriptor::Channel(TypeKey::of::<T>())
                }
            }
        )+
    };
}

channel!(Sender, SyncSender, Receiver);

impl Describe for () {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::Struct(Vec::new())
    }
}

macro_rules! tuple {
    ($($field:ident),+) => {
        impl<$($field: Describe),+> Describe for ($($field,)+) {
            fn describe() -> TypeDescriptor {
                TypeDescriptor::Struct(vec![$(TypeKey::of::<$field>()),+])
            }
        }
    };
}

tuple!(A);
tuple!(A, B);
tuple!(A, B, C);
tuple!(A, B, C, D);
tuple!(A, B, C, D, E);
tuple!(A, B, C, D, E, F);

macro_rules! function {
    ($($param:ident),*) => {
        impl<R: Describe, $($param: Describe),*> Describe for fn($($param),*) -> R {
            fn describe() -> TypeDescriptor {
                TypeDescriptor::Function {
                    params: vec![$(TypeKey::of::<$param>()),*],
                    results: vec![TypeKey::of::<R>()],
                }
            }
        }
    };
}

function!();
function!(A);
function!(A, B);
function!(A, B, C);
function!(A, B, C, D);
