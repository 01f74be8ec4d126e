//! Declared types of ghostfunction parameters and return values
//!
//! A [`TypeDescriptor`] plays the role of a return-type annotation. It can be
//! written out directly, parsed from annotation text such as
//! `Dict[str, List[int]]`, or derived from a Rust type through [`Describe`].
//! Descriptors render themselves in the `typing` notation used in prompts and
//! check parsed replies for structural conformance.

mod check;
mod describe;
mod parse;

pub use describe::Describe;

use std::fmt;

/// A builtin container class used without type arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    List,
    Tuple,
    Dict,
    Set,
    FrozenSet,
}

impl ContainerKind {
    /// The builtin class name, e.g. `list`
    pub fn class_name(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Tuple => "tuple",
            Self::Dict => "dict",
            Self::Set => "set",
            Self::FrozenSet => "frozenset",
        }
    }
}

/// Structural description of a literal type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDescriptor {
    /// Accepts any value
    Any,
    /// The `None` type
    NoneType,
    Bool,
    Int,
    Float,
    /// Text; replies for this type are returned without parsing
    Str,
    Bytes,
    /// Bare `list`, `dict`, ...: any contents
    Container(ContainerKind),
    /// Homogeneous list
    List(Box<TypeDescriptor>),
    /// Homogeneous tuple of any length, `Tuple[T, ...]`
    TupleOf(Box<TypeDescriptor>),
    /// Fixed-arity tuple, `Tuple[A, B]`
    Tuple(Vec<TypeDescriptor>),
    Dict(Box<TypeDescriptor>, Box<TypeDescriptor>),
    Set(Box<TypeDescriptor>),
    /// `None` or the inner type
    Optional(Box<TypeDescriptor>),
    /// Any of the member types
    Union(Vec<TypeDescriptor>),
}

impl TypeDescriptor {
    pub fn list(item: TypeDescriptor) -> Self {
        Self::List(Box::new(item))
    }

    pub fn tuple_of(item: TypeDescriptor) -> Self {
        Self::TupleOf(Box::new(item))
    }

    pub fn dict(key: TypeDescriptor, value: TypeDescriptor) -> Self {
        Self::Dict(Box::new(key), Box::new(value))
    }

    pub fn set(item: TypeDescriptor) -> Self {
        Self::Set(Box::new(item))
    }

    pub fn optional(inner: TypeDescriptor) -> Self {
        Self::Optional(Box::new(inner))
    }

    /// Whether replies for this type are plain text
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Str)
    }

    /// The annotation as it would be printed by introspection, e.g.
    /// `<class 'str'>` or `typing.List[str]`
    pub fn annotation(&self) -> String {
        match self.class_name() {
            Some(name) => format!("<class '{}'>", name),
            None => self.to_string(),
        }
    }

    /// Name of a plain class, `None` for generic forms
    fn class_name(&self) -> Option<&'static str> {
        match self {
            Self::NoneType => Some("NoneType"),
            Self::Bool => Some("bool"),
            Self::Int => Some("int"),
            Self::Float => Some("float"),
            Self::Str => Some("str"),
            Self::Bytes => Some("bytes"),
            Self::Container(kind) => Some(kind.class_name()),
            _ => None,
        }
    }
}

/// `typing` notation: `int`, `typing.List[str]`, `typing.Dict[str, int]`
impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("typing.Any"),
            Self::List(item) => write!(f, "typing.List[{}]", item),
            Self::TupleOf(item) => write!(f, "typing.Tuple[{}, ...]", item),
            Self::Tuple(items) if items.is_empty() => f.write_str("typing.Tuple[()]"),
            Self::Tuple(items) => {
                f.write_str("typing.Tuple[")?;
                write_joined(f, items)?;
                f.write_str("]")
            }
            Self::Dict(key, value) => write!(f, "typing.Dict[{}, {}]", key, value),
            Self::Set(item) => write!(f, "typing.Set[{}]", item),
            Self::Optional(inner) => write!(f, "typing.Optional[{}]", inner),
            Self::Union(members) => {
                f.write_str("typing.Union[")?;
                write_joined(f, members)?;
                f.write_str("]")
            }
            plain => f.write_str(plain.class_name().unwrap_or("typing.Any")),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[TypeDescriptor]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}
