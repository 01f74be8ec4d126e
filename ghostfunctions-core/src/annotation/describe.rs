//! Mapping from Rust types to type descriptors

use super::TypeDescriptor;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Rust types with a literal counterpart
///
/// Lets a ghostfunction declare its return type as `Vec<String>` rather than
/// spelling out `TypeDescriptor::list(TypeDescriptor::Str)`.
pub trait Describe {
    fn describe() -> TypeDescriptor;
}

macro_rules! describe_as {
    ($descriptor:expr => $($ty:ty),+) => {
        $(
            impl Describe for $ty {
                fn describe() -> TypeDescriptor {
                    $descriptor
                }
            }
        )+
    };
}

describe_as!(TypeDescriptor::Int => i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
describe_as!(TypeDescriptor::Float => f32, f64);
describe_as!(TypeDescriptor::Str => String, &str);
describe_as!(TypeDescriptor::Bool => bool);
describe_as!(TypeDescriptor::NoneType => ());
describe_as!(TypeDescriptor::Any => crate::value::Value, serde_json::Value);

impl<T: Describe> Describe for Vec<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::list(T::describe())
    }
}

impl<T: Describe> Describe for Option<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::optional(T::describe())
    }
}

impl<T: Describe, S> Describe for HashSet<T, S> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::set(T::describe())
    }
}

impl<T: Describe> Describe for BTreeSet<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::set(T::describe())
    }
}

impl<K: Describe, V: Describe, S> Describe for HashMap<K, V, S> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::dict(K::describe(), V::describe())
    }
}

impl<K: Describe, V: Describe> Describe for BTreeMap<K, V> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::dict(K::describe(), V::describe())
    }
}

macro_rules! describe_tuple {
    ($($name:ident),+) => {
        impl<$($name: Describe),+> Describe for ($($name,)+) {
            fn describe() -> TypeDescriptor {
                TypeDescriptor::Tuple(vec![$($name::describe()),+])
            }
        }
    };
}

describe_tuple!(A);
describe_tuple!(A, B);
describe_tuple!(A, B, C);
describe_tuple!(A, B, C, D);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_nested() {
        assert_eq!(
            <Vec<String>>::describe(),
            TypeDescriptor::list(TypeDescriptor::Str)
        );
        assert_eq!(
            <HashMap<String, Vec<i64>>>::describe(),
            TypeDescriptor::dict(TypeDescriptor::Str, TypeDescriptor::list(TypeDescriptor::Int))
        );
        assert_eq!(
            <(String, Option<f64>)>::describe(),
            TypeDescriptor::Tuple(vec![
                TypeDescriptor::Str,
                TypeDescriptor::optional(TypeDescriptor::Float)
            ])
        );
        assert_eq!(<()>::describe(), TypeDescriptor::NoneType);
    }
}
