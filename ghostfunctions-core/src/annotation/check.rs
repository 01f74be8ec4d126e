//! Structural conformance of values against type descriptors

use super::{ContainerKind, TypeDescriptor};
use crate::error::GhostError;
use crate::value::Value;

impl TypeDescriptor {
    /// Whether `value` has the shape this descriptor declares
    pub fn accepts(&self, value: &Value) -> bool {
        self.check(value).is_ok()
    }

    /// Check `value` against this descriptor
    ///
    /// Primitives match exactly: `True` is not an `int` and `1` is not a
    /// `float`. The error names the first offending element with a path
    /// such as `$[2]` or `$['key']`.
    pub fn check(&self, value: &Value) -> Result<(), GhostError> {
        self.check_at(value, &mut String::from("$"))
    }

    fn check_at(&self, value: &Value, path: &mut String) -> Result<(), GhostError> {
        match (self, value) {
            (Self::Any, _)
            | (Self::NoneType, Value::None)
            | (Self::Bool, Value::Bool(_))
            | (Self::Int, Value::Int(_) | Value::BigInt(_))
            | (Self::Float, Value::Float(_))
            | (Self::Str, Value::Str(_))
            | (Self::Bytes, Value::Bytes(_))
            | (Self::Container(ContainerKind::List), Value::List(_))
            | (Self::Container(ContainerKind::Tuple), Value::Tuple(_))
            | (Self::Container(ContainerKind::Dict), Value::Dict(_))
            | (
                Self::Container(ContainerKind::Set | ContainerKind::FrozenSet),
                Value::Set(_),
            ) => Ok(()),

            (Self::List(item), Value::List(items))
            | (Self::TupleOf(item), Value::Tuple(items))
            | (Self::Set(item), Value::Set(items)) => {
                for (index, element) in items.iter().enumerate() {
                    nested(path, &format!("[{}]", index), |path| {
                        item.check_at(element, path)
                    })?;
                }
                Ok(())
            }

            (Self::Tuple(types), Value::Tuple(items)) => {
                if types.len() != items.len() {
                    return Err(mismatch(
                        self,
                        format!("tuple of length {}", items.len()),
                        path,
                    ));
                }
                for (index, (ty, element)) in types.iter().zip(items).enumerate() {
                    nested(path, &format!("[{}]", index), |path| ty.check_at(element, path))?;
                }
                Ok(())
            }

            (Self::Dict(key_type, value_type), Value::Dict(entries)) => {
                for (key, entry) in entries {
                    let segment = format!("[{}]", key.repr());
                    nested(path, &segment, |path| {
                        key_type.check_at(key, path)?;
                        value_type.check_at(entry, path)
                    })?;
                }
                Ok(())
            }

            (Self::Optional(_), Value::None) => Ok(()),
            (Self::Optional(inner), other) => inner.check_at(other, path),

            (Self::Union(members), other) => {
                if members.iter().any(|member| member.accepts(other)) {
                    Ok(())
                } else {
                    Err(mismatch(self, other.type_name().to_string(), path))
                }
            }

            (_, other) => Err(mismatch(self, other.type_name().to_string(), path)),
        }
    }
}

fn nested<F>(path: &mut String, segment: &str, check: F) -> Result<(), GhostError>
where
    F: FnOnce(&mut String) -> Result<(), GhostError>,
{
    let len = path.len();
    path.push_str(segment);
    let result = check(path);
    path.truncate(len);
    result
}

fn mismatch(expected: &TypeDescriptor, found: String, path: &str) -> GhostError {
    GhostError::TypeValidation {
        expected: expected.to_string(),
        found,
        path: path.to_string(),
    }
}
