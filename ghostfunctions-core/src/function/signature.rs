//! Parameters and signatures of ghostfunctions

use crate::annotation::TypeDescriptor;
use crate::value::Value;
use std::fmt;

/// A declared parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    name: String,
    annotation: Option<TypeDescriptor>,
    default: Option<Value>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, annotation: Option<TypeDescriptor>) -> Self {
        Self {
            name: name.into(),
            annotation,
            default: None,
        }
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn annotation(&self) -> Option<&TypeDescriptor> {
        self.annotation.as_ref()
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        match (&self.annotation, &self.default) {
            (Some(annotation), Some(default)) => write!(f, ": {} = {}", annotation, default),
            (Some(annotation), None) => write!(f, ": {}", annotation),
            (None, Some(default)) => write!(f, "={}", default),
            (None, None) => Ok(()),
        }
    }
}

/// Ordered parameters plus the declared return type
///
/// Rendered the way introspection prints it, e.g.
/// `(n: int, startswith: str) -> typing.List[str]`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Signature {
    parameters: Vec<Parameter>,
    returns: Option<TypeDescriptor>,
}

impl Signature {
    pub fn new(parameters: Vec<Parameter>, returns: Option<TypeDescriptor>) -> Self {
        Self {
            parameters,
            returns,
        }
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn returns(&self) -> Option<&TypeDescriptor> {
        self.returns.as_ref()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, parameter) in self.parameters.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", parameter)?;
        }
        f.write_str(")")?;
        if let Some(returns) = &self.returns {
            write!(f, " -> {}", returns)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_display() {
        let signature = Signature::new(
            vec![
                Parameter::new("n", Some(TypeDescriptor::Int)),
                Parameter::new("startswith", Some(TypeDescriptor::Str)).with_default("a"),
                Parameter::new("extra", None),
            ],
            Some(TypeDescriptor::list(TypeDescriptor::Str)),
        );
        assert_eq!(
            signature.to_string(),
            "(n: int, startswith: str = 'a', extra) -> typing.List[str]"
        );
    }

    #[test]
    fn test_parameter_lookup() {
        let signature = Signature::new(
            vec![Parameter::new("x", None).with_default(1)],
            None,
        );
        let parameter = signature.parameter("x").unwrap();
        assert!(!parameter.is_required());
        assert_eq!(parameter.default_value(), Some(&Value::Int(1)));
        assert!(signature.parameter("y").is_none());
        assert_eq!(signature.to_string(), "(x=1)");
    }
}
