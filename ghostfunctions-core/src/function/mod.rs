//! Function contracts
//!
//! A [`FunctionDescriptor`] captures everything a ghostfunction is allowed to
//! know about the function it stands in for: its name, docstring, parameters
//! and return type. It is built once, validated at decoration time and never
//! re-derived per call.

mod arguments;
mod signature;

pub use arguments::{BoundArguments, CallArgs};
pub use signature::{Parameter, Signature};

use crate::annotation::{Describe, TypeDescriptor};
use crate::error::{ContractRequirement, GhostError};
use crate::value::Value;
use std::collections::HashSet;

/// Name, docstring and signature of a ghostfunction
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDescriptor {
    name: String,
    docstring: Option<String>,
    signature: Signature,
}

impl FunctionDescriptor {
    /// Create a descriptor from its parts without validating it
    pub fn new(name: impl Into<String>, docstring: Option<String>, signature: Signature) -> Self {
        Self {
            name: name.into(),
            docstring,
            signature,
        }
    }

    /// Start building a descriptor for the function `name`
    pub fn builder(name: impl Into<String>) -> FunctionBuilder {
        FunctionBuilder {
            name: name.into(),
            docstring: None,
            parameters: Vec::new(),
            returns: None,
            error: None,
        }
    }

    /// Function name as used in the prompt
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Docstring, exactly as declared
    pub fn docstring(&self) -> Option<&str> {
        self.docstring.as_deref()
    }

    /// Parameters and return type
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Declared parameters, in order
    pub fn parameters(&self) -> &[Parameter] {
        self.signature.parameters()
    }

    /// Declared return type, if any
    pub fn return_type(&self) -> Option<&TypeDescriptor> {
        self.signature.returns()
    }

    /// Check the contract a ghostfunction requires
    ///
    /// The name and every parameter name must be identifiers, parameter names
    /// must be unique, the docstring must not be blank and a return type must
    /// be declared.
    pub fn validate(&self) -> Result<(), GhostError> {
        if !is_identifier(&self.name) {
            return Err(GhostError::contract(&self.name, ContractRequirement::Name));
        }

        let mut seen = HashSet::new();
        for parameter in self.parameters() {
            if !is_identifier(parameter.name()) || !seen.insert(parameter.name()) {
                return Err(GhostError::contract(
                    &self.name,
                    ContractRequirement::Parameter(parameter.name().to_string()),
                ));
            }
        }

        if self.docstring().map_or(true, |doc| doc.trim().is_empty()) {
            return Err(GhostError::contract(&self.name, ContractRequirement::Docstring));
        }
        if self.return_type().is_none() {
            return Err(GhostError::contract(
                &self.name,
                ContractRequirement::ReturnAnnotation,
            ));
        }
        Ok(())
    }

    /// Bind call arguments to this function's parameters
    pub fn bind(&self, args: CallArgs) -> Result<BoundArguments, GhostError> {
        self.signature.bind(&self.name, args)
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Builder for [`FunctionDescriptor`]
#[derive(Debug)]
pub struct FunctionBuilder {
    name: String,
    docstring: Option<String>,
    parameters: Vec<Parameter>,
    returns: Option<TypeDescriptor>,
    error: Option<GhostError>,
}

impl FunctionBuilder {
    /// Set the docstring
    pub fn doc(mut self, docstring: impl Into<String>) -> Self {
        self.docstring = Some(docstring.into());
        self
    }

    /// Add an annotated parameter
    pub fn param(mut self, name: impl Into<String>, annotation: TypeDescriptor) -> Self {
        self.parameters.push(Parameter::new(name, Some(annotation)));
        self
    }

    /// Add a parameter without annotation
    pub fn untyped_param(mut self, name: impl Into<String>) -> Self {
        self.parameters.push(Parameter::new(name, None));
        self
    }

    /// Add an annotated parameter that may be omitted at call time
    pub fn param_with_default(
        mut self,
        name: impl Into<String>,
        annotation: TypeDescriptor,
        default: impl Into<Value>,
    ) -> Self {
        self.parameters
            .push(Parameter::new(name, Some(annotation)).with_default(default));
        self
    }

    /// Declare the return type
    pub fn returns(mut self, returns: TypeDescriptor) -> Self {
        self.returns = Some(returns);
        self
    }

    /// Declare the return type from a Rust type, e.g. `returns_type::<Vec<String>>()`
    pub fn returns_type<T: Describe>(self) -> Self {
        self.returns(T::describe())
    }

    /// Declare the return type from annotation text such as `List[str]`
    pub fn returns_annotation(mut self, annotation: &str) -> Self {
        match TypeDescriptor::parse(annotation) {
            Ok(returns) => self.returns = Some(returns),
            Err(err) => self.error = Some(err),
        }
        self
    }

    /// Finish the descriptor
    ///
    /// Fails only if an annotation could not be parsed; the function contract
    /// is checked when the descriptor is decorated.
    pub fn build(self) -> Result<FunctionDescriptor, GhostError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        Ok(FunctionDescriptor {
            name: self.name,
            docstring: self.docstring,
            signature: Signature::new(self.parameters, self.returns),
        })
    }
}
