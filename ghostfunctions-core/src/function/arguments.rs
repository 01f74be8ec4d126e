//! Call-time arguments and their binding to parameters

use super::Signature;
use crate::error::GhostError;
use crate::value::Value;

/// Arguments of one invocation, as the caller supplied them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    positional: Vec<Value>,
    keyword: Vec<(String, Value)>,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Positional arguments only
    pub fn from_positional<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            positional: values.into_iter().map(Into::into).collect(),
            keyword: Vec::new(),
        }
    }

    /// Append a positional argument
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Append a keyword argument
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keyword.push((name.into(), value.into()));
        self
    }

    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    pub fn keyword(&self) -> &[(String, Value)] {
        &self.keyword
    }
}

/// Arguments bound to parameter names, in declaration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundArguments {
    entries: Vec<(String, Value)>,
}

impl BoundArguments {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render as `name=repr` pairs joined by `,`
    pub fn to_call_list(&self) -> String {
        self.iter()
            .map(|(name, value)| format!("{}={}", name, value.repr()))
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl<'a> IntoIterator for &'a BoundArguments {
    type Item = (&'a str, &'a Value);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a Value)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

impl Signature {
    /// Bind `args` to the parameters
    ///
    /// Positionals fill parameters in order, keywords match by name and
    /// defaults fill whatever is left.
    pub fn bind(&self, function: &str, args: CallArgs) -> Result<BoundArguments, GhostError> {
        let parameters = self.parameters();
        if args.positional.len() > parameters.len() {
            return Err(GhostError::mismatch(
                function,
                format!(
                    "takes {} positional argument{} but {} {} given",
                    parameters.len(),
                    if parameters.len() == 1 { "" } else { "s" },
                    args.positional.len(),
                    if args.positional.len() == 1 { "was" } else { "were" },
                ),
            ));
        }

        let mut slots: Vec<Option<Value>> = vec![None; parameters.len()];
        for (slot, value) in slots.iter_mut().zip(args.positional) {
            *slot = Some(value);
        }

        for (name, value) in args.keyword {
            let index = parameters
                .iter()
                .position(|p| p.name() == name)
                .ok_or_else(|| {
                    GhostError::mismatch(
                        function,
                        format!("got an unexpected keyword argument '{}'", name),
                    )
                })?;
            if slots[index].is_some() {
                return Err(GhostError::mismatch(
                    function,
                    format!("got multiple values for argument '{}'", name),
                ));
            }
            slots[index] = Some(value);
        }

        let mut missing = Vec::new();
        let mut entries = Vec::with_capacity(parameters.len());
        for (parameter, slot) in parameters.iter().zip(slots) {
            match slot.or_else(|| parameter.default_value().cloned()) {
                Some(value) => entries.push((parameter.name().to_string(), value)),
                None => missing.push(format!("'{}'", parameter.name())),
            }
        }
        if !missing.is_empty() {
            return Err(GhostError::mismatch(
                function,
                format!(
                    "missing {} required argument{}: {}",
                    missing.len(),
                    if missing.len() == 1 { "" } else { "s" },
                    missing.join(", ")
                ),
            ));
        }

        Ok(BoundArguments { entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::TypeDescriptor;
    use crate::function::Parameter;

    fn signature() -> Signature {
        Signature::new(
            vec![
                Parameter::new("n", Some(TypeDescriptor::Int)),
                Parameter::new("startswith", Some(TypeDescriptor::Str)).with_default("a"),
            ],
            Some(TypeDescriptor::list(TypeDescriptor::Str)),
        )
    }

    fn mismatch_message(err: GhostError) -> String {
        match err {
            GhostError::SignatureMismatch { message, .. } => message,
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_positional_and_keyword_bind_alike() {
        let by_position = signature()
            .bind("f", CallArgs::new().arg(5).arg("goo"))
            .unwrap();
        let by_keyword = signature()
            .bind("f", CallArgs::new().kwarg("startswith", "goo").kwarg("n", 5))
            .unwrap();
        assert_eq!(by_position, by_keyword);
        assert_eq!(by_position.to_call_list(), "n=5,startswith='goo'");
    }

    #[test]
    fn test_default_fills_missing() {
        let bound = signature().bind("f", CallArgs::new().arg(2)).unwrap();
        assert_eq!(bound.get("startswith"), Some(&Value::from("a")));
        assert_eq!(bound.len(), 2);
    }

    #[test]
    fn test_too_many_positionals() {
        let err = signature()
            .bind("f", CallArgs::from_positional([1, 2, 3]))
            .unwrap_err();
        assert_eq!(
            mismatch_message(err),
            "takes 2 positional arguments but 3 were given"
        );
    }

    #[test]
    fn test_unknown_keyword() {
        let err = signature()
            .bind("f", CallArgs::new().arg(1).kwarg("color", "red"))
            .unwrap_err();
        assert_eq!(
            mismatch_message(err),
            "got an unexpected keyword argument 'color'"
        );
    }

    #[test]
    fn test_multiple_values() {
        let err = signature()
            .bind("f", CallArgs::new().arg(1).kwarg("n", 2))
            .unwrap_err();
        assert_eq!(mismatch_message(err), "got multiple values for argument 'n'");
    }

    #[test]
    fn test_missing_required() {
        let err = signature().bind("f", CallArgs::new()).unwrap_err();
        assert_eq!(mismatch_message(err), "missing 1 required argument: 'n'");
    }
}
