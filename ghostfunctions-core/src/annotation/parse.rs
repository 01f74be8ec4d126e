//! Parsing of annotation text into type descriptors

use super::{ContainerKind, TypeDescriptor};
use crate::error::GhostError;
use std::str::FromStr;

impl TypeDescriptor {
    /// Parse annotation text such as `List[str]`, `typing.Dict[str, int]`,
    /// `Optional[float]`, `int | None` or `<class 'str'>`
    pub fn parse(annotation: &str) -> Result<Self, GhostError> {
        let mut parser = AnnotationParser {
            text: annotation,
            chars: annotation.chars().collect(),
            pos: 0,
        };
        let descriptor = parser.parse_union()?;
        parser.skip_ws();
        if parser.pos < parser.chars.len() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(descriptor)
    }
}

impl FromStr for TypeDescriptor {
    type Err = GhostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// One argument inside `[...]`
enum Arg {
    Type(TypeDescriptor),
    Ellipsis,
    EmptyTuple,
}

struct AnnotationParser<'a> {
    text: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl AnnotationParser<'_> {
    fn error(&self, message: impl Into<String>) -> GhostError {
        GhostError::InvalidAnnotation {
            annotation: self.text.to_string(),
            message: message.into(),
        }
    }

    fn skip_ws(&mut self) {
        while matches!(self.chars.get(self.pos), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_ws();
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_str(&mut self, expected: &str) -> bool {
        self.skip_ws();
        let end = self.pos + expected.chars().count();
        if end <= self.chars.len()
            && self.chars[self.pos..end].iter().copied().eq(expected.chars())
        {
            self.pos = end;
            true
        } else {
            false
        }
    }

    /// `A | B | ...`
    fn parse_union(&mut self) -> Result<TypeDescriptor, GhostError> {
        let first = self.parse_type()?;
        let mut members = vec![first];
        while self.eat('|') {
            members.push(self.parse_type()?);
        }
        Ok(union_of(members))
    }

    fn parse_type(&mut self) -> Result<TypeDescriptor, GhostError> {
        self.skip_ws();
        if self.eat_str("<class '") {
            let name = self.dotted_name()?;
            if !self.eat_str("'>") {
                return Err(self.error("unterminated class repr"));
            }
            return self.plain(&name);
        }

        let name = self.dotted_name()?;
        if !self.eat('[') {
            return self.plain(&name);
        }

        let mut args = Vec::new();
        loop {
            args.push(self.parse_arg()?);
            if self.eat(',') {
                continue;
            }
            if self.eat(']') {
                break;
            }
            return Err(self.error("expected ',' or ']'"));
        }
        self.generic(&name, args)
    }

    fn parse_arg(&mut self) -> Result<Arg, GhostError> {
        if self.eat_str("...") {
            return Ok(Arg::Ellipsis);
        }
        if self.eat_str("()") {
            return Ok(Arg::EmptyTuple);
        }
        self.parse_union().map(Arg::Type)
    }

    fn dotted_name(&mut self) -> Result<String, GhostError> {
        self.skip_ws();
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_' || c == '.') {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(self.error("expected a type name"));
        }
        let name: String = self.chars[start..self.pos].iter().collect();
        Ok(name
            .strip_prefix("typing.")
            .or_else(|| name.strip_prefix("builtins."))
            .unwrap_or(&name)
            .to_string())
    }

    fn plain(&self, name: &str) -> Result<TypeDescriptor, GhostError> {
        let descriptor = match name {
            "Any" | "object" => TypeDescriptor::Any,
            "None" | "NoneType" => TypeDescriptor::NoneType,
            "bool" => TypeDescriptor::Bool,
            "int" => TypeDescriptor::Int,
            "float" => TypeDescriptor::Float,
            "str" => TypeDescriptor::Str,
            "bytes" => TypeDescriptor::Bytes,
            "list" => TypeDescriptor::Container(ContainerKind::List),
            "tuple" => TypeDescriptor::Container(ContainerKind::Tuple),
            "dict" => TypeDescriptor::Container(ContainerKind::Dict),
            "set" => TypeDescriptor::Container(ContainerKind::Set),
            "frozenset" => TypeDescriptor::Container(ContainerKind::FrozenSet),
            "List" => TypeDescriptor::list(TypeDescriptor::Any),
            "Tuple" => TypeDescriptor::tuple_of(TypeDescriptor::Any),
            "Dict" => TypeDescriptor::dict(TypeDescriptor::Any, TypeDescriptor::Any),
            "Set" | "FrozenSet" => TypeDescriptor::set(TypeDescriptor::Any),
            other => return Err(self.error(format!("unsupported type '{}'", other))),
        };
        Ok(descriptor)
    }

    fn generic(&self, name: &str, args: Vec<Arg>) -> Result<TypeDescriptor, GhostError> {
        match name {
            "list" | "List" => {
                let [item] = self.types::<1>(name, args)?;
                Ok(TypeDescriptor::list(item))
            }
            "set" | "Set" | "frozenset" | "FrozenSet" => {
                let [item] = self.types::<1>(name, args)?;
                Ok(TypeDescriptor::set(item))
            }
            "dict" | "Dict" => {
                let [key, value] = self.types::<2>(name, args)?;
                Ok(TypeDescriptor::dict(key, value))
            }
            "Optional" => {
                let [inner] = self.types::<1>(name, args)?;
                Ok(TypeDescriptor::optional(inner))
            }
            "Union" => {
                let members = self.all_types(name, args)?;
                Ok(union_of(members))
            }
            "tuple" | "Tuple" => {
                if matches!(args.as_slice(), [Arg::EmptyTuple]) {
                    return Ok(TypeDescriptor::Tuple(Vec::new()));
                }
                if let [Arg::Type(item), Arg::Ellipsis] = args.as_slice() {
                    return Ok(TypeDescriptor::tuple_of(item.clone()));
                }
                self.all_types(name, args).map(TypeDescriptor::Tuple)
            }
            other => Err(self.error(format!("'{}' does not take type arguments", other))),
        }
    }

    fn all_types(&self, name: &str, args: Vec<Arg>) -> Result<Vec<TypeDescriptor>, GhostError> {
        args.into_iter()
            .map(|arg| match arg {
                Arg::Type(t) => Ok(t),
                _ => Err(self.error(format!("invalid argument to {}", name))),
            })
            .collect()
    }

    fn types<const N: usize>(
        &self,
        name: &str,
        args: Vec<Arg>,
    ) -> Result<[TypeDescriptor; N], GhostError> {
        let types = self.all_types(name, args)?;
        let found = types.len();
        types.try_into().map_err(|_| {
            self.error(format!(
                "{} expects {} type argument(s), found {}",
                name, N, found
            ))
        })
    }
}

/// Collapse a member list: one member is itself, `X | None` is `Optional[X]`
fn union_of(mut members: Vec<TypeDescriptor>) -> TypeDescriptor {
    if members.len() == 1 {
        return members.remove(0);
    }
    if members.len() == 2 {
        if members[1] == TypeDescriptor::NoneType {
            return TypeDescriptor::optional(members.remove(0));
        }
        if members[0] == TypeDescriptor::NoneType {
            return TypeDescriptor::optional(members.remove(1));
        }
    }
    TypeDescriptor::Union(members)
}
