//! Bounded recursive parser for literal values
//!
//! Accepts numbers, strings, bytes, booleans, `None`, tuples, lists, dicts,
//! sets and `set()`. Anything else (names, calls, operators) is rejected.

use super::Value;
use thiserror::Error;

/// Maximum container nesting accepted by the parser
pub const MAX_DEPTH: usize = 100;

/// Failure to parse text as a literal
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at position {position}")]
pub struct LiteralError {
    pub message: String,
    /// Character offset into the input
    pub position: usize,
}

/// Parse `text` as a single literal value
///
/// Surrounding whitespace is ignored. A bare comma-separated sequence at the
/// top level is a tuple, as in `1, 2`.
pub fn parse_literal(text: &str) -> Result<Value, LiteralError> {
    let mut parser = Parser::new(text);
    parser.skip_ws();
    if parser.at_end() {
        return Err(parser.error("empty input"));
    }

    let first = parser.parse_value()?;
    parser.skip_ws();
    let value = if parser.peek() == Some(',') {
        let mut items = vec![first];
        while parser.eat(',') {
            parser.skip_ws();
            if parser.at_end() {
                break;
            }
            items.push(parser.parse_value()?);
            parser.skip_ws();
        }
        Value::Tuple(items)
    } else {
        first
    };

    parser.skip_ws();
    if !parser.at_end() {
        return Err(parser.error("unexpected trailing input"));
    }
    Ok(value)
}

enum Number {
    /// Decimal digits of the magnitude, without leading zeros
    Int(String),
    Float(f64),
}

/// Accumulated contents of a string or bytes literal
enum Text {
    Str(String),
    Bytes(Vec<u8>),
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            depth: 0,
        }
    }

    fn error(&self, message: impl Into<String>) -> LiteralError {
        LiteralError {
            message: message.into(),
            position: self.pos,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), LiteralError> {
        if self.eat(expected) {
            Ok(())
        } else {
            match self.peek() {
                Some(found) => Err(self.error(format!("expected '{}', found '{}'", expected, found))),
                None => Err(self.error(format!("expected '{}', found end of input", expected))),
            }
        }
    }

    fn skip_ws(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => self.pos += 1,
                Some('\\') if matches!(self.peek_at(1), Some('\n')) => self.pos += 2,
                _ => break,
            }
        }
    }

    fn enter(&mut self) -> Result<(), LiteralError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(self.error(format!("nesting deeper than {} levels", MAX_DEPTH)));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn parse_value(&mut self) -> Result<Value, LiteralError> {
        self.skip_ws();
        match self.peek() {
            None => Err(self.error("unexpected end of input")),
            Some('-') | Some('+') => self.parse_signed(),
            Some(c) if c.is_ascii_digit() => Ok(finish_number(self.parse_number()?, false)),
            Some('.') if matches!(self.peek_at(1), Some(d) if d.is_ascii_digit()) => {
                Ok(finish_number(self.parse_number()?, false))
            }
            Some('\'') | Some('"') => self.parse_strings(),
            Some('(') => self.parse_paren(),
            Some('[') => self.parse_list(),
            Some('{') => self.parse_brace(),
            Some(c) if c.is_alphabetic() || c == '_' => self.parse_name(),
            Some(c) => Err(self.error(format!("unexpected character '{}'", c))),
        }
    }

    /// A single `-` or `+` directly applied to a number
    fn parse_signed(&mut self) -> Result<Value, LiteralError> {
        let negative = self.bump() == Some('-');
        self.skip_ws();
        match self.peek() {
            Some(c) if c.is_ascii_digit() || c == '.' => {
                Ok(finish_number(self.parse_number()?, negative))
            }
            _ => Err(self.error("unary sign must be followed by a number")),
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if pred(c)) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn parse_number(&mut self) -> Result<Number, LiteralError> {
        let start = self.pos;

        if self.peek() == Some('0') {
            let radix = match self.peek_at(1) {
                Some('x' | 'X') => Some(16),
                Some('o' | 'O') => Some(8),
                Some('b' | 'B') => Some(2),
                _ => None,
            };
            if let Some(radix) = radix {
                self.pos += 2;
                let digits = self.take_while(|c| c.is_ascii_alphanumeric() || c == '_');
                let digits = digits.replace('_', "");
                let decimal = to_decimal(&digits, radix).ok_or_else(|| LiteralError {
                    message: "invalid integer literal".to_string(),
                    position: start,
                })?;
                self.reject_suffix()?;
                return Ok(Number::Int(decimal));
            }
        }

        let mut text = self.take_while(|c| c.is_ascii_digit() || c == '_');
        let mut is_float = false;

        if self.peek() == Some('.') {
            is_float = true;
            self.pos += 1;
            text.push('.');
            text.push_str(&self.take_while(|c| c.is_ascii_digit() || c == '_'));
        }

        if matches!(self.peek(), Some('e' | 'E')) {
            let exponent_digit = match self.peek_at(1) {
                Some('+' | '-') => self.peek_at(2),
                other => other,
            };
            if matches!(exponent_digit, Some(d) if d.is_ascii_digit()) {
                is_float = true;
                text.push('e');
                self.pos += 1;
                if let Some(sign @ ('+' | '-')) = self.peek() {
                    text.push(sign);
                    self.pos += 1;
                }
                text.push_str(&self.take_while(|c| c.is_ascii_digit() || c == '_'));
            }
        }

        self.reject_suffix()?;

        if text.contains("__") || text.ends_with('_') || text.contains("_.") || text.contains("._")
        {
            return Err(LiteralError {
                message: "invalid underscore in numeric literal".to_string(),
                position: start,
            });
        }
        let text = text.replace('_', "");

        if is_float {
            let x = text.parse::<f64>().map_err(|_| LiteralError {
                message: "invalid float literal".to_string(),
                position: start,
            })?;
            Ok(Number::Float(x))
        } else {
            if text.len() > 1 && text.starts_with('0') && text.chars().any(|c| c != '0') {
                return Err(LiteralError {
                    message: "leading zeros in decimal integer literals are not permitted"
                        .to_string(),
                    position: start,
                });
            }
            let digits = text.trim_start_matches('0');
            Ok(Number::Int(if digits.is_empty() {
                "0".to_string()
            } else {
                digits.to_string()
            }))
        }
    }

    fn reject_suffix(&self) -> Result<(), LiteralError> {
        match self.peek() {
            Some('j' | 'J') => Err(self.error("complex literals are not supported")),
            Some(c) if c.is_alphanumeric() || c == '_' || c == '.' => {
                Err(self.error("invalid numeric literal"))
            }
            _ => Ok(()),
        }
    }

    /// Length of a string prefix (`r`, `b`, `rb`, ...) at the cursor, if a
    /// quote follows it
    fn string_prefix_len(&self) -> Option<usize> {
        let mut len = 0;
        while let Some(c) = self.peek_at(len) {
            if len < 2 && matches!(c, 'r' | 'R' | 'b' | 'B' | 'u' | 'U') {
                len += 1;
            } else {
                break;
            }
        }
        match self.peek_at(len) {
            Some('\'' | '"') => {
                let prefix: String = self.chars[self.pos..self.pos + len]
                    .iter()
                    .collect::<String>()
                    .to_ascii_lowercase();
                matches!(prefix.as_str(), "" | "r" | "u" | "b" | "br" | "rb").then_some(len)
            }
            _ => None,
        }
    }

    /// One or more adjacent string literals, concatenated
    fn parse_strings(&mut self) -> Result<Value, LiteralError> {
        let mut acc = self.parse_single_string()?;
        loop {
            let checkpoint = self.pos;
            self.skip_ws();
            if self.string_prefix_len().is_none() {
                self.pos = checkpoint;
                break;
            }
            let next = self.parse_single_string()?;
            acc = match (acc, next) {
                (Text::Str(mut a), Text::Str(b)) => {
                    a.push_str(&b);
                    Text::Str(a)
                }
                (Text::Bytes(mut a), Text::Bytes(b)) => {
                    a.extend(b);
                    Text::Bytes(a)
                }
                _ => return Err(self.error("cannot mix bytes and nonbytes literals")),
            };
        }
        Ok(match acc {
            Text::Str(s) => Value::Str(s),
            Text::Bytes(b) => Value::Bytes(b),
        })
    }

    fn parse_single_string(&mut self) -> Result<Text, LiteralError> {
        let prefix_len = self
            .string_prefix_len()
            .ok_or_else(|| self.error("expected string literal"))?;
        let prefix: String = self.chars[self.pos..self.pos + prefix_len]
            .iter()
            .collect::<String>()
            .to_ascii_lowercase();
        self.pos += prefix_len;
        let raw = prefix.contains('r');
        let bytes = prefix.contains('b');

        let start = self.pos;
        let quote = self.bump().ok_or_else(|| self.error("expected quote"))?;
        let triple = self.peek() == Some(quote) && self.peek_at(1) == Some(quote);
        if triple {
            self.pos += 2;
        }

        let mut out: Vec<u32> = Vec::new();
        loop {
            let c = self.bump().ok_or_else(|| LiteralError {
                message: "unterminated string literal".to_string(),
                position: start,
            })?;
            if c == quote {
                if !triple {
                    break;
                }
                if self.peek() == Some(quote) && self.peek_at(1) == Some(quote) {
                    self.pos += 2;
                    break;
                }
                out.push(c as u32);
                continue;
            }
            if c == '\n' && !triple {
                return Err(LiteralError {
                    message: "unterminated string literal".to_string(),
                    position: start,
                });
            }
            if bytes && !c.is_ascii() {
                return Err(self.error("bytes can only contain ASCII literal characters"));
            }
            if c != '\\' {
                out.push(c as u32);
                continue;
            }

            let escaped = self
                .bump()
                .ok_or_else(|| self.error("unterminated string literal"))?;
            if raw {
                out.push('\\' as u32);
                out.push(escaped as u32);
                continue;
            }
            match escaped {
                '\n' => {}
                '\\' => out.push('\\' as u32),
                '\'' => out.push('\'' as u32),
                '"' => out.push('"' as u32),
                'a' => out.push(0x07),
                'b' => out.push(0x08),
                'f' => out.push(0x0c),
                'n' => out.push('\n' as u32),
                'r' => out.push('\r' as u32),
                't' => out.push('\t' as u32),
                'v' => out.push(0x0b),
                'x' => out.push(self.hex_escape(2)?),
                'u' if !bytes => out.push(self.hex_escape(4)?),
                'U' if !bytes => out.push(self.hex_escape(8)?),
                'N' if !bytes => {
                    return Err(self.error("named unicode escapes are not supported"))
                }
                '0'..='7' => {
                    let mut code = escaped.to_digit(8).unwrap_or(0);
                    for _ in 0..2 {
                        match self.peek().and_then(|d| d.to_digit(8)) {
                            Some(d) => {
                                code = code * 8 + d;
                                self.pos += 1;
                            }
                            None => break,
                        }
                    }
                    out.push(code);
                }
                other => {
                    out.push('\\' as u32);
                    out.push(other as u32);
                }
            }
        }

        if bytes {
            out.into_iter()
                .map(|code| u8::try_from(code).map_err(|_| self.error("byte value out of range")))
                .collect::<Result<Vec<u8>, _>>()
                .map(Text::Bytes)
        } else {
            out.into_iter()
                .map(|code| char::from_u32(code).ok_or_else(|| self.error("invalid unicode escape")))
                .collect::<Result<String, _>>()
                .map(Text::Str)
        }
    }

    fn hex_escape(&mut self, digits: usize) -> Result<u32, LiteralError> {
        let mut code = 0u32;
        for _ in 0..digits {
            let d = self
                .peek()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| {
                    self.error(format!("truncated escape, expected {} hex digits", digits))
                })?;
            code = code * 16 + d;
            self.pos += 1;
        }
        Ok(code)
    }

    fn parse_name(&mut self) -> Result<Value, LiteralError> {
        if self.string_prefix_len().is_some() {
            return self.parse_strings();
        }
        let start = self.pos;
        let name = self.take_while(|c| c.is_alphanumeric() || c == '_');
        match name.as_str() {
            "True" => Ok(Value::Bool(true)),
            "False" => Ok(Value::Bool(false)),
            "None" => Ok(Value::None),
            "set" => {
                self.skip_ws();
                self.expect('(')?;
                self.skip_ws();
                self.expect(')')?;
                Ok(Value::Set(Vec::new()))
            }
            other => Err(LiteralError {
                message: format!("name '{}' is not a literal", other),
                position: start,
            }),
        }
    }

    /// Comma separated values up to `close`, allowing a trailing comma.
    /// Returns the values and whether any comma was seen.
    fn parse_sequence(&mut self, close: char) -> Result<(Vec<Value>, bool), LiteralError> {
        let mut items = Vec::new();
        let mut saw_comma = false;
        loop {
            self.skip_ws();
            if self.eat(close) {
                return Ok((items, saw_comma));
            }
            items.push(self.parse_value()?);
            self.skip_ws();
            if self.eat(',') {
                saw_comma = true;
                continue;
            }
            self.expect(close)?;
            return Ok((items, saw_comma));
        }
    }

    fn parse_paren(&mut self) -> Result<Value, LiteralError> {
        self.expect('(')?;
        self.enter()?;
        let (mut items, saw_comma) = self.parse_sequence(')')?;
        self.leave();
        if items.len() == 1 && !saw_comma {
            return Ok(items.remove(0));
        }
        Ok(Value::Tuple(items))
    }

    fn parse_list(&mut self) -> Result<Value, LiteralError> {
        self.expect('[')?;
        self.enter()?;
        let (items, _) = self.parse_sequence(']')?;
        self.leave();
        Ok(Value::List(items))
    }

    fn parse_brace(&mut self) -> Result<Value, LiteralError> {
        self.expect('{')?;
        self.enter()?;
        self.skip_ws();
        if self.eat('}') {
            self.leave();
            return Ok(Value::Dict(Vec::new()));
        }

        let first_pos = self.pos;
        let first = self.parse_value()?;
        self.skip_ws();

        let value = if self.eat(':') {
            let mut pairs = vec![(first, self.parse_value()?)];
            self.check_hashable(&pairs[0].0, first_pos)?;
            loop {
                self.skip_ws();
                if self.eat('}') {
                    break;
                }
                self.expect(',')?;
                self.skip_ws();
                if self.eat('}') {
                    break;
                }
                let key_pos = self.pos;
                let key = self.parse_value()?;
                self.check_hashable(&key, key_pos)?;
                self.skip_ws();
                self.expect(':')?;
                let value = self.parse_value()?;
                pairs.push((key, value));
            }
            Value::dict_of(pairs)
        } else {
            self.check_hashable(&first, first_pos)?;
            let mut items = vec![first];
            loop {
                self.skip_ws();
                if self.eat('}') {
                    break;
                }
                self.expect(',')?;
                self.skip_ws();
                if self.eat('}') {
                    break;
                }
                let item_pos = self.pos;
                let item = self.parse_value()?;
                self.check_hashable(&item, item_pos)?;
                items.push(item);
            }
            Value::set_of(items)
        };

        self.leave();
        Ok(value)
    }

    fn check_hashable(&self, value: &Value, position: usize) -> Result<(), LiteralError> {
        if value.is_hashable() {
            Ok(())
        } else {
            Err(LiteralError {
                message: format!("unhashable type: '{}'", value.type_name()),
                position,
            })
        }
    }
}

/// Integers that fit `i64` become `Value::Int`, larger ones keep their digits
fn finish_number(number: Number, negative: bool) -> Value {
    match number {
        Number::Int(digits) => {
            let text = if negative && digits != "0" {
                format!("-{}", digits)
            } else {
                digits
            };
            match text.parse::<i64>() {
                Ok(n) => Value::Int(n),
                Err(_) => Value::BigInt(text),
            }
        }
        Number::Float(x) => Value::Float(if negative { -x } else { x }),
    }
}

/// Decimal digits of `digits` read in `radix`, or `None` if a digit is invalid
fn to_decimal(digits: &str, radix: u32) -> Option<String> {
    if digits.is_empty() {
        return None;
    }
    // least significant digit first
    let mut decimal: Vec<u32> = vec![0];
    for c in digits.chars() {
        let mut carry = c.to_digit(radix)?;
        for d in decimal.iter_mut() {
            let x = *d * radix + carry;
            *d = x % 10;
            carry = x / 10;
        }
        while carry > 0 {
            decimal.push(carry % 10);
            carry /= 10;
        }
    }
    while decimal.len() > 1 && decimal.last() == Some(&0) {
        decimal.pop();
    }
    Some(
        decimal
            .iter()
            .rev()
            .filter_map(|d| char::from_digit(*d, 10))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Value {
        parse_literal(text).unwrap_or_else(|e| panic!("failed to parse {:?}: {}", text, e))
    }

    #[test]
    fn test_numbers() {
        assert_eq!(parse("11"), Value::Int(11));
        assert_eq!(parse("-42"), Value::Int(-42));
        assert_eq!(parse("1_000"), Value::Int(1000));
        assert_eq!(parse("0x1F"), Value::Int(31));
        assert_eq!(parse("0o17"), Value::Int(15));
        assert_eq!(parse("0b101"), Value::Int(5));
        assert_eq!(parse("1.23"), Value::Float(1.23));
        assert_eq!(parse(".5"), Value::Float(0.5));
        assert_eq!(parse("5."), Value::Float(5.0));
        assert_eq!(parse("-2.5e3"), Value::Float(-2500.0));
        assert_eq!(parse("-9223372036854775808"), Value::Int(i64::MIN));
        assert_eq!(parse("+7"), Value::Int(7));
        assert_eq!(parse("- 3"), Value::Int(-3));
        assert_eq!(parse("-0"), Value::Int(0));
    }

    #[test]
    fn test_integers_beyond_i64() {
        assert_eq!(
            parse("12345678901234567890"),
            Value::BigInt("12345678901234567890".to_string())
        );
        assert_eq!(
            parse("-15511210043330985984000000"),
            Value::BigInt("-15511210043330985984000000".to_string())
        );
        assert_eq!(
            parse("9223372036854775808"),
            Value::BigInt("9223372036854775808".to_string())
        );
        assert_eq!(
            parse("0x1_0000_0000_0000_0000"),
            Value::BigInt("18446744073709551616".to_string())
        );
        assert_eq!(parse("0xff"), Value::Int(255));
        assert_eq!(parse("0b0"), Value::Int(0));
        assert_eq!(
            parse("[1, 100000000000000000000]"),
            Value::List(vec![1.into(), Value::BigInt("100000000000000000000".to_string())])
        );
        assert_eq!(parse("100000000000000000000").repr(), "100000000000000000000");
    }

    #[test]
    fn test_single_unary_sign() {
        assert!(parse_literal("--5").is_err());
        assert!(parse_literal("+-5").is_err());
        assert!(parse_literal("- -1.5").is_err());
        assert!(parse_literal("-").is_err());
    }

    #[test]
    fn test_invalid_numbers() {
        assert!(parse_literal("012").is_err());
        assert!(parse_literal("0x").is_err());
        assert!(parse_literal("0b102").is_err());
        assert!(parse_literal("1+2j").is_err());
        assert!(parse_literal("3j").is_err());
        assert!(parse_literal("12abc").is_err());
        assert!(parse_literal("1__0").is_err());
    }

    #[test]
    fn test_strings() {
        assert_eq!(parse("'goo'"), Value::from("goo"));
        assert_eq!(parse("\"it's\""), Value::from("it's"));
        assert_eq!(parse(r"'a\nb\t\x41é'"), Value::from("a\nb\tA\u{e9}"));
        assert_eq!(parse(r"r'a\nb'"), Value::from("a\\nb"));
        assert_eq!(parse("'''multi\nline'''"), Value::from("multi\nline"));
        assert_eq!(parse("'ab' \"cd\""), Value::from("abcd"));
        assert_eq!(parse(r"'\q'"), Value::from("\\q"));
        assert_eq!(parse(r"'\101'"), Value::from("A"));
        assert_eq!(parse("b'return bytes'"), Value::Bytes(b"return bytes".to_vec()));
        assert_eq!(parse(r"b'\xff'"), Value::Bytes(vec![0xff]));
    }

    #[test]
    fn test_invalid_strings() {
        assert!(parse_literal("'open").is_err());
        assert!(parse_literal("'line\nbreak'").is_err());
        assert!(parse_literal("b'caf\u{e9}'").is_err());
        assert!(parse_literal("b'a' 'b'").is_err());
        assert!(parse_literal("f'{x}'").is_err());
    }

    #[test]
    fn test_names() {
        assert_eq!(parse("True"), Value::Bool(true));
        assert_eq!(parse("False"), Value::Bool(false));
        assert_eq!(parse("None"), Value::None);
        assert_eq!(parse("set()"), Value::Set(vec![]));

        let err = parse_literal("not valid python").unwrap_err();
        assert_eq!(err.message, "name 'not' is not a literal");
        assert_eq!(err.position, 0);
        assert!(parse_literal("true").is_err());
        assert!(parse_literal("__import__('os')").is_err());
    }

    #[test]
    fn test_containers() {
        assert_eq!(
            parse(r#"["word1","word2"]"#),
            Value::List(vec!["word1".into(), "word2".into()])
        );
        assert_eq!(parse("[1, 2,]"), Value::List(vec![1.into(), 2.into()]));
        assert_eq!(parse("()"), Value::Tuple(vec![]));
        assert_eq!(parse("(1)"), Value::Int(1));
        assert_eq!(parse("(1,)"), Value::Tuple(vec![1.into()]));
        assert_eq!(parse("'a', 'b'"), Value::Tuple(vec!["a".into(), "b".into()]));
        assert_eq!(parse("{}"), Value::Dict(vec![]));
        assert_eq!(
            parse("{'return': 'dict', 'n': [1, {2}]}"),
            Value::Dict(vec![
                ("return".into(), "dict".into()),
                ("n".into(), Value::List(vec![1.into(), Value::Set(vec![2.into()])])),
            ])
        );
        assert_eq!(
            parse("{'return', 'set', 'set'}"),
            Value::Set(vec!["return".into(), "set".into()])
        );
        assert_eq!(
            parse("[\n  1,\n  2\n]\n"),
            Value::List(vec![1.into(), 2.into()])
        );
    }

    #[test]
    fn test_invalid_containers() {
        assert!(parse_literal("[1, 2").is_err());
        assert!(parse_literal("[1 2]").is_err());
        assert!(parse_literal("{[1]: 2}").is_err());
        assert!(parse_literal("{[1], 2}").is_err());
        assert!(parse_literal("{'a': 1, 'b'}").is_err());
        assert!(parse_literal("[1] [2]").is_err());
        assert!(parse_literal("").is_err());
        assert!(parse_literal("   ").is_err());
        assert!(parse_literal("-'a'").is_err());
    }

    #[test]
    fn test_depth_is_bounded() {
        let ok = format!("{}{}", "[".repeat(MAX_DEPTH), "]".repeat(MAX_DEPTH));
        assert!(parse_literal(&ok).is_ok());

        let deep = format!("{}{}", "[".repeat(MAX_DEPTH + 1), "]".repeat(MAX_DEPTH + 1));
        let err = parse_literal(&deep).unwrap_err();
        assert!(err.message.contains("nesting"));
    }
}
