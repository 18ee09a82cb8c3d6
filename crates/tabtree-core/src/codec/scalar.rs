// Dweve Tabtree - Tab-indented Object Graph Persistence
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Scalar codecs: booleans, numbers, characters, enums and escaped
//! multi-line strings.

use crate::error::{TtError, TtResult};
use crate::lex::Lexer;
use crate::schema::{Schema, ValueKind};
use crate::value::Value;
use tracing::trace;

/// Text written for a null value whose default is not null.
pub const NULL: &str = "null";

/// Escape a string for output after a field separator.
///
/// Backslashes are doubled, each line feed becomes a trailing backslash
/// followed by a line feed and `continuation_margin`, and the literal text
/// `null` is written as `\null` so it does not read back as a null value.
pub fn escape_string(text: &str, continuation_margin: &str) -> String {
    if text == NULL {
        return "\\null".to_string();
    }
    let mut out = String::with_capacity(text.len() + 2);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => {
                out.push_str("\\\n");
                out.push_str(continuation_margin);
            }
            c => out.push(c),
        }
    }
    out
}

/// Read an escaped string whose first line is `first`, pulling
/// continuation lines from `lexer`.
pub fn read_string(
    lexer: &mut Lexer<'_>,
    first: &str,
    continuation_margin: &str,
    max_size: usize,
) -> TtResult<String> {
    let mut out = String::new();
    let mut line = first;
    loop {
        let continues = unescape_into(line, &mut out);
        if out.len() > max_size {
            return Err(TtError::security(
                format!("string value exceeds {} bytes", max_size),
                lexer.line(),
            ));
        }
        if !continues {
            return Ok(out);
        }
        if lexer.at_eof() {
            return Err(TtError::syntax(
                "input ends inside a multi-line string",
                lexer.line(),
            ));
        }
        out.push('\n');
        let line_no = lexer.line();
        let next = lexer.read_line();
        line = match next.strip_prefix(continuation_margin) {
            Some(rest) => rest,
            None if next.trim().is_empty() => "",
            None => {
                return Err(TtError::margin(
                    "continuation line is not indented under its field",
                    line_no,
                ))
            }
        };
    }
}

/// Append the unescaped content of one line to `out`. Returns true when
/// the line ends with an unescaped backslash.
fn unescape_into(line: &str, out: &mut String) -> bool {
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(escaped) => out.push(escaped),
                None => return true,
            }
        } else {
            out.push(c);
        }
    }
    false
}

/// Text of a non-string scalar.
pub fn format_scalar(value: &Value) -> Option<String> {
    match value {
        Value::Bool(b) => Some(b.to_string()),
        Value::Int(n) => Some(n.to_string()),
        Value::Float(f) => Some(f.to_string()),
        Value::Enum(s) => Some(s.clone()),
        _ => None,
    }
}

/// Parse a non-string scalar. Blank text and `null` read as null, as does
/// an unknown enum constant.
pub fn parse_scalar(schema: &Schema, kind: &ValueKind, text: &str, line: usize) -> TtResult<Value> {
    let text = text.trim();
    if text.is_empty() || text == NULL {
        return Ok(Value::Null);
    }
    let invalid = |what: &str| TtError::syntax(format!("'{}' is not a valid {}", text, what), line);
    Ok(match kind {
        ValueKind::Bool => match text {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => return Err(invalid("boolean")),
        },
        ValueKind::Int => Value::Int(text.parse().map_err(|_| invalid("integer"))?),
        ValueKind::Float => Value::Float(text.parse().map_err(|_| invalid("number"))?),
        ValueKind::Enum(key) => {
            let enumeration = schema.enumeration(*key);
            if enumeration.contains(text) {
                Value::Enum(text.to_string())
            } else {
                trace!(
                    constant = text,
                    enumeration = enumeration.qualified_name.as_str(),
                    "unknown enum constant read as null"
                );
                Value::Null
            }
        }
        _ => return Err(invalid("scalar")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{EnumDef, SchemaBuilder};

    fn read_all(text: &str, margin: &str) -> String {
        let mut lexer = Lexer::new(text);
        let first = lexer.read_line();
        read_string(&mut lexer, first, margin, usize::MAX).unwrap()
    }

    // ==================== String escaping tests ====================

    #[test]
    fn test_escape_plain() {
        assert_eq!(escape_string("hello", "\t"), "hello");
        assert_eq!(escape_string("", "\t"), "");
        assert_eq!(escape_string("null", "\t"), "\\null");
        assert_eq!(escape_string("a\\b", "\t"), "a\\\\b");
    }

    #[test]
    fn test_escape_multiline() {
        assert_eq!(escape_string("one\ntwo", "\t\t"), "one\\\n\t\ttwo");
    }

    #[test]
    fn test_read_multiline() {
        assert_eq!(read_all("one\\\n\t\ttwo\\\n\t\t\n", "\t\t"), "one\ntwo\n");
    }

    #[test]
    fn test_read_escapes() {
        assert_eq!(read_all("\\null\n", "\t"), "null");
        assert_eq!(read_all("ends with \\\\\n", "\t"), "ends with \\");
    }

    #[test]
    fn test_read_accepts_stripped_blank_continuation() {
        assert_eq!(read_all("a\\\n\nrest:\t1\n", "\t"), "a\n");
    }

    #[test]
    fn test_read_margin_mismatch() {
        let mut lexer = Lexer::new("a\\\nb\n");
        let first = lexer.read_line();
        let err = read_string(&mut lexer, first, "\t", usize::MAX).unwrap_err();
        assert_eq!(err.kind, crate::error::TtErrorKind::Margin);
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_read_unterminated() {
        let mut lexer = Lexer::new("a\\");
        let first = lexer.read_line();
        let err = read_string(&mut lexer, first, "\t", usize::MAX).unwrap_err();
        assert_eq!(err.kind, crate::error::TtErrorKind::Syntax);
    }

    #[test]
    fn test_read_string_limit() {
        let mut lexer = Lexer::new("abcdef\n");
        let first = lexer.read_line();
        let err = read_string(&mut lexer, first, "\t", 3).unwrap_err();
        assert_eq!(err.kind, crate::error::TtErrorKind::Security);
    }

    // ==================== Scalar tests ====================

    #[test]
    fn test_parse_scalars() {
        let schema = SchemaBuilder::new()
            .enum_def(EnumDef::new("x", "Color", ["Red", "Green"]))
            .build()
            .unwrap();
        let color = ValueKind::Enum(schema.enum_key("x.Color").unwrap());
        assert_eq!(
            parse_scalar(&schema, &ValueKind::Bool, "true", 1).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            parse_scalar(&schema, &ValueKind::Int, "-42", 1).unwrap(),
            Value::Int(-42)
        );
        assert_eq!(
            parse_scalar(&schema, &ValueKind::Float, "2.5", 1).unwrap(),
            Value::Float(2.5)
        );
        assert_eq!(
            parse_scalar(&schema, &color, "Green", 1).unwrap(),
            Value::Enum("Green".into())
        );
        assert_eq!(parse_scalar(&schema, &color, "Blue", 1).unwrap(), Value::Null);
        assert_eq!(parse_scalar(&schema, &ValueKind::Int, "", 1).unwrap(), Value::Null);
        assert_eq!(parse_scalar(&schema, &ValueKind::Int, "null", 1).unwrap(), Value::Null);
        assert!(parse_scalar(&schema, &ValueKind::Int, "4x", 1).is_err());
        assert!(parse_scalar(&schema, &ValueKind::Bool, "yes", 1).is_err());
    }

    #[test]
    fn test_format_scalars() {
        assert_eq!(format_scalar(&Value::Float(1.0)).as_deref(), Some("1"));
        assert_eq!(format_scalar(&Value::Float(0.1)).as_deref(), Some("0.1"));
        assert_eq!(format_scalar(&Value::Int(7)).as_deref(), Some("7"));
        assert_eq!(format_scalar(&Value::Null), None);
    }
}
