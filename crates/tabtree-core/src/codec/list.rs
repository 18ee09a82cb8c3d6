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

//! List and scalar value codecs.

use super::scalar::{escape_string, format_scalar, parse_scalar, read_string, NULL};
use super::{Reader, Writer};
use crate::error::{TtError, TtResult};
use crate::graph::NodeId;
use crate::lex::Delimiter;
use crate::schema::ValueKind;
use crate::value::Value;

impl Reader<'_, '_> {
    /// Read the rest of a field line holding a scalar. Strings and chars
    /// may continue on lines indented at `continuation`.
    pub(super) fn read_scalar(&mut self, kind: &ValueKind, continuation: &str) -> TtResult<Value> {
        let line = self.lexer.line();
        let first = self.lexer.read_line();
        match kind {
            ValueKind::String | ValueKind::Char => {
                if first == NULL {
                    return Ok(Value::Null);
                }
                let text = read_string(
                    &mut self.lexer,
                    first,
                    continuation,
                    self.limits.max_string_size,
                )?;
                if matches!(kind, ValueKind::String) {
                    return Ok(Value::String(text));
                }
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (None, _) => Ok(Value::Null),
                    (Some(c), None) => Ok(Value::Char(c)),
                    _ => Err(TtError::syntax(
                        format!("'{}' is not a single character", text),
                        line,
                    )),
                }
            }
            _ => parse_scalar(&self.schema, kind, first, line),
        }
    }

    /// Read the `-` items of a list whose field sits at `margin`.
    pub(super) fn read_list(
        &mut self,
        owner: NodeId,
        slot: usize,
        element: &ValueKind,
        margin: &str,
    ) -> TtResult<Value> {
        let line = self.lexer.line();
        let rest = self.lexer.read_line().trim();
        if rest == NULL {
            return Ok(Value::List(Vec::new()));
        }
        if !rest.is_empty() {
            return Err(TtError::syntax(
                format!("list items must start on the next line, found '{}'", rest),
                line,
            ));
        }
        let nested = self.nested(margin);
        let mut items = Vec::new();
        loop {
            let token = self.lexer.next_token()?;
            if token.delimiter != Delimiter::Item || token.margin.len() != margin.len() {
                self.lexer.unread(token);
                break;
            }
            match element {
                ValueKind::Object(declared) => {
                    let child = self.read_object(Some(*declared), &nested)?;
                    self.graph.adopt(owner, slot, child)?;
                    items.push(Value::Node(child));
                }
                scalar => items.push(self.read_scalar(scalar, &nested)?),
            }
        }
        Ok(Value::List(items))
    }
}

impl Writer<'_> {
    pub(super) fn write_scalar(&mut self, value: &Value, continuation: &str) {
        match value {
            Value::Null => self.out.push_str(NULL),
            Value::String(s) => self.out.push_str(&escape_string(s, continuation)),
            Value::Char(c) => self.out.push_str(&escape_string(&c.to_string(), continuation)),
            other => {
                if let Some(text) = format_scalar(other) {
                    self.out.push_str(&text);
                }
            }
        }
    }

    /// Write a non-empty list: the field line, then one `-` line per item
    /// at the field's margin.
    pub(super) fn write_list(
        &mut self,
        name: &str,
        element: &ValueKind,
        items: &[Value],
        margin: &str,
    ) -> TtResult<()> {
        if items.is_empty() {
            return Ok(());
        }
        let nested = self.nested(margin);
        self.field_header(margin, name);
        self.out.push('\n');
        for item in items {
            self.out.push_str(margin);
            self.out.push_str("-\t");
            match (element, item) {
                (ValueKind::Object(declared), Value::Node(child)) => {
                    self.write_object(*child, Some(*declared), &nested)?;
                }
                _ => {
                    self.write_scalar(item, &nested);
                    self.out.push('\n');
                }
            }
        }
        Ok(())
    }
}
