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

//! Polymorphic object codec.

use super::{Reader, Writer};
use crate::error::{TtError, TtResult};
use crate::graph::NodeId;
use crate::lex::{is_end, Delimiter, Token};
use crate::schema::{TypeKey, ValueKind};
use crate::value::Value;
use std::sync::Arc;
use tracing::trace;

impl Reader<'_, '_> {
    /// Read the whole input as one root object.
    pub(crate) fn read_document(&mut self) -> TtResult<NodeId> {
        let root = self.read_object(None, "")?;
        let token = self.lexer.next_token()?;
        if !token.is_eof() {
            return Err(TtError::syntax(
                format!("unexpected {} after the root object", token),
                token.line,
            )
            .with_column(token.column));
        }
        Ok(root)
    }

    /// Read `Label>` followed by the object's fields at `margin`.
    ///
    /// `context` is the declared type of the slot the object is read into;
    /// short labels resolve within its namespace.
    pub(crate) fn read_object(
        &mut self,
        context: Option<TypeKey>,
        margin: &str,
    ) -> TtResult<NodeId> {
        let tag = self.lexer.next_token()?;
        if tag.delimiter != Delimiter::TypeTag {
            return Err(TtError::syntax(format!("expected a type tag, found {}", tag), tag.line)
                .with_column(tag.column));
        }
        let trailing = self.lexer.read_line();
        if !trailing.trim().is_empty() {
            return Err(TtError::syntax(
                format!("unexpected '{}' after type tag", trailing.trim()),
                tag.line,
            ));
        }

        let schema = Arc::clone(&self.schema);
        let key = schema
            .resolve_label(tag.label.trim(), context)
            .map_err(|e| e.at_line(tag.line))?;
        let object = schema.object(key);
        if object.is_abstract {
            return Err(TtError::unknown_type(
                format!("type '{}' is abstract", object.qualified_name),
                tag.line,
            ));
        }
        if let Some(context) = context {
            if !schema.is_subtype(key, context) {
                return Err(TtError::unknown_type(
                    format!(
                        "'{}' is not a '{}'",
                        object.qualified_name,
                        schema.object(context).qualified_name
                    ),
                    tag.line,
                ));
            }
        }

        self.depth += 1;
        if self.depth > self.limits.max_depth {
            return Err(TtError::security(
                format!("nesting deeper than {}", self.limits.max_depth),
                tag.line,
            ));
        }
        let node = self.graph.create_of(key)?;
        self.created.push(node);
        if self.created.len() > self.limits.max_nodes {
            return Err(TtError::security(
                format!("more than {} nodes", self.limits.max_nodes),
                tag.line,
            ));
        }

        loop {
            let token = self.lexer.next_token()?;
            if is_end(&token, margin) {
                self.lexer.unread(token);
                break;
            }
            if token.margin.len() != margin.len() {
                return Err(TtError::margin(
                    format!("{} is indented deeper than its siblings", token),
                    token.line,
                ));
            }
            if token.delimiter != Delimiter::Value {
                return Err(TtError::syntax(
                    format!("expected a field of '{}', found {}", object.name, token),
                    token.line,
                )
                .with_column(token.column));
            }
            self.read_field(node, key, &token, margin)
                .map_err(|e| e.with_context(format!("reading field '{}'", token.label)))?;
        }
        self.depth -= 1;
        Ok(node)
    }

    fn read_field(
        &mut self,
        node: NodeId,
        key: TypeKey,
        token: &Token,
        margin: &str,
    ) -> TtResult<()> {
        let schema = Arc::clone(&self.schema);
        let object = schema.object(key);
        let Some(prop) = object
            .property(&token.label)
            .filter(|p| p.is_persistent())
        else {
            trace!(
                field = token.label.as_str(),
                type_name = object.qualified_name.as_str(),
                line = token.line,
                "skipping unknown field"
            );
            self.lexer.skip_block(margin);
            return Ok(());
        };

        self.drop_children(node, prop.slot)?;
        let nested = self.nested(margin);
        let value = match &prop.kind {
            ValueKind::Object(declared) => {
                let rest = self.lexer.peek_line().unwrap_or("").trim();
                if rest.is_empty() || rest == super::NULL {
                    self.lexer.read_line();
                    Value::Null
                } else {
                    let child = self.read_object(Some(*declared), &nested)?;
                    self.graph.adopt(node, prop.slot, child)?;
                    Value::Node(child)
                }
            }
            ValueKind::List(element) => self.read_list(node, prop.slot, element, margin)?,
            ValueKind::Link(link) => {
                let line = self.lexer.read_line();
                Value::Link(self.read_link(line, link, &prop.name))
            }
            ValueKind::LinkList(link) => self.read_link_list(link, &prop.name, margin)?,
            scalar => self.read_scalar(scalar, &nested)?,
        };
        self.graph.node_mut(node)?.values[prop.slot] = value;
        Ok(())
    }

    /// A repeated containment field replaces the children read earlier.
    fn drop_children(&mut self, node: NodeId, slot: usize) -> TtResult<()> {
        let previous: Vec<NodeId> = match &self.graph.node(node)?.values[slot] {
            Value::Node(child) => vec![*child],
            Value::List(items) => items.iter().filter_map(Value::as_node).collect(),
            _ => return Ok(()),
        };
        for child in previous {
            self.graph.detach(child)?;
            self.graph.discard_tree(child)?;
        }
        Ok(())
    }
}

impl Writer<'_> {
    /// Write `Label>` and the object's non-default fields at `margin`.
    pub(crate) fn write_object(
        &mut self,
        node: NodeId,
        context: Option<TypeKey>,
        margin: &str,
    ) -> TtResult<()> {
        let graph = self.graph;
        let schema = graph.schema();
        let data = graph.node(node)?;
        let object = schema.object(data.type_key());
        self.out.push_str(&schema.label_for(object.key, context));
        self.out.push_str(">\n");

        let nested = self.nested(margin);
        for prop in object.properties() {
            if !prop.is_persistent() {
                continue;
            }
            let value = &data.values()[prop.slot];
            match &prop.kind {
                ValueKind::Object(declared) => {
                    if let Value::Node(child) = value {
                        self.field_header(margin, &prop.name);
                        self.write_object(*child, Some(*declared), &nested)?;
                    }
                }
                ValueKind::List(element) => {
                    if let Value::List(items) = value {
                        self.write_list(&prop.name, element, items, margin)?;
                    }
                }
                ValueKind::Link(_) => {
                    if let Some(path) = graph.link_path(node, &prop.name)? {
                        self.field_header(margin, &prop.name);
                        self.out.push_str(&path);
                        self.out.push('\n');
                    }
                }
                ValueKind::LinkList(_) => {
                    let paths = graph.link_list_paths(node, &prop.name)?;
                    self.write_paths(&prop.name, &paths, margin);
                }
                _ => {
                    if value == &prop.default {
                        continue;
                    }
                    self.field_header(margin, &prop.name);
                    self.write_scalar(value, &nested);
                    self.out.push('\n');
                }
            }
        }
        Ok(())
    }
}
