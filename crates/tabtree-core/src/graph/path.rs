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

//! Path computation and navigation.
//!
//! Path syntax:
//!
//! - `field/id/...` walks down from the context node: a list-valued
//!   containment field is followed by the id of the wanted element, a
//!   single object field is not;
//! - `..` moves to the container;
//! - a leading `#` anchors at the document root;
//! - `relative/file.tt#/field/id` anchors at the root of another document,
//!   located relative to the directory of the context's document.
//!
//! Elements without an id value are addressed by their list index.

use super::{DocumentResolver, Graph, NodeId};
use crate::error::{TtError, TtResult};
use crate::location::{relative_file_path, resolve_relative};
use crate::schema::{LinkSchema, ValueKind};
use crate::value::Value;
use tracing::warn;

impl Graph {
    /// Segment naming a list element: its id, or its index when the type
    /// has no id value.
    ///
    /// Ids are not escaped. An id that is empty, `.`, `..`, or contains `/`
    /// or `#` yields a path that does not navigate back to the element; the
    /// validator reports such ids as `id-syntax`.
    fn element_segment(&self, child: NodeId, index: usize) -> TtResult<String> {
        Ok(self.id_of(child)?.unwrap_or_else(|| index.to_string()))
    }

    /// Segments naming `node` below its container.
    fn own_segments(&self, node: NodeId) -> TtResult<Vec<String>> {
        let data = self.node(node)?;
        let (Some(container), Some(slot)) = (data.container, data.containing_slot) else {
            return Ok(Vec::new());
        };
        let parent = self.node(container)?;
        let prop = &self.schema().object(parent.ty).properties()[slot];
        match &parent.values[slot] {
            Value::List(items) => {
                let index = items
                    .iter()
                    .position(|v| v.as_node() == Some(node))
                    .unwrap_or(0);
                Ok(vec![prop.name.clone(), self.element_segment(node, index)?])
            }
            _ => Ok(vec![prop.name.clone()]),
        }
    }

    /// Segments from `ancestor` down to `node`. Empty when they are equal.
    pub fn relative_segments(&self, ancestor: NodeId, node: NodeId) -> TtResult<Vec<String>> {
        let mut chunks = Vec::new();
        let mut current = node;
        while current != ancestor {
            chunks.push(self.own_segments(current)?);
            current = self.node(current)?.container.ok_or_else(|| {
                TtError::reference(format!("{} is not contained in {}", node, ancestor))
            })?;
        }
        Ok(chunks.into_iter().rev().flatten().collect())
    }

    /// Segments from the document root down to `node`.
    pub fn segments_of(&self, node: NodeId) -> TtResult<Vec<String>> {
        let root = self.root_of(node)?;
        self.relative_segments(root, node)
    }

    /// Absolute in-document path: `#` for a root, `#/field/id/...` below.
    pub fn path_of(&self, node: NodeId) -> TtResult<String> {
        let segments = self.segments_of(node)?;
        if segments.is_empty() {
            Ok("#".to_string())
        } else {
            Ok(format!("#/{}", segments.join("/")))
        }
    }

    /// Compute the path a link from `owner` to `target` is stored as.
    ///
    /// Inside one document the candidates are the relative forms through
    /// every common ancestor, nearest first, followed by the absolute form;
    /// the first one accepted by the link's pattern wins. Across documents
    /// the path is the target document's file relative to the owner's
    /// directory followed by the absolute form, and both documents need a
    /// file location.
    pub fn synthesize_path(
        &self,
        owner: NodeId,
        target: NodeId,
        link: &LinkSchema,
    ) -> TtResult<String> {
        let owner_root = self.root_of(owner)?;
        let target_root = self.root_of(target)?;

        if owner_root != target_root {
            let from = self.document_file(owner_root)?.ok_or_else(|| {
                TtError::unsaved(format!(
                    "{} has no file location, cannot reference another document from it",
                    owner_root
                ))
            })?;
            let to = self.document_file(target_root)?.ok_or_else(|| {
                TtError::unsaved(format!(
                    "{} has no file location, cannot be referenced from another document",
                    target_root
                ))
            })?;
            let dir = from.parent().map(|p| p.to_path_buf()).unwrap_or_default();
            let path = format!(
                "{}{}",
                relative_file_path(&dir, &to),
                self.path_of(target)?
            );
            if !link.accepts(&path) {
                warn!(path = path.as_str(), "link path does not match declared pattern");
            }
            return Ok(path);
        }

        let mut candidates = Vec::new();
        let mut up = 0usize;
        let mut current = Some(owner);
        while let Some(ancestor) = current {
            if self.is_ancestor(ancestor, target)? {
                let relative = self.relative_segments(ancestor, target)?;
                if up > 0 || !relative.is_empty() {
                    let mut parts = vec!["..".to_string(); up];
                    parts.extend(relative);
                    candidates.push(parts.join("/"));
                }
            }
            current = self.node(ancestor)?.container;
            up += 1;
        }
        candidates.push(self.path_of(target)?);

        if let Some(found) = candidates.iter().find(|c| link.accepts(c)) {
            return Ok(found.clone());
        }
        let nearest = candidates.swap_remove(0);
        warn!(
            path = nearest.as_str(),
            pattern = link.pattern_source.as_deref().unwrap_or(""),
            "no link path form matches declared pattern"
        );
        Ok(nearest)
    }

    /// Resolve `path` starting at `context`. Other documents are obtained
    /// through `resolver`.
    pub fn navigate(
        &mut self,
        context: NodeId,
        path: &str,
        resolver: &mut dyn DocumentResolver,
    ) -> TtResult<NodeId> {
        let (start, rest) = match path.find('#') {
            Some(i) => {
                let file = &path[..i];
                let start = if file.is_empty() {
                    self.root_of(context)?
                } else {
                    let base = self.document_file(context)?.ok_or_else(|| {
                        TtError::unsaved(format!(
                            "cannot resolve '{}' from a document without file location",
                            path
                        ))
                    })?;
                    let target = resolve_relative(&base, file);
                    resolver.resolve_document(self, &target)?
                };
                (start, &path[i + 1..])
            }
            None => (context, path),
        };
        self.walk(start, rest)
            .map_err(|e| e.with_context(format!("resolving path '{}'", path)))
    }

    /// Navigate an in-memory path that has no file prefix.
    pub fn get_from_path(&self, context: NodeId, path: &str) -> TtResult<NodeId> {
        let (start, rest) = match path.find('#') {
            Some(0) => (self.root_of(context)?, &path[1..]),
            Some(_) => {
                return Err(TtError::reference(format!(
                    "'{}' refers to another document",
                    path
                )))
            }
            None => (context, path),
        };
        self.walk(start, rest)
    }

    fn walk(&self, start: NodeId, rest: &str) -> TtResult<NodeId> {
        let mut current = start;
        let mut segments = rest.split('/').filter(|s| !s.is_empty());
        while let Some(segment) = segments.next() {
            match segment {
                "." => {}
                ".." => {
                    current = self.node(current)?.container.ok_or_else(|| {
                        TtError::reference("'..' above the document root".to_string())
                    })?;
                }
                field => {
                    let node = self.node(current)?;
                    let object = self.schema().object(node.ty);
                    let prop = object.property(field).ok_or_else(|| {
                        TtError::reference(format!(
                            "type '{}' has no property '{}'",
                            object.qualified_name, field
                        ))
                    })?;
                    current = match (&prop.kind, &node.values[prop.slot]) {
                        (ValueKind::Object(_), Value::Node(child)) => *child,
                        (ValueKind::Object(_), _) => {
                            return Err(TtError::reference(format!("'{}' is empty", field)))
                        }
                        (ValueKind::List(element), Value::List(items))
                            if matches!(element.as_ref(), ValueKind::Object(_)) =>
                        {
                            let id = segments.next().ok_or_else(|| {
                                TtError::reference(format!("missing element id after '{}'", field))
                            })?;
                            self.find_element(items, id)?.ok_or_else(|| {
                                TtError::reference(format!("no element '{}' in '{}'", id, field))
                            })?
                        }
                        _ => {
                            return Err(TtError::reference(format!(
                                "'{}' does not hold child nodes",
                                field
                            )))
                        }
                    };
                }
            }
        }
        Ok(current)
    }

    fn find_element(&self, items: &[Value], id: &str) -> TtResult<Option<NodeId>> {
        for (index, item) in items.iter().enumerate() {
            if let Some(child) = item.as_node() {
                if self.element_segment(child, index)? == id {
                    return Ok(Some(child));
                }
            }
        }
        Ok(None)
    }
}
