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

//! Arena of typed nodes forming containment trees.
//!
//! Every node lives in a slot of a [`Graph`] and is addressed by a
//! generation-checked [`NodeId`]. Containment edges (`container`, owned
//! children) and reference edges (links) are handle fields, so cycles,
//! detachment and cross-document references need no shared ownership.
//! Freeing a slot bumps its generation: old handles then fail with
//! `StaleHandle`, and link caches holding them fall back to their stored
//! path.
//!
//! A node without a container is a root. A root that carries
//! [`DocumentInfo`] is a document, the unit of storage.

mod links;
mod path;
mod resolver;

pub(crate) use links::{check_pattern, is_cross_file};
pub use resolver::{Detached, DocumentResolver};

use crate::error::{TtError, TtResult};
use crate::schema::{ObjectSchema, Schema, TypeKey, ValueKind};
use crate::value::Value;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Generation-checked handle of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node {}v{}", self.index, self.generation)
    }
}

/// Storage state of a document root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentInfo {
    /// Absolute location of the stored file, once assigned.
    pub file: Option<PathBuf>,
    /// True when the tree changed since it was last read or written.
    pub dirty: bool,
}

/// State of one live node.
#[derive(Debug, Clone)]
pub struct NodeData {
    pub(crate) ty: TypeKey,
    pub(crate) values: Vec<Value>,
    pub(crate) container: Option<NodeId>,
    pub(crate) containing_slot: Option<usize>,
    pub(crate) document: Option<DocumentInfo>,
}

impl NodeData {
    pub fn type_key(&self) -> TypeKey {
        self.ty
    }

    /// Property values, indexed by property slot.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn container(&self) -> Option<NodeId> {
        self.container
    }

    pub fn document(&self) -> Option<&DocumentInfo> {
        self.document.as_ref()
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    data: Option<NodeData>,
}

/// Arena holding every loaded or created node.
#[derive(Debug)]
pub struct Graph {
    schema: Arc<Schema>,
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl Graph {
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// True when `id` refers to a live node.
    pub fn contains(&self, id: NodeId) -> bool {
        self.slots
            .get(id.index as usize)
            .map_or(false, |slot| slot.generation == id.generation && slot.data.is_some())
    }

    pub fn node(&self, id: NodeId) -> TtResult<&NodeData> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.data.as_ref())
            .ok_or_else(|| TtError::stale(format!("{} is not live", id)))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> TtResult<&mut NodeData> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.data.as_mut())
            .ok_or_else(|| TtError::stale(format!("{} is not live", id)))
    }

    pub fn type_key(&self, id: NodeId) -> TtResult<TypeKey> {
        Ok(self.node(id)?.ty)
    }

    /// Compiled schema of the node's concrete type.
    pub fn type_of(&self, id: NodeId) -> TtResult<&ObjectSchema> {
        let key = self.type_key(id)?;
        Ok(self.schema.object(key))
    }

    // ==================== Creation ====================

    /// Create a detached node of the named concrete type, with every
    /// property at its default.
    pub fn create(&mut self, type_name: &str) -> TtResult<NodeId> {
        let key = self.schema.require_type(type_name)?;
        self.create_of(key)
    }

    pub fn create_of(&mut self, key: TypeKey) -> TtResult<NodeId> {
        let object = self.schema.object(key);
        if object.is_abstract {
            return Err(TtError::schema(format!(
                "cannot instantiate abstract type '{}'",
                object.qualified_name
            )));
        }
        let values = object.properties().iter().map(|p| p.default.clone()).collect();
        Ok(self.alloc(NodeData {
            ty: key,
            values,
            container: None,
            containing_slot: None,
            document: None,
        }))
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.data = Some(data);
            NodeId {
                index,
                generation: slot.generation,
            }
        } else {
            self.slots.push(Slot {
                generation: 0,
                data: Some(data),
            });
            NodeId {
                index: (self.slots.len() - 1) as u32,
                generation: 0,
            }
        }
    }

    pub(crate) fn free_node(&mut self, id: NodeId) {
        if let Some(slot) = self.slots.get_mut(id.index as usize) {
            if slot.generation == id.generation && slot.data.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(id.index);
                self.live -= 1;
            }
        }
    }

    /// Drop every node.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            if slot.data.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
        }
        self.free = (0..self.slots.len() as u32).rev().collect();
        self.live = 0;
    }

    /// Free a whole tree without touching links that point into it or out
    /// of it. Used for eviction and for discarding a failed read.
    pub fn discard_tree(&mut self, root: NodeId) -> TtResult<()> {
        if let Some(container) = self.node(root)?.container {
            return Err(TtError::schema(format!(
                "{} is contained in {} and cannot be discarded",
                root, container
            )));
        }
        for id in self.descendants(root)? {
            self.free_node(id);
        }
        Ok(())
    }

    // ==================== Scalar properties ====================

    pub fn get(&self, id: NodeId, property: &str) -> TtResult<&Value> {
        let slot = self.type_of(id)?.require(property)?.slot;
        Ok(&self.node(id)?.values[slot])
    }

    /// Text of the node's id property, if its type has one and it is set.
    pub fn id_of(&self, id: NodeId) -> TtResult<Option<String>> {
        let node = self.node(id)?;
        Ok(self
            .schema
            .object(node.ty)
            .id_property()
            .and_then(|p| node.values[p.slot].to_text()))
    }

    /// Set a scalar or scalar-list property, returning the previous value.
    pub fn set(&mut self, id: NodeId, property: &str, value: impl Into<Value>) -> TtResult<Value> {
        let schema = Arc::clone(&self.schema);
        let desc = schema.object(self.type_key(id)?).require(property)?;
        let value = coerce(&schema, &desc.kind, value.into()).ok_or_else(|| {
            TtError::schema(format!(
                "value does not fit property '{}' of type '{}'",
                property,
                schema.object(desc.declared_in).qualified_name
            ))
        })?;
        let old = std::mem::replace(&mut self.node_mut(id)?.values[desc.slot], value);
        self.touch(id)?;
        Ok(old)
    }

    // ==================== Containment ====================

    pub fn container(&self, id: NodeId) -> TtResult<Option<NodeId>> {
        Ok(self.node(id)?.container)
    }

    /// Name of the property under which the node lives in its container.
    pub fn containing_attribute(&self, id: NodeId) -> TtResult<Option<&str>> {
        let node = self.node(id)?;
        match (node.container, node.containing_slot) {
            (Some(container), Some(slot)) => {
                Ok(Some(self.type_of(container)?.properties()[slot].name()))
            }
            _ => Ok(None),
        }
    }

    /// Replace the single child held by an object property. The previous
    /// child is detached (not deleted) and returned.
    pub fn set_child(
        &mut self,
        parent: NodeId,
        property: &str,
        child: Option<NodeId>,
    ) -> TtResult<Option<NodeId>> {
        let schema = Arc::clone(&self.schema);
        let desc = schema.object(self.type_key(parent)?).require(property)?;
        let ValueKind::Object(declared) = desc.kind else {
            return Err(TtError::schema(format!(
                "property '{}' does not hold a single object",
                property
            )));
        };
        if let Some(child) = child {
            self.check_attachable(parent, child, declared)?;
        }
        let old = self.node(parent)?.values[desc.slot].as_node();
        if let Some(old) = old {
            self.detach(old)?;
        }
        if let Some(child) = child {
            self.node_mut(parent)?.values[desc.slot] = Value::Node(child);
            self.adopt(parent, desc.slot, child)?;
        }
        self.touch(parent)?;
        Ok(old)
    }

    /// Append a child to a list-of-objects property.
    pub fn add_child(&mut self, parent: NodeId, property: &str, child: NodeId) -> TtResult<()> {
        let schema = Arc::clone(&self.schema);
        let desc = schema.object(self.type_key(parent)?).require(property)?;
        let declared = match &desc.kind {
            ValueKind::List(element) => match element.as_ref() {
                ValueKind::Object(key) => *key,
                _ => return Err(not_a_child_list(property)),
            },
            _ => return Err(not_a_child_list(property)),
        };
        self.check_attachable(parent, child, declared)?;
        match &mut self.node_mut(parent)?.values[desc.slot] {
            Value::List(items) => items.push(Value::Node(child)),
            other => *other = Value::List(vec![Value::Node(child)]),
        }
        self.adopt(parent, desc.slot, child)?;
        self.touch(parent)
    }

    /// Child nodes held by an object or list-of-objects property.
    pub fn children(&self, parent: NodeId, property: &str) -> TtResult<Vec<NodeId>> {
        let slot = self.type_of(parent)?.require(property)?.slot;
        Ok(nodes_in(&self.node(parent)?.values[slot]))
    }

    /// Every owned child of a node, in property order.
    pub fn child_nodes(&self, id: NodeId) -> TtResult<Vec<NodeId>> {
        let node = self.node(id)?;
        let object = self.schema.object(node.ty);
        let mut out = Vec::new();
        for prop in object.properties() {
            if prop.is_containment() {
                out.extend(nodes_in(&node.values[prop.slot]));
            }
        }
        Ok(out)
    }

    /// Remove a node from its container's property and clear its
    /// container back-reference. Roots are left unchanged.
    pub fn detach(&mut self, child: NodeId) -> TtResult<()> {
        let (container, slot) = {
            let node = self.node(child)?;
            match (node.container, node.containing_slot) {
                (Some(container), Some(slot)) => (container, slot),
                _ => return Ok(()),
            }
        };
        match &mut self.node_mut(container)?.values[slot] {
            Value::List(items) => items.retain(|v| v.as_node() != Some(child)),
            value @ Value::Node(_) => *value = Value::Null,
            _ => {}
        }
        let node = self.node_mut(child)?;
        node.container = None;
        node.containing_slot = None;
        self.touch(container)
    }

    fn check_attachable(&self, parent: NodeId, child: NodeId, declared: TypeKey) -> TtResult<()> {
        let child_type = self.type_key(child)?;
        if !self.schema.is_subtype(child_type, declared) {
            return Err(TtError::schema(format!(
                "'{}' is not a '{}'",
                self.schema.object(child_type).qualified_name,
                self.schema.object(declared).qualified_name
            )));
        }
        if let Some(container) = self.node(child)?.container {
            return Err(TtError::schema(format!(
                "{} is already contained in {}",
                child, container
            )));
        }
        if self.is_ancestor(child, parent)? {
            return Err(TtError::schema(format!(
                "{} cannot contain its own ancestor {}",
                parent, child
            )));
        }
        Ok(())
    }

    /// Set the container back-reference. Only containers call this.
    pub(crate) fn adopt(&mut self, parent: NodeId, slot: usize, child: NodeId) -> TtResult<()> {
        let node = self.node_mut(child)?;
        node.container = Some(parent);
        node.containing_slot = Some(slot);
        node.document = None;
        Ok(())
    }

    pub fn root_of(&self, id: NodeId) -> TtResult<NodeId> {
        let mut current = id;
        while let Some(container) = self.node(current)?.container {
            current = container;
        }
        Ok(current)
    }

    /// True when `ancestor` is `node` or one of its containers.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> TtResult<bool> {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return Ok(true);
            }
            current = self.node(id)?.container;
        }
        Ok(false)
    }

    /// The node and everything it contains, in pre-order.
    pub fn descendants(&self, root: NodeId) -> TtResult<Vec<NodeId>> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            out.push(id);
            let children = self.child_nodes(id)?;
            stack.extend(children.into_iter().rev());
        }
        Ok(out)
    }

    pub(crate) fn tree_set(&self, root: NodeId) -> TtResult<HashSet<NodeId>> {
        Ok(self.descendants(root)?.into_iter().collect())
    }

    /// Every live node, in slot order.
    pub fn live_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.data.as_ref().map(|_| NodeId {
                index: i as u32,
                generation: slot.generation,
            })
        })
    }

    // ==================== Documents ====================

    /// Assign (or clear) the storage location of a root.
    ///
    /// A root that becomes a document here, or moves to another file, is
    /// dirty until it is read from or written to that file.
    pub fn set_document_file(&mut self, root: NodeId, file: Option<PathBuf>) -> TtResult<()> {
        let node = self.node_mut(root)?;
        if node.container.is_some() {
            return Err(TtError::schema(format!(
                "{} is contained in another node and cannot be a document",
                root
            )));
        }
        match node.document.as_mut() {
            Some(doc) => {
                if doc.file != file {
                    doc.dirty = true;
                }
                doc.file = file;
            }
            None => node.document = Some(DocumentInfo { file, dirty: true }),
        }
        Ok(())
    }

    /// Storage location of the document containing `id`.
    pub fn document_file(&self, id: NodeId) -> TtResult<Option<PathBuf>> {
        let root = self.root_of(id)?;
        Ok(self
            .node(root)?
            .document
            .as_ref()
            .and_then(|doc| doc.file.clone()))
    }

    /// Root of the loaded document stored at `file`.
    pub fn find_document(&self, file: &Path) -> Option<NodeId> {
        self.live_nodes().find(|&id| {
            self.node(id)
                .ok()
                .and_then(|n| n.document.as_ref())
                .and_then(|d| d.file.as_deref())
                == Some(file)
        })
    }

    /// Roots that have a storage location.
    pub fn documents(&self) -> Vec<NodeId> {
        self.live_nodes()
            .filter(|&id| {
                self.node(id)
                    .ok()
                    .and_then(|n| n.document.as_ref())
                    .map_or(false, |d| d.file.is_some())
            })
            .collect()
    }

    pub fn is_dirty(&self, id: NodeId) -> TtResult<bool> {
        let root = self.root_of(id)?;
        Ok(self.node(root)?.document.as_ref().map_or(true, |d| d.dirty))
    }

    pub fn mark_clean(&mut self, root: NodeId) -> TtResult<()> {
        let root = self.root_of(root)?;
        self.node_mut(root)?
            .document
            .get_or_insert_with(DocumentInfo::default)
            .dirty = false;
        Ok(())
    }

    /// Mark the document containing `id` as changed.
    pub fn touch(&mut self, id: NodeId) -> TtResult<()> {
        let root = self.root_of(id)?;
        if let Some(doc) = self.node_mut(root)?.document.as_mut() {
            doc.dirty = true;
        }
        Ok(())
    }
}

fn nodes_in(value: &Value) -> Vec<NodeId> {
    match value {
        Value::Node(id) => vec![*id],
        Value::List(items) => items.iter().filter_map(Value::as_node).collect(),
        _ => Vec::new(),
    }
}

fn not_a_child_list(property: &str) -> TtError {
    TtError::schema(format!("property '{}' does not hold a list of objects", property))
}

/// Check and normalize a value assigned to a scalar or scalar-list property.
pub(crate) fn coerce(schema: &Schema, kind: &ValueKind, value: Value) -> Option<Value> {
    Some(match (kind, value) {
        (ValueKind::List(element), Value::List(items)) if element.is_scalar() => Value::List(
            items
                .into_iter()
                .map(|item| coerce(schema, element, item))
                .collect::<Option<Vec<_>>>()?,
        ),
        (kind, Value::Null) if kind.is_scalar() => Value::Null,
        (ValueKind::Bool, v @ Value::Bool(_)) => v,
        (ValueKind::Int, v @ Value::Int(_)) => v,
        (ValueKind::Float, v @ Value::Float(_)) => v,
        (ValueKind::Float, Value::Int(n)) => Value::Float(n as f64),
        (ValueKind::Char, v @ Value::Char(_)) => v,
        (ValueKind::String, v @ Value::String(_)) => v,
        (ValueKind::Enum(key), Value::Enum(s) | Value::String(s)) => {
            if schema.enumeration(*key).contains(&s) {
                Value::Enum(s)
            } else {
                return None;
            }
        }
        _ => return None,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::schema::{EnumDef, LinkDef, PropertyDef, SchemaBuilder, TypeDef};

    /// Small library schema shared by the graph, codec and parser tests.
    pub(crate) fn library_schema() -> Arc<Schema> {
        SchemaBuilder::new()
            .enum_def(EnumDef::new("lib", "Genre", ["Poetry", "Prose"]))
            .type_def(
                TypeDef::new("lib", "Library")
                    .id("name")
                    .property(PropertyDef::string("name"))
                    .property(PropertyDef::children("shelves", "Shelf"))
                    .property(PropertyDef::object("keeper", "Person"))
                    .property(PropertyDef::int("founded").default_value(1900i64)),
            )
            .type_def(
                TypeDef::new("lib", "Shelf")
                    .id("label")
                    .property(PropertyDef::string("label"))
                    .property(PropertyDef::children("books", "Book")),
            )
            .type_def(
                TypeDef::new("lib", "Book")
                    .id("title")
                    .property(PropertyDef::string("title"))
                    .property(PropertyDef::enumeration("genre", "Genre"))
                    .property(PropertyDef::list("tags", crate::schema::PropertyKind::String))
                    .property(PropertyDef::link(
                        "sequel",
                        LinkDef::new("Book")
                            .pattern(r"\.\./books/.*|.*#/shelves/.*")
                            .opposite("prequel"),
                    ))
                    .property(PropertyDef::link(
                        "prequel",
                        LinkDef::new("Book").opposite("sequel"),
                    ))
                    .property(PropertyDef::link_list(
                        "cites",
                        LinkDef::new("Book").opposite("cited_by"),
                    ))
                    .property(PropertyDef::link_list(
                        "cited_by",
                        LinkDef::new("Book").opposite("cites"),
                    )),
            )
            .type_def(
                TypeDef::new("lib", "Person")
                    .property(PropertyDef::string("name"))
                    .property(PropertyDef::char("initial")),
            )
            .build()
            .unwrap()
    }

    /// library "city" with shelf "a" holding books "one" and "two", and
    /// shelf "b" holding book "three".
    pub(crate) fn sample(graph: &mut Graph) -> (NodeId, [NodeId; 3]) {
        let lib = graph.create("Library").unwrap();
        graph.set(lib, "name", "city").unwrap();
        let a = graph.create("Shelf").unwrap();
        graph.set(a, "label", "a").unwrap();
        let b = graph.create("Shelf").unwrap();
        graph.set(b, "label", "b").unwrap();
        graph.add_child(lib, "shelves", a).unwrap();
        graph.add_child(lib, "shelves", b).unwrap();
        let mut books = Vec::new();
        for (shelf, title) in [(a, "one"), (a, "two"), (b, "three")] {
            let book = graph.create("Book").unwrap();
            graph.set(book, "title", title).unwrap();
            graph.add_child(shelf, "books", book).unwrap();
            books.push(book);
        }
        (lib, [books[0], books[1], books[2]])
    }

    // ==================== Arena tests ====================

    #[test]
    fn test_create_uses_defaults() {
        let mut graph = Graph::new(library_schema());
        let lib = graph.create("Library").unwrap();
        assert_eq!(graph.get(lib, "founded").unwrap(), &Value::Int(1900));
        assert_eq!(graph.get(lib, "shelves").unwrap(), &Value::List(vec![]));
        assert_eq!(graph.get(lib, "name").unwrap(), &Value::Null);
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_freed_handles_are_stale() {
        let mut graph = Graph::new(library_schema());
        let lib = graph.create("Library").unwrap();
        graph.discard_tree(lib).unwrap();
        assert!(!graph.contains(lib));
        let err = graph.get(lib, "name").unwrap_err();
        assert_eq!(err.kind, crate::error::TtErrorKind::StaleHandle);
        let reused = graph.create("Library").unwrap();
        assert_ne!(reused, lib);
        assert!(graph.contains(reused));
    }

    #[test]
    fn test_set_checks_kind() {
        let mut graph = Graph::new(library_schema());
        let book = graph.create("Book").unwrap();
        assert!(graph.set(book, "title", 3i64).is_err());
        assert!(graph.set(book, "genre", "Drama").is_err());
        graph.set(book, "genre", "Poetry").unwrap();
        assert_eq!(graph.get(book, "genre").unwrap(), &Value::Enum("Poetry".into()));
        graph
            .set(book, "tags", Value::List(vec!["old".into(), "rare".into()]))
            .unwrap();
        assert!(graph.set(book, "sequel", "x").is_err());
    }

    // ==================== Containment tests ====================

    #[test]
    fn test_children_and_containing_attribute() {
        let mut graph = Graph::new(library_schema());
        let (lib, [one, two, three]) = sample(&mut graph);
        let shelves = graph.children(lib, "shelves").unwrap();
        assert_eq!(shelves.len(), 2);
        assert_eq!(graph.children(shelves[0], "books").unwrap(), vec![one, two]);
        assert_eq!(graph.containing_attribute(three).unwrap(), Some("books"));
        assert_eq!(graph.root_of(three).unwrap(), lib);
        assert_eq!(graph.descendants(lib).unwrap().len(), 6);
        assert_eq!(graph.id_of(two).unwrap().as_deref(), Some("two"));
    }

    #[test]
    fn test_attach_rejects_second_container_and_cycles() {
        let mut graph = Graph::new(library_schema());
        let (lib, [one, ..]) = sample(&mut graph);
        let shelves = graph.children(lib, "shelves").unwrap();
        assert!(graph.add_child(shelves[1], "books", one).is_err());
        let other = graph.create("Library").unwrap();
        assert!(graph.add_child(other, "shelves", lib).is_err());
        let shelf = graph.create("Shelf").unwrap();
        assert!(graph.add_child(lib, "shelves", shelf).is_ok());
        assert!(graph.set_child(lib, "keeper", Some(shelf)).is_err());
    }

    #[test]
    fn test_detach_and_set_child() {
        let mut graph = Graph::new(library_schema());
        let (lib, [one, ..]) = sample(&mut graph);
        graph.detach(one).unwrap();
        assert_eq!(graph.container(one).unwrap(), None);
        assert_eq!(graph.root_of(one).unwrap(), one);

        let keeper = graph.create("Person").unwrap();
        assert_eq!(graph.set_child(lib, "keeper", Some(keeper)).unwrap(), None);
        assert_eq!(graph.children(lib, "keeper").unwrap(), vec![keeper]);
        assert_eq!(graph.set_child(lib, "keeper", None).unwrap(), Some(keeper));
        assert_eq!(graph.container(keeper).unwrap(), None);
    }

    // ==================== Document tests ====================

    #[test]
    fn test_document_dirty_tracking() {
        let mut graph = Graph::new(library_schema());
        let (lib, [one, ..]) = sample(&mut graph);
        graph
            .set_document_file(lib, Some(PathBuf::from("/lib/city.tt")))
            .unwrap();
        graph.mark_clean(lib).unwrap();
        assert!(!graph.is_dirty(one).unwrap());
        graph.set(one, "title", "uno").unwrap();
        assert!(graph.is_dirty(lib).unwrap());
        assert_eq!(graph.find_document(Path::new("/lib/city.tt")), Some(lib));
        assert_eq!(graph.documents(), vec![lib]);
        assert!(graph.set_document_file(one, None).is_err());
    }

    #[test]
    fn test_new_document_starts_dirty() {
        let mut graph = Graph::new(library_schema());
        let (lib, _) = sample(&mut graph);
        graph
            .set_document_file(lib, Some(PathBuf::from("/lib/city.tt")))
            .unwrap();
        assert!(graph.is_dirty(lib).unwrap());

        graph.mark_clean(lib).unwrap();
        graph
            .set_document_file(lib, Some(PathBuf::from("/lib/city.tt")))
            .unwrap();
        assert!(!graph.is_dirty(lib).unwrap());

        graph
            .set_document_file(lib, Some(PathBuf::from("/lib/town.tt")))
            .unwrap();
        assert!(graph.is_dirty(lib).unwrap());
    }

    #[test]
    fn test_clear_invalidates_everything() {
        let mut graph = Graph::new(library_schema());
        let (lib, _) = sample(&mut graph);
        graph.clear();
        assert!(graph.is_empty());
        assert!(!graph.contains(lib));
    }
}
