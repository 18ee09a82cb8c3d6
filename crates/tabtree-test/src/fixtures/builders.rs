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

//! Builder for metamodel instances.
//!
//! ```text
//! use tabtree_test::fixtures::builders::ModelBuilder;
//!
//! let mut model = ModelBuilder::new(&mut graph, "shop")?;
//! let party = model.entity("Party")?;
//! let customer = model.entity("Customer")?;
//! model.extends(customer, party)?;
//! let root = model.build();
//! ```

use tabtree_core::{Detached, Graph, NodeId, TtResult, Value};

/// Fluent construction of a `meta.Model` tree inside a [`Graph`].
pub struct ModelBuilder<'g> {
    graph: &'g mut Graph,
    model: NodeId,
}

impl<'g> ModelBuilder<'g> {
    pub fn new(graph: &'g mut Graph, name: &str) -> TtResult<Self> {
        let model = graph.create("meta.Model")?;
        graph.set(model, "name", name)?;
        Ok(Self { graph, model })
    }

    pub fn description(&mut self, text: &str) -> TtResult<&mut Self> {
        self.graph.set(self.model, "description", text)?;
        Ok(self)
    }

    pub fn entity(&mut self, name: &str) -> TtResult<NodeId> {
        let entity = self.graph.create("meta.Entity")?;
        self.graph.set(entity, "name", name)?;
        self.graph.add_child(self.model, "entities", entity)?;
        Ok(entity)
    }

    pub fn abstract_entity(&mut self, name: &str) -> TtResult<NodeId> {
        let entity = self.entity(name)?;
        self.graph.set(entity, "abstract_entity", true)?;
        Ok(entity)
    }

    /// Add an attribute of the given `DataType` constant.
    pub fn attribute(&mut self, entity: NodeId, name: &str, datatype: &str) -> TtResult<NodeId> {
        self.attribute_of("meta.Attribute", entity, name, datatype)
    }

    pub fn derived_attribute(
        &mut self,
        entity: NodeId,
        name: &str,
        datatype: &str,
        formula: &str,
    ) -> TtResult<NodeId> {
        let attribute = self.attribute_of("meta.ext.DerivedAttribute", entity, name, datatype)?;
        self.graph.set(attribute, "formula", formula)?;
        Ok(attribute)
    }

    fn attribute_of(
        &mut self,
        type_name: &str,
        entity: NodeId,
        name: &str,
        datatype: &str,
    ) -> TtResult<NodeId> {
        let attribute = self.graph.create(type_name)?;
        self.graph.set(attribute, "name", name)?;
        self.graph.set(attribute, "datatype", datatype)?;
        self.graph.add_child(entity, "attributes", attribute)?;
        Ok(attribute)
    }

    /// Add a role on `entity` pointing at `target`.
    pub fn role(&mut self, entity: NodeId, name: &str, target: NodeId) -> TtResult<NodeId> {
        let role = self.graph.create("meta.Role")?;
        self.graph.set(role, "name", name)?;
        self.graph.add_child(entity, "roles", role)?;
        self.graph.link_set(role, "target", Some(target), &mut Detached)?;
        Ok(role)
    }

    pub fn extends(&mut self, entity: NodeId, superclass: NodeId) -> TtResult<()> {
        self.graph
            .link_set(entity, "superclass", Some(superclass), &mut Detached)?;
        Ok(())
    }

    pub fn enumeration(&mut self, name: &str, literals: &[&str]) -> TtResult<NodeId> {
        let enumeration = self.graph.create("meta.Enumeration")?;
        self.graph.set(enumeration, "name", name)?;
        self.graph.set(
            enumeration,
            "literals",
            Value::List(literals.iter().map(|l| Value::from(*l)).collect()),
        )?;
        self.graph.add_child(self.model, "enums", enumeration)?;
        Ok(enumeration)
    }

    /// Direct access to the graph for settings the builder does not cover.
    pub fn graph(&mut self) -> &mut Graph {
        self.graph
    }

    pub fn build(self) -> NodeId {
        self.model
    }
}
