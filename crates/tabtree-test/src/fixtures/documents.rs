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

//! Canonical metamodel documents.

use super::builders::ModelBuilder;
use tabtree_core::{Graph, NodeId, TtResult};

/// Canonical text of [`shop_model`].
pub const SHOP_TEXT: &str = "\
Model>
name:\tshop
description:\tSample shop
entities:\t
-\tEntity>
\tname:\tParty
\tabstract_entity:\ttrue
\tattributes:\t
\t-\tAttribute>
\t\tname:\tname
\t\trequired:\ttrue
\tsubclasses:\t
\t-\t../entities/Customer
-\tEntity>
\tname:\tCustomer
\tattributes:\t
\t-\tAttribute>
\t\tname:\temail
\t\tlength:\t120
\tincoming:\t
\t-\t../entities/Order/roles/buyer
\tsuperclass:\t../entities/Party
-\tEntity>
\tname:\tOrder
\tattributes:\t
\t-\tAttribute>
\t\tname:\tnumber
\t\tdatatype:\tInteger
\t\trequired:\ttrue
\t-\tAttribute>
\t\tname:\ttotal
\t\tdatatype:\tFloat
\t-\tmeta.ext.DerivedAttribute>
\t\tname:\ttax
\t\tdatatype:\tFloat
\t\tformula:\ttotal * 0.2
\troles:\t
\t-\tRole>
\t\tname:\tbuyer
\t\ttarget:\t../../entities/Customer
enums:\t
-\tEnumeration>
\tname:\tStatus
\tliterals:\t
\t-\tOpen
\t-\tClosed
";

/// A shop model: an abstract `Party`, a `Customer` extending it and an
/// `Order` whose `buyer` role targets `Customer`.
pub fn shop_model(graph: &mut Graph) -> TtResult<NodeId> {
    let mut model = ModelBuilder::new(graph, "shop")?;
    model.description("Sample shop")?;
    let party = model.abstract_entity("Party")?;
    let name = model.attribute(party, "name", "String")?;
    model.graph().set(name, "required", true)?;

    let customer = model.entity("Customer")?;
    let email = model.attribute(customer, "email", "String")?;
    model.graph().set(email, "length", 120i64)?;
    model.extends(customer, party)?;

    let order = model.entity("Order")?;
    let number = model.attribute(order, "number", "Integer")?;
    model.graph().set(number, "required", true)?;
    model.attribute(order, "total", "Float")?;
    model.derived_attribute(order, "tax", "Float", "total * 0.2")?;
    model.role(order, "buyer", customer)?;

    model.enumeration("Status", &["Open", "Closed"])?;
    Ok(model.build())
}

/// An entity with a multi-line description and strings that need
/// escaping.
pub fn notes_model(graph: &mut Graph) -> TtResult<NodeId> {
    let mut model = ModelBuilder::new(graph, "notes")?;
    model.description("first line\nsecond \\ line\n\nafter a blank")?;
    let note = model.entity("Note")?;
    let body = model.attribute(note, "body", "String")?;
    model.graph().set(body, "default_value", "null")?;
    let empty = model.attribute(note, "title", "String")?;
    model.graph().set(empty, "default_value", "")?;
    model.enumeration("Empty", &[])?;
    Ok(model.build())
}

/// A model of `size` entities, each extending the previous one and
/// carrying one role pointing at the first entity.
pub fn chain_model(graph: &mut Graph, size: usize) -> TtResult<NodeId> {
    let mut model = ModelBuilder::new(graph, "chain")?;
    let mut entities: Vec<NodeId> = Vec::with_capacity(size);
    for i in 0..size {
        let entity = model.entity(&format!("E{}", i))?;
        model.attribute(entity, "value", "Integer")?;
        if let Some(&previous) = entities.last() {
            model.extends(entity, previous)?;
        }
        if let Some(&first) = entities.first() {
            model.role(entity, "origin", first)?;
        }
        entities.push(entity);
    }
    Ok(model.build())
}

/// The shop model's second half living in its own document: an `Invoice`
/// whose `payer` role targets `customer` in another model.
pub fn billing_model(graph: &mut Graph, customer: NodeId) -> TtResult<NodeId> {
    let mut model = ModelBuilder::new(graph, "billing")?;
    let invoice = model.entity("Invoice")?;
    model.attribute(invoice, "amount", "Float")?;
    model.role(invoice, "payer", customer)?;
    Ok(model.build())
}
