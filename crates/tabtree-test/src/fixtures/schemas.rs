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

//! The `meta` schema: a small entity/attribute/role metamodel with
//! bidirectional links, an abstract base type and a subtype declared in a
//! second namespace.

use std::sync::Arc;
use tabtree_core::{
    EnumDef, LinkDef, PropertyDef, PropertyKind, Schema, SchemaBuilder, TtResult, TypeDef,
};

/// Namespace of the core metamodel types.
pub const META: &str = "meta";
/// Namespace of the extension types.
pub const META_EXT: &str = "meta.ext";

/// Type definitions of the metamodel, ready to be extended before building.
pub fn meta_schema_builder() -> SchemaBuilder {
    SchemaBuilder::new()
        .enum_def(EnumDef::new(
            META,
            "DataType",
            ["String", "Integer", "Boolean", "Float"],
        ))
        .enum_def(EnumDef::new(META, "Multiplicity", ["One", "Many"]))
        .type_def(
            TypeDef::new(META, "NamedElement")
                .abstract_type()
                .id("name")
                .property(PropertyDef::string("name")),
        )
        .type_def(
            TypeDef::new(META, "Model")
                .extends("NamedElement")
                .property(PropertyDef::string("description"))
                .property(PropertyDef::children("entities", "Entity"))
                .property(PropertyDef::children("enums", "Enumeration"))
                .property(PropertyDef::int("version").default_value(1i64)),
        )
        .type_def(
            TypeDef::new(META, "Entity")
                .extends("NamedElement")
                .property(PropertyDef::bool("abstract_entity").default_value(false))
                .property(PropertyDef::link(
                    "superclass",
                    LinkDef::new("Entity")
                        .pattern(r"\.\./entities/.*|.*#/entities/.*")
                        .opposite("subclasses"),
                ))
                .property(PropertyDef::link_list(
                    "subclasses",
                    LinkDef::new("Entity").opposite("superclass"),
                ))
                .property(PropertyDef::children("attributes", "Attribute"))
                .property(PropertyDef::children("roles", "Role"))
                .property(PropertyDef::link_list(
                    "incoming",
                    LinkDef::new("Role").opposite("target"),
                )),
        )
        .type_def(
            TypeDef::new(META, "Attribute")
                .extends("NamedElement")
                .property(PropertyDef::enumeration("datatype", "DataType").default_value("String"))
                .property(PropertyDef::bool("required").default_value(false))
                .property(PropertyDef::int("length"))
                .property(PropertyDef::string("default_value")),
        )
        .type_def(
            TypeDef::new(META, "Role")
                .extends("NamedElement")
                .property(PropertyDef::link(
                    "target",
                    LinkDef::new("Entity")
                        .pattern(r"\.\./\.\./entities/.*|.*#/entities/.*")
                        .opposite("incoming"),
                ))
                .property(
                    PropertyDef::enumeration("multiplicity", "Multiplicity").default_value("One"),
                ),
        )
        .type_def(
            TypeDef::new(META, "Enumeration")
                .extends("NamedElement")
                .property(PropertyDef::list("literals", PropertyKind::String)),
        )
        .type_def(
            TypeDef::new(META_EXT, "DerivedAttribute")
                .extends("meta.Attribute")
                .property(PropertyDef::string("formula"))
                .property(PropertyDef::bool("cached").transient()),
        )
}

/// The compiled metamodel.
pub fn meta_schema() -> TtResult<Arc<Schema>> {
    meta_schema_builder().build()
}
