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

//! Declarative type definitions registered by client code.

use crate::value::Value;

/// Declared kind of a property.
///
/// Type and enum names may be short (resolved inside the declaring
/// namespace first) or fully qualified (`namespace.Name`).
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKind {
    Bool,
    Int,
    Float,
    Char,
    String,
    Enum(String),
    /// A single owned child node of the named type.
    Object(String),
    List(Box<PropertyKind>),
    Link(LinkDef),
    LinkList(LinkDef),
}

/// Declaration of a link or link-list property.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkDef {
    /// Target type name.
    pub target: String,
    /// Regex every path stored in this slot is expected to match.
    pub pattern: Option<String>,
    /// Name of the reciprocal link property on the target type.
    pub opposite: Option<String>,
}

impl LinkDef {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            pattern: None,
            opposite: None,
        }
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn opposite(mut self, opposite: impl Into<String>) -> Self {
        self.opposite = Some(opposite.into());
        self
    }
}

/// Declaration of a single property.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDef {
    pub name: String,
    pub kind: PropertyKind,
    /// Default value for scalar properties. Lists, links and objects
    /// always default to empty.
    pub default: Option<Value>,
    /// Ordering hint within the declaring type (ascending).
    pub order: i32,
    /// Transient properties are never written or read.
    pub transient: bool,
    /// Read-only properties are computed by the application and not
    /// persisted.
    pub read_only: bool,
}

impl PropertyDef {
    pub fn new(name: impl Into<String>, kind: PropertyKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
            order: 0,
            transient: false,
            read_only: false,
        }
    }

    pub fn bool(name: impl Into<String>) -> Self {
        Self::new(name, PropertyKind::Bool)
    }

    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, PropertyKind::Int)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, PropertyKind::Float)
    }

    pub fn char(name: impl Into<String>) -> Self {
        Self::new(name, PropertyKind::Char)
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, PropertyKind::String)
    }

    pub fn enumeration(name: impl Into<String>, enum_name: impl Into<String>) -> Self {
        Self::new(name, PropertyKind::Enum(enum_name.into()))
    }

    pub fn object(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::new(name, PropertyKind::Object(type_name.into()))
    }

    pub fn list(name: impl Into<String>, element: PropertyKind) -> Self {
        Self::new(name, PropertyKind::List(Box::new(element)))
    }

    /// List of owned child nodes of the named type.
    pub fn children(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::list(name, PropertyKind::Object(type_name.into()))
    }

    pub fn link(name: impl Into<String>, def: LinkDef) -> Self {
        Self::new(name, PropertyKind::Link(def))
    }

    pub fn link_list(name: impl Into<String>, def: LinkDef) -> Self {
        Self::new(name, PropertyKind::LinkList(def))
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn transient(mut self) -> Self {
        self.transient = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }
}

/// Declaration of a record type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDef {
    pub name: String,
    pub namespace: String,
    pub supertype: Option<String>,
    pub is_abstract: bool,
    /// Property whose text value identifies a node among its siblings.
    pub id_property: Option<String>,
    pub properties: Vec<PropertyDef>,
}

impl TypeDef {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            supertype: None,
            is_abstract: false,
            id_property: None,
            properties: Vec::new(),
        }
    }

    pub fn extends(mut self, supertype: impl Into<String>) -> Self {
        self.supertype = Some(supertype.into());
        self
    }

    pub fn abstract_type(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn id(mut self, property: impl Into<String>) -> Self {
        self.id_property = Some(property.into());
        self
    }

    pub fn property(mut self, property: PropertyDef) -> Self {
        self.properties.push(property);
        self
    }

    /// Fully qualified name.
    pub fn qualified_name(&self) -> String {
        qualify(&self.namespace, &self.name)
    }
}

/// Declaration of an enumeration.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDef {
    pub name: String,
    pub namespace: String,
    pub constants: Vec<String>,
}

impl EnumDef {
    pub fn new<I, S>(namespace: impl Into<String>, name: impl Into<String>, constants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            constants: constants.into_iter().map(Into::into).collect(),
        }
    }

    pub fn qualified_name(&self) -> String {
        qualify(&self.namespace, &self.name)
    }
}

pub(crate) fn qualify(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", namespace, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_def_builder() {
        let def = TypeDef::new("shop", "Product")
            .extends("Named")
            .id("sku")
            .property(PropertyDef::string("sku").order(-1))
            .property(PropertyDef::int("stock").default_value(0i64));
        assert_eq!(def.qualified_name(), "shop.Product");
        assert_eq!(def.supertype.as_deref(), Some("Named"));
        assert_eq!(def.properties.len(), 2);
        assert_eq!(def.properties[0].order, -1);
        assert_eq!(def.properties[1].default, Some(Value::Int(0)));
    }

    #[test]
    fn test_link_def_builder() {
        let def = LinkDef::new("Product")
            .pattern(r"\.\./products/.*")
            .opposite("orders");
        assert_eq!(def.target, "Product");
        assert_eq!(def.pattern.as_deref(), Some(r"\.\./products/.*"));
        assert_eq!(def.opposite.as_deref(), Some("orders"));
    }

    #[test]
    fn test_qualify_empty_namespace() {
        assert_eq!(qualify("", "Root"), "Root");
        assert_eq!(EnumDef::new("a.b", "Color", ["Red"]).qualified_name(), "a.b.Color");
    }
}
