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

//! Compiled, immutable schema consulted by the codecs and the graph.

use crate::error::{TtError, TtResult};
use crate::value::Value;
use regex::Regex;
use std::collections::HashMap;

/// Handle of a registered record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeKey(pub(crate) usize);

/// Handle of a registered enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnumKey(pub(crate) usize);

/// Resolved kind of a property.
#[derive(Debug, Clone)]
pub enum ValueKind {
    Bool,
    Int,
    Float,
    Char,
    String,
    Enum(EnumKey),
    Object(TypeKey),
    List(Box<ValueKind>),
    Link(LinkSchema),
    LinkList(LinkSchema),
}

impl ValueKind {
    /// True for scalar kinds (everything that is written inline on the
    /// field line).
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            ValueKind::Bool
                | ValueKind::Int
                | ValueKind::Float
                | ValueKind::Char
                | ValueKind::String
                | ValueKind::Enum(_)
        )
    }

    /// Link schema of a link or link-list kind.
    pub fn link_schema(&self) -> Option<&LinkSchema> {
        match self {
            ValueKind::Link(link) | ValueKind::LinkList(link) => Some(link),
            _ => None,
        }
    }

    /// Element type of an object or list-of-objects kind.
    pub fn child_type(&self) -> Option<TypeKey> {
        match self {
            ValueKind::Object(key) => Some(*key),
            ValueKind::List(element) => match element.as_ref() {
                ValueKind::Object(key) => Some(*key),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Compiled link declaration.
#[derive(Debug, Clone)]
pub struct LinkSchema {
    pub target: TypeKey,
    /// Anchored form of the declared pattern.
    pub pattern: Option<Regex>,
    /// Pattern as declared, for diagnostics.
    pub pattern_source: Option<String>,
    pub opposite: Option<String>,
}

impl LinkSchema {
    /// True when `path` is legal for this slot. Slots without a pattern
    /// accept any path.
    pub fn accepts(&self, path: &str) -> bool {
        self.pattern.as_ref().map_or(true, |re| re.is_match(path))
    }
}

/// A persistable property of a compiled type.
#[derive(Debug, Clone)]
pub struct PropertyDescriptor {
    pub name: String,
    pub kind: ValueKind,
    /// Value of the property on a freshly created node.
    pub default: Value,
    pub order: i32,
    pub transient: bool,
    pub read_only: bool,
    /// Type that declared the property.
    pub declared_in: TypeKey,
    /// Index of the property's value on a node.
    pub slot: usize,
}

impl PropertyDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &ValueKind {
        &self.kind
    }

    pub fn default(&self) -> &Value {
        &self.default
    }

    pub fn order(&self) -> i32 {
        self.order
    }

    pub fn declaring_type(&self) -> TypeKey {
        self.declared_in
    }

    /// True for lists and link lists.
    pub fn is_list(&self) -> bool {
        matches!(self.kind, ValueKind::List(_) | ValueKind::LinkList(_))
    }

    /// True for links and link lists.
    pub fn is_link(&self) -> bool {
        matches!(self.kind, ValueKind::Link(_) | ValueKind::LinkList(_))
    }

    /// True when the property holds owned child nodes.
    pub fn is_containment(&self) -> bool {
        self.kind.child_type().is_some()
    }

    /// True when the property takes part in text input and output.
    pub fn is_persistent(&self) -> bool {
        !self.transient && !self.read_only
    }
}

/// Compiled record type.
#[derive(Debug, Clone)]
pub struct ObjectSchema {
    pub key: TypeKey,
    pub name: String,
    pub namespace: String,
    pub qualified_name: String,
    pub supertype: Option<TypeKey>,
    /// Supertypes, nearest first.
    pub ancestors: Vec<TypeKey>,
    pub is_abstract: bool,
    pub(crate) id_slot: Option<usize>,
    pub(crate) properties: Vec<PropertyDescriptor>,
    pub(crate) index: HashMap<String, usize>,
}

impl ObjectSchema {
    /// Properties in output order: supertype properties first, then by
    /// ordering hint, then by name.
    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.index.get(name).map(|&slot| &self.properties[slot])
    }

    pub fn slot_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn id_property(&self) -> Option<&PropertyDescriptor> {
        self.id_slot.map(|slot| &self.properties[slot])
    }

    /// Look up a property, failing with a schema error naming the type.
    pub fn require(&self, name: &str) -> TtResult<&PropertyDescriptor> {
        self.property(name).ok_or_else(|| {
            TtError::schema(format!(
                "type '{}' has no property '{}'",
                self.qualified_name, name
            ))
        })
    }
}

/// Compiled enumeration.
#[derive(Debug, Clone)]
pub struct EnumSchema {
    pub key: EnumKey,
    pub name: String,
    pub namespace: String,
    pub qualified_name: String,
    pub constants: Vec<String>,
}

impl EnumSchema {
    pub fn contains(&self, constant: &str) -> bool {
        self.constants.iter().any(|c| c == constant)
    }
}

/// The registry of all record types and enumerations.
///
/// Built once by [`super::SchemaBuilder`] and shared behind an `Arc`.
#[derive(Debug)]
pub struct Schema {
    pub(crate) types: Vec<ObjectSchema>,
    pub(crate) enums: Vec<EnumSchema>,
    pub(crate) type_index: HashMap<String, TypeKey>,
    pub(crate) short_types: HashMap<String, Vec<TypeKey>>,
    pub(crate) enum_index: HashMap<String, EnumKey>,
}

impl Schema {
    pub fn object(&self, key: TypeKey) -> &ObjectSchema {
        &self.types[key.0]
    }

    pub fn enumeration(&self, key: EnumKey) -> &EnumSchema {
        &self.enums[key.0]
    }

    pub fn types(&self) -> impl Iterator<Item = &ObjectSchema> {
        self.types.iter()
    }

    pub fn enum_key(&self, qualified: &str) -> Option<EnumKey> {
        self.enum_index.get(qualified).copied()
    }

    /// Look up a type by qualified name, or by short name when it is
    /// unique across all namespaces.
    pub fn type_key(&self, name: &str) -> Option<TypeKey> {
        if let Some(key) = self.type_index.get(name) {
            return Some(*key);
        }
        match self.short_types.get(name) {
            Some(keys) if keys.len() == 1 => Some(keys[0]),
            _ => None,
        }
    }

    /// Like [`Schema::type_key`] but failing with `UnknownType`.
    pub fn require_type(&self, name: &str) -> TtResult<TypeKey> {
        self.type_key(name)
            .ok_or_else(|| TtError::unknown_type(format!("unknown type '{}'", name), 0))
    }

    /// Resolve a type tag read from text.
    ///
    /// A label containing `.` is fully qualified. A short label is looked
    /// up in the namespace of the context type first and then accepted if
    /// it is unique across all namespaces.
    pub fn resolve_label(&self, label: &str, context: Option<TypeKey>) -> TtResult<TypeKey> {
        if label.contains('.') {
            return self
                .type_index
                .get(label)
                .copied()
                .ok_or_else(|| TtError::unknown_type(format!("unknown type '{}'", label), 0));
        }
        if let Some(ctx) = context {
            let scoped = super::def::qualify(&self.object(ctx).namespace, label);
            if let Some(key) = self.type_index.get(&scoped) {
                return Ok(*key);
            }
        }
        match self.short_types.get(label) {
            Some(keys) if keys.len() == 1 => Ok(keys[0]),
            Some(_) => Err(TtError::unknown_type(
                format!("ambiguous type label '{}'", label),
                0,
            )),
            None => Err(TtError::unknown_type(
                format!("unknown type '{}'", label),
                0,
            )),
        }
    }

    /// The tag written for `concrete` when the declared type is `context`:
    /// the short name when both share a namespace, the qualified name
    /// otherwise. Without a context the short name is used only when it is
    /// unique.
    pub fn label_for(&self, concrete: TypeKey, context: Option<TypeKey>) -> String {
        let object = self.object(concrete);
        let short_ok = match context {
            Some(ctx) => self.object(ctx).namespace == object.namespace,
            None => self
                .short_types
                .get(&object.name)
                .map_or(false, |keys| keys.len() == 1),
        };
        if short_ok {
            object.name.clone()
        } else {
            object.qualified_name.clone()
        }
    }

    /// True when `sub` is `sup` or derives from it.
    pub fn is_subtype(&self, sub: TypeKey, sup: TypeKey) -> bool {
        sub == sup || self.object(sub).ancestors.contains(&sup)
    }

    /// The type followed by its supertypes, nearest first.
    pub fn lineage(&self, key: TypeKey) -> impl Iterator<Item = TypeKey> + '_ {
        std::iter::once(key).chain(self.object(key).ancestors.iter().copied())
    }
}
