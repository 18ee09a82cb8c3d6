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

//! Compilation of type definitions into a [`Schema`].

use super::compiled::{
    EnumKey, EnumSchema, LinkSchema, ObjectSchema, PropertyDescriptor, Schema, TypeKey, ValueKind,
};
use super::def::{qualify, EnumDef, LinkDef, PropertyDef, PropertyKind, TypeDef};
use crate::error::{TtError, TtResult};
use crate::value::Value;
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;

/// Characters that would break the text format or path syntax.
const RESERVED: &[char] = &[':', '>', '-', '/', '#', '.', '\\'];

/// Collects type and enum definitions and compiles them into a [`Schema`].
///
/// # Examples
///
/// ```text
/// let schema = SchemaBuilder::new()
///     .enum_def(EnumDef::new("shop", "Status", ["Open", "Closed"]))
///     .type_def(TypeDef::new("shop", "Order").id("number")
///         .property(PropertyDef::string("number"))
///         .property(PropertyDef::enumeration("status", "Status")))
///     .build()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    types: Vec<TypeDef>,
    enums: Vec<EnumDef>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn type_def(mut self, def: TypeDef) -> Self {
        self.types.push(def);
        self
    }

    pub fn enum_def(mut self, def: EnumDef) -> Self {
        self.enums.push(def);
        self
    }

    /// Validate every definition and compile the registry.
    pub fn build(self) -> TtResult<Arc<Schema>> {
        let mut enums = Vec::with_capacity(self.enums.len());
        let mut enum_index = HashMap::new();
        let mut short_enums: HashMap<String, Vec<EnumKey>> = HashMap::new();
        for (i, def) in self.enums.iter().enumerate() {
            check_name("enum", &def.name)?;
            check_namespace(&def.namespace)?;
            let qualified = def.qualified_name();
            for constant in &def.constants {
                if constant.is_empty()
                    || constant == "null"
                    || constant.contains('\n')
                    || constant.trim() != constant
                {
                    return Err(TtError::schema(format!(
                        "enum '{}' has invalid constant '{}'",
                        qualified, constant
                    )));
                }
            }
            if enum_index.insert(qualified.clone(), EnumKey(i)).is_some() {
                return Err(TtError::schema(format!("duplicate enum '{}'", qualified)));
            }
            short_enums.entry(def.name.clone()).or_default().push(EnumKey(i));
            enums.push(EnumSchema {
                key: EnumKey(i),
                name: def.name.clone(),
                namespace: def.namespace.clone(),
                qualified_name: qualified,
                constants: def.constants.clone(),
            });
        }

        let mut type_index = HashMap::new();
        let mut short_types: HashMap<String, Vec<TypeKey>> = HashMap::new();
        for (i, def) in self.types.iter().enumerate() {
            check_name("type", &def.name)?;
            check_namespace(&def.namespace)?;
            let qualified = def.qualified_name();
            if type_index.insert(qualified.clone(), TypeKey(i)).is_some() {
                return Err(TtError::schema(format!("duplicate type '{}'", qualified)));
            }
            short_types.entry(def.name.clone()).or_default().push(TypeKey(i));
        }

        let names = Names {
            type_index: &type_index,
            short_types: &short_types,
            enum_index: &enum_index,
            short_enums: &short_enums,
        };

        let mut supertypes = Vec::with_capacity(self.types.len());
        for def in &self.types {
            let sup = match &def.supertype {
                Some(name) => Some(names.type_ref(name, &def.namespace).ok_or_else(|| {
                    TtError::schema(format!(
                        "type '{}' extends unknown type '{}'",
                        def.qualified_name(),
                        name
                    ))
                })?),
                None => None,
            };
            supertypes.push(sup);
        }

        let mut ancestors = Vec::with_capacity(self.types.len());
        for (i, def) in self.types.iter().enumerate() {
            let mut chain = Vec::new();
            let mut current = supertypes[i];
            while let Some(TypeKey(s)) = current {
                if s == i || chain.len() > self.types.len() {
                    return Err(TtError::schema(format!(
                        "inheritance cycle through type '{}'",
                        def.qualified_name()
                    )));
                }
                chain.push(TypeKey(s));
                current = supertypes[s];
            }
            ancestors.push(chain);
        }

        let mut types = Vec::with_capacity(self.types.len());
        for (i, def) in self.types.iter().enumerate() {
            let key = TypeKey(i);
            let mut properties: Vec<PropertyDescriptor> = Vec::new();
            let mut index = HashMap::new();
            let lineage: Vec<TypeKey> = ancestors[i]
                .iter()
                .rev()
                .copied()
                .chain(std::iter::once(key))
                .collect();
            for declaring in lineage {
                let declaring_def = &self.types[declaring.0];
                let mut own: Vec<&PropertyDef> = declaring_def.properties.iter().collect();
                own.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.name.cmp(&b.name)));
                for prop in own {
                    check_name("property", &prop.name)?;
                    let kind = names.compile_kind(&prop.kind, &declaring_def.namespace)?;
                    let default = compile_default(prop, &kind, &enums, declaring_def)?;
                    let slot = properties.len();
                    if index.insert(prop.name.clone(), slot).is_some() {
                        return Err(TtError::schema(format!(
                            "type '{}' declares property '{}' more than once along its hierarchy",
                            def.qualified_name(),
                            prop.name
                        )));
                    }
                    properties.push(PropertyDescriptor {
                        name: prop.name.clone(),
                        kind,
                        default,
                        order: prop.order,
                        transient: prop.transient,
                        read_only: prop.read_only,
                        declared_in: declaring,
                        slot,
                    });
                }
            }

            let id_name = std::iter::once(i)
                .chain(ancestors[i].iter().map(|k| k.0))
                .find_map(|k| self.types[k].id_property.clone());
            let id_slot = match id_name {
                Some(name) => {
                    let slot = *index.get(&name).ok_or_else(|| {
                        TtError::schema(format!(
                            "id property '{}' of type '{}' is not declared",
                            name,
                            def.qualified_name()
                        ))
                    })?;
                    if !properties[slot].kind.is_scalar() {
                        return Err(TtError::schema(format!(
                            "id property '{}' of type '{}' must be a scalar",
                            name,
                            def.qualified_name()
                        )));
                    }
                    Some(slot)
                }
                None => None,
            };

            types.push(ObjectSchema {
                key,
                name: def.name.clone(),
                namespace: def.namespace.clone(),
                qualified_name: def.qualified_name(),
                supertype: supertypes[i],
                ancestors: ancestors[i].clone(),
                is_abstract: def.is_abstract,
                id_slot,
                properties,
                index,
            });
        }

        let schema = Schema {
            types,
            enums,
            type_index,
            short_types,
            enum_index,
        };
        check_opposites(&schema)?;
        Ok(Arc::new(schema))
    }
}

struct Names<'a> {
    type_index: &'a HashMap<String, TypeKey>,
    short_types: &'a HashMap<String, Vec<TypeKey>>,
    enum_index: &'a HashMap<String, EnumKey>,
    short_enums: &'a HashMap<String, Vec<EnumKey>>,
}

impl Names<'_> {
    fn type_ref(&self, name: &str, namespace: &str) -> Option<TypeKey> {
        lookup(name, namespace, self.type_index, self.short_types)
    }

    fn enum_ref(&self, name: &str, namespace: &str) -> Option<EnumKey> {
        lookup(name, namespace, self.enum_index, self.short_enums)
    }

    fn compile_kind(&self, kind: &PropertyKind, namespace: &str) -> TtResult<ValueKind> {
        Ok(match kind {
            PropertyKind::Bool => ValueKind::Bool,
            PropertyKind::Int => ValueKind::Int,
            PropertyKind::Float => ValueKind::Float,
            PropertyKind::Char => ValueKind::Char,
            PropertyKind::String => ValueKind::String,
            PropertyKind::Enum(name) => ValueKind::Enum(
                self.enum_ref(name, namespace)
                    .ok_or_else(|| TtError::schema(format!("unknown enum '{}'", name)))?,
            ),
            PropertyKind::Object(name) => ValueKind::Object(
                self.type_ref(name, namespace)
                    .ok_or_else(|| TtError::schema(format!("unknown type '{}'", name)))?,
            ),
            PropertyKind::List(element) => match element.as_ref() {
                PropertyKind::List(_) | PropertyKind::Link(_) | PropertyKind::LinkList(_) => {
                    return Err(TtError::schema(
                        "list elements must be scalars or objects".to_string(),
                    ))
                }
                other => ValueKind::List(Box::new(self.compile_kind(other, namespace)?)),
            },
            PropertyKind::Link(def) => ValueKind::Link(self.compile_link(def, namespace)?),
            PropertyKind::LinkList(def) => {
                ValueKind::LinkList(self.compile_link(def, namespace)?)
            }
        })
    }

    fn compile_link(&self, def: &LinkDef, namespace: &str) -> TtResult<LinkSchema> {
        let target = self
            .type_ref(&def.target, namespace)
            .ok_or_else(|| TtError::schema(format!("unknown link target '{}'", def.target)))?;
        let pattern = match &def.pattern {
            Some(source) => Some(Regex::new(&format!("^(?:{})$", source)).map_err(|e| {
                TtError::schema(format!("invalid link pattern '{}': {}", source, e))
            })?),
            None => None,
        };
        Ok(LinkSchema {
            target,
            pattern,
            pattern_source: def.pattern.clone(),
            opposite: def.opposite.clone(),
        })
    }
}

fn lookup<K: Copy>(
    name: &str,
    namespace: &str,
    qualified: &HashMap<String, K>,
    short: &HashMap<String, Vec<K>>,
) -> Option<K> {
    if name.contains('.') {
        return qualified.get(name).copied();
    }
    if let Some(key) = qualified.get(&qualify(namespace, name)) {
        return Some(*key);
    }
    match short.get(name) {
        Some(keys) if keys.len() == 1 => Some(keys[0]),
        _ => None,
    }
}

fn check_name(what: &str, name: &str) -> TtResult<()> {
    if name.is_empty()
        || name == "null"
        || name.chars().any(|c| c.is_whitespace() || RESERVED.contains(&c))
    {
        return Err(TtError::schema(format!("invalid {} name '{}'", what, name)));
    }
    Ok(())
}

fn check_namespace(namespace: &str) -> TtResult<()> {
    if namespace.is_empty() {
        return Ok(());
    }
    for part in namespace.split('.') {
        check_name("namespace", part)?;
    }
    Ok(())
}

fn compile_default(
    prop: &PropertyDef,
    kind: &ValueKind,
    enums: &[EnumSchema],
    owner: &TypeDef,
) -> TtResult<Value> {
    let wrong = || {
        TtError::schema(format!(
            "default of property '{}' on type '{}' does not match its kind",
            prop.name,
            owner.qualified_name()
        ))
    };
    let declared = match &prop.default {
        None | Some(Value::Null) => None,
        Some(v) => Some(v.clone()),
    };
    Ok(match (kind, declared) {
        (ValueKind::List(_), None) => Value::List(Vec::new()),
        (ValueKind::Link(_), None) => Value::Link(Default::default()),
        (ValueKind::LinkList(_), None) => Value::LinkList(Vec::new()),
        (_, None) => Value::Null,
        (ValueKind::Bool, Some(v @ Value::Bool(_))) => v,
        (ValueKind::Int, Some(v @ Value::Int(_))) => v,
        (ValueKind::Float, Some(v @ Value::Float(_))) => v,
        (ValueKind::Float, Some(Value::Int(n))) => Value::Float(n as f64),
        (ValueKind::Char, Some(v @ Value::Char(_))) => v,
        (ValueKind::String, Some(v @ Value::String(_))) => v,
        (ValueKind::Enum(key), Some(Value::Enum(s) | Value::String(s))) => {
            if enums[key.0].contains(&s) {
                Value::Enum(s)
            } else {
                return Err(wrong());
            }
        }
        _ => return Err(wrong()),
    })
}

fn check_opposites(schema: &Schema) -> TtResult<()> {
    for object in schema.types() {
        for prop in object.properties() {
            let Some(link) = prop.kind.link_schema() else {
                continue;
            };
            let Some(opposite) = &link.opposite else {
                continue;
            };
            let target = schema.object(link.target);
            let reciprocal = target.property(opposite).ok_or_else(|| {
                TtError::schema(format!(
                    "opposite '{}' of {}.{} does not exist on type '{}'",
                    opposite, object.qualified_name, prop.name, target.qualified_name
                ))
            })?;
            let back = reciprocal.kind.link_schema().ok_or_else(|| {
                TtError::schema(format!(
                    "opposite '{}' of {}.{} is not a link",
                    opposite, object.qualified_name, prop.name
                ))
            })?;
            if !schema.is_subtype(object.key, back.target) {
                return Err(TtError::schema(format!(
                    "opposite '{}.{}' cannot point back to type '{}'",
                    target.qualified_name, opposite, object.qualified_name
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TtErrorKind;

    fn named() -> TypeDef {
        TypeDef::new("lib", "Named")
            .abstract_type()
            .id("name")
            .property(PropertyDef::string("name"))
    }

    // ==================== Resolution tests ====================

    #[test]
    fn test_short_names_resolve_in_namespace() {
        let schema = SchemaBuilder::new()
            .type_def(named())
            .type_def(TypeDef::new("lib", "Book").extends("Named"))
            .type_def(TypeDef::new("other", "Book"))
            .build()
            .unwrap();
        let book = schema.type_key("lib.Book").unwrap();
        assert_eq!(schema.object(book).supertype, schema.type_key("lib.Named"));
        assert!(schema.type_key("Book").is_none());
        assert_eq!(schema.type_key("Named"), schema.type_key("lib.Named"));
    }

    #[test]
    fn test_resolve_label_uses_context_namespace() {
        let schema = SchemaBuilder::new()
            .type_def(TypeDef::new("a", "Item"))
            .type_def(TypeDef::new("b", "Item"))
            .type_def(TypeDef::new("b", "Holder"))
            .build()
            .unwrap();
        let holder = schema.type_key("b.Holder").unwrap();
        let b_item = schema.type_key("b.Item").unwrap();
        let a_item = schema.type_key("a.Item").unwrap();
        assert_eq!(schema.resolve_label("Item", Some(holder)).unwrap(), b_item);
        assert_eq!(schema.resolve_label("a.Item", Some(holder)).unwrap(), a_item);
        let err = schema.resolve_label("Item", None).unwrap_err();
        assert_eq!(err.kind, TtErrorKind::UnknownType);
        assert_eq!(schema.label_for(a_item, Some(holder)), "a.Item");
        assert_eq!(schema.label_for(b_item, Some(holder)), "Item");
        assert_eq!(schema.label_for(holder, None), "Holder");
        assert_eq!(schema.label_for(b_item, None), "b.Item");
    }

    // ==================== Property ordering tests ====================

    #[test]
    fn test_property_order_supertype_first_then_hint_then_name() {
        let schema = SchemaBuilder::new()
            .type_def(named())
            .type_def(
                TypeDef::new("lib", "Book")
                    .extends("Named")
                    .property(PropertyDef::string("title"))
                    .property(PropertyDef::string("author"))
                    .property(PropertyDef::int("pages").order(-1)),
            )
            .build()
            .unwrap();
        let book = schema.object(schema.type_key("Book").unwrap());
        let names: Vec<&str> = book.properties().iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["name", "pages", "author", "title"]);
        assert_eq!(book.id_property().map(|p| p.name()), Some("name"));
        assert_eq!(book.slot_of("title"), Some(3));
    }

    #[test]
    fn test_defaults_are_captured() {
        let schema = SchemaBuilder::new()
            .enum_def(EnumDef::new("lib", "Genre", ["Poetry", "Prose"]))
            .type_def(
                TypeDef::new("lib", "Book")
                    .property(PropertyDef::int("edition").default_value(1i64))
                    .property(PropertyDef::float("price").default_value(0i64))
                    .property(PropertyDef::enumeration("genre", "Genre").default_value("Prose"))
                    .property(PropertyDef::list("tags", PropertyKind::String)),
            )
            .build()
            .unwrap();
        let book = schema.object(schema.type_key("Book").unwrap());
        assert_eq!(book.require("edition").unwrap().default, Value::Int(1));
        assert_eq!(book.require("price").unwrap().default, Value::Float(0.0));
        assert_eq!(
            book.require("genre").unwrap().default,
            Value::Enum("Prose".into())
        );
        assert_eq!(book.require("tags").unwrap().default, Value::List(vec![]));
    }

    // ==================== Rejection tests ====================

    #[test]
    fn test_rejects_unknown_supertype() {
        let err = SchemaBuilder::new()
            .type_def(TypeDef::new("x", "A").extends("Missing"))
            .build()
            .unwrap_err();
        assert_eq!(err.kind, TtErrorKind::Schema);
    }

    #[test]
    fn test_rejects_inheritance_cycle() {
        let err = SchemaBuilder::new()
            .type_def(TypeDef::new("x", "A").extends("B"))
            .type_def(TypeDef::new("x", "B").extends("A"))
            .build()
            .unwrap_err();
        assert!(err.message.contains("cycle"));
    }

    #[test]
    fn test_rejects_duplicate_property_along_hierarchy() {
        let err = SchemaBuilder::new()
            .type_def(named())
            .type_def(
                TypeDef::new("lib", "Book")
                    .extends("Named")
                    .property(PropertyDef::string("name")),
            )
            .build()
            .unwrap_err();
        assert!(err.message.contains("more than once"));
    }

    #[test]
    fn test_rejects_reserved_characters() {
        for bad in ["a:b", "a-b", "a b", "a/b", "a#b", ""] {
            let result = SchemaBuilder::new()
                .type_def(TypeDef::new("x", "A").property(PropertyDef::string(bad)))
                .build();
            assert!(result.is_err(), "name {:?} should be rejected", bad);
        }
    }

    #[test]
    fn test_rejects_bad_default_and_bad_pattern() {
        assert!(SchemaBuilder::new()
            .type_def(TypeDef::new("x", "A").property(PropertyDef::bool("b").default_value(3i64)))
            .build()
            .is_err());
        assert!(SchemaBuilder::new()
            .type_def(
                TypeDef::new("x", "A")
                    .property(PropertyDef::link("l", LinkDef::new("A").pattern("(")))
            )
            .build()
            .is_err());
    }

    #[test]
    fn test_opposite_must_exist_and_point_back() {
        let missing = SchemaBuilder::new()
            .type_def(
                TypeDef::new("x", "A")
                    .property(PropertyDef::link("b", LinkDef::new("B").opposite("a"))),
            )
            .type_def(TypeDef::new("x", "B"))
            .build();
        assert!(missing.is_err());

        let wrong_type = SchemaBuilder::new()
            .type_def(
                TypeDef::new("x", "A")
                    .property(PropertyDef::link("b", LinkDef::new("B").opposite("c"))),
            )
            .type_def(
                TypeDef::new("x", "B")
                    .property(PropertyDef::link("c", LinkDef::new("C").opposite("b"))),
            )
            .type_def(TypeDef::new("x", "C"))
            .build();
        assert!(wrong_type.is_err());

        let ok = SchemaBuilder::new()
            .type_def(
                TypeDef::new("x", "A")
                    .property(PropertyDef::link("b", LinkDef::new("B").opposite("as"))),
            )
            .type_def(
                TypeDef::new("x", "B")
                    .property(PropertyDef::link_list("as", LinkDef::new("A").opposite("b"))),
            )
            .build();
        assert!(ok.is_ok());
    }

    #[test]
    fn test_link_pattern_is_anchored() {
        let schema = SchemaBuilder::new()
            .type_def(
                TypeDef::new("x", "A")
                    .property(PropertyDef::link("l", LinkDef::new("A").pattern("\\.\\./as/.*"))),
            )
            .build()
            .unwrap();
        let a = schema.object(schema.type_key("A").unwrap());
        let link = a.require("l").unwrap().kind.link_schema().unwrap();
        assert!(link.accepts("../as/one"));
        assert!(!link.accepts("x/../as/one"));
    }
}
