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

//! Explicitly registered type registry.
//!
//! Client code declares record types with [`TypeDef`] / [`PropertyDef`] and
//! enumerations with [`EnumDef`], then compiles them once with
//! [`SchemaBuilder::build`]. The resulting [`Schema`] is immutable and shared
//! by every graph, codec and validator that works with those types.
//!
//! The compiled [`PropertyDescriptor`] list of each type is the single
//! source of truth for text output order, default values and link
//! declarations; editors and validators read the same descriptors.

mod builder;
mod compiled;
mod def;

pub use builder::SchemaBuilder;
pub use compiled::{
    EnumKey, EnumSchema, LinkSchema, ObjectSchema, PropertyDescriptor, Schema, TypeKey, ValueKind,
};
pub use def::{EnumDef, LinkDef, PropertyDef, PropertyKind, TypeDef};
