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

//! Core reader, writer and object graph model for the tabtree format.
//!
//! A tabtree document is a tree of typed objects written one field per
//! line, nesting expressed by tab indentation. Objects live in a
//! [`Graph`] arena and are addressed by [`NodeId`] handles; containment is
//! the tree, and links between objects are stored as path strings that
//! are resolved lazily, possibly into other documents.
//!
//! Types are registered up front through a [`SchemaBuilder`], which
//! compiles them into an immutable [`Schema`] shared by every graph.
//!
//! ```text
//! use tabtree_core::{parse, write_document, Graph, ParseOptions, WriteOptions};
//!
//! let mut graph = Graph::new(schema);
//! let parsed = parse(&mut graph, text, &ParseOptions::default())?;
//! let again = write_document(&graph, parsed.root, &WriteOptions::default())?;
//! ```

pub mod codec;
mod error;
pub mod graph;
pub mod lex;
mod limits;
pub mod location;
mod parser;
pub mod schema;
mod value;
mod writer;

pub use error::{TtError, TtErrorKind, TtResult};
pub use graph::{Detached, DocumentInfo, DocumentResolver, Graph, NodeData, NodeId};
pub use limits::Limits;
pub use parser::{parse, ParseOptions, ParseOptionsBuilder, Parsed};
pub use schema::{
    EnumDef, EnumKey, EnumSchema, LinkDef, LinkSchema, ObjectSchema, PropertyDef,
    PropertyDescriptor, PropertyKind, Schema, SchemaBuilder, TypeDef, TypeKey, ValueKind,
};
pub use value::{Link, Value};
pub use writer::{write_document, WriteOptions};
