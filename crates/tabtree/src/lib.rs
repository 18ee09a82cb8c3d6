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

//! # Tabtree
//!
//! Tabtree stores typed object graphs as indentation-structured text. A
//! document is one root object and everything it contains; objects refer
//! to each other through links written as paths, within a document or
//! across files.
//!
//! ## Quick Start
//!
//! ```rust
//! use tabtree::{parse, to_text, Graph, LinkDef, PropertyDef, SchemaBuilder, TypeDef};
//!
//! let schema = SchemaBuilder::new()
//!     .type_def(
//!         TypeDef::new("lib", "Book")
//!             .id("title")
//!             .property(PropertyDef::string("title"))
//!             .property(PropertyDef::link("sequel", LinkDef::new("Book"))),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let mut graph = Graph::new(schema);
//! let book = parse(&mut graph, "Book>\ntitle:\tDune\n").unwrap();
//! assert_eq!(graph.id_of(book).unwrap().as_deref(), Some("Dune"));
//! assert_eq!(to_text(&graph, book).unwrap(), "Book>\ntitle:\tDune\n");
//! ```
//!
//! ## Modules
//!
//! - crate root: schema, graph model, reading and writing
//! - [`repo`]: file-backed repository with document cache
//! - [`lint`](mod@lint): property rules and validation

pub use tabtree_core::{
    // Functions
    parse as core_parse,
    write_document,
    // Graph model
    Detached,
    DocumentResolver,
    Graph,
    Link,
    NodeId,
    Value,
    // Schema
    EnumDef,
    LinkDef,
    PropertyDef,
    PropertyKind,
    Schema,
    SchemaBuilder,
    TypeDef,
    // Errors
    TtError,
    TtErrorKind,
    TtResult,
    // Options
    Limits,
    ParseOptions,
    WriteOptions,
};
pub use tabtree_repo::{Repository, RepositoryConfig};

mod error_ext;
pub use error_ext::TtResultExt;

pub mod repo {
    //! File-backed repository
    pub use tabtree_repo::{
        CacheStatistics, DocumentStore, Repository, RepositoryConfig, RepositoryConfigBuilder,
        DEFAULT_EXTENSION,
    };
}

pub mod lint {
    //! Property rules and validation
    pub use tabtree_lint::{
        has_errors, validate, ConstraintViolation, NextFn, NodeRule, RuleBook, Rules, Severity,
        Validator, ValidatorConfig,
    };
}

/// Read a document from text into `graph` with default options.
///
/// The document has no file location; give it one with
/// [`Graph::set_document_file`] or store it through a [`Repository`].
#[inline]
pub fn parse(graph: &mut Graph, text: &str) -> TtResult<NodeId> {
    core_parse(graph, text, &ParseOptions::default()).map(|parsed| parsed.root)
}

/// Write the document rooted at `root` with tab indentation.
#[inline]
pub fn to_text(graph: &Graph, root: NodeId) -> TtResult<String> {
    write_document(graph, root, &WriteOptions::default())
}

/// Check that `text` is a well-formed document for `schema` without
/// keeping anything.
pub fn check(schema: &std::sync::Arc<Schema>, text: &str) -> TtResult<()> {
    let mut graph = Graph::new(std::sync::Arc::clone(schema));
    parse(&mut graph, text).map(|_| ())
}

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;
    use tabtree_test::fixtures;

    #[test]
    fn test_parse_and_write() {
        let mut graph = Graph::new(fixtures::meta_schema().unwrap());
        let root = parse(&mut graph, fixtures::SHOP_TEXT).unwrap();
        assert_eq!(to_text(&graph, root).unwrap(), fixtures::SHOP_TEXT);
    }

    #[test]
    fn test_check() {
        let schema = fixtures::meta_schema().unwrap();
        assert!(check(&schema, "Model>\nname:\tm\n").is_ok());
        let err = check(&schema, "Model>\nname:\tm\nversion:\tnine\n").unwrap_err();
        assert_eq!(err.kind, TtErrorKind::Syntax);
    }

    #[test]
    fn test_module_reexports() {
        let schema = fixtures::meta_schema().unwrap();
        let rules = lint::RuleBook::new(schema.clone());
        assert!(rules.is_empty());
        assert_eq!(repo::DEFAULT_EXTENSION, "tt");
        assert_eq!(Limits::default(), tabtree_core::Limits::default());
    }

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
