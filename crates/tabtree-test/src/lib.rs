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

//! Shared test schemas, fixtures and utilities for tabtree crates.
//!
//! ```text
//! use tabtree_test::fixtures;
//!
//! let schema = fixtures::meta_schema()?;
//! let mut graph = Graph::new(schema);
//! let shop = fixtures::shop_model(&mut graph)?;
//! assert_eq!(write_document(&graph, shop, &WriteOptions::default())?, fixtures::SHOP_TEXT);
//! ```

use tabtree_core::{Graph, NodeId, TtResult};

/// Type alias for a list of fixture functions (name, builder).
pub type FixtureList = Vec<(&'static str, fn(&mut Graph) -> TtResult<NodeId>)>;

/// Canonical models, schemas and invalid inputs.
pub mod fixtures;

/// Node and link counting utilities.
pub mod counts;

pub use counts::{count_links, count_nodes};
pub use fixtures::*;

#[cfg(test)]
mod tests {
    use super::*;
    use tabtree_core::{write_document, Value, WriteOptions};

    fn graph() -> Graph {
        Graph::new(meta_schema().unwrap())
    }

    #[test]
    fn test_meta_schema_builds() {
        let schema = meta_schema().unwrap();
        let derived = schema.require_type("meta.ext.DerivedAttribute").unwrap();
        let attribute = schema.require_type("Attribute").unwrap();
        assert!(schema.is_subtype(derived, attribute));
        assert!(schema.object(schema.require_type("NamedElement").unwrap()).is_abstract);
    }

    #[test]
    fn test_shop_model_matches_text() {
        let mut g = graph();
        let shop = shop_model(&mut g).unwrap();
        let text = write_document(&g, shop, &WriteOptions::default()).unwrap();
        assert_eq!(text, SHOP_TEXT);
    }

    #[test]
    fn test_all_fixtures_build() {
        for (name, fixture) in fixtures::all() {
            let mut g = graph();
            let root = fixture(&mut g).unwrap_or_else(|e| panic!("{}: {}", name, e));
            assert_eq!(g.id_of(root).unwrap().as_deref(), Some(name));
        }
    }

    #[test]
    fn test_counts() {
        let mut g = graph();
        let shop = shop_model(&mut g).unwrap();
        // model, 3 entities, 5 attributes, 1 role, 1 enumeration
        assert_eq!(count_nodes(&g, shop).unwrap(), 11);
        // superclass + subclasses, target + incoming
        assert_eq!(count_links(&g, shop).unwrap(), 4);
    }

    #[test]
    fn test_chain_model_links() {
        let mut g = graph();
        let chain = chain_model(&mut g, 4).unwrap();
        let entities = g.children(chain, "entities").unwrap();
        assert_eq!(entities.len(), 4);
        match g.get(entities[0], "incoming").unwrap() {
            Value::LinkList(links) => assert_eq!(links.len(), 3),
            other => panic!("expected link list, got {:?}", other),
        }
    }
}
