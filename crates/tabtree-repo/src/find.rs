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

//! Pattern queries over the graph.
//!
//! A pattern has the shape of a path, `[files#]segment/segment/...`, where
//! every part is a regular expression matched against the whole name:
//!
//! - `files#` selects documents whose path, relative to the directory of
//!   the context document, matches `files`. Candidates are the cached
//!   documents and every file with the repository's extension below that
//!   directory.
//! - `#` alone starts at the root of the context document; no `#` starts
//!   at the context node itself.
//! - `..` ascends to the container and `.` stays in place.
//! - A property segment expands every containment property whose name
//!   matches. A list of objects consumes the following segment as an
//!   element id (or index) pattern; a pattern ending at a list selects all
//!   of its elements.
//!
//! `shop.tt#/entities/.*/roles/.*` finds every role of every entity in
//! `shop.tt`; `.*#/entities/Cust.*` looks in every document nearby.

use crate::repository::Repository;
use regex::Regex;
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use tabtree_core::location::{absolutize, normalize, relative_file_path};
use tabtree_core::{Graph, NodeId, TtError, TtResult, Value};
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Debug)]
enum Segment {
    Up,
    Here,
    Match(Regex),
}

fn anchored(source: &str) -> TtResult<Regex> {
    Regex::new(&format!("^(?:{})$", source))
        .map_err(|e| TtError::reference(format!("invalid pattern '{}': {}", source, e)))
}

fn compile(rest: &str) -> TtResult<Vec<Segment>> {
    rest.split('/')
        .filter(|s| !s.is_empty())
        .map(|s| match s {
            ".." => Ok(Segment::Up),
            "." => Ok(Segment::Here),
            _ => anchored(s).map(Segment::Match),
        })
        .collect()
}

impl Repository {
    /// Every node of type `type_name` (or a subtype) selected by `pattern`
    /// from `context`, in document order without duplicates.
    ///
    /// Documents selected by a file pattern are loaded if needed. Loading
    /// them never evicts: a bounded cache is trimmed on the next
    /// [`Repository::read`]. A selected document that fails to load is
    /// skipped with a warning, unless the file pattern names exactly that
    /// one file.
    pub fn find(
        &mut self,
        type_name: &str,
        context: NodeId,
        pattern: &str,
    ) -> TtResult<Vec<NodeId>> {
        let wanted = self.schema().require_type(type_name)?;
        let (starts, rest) = match pattern.find('#') {
            Some(0) => (vec![self.graph().root_of(context)?], &pattern[1..]),
            Some(i) => (
                self.matching_documents(context, &pattern[..i])?,
                &pattern[i + 1..],
            ),
            None => (vec![context], pattern),
        };
        let segments = compile(rest)?;

        let graph = self.graph();
        let mut seen = HashSet::new();
        let mut found = Vec::new();
        for start in starts {
            let mut hits = Vec::new();
            expand(graph, start, &segments, &mut hits)?;
            for hit in hits {
                if graph.schema().is_subtype(graph.type_key(hit)?, wanted) && seen.insert(hit) {
                    found.push(hit);
                }
            }
        }
        debug!(pattern, type_name, found = found.len(), "find");
        Ok(found)
    }

    /// Roots of the documents whose relative path matches `files`.
    fn matching_documents(&mut self, context: NodeId, files: &str) -> TtResult<Vec<NodeId>> {
        let matcher = anchored(files)?;
        let base = match self.graph().document_file(context)? {
            Some(file) => file
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
            None => absolutize(Path::new("."))?,
        };

        let mut candidates: BTreeSet<PathBuf> = self.cached_documents().into_iter().collect();
        candidates.extend(scan(&base, &self.config().extension));

        let exact = is_literal(files);
        let mut roots = Vec::new();
        for file in candidates {
            if !matcher.is_match(&relative_file_path(&base, &file)) {
                continue;
            }
            match self.load(&file) {
                Ok(root) => roots.push(root),
                Err(e) if exact => return Err(e),
                Err(e) => warn!(
                    file = %file.display(),
                    error = %e,
                    "skipping document that could not be loaded"
                ),
            }
        }
        Ok(roots)
    }
}

/// True when `pattern` matches one fixed string: no metacharacters other
/// than escaped punctuation.
fn is_literal(pattern: &str) -> bool {
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(escaped) if escaped.is_ascii_punctuation() => {}
                _ => return false,
            },
            '.' | '*' | '+' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '|' | '^' | '$' => {
                return false
            }
            _ => {}
        }
    }
    true
}

fn scan(dir: &Path, extension: &str) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|entry| {
            let path = entry.path();
            path.is_file() && path.extension().is_some_and(|ext| ext == extension)
        })
        .map(|entry| normalize(entry.path()))
        .collect()
}

fn expand(
    graph: &Graph,
    node: NodeId,
    segments: &[Segment],
    out: &mut Vec<NodeId>,
) -> TtResult<()> {
    let Some((segment, rest)) = segments.split_first() else {
        out.push(node);
        return Ok(());
    };
    match segment {
        Segment::Here => expand(graph, node, rest, out),
        Segment::Up => match graph.container(node)? {
            Some(container) => expand(graph, container, rest, out),
            None => Ok(()),
        },
        Segment::Match(field) => {
            let data = graph.node(node)?;
            for prop in graph.schema().object(data.type_key()).properties() {
                if !prop.is_containment() || !field.is_match(prop.name()) {
                    continue;
                }
                match &data.values()[prop.slot] {
                    Value::Node(child) => expand(graph, *child, rest, out)?,
                    Value::List(items) => expand_elements(graph, items, rest, out)?,
                    _ => {}
                }
            }
            Ok(())
        }
    }
}

fn expand_elements(
    graph: &Graph,
    items: &[Value],
    segments: &[Segment],
    out: &mut Vec<NodeId>,
) -> TtResult<()> {
    let (id, rest) = match segments.split_first() {
        Some((Segment::Match(id), rest)) => (Some(id), rest),
        Some(_) => {
            return Err(TtError::reference(
                "'.' and '..' cannot select list elements".to_string(),
            ))
        }
        None => (None, segments),
    };
    for (index, child) in items.iter().filter_map(Value::as_node).enumerate() {
        let selected = match id {
            Some(id) => {
                let name = graph.id_of(child)?.unwrap_or_else(|| index.to_string());
                id.is_match(&name)
            }
            None => true,
        };
        if selected {
            expand(graph, child, rest, out)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabtree_test::fixtures;

    fn shop() -> (Repository, NodeId) {
        let mut repo = Repository::new(fixtures::meta_schema().unwrap());
        let shop = fixtures::shop_model(repo.graph_mut()).unwrap();
        (repo, shop)
    }

    fn names(repo: &Repository, nodes: &[NodeId]) -> Vec<String> {
        nodes
            .iter()
            .map(|&n| repo.graph().id_of(n).unwrap().unwrap_or_default())
            .collect()
    }

    // ==================== In-document patterns ====================

    #[test]
    fn test_find_all_entities() {
        let (mut repo, shop) = shop();
        let found = repo.find("meta.Entity", shop, "entities/.*").unwrap();
        assert_eq!(names(&repo, &found), ["Party", "Customer", "Order"]);
    }

    #[test]
    fn test_find_id_regex() {
        let (mut repo, shop) = shop();
        let found = repo.find("meta.Entity", shop, "#/entities/(Party|Order)").unwrap();
        assert_eq!(names(&repo, &found), ["Party", "Order"]);
    }

    #[test]
    fn test_find_filters_by_type() {
        let (mut repo, shop) = shop();
        let all = repo
            .find("meta.Attribute", shop, "entities/.*/attributes/.*")
            .unwrap();
        assert_eq!(all.len(), 5);
        let derived = repo
            .find("meta.ext.DerivedAttribute", shop, "entities/.*/attributes/.*")
            .unwrap();
        assert_eq!(names(&repo, &derived), ["tax"]);
    }

    #[test]
    fn test_find_property_wildcard() {
        let (mut repo, shop) = shop();
        let found = repo.find("meta.NamedElement", shop, "#/.*/.*").unwrap();
        assert_eq!(names(&repo, &found), ["Party", "Customer", "Order", "Status"]);
    }

    #[test]
    fn test_find_ascends() {
        let (mut repo, shop) = shop();
        let order = repo.get_from_path(shop, "#/entities/Order").unwrap();
        let found = repo.find("meta.Entity", order, "../entities/C.*").unwrap();
        assert_eq!(names(&repo, &found), ["Customer"]);
        assert!(repo.find("meta.Model", shop, "..").unwrap().is_empty());
    }

    #[test]
    fn test_find_trailing_list_selects_elements() {
        let (mut repo, shop) = shop();
        let order = repo.get_from_path(shop, "#/entities/Order").unwrap();
        let found = repo.find("meta.Role", order, "roles").unwrap();
        assert_eq!(names(&repo, &found), ["buyer"]);
    }

    #[test]
    fn test_find_deduplicates() {
        let (mut repo, shop) = shop();
        let found = repo
            .find("meta.Entity", shop, "entities/.*/../entities/.*")
            .unwrap();
        assert_eq!(found.len(), 3);
    }

    #[test]
    fn test_find_invalid_regex() {
        let (mut repo, shop) = shop();
        let err = repo.find("meta.Entity", shop, "entities/(").unwrap_err();
        assert_eq!(err.kind, tabtree_core::TtErrorKind::Reference);
    }

    #[test]
    fn test_find_unknown_type() {
        let (mut repo, shop) = shop();
        assert!(repo.find("meta.Nothing", shop, "entities/.*").is_err());
    }

    // ==================== File patterns ====================

    #[test]
    fn test_literal_file_patterns() {
        assert!(is_literal("shop"));
        assert!(is_literal("billing/billing\\.tt"));
        assert!(!is_literal("shop.tt"));
        assert!(!is_literal(".*"));
        assert!(!is_literal("(a|b)\\.tt"));
        assert!(!is_literal("\\d\\.tt"));
    }
}
