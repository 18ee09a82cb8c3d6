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

//! Writing a document tree back to text.

use crate::codec::Writer;
use crate::error::{TtError, TtResult};
use crate::graph::{Graph, NodeId};

/// Output options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    /// One indentation step (default: a single tab).
    pub indent: String,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            indent: "\t".to_string(),
        }
    }
}

impl WriteOptions {
    pub fn with_indent(indent: impl Into<String>) -> Self {
        Self {
            indent: indent.into(),
        }
    }
}

/// Write the tree rooted at `root` as one document.
///
/// Properties equal to their default are left out. Links are written as
/// paths; a link to a live node gets a freshly synthesized path, which may
/// need the document files of both ends to be assigned.
pub fn write_document(graph: &Graph, root: NodeId, options: &WriteOptions) -> TtResult<String> {
    if let Some(container) = graph.container(root)? {
        return Err(TtError::schema(format!(
            "{} is contained in {}; only roots can be written as documents",
            root, container
        )));
    }
    if options.indent.is_empty() || options.indent.chars().any(|c| c != ' ' && c != '\t') {
        return Err(TtError::schema("indent must be non-empty spaces or tabs"));
    }
    let mut writer = Writer::new(graph, &options.indent);
    writer.write_object(root, None, "")?;
    Ok(writer.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TtErrorKind;
    use crate::graph::tests::{library_schema, sample};
    use crate::graph::Detached;
    use crate::parser::{parse, ParseOptions};
    use crate::value::Value;

    // ==================== Output shape ====================

    #[test]
    fn test_write_sample_library() {
        let mut g = Graph::new(library_schema());
        let (lib, [one, two, _]) = sample(&mut g);
        g.link_set(one, "sequel", Some(two), &mut Detached).unwrap();
        let text = write_document(&g, lib, &WriteOptions::default()).unwrap();
        assert_eq!(
            text,
            "Library>\nname:\tcity\nshelves:\t\n\
             -\tShelf>\n\tbooks:\t\n\
             \t-\tBook>\n\t\tsequel:\t../books/two\n\t\ttitle:\tone\n\
             \t-\tBook>\n\t\tprequel:\t../books/one\n\t\ttitle:\ttwo\n\
             \tlabel:\ta\n\
             -\tShelf>\n\tbooks:\t\n\
             \t-\tBook>\n\t\ttitle:\tthree\n\
             \tlabel:\tb\n"
        );
    }

    #[test]
    fn test_defaults_are_omitted() {
        let mut g = Graph::new(library_schema());
        let lib = g.create("Library").unwrap();
        g.set(lib, "name", "city").unwrap();
        let text = write_document(&g, lib, &WriteOptions::default()).unwrap();
        assert_eq!(text, "Library>\nname:\tcity\n");

        g.set(lib, "founded", 1850i64).unwrap();
        let text = write_document(&g, lib, &WriteOptions::default()).unwrap();
        assert_eq!(text, "Library>\nfounded:\t1850\nname:\tcity\n");
    }

    #[test]
    fn test_null_over_non_null_default() {
        let mut g = Graph::new(library_schema());
        let lib = g.create("Library").unwrap();
        g.set(lib, "founded", Value::Null).unwrap();
        let text = write_document(&g, lib, &WriteOptions::default()).unwrap();
        assert_eq!(text, "Library>\nfounded:\tnull\n");

        let mut back = Graph::new(library_schema());
        let parsed = parse(&mut back, &text, &ParseOptions::default()).unwrap();
        assert_eq!(back.get(parsed.root, "founded").unwrap(), &Value::Null);
    }

    #[test]
    fn test_nested_object_and_scalar_list() {
        let mut g = Graph::new(library_schema());
        let lib = g.create("Library").unwrap();
        let keeper = g.create("Person").unwrap();
        g.set(keeper, "name", "Ada").unwrap();
        g.set(keeper, "initial", 'A').unwrap();
        g.set_child(lib, "keeper", Some(keeper)).unwrap();
        let text = write_document(&g, lib, &WriteOptions::default()).unwrap();
        assert_eq!(text, "Library>\nkeeper:\tPerson>\n\tinitial:\tA\n\tname:\tAda\n");

        let book = g.create("Book").unwrap();
        g.set(
            book,
            "tags",
            Value::List(vec![Value::from("old"), Value::from("two\nlines")]),
        )
        .unwrap();
        let text = write_document(&g, book, &WriteOptions::default()).unwrap();
        assert_eq!(text, "Book>\ntags:\t\n-\told\n-\ttwo\\\n\tlines\n");
    }

    #[test]
    fn test_custom_indent() {
        let mut g = Graph::new(library_schema());
        let (lib, _) = sample(&mut g);
        let text = write_document(&g, lib, &WriteOptions::with_indent("  ")).unwrap();
        assert!(text.contains("-\tShelf>\n  books:\t\n  -\tBook>\n    title:\tone\n"));

        let mut back = Graph::new(library_schema());
        let opts = ParseOptions::builder().indent("  ").build();
        let parsed = parse(&mut back, &text, &opts).unwrap();
        assert_eq!(back.descendants(parsed.root).unwrap().len(), 6);
    }

    // ==================== Errors ====================

    #[test]
    fn test_contained_node_is_not_a_document() {
        let mut g = Graph::new(library_schema());
        let (_, [one, _, _]) = sample(&mut g);
        let err = write_document(&g, one, &WriteOptions::default()).unwrap_err();
        assert_eq!(err.kind, TtErrorKind::Schema);
    }

    #[test]
    fn test_invalid_indent() {
        let mut g = Graph::new(library_schema());
        let lib = g.create("Library").unwrap();
        assert!(write_document(&g, lib, &WriteOptions::with_indent("")).is_err());
        assert!(write_document(&g, lib, &WriteOptions::with_indent("->")).is_err());
    }

    #[test]
    fn test_cross_document_link_needs_files() {
        let mut g = Graph::new(library_schema());
        let a = g.create("Book").unwrap();
        let b = g.create("Book").unwrap();
        g.set(a, "title", "a").unwrap();
        g.set(b, "title", "b").unwrap();
        g.link_set(a, "sequel", Some(b), &mut Detached).unwrap();
        let err = write_document(&g, a, &WriteOptions::default()).unwrap_err();
        assert_eq!(err.kind, TtErrorKind::Unsaved);

        g.set_document_file(a, Some("/lib/a.tt".into())).unwrap();
        g.set_document_file(b, Some("/lib/sub/b.tt".into())).unwrap();
        let text = write_document(&g, a, &WriteOptions::default()).unwrap();
        assert_eq!(text, "Book>\nsequel:\tsub/b.tt#\ntitle:\ta\n");
    }
}
