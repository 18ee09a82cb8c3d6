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

//! Per-kind read and write of property values.
//!
//! The object codec drives everything: it writes a type tag, then one
//! `field:<TAB>value` line per non-default persistent property, and hands
//! each value to the codec of its kind. Scalars sit on the field line
//! (strings may continue on following lines), nested objects follow their
//! field name on the same line, lists put one `-<TAB>item` line per element
//! at the field's own margin, and links are written as path strings.
//!
//! ```text
//! Library>
//! name:	city
//! shelves:	
//! -	Shelf>
//! 	books:	
//! 	-	Book>
//! 		sequel:	../books/two
//! 		title:	one
//! 	label:	a
//! ```

mod link;
mod list;
mod object;
mod scalar;

pub use scalar::{escape_string, format_scalar, parse_scalar, read_string, NULL};

use crate::graph::{Graph, NodeId};
use crate::lex::Lexer;
use crate::limits::Limits;
use std::sync::Arc;

use crate::schema::Schema;

/// Reading state for one document.
pub(crate) struct Reader<'a, 'g> {
    lexer: Lexer<'a>,
    graph: &'g mut Graph,
    schema: Arc<Schema>,
    indent: String,
    limits: Limits,
    depth: usize,
    /// Every node created so far, so a failed read can be discarded.
    pub(crate) created: Vec<NodeId>,
    /// Cross-file link paths seen while reading.
    pub(crate) external: Vec<String>,
}

impl<'a, 'g> Reader<'a, 'g> {
    pub(crate) fn new(text: &'a str, graph: &'g mut Graph, indent: &str, limits: Limits) -> Self {
        let schema = Arc::clone(graph.schema());
        Self {
            lexer: Lexer::new(text),
            graph,
            schema,
            indent: indent.to_string(),
            limits,
            depth: 0,
            created: Vec::new(),
            external: Vec::new(),
        }
    }

    fn nested(&self, margin: &str) -> String {
        format!("{}{}", margin, self.indent)
    }
}

/// Output state for one document.
pub(crate) struct Writer<'g> {
    graph: &'g Graph,
    indent: String,
    out: String,
}

impl<'g> Writer<'g> {
    pub(crate) fn new(graph: &'g Graph, indent: &str) -> Self {
        Self {
            graph,
            indent: indent.to_string(),
            out: String::new(),
        }
    }

    pub(crate) fn finish(self) -> String {
        self.out
    }

    fn nested(&self, margin: &str) -> String {
        format!("{}{}", margin, self.indent)
    }

    fn field_header(&mut self, margin: &str, name: &str) {
        self.out.push_str(margin);
        self.out.push_str(name);
        self.out.push_str(":\t");
    }
}
