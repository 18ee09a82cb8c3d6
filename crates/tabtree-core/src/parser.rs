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

//! Reading documents into a [`Graph`].

use crate::codec::Reader;
use crate::error::{TtError, TtResult};
use crate::graph::{Graph, NodeId};
use crate::limits::Limits;
use std::path::PathBuf;
use tracing::debug;

/// Options for reading one document.
///
/// ```text
/// use tabtree_core::ParseOptions;
///
/// let opts = ParseOptions::builder()
///     .max_depth(64)
///     .file("/data/model.tt")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Resource limits.
    pub limits: Limits,
    /// Storage location assigned to the resulting root. Relative
    /// cross-file links are resolved against it.
    pub file: Option<PathBuf>,
    /// One indentation step (default: a single tab).
    pub indent: String,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
            file: None,
            indent: "\t".to_string(),
        }
    }
}

impl ParseOptions {
    /// Create a new builder for ParseOptions.
    pub fn builder() -> ParseOptionsBuilder {
        ParseOptionsBuilder::new()
    }
}

/// Builder for [`ParseOptions`].
///
/// ```text
/// let opts = ParseOptions::builder()
///     .max_nodes(10_000)
///     .max_string_size(1024 * 1024)
///     .build();
/// ```
#[derive(Debug, Clone, Default)]
pub struct ParseOptionsBuilder {
    options: ParseOptions,
}

impl ParseOptionsBuilder {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum object nesting depth (default: 256).
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.options.limits.max_depth = depth;
        self
    }

    /// Set the maximum number of nodes one read may create (default: 10M).
    pub fn max_nodes(mut self, nodes: usize) -> Self {
        self.options.limits.max_nodes = nodes;
        self
    }

    /// Set the maximum size of a single string value in bytes.
    pub fn max_string_size(mut self, size: usize) -> Self {
        self.options.limits.max_string_size = size;
        self
    }

    /// Set the maximum input size in bytes.
    ///
    /// ```text
    /// ParseOptions::builder().max_file_size(500 * 1024 * 1024)
    /// ```
    pub fn max_file_size(mut self, size: usize) -> Self {
        self.options.limits.max_file_size = size;
        self
    }

    /// Replace all limits at once.
    pub fn limits(mut self, limits: Limits) -> Self {
        self.options.limits = limits;
        self
    }

    pub fn file(mut self, file: impl Into<PathBuf>) -> Self {
        self.options.file = Some(file.into());
        self
    }

    pub fn indent(mut self, indent: impl Into<String>) -> Self {
        self.options.indent = indent.into();
        self
    }

    pub fn build(self) -> ParseOptions {
        self.options
    }
}

/// Result of reading one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed {
    /// The root object.
    pub root: NodeId,
    /// Cross-file link paths found in the document, in reading order.
    pub external_refs: Vec<String>,
}

/// Read `text` as one document into `graph`.
///
/// Links are stored as unresolved paths. On failure every node created by
/// this read is removed again, leaving the graph as it was.
pub fn parse(graph: &mut Graph, text: &str, options: &ParseOptions) -> TtResult<Parsed> {
    let with_file = |e: TtError| match &options.file {
        Some(file) => e.with_file(file),
        None => e,
    };

    if text.len() > options.limits.max_file_size {
        return Err(with_file(TtError::security(
            format!(
                "input is {} bytes, limit is {}",
                text.len(),
                options.limits.max_file_size
            ),
            0,
        )));
    }

    let mut reader = Reader::new(text, graph, &options.indent, options.limits.clone());
    let result = reader.read_document();
    let created = std::mem::take(&mut reader.created);
    let external_refs = std::mem::take(&mut reader.external);
    drop(reader);

    let root = match result {
        Ok(root) => root,
        Err(e) => {
            for id in created {
                graph.free_node(id);
            }
            return Err(with_file(e));
        }
    };

    graph
        .set_document_file(root, options.file.clone())
        .map_err(with_file)?;
    graph.mark_clean(root)?;
    debug!(
        nodes = created.len(),
        external = external_refs.len(),
        file = ?options.file,
        "document read"
    );
    Ok(Parsed {
        root,
        external_refs,
    })
}
