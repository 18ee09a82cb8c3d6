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

//! Loading documents referenced by cross-file paths.

use super::{Graph, NodeId};
use crate::error::{TtError, TtResult};
use std::path::Path;

/// Supplies the root of the document stored at a given file, loading it
/// into the graph if it is not loaded yet.
///
/// Link dereferencing and path navigation call this for `file#/...`
/// paths. The repository's document store implements it on top of its
/// cache; [`Detached`] only sees documents already in the graph.
pub trait DocumentResolver {
    /// `file` is absolute and normalized.
    fn resolve_document(&mut self, graph: &mut Graph, file: &Path) -> TtResult<NodeId>;
}

/// Resolver for graphs without backing storage: finds documents that are
/// already loaded and fails for everything else.
#[derive(Debug, Clone, Copy, Default)]
pub struct Detached;

impl DocumentResolver for Detached {
    fn resolve_document(&mut self, graph: &mut Graph, file: &Path) -> TtResult<NodeId> {
        graph.find_document(file).ok_or_else(|| {
            TtError::reference(format!("document {} is not loaded", file.display()))
        })
    }
}
