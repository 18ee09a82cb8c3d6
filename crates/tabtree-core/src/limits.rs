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

//! Resource limits for reading and writing documents.

/// Bounds on what a single document may contribute to a graph.
///
/// Exceeding any of them fails the read with a `Security` error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Largest document file accepted, in bytes. Default 1 GiB.
    pub max_file_size: usize,
    /// Deepest object nesting below the root. Default 256.
    pub max_depth: usize,
    /// Node budget of one read. Default 10 million.
    pub max_nodes: usize,
    /// Longest decoded string value, in bytes. Default 16 MiB.
    pub max_string_size: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_file_size: 1 << 30,
            max_depth: 256,
            max_nodes: 10_000_000,
            max_string_size: 16 << 20,
        }
    }
}

impl Limits {
    /// Limits that never trip. Used by tests and trusted inputs.
    pub fn unlimited() -> Self {
        Self {
            max_file_size: usize::MAX,
            max_depth: usize::MAX,
            max_nodes: usize::MAX,
            max_string_size: usize::MAX,
        }
    }
}
