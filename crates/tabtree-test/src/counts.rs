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

//! Counting helpers.

use tabtree_core::{Graph, NodeId, TtResult, Value};

/// Number of nodes in the tree rooted at `root`, the root included.
pub fn count_nodes(graph: &Graph, root: NodeId) -> TtResult<usize> {
    Ok(graph.descendants(root)?.len())
}

/// Number of set link values in the tree rooted at `root`, counting each
/// entry of a link list.
pub fn count_links(graph: &Graph, root: NodeId) -> TtResult<usize> {
    let mut count = 0;
    for id in graph.descendants(root)? {
        for value in graph.node(id)?.values() {
            count += match value {
                Value::Link(link) if !link.is_unset() => 1,
                Value::LinkList(links) => links.len(),
                _ => 0,
            };
        }
    }
    Ok(count)
}
