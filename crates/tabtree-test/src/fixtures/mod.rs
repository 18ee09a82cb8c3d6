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

//! Test fixtures over the `meta` schema.
//!
//! - **schemas**: the metamodel definition
//! - **documents**: canonical models and their text
//! - **errors**: invalid and lenient texts
//! - **builders**: fluent construction of new models

pub mod builders;
mod documents;
pub mod errors;
mod schemas;

pub use documents::*;
pub use schemas::*;

use crate::FixtureList;
use tabtree_core::{Graph, NodeId, TtResult};

/// Every model fixture, for running one test across all of them.
pub fn all() -> FixtureList {
    vec![
        ("shop", shop_model),
        ("notes", notes_model),
        ("chain", small_chain),
    ]
}

fn small_chain(graph: &mut Graph) -> TtResult<NodeId> {
    chain_model(graph, 8)
}
