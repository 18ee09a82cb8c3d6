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

//! Tabtree Validation
//!
//! Property rules and a validator that walks object graphs from their
//! roots.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tabtree_lint::{has_errors, RuleBook, Rules, Validator};
//! use tabtree_repo::Repository;
//! # fn schema() -> std::sync::Arc<tabtree_core::Schema> { unimplemented!() }
//!
//! let mut repo = Repository::new(schema());
//! let model = repo.read("models/shop.tt")?;
//!
//! let mut rules = RuleBook::new(repo.schema().clone());
//! rules
//!     .add("meta.NamedElement", "name", Rules::new().not_null().single_line())?
//!     .add("meta.Entity", "superclass", Rules::new().no_cycle("superclass"))?;
//!
//! let violations = Validator::new(rules).validate(&mut repo, &[model])?;
//! for v in &violations {
//!     eprintln!("{}", v);
//! }
//! assert!(!has_errors(&violations));
//! # Ok::<(), tabtree_core::TtError>(())
//! ```
//!
//! ## Custom Rules
//!
//! Whole-node checks implement [`NodeRule`] and are registered with
//! [`Validator::add_rule`].

mod rules;
mod validator;
mod violation;

pub use rules::{NextFn, RuleBook, Rules};
pub use validator::{NodeRule, Validator, ValidatorConfig};
pub use violation::{has_errors, ConstraintViolation, Severity};

use tabtree_core::{NodeId, TtResult};
use tabtree_repo::Repository;

/// Validate `roots` with `rules` and the default configuration.
pub fn validate(
    repo: &mut Repository,
    rules: RuleBook,
    roots: &[NodeId],
) -> TtResult<Vec<ConstraintViolation>> {
    Validator::new(rules).validate(repo, roots)
}
