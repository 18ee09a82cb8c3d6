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

//! Tabtree Repository
//!
//! Stores object graphs as documents on disk. Each document is one file
//! holding a root node and everything it contains; links between
//! documents are written as file-relative paths and loaded on demand.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tabtree_repo::{Repository, RepositoryConfig};
//! # fn schema() -> std::sync::Arc<tabtree_core::Schema> { unimplemented!() }
//!
//! let config = RepositoryConfig::builder().max_cached_documents(64).build();
//! let mut repo = Repository::with_config(schema(), config);
//!
//! let model = repo.read("models/shop.tt")?;
//! for entity in repo.find("meta.Entity", model, "#/entities/.*")? {
//!     println!("{:?}", repo.graph().id_of(entity)?);
//! }
//! repo.save(model)?;
//! # Ok::<(), tabtree_core::TtError>(())
//! ```
//!
//! ## Storage convention
//!
//! Writing a root with an id into a directory stores it as
//! `<id>.<extension>`. A file name that disagrees with the id is replaced,
//! so the file of a document can always be derived from its root.
//!
//! ## Caching
//!
//! Read documents stay cached until they are evicted, the repository is
//! cleared, or the configured cache size is exceeded. Dirty documents are
//! never evicted automatically.

mod config;
mod find;
mod repository;
mod store;

pub use config::{RepositoryConfig, RepositoryConfigBuilder, DEFAULT_EXTENSION};
pub use repository::Repository;
pub use store::{CacheStatistics, DocumentStore};
