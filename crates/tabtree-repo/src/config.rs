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

//! Repository configuration.

use tabtree_core::Limits;

/// Default file extension of stored documents.
pub const DEFAULT_EXTENSION: &str = "tt";

/// Configuration of a [`Repository`](crate::Repository).
///
/// ```text
/// use tabtree_repo::RepositoryConfig;
///
/// let config = RepositoryConfig::builder()
///     .extension("model")
///     .max_cached_documents(64)
///     .preload_references(false)
///     .build();
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryConfig {
    /// File extension used when a document is stored under a directory.
    pub extension: String,
    /// One indentation step in written documents.
    pub indent: String,
    /// Limits applied to every read.
    pub limits: Limits,
    /// Load documents referenced by cross-file links right after the
    /// referencing document is read.
    pub preload_references: bool,
    /// Maximum number of cached documents. When exceeded, the least
    /// recently used documents without unsaved changes are evicted.
    /// `None` means unbounded.
    pub max_cached_documents: Option<usize>,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            extension: DEFAULT_EXTENSION.to_string(),
            indent: "\t".to_string(),
            limits: Limits::default(),
            preload_references: true,
            max_cached_documents: None,
        }
    }
}

impl RepositoryConfig {
    pub fn builder() -> RepositoryConfigBuilder {
        RepositoryConfigBuilder::default()
    }
}

/// Builder for [`RepositoryConfig`].
#[derive(Debug, Clone, Default)]
pub struct RepositoryConfigBuilder {
    config: RepositoryConfig,
}

impl RepositoryConfigBuilder {
    /// Set the file extension, without the leading dot (default: `tt`).
    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.config.extension = extension.into();
        self
    }

    pub fn indent(mut self, indent: impl Into<String>) -> Self {
        self.config.indent = indent.into();
        self
    }

    pub fn limits(mut self, limits: Limits) -> Self {
        self.config.limits = limits;
        self
    }

    pub fn preload_references(mut self, preload: bool) -> Self {
        self.config.preload_references = preload;
        self
    }

    /// Bound the document cache (default: unbounded).
    pub fn max_cached_documents(mut self, max: usize) -> Self {
        self.config.max_cached_documents = Some(max);
        self
    }

    pub fn build(self) -> RepositoryConfig {
        self.config
    }
}
