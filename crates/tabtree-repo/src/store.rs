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

//! Document cache with LRU eviction and a pending-reference queue.
//!
//! The store maps absolute file paths to the roots of loaded documents.
//! Reading a document queues the files its cross-file links point at; the
//! queue is drained once the outermost read has finished, so a document
//! that references back into one being read is never loaded recursively.

use crate::config::RepositoryConfig;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tabtree_core::location::resolve_relative;
use tabtree_core::{
    parse, DocumentResolver, Graph, NodeId, ParseOptions, Schema, TtError, TtResult,
};
use tracing::{debug, warn};

/// Cache statistics for monitoring.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStatistics {
    /// Reads answered from the cache.
    pub hits: u64,
    /// Reads that loaded a file.
    pub misses: u64,
    /// Documents dropped because the cache was full.
    pub evictions: u64,
    /// Current number of cached documents.
    pub current_size: usize,
}

/// Loaded documents keyed by absolute file path.
#[derive(Debug)]
pub struct DocumentStore {
    schema: Arc<Schema>,
    config: RepositoryConfig,
    cache: HashMap<PathBuf, NodeId>,
    last_access: HashMap<PathBuf, u64>,
    clock: u64,
    pending: VecDeque<PathBuf>,
    draining: bool,
    stats: CacheStatistics,
}

impl DocumentStore {
    pub fn new(schema: Arc<Schema>, config: RepositoryConfig) -> Self {
        Self {
            schema,
            config,
            cache: HashMap::new(),
            last_access: HashMap::new(),
            clock: 0,
            pending: VecDeque::new(),
            draining: false,
            stats: CacheStatistics::default(),
        }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    pub fn statistics(&self) -> CacheStatistics {
        CacheStatistics {
            current_size: self.cache.len(),
            ..self.stats.clone()
        }
    }

    /// Root of the cached document at `file`, if it is still live.
    pub fn cached(&self, graph: &Graph, file: &Path) -> Option<NodeId> {
        self.cache
            .get(file)
            .copied()
            .filter(|&root| graph.contains(root))
    }

    /// Cached file paths, sorted.
    pub fn cached_documents(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = self.cache.keys().cloned().collect();
        files.sort();
        files
    }

    /// Read the document at the absolute path `file`, from the cache when
    /// possible. Documents it references are preloaded afterwards unless
    /// this read is itself part of a preload.
    pub fn read(&mut self, graph: &mut Graph, file: &Path) -> TtResult<NodeId> {
        let root = self.fetch(graph, file)?;
        if !self.draining {
            self.enforce_capacity(graph, file);
        }
        Ok(root)
    }

    /// Like [`DocumentStore::read`], but never evicts other documents.
    pub(crate) fn fetch(&mut self, graph: &mut Graph, file: &Path) -> TtResult<NodeId> {
        let root = self.load(graph, file)?;
        if !self.draining {
            self.draining = true;
            self.drain(graph);
            self.draining = false;
            self.touch(file);
        }
        Ok(root)
    }

    fn load(&mut self, graph: &mut Graph, file: &Path) -> TtResult<NodeId> {
        if let Some(root) = self.cached(graph, file) {
            self.stats.hits += 1;
            self.touch(file);
            return Ok(root);
        }
        self.cache.remove(file);
        self.stats.misses += 1;

        let text = fs::read_to_string(file).map_err(|e| {
            TtError::io(format!("cannot read document: {}", e)).with_file(file)
        })?;
        let options = ParseOptions {
            limits: self.config.limits.clone(),
            file: Some(file.to_path_buf()),
            indent: self.config.indent.clone(),
        };
        let parsed = parse(graph, &text, &options)?;
        self.register(file.to_path_buf(), parsed.root);
        debug!(
            file = %file.display(),
            bytes = text.len(),
            references = parsed.external_refs.len(),
            "document loaded"
        );

        if self.config.preload_references {
            for reference in &parsed.external_refs {
                let Some(hash) = reference.find('#') else {
                    continue;
                };
                let target = resolve_relative(file, &reference[..hash]);
                if !self.cache.contains_key(&target) && !self.pending.contains(&target) {
                    self.pending.push_back(target);
                }
            }
        }
        Ok(parsed.root)
    }

    /// Load every queued document that is not cached yet, each once.
    fn drain(&mut self, graph: &mut Graph) {
        let mut attempted = HashSet::new();
        let mut loaded = 0usize;
        while let Some(file) = self.pending.pop_front() {
            if self.cached(graph, &file).is_some() || !attempted.insert(file.clone()) {
                continue;
            }
            match self.load(graph, &file) {
                Ok(_) => loaded += 1,
                Err(e) => warn!(
                    file = %file.display(),
                    error = %e,
                    "referenced document could not be preloaded"
                ),
            }
        }
        if loaded > 0 {
            debug!(loaded, "pending references drained");
        }
    }

    /// Record `root` as the document stored at `file`.
    pub fn register(&mut self, file: PathBuf, root: NodeId) {
        self.cache.retain(|path, cached| *cached != root || *path == file);
        self.touch(&file);
        self.cache.insert(file, root);
    }

    /// Drop the document at `file` from the graph and the cache. Live links
    /// pointing into it from other documents keep a path and re-resolve on
    /// next access.
    pub fn evict(&mut self, graph: &mut Graph, file: &Path) -> TtResult<bool> {
        let Some(root) = self.cache.remove(file) else {
            return Ok(false);
        };
        self.last_access.remove(file);
        if !graph.contains(root) {
            return Ok(false);
        }
        if graph.is_dirty(root)? {
            warn!(file = %file.display(), "evicting document with unsaved changes");
        }
        let recorded = graph.materialize_paths_into(root)?;
        graph.discard_tree(root)?;
        debug!(file = %file.display(), recorded, "document evicted");
        Ok(true)
    }

    /// Forget every document and clear the graph.
    pub fn clear(&mut self, graph: &mut Graph) {
        graph.clear();
        self.cache.clear();
        self.last_access.clear();
        self.pending.clear();
        debug!("repository cleared");
    }

    fn touch(&mut self, file: &Path) {
        self.clock += 1;
        self.last_access.insert(file.to_path_buf(), self.clock);
    }

    /// Evict least recently used clean documents until the cache fits its
    /// bound. `keep` is never evicted.
    fn enforce_capacity(&mut self, graph: &mut Graph, keep: &Path) {
        let Some(max) = self.config.max_cached_documents else {
            return;
        };
        while self.cache.len() > max {
            let candidate = self
                .cache
                .iter()
                .filter(|(path, _)| path.as_path() != keep)
                .filter(|(_, &root)| !graph.is_dirty(root).unwrap_or(true))
                .min_by_key(|(path, _)| self.last_access.get(*path).copied().unwrap_or(0))
                .map(|(path, _)| path.clone());
            let Some(file) = candidate else {
                debug!(
                    cached = self.cache.len(),
                    max, "cache over its bound but every other document has unsaved changes"
                );
                return;
            };
            match self.evict(graph, &file) {
                Ok(_) => self.stats.evictions += 1,
                Err(e) => {
                    warn!(file = %file.display(), error = %e, "eviction failed");
                    self.cache.remove(&file);
                }
            }
        }
    }
}

/// Documents loaded while dereferencing a link or navigating a path never
/// evict others: the node being dereferenced may live in the least recently
/// used document. The bound is enforced again on the next [`DocumentStore::read`].
impl DocumentResolver for DocumentStore {
    fn resolve_document(&mut self, graph: &mut Graph, file: &Path) -> TtResult<NodeId> {
        self.fetch(graph, file)
    }
}
