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

//! The repository: a graph plus the documents it was read from.

use crate::config::RepositoryConfig;
use crate::store::{CacheStatistics, DocumentStore};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tabtree_core::location::absolutize;
use tabtree_core::{
    parse, write_document, Graph, NodeId, ParseOptions, Schema, TtError, TtResult, Value,
    WriteOptions,
};
use tracing::debug;

/// An object graph backed by document files.
///
/// Every operation runs synchronously on the caller's thread. Links into
/// other documents are resolved through the repository's document store,
/// which loads files on demand.
///
/// ```text
/// use tabtree_repo::Repository;
///
/// let mut repo = Repository::new(schema);
/// let model = repo.read("models/shop.tt")?;
/// let customer = repo.get_from_path(model, "#/entities/Customer")?;
/// let party = repo.link_get(customer, "superclass")?;
/// ```
#[derive(Debug)]
pub struct Repository {
    graph: Graph,
    store: DocumentStore,
}

impl Repository {
    pub fn new(schema: Arc<Schema>) -> Self {
        Self::with_config(schema, RepositoryConfig::default())
    }

    pub fn with_config(schema: Arc<Schema>, config: RepositoryConfig) -> Self {
        Self {
            graph: Graph::new(Arc::clone(&schema)),
            store: DocumentStore::new(schema, config),
        }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        self.store.schema()
    }

    pub fn config(&self) -> &RepositoryConfig {
        self.store.config()
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Mutable access to the graph. Operations that may need to load other
    /// documents are available on the repository itself.
    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    pub fn statistics(&self) -> CacheStatistics {
        self.store.statistics()
    }

    // ==================== Documents ====================

    /// Read the document at `path`, or return it from the cache.
    pub fn read(&mut self, path: impl AsRef<Path>) -> TtResult<NodeId> {
        let file = absolutize(path.as_ref())?;
        self.store.read(&mut self.graph, &file)
    }

    /// Load the document at the absolute path `file` without evicting
    /// others.
    pub(crate) fn load(&mut self, file: &Path) -> TtResult<NodeId> {
        self.store.fetch(&mut self.graph, file)
    }

    /// Read a document from text without giving it a file location.
    pub fn parse_str(&mut self, text: &str) -> TtResult<NodeId> {
        let options = ParseOptions {
            limits: self.config().limits.clone(),
            file: None,
            indent: self.config().indent.clone(),
        };
        Ok(parse(&mut self.graph, text, &options)?.root)
    }

    /// Text of the document rooted at `root`.
    pub fn to_string(&self, root: NodeId) -> TtResult<String> {
        write_document(
            &self.graph,
            root,
            &WriteOptions::with_indent(self.config().indent.clone()),
        )
    }

    /// Give `root` a storage location without writing it, so links to and
    /// from it can be written as cross-file paths. Returns the file chosen
    /// by the storage convention.
    pub fn assign(&mut self, path: impl AsRef<Path>, root: NodeId) -> TtResult<PathBuf> {
        let file = self.storage_path(path.as_ref(), root)?;
        self.graph.set_document_file(root, Some(file.clone()))?;
        self.store.register(file.clone(), root);
        Ok(file)
    }

    /// Write `root` as a document.
    ///
    /// A directory `path` stores the document as `<id>.<extension>` inside
    /// it; a file name that differs from the root's id is replaced by it.
    /// Returns the file written.
    pub fn write(&mut self, path: impl AsRef<Path>, root: NodeId) -> TtResult<PathBuf> {
        let file = self.assign(path, root)?;
        self.write_file(&file, root)?;
        Ok(file)
    }

    /// Write `root` back to the file it was read from or assigned to.
    pub fn save(&mut self, root: NodeId) -> TtResult<PathBuf> {
        let file = self.graph.document_file(root)?.ok_or_else(|| {
            TtError::unsaved(format!("{} has no file location to save to", root))
        })?;
        self.write_file(&file, root)?;
        Ok(file)
    }

    fn write_file(&mut self, file: &Path, root: NodeId) -> TtResult<()> {
        let text = self.to_string(root).map_err(|e| e.with_file(file))?;
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                TtError::io(format!("cannot create directory: {}", e)).with_file(parent)
            })?;
        }
        fs::write(file, &text)
            .map_err(|e| TtError::io(format!("cannot write document: {}", e)).with_file(file))?;
        self.graph.mark_clean(root)?;
        debug!(file = %file.display(), bytes = text.len(), "document written");
        Ok(())
    }

    fn storage_path(&self, path: &Path, root: NodeId) -> TtResult<PathBuf> {
        if self.graph.container(root)?.is_some() {
            return Err(TtError::schema(format!(
                "{} is contained in another node and cannot be stored as a document",
                root
            )));
        }
        let file = absolutize(path)?;
        let extension = &self.config().extension;
        let id = self.graph.id_of(root)?.filter(|id| !id.is_empty());
        let is_dir = file.is_dir() || path.to_string_lossy().ends_with(['/', '\\']);
        match id {
            Some(id) if is_dir => Ok(file.join(format!("{}.{}", id, extension))),
            Some(id) => {
                let stem = file.file_stem().map(|s| s.to_string_lossy().into_owned());
                if stem.as_deref() == Some(id.as_str()) {
                    Ok(file)
                } else {
                    let renamed = file.with_file_name(format!("{}.{}", id, extension));
                    debug!(
                        given = %file.display(),
                        stored = %renamed.display(),
                        "document file named after its id"
                    );
                    Ok(renamed)
                }
            }
            None if is_dir => Err(TtError::unsaved(format!(
                "{} has no id to name its file after in {}",
                root,
                file.display()
            ))),
            None => Ok(file),
        }
    }

    pub fn is_cached(&self, path: impl AsRef<Path>) -> bool {
        absolutize(path.as_ref())
            .map(|file| self.store.cached(&self.graph, &file).is_some())
            .unwrap_or(false)
    }

    pub fn cached_documents(&self) -> Vec<PathBuf> {
        self.store.cached_documents()
    }

    /// Drop a document from memory. Links into it from other documents
    /// reload it when they are next dereferenced.
    pub fn evict(&mut self, path: impl AsRef<Path>) -> TtResult<bool> {
        let file = absolutize(path.as_ref())?;
        self.store.evict(&mut self.graph, &file)
    }

    /// Forget every document and node.
    pub fn clear(&mut self) {
        self.store.clear(&mut self.graph);
    }

    // ==================== Navigation ====================

    /// Resolve `path` from `context`, loading other documents as needed.
    pub fn get_from_path(&mut self, context: NodeId, path: &str) -> TtResult<NodeId> {
        self.graph.navigate(context, path, &mut self.store)
    }

    // ==================== Nodes and links ====================

    /// Create a detached node of the named type.
    pub fn create(&mut self, type_name: &str) -> TtResult<NodeId> {
        self.graph.create(type_name)
    }

    pub fn get(&self, id: NodeId, property: &str) -> TtResult<&Value> {
        self.graph.get(id, property)
    }

    pub fn set(&mut self, id: NodeId, property: &str, value: impl Into<Value>) -> TtResult<Value> {
        self.graph.set(id, property, value)
    }

    pub fn link_get(&mut self, owner: NodeId, property: &str) -> TtResult<Option<NodeId>> {
        self.graph.link_get(owner, property, &mut self.store)
    }

    pub fn link_set(
        &mut self,
        owner: NodeId,
        property: &str,
        target: Option<NodeId>,
    ) -> TtResult<()> {
        self.graph.link_set(owner, property, target, &mut self.store)
    }

    pub fn link_path(&self, owner: NodeId, property: &str) -> TtResult<Option<String>> {
        self.graph.link_path(owner, property)
    }

    pub fn link_list_targets(&mut self, owner: NodeId, property: &str) -> TtResult<Vec<NodeId>> {
        self.graph.link_list_targets(owner, property, &mut self.store)
    }

    pub fn link_list_add(&mut self, owner: NodeId, property: &str, target: NodeId) -> TtResult<()> {
        self.graph
            .link_list_add(owner, property, target, &mut self.store)
    }

    pub fn link_list_remove(
        &mut self,
        owner: NodeId,
        property: &str,
        target: NodeId,
    ) -> TtResult<bool> {
        self.graph
            .link_list_remove(owner, property, target, &mut self.store)
    }

    pub fn link_list_contains(
        &mut self,
        owner: NodeId,
        property: &str,
        target: NodeId,
    ) -> TtResult<bool> {
        self.graph
            .link_list_contains(owner, property, target, &mut self.store)
    }

    pub fn link_list_contains_path(
        &self,
        owner: NodeId,
        property: &str,
        path: &str,
    ) -> TtResult<bool> {
        self.graph.link_list_contains_path(owner, property, path)
    }

    /// Delete a node, clearing the opposite side of each of its links.
    pub fn delete(&mut self, id: NodeId) -> TtResult<()> {
        self.graph.delete(id, &mut self.store)
    }
}
