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

//! File location helpers for documents and cross-file paths.
//!
//! Cross-file link paths carry the target document's location relative to
//! the directory of the referencing document, always with `/` separators.

use crate::error::{TtError, TtResult};
use std::path::{Component, Path, PathBuf};

/// Make `path` absolute against the current directory and normalize it.
pub fn absolutize(path: &Path) -> TtResult<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        let cwd = std::env::current_dir()
            .map_err(|e| TtError::io(format!("cannot determine current directory: {}", e)))?;
        cwd.join(path)
    };
    Ok(normalize(&joined))
}

/// Lexically normalize a path: drop `.` components and fold `..` into the
/// preceding component. Symlinks are not consulted.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = match out.components().next_back() {
                    Some(Component::Normal(_)) => out.pop(),
                    _ => false,
                };
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Compute the `/`-separated path of `to` relative to the directory `from_dir`.
///
/// Both paths are expected to be absolute and normalized.
pub fn relative_file_path(from_dir: &Path, to: &Path) -> String {
    let from: Vec<Component<'_>> = from_dir.components().collect();
    let target: Vec<Component<'_>> = to.components().collect();

    let common = from
        .iter()
        .zip(target.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = Vec::new();
    for _ in common..from.len() {
        parts.push("..".to_string());
    }
    for component in &target[common..] {
        parts.push(component.as_os_str().to_string_lossy().into_owned());
    }
    parts.join("/")
}

/// Resolve a `/`-separated relative file path against the directory of
/// `base_file`.
pub fn resolve_relative(base_file: &Path, relative: &str) -> PathBuf {
    let mut joined = base_file
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    for part in relative.split('/') {
        if !part.is_empty() {
            joined.push(part);
        }
    }
    normalize(&joined)
}
