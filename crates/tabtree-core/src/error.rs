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

//! Error types for reading, writing and navigating object graphs.

use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The kind of error that occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TtErrorKind {
    /// Malformed input: the token stream ended inside an open block or a
    /// line could not be tokenized.
    Syntax,
    /// A value block dedented or indented unexpectedly.
    Margin,
    /// A type tag could not be mapped to a registered concrete type.
    UnknownType,
    /// Schema registration failure or a value of the wrong shape.
    Schema,
    /// A path could not be resolved to a node.
    Reference,
    /// A node handle no longer refers to a live node.
    StaleHandle,
    /// A path needs a document file location that has not been assigned.
    Unsaved,
    /// A configured limit was exceeded.
    Security,
    /// I/O error (file operations).
    IO,
}

impl fmt::Display for TtErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax => write!(f, "SyntaxError"),
            Self::Margin => write!(f, "MarginError"),
            Self::UnknownType => write!(f, "UnknownTypeError"),
            Self::Schema => write!(f, "SchemaError"),
            Self::Reference => write!(f, "ReferenceError"),
            Self::StaleHandle => write!(f, "StaleHandleError"),
            Self::Unsaved => write!(f, "UnsavedError"),
            Self::Security => write!(f, "SecurityError"),
            Self::IO => write!(f, "IOError"),
        }
    }
}

/// An error raised by the codec, the graph model or the repository.
#[derive(Debug, Clone, Error)]
#[error("{kind} at line {line}: {message}{}{}", file_suffix(.file), context_suffix(.context))]
pub struct TtError {
    /// The kind of error.
    pub kind: TtErrorKind,
    /// Human-readable error message.
    pub message: String,
    /// Line number (1-based, 0 when not tied to input text).
    pub line: usize,
    /// Column number (1-based, optional).
    pub column: Option<usize>,
    /// File the offending input came from, when known.
    pub file: Option<PathBuf>,
    /// Additional context (e.g., "while reading field 'entities'").
    pub context: Option<String>,
}

fn file_suffix(file: &Option<PathBuf>) -> String {
    match file {
        Some(path) => format!(" in {}", path.display()),
        None => String::new(),
    }
}

fn context_suffix(context: &Option<String>) -> String {
    match context {
        Some(context) => format!(" ({})", context),
        None => String::new(),
    }
}

impl TtError {
    /// Create a new error.
    pub fn new(kind: TtErrorKind, message: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            message: message.into(),
            line,
            column: None,
            file: None,
            context: None,
        }
    }

    /// Add column information.
    pub fn with_column(mut self, column: usize) -> Self {
        self.column = Some(column);
        self
    }

    /// Attach the file the error originated from, unless one is already set.
    pub fn with_file(mut self, file: impl AsRef<Path>) -> Self {
        if self.file.is_none() {
            self.file = Some(file.as_ref().to_path_buf());
        }
        self
    }

    /// Add context information. Existing context is kept and the new
    /// context is appended after it.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        let context = context.into();
        self.context = Some(match self.context.take() {
            Some(existing) => format!("{}; {}", existing, context),
            None => context,
        });
        self
    }

    /// Fill in the line number when the error was raised without one.
    pub fn at_line(mut self, line: usize) -> Self {
        if self.line == 0 {
            self.line = line;
        }
        self
    }

    pub fn syntax(message: impl Into<String>, line: usize) -> Self {
        Self::new(TtErrorKind::Syntax, message, line)
    }

    pub fn margin(message: impl Into<String>, line: usize) -> Self {
        Self::new(TtErrorKind::Margin, message, line)
    }

    pub fn unknown_type(message: impl Into<String>, line: usize) -> Self {
        Self::new(TtErrorKind::UnknownType, message, line)
    }

    pub fn schema(message: impl Into<String>) -> Self {
        Self::new(TtErrorKind::Schema, message, 0)
    }

    pub fn reference(message: impl Into<String>) -> Self {
        Self::new(TtErrorKind::Reference, message, 0)
    }

    pub fn stale(message: impl Into<String>) -> Self {
        Self::new(TtErrorKind::StaleHandle, message, 0)
    }

    pub fn unsaved(message: impl Into<String>) -> Self {
        Self::new(TtErrorKind::Unsaved, message, 0)
    }

    pub fn security(message: impl Into<String>, line: usize) -> Self {
        Self::new(TtErrorKind::Security, message, line)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(TtErrorKind::IO, message, 0)
    }
}

/// Result type for tabtree operations.
pub type TtResult<T> = Result<T, TtError>;
