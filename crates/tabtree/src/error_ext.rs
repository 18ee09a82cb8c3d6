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

//! Error context helpers.
//!
//! Extension methods on results that add context or a file to a
//! [`TtError`] as it propagates.
//!
//! ```rust
//! use tabtree::{Graph, TtResultExt};
//! # let schema = tabtree::SchemaBuilder::new().build().unwrap();
//!
//! let mut graph = Graph::new(schema);
//! let err = tabtree::parse(&mut graph, "")
//!     .context("loading the shop model")
//!     .in_file("models/shop.tt")
//!     .unwrap_err();
//! assert!(err.context.unwrap().contains("loading the shop model"));
//! ```

use crate::TtError;
use std::fmt;
use std::path::Path;

/// Extension trait for adding context to results.
///
/// Context is appended to the error's `context` field; the message and
/// kind are left unchanged.
pub trait TtResultExt<T> {
    /// The error type for this Result
    type ErrorType;

    /// Add context to an error.
    fn context<C>(self, context: C) -> Result<T, TtError>
    where
        C: fmt::Display;

    /// Add context computed only when there is an error.
    fn with_context<C, F>(self, f: F) -> Result<T, TtError>
    where
        C: fmt::Display,
        F: FnOnce() -> C;

    /// Record the file the error relates to, unless one is already set.
    fn in_file<P>(self, file: P) -> Result<T, TtError>
    where
        P: AsRef<Path>;

    /// Convert a foreign error type to `TtError`.
    fn map_err_to_tt<F>(self, f: F) -> Result<T, TtError>
    where
        F: FnOnce(Self::ErrorType) -> TtError,
        Self: Sized;
}

impl<T> TtResultExt<T> for Result<T, TtError> {
    type ErrorType = TtError;

    fn context<C>(self, context: C) -> Result<T, TtError>
    where
        C: fmt::Display,
    {
        self.map_err(|e| e.with_context(context.to_string()))
    }

    fn with_context<C, F>(self, f: F) -> Result<T, TtError>
    where
        C: fmt::Display,
        F: FnOnce() -> C,
    {
        self.map_err(|e| e.with_context(f().to_string()))
    }

    fn in_file<P>(self, file: P) -> Result<T, TtError>
    where
        P: AsRef<Path>,
    {
        self.map_err(|e| e.with_file(file))
    }

    fn map_err_to_tt<F>(self, _f: F) -> Result<T, TtError>
    where
        F: FnOnce(Self::ErrorType) -> TtError,
    {
        self
    }
}

impl<T> TtResultExt<T> for Result<T, std::io::Error> {
    type ErrorType = std::io::Error;

    fn context<C>(self, context: C) -> Result<T, TtError>
    where
        C: fmt::Display,
    {
        self.map_err(|e| TtError::io(e.to_string()).with_context(context.to_string()))
    }

    fn with_context<C, F>(self, f: F) -> Result<T, TtError>
    where
        C: fmt::Display,
        F: FnOnce() -> C,
    {
        self.map_err(|e| TtError::io(e.to_string()).with_context(f().to_string()))
    }

    fn in_file<P>(self, file: P) -> Result<T, TtError>
    where
        P: AsRef<Path>,
    {
        self.map_err(|e| TtError::io(e.to_string()).with_file(file))
    }

    fn map_err_to_tt<F>(self, f: F) -> Result<T, TtError>
    where
        F: FnOnce(Self::ErrorType) -> TtError,
    {
        self.map_err(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TtErrorKind;
    use std::path::PathBuf;

    fn failing() -> Result<(), TtError> {
        Err(TtError::syntax("bad line", 3))
    }

    // ==================== TtError results ====================

    #[test]
    fn test_context_keeps_kind_and_message() {
        let err = failing().context("reading shop").unwrap_err();
        assert_eq!(err.kind, TtErrorKind::Syntax);
        assert_eq!(err.message, "bad line");
        assert_eq!(err.line, 3);
        assert_eq!(err.context.as_deref(), Some("reading shop"));
    }

    #[test]
    fn test_context_chains() {
        let err = failing()
            .context("inner")
            .with_context(|| format!("outer {}", 1))
            .unwrap_err();
        assert_eq!(err.context.as_deref(), Some("inner; outer 1"));
    }

    #[test]
    fn test_with_context_is_lazy() {
        let mut called = false;
        let ok: Result<i32, TtError> = Ok(1);
        let value = ok
            .with_context(|| {
                called = true;
                "never"
            })
            .unwrap();
        assert_eq!(value, 1);
        assert!(!called);
    }

    #[test]
    fn test_in_file_keeps_first() {
        let err = failing()
            .in_file("a.tt")
            .in_file("b.tt")
            .unwrap_err();
        assert_eq!(err.file, Some(PathBuf::from("a.tt")));
    }

    #[test]
    fn test_map_err_to_tt_is_identity() {
        let err = failing()
            .map_err_to_tt(|_| TtError::io("unused"))
            .unwrap_err();
        assert_eq!(err.kind, TtErrorKind::Syntax);
    }

    // ==================== io results ====================

    #[test]
    fn test_io_error_conversion() {
        let io: Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        let err = io.context("opening shop").unwrap_err();
        assert_eq!(err.kind, TtErrorKind::IO);
        assert_eq!(err.message, "gone");
        assert_eq!(err.context.as_deref(), Some("opening shop"));
    }

    #[test]
    fn test_io_in_file() {
        let io: Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::Other, "denied"));
        let err = io.in_file("/tmp/shop.tt").unwrap_err();
        assert_eq!(err.file, Some(PathBuf::from("/tmp/shop.tt")));
    }

    #[test]
    fn test_io_map_err_to_tt() {
        let io: Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::Other, "x"));
        let err = io
            .map_err_to_tt(|e| TtError::unsaved(format!("custom: {}", e)))
            .unwrap_err();
        assert_eq!(err.kind, TtErrorKind::Unsaved);
        assert_eq!(err.message, "custom: x");
    }
}
