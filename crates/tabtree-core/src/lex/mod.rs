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

//! Lexical analysis of margin-indented text.
//!
//! A document is a sequence of tokens `(margin, label, delimiter)`: the
//! margin is the run of leading whitespace before the label, and the
//! delimiter is whichever of `>` (type tag), `:` (field value) or `-` (list
//! item) ended the label. `:` and `-` swallow one separator character.
//!
//! ```text
//! Model>
//! name:	shop
//! entities:	
//! -	Entity>
//! 	name:	Customer
//! ```

mod lexer;
mod token;

pub use lexer::Lexer;
pub use token::{is_end, Delimiter, Token};
