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

//! Token types produced by the [`super::Lexer`].

use std::fmt;

/// Character that terminated a token's label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    /// `>`: the label is a type tag.
    TypeTag,
    /// `:`: the label is a field name, its value follows.
    Value,
    /// `-`: a list item follows.
    Item,
    /// End of input.
    End,
}

impl Delimiter {
    pub fn as_char(self) -> Option<char> {
        match self {
            Delimiter::TypeTag => Some('>'),
            Delimiter::Value => Some(':'),
            Delimiter::Item => Some('-'),
            Delimiter::End => None,
        }
    }
}

/// A lexed `(margin, label, delimiter)` triple with its source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Leading whitespace of the token. Empty for tokens that do not start
    /// a line.
    pub margin: String,
    pub label: String,
    pub delimiter: Delimiter,
    /// 1-based line of the first character of the label.
    pub line: usize,
    /// 1-based column of the first character of the label.
    pub column: usize,
}

impl Token {
    pub fn is_eof(&self) -> bool {
        self.delimiter == Delimiter::End
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.delimiter.as_char() {
            Some(c) => write!(f, "'{}{}'", self.label, c),
            None => write!(f, "end of input"),
        }
    }
}

/// True when `token` does not belong to a block whose fields sit at
/// `margin`: the input ended, or the token dedents out of the block.
pub fn is_end(token: &Token, margin: &str) -> bool {
    token.is_eof() || token.margin.len() < margin.len()
}
