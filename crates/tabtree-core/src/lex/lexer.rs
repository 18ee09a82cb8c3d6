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

//! Margin-aware tokenizer.

use super::token::{Delimiter, Token};
use crate::error::{TtError, TtResult};

/// Lexer over one document's text.
///
/// Tokens are produced on demand. One token can be pushed back with
/// [`Lexer::unread`] (or inspected with [`Lexer::peek_token`]) so that a
/// caller can compare margins before committing to a block. Scalar values
/// are not tokenized; codecs take the rest of the current line with
/// [`Lexer::read_line`].
pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
    column: usize,
    peeked: Option<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            line: 1,
            column: 1,
            peeked: None,
        }
    }

    /// Current 1-based line.
    pub fn line(&self) -> usize {
        self.peeked.as_ref().map_or(self.line, |t| t.line)
    }

    /// True when no input and no pushed-back token remain.
    pub fn at_eof(&self) -> bool {
        self.peeked.is_none() && self.pos >= self.src.len()
    }

    /// Produce the next token.
    ///
    /// Blank lines between tokens are skipped. A label running into the end
    /// of its line or the end of input is a syntax error.
    pub fn next_token(&mut self) -> TtResult<Token> {
        if let Some(token) = self.peeked.take() {
            return Ok(token);
        }
        loop {
            let margin_start = self.pos;
            while let Some(c) = self.current() {
                if c == ' ' || c == '\t' {
                    self.bump();
                } else {
                    break;
                }
            }
            let margin = &self.src[margin_start..self.pos];
            let (line, column) = (self.line, self.column);
            let label_start = self.pos;
            loop {
                match self.current() {
                    None => {
                        let label = &self.src[label_start..self.pos];
                        if label.trim().is_empty() {
                            return Ok(Token {
                                margin: margin.to_string(),
                                label: String::new(),
                                delimiter: Delimiter::End,
                                line,
                                column,
                            });
                        }
                        return Err(TtError::syntax(
                            format!("unexpected end of input after '{}'", label),
                            line,
                        )
                        .with_column(column));
                    }
                    Some('\n') => {
                        let label = &self.src[label_start..self.pos];
                        if !label.trim().is_empty() {
                            return Err(TtError::syntax(
                                format!("'{}' is not followed by ':', '>' or '-'", label.trim()),
                                line,
                            )
                            .with_column(column));
                        }
                        self.bump();
                        break;
                    }
                    Some(c @ ('>' | ':' | '-')) => {
                        let label = self.src[label_start..self.pos].to_string();
                        self.bump();
                        let delimiter = match c {
                            '>' => Delimiter::TypeTag,
                            ':' => Delimiter::Value,
                            _ => Delimiter::Item,
                        };
                        if delimiter != Delimiter::TypeTag {
                            self.skip_separator();
                        }
                        return Ok(Token {
                            margin: margin.to_string(),
                            label,
                            delimiter,
                            line,
                            column,
                        });
                    }
                    Some(_) => self.bump(),
                }
            }
        }
    }

    /// Look at the next token without consuming it.
    pub fn peek_token(&mut self) -> TtResult<&Token> {
        let token = match self.peeked.take() {
            Some(token) => token,
            None => self.next_token()?,
        };
        Ok(self.peeked.insert(token))
    }

    /// Push a token back so the next call to [`Lexer::next_token`] returns it.
    pub fn unread(&mut self, token: Token) {
        debug_assert!(self.peeked.is_none(), "only one token can be pushed back");
        self.peeked = Some(token);
    }

    /// Consume the rest of the current line, without its line feed.
    pub fn read_line(&mut self) -> &'a str {
        debug_assert!(self.peeked.is_none(), "read_line with a pushed-back token");
        let start = self.pos;
        let end = self.src[start..]
            .find('\n')
            .map_or(self.src.len(), |offset| start + offset);
        let text = &self.src[start..end];
        self.column += text.chars().count();
        self.pos = end;
        if self.pos < self.src.len() {
            self.bump();
        }
        text
    }

    /// The rest of the current line, without consuming it.
    pub fn peek_line(&self) -> Option<&'a str> {
        if self.pos >= self.src.len() {
            return None;
        }
        let rest = &self.src[self.pos..];
        Some(rest.split('\n').next().unwrap_or(rest))
    }

    /// Skip a value block that belongs to a field at `margin`: the rest of
    /// the current line, then every following line that is blank, indented
    /// deeper than `margin`, or a list item marker at `margin`.
    pub fn skip_block(&mut self, margin: &str) {
        if let Some(token) = self.peeked.take() {
            // The token's characters are already consumed from the source.
            if token.delimiter == Delimiter::End {
                self.peeked = Some(token);
                return;
            }
        }
        self.read_line();
        while let Some(line) = self.peek_line() {
            let content = line.trim_start_matches(|c: char| c == ' ' || c == '\t');
            let indent = line.len() - content.len();
            let belongs = content.trim().is_empty()
                || indent > margin.len()
                || (indent == margin.len() && content.starts_with('-'));
            if !belongs {
                break;
            }
            self.read_line();
        }
    }

    fn skip_separator(&mut self) {
        match self.current() {
            Some('\n') | None => {}
            Some(_) => self.bump(),
        }
    }

    fn current(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) {
        if let Some(c) = self.current() {
            self.pos += c.len_utf8();
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }
}
