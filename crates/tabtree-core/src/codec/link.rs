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

//! Link codec: references are written as path strings and read back
//! without being resolved.

use super::scalar::NULL;
use super::{Reader, Writer};
use crate::error::{TtError, TtResult};
use crate::graph::{check_pattern, is_cross_file};
use crate::lex::Delimiter;
use crate::schema::LinkSchema;
use crate::value::{Link, Value};

impl Reader<'_, '_> {
    pub(super) fn read_link(&mut self, text: &str, decl: &LinkSchema, property: &str) -> Link {
        let path = text.trim();
        if path.is_empty() || path == NULL {
            return Link::default();
        }
        check_pattern(decl, property, path);
        if is_cross_file(path) {
            self.external.push(path.to_string());
        }
        Link::from_path(path)
    }

    pub(super) fn read_link_list(
        &mut self,
        decl: &LinkSchema,
        property: &str,
        margin: &str,
    ) -> TtResult<Value> {
        let line = self.lexer.line();
        let rest = self.lexer.read_line().trim();
        if !rest.is_empty() && rest != NULL {
            return Err(TtError::syntax(
                format!("link list items must start on the next line, found '{}'", rest),
                line,
            ));
        }
        let mut links = Vec::new();
        loop {
            let token = self.lexer.next_token()?;
            if token.delimiter != Delimiter::Item || token.margin.len() != margin.len() {
                self.lexer.unread(token);
                break;
            }
            let text = self.lexer.read_line();
            let link = self.read_link(text, decl, property);
            if !link.is_unset() {
                links.push(link);
            }
        }
        Ok(Value::LinkList(links))
    }
}

impl Writer<'_> {
    pub(super) fn write_paths(&mut self, name: &str, paths: &[String], margin: &str) {
        if paths.is_empty() {
            return;
        }
        self.field_header(margin, name);
        self.out.push('\n');
        for path in paths {
            self.out.push_str(margin);
            self.out.push_str("-\t");
            self.out.push_str(path);
            self.out.push('\n');
        }
    }
}
