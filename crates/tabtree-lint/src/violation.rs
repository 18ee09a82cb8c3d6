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

//! Constraint violation types

use tabtree_core::NodeId;

/// Severity level for violations
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Might be an issue; the document can still be written
    Warning,
    /// The document breaks a declared constraint
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A constraint violation found on one node
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintViolation {
    severity: Severity,
    node: NodeId,
    /// Where the node lives, e.g. `shop.tt#/entities/Order`
    location: String,
    field: Option<String>,
    message: String,
    rule_id: String,
}

impl ConstraintViolation {
    pub fn new(
        severity: Severity,
        node: NodeId,
        message: impl Into<String>,
        rule_id: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            node,
            location: String::new(),
            field: None,
            message: message.into(),
            rule_id: rule_id.into(),
        }
    }

    pub fn error(node: NodeId, message: impl Into<String>, rule_id: impl Into<String>) -> Self {
        Self::new(Severity::Error, node, message, rule_id)
    }

    pub fn warning(node: NodeId, message: impl Into<String>, rule_id: impl Into<String>) -> Self {
        Self::new(Severity::Warning, node, message, rule_id)
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn rule_id(&self) -> &str {
        &self.rule_id
    }
}

impl std::fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.location.is_empty() {
            write!(f, "{}: ", self.location)?;
        }
        write!(f, "[{}] {}: ", self.rule_id, self.severity)?;
        if let Some(ref field) = self.field {
            write!(f, "{}: ", field)?;
        }
        write!(f, "{}", self.message)
    }
}

/// True when any violation is an error.
pub fn has_errors(violations: &[ConstraintViolation]) -> bool {
    violations.iter().any(|v| v.severity == Severity::Error)
}
