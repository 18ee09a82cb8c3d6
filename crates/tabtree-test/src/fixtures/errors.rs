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

//! Invalid documents for reader error testing.

use tabtree_core::TtErrorKind;

/// Invalid metamodel texts with the error kind reading them must raise.
pub fn invalid_samples() -> Vec<(&'static str, &'static str, TtErrorKind)> {
    vec![
        ("empty", "", TtErrorKind::Syntax),
        ("missing_type_tag", "name:\tshop\n", TtErrorKind::Syntax),
        ("unterminated_label", "Model", TtErrorKind::Syntax),
        ("trailing_after_tag", "Model> extra\n", TtErrorKind::Syntax),
        ("unknown_type", "Widget>\n", TtErrorKind::UnknownType),
        ("abstract_type", "NamedElement>\n", TtErrorKind::UnknownType),
        (
            "wrong_element_type",
            "Model>\nentities:\t\n-\tRole>\n",
            TtErrorKind::UnknownType,
        ),
        (
            "deeper_sibling",
            "Model>\nname:\tshop\n\tdescription:\tx\n",
            TtErrorKind::Margin,
        ),
        ("bad_integer", "Model>\nversion:\tmany\n", TtErrorKind::Syntax),
        (
            "bad_boolean",
            "Entity>\nabstract_entity:\tmaybe\n",
            TtErrorKind::Syntax,
        ),
        (
            "inline_list",
            "Enumeration>\nliterals:\tOpen\n",
            TtErrorKind::Syntax,
        ),
        (
            "dangling_continuation",
            "Model>\ndescription:\tline\\",
            TtErrorKind::Syntax,
        ),
        (
            "continuation_margin",
            "Model>\ndescription:\tline\\\nnext\n",
            TtErrorKind::Margin,
        ),
        ("two_roots", "Model>\nModel>\n", TtErrorKind::Syntax),
    ]
}

/// Texts that read successfully although they are not canonical.
pub fn lenient_samples() -> Vec<(&'static str, &'static str)> {
    vec![
        ("blank_lines", "Model>\n\nname:\tshop\n\n\nversion:\t2\n"),
        ("unknown_field", "Model>\nname:\tshop\nowner:\tnobody\n"),
        (
            "unknown_block",
            "Model>\nlegacy:\t\n-\tOld>\n\tx:\t1\n-\tOld>\nname:\tshop\n",
        ),
        ("unknown_enum_constant", "Attribute>\ndatatype:\tDecimal\n"),
        ("explicit_null_list", "Model>\nentities:\tnull\n"),
        ("repeated_field", "Model>\nname:\tfirst\nname:\tsecond\n"),
    ]
}
