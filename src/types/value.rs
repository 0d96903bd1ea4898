// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed XML-RPC parameter values.
//!
//! The hub's protocol profile carries exactly four scalar kinds. This module
//! provides their typed representation together with the wire text forms
//! used when building requests:
//!
//! | Variant   | Wire tag    | Wire text            |
//! |-----------|-------------|----------------------|
//! | `Str`     | `string`    | verbatim             |
//! | `Double`  | `double`    | decimal, `.` point   |
//! | `Int`     | `i4`        | decimal              |
//! | `Bool`    | `boolean`   | `1` / `0`            |

use std::fmt;

use serde::{Deserialize, Serialize};

/// One typed XML-RPC parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RpcValue {
    /// A `<string>` parameter.
    Str(String),
    /// A `<double>` parameter.
    Double(f64),
    /// An `<i4>` (32-bit integer) parameter.
    Int(i32),
    /// A `<boolean>` parameter, serialized as `1` or `0`.
    Bool(bool),
}

impl RpcValue {
    /// The XML element name this value is wrapped in on the wire.
    #[must_use]
    pub fn wire_tag(&self) -> &'static str {
        match self {
            Self::Str(_) => "string",
            Self::Double(_) => "double",
            Self::Int(_) => "i4",
            Self::Bool(_) => "boolean",
        }
    }

    /// The text content placed inside the wire tag.
    ///
    /// Booleans serialize as `1`/`0`, the hub does not accept `true`/`false`.
    #[must_use]
    pub fn wire_text(&self) -> String {
        match self {
            Self::Str(s) => s.clone(),
            Self::Double(v) => format!("{v}"),
            Self::Int(i) => format!("{i}"),
            Self::Bool(b) => String::from(if *b { "1" } else { "0" }),
        }
    }

    /// Short kind name for logs and error messages.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Str(_) => "string",
            Self::Double(_) => "double",
            Self::Int(_) => "integer",
            Self::Bool(_) => "boolean",
        }
    }
}

impl fmt::Display for RpcValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "{s:?}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for RpcValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for RpcValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<f64> for RpcValue {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<i32> for RpcValue {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for RpcValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_tags() {
        assert_eq!(RpcValue::Str("X".into()).wire_tag(), "string");
        assert_eq!(RpcValue::Double(1.5).wire_tag(), "double");
        assert_eq!(RpcValue::Int(-5).wire_tag(), "i4");
        assert_eq!(RpcValue::Bool(true).wire_tag(), "boolean");
    }

    #[test]
    fn boolean_wire_text_is_numeric() {
        assert_eq!(RpcValue::Bool(true).wire_text(), "1");
        assert_eq!(RpcValue::Bool(false).wire_text(), "0");
    }

    #[test]
    fn double_wire_text() {
        assert_eq!(RpcValue::Double(21.5).wire_text(), "21.5");
        assert_eq!(RpcValue::Double(42.0).wire_text(), "42");
        assert_eq!(RpcValue::Double(-0.25).wire_text(), "-0.25");
    }

    #[test]
    fn int_wire_text() {
        assert_eq!(RpcValue::Int(0).wire_text(), "0");
        assert_eq!(RpcValue::Int(-130).wire_text(), "-130");
    }

    #[test]
    fn from_conversions() {
        assert_eq!(RpcValue::from("VALUES"), RpcValue::Str("VALUES".into()));
        assert_eq!(RpcValue::from(1.5), RpcValue::Double(1.5));
        assert_eq!(RpcValue::from(7), RpcValue::Int(7));
        assert_eq!(RpcValue::from(true), RpcValue::Bool(true));
    }
}
