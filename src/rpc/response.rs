// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parsing and classification of hub responses.
//!
//! Every exchange ends in one of three outcomes:
//!
//! - **Success** - `methodResponse/params/param/value` is present; poll
//!   responses carry a `struct` of named members below it, write
//!   acknowledgments carry an empty value.
//! - **Fault** - `methodResponse/fault` is present; the hub understood the
//!   request and rejected it. Code and message are extracted when the fault
//!   struct carries them.
//! - **Malformed** - the body does not parse, is not rooted in
//!   `methodResponse`, or carries neither `params` nor `fault`. Surfaces as
//!   a [`ParseError`].
//!
//! Struct members decode into the three recognized scalar kinds. A member
//! whose value carries any other kind is skipped with a trace, never an
//! error; the remaining members still decode.

use tracing::trace;

use crate::error::{Error, ParseError, RpcError};
use crate::rpc::xml::Element;

/// One decoded struct member of a poll response.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    /// The hub-side parameter name, e.g. `SET_TEMPERATURE`.
    pub name: String,
    /// The decoded value.
    pub value: MemberValue,
}

/// The recognized scalar kinds a struct member can carry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MemberValue {
    /// A `<double>` member.
    Double(f64),
    /// An `<i4>` member.
    Int(i32),
    /// A `<boolean>` member.
    Bool(bool),
}

impl MemberValue {
    /// Short kind name for logs.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Double(_) => "double",
            Self::Int(_) => "i4",
            Self::Bool(_) => "boolean",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct FaultInfo {
    code: Option<i32>,
    message: Option<String>,
}

/// A parsed, classified `methodResponse` document.
///
/// Constructed from a response body via [`ParsedResponse::parse`]; the
/// accessors then answer the questions the poll and write paths ask.
#[derive(Debug, Clone)]
pub struct ParsedResponse {
    root: Element,
    fault: Option<FaultInfo>,
}

impl ParsedResponse {
    /// Parses and classifies a response body.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] when the body is malformed: unparseable
    /// markup, a root other than `methodResponse`, or neither `params` nor
    /// `fault` below it. A fault response parses successfully; it is
    /// reported by the accessors.
    pub fn parse(body: &str) -> Result<Self, ParseError> {
        let root = Element::parse(body)?;
        if root.name() != "methodResponse" {
            return Err(ParseError::NotMethodResponse);
        }

        let fault = root.child("fault").map(extract_fault);
        if fault.is_none() && root.child("params").is_none() {
            return Err(ParseError::EmptyResponse);
        }

        Ok(Self { root, fault })
    }

    /// Whether the hub rejected the request with a fault.
    #[must_use]
    pub fn is_fault(&self) -> bool {
        self.fault.is_some()
    }

    /// The fault as an [`RpcError`], when present.
    #[must_use]
    pub fn fault_error(&self) -> Option<RpcError> {
        self.fault.as_ref().map(|f| RpcError::Fault {
            code: f.code,
            message: f.message.clone(),
        })
    }

    fn ensure_no_fault(&self) -> Result<(), Error> {
        match self.fault_error() {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }

    /// Navigates to the canonical success value element.
    fn success_value(&self) -> Result<&Element, ParseError> {
        let mut current = &self.root;
        for step in ["params", "param", "value"] {
            current = current
                .child(step)
                .ok_or_else(|| ParseError::MissingElement(step.to_string()))?;
        }
        Ok(current)
    }

    /// Checks a `setValue` acknowledgment.
    ///
    /// Success is the presence of the canonical value element with no fault;
    /// the value's content is irrelevant.
    ///
    /// # Errors
    ///
    /// Returns the fault as [`RpcError::Fault`], or a [`ParseError`] when
    /// the canonical path is incomplete.
    pub fn write_ack(&self) -> Result<(), Error> {
        self.ensure_no_fault()?;
        self.success_value()?;
        Ok(())
    }

    /// Decodes the member list of a poll response.
    ///
    /// Members with unrecognized value kinds are skipped with a trace.
    ///
    /// # Errors
    ///
    /// Returns the fault as [`RpcError::Fault`]; [`ParseError::NoMembers`]
    /// when the struct holds no member elements at all; other
    /// [`ParseError`]s when the canonical path is incomplete or a
    /// recognized kind fails to parse.
    pub fn struct_members(&self) -> Result<Vec<Member>, Error> {
        self.ensure_no_fault()?;
        let value = self.success_value()?;
        let strukt = value
            .child("struct")
            .ok_or_else(|| ParseError::MissingElement("struct".to_string()))?;

        let mut members = Vec::new();
        let mut seen = 0usize;
        for member in strukt.children("member") {
            seen += 1;
            if let Some(decoded) = decode_member(member)? {
                members.push(decoded);
            }
        }
        if seen == 0 {
            return Err(ParseError::NoMembers.into());
        }
        Ok(members)
    }

    /// Extracts the device/peer RSSI pair for one device serial from an
    /// `rssiInfo` response.
    ///
    /// The response lists one member per known device, keyed by serial; the
    /// matching member's first partner entry carries the pair as a two-value
    /// integer array. Returns `Ok(None)` when the serial is not listed.
    ///
    /// # Errors
    ///
    /// Returns the fault as [`RpcError::Fault`], or a [`ParseError`] when
    /// the matched member does not carry the documented array shape.
    pub fn rssi_pair_for(&self, serial: &str) -> Result<Option<(i32, i32)>, Error> {
        self.ensure_no_fault()?;
        let value = self.success_value()?;
        let strukt = value
            .child("struct")
            .ok_or_else(|| ParseError::MissingElement("struct".to_string()))?;

        for member in strukt.children("member") {
            let name = member
                .child("name")
                .ok_or_else(|| ParseError::MissingElement("member/name".to_string()))?;
            if name.text() != serial {
                continue;
            }

            let partner = member
                .path(&["value", "struct", "member"])
                .ok_or_else(|| ParseError::MissingElement("member/value/struct/member".to_string()))?;
            let data = partner
                .path(&["value", "array", "data"])
                .ok_or_else(|| ParseError::MissingElement("member/value/array/data".to_string()))?;

            let mut values = data.children("value");
            let first = values
                .next()
                .ok_or_else(|| ParseError::MissingElement("array/data/value[0]".to_string()))?;
            let second = values
                .next()
                .ok_or_else(|| ParseError::MissingElement("array/data/value[1]".to_string()))?;

            let device = parse_i4(first, "rssi device half")?;
            let peer = parse_i4(second, "rssi peer half")?;
            return Ok(Some((device, peer)));
        }
        Ok(None)
    }

    /// Renders the members of a `getDeviceDescription` response as
    /// name/text pairs for display.
    ///
    /// Scalar members render their text; container members render as their
    /// kind in brackets.
    ///
    /// # Errors
    ///
    /// Returns the fault as [`RpcError::Fault`], or a [`ParseError`] when
    /// the canonical struct is missing or empty.
    pub fn description_pairs(&self) -> Result<Vec<(String, String)>, Error> {
        self.ensure_no_fault()?;
        let value = self.success_value()?;
        let strukt = value
            .child("struct")
            .ok_or_else(|| ParseError::MissingElement("struct".to_string()))?;

        let mut pairs = Vec::new();
        for member in strukt.children("member") {
            let (Some(name), Some(value)) = (member.child("name"), member.child("value")) else {
                continue;
            };
            pairs.push((name.text().to_string(), render_value(value)));
        }
        if pairs.is_empty() {
            return Err(ParseError::NoMembers.into());
        }
        Ok(pairs)
    }
}

fn extract_fault(fault: &Element) -> FaultInfo {
    let mut info = FaultInfo {
        code: None,
        message: None,
    };
    let Some(strukt) = fault.path(&["value", "struct"]) else {
        return info;
    };
    for member in strukt.children("member") {
        let (Some(name), Some(value)) = (member.child("name"), member.child("value")) else {
            continue;
        };
        match name.text() {
            "faultCode" => {
                info.code = value
                    .child("i4")
                    .and_then(|i4| i4.text().parse().ok());
            }
            "faultString" => {
                // the hub sends the message as bare value text, without a
                // string wrapper
                let text = value
                    .child("string")
                    .map_or_else(|| value.text(), Element::text);
                info.message = Some(text.to_string());
            }
            _ => {}
        }
    }
    info
}

/// Decodes one member into a recognized kind, or skips it.
fn decode_member(member: &Element) -> Result<Option<Member>, ParseError> {
    let name = member
        .child("name")
        .ok_or_else(|| ParseError::MissingElement("member/name".to_string()))?
        .text()
        .to_string();
    let value = member
        .child("value")
        .ok_or_else(|| ParseError::MissingElement("member/value".to_string()))?;

    if let Some(double) = value.child("double") {
        let parsed = double.text().parse().map_err(|_| ParseError::InvalidValue {
            field: name.clone(),
            message: format!("invalid double: {:?}", double.text()),
        })?;
        return Ok(Some(Member {
            name,
            value: MemberValue::Double(parsed),
        }));
    }
    if let Some(i4) = value.child("i4") {
        let parsed = i4.text().parse().map_err(|_| ParseError::InvalidValue {
            field: name.clone(),
            message: format!("invalid i4: {:?}", i4.text()),
        })?;
        return Ok(Some(Member {
            name,
            value: MemberValue::Int(parsed),
        }));
    }
    if let Some(boolean) = value.child("boolean") {
        let parsed = match boolean.text() {
            "1" | "true" => true,
            "0" | "false" => false,
            other => {
                return Err(ParseError::InvalidValue {
                    field: name,
                    message: format!("invalid boolean: {other:?}"),
                });
            }
        };
        return Ok(Some(Member {
            name,
            value: MemberValue::Bool(parsed),
        }));
    }

    let kind = value.first_child().map_or("none", Element::name);
    trace!(member = %name, kind = %kind, "skipping member with unrecognized value kind");
    Ok(None)
}

/// Parses the `i4` child of a value element.
fn parse_i4(value: &Element, context: &str) -> Result<i32, ParseError> {
    let i4 = value
        .child("i4")
        .ok_or_else(|| ParseError::MissingElement(format!("{context}/i4")))?;
    i4.text().parse().map_err(|_| ParseError::InvalidValue {
        field: context.to_string(),
        message: format!("invalid i4: {:?}", i4.text()),
    })
}

/// Display rendering for description members.
fn render_value(value: &Element) -> String {
    match value.first_child() {
        None => value.text().to_string(),
        Some(scalar)
            if matches!(scalar.name(), "string" | "double" | "i4" | "boolean") =>
        {
            scalar.text().to_string()
        }
        Some(container) => format!("[{}]", container.name()),
    }
}
