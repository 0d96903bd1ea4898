// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `ccu_bridge` library.
//!
//! This module provides a comprehensive error hierarchy for handling failures
//! across the library: value and configuration validation, XML-RPC transport,
//! response parsing, and bridge operations.

use thiserror::Error;

/// The main error type for this library.
///
/// This enum encompasses all possible errors that can occur when bridging
/// hub devices onto the bus.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value or configuration validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error occurred during an XML-RPC exchange.
    #[error("rpc error: {0}")]
    Rpc(#[from] RpcError),

    /// Error occurred while parsing a response document.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Channel index does not exist in the bridge.
    #[error("channel {0} not found")]
    ChannelNotFound(usize),

    /// The bridge task has stopped and no longer accepts requests.
    #[error("bridge is not running")]
    NotRunning,
}

/// Errors related to value validation and configuration constraints.
///
/// These errors occur when attempting to create constrained types or
/// bridge configurations with invalid values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// More channels were configured than the health engine can track.
    #[error("channel count {actual} exceeds maximum {max}")]
    TooManyChannels {
        /// Maximum supported channel count.
        max: usize,
        /// The configured channel count.
        actual: usize,
    },

    /// A device serial number is empty or contains separator characters.
    #[error("invalid serial number: {0:?}")]
    InvalidSerial(String),

    /// A user-defined slot index is outside the slot table.
    #[error("slot index {actual} is out of range [0, {max}]")]
    SlotOutOfRange {
        /// Highest valid slot index.
        max: usize,
        /// The index that was provided.
        actual: usize,
    },

    /// A user-defined slot is not configured for the requested operation.
    #[error("slot {index} does not allow {operation}")]
    SlotAccessDenied {
        /// The slot index.
        index: usize,
        /// The denied operation, "read" or "write".
        operation: &'static str,
    },

    /// A write was issued with a value kind the slot does not take.
    #[error("slot {index} expects {expected}, got {actual}")]
    SlotKindMismatch {
        /// The slot index.
        index: usize,
        /// The value kind the slot is configured for.
        expected: &'static str,
        /// The kind of the submitted value.
        actual: &'static str,
    },

    /// A write request does not apply to the channel's device type.
    #[error("{device} device does not handle {write} writes")]
    WriteNotSupported {
        /// The device type of the channel.
        device: &'static str,
        /// The rejected write request.
        write: &'static str,
    },

    /// A health group number is outside the configurable range.
    #[error("group {actual} is out of range [1, {max}]")]
    GroupOutOfRange {
        /// Highest configurable group number.
        max: usize,
        /// The group number that was provided.
        actual: usize,
    },

    /// A duration field was configured as zero where a period is required.
    #[error("{field} must be greater than zero")]
    ZeroDuration {
        /// The configuration field name.
        field: &'static str,
    },
}

/// Errors related to the XML-RPC exchange with the hub.
///
/// Transport failures and method faults both end a poll cycle; they are
/// kept apart so callers can tell a dead hub from a complaining one.
#[derive(Debug, Error)]
pub enum RpcError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The hub answered with a non-200 status.
    #[error("HTTP status {0}")]
    Status(u16),

    /// Connection to the hub failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The hub returned a well-formed fault response.
    #[error("method fault (code {code:?}): {message:?}")]
    Fault {
        /// The `faultCode` member, when present.
        code: Option<i32>,
        /// The `faultString` member, when present.
        message: Option<String>,
    },
}

/// Errors related to parsing hub response documents.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The document ended inside a tag or element.
    #[error("unexpected end of document")]
    UnexpectedEof,

    /// A closing tag did not match the open element.
    #[error("mismatched closing tag: expected </{expected}>, found </{found}>")]
    MismatchedTag {
        /// Name of the element being closed.
        expected: String,
        /// Name found in the closing tag.
        found: String,
    },

    /// The document's markup is not well formed.
    #[error("malformed markup at byte {offset}: {message}")]
    Markup {
        /// Byte offset where parsing failed.
        offset: usize,
        /// What the parser expected.
        message: &'static str,
    },

    /// The document is not rooted in a `methodResponse` element.
    #[error("document root is not methodResponse")]
    NotMethodResponse,

    /// A required element is missing from the response.
    #[error("missing element in response: {0}")]
    MissingElement(String),

    /// The response carries neither a result nor a fault.
    #[error("response has neither params nor fault")]
    EmptyResponse,

    /// The result struct holds no members where at least one is required.
    #[error("response struct has no members")]
    NoMembers,

    /// Failed to parse a specific value.
    #[error("failed to parse {field}: {message}")]
    InvalidValue {
        /// The field that failed to parse.
        field: String,
        /// Description of the parsing failure.
        message: String,
    },
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_error_display() {
        let err = ValueError::TooManyChannels {
            max: 64,
            actual: 70,
        };
        assert_eq!(err.to_string(), "channel count 70 exceeds maximum 64");
    }

    #[test]
    fn error_from_value_error() {
        let value_err = ValueError::InvalidSerial(String::new());
        let err: Error = value_err.into();
        assert!(matches!(err, Error::Value(ValueError::InvalidSerial(_))));
    }

    #[test]
    fn parse_error_display() {
        let err = ParseError::MissingElement("params".to_string());
        assert_eq!(err.to_string(), "missing element in response: params");
    }

    #[test]
    fn fault_display_with_code() {
        let err = RpcError::Fault {
            code: Some(-1),
            message: Some("unknown method".to_string()),
        };
        let text = err.to_string();
        assert!(text.contains("-1"));
        assert!(text.contains("unknown method"));
    }

    #[test]
    fn error_from_parse_error() {
        let err: Error = ParseError::NoMembers.into();
        assert!(matches!(err, Error::Parse(ParseError::NoMembers)));
    }

    #[test]
    fn mismatched_tag_display() {
        let err = ParseError::MismatchedTag {
            expected: "value".to_string(),
            found: "member".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "mismatched closing tag: expected </value>, found </member>"
        );
    }
}
