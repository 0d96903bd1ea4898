// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! XML-RPC method call construction.
//!
//! A [`MethodCall`] assembles the single-line request body the hub expects:
//! method name followed by an ordered list of typed parameters. Device
//! addresses serialize as `SERIAL:SUBCHANNEL`, with the sub-channel part
//! omitted for device-scoped methods.
//!
//! Parameter text is embedded verbatim. This protocol profile performs no
//! entity escaping in either direction, so callers must not pass markup
//! metacharacters (`<`, `>`, `&`) in serials or parameter names; in
//! practice both are plain identifiers.

use crate::types::RpcValue;

/// One XML-RPC method call under construction.
///
/// # Examples
///
/// ```
/// use ccu_bridge::rpc::MethodCall;
///
/// let call = MethodCall::get_paramset("OEQ0123456", 4);
/// assert_eq!(call.method(), "getParamset");
/// assert!(call.body().contains("<string>OEQ0123456:4</string>"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    method: String,
    params: Vec<RpcValue>,
}

impl MethodCall {
    /// Starts a call to the given method with no parameters.
    #[must_use]
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            params: Vec::new(),
        }
    }

    /// Appends one typed parameter.
    #[must_use]
    pub fn param(mut self, value: impl Into<RpcValue>) -> Self {
        self.params.push(value.into());
        self
    }

    /// Appends a device address parameter.
    ///
    /// With `Some(sub)` the address is `serial:sub`; with `None` the bare
    /// serial is sent (used by device-scoped methods).
    #[must_use]
    pub fn address(self, serial: &str, sub_channel: Option<u8>) -> Self {
        match sub_channel {
            Some(sub) => self.param(format!("{serial}:{sub}")),
            None => self.param(serial),
        }
    }

    /// A `getParamset` call for the VALUES paramset of one sub-channel.
    #[must_use]
    pub fn get_paramset(serial: &str, sub_channel: u8) -> Self {
        Self::new("getParamset")
            .address(serial, Some(sub_channel))
            .param("VALUES")
    }

    /// A `setValue` call writing one typed parameter of one sub-channel.
    #[must_use]
    pub fn set_value(serial: &str, sub_channel: u8, name: &str, value: impl Into<RpcValue>) -> Self {
        Self::new("setValue")
            .address(serial, Some(sub_channel))
            .param(name)
            .param(value)
    }

    /// An `rssiInfo` call; takes no parameters.
    #[must_use]
    pub fn rssi_info() -> Self {
        Self::new("rssiInfo")
    }

    /// A `getDeviceDescription` call for a bare device serial.
    #[must_use]
    pub fn device_description(serial: &str) -> Self {
        Self::new("getDeviceDescription").address(serial, None)
    }

    /// The method name.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The ordered parameter list.
    #[must_use]
    pub fn params(&self) -> &[RpcValue] {
        &self.params
    }

    /// Renders the single-line request body.
    #[must_use]
    pub fn body(&self) -> String {
        let mut body = String::from("<methodCall><methodName>");
        body.push_str(&self.method);
        body.push_str("</methodName><params>");
        for param in &self.params {
            let tag = param.wire_tag();
            body.push_str(&format!(
                "<param><value><{tag}>{}</{tag}></value></param>",
                param.wire_text()
            ));
        }
        body.push_str("</params></methodCall>");
        body
    }
}

impl std::fmt::Display for MethodCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}(", self.method)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{param}")?;
        }
        write!(f, ")")
    }
}
