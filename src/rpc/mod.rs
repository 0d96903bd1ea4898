// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! XML-RPC codec and transport for the hub interface.
//!
//! The hub speaks a line-oriented XML-RPC dialect over plain HTTP POST.
//! Requests and responses follow this shape:
//!
//! ```text
//! Request:  <methodCall><methodName>NAME</methodName><params>
//!              <param><value><TYPE>VALUE</TYPE></value></param>*
//!            </params></methodCall>
//! Success:  <methodResponse><params><param><value>
//!              [<struct><member><name>N</name><value><TYPE>V</TYPE></value></member>*</struct>]
//!            </value></param></params></methodResponse>
//! Fault:    <methodResponse><fault><value><struct>
//!              <member><name>faultCode</name><value><i4>C</i4></value></member>
//!              <member><name>faultString</name><value>S</value></member>
//!            </struct></value></fault></methodResponse>
//! ```
//!
//! Supported value types: `string`, `double`, `i4`, `boolean`.
//!
//! # Components
//!
//! - [`MethodCall`]: builds request bodies
//! - [`ParsedResponse`]: classifies responses into success, fault, or
//!   malformed and exposes the typed accessors decode runs on
//! - [`RpcClient`]: performs one blocking-style exchange per call over a
//!   fresh connection
//!
//! # Examples
//!
//! ```no_run
//! use ccu_bridge::rpc::{MethodCall, RpcClient};
//!
//! # async fn example() -> ccu_bridge::Result<()> {
//! let client = RpcClient::new("192.168.1.20", 2001)?;
//!
//! // Typed helper
//! client.set_value("OEQ0123456", 4, "SET_TEMPERATURE", 21.5).await?;
//!
//! // Raw exchange
//! let response = client.exchange(&MethodCall::rssi_info()).await?;
//! if let Some((device, peer)) = response.rssi_pair_for("OEQ0123456")? {
//!     println!("rssi: {device} / {peer}");
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod request;
mod response;
mod xml;

pub use client::RpcClient;
pub use request::MethodCall;
pub use response::{Member, MemberValue, ParsedResponse};
