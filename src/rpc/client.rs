// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP transport for XML-RPC exchanges.
//!
//! One exchange is one POST of a request body to the hub's endpoint and one
//! parsed response. The hub expects `text/xml` in both directions and each
//! exchange runs on a fresh connection; the hub side closes after every
//! response anyway, so idle pooling is disabled.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{ACCEPT, CONNECTION, CONTENT_TYPE};
use tracing::{debug, error};

use crate::error::{Error, RpcError};
use crate::rpc::request::MethodCall;
use crate::rpc::response::{Member, ParsedResponse};
use crate::types::RpcValue;

/// XML-RPC client for one hub endpoint.
///
/// # Examples
///
/// ```no_run
/// use ccu_bridge::rpc::RpcClient;
///
/// # async fn example() -> ccu_bridge::Result<()> {
/// let client = RpcClient::new("192.168.1.20", 2001)?;
/// let members = client.get_paramset("OEQ0123456", 4).await?;
/// for member in members {
///     println!("{} = {:?}", member.name, member.value);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RpcClient {
    endpoint: String,
    client: reqwest::Client,
}

impl RpcClient {
    /// Default per-exchange timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a client for the given hub host and port with the default
    /// timeout.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::Http`] if the HTTP client cannot be created.
    pub fn new(host: impl Into<String>, port: u16) -> Result<Self, RpcError> {
        Self::with_timeout(host, port, Self::DEFAULT_TIMEOUT)
    }

    /// Creates a client with an explicit per-exchange timeout.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::Http`] if the HTTP client cannot be created.
    pub fn with_timeout(
        host: impl Into<String>,
        port: u16,
        timeout: Duration,
    ) -> Result<Self, RpcError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(0)
            .build()
            .map_err(RpcError::Http)?;
        Ok(Self {
            endpoint: format!("http://{}:{port}/", host.into()),
            client,
        })
    }

    /// The endpoint URL exchanges are POSTed to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Performs one request/response exchange.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::ConnectionFailed`] when the hub cannot be
    /// reached, [`RpcError::Http`] for other transport failures,
    /// [`RpcError::Status`] on a non-200 status, and a parse error when
    /// the 200 body is malformed. A fault response parses successfully;
    /// it surfaces through the accessors of the returned
    /// [`ParsedResponse`].
    pub async fn exchange(&self, call: &MethodCall) -> Result<ParsedResponse, Error> {
        debug!(call = %call, endpoint = %self.endpoint, "sending XML-RPC request");

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "text/xml")
            .header(ACCEPT, "text/xml")
            .header(CONNECTION, "close")
            .body(call.body())
            .send()
            .await
            .map_err(|err| {
                if err.is_connect() {
                    RpcError::ConnectionFailed(err.to_string())
                } else {
                    RpcError::Http(err)
                }
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            error!(method = %call.method(), status = status.as_u16(), "XML-RPC request failed");
            return Err(RpcError::Status(status.as_u16()).into());
        }

        let body = response.text().await.map_err(RpcError::Http)?;
        debug!(bytes = body.len(), "received XML-RPC response");
        Ok(ParsedResponse::parse(&body)?)
    }

    /// Reads the VALUES paramset of one device sub-channel.
    ///
    /// # Errors
    ///
    /// Transport and parse failures as in [`Self::exchange`]; additionally
    /// a fault or an empty member struct fail the read.
    pub async fn get_paramset(&self, serial: &str, sub_channel: u8) -> Result<Vec<Member>, Error> {
        self.exchange(&MethodCall::get_paramset(serial, sub_channel))
            .await?
            .struct_members()
    }

    /// Writes one typed parameter and checks the acknowledgment.
    ///
    /// # Errors
    ///
    /// Transport and parse failures as in [`Self::exchange`]; a fault
    /// response is a rejected write.
    pub async fn set_value(
        &self,
        serial: &str,
        sub_channel: u8,
        name: &str,
        value: impl Into<RpcValue>,
    ) -> Result<(), Error> {
        self.exchange(&MethodCall::set_value(serial, sub_channel, name, value))
            .await?
            .write_ack()
    }

    /// Fetches the hub's RSSI table and extracts the pair for one serial.
    ///
    /// # Errors
    ///
    /// Transport and parse failures as in [`Self::exchange`].
    pub async fn rssi_pair(&self, serial: &str) -> Result<Option<(i32, i32)>, Error> {
        self.exchange(&MethodCall::rssi_info())
            .await?
            .rssi_pair_for(serial)
    }

    /// Fetches a device description rendered as name/text pairs.
    ///
    /// # Errors
    ///
    /// Transport and parse failures as in [`Self::exchange`].
    pub async fn device_description(&self, serial: &str) -> Result<Vec<(String, String)>, Error> {
        self.exchange(&MethodCall::device_description(serial))
            .await?
            .description_pairs()
    }
}
