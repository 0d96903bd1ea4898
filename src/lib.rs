// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `ccu_bridge` - A Rust library bridging HomeMatic CCU devices onto a
//! KNX-style automation bus.
//!
//! The CCU hub exposes its devices only through a text-based XML-RPC
//! interface over HTTP POST; there is no push channel. This library polls
//! the hub on a schedule, decodes device parameters into typed bus
//! datapoints, and forwards bus writes back to the hub as `setValue`
//! calls.
//!
//! # Supported Features
//!
//! - **Polling**: per-channel deadlines, a short re-poll after accepted
//!   writes, staggered start after a configurable startup delay
//! - **Device types**: thermostats, switch actuators (with stairwell
//!   timing), and user-defined parameter slots
//! - **Health aggregation**: per-group unreachable/battery/error alarms
//!   with eager negatives and hold-back of the all-clear until every
//!   member has been polled once
//! - **Diagnostics**: radio signal quality from RSSI pairs, a console
//!   overview per channel, and a known-serials listing
//!
//! # Quick Start
//!
//! ```no_run
//! use ccu_bridge::{Bridge, BridgeConfig, BusWrite, ChannelConfig};
//!
//! #[tokio::main]
//! async fn main() -> ccu_bridge::Result<()> {
//!     let config = BridgeConfig::new("192.168.1.20", 2001)
//!         .with_channel(
//!             ChannelConfig::thermostat("OEQ0123456")
//!                 .with_write_enabled()
//!                 .with_groups([1]),
//!         )
//!         .with_channel(ChannelConfig::switch_actuator("LEQ0654321").with_write_enabled());
//!
//!     let (bridge, handle) = Bridge::new(config)?;
//!     tokio::spawn(bridge.run());
//!
//!     // Forward a bus write; the channel re-polls promptly to confirm
//!     handle.write(0, BusWrite::SetTargetTemperature(21.5)).await?;
//!
//!     // Read a decoded datapoint from any task
//!     if let Some(dp) = handle.datapoints(0).and_then(|d| d.output("temp_current")) {
//!         println!("current: {:?}", dp.read());
//!     }
//!
//!     // Group 0 aggregates the health of every active channel
//!     println!("unreachable: {:?}", handle.group_alarms(0).unreachable().read());
//!     Ok(())
//! }
//! ```
//!
//! # Driving the Bridge Directly
//!
//! The scheduler loop is a convenience; [`Bridge::arm`], [`Bridge::tick`],
//! [`Bridge::handle_bus_write`], and [`Bridge::process_command`] are
//! public, so a host application with its own loop can step the bridge
//! itself:
//!
//! ```no_run
//! use ccu_bridge::{Bridge, BridgeConfig, ChannelConfig};
//! use tokio::time::Instant;
//!
//! # async fn example() -> ccu_bridge::Result<()> {
//! let config = BridgeConfig::new("192.168.1.20", 2001)
//!     .with_channel(ChannelConfig::thermostat("OEQ0123456"));
//! let (mut bridge, _handle) = Bridge::new(config)?;
//!
//! bridge.arm(Instant::now());
//! loop {
//!     bridge.tick(Instant::now()).await;
//!     tokio::time::sleep(std::time::Duration::from_millis(100)).await;
//! }
//! # }
//! ```

pub mod bridge;
pub mod bus;
pub mod channel;
pub mod config;
mod console;
pub mod error;
pub mod health;
pub mod rpc;
pub mod types;
pub mod variant;

pub use bridge::{Bridge, BridgeHandle, ChannelDatapoints};
pub use bus::{Datapoint, DatapointValue};
pub use config::{BridgeConfig, ChannelConfig, DeviceKind, UserSlotConfig};
pub use error::{Error, ParseError, Result, RpcError, ValueError};
pub use health::{GroupAlarms, HealthAggregator};
pub use types::{AccessMask, RpcValue, SignalQuality, SlotKind};
pub use variant::{BusWrite, DeviceVariant};
