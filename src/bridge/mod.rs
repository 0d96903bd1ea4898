// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The bridge scheduler.
//!
//! A [`Bridge`] owns everything: the RPC client, the channel table, and
//! the health aggregator. [`Bridge::run`] drives it all from one task:
//! after the startup delay the channels are armed, then a coarse tick
//! checks poll deadlines in slot order and bus writes and console
//! commands arriving through the [`BridgeHandle`] are handled inline
//! between polls. Because every RPC exchange is awaited before the next
//! channel is considered, no two exchanges ever overlap and the shared
//! health masks are only touched from this one task.
//!
//! # Examples
//!
//! ```no_run
//! use ccu_bridge::{Bridge, BridgeConfig, BusWrite, ChannelConfig};
//!
//! # async fn example() -> ccu_bridge::Result<()> {
//! let config = BridgeConfig::new("192.168.1.20", 2001)
//!     .with_channel(ChannelConfig::thermostat("OEQ0123456").with_write_enabled());
//!
//! let (bridge, handle) = Bridge::new(config)?;
//! tokio::spawn(bridge.run());
//!
//! handle.write(0, BusWrite::SetTargetTemperature(21.5)).await?;
//! println!("{}", handle.command("hm01").await?);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, MissedTickBehavior, interval, sleep};
use tracing::{debug, info};

use crate::bus::Datapoint;
use crate::channel::Channel;
use crate::config::BridgeConfig;
use crate::console;
use crate::error::{Error, Result};
use crate::health::{GROUPS, GroupAlarms, HealthAggregator};
use crate::rpc::RpcClient;
use crate::variant::BusWrite;

/// Capacity of the handle-to-scheduler request queue.
const REQUEST_QUEUE: usize = 32;

/// A request forwarded from a [`BridgeHandle`] to the scheduler task.
#[derive(Debug)]
enum Request {
    Write {
        channel: usize,
        write: BusWrite,
        reply: oneshot::Sender<Result<()>>,
    },
    Command {
        line: String,
        reply: oneshot::Sender<String>,
    },
}

/// The bus datapoints one channel publishes, cloned out for consumers.
#[derive(Debug, Clone)]
pub struct ChannelDatapoints {
    reachable: Arc<Datapoint>,
    battery_low: Arc<Datapoint>,
    signal_quality: Arc<Datapoint>,
    outputs: Vec<Arc<Datapoint>>,
}

impl ChannelDatapoints {
    /// Reachability of the device, published after every poll cycle.
    #[must_use]
    pub fn reachable(&self) -> &Arc<Datapoint> {
        &self.reachable
    }

    /// The device's battery-low state.
    #[must_use]
    pub fn battery_low(&self) -> &Arc<Datapoint> {
        &self.battery_low
    }

    /// Combined signal quality in percent, or 255 when unknown.
    #[must_use]
    pub fn signal_quality(&self) -> &Arc<Datapoint> {
        &self.signal_quality
    }

    /// The device-type specific datapoints, in variant order.
    #[must_use]
    pub fn outputs(&self) -> &[Arc<Datapoint>] {
        &self.outputs
    }

    /// Finds a device-type datapoint by its bus name.
    #[must_use]
    pub fn output(&self, name: &str) -> Option<&Arc<Datapoint>> {
        self.outputs.iter().find(|dp| dp.name() == name)
    }
}

/// The polling bridge: channel table, RPC client, and health engine.
///
/// Built together with its [`BridgeHandle`]; normally consumed by
/// [`Bridge::run`] on a spawned task. The stepping methods
/// ([`arm`](Self::arm), [`tick`](Self::tick),
/// [`handle_bus_write`](Self::handle_bus_write),
/// [`process_command`](Self::process_command)) are public so the bridge
/// can also be driven directly, without the scheduler loop.
#[derive(Debug)]
pub struct Bridge {
    client: RpcClient,
    channels: Vec<Channel>,
    health: HealthAggregator,
    startup_delay: Duration,
    tick_period: Duration,
    requests: mpsc::Receiver<Request>,
}

impl Bridge {
    /// Builds a bridge and its handle from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::error::ValueError`] when the configuration fails
    /// validation and an [`crate::error::RpcError`] when the HTTP client
    /// cannot be constructed.
    pub fn new(config: BridgeConfig) -> Result<(Self, BridgeHandle)> {
        config.validate()?;
        let client = RpcClient::with_timeout(config.host.clone(), config.port, config.timeout)
            .map_err(Error::Rpc)?;

        let channels: Vec<Channel> = config
            .channels
            .iter()
            .enumerate()
            .map(|(index, channel)| {
                Channel::new(
                    index,
                    channel,
                    config.poll_interval,
                    config.short_poll_interval,
                )
            })
            .collect();

        let health = HealthAggregator::new(group_masks(&config));

        let datapoints = channels
            .iter()
            .map(|channel| ChannelDatapoints {
                reachable: channel.reachable().clone(),
                battery_low: channel.battery_low().clone(),
                signal_quality: channel.signal_quality().clone(),
                outputs: channel.variant().datapoints(),
            })
            .collect();
        let alarms = (0..GROUPS).map(|group| health.alarms(group).clone()).collect();

        let (tx, rx) = mpsc::channel(REQUEST_QUEUE);
        let bridge = Self {
            client,
            channels,
            health,
            startup_delay: config.startup_delay,
            tick_period: config.tick_period,
            requests: rx,
        };
        let handle = BridgeHandle {
            requests: tx,
            datapoints,
            alarms,
        };
        Ok((bridge, handle))
    }

    /// The channel table, in slot order.
    #[must_use]
    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    /// The health aggregation engine.
    #[must_use]
    pub fn health(&self) -> &HealthAggregator {
        &self.health
    }

    /// Arms every active channel for polling.
    ///
    /// Called by [`run`](Self::run) once the startup delay has elapsed.
    pub fn arm(&mut self, now: Instant) {
        info!(channels = self.channels.len(), "arming channels");
        for channel in &mut self.channels {
            channel.arm(now);
        }
    }

    /// Runs one scheduling tick: polls every channel whose deadline has
    /// passed, in slot order.
    pub async fn tick(&mut self, now: Instant) {
        for index in 0..self.channels.len() {
            if self.channels[index].is_due(now) {
                self.channels[index].poll(&self.client, &mut self.health).await;
            }
        }
    }

    /// Handles one bus write directed at a channel.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelNotFound`] for an out-of-range index,
    /// encode failures, and the first rejected RPC call. Writes to
    /// inactive or read-only channels are dropped silently (`Ok`).
    pub async fn handle_bus_write(&mut self, channel: usize, write: &BusWrite) -> Result<()> {
        let Some(slot) = self.channels.get_mut(channel) else {
            return Err(Error::ChannelNotFound(channel));
        };
        slot.handle_write(write, &self.client, &mut self.health).await
    }

    /// Handles one console command line, returning the response text.
    pub async fn process_command(&self, line: &str) -> String {
        console::process(line, &self.channels, &self.client).await
    }

    /// Runs the scheduler until every [`BridgeHandle`] is dropped.
    ///
    /// Sleeps through the startup delay, arms the channels, then
    /// alternates between deadline ticks and queued requests. Requests are
    /// handled to completion inline; a write may block the next tick for
    /// the duration of its RPC exchange, by design of the single-task
    /// model.
    pub async fn run(mut self) {
        info!(delay = ?self.startup_delay, "bridge starting");
        sleep(self.startup_delay).await;
        self.arm(Instant::now());

        let mut ticker = interval(self.tick_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick(Instant::now()).await;
                }
                request = self.requests.recv() => {
                    match request {
                        Some(request) => self.handle_request(request).await,
                        None => break,
                    }
                }
            }
        }
        info!("bridge stopped, all handles dropped");
    }

    async fn handle_request(&mut self, request: Request) {
        match request {
            Request::Write {
                channel,
                write,
                reply,
            } => {
                debug!(channel, write = write.name(), "bus write request");
                let result = self.handle_bus_write(channel, &write).await;
                let _ = reply.send(result);
            }
            Request::Command { line, reply } => {
                let _ = reply.send(self.process_command(&line).await);
            }
        }
    }
}

/// Builds the six group membership masks from the channel configuration.
///
/// Group 0 holds every active channel; groups 1 through 5 collect the
/// channels that name them.
fn group_masks(config: &BridgeConfig) -> [u64; GROUPS] {
    let mut masks = [0u64; GROUPS];
    for (index, channel) in config.channels.iter().enumerate() {
        if !channel.is_active() {
            continue;
        }
        let bit = 1u64 << index;
        masks[0] |= bit;
        for group in &channel.groups {
            masks[*group] |= bit;
        }
    }
    masks
}

/// Cloneable front door to a running [`Bridge`].
///
/// Carries the request queue plus cloned datapoint handles, so consumers
/// can read bridge outputs without going through the scheduler task.
#[derive(Debug, Clone)]
pub struct BridgeHandle {
    requests: mpsc::Sender<Request>,
    datapoints: Vec<ChannelDatapoints>,
    alarms: Vec<GroupAlarms>,
}

impl BridgeHandle {
    /// Forwards one bus write to the scheduler and waits for its outcome.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotRunning`] when the bridge task has stopped,
    /// otherwise whatever [`Bridge::handle_bus_write`] returned.
    pub async fn write(&self, channel: usize, write: BusWrite) -> Result<()> {
        let (reply, response) = oneshot::channel();
        self.requests
            .send(Request::Write {
                channel,
                write,
                reply,
            })
            .await
            .map_err(|_| Error::NotRunning)?;
        response.await.map_err(|_| Error::NotRunning)?
    }

    /// Runs one console command on the scheduler task.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotRunning`] when the bridge task has stopped.
    pub async fn command(&self, line: impl Into<String>) -> Result<String> {
        let (reply, response) = oneshot::channel();
        self.requests
            .send(Request::Command {
                line: line.into(),
                reply,
            })
            .await
            .map_err(|_| Error::NotRunning)?;
        response.await.map_err(|_| Error::NotRunning)
    }

    /// The datapoints published for one channel.
    #[must_use]
    pub fn datapoints(&self, channel: usize) -> Option<&ChannelDatapoints> {
        self.datapoints.get(channel)
    }

    /// The alarm datapoints of one health group (0 through 5).
    #[must_use]
    pub fn group_alarms(&self, group: usize) -> &GroupAlarms {
        &self.alarms[group]
    }
}
