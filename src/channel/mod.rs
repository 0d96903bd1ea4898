// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-device polling state machine.
//!
//! A [`Channel`] owns one configured device slot: its serial, its
//! [`DeviceVariant`], its poll schedule, and the device-level health state.
//! Channels move through three long-lived states:
//!
//! | State        | Meaning                                              |
//! |--------------|------------------------------------------------------|
//! | unconfigured | no device type, or disabled; never polls             |
//! | idle         | active, waiting for the bridge's startup delay       |
//! | armed        | running; polls whenever the deadline passes          |
//!
//! One poll cycle fetches the device-level parameter set (sub-channel 0),
//! then the variant's own sub-channel when it has one; the first failing
//! request aborts the cycle. Every completed cycle, success or failure,
//! reports the channel's health flags exactly once and re-arms the deadline.
//! Polling takes `&mut self`, so overlapping cycles for one channel cannot
//! be expressed.
//!
//! Members the variant declines fall back to the device-level decoder for
//! sub-channel 0 parameters: `LOWBAT`, `UNREACH`, and the `RSSI_DEVICE` /
//! `RSSI_PEER` pair, which accumulates both halves before one combined
//! quality value is published.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::Instant;
use tracing::{debug, error, trace, warn};

use crate::bus::{Datapoint, DatapointValue};
use crate::config::ChannelConfig;
use crate::error::Result;
use crate::health::HealthAggregator;
use crate::rpc::{Member, MemberValue, RpcClient};
use crate::types::SignalQuality;
use crate::variant::{BusWrite, DeviceVariant};

/// Gap between the first polls of neighboring slots, so channels do not
/// all fire in the same tick after arming.
const STAGGER: Duration = Duration::from_secs(1);

/// Counters for one channel's polling history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollStats {
    /// Poll cycles started.
    pub attempts: u64,
    /// Poll cycles that ended in a failure.
    pub failures: u64,
    /// Duration of the most recent cycle.
    pub last_duration: Option<Duration>,
    /// Wall-clock time of the most recent successful cycle.
    pub last_success: Option<DateTime<Utc>>,
}

/// One configured device slot and its polling state.
#[derive(Debug)]
pub struct Channel {
    index: usize,
    serial: String,
    active: bool,
    running: bool,
    write_enabled: bool,
    read_signal_quality: bool,
    variant: DeviceVariant,
    normal_interval: Duration,
    short_interval: Duration,
    interval: Duration,
    deadline: Option<Instant>,
    unreachable: bool,
    battery_warning: bool,
    rssi_device: Option<i32>,
    rssi_peer: Option<i32>,
    reachable: Arc<Datapoint>,
    battery_low: Arc<Datapoint>,
    signal_quality: Arc<Datapoint>,
    stats: PollStats,
}

impl Channel {
    /// Builds the channel for one slot of the bridge configuration.
    ///
    /// `default_interval` and `default_short_interval` apply when the slot
    /// configuration carries no override.
    #[must_use]
    pub fn new(
        index: usize,
        config: &ChannelConfig,
        default_interval: Duration,
        default_short_interval: Duration,
    ) -> Self {
        let normal_interval = config.poll_interval.unwrap_or(default_interval);
        Self {
            index,
            serial: config.serial.clone(),
            active: config.is_active(),
            running: false,
            write_enabled: config.write_enabled,
            read_signal_quality: config.read_signal_quality,
            variant: DeviceVariant::from_config(config),
            normal_interval,
            short_interval: config.short_poll_interval.unwrap_or(default_short_interval),
            interval: normal_interval,
            deadline: None,
            unreachable: false,
            battery_warning: false,
            rssi_device: None,
            rssi_peer: None,
            reachable: Arc::new(Datapoint::new("reachable")),
            battery_low: Arc::new(Datapoint::new("battery_low")),
            signal_quality: Arc::new(Datapoint::new("signal_quality")),
            stats: PollStats::default(),
        }
    }

    /// The slot index of this channel.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// The configured device serial.
    #[must_use]
    pub fn serial(&self) -> &str {
        &self.serial
    }

    /// Whether a device type is configured and not disabled.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether the channel has been armed after the startup delay.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Whether bus writes are forwarded to the hub.
    #[must_use]
    pub fn write_enabled(&self) -> bool {
        self.write_enabled
    }

    /// The device-type variant driven on this channel.
    #[must_use]
    pub fn variant(&self) -> &DeviceVariant {
        &self.variant
    }

    /// Whether the device was unreachable in the last completed cycle.
    #[must_use]
    pub fn is_unreachable(&self) -> bool {
        self.unreachable
    }

    /// Whether the device reports a low battery.
    #[must_use]
    pub fn has_battery_warning(&self) -> bool {
        self.battery_warning
    }

    /// Reachability of the device, published after every cycle.
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

    /// Counters for this channel's polling history.
    #[must_use]
    pub fn stats(&self) -> &PollStats {
        &self.stats
    }

    /// Arms the channel once the bridge's startup delay has elapsed.
    ///
    /// The first deadline is staggered by the slot index so neighboring
    /// channels do not poll in the same tick.
    pub fn arm(&mut self, now: Instant) {
        if !self.active {
            return;
        }
        self.running = true;
        self.deadline = Some(now + STAGGER * u32::try_from(self.index).unwrap_or(u32::MAX));
        debug!(channel = self.index, serial = %self.serial, "armed");
    }

    /// Whether the poll deadline has passed.
    #[must_use]
    pub fn is_due(&self, now: Instant) -> bool {
        self.running && self.deadline.is_some_and(|deadline| now >= deadline)
    }

    /// Runs one poll cycle and reports its outcome, returning success.
    ///
    /// Regardless of the outcome, the health flags are reported exactly
    /// once, the reachability datapoint is published, and the deadline is
    /// re-armed at the normal interval.
    pub async fn poll(&mut self, client: &RpcClient, health: &mut HealthAggregator) -> bool {
        let started = Instant::now();
        self.stats.attempts += 1;
        self.unreachable = false;
        debug!(channel = self.index, serial = %self.serial, "poll cycle");

        let success = match self.poll_cycle(client).await {
            Ok(()) => {
                self.stats.last_success = Some(Utc::now());
                true
            }
            Err(err) => {
                error!(channel = self.index, serial = %self.serial, error = %err, "poll cycle failed");
                self.stats.failures += 1;
                self.unreachable = true;
                false
            }
        };
        self.stats.last_duration = Some(started.elapsed());

        health.report(
            self.index,
            self.unreachable,
            self.battery_warning,
            self.variant.error_flag(),
        );
        self.reachable
            .write_if_changed(DatapointValue::Bool(!self.unreachable));
        self.interval = self.normal_interval;
        self.deadline = Some(Instant::now() + self.interval);
        success
    }

    async fn poll_cycle(&mut self, client: &RpcClient) -> Result<()> {
        let members = client.get_paramset(&self.serial, 0).await?;
        self.decode_members(0, &members);

        let sub_channel = self.variant.sub_channel();
        if sub_channel != 0 {
            let members = client.get_paramset(&self.serial, sub_channel).await?;
            self.decode_members(sub_channel, &members);
        }

        if self.read_signal_quality {
            self.read_signal(client).await;
        }
        Ok(())
    }

    fn decode_members(&mut self, sub_channel: u8, members: &[Member]) {
        for member in members {
            let taken = match member.value {
                MemberValue::Double(value) => {
                    self.variant.handle_double(sub_channel, &member.name, value)
                }
                MemberValue::Int(value) => {
                    self.variant.handle_int(sub_channel, &member.name, value)
                }
                MemberValue::Bool(value) => {
                    self.variant.handle_bool(sub_channel, &member.name, value)
                }
            };
            if taken {
                continue;
            }
            if sub_channel == 0 && self.handle_device_member(member) {
                continue;
            }
            trace!(
                channel = self.index,
                parameter = %member.name,
                kind = member.value.kind_name(),
                "parameter skipped"
            );
        }
    }

    fn handle_device_member(&mut self, member: &Member) -> bool {
        match (member.name.as_str(), member.value) {
            ("LOWBAT", MemberValue::Bool(low)) => {
                self.battery_warning = low;
                self.battery_low.write_if_changed(DatapointValue::Bool(low));
                true
            }
            ("UNREACH", MemberValue::Bool(unreachable)) => {
                self.unreachable = unreachable;
                true
            }
            ("RSSI_DEVICE", MemberValue::Int(raw)) => {
                self.rssi_device = Some(raw);
                self.emit_signal_quality();
                true
            }
            ("RSSI_PEER", MemberValue::Int(raw)) => {
                self.rssi_peer = Some(raw);
                self.emit_signal_quality();
                true
            }
            _ => false,
        }
    }

    /// Publishes the combined quality once both halves of a pair are in,
    /// then clears the accumulator for the next pair.
    fn emit_signal_quality(&mut self) {
        let (Some(device), Some(peer)) = (self.rssi_device, self.rssi_peer) else {
            return;
        };
        let quality = SignalQuality::from_rssi_pair(device, peer);
        debug!(channel = self.index, device, peer, quality = %quality, "signal quality");
        self.signal_quality
            .write_if_changed(DatapointValue::Int(i64::from(quality.code())));
        self.rssi_device = None;
        self.rssi_peer = None;
    }

    async fn read_signal(&mut self, client: &RpcClient) {
        match client.rssi_pair(&self.serial).await {
            Ok(Some((device, peer))) => {
                self.rssi_device = Some(device);
                self.rssi_peer = Some(peer);
                self.emit_signal_quality();
            }
            Ok(None) => {
                warn!(channel = self.index, serial = %self.serial, "device missing from rssi table");
                self.publish_unknown_quality();
            }
            Err(err) => {
                warn!(channel = self.index, error = %err, "signal quality read failed");
                self.publish_unknown_quality();
            }
        }
    }

    fn publish_unknown_quality(&mut self) {
        self.signal_quality
            .write_if_changed(DatapointValue::Int(i64::from(SignalQuality::UNKNOWN_CODE)));
        self.rssi_device = None;
        self.rssi_peer = None;
    }

    /// Handles one bus write directed at this channel.
    ///
    /// Writes to inactive channels or channels without write permission are
    /// dropped without an RPC call. A [`BusWrite::Refresh`] runs an
    /// immediate poll cycle. Any other write is encoded by the variant and
    /// sent; when every call acknowledges, the next poll is pulled forward
    /// to "now" on the short interval so the new state is confirmed
    /// promptly. A rejected write is not retried and leaves the schedule
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns encode failures ([`crate::error::ValueError`]) and the first
    /// RPC failure among the issued calls.
    pub async fn handle_write(
        &mut self,
        write: &BusWrite,
        client: &RpcClient,
        health: &mut HealthAggregator,
    ) -> Result<()> {
        if !self.active {
            warn!(channel = self.index, write = write.name(), "write ignored, channel not active");
            return Ok(());
        }
        if matches!(write, BusWrite::Refresh) {
            debug!(channel = self.index, serial = %self.serial, "refresh requested");
            self.poll(client, health).await;
            return Ok(());
        }
        if !self.write_enabled {
            warn!(channel = self.index, write = write.name(), "write ignored, writing not allowed");
            return Ok(());
        }

        let calls = self.variant.encode(write)?;
        if calls.is_empty() {
            return Ok(());
        }

        let sub_channel = self.variant.sub_channel();
        let mut first_error = None;
        for call in &calls {
            let sent = client
                .set_value(&self.serial, sub_channel, &call.parameter, call.value.clone())
                .await;
            if let Err(err) = sent {
                error!(
                    channel = self.index,
                    parameter = %call.parameter,
                    error = %err,
                    "write rejected"
                );
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
        }

        match first_error {
            None => {
                self.interval = self.short_interval;
                self.deadline = Some(Instant::now());
                Ok(())
            }
            Some(err) => Err(err),
        }
    }
}
