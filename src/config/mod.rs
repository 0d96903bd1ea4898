// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Configuration types for the bridge and its device channels.
//!
//! A [`BridgeConfig`] names the hub endpoint, the shared timing parameters,
//! and up to 64 [`ChannelConfig`] entries, one per device slot. Channel
//! health is tracked in 64-bit group masks, which caps the channel count.
//!
//! Configuration is validated once, when the bridge is built; the types
//! themselves accept any field values.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;
use crate::types::{AccessMask, SlotKind};

/// Maximum number of device channels one bridge can manage.
pub const MAX_CHANNELS: usize = 64;

/// Number of datapoint slots per user-defined channel.
pub const USER_SLOTS: usize = 5;

/// Number of configurable health groups (1 through 5; group 0 always
/// contains every active channel).
pub const CONFIGURED_GROUPS: usize = 5;

/// The device type driven on one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceKind {
    /// No device; the channel never polls.
    Inactive,
    /// Radiator thermostat, polled on sub-channel 4.
    Thermostat,
    /// Switch actuator, polled on sub-channel 1.
    SwitchActuator,
    /// Free-form parameter set on a configured sub-channel.
    UserDefined,
}

/// One datapoint slot of a user-defined channel.
///
/// # Examples
///
/// ```
/// use ccu_bridge::config::UserSlotConfig;
/// use ccu_bridge::types::{AccessMask, SlotKind};
///
/// let slot = UserSlotConfig::new(
///     "LEVEL",
///     SlotKind::FloatPercent,
///     AccessMask::READ | AccessMask::WRITE,
/// );
/// assert!(slot.access.readable());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSlotConfig {
    /// The hub parameter name this slot binds to.
    pub parameter: String,
    /// How values translate between the bus and the wire.
    pub kind: SlotKind,
    /// Which directions the bridge services for this slot.
    pub access: AccessMask,
}

impl UserSlotConfig {
    /// Creates a slot binding for the given parameter.
    #[must_use]
    pub fn new(parameter: impl Into<String>, kind: SlotKind, access: AccessMask) -> Self {
        Self {
            parameter: parameter.into(),
            kind,
            access,
        }
    }
}

/// Configuration for one device channel.
///
/// # Examples
///
/// ```
/// use ccu_bridge::config::ChannelConfig;
///
/// let thermostat = ChannelConfig::thermostat("OEQ0123456")
///     .with_write_enabled()
///     .with_groups([1, 3]);
///
/// let switch = ChannelConfig::switch_actuator("LEQ0654321")
///     .with_write_enabled()
///     .with_on_time(std::time::Duration::from_secs(90));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// The device serial number (address without sub-channel).
    pub serial: String,
    /// The device type driven on this channel.
    pub kind: DeviceKind,
    /// Whether the channel has been switched off in configuration.
    pub disabled: bool,
    /// Whether bus writes are forwarded to the hub.
    pub write_enabled: bool,
    /// Whether each successful poll is followed by a signal-quality read.
    pub read_signal_quality: bool,
    /// Stairwell on-duration for timed switch writes; zero disables it.
    pub on_time: Duration,
    /// Sub-channel polled by a user-defined device.
    pub user_sub_channel: u8,
    /// Datapoint slots of a user-defined device.
    pub slots: Vec<UserSlotConfig>,
    /// Health groups (1 through 5) this channel is a member of.
    pub groups: Vec<usize>,
    /// Per-channel poll interval; falls back to the bridge default.
    pub poll_interval: Option<Duration>,
    /// Per-channel short interval after a write; falls back to the default.
    pub short_poll_interval: Option<Duration>,
}

impl ChannelConfig {
    fn new(serial: impl Into<String>, kind: DeviceKind) -> Self {
        Self {
            serial: serial.into(),
            kind,
            disabled: false,
            write_enabled: false,
            read_signal_quality: false,
            on_time: Duration::ZERO,
            user_sub_channel: 0,
            slots: Vec::new(),
            groups: Vec::new(),
            poll_interval: None,
            short_poll_interval: None,
        }
    }

    /// Creates an inactive channel.
    #[must_use]
    pub fn inactive() -> Self {
        Self::new(String::new(), DeviceKind::Inactive)
    }

    /// Creates a thermostat channel for the given device serial.
    #[must_use]
    pub fn thermostat(serial: impl Into<String>) -> Self {
        Self::new(serial, DeviceKind::Thermostat)
    }

    /// Creates a switch-actuator channel for the given device serial.
    #[must_use]
    pub fn switch_actuator(serial: impl Into<String>) -> Self {
        Self::new(serial, DeviceKind::SwitchActuator)
    }

    /// Creates a user-defined channel polling the given sub-channel.
    #[must_use]
    pub fn user_defined(serial: impl Into<String>, sub_channel: u8) -> Self {
        let mut config = Self::new(serial, DeviceKind::UserDefined);
        config.user_sub_channel = sub_channel;
        config
    }

    /// Switches the channel off without removing its configuration.
    #[must_use]
    pub fn with_disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Allows bus writes to reach the hub.
    #[must_use]
    pub fn with_write_enabled(mut self) -> Self {
        self.write_enabled = true;
        self
    }

    /// Follows each successful poll with a signal-quality read.
    #[must_use]
    pub fn with_signal_quality(mut self) -> Self {
        self.read_signal_quality = true;
        self
    }

    /// Sets the stairwell on-duration for timed switch writes.
    ///
    /// Only applicable to switch-actuator channels.
    #[must_use]
    pub fn with_on_time(mut self, on_time: Duration) -> Self {
        self.on_time = on_time;
        self
    }

    /// Adds a datapoint slot.
    ///
    /// Only applicable to user-defined channels. At most [`USER_SLOTS`]
    /// slots are accepted; the excess is rejected during validation.
    #[must_use]
    pub fn with_slot(mut self, slot: UserSlotConfig) -> Self {
        self.slots.push(slot);
        self
    }

    /// Sets the health groups this channel belongs to.
    ///
    /// Group numbers run from 1 through 5. Group 0 is implicit and always
    /// contains every active channel.
    #[must_use]
    pub fn with_groups(mut self, groups: impl IntoIterator<Item = usize>) -> Self {
        self.groups = groups.into_iter().collect();
        self
    }

    /// Overrides the bridge-wide poll interval for this channel.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    /// Overrides the bridge-wide short poll interval for this channel.
    #[must_use]
    pub fn with_short_poll_interval(mut self, interval: Duration) -> Self {
        self.short_poll_interval = Some(interval);
        self
    }

    /// Whether the channel takes part in polling and health tracking.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.kind != DeviceKind::Inactive && !self.disabled
    }

    fn validate(&self) -> Result<(), ValueError> {
        if self.is_active() {
            if self.serial.is_empty() || self.serial.contains(':') {
                return Err(ValueError::InvalidSerial(self.serial.clone()));
            }
            for group in &self.groups {
                if !(1..=CONFIGURED_GROUPS).contains(group) {
                    return Err(ValueError::GroupOutOfRange {
                        max: CONFIGURED_GROUPS,
                        actual: *group,
                    });
                }
            }
        }
        if self.slots.len() > USER_SLOTS {
            return Err(ValueError::SlotOutOfRange {
                max: USER_SLOTS - 1,
                actual: self.slots.len() - 1,
            });
        }
        if let Some(interval) = self.poll_interval
            && interval.is_zero()
        {
            return Err(ValueError::ZeroDuration {
                field: "poll_interval",
            });
        }
        if let Some(interval) = self.short_poll_interval
            && interval.is_zero()
        {
            return Err(ValueError::ZeroDuration {
                field: "short_poll_interval",
            });
        }
        Ok(())
    }
}

/// Configuration for a bridge instance.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use ccu_bridge::config::{BridgeConfig, ChannelConfig};
///
/// let config = BridgeConfig::new("192.168.1.20", 2001)
///     .with_poll_interval(Duration::from_secs(120))
///     .with_channel(ChannelConfig::thermostat("OEQ0123456"))
///     .with_channel(ChannelConfig::switch_actuator("LEQ0654321").with_write_enabled());
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// The hub's host name or IP address.
    pub host: String,
    /// The hub's XML-RPC port.
    pub port: u16,
    /// Per-request HTTP timeout.
    pub timeout: Duration,
    /// Delay after startup before any channel polls.
    pub startup_delay: Duration,
    /// Default poll interval for channels without an override.
    pub poll_interval: Duration,
    /// Default short interval applied after an accepted write.
    pub short_poll_interval: Duration,
    /// Period of the scheduler tick that checks poll deadlines.
    pub tick_period: Duration,
    /// The device channels, in slot order.
    pub channels: Vec<ChannelConfig>,
}

impl BridgeConfig {
    /// Creates a configuration for a hub at the given host and port.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            timeout: Duration::from_secs(10),
            startup_delay: Duration::from_secs(10),
            poll_interval: Duration::from_secs(60),
            short_poll_interval: Duration::from_secs(5),
            tick_period: Duration::from_millis(100),
            channels: Vec::new(),
        }
    }

    /// Sets the per-request HTTP timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the delay before the first poll after startup.
    #[must_use]
    pub fn with_startup_delay(mut self, delay: Duration) -> Self {
        self.startup_delay = delay;
        self
    }

    /// Sets the default poll interval.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the default short poll interval applied after a write.
    #[must_use]
    pub fn with_short_poll_interval(mut self, interval: Duration) -> Self {
        self.short_poll_interval = interval;
        self
    }

    /// Sets the scheduler tick period.
    #[must_use]
    pub fn with_tick_period(mut self, period: Duration) -> Self {
        self.tick_period = period;
        self
    }

    /// Appends a device channel at the next slot index.
    #[must_use]
    pub fn with_channel(mut self, channel: ChannelConfig) -> Self {
        self.channels.push(channel);
        self
    }

    /// Checks every constraint the bridge relies on.
    ///
    /// # Errors
    ///
    /// Returns a [`ValueError`] for more than [`MAX_CHANNELS`] channels, an
    /// empty or `:`-bearing serial on an active channel, a group number
    /// outside 1 through 5, more than [`USER_SLOTS`] slots, or a zero
    /// duration where a period is required.
    pub fn validate(&self) -> Result<(), ValueError> {
        if self.channels.len() > MAX_CHANNELS {
            return Err(ValueError::TooManyChannels {
                max: MAX_CHANNELS,
                actual: self.channels.len(),
            });
        }
        for (field, value) in [
            ("timeout", self.timeout),
            ("poll_interval", self.poll_interval),
            ("short_poll_interval", self.short_poll_interval),
            ("tick_period", self.tick_period),
        ] {
            if value.is_zero() {
                return Err(ValueError::ZeroDuration { field });
            }
        }
        for channel in &self.channels {
            channel.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bridge_defaults() {
        let config = BridgeConfig::new("192.168.1.20", 2001);

        assert_eq!(config.host, "192.168.1.20");
        assert_eq!(config.port, 2001);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.poll_interval, Duration::from_secs(60));
        assert!(config.channels.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn channel_constructors() {
        let thermostat = ChannelConfig::thermostat("OEQ0123456");
        assert_eq!(thermostat.kind, DeviceKind::Thermostat);
        assert!(thermostat.is_active());
        assert!(!thermostat.write_enabled);

        let inactive = ChannelConfig::inactive();
        assert_eq!(inactive.kind, DeviceKind::Inactive);
        assert!(!inactive.is_active());

        let user = ChannelConfig::user_defined("MEQ1111111", 3);
        assert_eq!(user.user_sub_channel, 3);
    }

    #[test]
    fn disabled_channel_is_inactive() {
        let channel = ChannelConfig::thermostat("OEQ0123456").with_disabled();
        assert!(!channel.is_active());
    }

    #[test]
    fn too_many_channels_rejected() {
        let mut config = BridgeConfig::new("host", 2001);
        for _ in 0..=MAX_CHANNELS {
            config = config.with_channel(ChannelConfig::inactive());
        }

        assert_eq!(
            config.validate(),
            Err(ValueError::TooManyChannels {
                max: MAX_CHANNELS,
                actual: MAX_CHANNELS + 1,
            })
        );
    }

    #[test]
    fn empty_serial_rejected_on_active_channel() {
        let config =
            BridgeConfig::new("host", 2001).with_channel(ChannelConfig::thermostat(""));
        assert!(matches!(
            config.validate(),
            Err(ValueError::InvalidSerial(_))
        ));
    }

    #[test]
    fn serial_with_separator_rejected() {
        let config = BridgeConfig::new("host", 2001)
            .with_channel(ChannelConfig::thermostat("OEQ0123456:4"));
        assert!(matches!(
            config.validate(),
            Err(ValueError::InvalidSerial(_))
        ));
    }

    #[test]
    fn inactive_channel_skips_serial_check() {
        let config = BridgeConfig::new("host", 2001).with_channel(ChannelConfig::inactive());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn group_zero_rejected() {
        let config = BridgeConfig::new("host", 2001)
            .with_channel(ChannelConfig::thermostat("OEQ0123456").with_groups([0]));
        assert_eq!(
            config.validate(),
            Err(ValueError::GroupOutOfRange { max: 5, actual: 0 })
        );
    }

    #[test]
    fn group_above_range_rejected() {
        let config = BridgeConfig::new("host", 2001)
            .with_channel(ChannelConfig::thermostat("OEQ0123456").with_groups([6]));
        assert_eq!(
            config.validate(),
            Err(ValueError::GroupOutOfRange { max: 5, actual: 6 })
        );
    }

    #[test]
    fn too_many_slots_rejected() {
        let mut channel = ChannelConfig::user_defined("MEQ1111111", 3);
        for i in 0..=USER_SLOTS {
            channel = channel.with_slot(UserSlotConfig::new(
                format!("PARAM_{i}"),
                SlotKind::Float,
                AccessMask::READ,
            ));
        }
        let config = BridgeConfig::new("host", 2001).with_channel(channel);

        assert_eq!(
            config.validate(),
            Err(ValueError::SlotOutOfRange { max: 4, actual: 5 })
        );
    }

    #[test]
    fn zero_poll_interval_rejected() {
        let config = BridgeConfig::new("host", 2001).with_poll_interval(Duration::ZERO);
        assert_eq!(
            config.validate(),
            Err(ValueError::ZeroDuration {
                field: "poll_interval"
            })
        );
    }

    #[test]
    fn zero_channel_override_rejected() {
        let config = BridgeConfig::new("host", 2001).with_channel(
            ChannelConfig::thermostat("OEQ0123456").with_short_poll_interval(Duration::ZERO),
        );
        assert_eq!(
            config.validate(),
            Err(ValueError::ZeroDuration {
                field: "short_poll_interval"
            })
        );
    }

    #[test]
    fn full_configuration_validates() {
        let config = BridgeConfig::new("192.168.1.20", 2001)
            .with_startup_delay(Duration::from_secs(5))
            .with_channel(
                ChannelConfig::thermostat("OEQ0123456")
                    .with_write_enabled()
                    .with_signal_quality()
                    .with_groups([1, 2]),
            )
            .with_channel(
                ChannelConfig::switch_actuator("LEQ0654321")
                    .with_write_enabled()
                    .with_on_time(Duration::from_secs(90)),
            )
            .with_channel(
                ChannelConfig::user_defined("MEQ1111111", 3)
                    .with_slot(UserSlotConfig::new(
                        "LEVEL",
                        SlotKind::FloatPercent,
                        AccessMask::READ | AccessMask::WRITE,
                    ))
                    .with_slot(UserSlotConfig::new(
                        "MOTION",
                        SlotKind::Boolean,
                        AccessMask::READ | AccessMask::EVENT,
                    )),
            );

        assert!(config.validate().is_ok());
    }
}
