// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device-type variants.
//!
//! Each channel drives exactly one device type, chosen once from
//! configuration. The variant fixes three things: the hub sub-channel the
//! device's parameters live on, the decode tables that map response members
//! onto bus datapoints, and the encode tables that map bus writes onto
//! `setValue` calls.
//!
//! | Variant                  | Sub-channel | Decodes                       |
//! |--------------------------|-------------|-------------------------------|
//! | [`DeviceVariant::Inactive`] | none     | nothing                       |
//! | [`Thermostat`]           | 4           | temperatures, battery, valve  |
//! | [`SwitchActuator`]       | 1           | switch and lock state         |
//! | [`UserDefined`]          | configured  | up to 5 configured slots      |
//!
//! Decode handlers accept only members fetched under the variant's own
//! sub-channel; everything else is declined so the channel's device-level
//! fallback (battery-low, unreachable, signal strength) can take it.

mod switch_actuator;
mod thermostat;
mod user_defined;

pub use switch_actuator::SwitchActuator;
pub use thermostat::Thermostat;
pub use user_defined::{UserDefined, UserSlot};

use std::sync::Arc;

use crate::bus::{Datapoint, DatapointValue};
use crate::config::{ChannelConfig, DeviceKind};
use crate::error::ValueError;
use crate::types::RpcValue;

/// A write request arriving from the bus for one channel.
#[derive(Debug, Clone, PartialEq)]
pub enum BusWrite {
    /// Poll the channel immediately, outside its schedule.
    Refresh,
    /// Thermostat: set the target temperature in degrees Celsius.
    SetTargetTemperature(f64),
    /// Thermostat: start or stop boost heating.
    TriggerBoost(bool),
    /// Switch actuator: switch the output on or off.
    SetSwitch(bool),
    /// Switch actuator: switch with the configured stairwell on-time.
    SetSwitchTimed(bool),
    /// Switch actuator: lock or unlock local operation.
    SetLock(bool),
    /// User-defined: write a slot's bus value to its hub parameter.
    SetSlot {
        /// Slot index, 0 through 4.
        slot: usize,
        /// The value to translate and send.
        value: DatapointValue,
    },
}

impl BusWrite {
    /// Short name of the request, for logs and errors.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Refresh => "refresh",
            Self::SetTargetTemperature(_) => "set-target-temperature",
            Self::TriggerBoost(_) => "trigger-boost",
            Self::SetSwitch(_) => "set-switch",
            Self::SetSwitchTimed(_) => "set-switch-timed",
            Self::SetLock(_) => "set-lock",
            Self::SetSlot { .. } => "set-slot",
        }
    }
}

/// One `setValue` call produced by encoding a bus write.
///
/// The call is addressed to the variant's own sub-channel; only the
/// parameter name and typed value vary.
#[derive(Debug, Clone, PartialEq)]
pub struct SetValueCall {
    /// The hub parameter name.
    pub parameter: String,
    /// The typed value to send.
    pub value: RpcValue,
}

impl SetValueCall {
    pub(crate) fn new(parameter: impl Into<String>, value: impl Into<RpcValue>) -> Self {
        Self {
            parameter: parameter.into(),
            value: value.into(),
        }
    }
}

/// The device type driven on one channel, with its decode/encode tables.
#[derive(Debug)]
pub enum DeviceVariant {
    /// No device configured; every operation is a no-op.
    Inactive,
    /// Radiator thermostat on sub-channel 4.
    Thermostat(Thermostat),
    /// Switch actuator on sub-channel 1.
    SwitchActuator(SwitchActuator),
    /// Configured parameter slots on a configured sub-channel.
    UserDefined(UserDefined),
}

impl DeviceVariant {
    /// Builds the variant a channel configuration asks for.
    #[must_use]
    pub fn from_config(config: &ChannelConfig) -> Self {
        match config.kind {
            DeviceKind::Inactive => Self::Inactive,
            DeviceKind::Thermostat => Self::Thermostat(Thermostat::new()),
            DeviceKind::SwitchActuator => {
                Self::SwitchActuator(SwitchActuator::new(config.on_time))
            }
            DeviceKind::UserDefined => Self::UserDefined(UserDefined::from_config(
                config.user_sub_channel,
                &config.slots,
            )),
        }
    }

    /// Short name of the device type, for logs and errors.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Inactive => "inactive",
            Self::Thermostat(_) => "thermostat",
            Self::SwitchActuator(_) => "switch-actuator",
            Self::UserDefined(_) => "user-defined",
        }
    }

    /// The hub sub-channel this device's parameters live on.
    ///
    /// Zero means the device has no sub-channel of its own and only the
    /// device-level parameter set is polled.
    #[must_use]
    pub fn sub_channel(&self) -> u8 {
        match self {
            Self::Inactive => 0,
            Self::Thermostat(_) => Thermostat::SUB_CHANNEL,
            Self::SwitchActuator(_) => SwitchActuator::SUB_CHANNEL,
            Self::UserDefined(user) => user.sub_channel(),
        }
    }

    /// Applies a `double` response member, returning whether it was taken.
    pub fn handle_double(&self, sub_channel: u8, name: &str, value: f64) -> bool {
        match self {
            Self::Inactive | Self::SwitchActuator(_) => false,
            Self::Thermostat(t) => t.handle_double(sub_channel, name, value),
            Self::UserDefined(u) => u.handle_double(sub_channel, name, value),
        }
    }

    /// Applies an `i4` response member, returning whether it was taken.
    pub fn handle_int(&self, sub_channel: u8, name: &str, value: i32) -> bool {
        match self {
            Self::Inactive | Self::SwitchActuator(_) => false,
            Self::Thermostat(t) => t.handle_int(sub_channel, name, value),
            Self::UserDefined(u) => u.handle_int(sub_channel, name, value),
        }
    }

    /// Applies a `boolean` response member, returning whether it was taken.
    pub fn handle_bool(&self, sub_channel: u8, name: &str, value: bool) -> bool {
        match self {
            Self::Inactive | Self::Thermostat(_) => false,
            Self::SwitchActuator(s) => s.handle_bool(sub_channel, name, value),
            Self::UserDefined(u) => u.handle_bool(sub_channel, name, value),
        }
    }

    /// Translates a bus write into the `setValue` calls it requires.
    ///
    /// An empty list means nothing needs to be sent: the variant is
    /// inactive, the write is a [`BusWrite::Refresh`] (the channel handles
    /// it before encoding), or a trigger fired with `false`.
    ///
    /// # Errors
    ///
    /// Returns a [`ValueError`] when the write does not apply to this
    /// device type, or when a slot write fails its access or kind check.
    pub fn encode(&self, write: &BusWrite) -> Result<Vec<SetValueCall>, ValueError> {
        if matches!(write, BusWrite::Refresh) {
            return Ok(Vec::new());
        }
        match self {
            Self::Inactive => Ok(Vec::new()),
            Self::Thermostat(t) => t.encode(write),
            Self::SwitchActuator(s) => s.encode(write),
            Self::UserDefined(u) => u.encode(write),
        }
    }

    /// Whether the device currently reports a fault condition.
    #[must_use]
    pub fn error_flag(&self) -> bool {
        match self {
            Self::Thermostat(t) => t.error_flag(),
            _ => false,
        }
    }

    /// The bus datapoints this variant publishes, for enumeration.
    #[must_use]
    pub fn datapoints(&self) -> Vec<Arc<Datapoint>> {
        match self {
            Self::Inactive => Vec::new(),
            Self::Thermostat(t) => t.datapoints(),
            Self::SwitchActuator(s) => s.datapoints(),
            Self::UserDefined(u) => u.datapoints(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BridgeConfig, UserSlotConfig};
    use crate::types::{AccessMask, SlotKind};
    use std::time::Duration;

    fn config_of(kind: DeviceKind) -> ChannelConfig {
        match kind {
            DeviceKind::Inactive => ChannelConfig::inactive(),
            DeviceKind::Thermostat => ChannelConfig::thermostat("OEQ0123456"),
            DeviceKind::SwitchActuator => ChannelConfig::switch_actuator("LEQ0654321"),
            DeviceKind::UserDefined => ChannelConfig::user_defined("MEQ1111111", 3),
        }
    }

    #[test]
    fn from_config_picks_matching_variant() {
        assert!(matches!(
            DeviceVariant::from_config(&config_of(DeviceKind::Inactive)),
            DeviceVariant::Inactive
        ));
        assert!(matches!(
            DeviceVariant::from_config(&config_of(DeviceKind::Thermostat)),
            DeviceVariant::Thermostat(_)
        ));
        assert!(matches!(
            DeviceVariant::from_config(&config_of(DeviceKind::SwitchActuator)),
            DeviceVariant::SwitchActuator(_)
        ));
        assert!(matches!(
            DeviceVariant::from_config(&config_of(DeviceKind::UserDefined)),
            DeviceVariant::UserDefined(_)
        ));
    }

    #[test]
    fn sub_channels() {
        assert_eq!(
            DeviceVariant::from_config(&config_of(DeviceKind::Inactive)).sub_channel(),
            0
        );
        assert_eq!(
            DeviceVariant::from_config(&config_of(DeviceKind::Thermostat)).sub_channel(),
            4
        );
        assert_eq!(
            DeviceVariant::from_config(&config_of(DeviceKind::SwitchActuator)).sub_channel(),
            1
        );
        assert_eq!(
            DeviceVariant::from_config(&config_of(DeviceKind::UserDefined)).sub_channel(),
            3
        );
    }

    #[test]
    fn inactive_declines_everything() {
        let variant = DeviceVariant::Inactive;
        assert!(!variant.handle_double(0, "ACTUAL_TEMPERATURE", 21.5));
        assert!(!variant.handle_int(0, "VALVE_STATE", 50));
        assert!(!variant.handle_bool(0, "STATE", true));
        assert_eq!(variant.encode(&BusWrite::SetSwitch(true)), Ok(Vec::new()));
        assert!(variant.datapoints().is_empty());
        assert!(!variant.error_flag());
    }

    #[test]
    fn refresh_encodes_no_calls() {
        let variant = DeviceVariant::from_config(&config_of(DeviceKind::Thermostat));
        assert_eq!(variant.encode(&BusWrite::Refresh), Ok(Vec::new()));
    }

    #[test]
    fn write_for_wrong_device_type_is_rejected() {
        let thermostat = DeviceVariant::from_config(&config_of(DeviceKind::Thermostat));
        assert_eq!(
            thermostat.encode(&BusWrite::SetSwitch(true)),
            Err(ValueError::WriteNotSupported {
                device: "thermostat",
                write: "set-switch",
            })
        );

        let switch = DeviceVariant::from_config(&config_of(DeviceKind::SwitchActuator));
        assert_eq!(
            switch.encode(&BusWrite::SetTargetTemperature(21.0)),
            Err(ValueError::WriteNotSupported {
                device: "switch-actuator",
                write: "set-target-temperature",
            })
        );
    }

    #[test]
    fn variant_construction_from_full_config() {
        let config = BridgeConfig::new("host", 2001)
            .with_channel(
                ChannelConfig::switch_actuator("LEQ0654321")
                    .with_on_time(Duration::from_secs(90)),
            )
            .with_channel(ChannelConfig::user_defined("MEQ1111111", 6).with_slot(
                UserSlotConfig::new("LEVEL", SlotKind::FloatPercent, AccessMask::READ),
            ));
        assert!(config.validate().is_ok());

        let user = DeviceVariant::from_config(&config.channels[1]);
        assert_eq!(user.sub_channel(), 6);
        assert_eq!(user.datapoints().len(), 1);
        assert_eq!(user.datapoints()[0].name(), "LEVEL");
    }
}
