// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Radiator thermostat variant.
//!
//! The thermostat keeps its control parameters on sub-channel 4:
//!
//! | Parameter            | Wire kind | Datapoint         | Transform      |
//! |----------------------|-----------|-------------------|----------------|
//! | `ACTUAL_TEMPERATURE` | double    | `temp_current`    | none           |
//! | `SET_TEMPERATURE`    | double    | `temp_target`     | none           |
//! | `BATTERY_STATE`      | double    | `battery_voltage` | V to mV (x1000)|
//! | `BOOST_STATE`        | i4        | `boost_state`     | none           |
//! | `FAULT_REPORTING`    | i4        | `fault`           | none           |
//! | `VALVE_STATE`        | i4        | `valve_position`  | none           |
//!
//! A non-zero `FAULT_REPORTING` code raises the channel's error flag for
//! health aggregation. Writes: `SET_TEMPERATURE` (double) and `BOOST_MODE`
//! (boolean).

use std::sync::Arc;

use tracing::debug;

use crate::bus::{Datapoint, DatapointValue};
use crate::error::ValueError;
use crate::types::RpcValue;
use crate::variant::{BusWrite, SetValueCall};

/// Decode/encode tables for a radiator thermostat.
#[derive(Debug)]
pub struct Thermostat {
    temperature: Arc<Datapoint>,
    target_temperature: Arc<Datapoint>,
    battery_voltage: Arc<Datapoint>,
    boost_state: Arc<Datapoint>,
    fault: Arc<Datapoint>,
    valve_position: Arc<Datapoint>,
}

impl Thermostat {
    /// The sub-channel carrying the thermostat's control parameters.
    pub const SUB_CHANNEL: u8 = 4;

    /// Creates the variant with unset output datapoints.
    #[must_use]
    pub fn new() -> Self {
        Self {
            temperature: Arc::new(Datapoint::new("temp_current")),
            target_temperature: Arc::new(Datapoint::new("temp_target")),
            battery_voltage: Arc::new(Datapoint::new("battery_voltage")),
            boost_state: Arc::new(Datapoint::new("boost_state")),
            fault: Arc::new(Datapoint::new("fault")),
            valve_position: Arc::new(Datapoint::new("valve_position")),
        }
    }

    /// Current room temperature in degrees Celsius.
    #[must_use]
    pub fn temperature(&self) -> &Arc<Datapoint> {
        &self.temperature
    }

    /// Target temperature reported by the device.
    #[must_use]
    pub fn target_temperature(&self) -> &Arc<Datapoint> {
        &self.target_temperature
    }

    /// Battery voltage in millivolts.
    #[must_use]
    pub fn battery_voltage(&self) -> &Arc<Datapoint> {
        &self.battery_voltage
    }

    /// Remaining boost time reported by the device.
    #[must_use]
    pub fn boost_state(&self) -> &Arc<Datapoint> {
        &self.boost_state
    }

    /// The device's fault code; zero when healthy.
    #[must_use]
    pub fn fault(&self) -> &Arc<Datapoint> {
        &self.fault
    }

    /// Valve opening in percent.
    #[must_use]
    pub fn valve_position(&self) -> &Arc<Datapoint> {
        &self.valve_position
    }

    pub(crate) fn handle_double(&self, sub_channel: u8, name: &str, value: f64) -> bool {
        if sub_channel != Self::SUB_CHANNEL {
            return false;
        }
        let target = match name {
            "ACTUAL_TEMPERATURE" => &self.temperature,
            "SET_TEMPERATURE" => &self.target_temperature,
            "BATTERY_STATE" => {
                debug!(parameter = name, value, "thermostat decode");
                self.battery_voltage
                    .write_if_changed(DatapointValue::Float(value * 1000.0));
                return true;
            }
            _ => return false,
        };
        debug!(parameter = name, value, "thermostat decode");
        target.write_if_changed(DatapointValue::Float(value));
        true
    }

    pub(crate) fn handle_int(&self, sub_channel: u8, name: &str, value: i32) -> bool {
        if sub_channel != Self::SUB_CHANNEL {
            return false;
        }
        let target = match name {
            "BOOST_STATE" => &self.boost_state,
            "FAULT_REPORTING" => &self.fault,
            "VALVE_STATE" => &self.valve_position,
            _ => return false,
        };
        debug!(parameter = name, value, "thermostat decode");
        target.write_if_changed(DatapointValue::Int(i64::from(value)));
        true
    }

    pub(crate) fn encode(&self, write: &BusWrite) -> Result<Vec<SetValueCall>, ValueError> {
        match write {
            BusWrite::SetTargetTemperature(temperature) => Ok(vec![SetValueCall::new(
                "SET_TEMPERATURE",
                RpcValue::Double(*temperature),
            )]),
            BusWrite::TriggerBoost(boost) => {
                Ok(vec![SetValueCall::new("BOOST_MODE", RpcValue::Bool(*boost))])
            }
            other => Err(ValueError::WriteNotSupported {
                device: "thermostat",
                write: other.name(),
            }),
        }
    }

    pub(crate) fn error_flag(&self) -> bool {
        self.fault.read().and_then(|v| v.as_int()).unwrap_or(0) != 0
    }

    pub(crate) fn datapoints(&self) -> Vec<Arc<Datapoint>> {
        vec![
            Arc::clone(&self.temperature),
            Arc::clone(&self.target_temperature),
            Arc::clone(&self.battery_voltage),
            Arc::clone(&self.boost_state),
            Arc::clone(&self.fault),
            Arc::clone(&self.valve_position),
        ]
    }
}

impl Default for Thermostat {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_temperatures() {
        let t = Thermostat::new();

        assert!(t.handle_double(4, "ACTUAL_TEMPERATURE", 21.5));
        assert!(t.handle_double(4, "SET_TEMPERATURE", 23.0));

        assert_eq!(t.temperature().read(), Some(DatapointValue::Float(21.5)));
        assert_eq!(
            t.target_temperature().read(),
            Some(DatapointValue::Float(23.0))
        );
    }

    #[test]
    fn battery_voltage_scales_to_millivolts() {
        let t = Thermostat::new();
        assert!(t.handle_double(4, "BATTERY_STATE", 2.4));
        assert_eq!(
            t.battery_voltage().read(),
            Some(DatapointValue::Float(2400.0))
        );
    }

    #[test]
    fn decodes_integer_parameters() {
        let t = Thermostat::new();

        assert!(t.handle_int(4, "BOOST_STATE", 25));
        assert!(t.handle_int(4, "VALVE_STATE", 67));

        assert_eq!(t.boost_state().read(), Some(DatapointValue::Int(25)));
        assert_eq!(t.valve_position().read(), Some(DatapointValue::Int(67)));
    }

    #[test]
    fn fault_code_drives_error_flag() {
        let t = Thermostat::new();
        assert!(!t.error_flag());

        assert!(t.handle_int(4, "FAULT_REPORTING", 6));
        assert!(t.error_flag());
        assert_eq!(t.fault().read(), Some(DatapointValue::Int(6)));

        assert!(t.handle_int(4, "FAULT_REPORTING", 0));
        assert!(!t.error_flag());
    }

    #[test]
    fn declines_other_sub_channels() {
        let t = Thermostat::new();
        assert!(!t.handle_double(0, "ACTUAL_TEMPERATURE", 21.5));
        assert!(!t.handle_int(1, "VALVE_STATE", 50));
        assert!(t.temperature().read().is_none());
    }

    #[test]
    fn declines_unknown_parameters() {
        let t = Thermostat::new();
        assert!(!t.handle_double(4, "HUMIDITY", 55.0));
        assert!(!t.handle_int(4, "UNKNOWN_CODE", 1));
    }

    #[test]
    fn repeated_value_does_not_resend() {
        let t = Thermostat::new();
        assert!(t.handle_double(4, "ACTUAL_TEMPERATURE", 21.5));
        assert!(t.handle_double(4, "ACTUAL_TEMPERATURE", 21.5));
        assert_eq!(t.temperature().sends(), 1);
    }

    #[test]
    fn encodes_target_temperature() {
        let t = Thermostat::new();
        let calls = t.encode(&BusWrite::SetTargetTemperature(21.5)).unwrap();
        assert_eq!(
            calls,
            vec![SetValueCall::new("SET_TEMPERATURE", RpcValue::Double(21.5))]
        );
    }

    #[test]
    fn encodes_boost_trigger() {
        let t = Thermostat::new();
        let calls = t.encode(&BusWrite::TriggerBoost(true)).unwrap();
        assert_eq!(
            calls,
            vec![SetValueCall::new("BOOST_MODE", RpcValue::Bool(true))]
        );
    }

    #[test]
    fn rejects_switch_writes() {
        let t = Thermostat::new();
        assert_eq!(
            t.encode(&BusWrite::SetLock(true)),
            Err(ValueError::WriteNotSupported {
                device: "thermostat",
                write: "set-lock",
            })
        );
    }
}
