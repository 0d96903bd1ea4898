// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Switch actuator variant.
//!
//! The actuator keeps its state on sub-channel 1:
//!
//! | Parameter | Wire kind | Datapoint      |
//! |-----------|-----------|----------------|
//! | `STATE`   | boolean   | `switch_state` |
//! | `INHIBIT` | boolean   | `lock_state`   |
//! | `WORKING` | boolean   | accepted, not published |
//!
//! Writes: `STATE` and `INHIBIT` (boolean). A timed "stairwell" write
//! switching on first sets `ON_TIME` (double, seconds) so the device
//! switches itself off after the configured duration; switching off sends
//! only `STATE`.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, trace};

use crate::bus::{Datapoint, DatapointValue};
use crate::error::ValueError;
use crate::types::RpcValue;
use crate::variant::{BusWrite, SetValueCall};

/// Decode/encode tables for a switch actuator.
#[derive(Debug)]
pub struct SwitchActuator {
    switch_state: Arc<Datapoint>,
    lock_state: Arc<Datapoint>,
    on_time: Duration,
}

impl SwitchActuator {
    /// The sub-channel carrying the actuator's state.
    pub const SUB_CHANNEL: u8 = 1;

    /// Creates the variant with the given stairwell on-time.
    ///
    /// A zero `on_time` makes timed writes behave like plain switch writes.
    #[must_use]
    pub fn new(on_time: Duration) -> Self {
        Self {
            switch_state: Arc::new(Datapoint::new("switch_state")),
            lock_state: Arc::new(Datapoint::new("lock_state")),
            on_time,
        }
    }

    /// Current output state of the actuator.
    #[must_use]
    pub fn switch_state(&self) -> &Arc<Datapoint> {
        &self.switch_state
    }

    /// Whether local operation is locked.
    #[must_use]
    pub fn lock_state(&self) -> &Arc<Datapoint> {
        &self.lock_state
    }

    pub(crate) fn handle_bool(&self, sub_channel: u8, name: &str, value: bool) -> bool {
        if sub_channel != Self::SUB_CHANNEL {
            return false;
        }
        match name {
            "STATE" => {
                debug!(parameter = name, value, "switch-actuator decode");
                self.switch_state.write_if_changed(DatapointValue::Bool(value));
                true
            }
            "INHIBIT" => {
                debug!(parameter = name, value, "switch-actuator decode");
                self.lock_state.write_if_changed(DatapointValue::Bool(value));
                true
            }
            // Reported while the device executes a timed program; there is
            // no output bound to it.
            "WORKING" => {
                trace!(parameter = name, value, "accepted without output");
                true
            }
            _ => false,
        }
    }

    pub(crate) fn encode(&self, write: &BusWrite) -> Result<Vec<SetValueCall>, ValueError> {
        match write {
            BusWrite::SetSwitch(on) => {
                Ok(vec![SetValueCall::new("STATE", RpcValue::Bool(*on))])
            }
            BusWrite::SetSwitchTimed(on) => {
                let mut calls = Vec::new();
                if *on && !self.on_time.is_zero() {
                    calls.push(SetValueCall::new(
                        "ON_TIME",
                        RpcValue::Double(self.on_time.as_secs_f64()),
                    ));
                }
                calls.push(SetValueCall::new("STATE", RpcValue::Bool(*on)));
                Ok(calls)
            }
            BusWrite::SetLock(locked) => {
                Ok(vec![SetValueCall::new("INHIBIT", RpcValue::Bool(*locked))])
            }
            other => Err(ValueError::WriteNotSupported {
                device: "switch-actuator",
                write: other.name(),
            }),
        }
    }

    pub(crate) fn datapoints(&self) -> Vec<Arc<Datapoint>> {
        vec![Arc::clone(&self.switch_state), Arc::clone(&self.lock_state)]
    }
}
