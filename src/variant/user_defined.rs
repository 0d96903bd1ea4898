// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! User-defined variant.
//!
//! For device types without a built-in table, a channel can bind up to five
//! configured slots on a configured sub-channel. Each slot names one hub
//! parameter and fixes its value kind and access mask.
//!
//! Decode scans the slots for one whose name matches the response member
//! and whose access mask includes the readable bit; the first slot whose
//! kind takes the member's wire kind receives the transformed value. A
//! name match with an incompatible kind keeps scanning.
//!
//! Writes go through [`BusWrite::SetSlot`] and require the slot's writable
//! bit. Trigger slots fire only on `true`; a `false` write is dropped
//! without a call.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::bus::{Datapoint, DatapointValue};
use crate::config::UserSlotConfig;
use crate::error::ValueError;
use crate::types::{AccessMask, RpcValue, SlotKind};
use crate::variant::{BusWrite, SetValueCall};

/// One configured datapoint slot.
#[derive(Debug)]
pub struct UserSlot {
    parameter: String,
    kind: SlotKind,
    access: AccessMask,
    datapoint: Arc<Datapoint>,
}

impl UserSlot {
    fn from_config(config: &UserSlotConfig) -> Self {
        Self {
            parameter: config.parameter.clone(),
            kind: config.kind,
            access: config.access,
            datapoint: Arc::new(Datapoint::new(config.parameter.clone())),
        }
    }

    /// The hub parameter name this slot binds to.
    #[must_use]
    pub fn parameter(&self) -> &str {
        &self.parameter
    }

    /// The slot's value kind.
    #[must_use]
    pub fn kind(&self) -> SlotKind {
        self.kind
    }

    /// The slot's access mask.
    #[must_use]
    pub fn access(&self) -> AccessMask {
        self.access
    }

    /// The bus datapoint carrying the slot's value.
    #[must_use]
    pub fn datapoint(&self) -> &Arc<Datapoint> {
        &self.datapoint
    }
}

/// Decode/encode tables built from slot configuration.
#[derive(Debug)]
pub struct UserDefined {
    sub_channel: u8,
    slots: Vec<UserSlot>,
}

impl UserDefined {
    /// Builds the variant from configured slots.
    #[must_use]
    pub fn from_config(sub_channel: u8, slots: &[UserSlotConfig]) -> Self {
        Self {
            sub_channel,
            slots: slots.iter().map(UserSlot::from_config).collect(),
        }
    }

    /// The configured sub-channel the slots are polled on.
    #[must_use]
    pub fn sub_channel(&self) -> u8 {
        self.sub_channel
    }

    /// The configured slots, in slot order.
    #[must_use]
    pub fn slots(&self) -> &[UserSlot] {
        &self.slots
    }

    pub(crate) fn handle_double(&self, sub_channel: u8, name: &str, value: f64) -> bool {
        self.apply(sub_channel, name, |kind| kind.from_wire_double(value))
    }

    pub(crate) fn handle_int(&self, sub_channel: u8, name: &str, value: i32) -> bool {
        self.apply(sub_channel, name, |kind| kind.from_wire_int(value))
    }

    pub(crate) fn handle_bool(&self, sub_channel: u8, name: &str, value: bool) -> bool {
        self.apply(sub_channel, name, |kind| kind.from_wire_bool(value))
    }

    fn apply<F>(&self, sub_channel: u8, name: &str, decode: F) -> bool
    where
        F: Fn(SlotKind) -> Option<DatapointValue>,
    {
        if sub_channel != self.sub_channel {
            return false;
        }
        for (index, slot) in self.slots.iter().enumerate() {
            if !slot.access.readable() || slot.parameter != name {
                continue;
            }
            if let Some(value) = decode(slot.kind) {
                debug!(slot = index, parameter = name, %value, "user slot decode");
                slot.datapoint.write_if_changed(value);
                return true;
            }
        }
        false
    }

    pub(crate) fn encode(&self, write: &BusWrite) -> Result<Vec<SetValueCall>, ValueError> {
        let BusWrite::SetSlot { slot: index, value } = write else {
            return Err(ValueError::WriteNotSupported {
                device: "user-defined",
                write: write.name(),
            });
        };
        let slot = self
            .slots
            .get(*index)
            .ok_or(ValueError::SlotOutOfRange {
                max: self.slots.len().saturating_sub(1),
                actual: *index,
            })?;
        if !slot.access.writable() {
            return Err(ValueError::SlotAccessDenied {
                index: *index,
                operation: "write",
            });
        }
        let wire = slot
            .kind
            .to_wire(value)
            .ok_or(ValueError::SlotKindMismatch {
                index: *index,
                expected: slot.kind.expects(),
                actual: value.kind_name(),
            })?;
        if slot.kind == SlotKind::Trigger && wire == RpcValue::Bool(false) {
            trace!(slot = index, parameter = %slot.parameter, "trigger not fired");
            return Ok(Vec::new());
        }
        Ok(vec![SetValueCall::new(slot.parameter.clone(), wire)])
    }

    pub(crate) fn datapoints(&self) -> Vec<Arc<Datapoint>> {
        self.slots
            .iter()
            .map(|slot| Arc::clone(&slot.datapoint))
            .collect()
    }
}
