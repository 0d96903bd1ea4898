// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Group health aggregation.
//!
//! The [`HealthAggregator`] consolidates per-channel health flags into
//! group-level alarms. Six groups exist: group 0 always contains every
//! active channel, groups 1 through 5 are configured subsets. Membership
//! and status are tracked as 64-bit masks, one bit per channel slot.
//!
//! A channel counts as *unknown* until its first poll cycle completes;
//! the bit clears on that first report and never comes back. Alarms are
//! emitted asymmetrically:
//!
//! - an alarm-**true** result goes out as soon as any member raises the
//!   status, even while other members are still unknown
//! - an alarm-**false** result goes out only once every member of the
//!   group has reported at least once
//!
//! Without the second rule a group would appear healthy at startup merely
//! because none of its members had been polled yet.

use std::sync::Arc;

use tracing::debug;

use crate::bus::{Datapoint, DatapointValue};

/// Number of health groups, including the implicit all-channels group 0.
pub const GROUPS: usize = 6;

/// The alarm datapoints of one health group.
#[derive(Debug, Clone)]
pub struct GroupAlarms {
    unreachable: Arc<Datapoint>,
    battery_warning: Arc<Datapoint>,
    error: Arc<Datapoint>,
}

impl GroupAlarms {
    fn new(group: usize) -> Self {
        Self {
            unreachable: Arc::new(Datapoint::new(format!("group{group}_unreachable"))),
            battery_warning: Arc::new(Datapoint::new(format!("group{group}_battery_warning"))),
            error: Arc::new(Datapoint::new(format!("group{group}_error"))),
        }
    }

    /// Alarm raised while any member of the group is unreachable.
    #[must_use]
    pub fn unreachable(&self) -> &Arc<Datapoint> {
        &self.unreachable
    }

    /// Alarm raised while any member reports a low battery.
    #[must_use]
    pub fn battery_warning(&self) -> &Arc<Datapoint> {
        &self.battery_warning
    }

    /// Alarm raised while any member reports a device fault.
    #[must_use]
    pub fn error(&self) -> &Arc<Datapoint> {
        &self.error
    }
}

/// Consolidates per-channel health flags into per-group alarms.
///
/// # Examples
///
/// ```
/// use ccu_bridge::bus::DatapointValue;
/// use ccu_bridge::health::HealthAggregator;
///
/// // two channels, both in group 0, channel 1 also in group 1
/// let mut health = HealthAggregator::new([0b11, 0b10, 0, 0, 0, 0]);
///
/// health.report(0, true, false, false);
/// // the negative surfaces immediately, channel 1 still unknown
/// assert_eq!(
///     health.alarms(0).unreachable().read(),
///     Some(DatapointValue::Bool(true))
/// );
///
/// health.report(0, false, false, false);
/// // the all-clear waits for channel 1's first report
/// assert_eq!(
///     health.alarms(0).unreachable().read(),
///     Some(DatapointValue::Bool(true))
/// );
/// health.report(1, false, false, false);
/// assert_eq!(
///     health.alarms(0).unreachable().read(),
///     Some(DatapointValue::Bool(false))
/// );
/// ```
#[derive(Debug)]
pub struct HealthAggregator {
    masks: [u64; GROUPS],
    alarms: [GroupAlarms; GROUPS],
    unknown: u64,
    unreachable: u64,
    battery_warning: u64,
    error: u64,
}

impl HealthAggregator {
    /// Creates the aggregator for the given group membership masks.
    ///
    /// `masks[0]` must hold every active channel; it doubles as the initial
    /// unknown set. Masks of unused groups are zero and those groups never
    /// emit.
    #[must_use]
    pub fn new(masks: [u64; GROUPS]) -> Self {
        Self {
            masks,
            alarms: std::array::from_fn(GroupAlarms::new),
            unknown: masks[0],
            unreachable: 0,
            battery_warning: 0,
            error: 0,
        }
    }

    /// The membership mask of one group.
    #[must_use]
    pub fn group_mask(&self, group: usize) -> u64 {
        self.masks[group]
    }

    /// The alarm datapoints of one group.
    #[must_use]
    pub fn alarms(&self, group: usize) -> &GroupAlarms {
        &self.alarms[group]
    }

    /// Whether a channel has completed at least one poll cycle.
    #[must_use]
    pub fn is_known(&self, index: usize) -> bool {
        self.unknown & bit(index) == 0
    }

    /// Records the outcome of one completed poll cycle and re-emits the
    /// affected group alarms.
    ///
    /// Called exactly once per cycle per channel, for failed cycles too.
    /// The channel's unknown bit clears on the first call and stays
    /// cleared for the process lifetime.
    pub fn report(&mut self, index: usize, unreachable: bool, battery_warning: bool, error: bool) {
        let bit = bit(index);
        self.unknown &= !bit;
        set_or_clear(&mut self.unreachable, bit, unreachable);
        set_or_clear(&mut self.battery_warning, bit, battery_warning);
        set_or_clear(&mut self.error, bit, error);
        debug!(
            channel = index,
            unreachable, battery_warning, error, "health report"
        );

        for group in 0..GROUPS {
            let mask = self.masks[group];
            if mask == 0 {
                continue;
            }
            let all_known = self.unknown & mask == 0;
            let alarms = &self.alarms[group];
            for (status, alarm) in [
                (self.unreachable, &alarms.unreachable),
                (self.battery_warning, &alarms.battery_warning),
                (self.error, &alarms.error),
            ] {
                let raised = status & mask != 0;
                // negatives are surfaced eagerly, the all-clear only once
                // every member has reported
                if all_known || raised {
                    alarm.write_if_changed(DatapointValue::Bool(raised));
                }
            }
        }
    }
}

fn bit(index: usize) -> u64 {
    1u64 << index
}

fn set_or_clear(mask: &mut u64, bit: u64, value: bool) {
    if value {
        *mask |= bit;
    } else {
        *mask &= !bit;
    }
}
