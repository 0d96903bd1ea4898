// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bus datapoint objects.
//!
//! A [`Datapoint`] is one typed value exposed on the automation bus. The
//! bridge publishes decoded device state into datapoints and consumers read
//! them from any task. Two publishing modes exist, matching the bus API this
//! library fronts:
//!
//! - [`Datapoint::write`] - publish unconditionally (one bus send per call)
//! - [`Datapoint::write_if_changed`] - publish only when the value differs
//!   from the last one, reporting whether a send occurred
//!
//! Group alarms and most decoded parameters use the change-gated form so a
//! steady device does not flood the bus on every poll.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// A value carried by a bus datapoint.
///
/// The four variants cover everything the bridge decodes: switch and alarm
/// states, counters and valve positions, temperatures and voltages, and
/// display text. Percent-scaled parameters are carried as fractions in
/// `[0.0, 1.0]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DatapointValue {
    /// Binary state (switch, alarm, trigger).
    Bool(bool),
    /// Signed integer (counter, state code, option index).
    Int(i64),
    /// Floating-point value (temperature, voltage, fraction).
    Float(f64),
    /// Free text (diagnostic output).
    Text(String),
}

impl DatapointValue {
    /// Returns the boolean payload, if this is a `Bool` value.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer payload, if this is an `Int` value.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the float payload, if this is a `Float` value.
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Short name of the carried kind, for logs and errors.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
        }
    }
}

impl std::fmt::Display for DatapointValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(t) => write!(f, "{t}"),
        }
    }
}

impl From<bool> for DatapointValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for DatapointValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for DatapointValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// A named, typed value on the automation bus.
///
/// The value starts out unset and becomes set on the first write. Reads are
/// thread-safe via `parking_lot::RwLock`, so consumers on other tasks can
/// observe the bridge's output without coordination.
///
/// # Examples
///
/// ```
/// use ccu_bridge::bus::{Datapoint, DatapointValue};
///
/// let dp = Datapoint::new("temp_current");
/// assert!(dp.read().is_none());
///
/// assert!(dp.write_if_changed(DatapointValue::Float(21.5)));
/// assert!(!dp.write_if_changed(DatapointValue::Float(21.5)));
/// assert_eq!(dp.sends(), 1);
/// ```
#[derive(Debug)]
pub struct Datapoint {
    name: String,
    value: RwLock<Option<DatapointValue>>,
    sends: AtomicU64,
}

impl Datapoint {
    /// Creates an unset datapoint with the given bus name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: RwLock::new(None),
            sends: AtomicU64::new(0),
        }
    }

    /// Returns the bus name of this datapoint.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the current value, or `None` if never written.
    #[must_use]
    pub fn read(&self) -> Option<DatapointValue> {
        self.value.read().clone()
    }

    /// Publishes `value` unconditionally and counts one bus send.
    pub fn write(&self, value: DatapointValue) {
        *self.value.write() = Some(value);
        self.sends.fetch_add(1, Ordering::Relaxed);
    }

    /// Publishes `value` only if it differs from the current one.
    ///
    /// The first write to an unset datapoint always sends. Returns whether
    /// a bus send occurred.
    pub fn write_if_changed(&self, value: DatapointValue) -> bool {
        let mut guard = self.value.write();
        if guard.as_ref() == Some(&value) {
            return false;
        }
        *guard = Some(value);
        self.sends.fetch_add(1, Ordering::Relaxed);
        true
    }

    /// Number of bus sends performed on this datapoint so far.
    #[must_use]
    pub fn sends(&self) -> u64 {
        self.sends.load(Ordering::Relaxed)
    }
}
