// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value kinds for user-defined datapoint slots.
//!
//! A [`SlotKind`] fixes how one user-defined slot translates between its bus
//! datapoint and the hub's wire parameter:
//!
//! | Kind             | Code | Bus value        | Wire kind | Transform          |
//! |------------------|------|------------------|-----------|--------------------|
//! | `Trigger`        | 1    | bool (fire on true) | boolean | pass-through       |
//! | `Boolean`        | 2    | bool             | boolean   | pass-through       |
//! | `Float`          | 3    | float            | double    | pass-through       |
//! | `Integer`        | 4    | integer          | i4        | pass-through       |
//! | `Choice`         | 5    | integer (option index) | i4  | pass-through       |
//! | `FloatPercent`   | 6    | fraction 0.0-1.0 | double    | x100 out, /100 in  |
//! | `IntegerPercent` | 7    | fraction 0.0-1.0 | i4        | x100 out, /100 in  |
//! | `FloatAmplitude` | 8    | float            | double    | pass-through       |
//!
//! Percent kinds carry normalized fractions on the bus and whole percents on
//! the wire: a bus value of `0.42` travels as `42`.

use serde::{Deserialize, Serialize};

use crate::bus::DatapointValue;
use crate::types::RpcValue;

/// The value kind of one user-defined slot.
///
/// # Examples
///
/// ```
/// use ccu_bridge::types::{RpcValue, SlotKind};
/// use ccu_bridge::bus::DatapointValue;
///
/// let kind = SlotKind::FloatPercent;
/// assert_eq!(
///     kind.to_wire(&DatapointValue::Float(0.42)),
///     Some(RpcValue::Double(42.0))
/// );
/// assert_eq!(
///     kind.from_wire_double(42.0),
///     Some(DatapointValue::Float(0.42))
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotKind {
    /// One-shot action; a write fires only when the bus value is true.
    Trigger,
    /// Plain boolean state.
    Boolean,
    /// Absolute floating-point value.
    Float,
    /// Signed integer value.
    Integer,
    /// Enumerated option carried as an integer index.
    Choice,
    /// Percentage as a double, fraction on the bus.
    FloatPercent,
    /// Percentage as an integer, fraction on the bus.
    IntegerPercent,
    /// Floating-point amplitude value.
    FloatAmplitude,
}

impl SlotKind {
    /// Resolves a numeric configuration code to a kind.
    ///
    /// Code `0` means "slot not configured" and maps to `None`, as does any
    /// unknown code.
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Trigger),
            2 => Some(Self::Boolean),
            3 => Some(Self::Float),
            4 => Some(Self::Integer),
            5 => Some(Self::Choice),
            6 => Some(Self::FloatPercent),
            7 => Some(Self::IntegerPercent),
            8 => Some(Self::FloatAmplitude),
            _ => None,
        }
    }

    /// The numeric configuration code of this kind.
    #[must_use]
    pub fn code(&self) -> u8 {
        match self {
            Self::Trigger => 1,
            Self::Boolean => 2,
            Self::Float => 3,
            Self::Integer => 4,
            Self::Choice => 5,
            Self::FloatPercent => 6,
            Self::IntegerPercent => 7,
            Self::FloatAmplitude => 8,
        }
    }

    /// The bus value kind this slot expects on writes, for error messages.
    #[must_use]
    pub fn expects(&self) -> &'static str {
        match self {
            Self::Trigger | Self::Boolean => "bool",
            Self::Float | Self::FloatPercent | Self::IntegerPercent | Self::FloatAmplitude => {
                "float"
            }
            Self::Integer | Self::Choice => "integer",
        }
    }

    /// Maps a bus value to the wire parameter written for this kind.
    ///
    /// Returns `None` when the bus value's kind does not fit this slot, or
    /// when an integer value does not fit the wire's 32 bits.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_wire(self, value: &DatapointValue) -> Option<RpcValue> {
        match (self, value) {
            (Self::Trigger | Self::Boolean, DatapointValue::Bool(b)) => Some(RpcValue::Bool(*b)),
            (Self::Float | Self::FloatAmplitude, DatapointValue::Float(v)) => {
                Some(RpcValue::Double(*v))
            }
            (Self::FloatPercent, DatapointValue::Float(v)) => Some(RpcValue::Double(v * 100.0)),
            (Self::IntegerPercent, DatapointValue::Float(v)) => {
                // Safe: a fraction scaled to percent is far inside i32 range
                Some(RpcValue::Int((v * 100.0).round() as i32))
            }
            (Self::Integer | Self::Choice, DatapointValue::Int(i)) => {
                i32::try_from(*i).ok().map(RpcValue::Int)
            }
            _ => None,
        }
    }

    /// Decodes a wire `double` into a bus value, if this kind takes doubles.
    #[must_use]
    pub fn from_wire_double(self, wire: f64) -> Option<DatapointValue> {
        match self {
            Self::Float | Self::FloatAmplitude => Some(DatapointValue::Float(wire)),
            Self::FloatPercent => Some(DatapointValue::Float(wire / 100.0)),
            _ => None,
        }
    }

    /// Decodes a wire `i4` into a bus value, if this kind takes integers.
    #[must_use]
    pub fn from_wire_int(self, wire: i32) -> Option<DatapointValue> {
        match self {
            Self::Integer | Self::Choice => Some(DatapointValue::Int(i64::from(wire))),
            Self::IntegerPercent => Some(DatapointValue::Float(f64::from(wire) / 100.0)),
            _ => None,
        }
    }

    /// Decodes a wire `boolean` into a bus value, if this kind takes booleans.
    #[must_use]
    pub fn from_wire_bool(self, wire: bool) -> Option<DatapointValue> {
        match self {
            Self::Trigger | Self::Boolean => Some(DatapointValue::Bool(wire)),
            _ => None,
        }
    }
}

impl std::fmt::Display for SlotKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Trigger => "trigger",
            Self::Boolean => "boolean",
            Self::Float => "float",
            Self::Integer => "integer",
            Self::Choice => "choice",
            Self::FloatPercent => "float-percent",
            Self::IntegerPercent => "integer-percent",
            Self::FloatAmplitude => "float-amplitude",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_round_trip() {
        for code in 1..=8 {
            let kind = SlotKind::from_code(code).unwrap();
            assert_eq!(kind.code(), code);
        }
        assert!(SlotKind::from_code(0).is_none());
        assert!(SlotKind::from_code(9).is_none());
    }

    #[test]
    fn float_percent_encodes_fraction_as_percent() {
        let wire = SlotKind::FloatPercent.to_wire(&DatapointValue::Float(0.42));
        assert_eq!(wire, Some(RpcValue::Double(42.0)));
    }

    #[test]
    fn float_percent_decodes_percent_as_fraction() {
        let value = SlotKind::FloatPercent.from_wire_double(42.0);
        assert_eq!(value, Some(DatapointValue::Float(0.42)));
    }

    #[test]
    fn integer_percent_round_trip() {
        let wire = SlotKind::IntegerPercent.to_wire(&DatapointValue::Float(0.42));
        assert_eq!(wire, Some(RpcValue::Int(42)));
        let value = SlotKind::IntegerPercent.from_wire_int(42);
        assert_eq!(value, Some(DatapointValue::Float(0.42)));
    }

    #[test]
    fn pass_through_kinds() {
        assert_eq!(
            SlotKind::Float.to_wire(&DatapointValue::Float(21.5)),
            Some(RpcValue::Double(21.5))
        );
        assert_eq!(
            SlotKind::Integer.to_wire(&DatapointValue::Int(-3)),
            Some(RpcValue::Int(-3))
        );
        assert_eq!(
            SlotKind::Boolean.to_wire(&DatapointValue::Bool(true)),
            Some(RpcValue::Bool(true))
        );
        assert_eq!(
            SlotKind::Choice.from_wire_int(2),
            Some(DatapointValue::Int(2))
        );
    }

    #[test]
    fn kind_mismatch_yields_none() {
        assert!(SlotKind::Boolean.to_wire(&DatapointValue::Float(1.0)).is_none());
        assert!(SlotKind::Float.to_wire(&DatapointValue::Bool(true)).is_none());
        assert!(SlotKind::Integer.from_wire_double(1.0).is_none());
        assert!(SlotKind::Float.from_wire_bool(true).is_none());
        assert!(SlotKind::Trigger.from_wire_int(1).is_none());
    }

    #[test]
    fn integer_overflow_yields_none() {
        let too_big = DatapointValue::Int(i64::from(i32::MAX) + 1);
        assert!(SlotKind::Integer.to_wire(&too_big).is_none());
    }

    #[test]
    fn amplitude_passes_through() {
        assert_eq!(
            SlotKind::FloatAmplitude.from_wire_double(0.001),
            Some(DatapointValue::Float(0.001))
        );
    }
}
