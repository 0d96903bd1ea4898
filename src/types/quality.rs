// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Radio signal quality derived from RSSI readings.
//!
//! The hub reports two raw RSSI values per device link, one measured at the
//! device and one at its peer. [`SignalQuality`] combines them by taking the
//! worse (lower) of the pair and mapping it onto a percentage through a
//! fixed linear scale:
//!
//! | Raw level     | Quality |
//! |---------------|---------|
//! | <= -100 dBm   | 0 %     |
//! | -70 dBm       | 50 %    |
//! | >= -40 dBm    | 100 %   |
//!
//! The hub uses the reserved raw value `65536` for "no reading"; if either
//! half of the pair carries it, the combined quality is [`SignalQuality::UNKNOWN`]
//! regardless of the other half.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Combined link quality as a percentage, or the unknown marker.
///
/// # Examples
///
/// ```
/// use ccu_bridge::types::SignalQuality;
///
/// let q = SignalQuality::from_rssi_pair(-40, -50);
/// assert_eq!(q.percent(), Some(83));
///
/// let unknown = SignalQuality::from_rssi_pair(SignalQuality::RAW_UNKNOWN, -50);
/// assert!(unknown.is_unknown());
/// assert_eq!(unknown.code(), SignalQuality::UNKNOWN_CODE);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignalQuality(u8);

impl SignalQuality {
    /// Raw RSSI value the hub reports when no reading exists.
    pub const RAW_UNKNOWN: i32 = 65536;

    /// Output code published when the quality cannot be computed.
    pub const UNKNOWN_CODE: u8 = 255;

    /// The "quality unknown" marker value.
    pub const UNKNOWN: Self = Self(Self::UNKNOWN_CODE);

    /// Raw level mapped to 0 %.
    const FLOOR_DBM: i32 = -100;

    /// Raw level mapped to 100 %.
    const CEIL_DBM: i32 = -40;

    /// Combines a device/peer RSSI pair into one quality value.
    ///
    /// The worse (lower) raw level of the pair determines the result. The
    /// reserved raw value [`Self::RAW_UNKNOWN`] on either half forces
    /// [`Self::UNKNOWN`].
    #[must_use]
    pub fn from_rssi_pair(device: i32, peer: i32) -> Self {
        if device == Self::RAW_UNKNOWN || peer == Self::RAW_UNKNOWN {
            return Self::UNKNOWN;
        }
        Self::from_dbm(device.min(peer))
    }

    /// Maps one raw RSSI level onto the percentage scale, clamping outside
    /// the anchor range.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_dbm(dbm: i32) -> Self {
        let clamped = dbm.clamp(Self::FLOOR_DBM, Self::CEIL_DBM);
        let span = Self::CEIL_DBM - Self::FLOOR_DBM;
        // Safe: clamped to [FLOOR, CEIL], so the scaled value is in [0, 100]
        Self(((clamped - Self::FLOOR_DBM) * 100 / span) as u8)
    }

    /// Returns the percentage, or `None` for the unknown marker.
    #[must_use]
    pub fn percent(&self) -> Option<u8> {
        if self.is_unknown() { None } else { Some(self.0) }
    }

    /// Whether this is the unknown marker.
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        self.0 == Self::UNKNOWN_CODE
    }

    /// The raw output code published on the bus: the percentage, or
    /// [`Self::UNKNOWN_CODE`].
    #[must_use]
    pub const fn code(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for SignalQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unknown() {
            write!(f, "unknown")
        } else {
            write!(f, "{}%", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worse_of_pair_wins() {
        // -50 is worse than -40 and maps to 83 % on the fixed scale
        let q = SignalQuality::from_rssi_pair(-40, -50);
        assert_eq!(q.percent(), Some(83));

        let q = SignalQuality::from_rssi_pair(-50, -40);
        assert_eq!(q.percent(), Some(83));
    }

    #[test]
    fn scale_anchors() {
        assert_eq!(SignalQuality::from_dbm(-100).percent(), Some(0));
        assert_eq!(SignalQuality::from_dbm(-70).percent(), Some(50));
        assert_eq!(SignalQuality::from_dbm(-40).percent(), Some(100));
    }

    #[test]
    fn scale_clamps_outside_anchors() {
        assert_eq!(SignalQuality::from_dbm(-120).percent(), Some(0));
        assert_eq!(SignalQuality::from_dbm(-10).percent(), Some(100));
        assert_eq!(SignalQuality::from_dbm(0).percent(), Some(100));
    }

    #[test]
    fn sentinel_forces_unknown() {
        let q = SignalQuality::from_rssi_pair(SignalQuality::RAW_UNKNOWN, -50);
        assert!(q.is_unknown());
        assert_eq!(q.code(), 255);

        let q = SignalQuality::from_rssi_pair(-50, SignalQuality::RAW_UNKNOWN);
        assert!(q.is_unknown());

        let q = SignalQuality::from_rssi_pair(
            SignalQuality::RAW_UNKNOWN,
            SignalQuality::RAW_UNKNOWN,
        );
        assert!(q.is_unknown());
    }

    #[test]
    fn unknown_has_no_percent() {
        assert_eq!(SignalQuality::UNKNOWN.percent(), None);
    }

    #[test]
    fn display() {
        assert_eq!(SignalQuality::from_dbm(-70).to_string(), "50%");
        assert_eq!(SignalQuality::UNKNOWN.to_string(), "unknown");
    }
}
