// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Access mask for user-defined datapoint slots.
//!
//! Each user-defined slot carries a three-bit access mask controlling which
//! directions the bridge services for it:
//!
//! | Bit    | Meaning                                      |
//! |--------|----------------------------------------------|
//! | `0x01` | readable - value is decoded from poll responses |
//! | `0x02` | writable - bus writes are forwarded to the hub |
//! | `0x04` | event-based - value is expected to change asynchronously |

use std::fmt;

use serde::{Deserialize, Serialize};

/// Read/write/event access bits for one user-defined slot.
///
/// # Examples
///
/// ```
/// use ccu_bridge::types::AccessMask;
///
/// let ro = AccessMask::READ;
/// assert!(ro.readable());
/// assert!(!ro.writable());
///
/// let rw = AccessMask::READ | AccessMask::WRITE;
/// assert!(rw.readable());
/// assert!(rw.writable());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AccessMask(u8);

impl AccessMask {
    /// No access; the slot is decorative.
    pub const NONE: Self = Self(0);

    /// Value is decoded from poll responses.
    pub const READ: Self = Self(0x01);

    /// Bus writes are forwarded to the hub.
    pub const WRITE: Self = Self(0x02);

    /// Value is expected to change without a bus write.
    pub const EVENT: Self = Self(0x04);

    /// Creates a mask from raw configuration bits. Unknown bits are kept.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Returns the raw bits.
    #[must_use]
    pub const fn bits(&self) -> u8 {
        self.0
    }

    /// Whether the readable bit is set.
    #[must_use]
    pub const fn readable(&self) -> bool {
        self.0 & Self::READ.0 != 0
    }

    /// Whether the writable bit is set.
    #[must_use]
    pub const fn writable(&self) -> bool {
        self.0 & Self::WRITE.0 != 0
    }

    /// Whether the event bit is set.
    #[must_use]
    pub const fn event_based(&self) -> bool {
        self.0 & Self::EVENT.0 != 0
    }
}

impl std::ops::BitOr for AccessMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Display for AccessMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            if self.readable() { 'r' } else { '-' },
            if self.writable() { 'w' } else { '-' },
            if self.event_based() { 'e' } else { '-' },
        )
    }
}
