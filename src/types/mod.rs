// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for hub communication and slot configuration.
//!
//! This module provides type-safe representations of the values the bridge
//! moves between the bus and the hub. Each type fixes its wire form and
//! valid range at construction time.
//!
//! # Types
//!
//! - [`RpcValue`] - one typed XML-RPC parameter (string/double/i4/boolean)
//! - [`AccessMask`] - read/write/event bits of a user-defined slot
//! - [`SlotKind`] - value kind and wire transform of a user-defined slot
//! - [`SignalQuality`] - combined radio link quality with unknown marker

mod access;
mod kind;
mod quality;
mod value;

pub use access::AccessMask;
pub use kind::SlotKind;
pub use quality::SignalQuality;
pub use value::RpcValue;
