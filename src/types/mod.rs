// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for normalized sensor readings.
//!
//! # Types
//!
//! - [`Value`] - a coerced reading value (integer, float, text, or timestamp)
//! - [`Reading`] - a `{value, unit}` pair attached to a channel or
//!   diagnostic attribute

mod datetime;
mod reading;

pub use datetime::parse_sync_timestamp;
pub use reading::{Reading, Value};
