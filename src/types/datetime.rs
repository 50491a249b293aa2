// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parsing for the dashboard's timestamp format.
//!
//! The device listing and the live-status payload both carry timestamps
//! as `day/month/year hour:minute:second` wall-clock strings with no
//! timezone, e.g. `"15/06/2024 08:30:00"`. Placeholder strings such as
//! `"--/--/---- --:--:--"` appear for devices that have never synced and
//! are expected noise, not errors.

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, TimeZone};

/// Exact format of upstream sync timestamps (24-hour clock, two-digit
/// day and month).
pub(crate) const SYNC_TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Parses an upstream sync timestamp into a timezone-aware datetime.
///
/// The wall-clock string is resolved against the host's local offset;
/// across a DST fold the earlier candidate wins. Returns `None` for
/// malformed or placeholder strings.
///
/// # Examples
///
/// ```
/// use easylog_cloud::parse_sync_timestamp;
///
/// assert!(parse_sync_timestamp("15/06/2024 08:30:00").is_some());
/// assert!(parse_sync_timestamp("--/--/---- --:--:--").is_none());
/// ```
#[must_use]
pub fn parse_sync_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let naive = NaiveDateTime::parse_from_str(raw.trim(), SYNC_TIMESTAMP_FORMAT).ok()?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.fixed_offset())
}
