// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Decoding `Device(...)` blocks into normalized devices.
//!
//! Decoding degrades per record: a block with too few fields, an
//! unparseable id, or a mangled channel is dropped with a warning and
//! the rest of the batch continues. Only the caller decides whether an
//! empty result is a problem.

use tracing::warn;

use crate::config::FieldLayout;
use crate::device::{
    ATTR_FIRMWARE_VERSION, ATTR_LAST_UPDATED, ATTR_MAC_ADDRESS, ATTR_SSID, ATTR_WIFI_SIGNAL,
    Device,
};
use crate::scrape::tokenizer::{split_args, split_constructors, unquote};
use crate::types::{Reading, Value, parse_sync_timestamp};

// Positions inside a Channel(...) invocation. Stable across every
// observed site version, unlike the device field indices.
const CHANNEL_LABEL: usize = 0;
const CHANNEL_READING: usize = 1;
const CHANNEL_UNIT: usize = 2;

/// Decodes the raw array span into normalized devices.
///
/// An input with no recognizable `Device(` invocations yields an empty
/// list, never an error.
pub(crate) fn decode(raw: &str, layout: &FieldLayout) -> Vec<Device> {
    let blocks = split_constructors(raw, "Device");
    if blocks.is_empty() {
        if !raw.trim().is_empty() {
            warn!("array literal contains no recognizable Device blocks");
        }
        return Vec::new();
    }
    blocks
        .into_iter()
        .filter_map(|block| decode_device(block, layout))
        .collect()
}

/// Decodes one `Device(...)` argument list, or `None` if the block is
/// unusable.
fn decode_device(args: &str, layout: &FieldLayout) -> Option<Device> {
    let tokens = split_args(args);

    // The embedded channel sub-list ends the scalar field run.
    let channel_pos = tokens
        .iter()
        .position(|t| t.trim_start().starts_with('['));
    let scalars = &tokens[..channel_pos.unwrap_or(tokens.len())];

    let required = layout.required_count();
    if scalars.len() < required {
        warn!(
            found = scalars.len(),
            required,
            "skipping device block with too few fields"
        );
        return None;
    }

    let id_field = unquote(scalars[layout.id]);
    let Ok(id) = id_field.parse::<u32>() else {
        warn!(id = %id_field, "skipping device block with unparseable id");
        return None;
    };

    let mut device = Device::new(id, unquote(scalars[layout.name]), unquote(scalars[layout.model]));

    device.set_attribute(
        ATTR_MAC_ADDRESS,
        Reading::bare(Value::from_text(&unquote(scalars[layout.mac]))),
    );
    device.set_attribute(
        ATTR_FIRMWARE_VERSION,
        Reading::bare(Value::from_text(&unquote(scalars[layout.firmware]))),
    );
    device.set_attribute(
        ATTR_SSID,
        Reading::bare(Value::from_text(&unquote(scalars[layout.ssid]))),
    );
    device.set_attribute(
        ATTR_WIFI_SIGNAL,
        Reading::bare(Value::from_scraped(&unquote(scalars[layout.wifi_signal]))),
    );

    let last_sync = parse_sync_timestamp(&unquote(scalars[layout.last_sync]));
    device.set_attribute(
        ATTR_LAST_UPDATED,
        Reading::bare(last_sync.map(Value::Timestamp)),
    );

    if let Some(pos) = channel_pos {
        decode_channels(tokens[pos], &mut device);
    }

    Some(device)
}

/// Decodes the `[new Channel(...), ...]` sub-list onto the device.
fn decode_channels(span: &str, device: &mut Device) {
    for args in split_constructors(span, "Channel") {
        let tokens = split_args(args);
        if tokens.len() <= CHANNEL_UNIT {
            warn!(
                device_id = device.id,
                found = tokens.len(),
                "skipping channel block with too few fields"
            );
            continue;
        }
        let label = unquote(tokens[CHANNEL_LABEL]);
        if label.is_empty() {
            warn!(device_id = device.id, "skipping channel block with empty label");
            continue;
        }
        let value = Value::from_scraped(&unquote(tokens[CHANNEL_READING]));
        let unit = unquote(tokens[CHANNEL_UNIT]);
        device.set_attribute(label, Reading::new(value, Some(unit.as_str())));
    }
}
