// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The normalized device model and the caller-owned reading cache.

use std::collections::BTreeMap;
use std::collections::HashMap;

use serde::Serialize;

use crate::types::{Reading, Value};

/// Attribute label for the MAC address.
pub const ATTR_MAC_ADDRESS: &str = "MAC Address";
/// Attribute label for the firmware version.
pub const ATTR_FIRMWARE_VERSION: &str = "Firmware Version";
/// Attribute label for the wireless network name.
pub const ATTR_SSID: &str = "SSID";
/// Attribute label for the signal strength.
pub const ATTR_WIFI_SIGNAL: &str = "WiFi Signal";
/// Attribute label for the last-communication timestamp.
pub const ATTR_LAST_UPDATED: &str = "Last Updated";

/// One normalized device: identity fields plus a label-keyed map of
/// diagnostic attributes and sensor channels.
///
/// `id`, `name`, and `model` are plain fields; every `attributes` entry
/// is a [`Reading`]. A fresh snapshot is produced each polling cycle —
/// the only cross-cycle identity is a matching `id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Device {
    /// Upstream device id, stable across scrapes for the same hardware.
    pub id: u32,
    /// Display name (live status may override the scraped one).
    pub name: String,
    /// Hardware model identifier, e.g. `EL-USB-TC`.
    pub model: String,
    /// Diagnostic attributes and channel readings, keyed by label.
    pub attributes: BTreeMap<String, Reading>,
}

impl Device {
    /// Creates a device with empty attributes.
    #[must_use]
    pub fn new(id: u32, name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            model: model.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Returns the reading for a label, if present.
    #[must_use]
    pub fn attribute(&self, label: &str) -> Option<&Reading> {
        self.attributes.get(label)
    }

    /// Inserts or replaces a reading.
    pub fn set_attribute(&mut self, label: impl Into<String>, reading: Reading) {
        self.attributes.insert(label.into(), reading);
    }

    /// Iterates over the sensor channels, skipping the five static
    /// diagnostic attributes.
    pub fn channels(&self) -> impl Iterator<Item = (&str, &Reading)> {
        const DIAGNOSTICS: [&str; 5] = [
            ATTR_MAC_ADDRESS,
            ATTR_FIRMWARE_VERSION,
            ATTR_SSID,
            ATTR_WIFI_SIGNAL,
            ATTR_LAST_UPDATED,
        ];
        self.attributes
            .iter()
            .filter(|(label, _)| !DIAGNOSTICS.contains(&label.as_str()))
            .map(|(label, reading)| (label.as_str(), reading))
    }
}

/// Caller-owned cache of last known good readings, keyed by device id
/// and channel label.
///
/// The engine holds no state between cycles; callers that want sensor
/// entities to ride out a cycle of sentinels keep one of these alive and
/// pass it into the refresh. A `None` reading is backfilled from the
/// cache, a real reading updates it. Timestamps are cached like any
/// other value.
#[derive(Debug, Default)]
pub struct ReadingCache {
    entries: HashMap<(u32, String), Value>,
}

impl ReadingCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached value for a device/label pair.
    #[must_use]
    pub fn get(&self, device_id: u32, label: &str) -> Option<&Value> {
        self.entries.get(&(device_id, label.to_string()))
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing has been cached yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fills `None` readings on the device from the cache and records
    /// present ones into it.
    pub fn backfill(&mut self, device: &mut Device) {
        for (label, reading) in &mut device.attributes {
            let key = (device.id, label.clone());
            match &reading.value {
                Some(value) => {
                    self.entries.insert(key, value.clone());
                }
                None => {
                    if let Some(cached) = self.entries.get(&key) {
                        reading.value = Some(cached.clone());
                    }
                }
            }
        }
    }
}
