// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Live-status payload parsing and merging.
//!
//! The per-device status endpoint usually answers JSON
//! (`{"d": {...}}`), but older site versions wrap the same JSON in a
//! legacy XML envelope (`<string ...>{"d": ...}</string>`). The channel
//! collection inside the payload arrives in three shapes — a
//! `channelDetails` wrapper holding one object or a list, a bare list,
//! or nothing at all — and all of them normalize to "zero or more
//! channels" here.

use serde::Deserialize;
use tracing::warn;

use crate::device::{ATTR_FIRMWARE_VERSION, ATTR_LAST_UPDATED, ATTR_WIFI_SIGNAL, Device};
use crate::error::ParseError;
use crate::types::{Reading, Value, parse_sync_timestamp};

/// Top-level response object; the payload sits under `d` on current
/// site versions and `deviceStatus` on older ones.
#[derive(Debug, Deserialize)]
struct StatusEnvelope {
    #[serde(default)]
    d: Option<LiveStatus>,
    #[serde(rename = "deviceStatus", default)]
    device_status: Option<LiveStatus>,
}

impl StatusEnvelope {
    /// A response that parses but carries neither key merges as an
    /// empty override set — the device is kept.
    fn into_status(self) -> LiveStatus {
        self.d.or(self.device_status).unwrap_or_default()
    }
}

/// Parsed live-status payload for one device.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct LiveStatus {
    #[serde(rename = "sensorName", default)]
    sensor_name: Option<String>,
    #[serde(rename = "firmwareVersion", default)]
    firmware_version: Option<String>,
    #[serde(default)]
    rssi: Option<serde_json::Value>,
    #[serde(rename = "lastCommFormatted", default)]
    last_comm: Option<String>,
    #[serde(default)]
    channels: Option<ChannelCollection>,
}

impl LiveStatus {
    /// Normalizes the channel collection to a flat list.
    fn channel_list(&self) -> Vec<&LiveChannel> {
        match &self.channels {
            None => Vec::new(),
            Some(ChannelCollection::Wrapped { channel_details }) => match channel_details {
                OneOrMany::Many(list) => list.iter().collect(),
                OneOrMany::One(one) => vec![one.as_ref()],
            },
            Some(ChannelCollection::Many(list)) => list.iter().collect(),
            Some(ChannelCollection::One(one)) => vec![one.as_ref()],
        }
    }
}

/// The three observed shapes of the `channels` field.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ChannelCollection {
    Wrapped {
        #[serde(rename = "channelDetails")]
        channel_details: OneOrMany,
    },
    Many(Vec<LiveChannel>),
    One(Box<LiveChannel>),
}

/// `channelDetails` is a single object when the device has one channel.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<LiveChannel>),
    One(Box<LiveChannel>),
}

/// One channel entry in the live payload.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct LiveChannel {
    #[serde(rename = "channelLabel", default)]
    label: Option<String>,
    #[serde(default)]
    reading: Option<serde_json::Value>,
    #[serde(default)]
    unit: Option<String>,
}

/// Parses a status response body: JSON first, then the legacy XML
/// envelope with JSON inside.
///
/// An error here means the device has no usable status this cycle; the
/// caller drops it from the result.
pub(crate) fn parse_status_body(body: &str) -> Result<LiveStatus, ParseError> {
    match serde_json::from_str::<StatusEnvelope>(body) {
        Ok(envelope) => Ok(envelope.into_status()),
        Err(json_err) => match xml_text(body) {
            Some(inner) => {
                let envelope: StatusEnvelope = serde_json::from_str(inner)?;
                Ok(envelope.into_status())
            }
            None if looks_like_xml(body) => Err(ParseError::Envelope),
            None => Err(ParseError::Json(json_err)),
        },
    }
}

fn looks_like_xml(body: &str) -> bool {
    body.trim_start().starts_with('<')
}

/// Extracts the text content of the single text-bearing root node of an
/// XML envelope (`<string xmlns="...">TEXT</string>`), skipping a
/// leading XML declaration.
fn xml_text(body: &str) -> Option<&str> {
    let mut rest = body.trim_start();
    if !rest.starts_with('<') {
        return None;
    }
    if rest.starts_with("<?") {
        let decl_end = rest.find("?>")? + 2;
        rest = rest[decl_end..].trim_start();
        if !rest.starts_with('<') {
            return None;
        }
    }
    let open_end = rest.find('>')?;
    let close_start = rest.rfind("</")?;
    if close_start <= open_end {
        return None;
    }
    Some(rest[open_end + 1..close_start].trim())
}

/// Merges a live-status payload onto a scraped device, returning the
/// merged record.
///
/// Live data overrides where it is authoritative: display name,
/// firmware, signal strength, and the last-communication time. Scraped
/// diagnostics without a live counterpart (MAC address, SSID) are left
/// untouched.
pub(crate) fn merge_live_status(device: &Device, status: &LiveStatus) -> Device {
    let mut merged = device.clone();

    if let Some(name) = status
        .sensor_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
    {
        merged.name = name.to_string();
    }

    if let Some(firmware) = &status.firmware_version {
        merged.set_attribute(
            ATTR_FIRMWARE_VERSION,
            Reading::bare(Value::from_text(firmware)),
        );
    }

    if let Some(rssi) = &status.rssi {
        merged.set_attribute(ATTR_WIFI_SIGNAL, Reading::bare(Value::from_live(rssi)));
    }

    // Live is authoritative for last communication; malformed or absent
    // clears the scraped value rather than keeping a stale one. The
    // value is a timezone-aware timestamp or nothing, by construction.
    let last = status.last_comm.as_deref().and_then(parse_sync_timestamp);
    merged.set_attribute(ATTR_LAST_UPDATED, Reading::bare(last.map(Value::Timestamp)));

    for channel in status.channel_list() {
        let Some(label) = channel
            .label
            .as_deref()
            .map(str::trim)
            .filter(|label| !label.is_empty())
        else {
            warn!(device_id = device.id, "skipping live channel with no label");
            continue;
        };
        let value = channel.reading.as_ref().and_then(Value::from_live);
        merged.set_attribute(label, Reading::new(value, channel.unit.as_deref()));
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{ATTR_MAC_ADDRESS, ATTR_SSID};
    use chrono::Datelike;

    fn scraped_device() -> Device {
        let mut device = Device::new(42, "Scraped Name", "EL-WiFi-TH");
        device.set_attribute(ATTR_MAC_ADDRESS, Reading::bare(Some(Value::Text("00:1A:C5:09:08:07".into()))));
        device.set_attribute(ATTR_FIRMWARE_VERSION, Reading::bare(Some(Value::Text("3.01".into()))));
        device.set_attribute(ATTR_SSID, Reading::bare(Some(Value::Text("plantroom-wifi".into()))));
        device.set_attribute(ATTR_WIFI_SIGNAL, Reading::bare(Some(Value::Integer(-70))));
        device.set_attribute(ATTR_LAST_UPDATED, Reading::bare(None));
        device
    }

    #[test]
    fn parse_plain_json() {
        let body = r#"{"d": {"sensorName": "Attic", "rssi": -55}}"#;
        let status = parse_status_body(body).unwrap();
        assert_eq!(status.sensor_name.as_deref(), Some("Attic"));
    }

    #[test]
    fn parse_legacy_device_status_key() {
        let body = r#"{"deviceStatus": {"sensorName": "Cellar"}}"#;
        let status = parse_status_body(body).unwrap();
        assert_eq!(status.sensor_name.as_deref(), Some("Cellar"));
    }

    #[test]
    fn parse_xml_wrapped_json() {
        let body = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<string xmlns=\"http://tempuri.org/\">{\"d\": {\"sensorName\": \"Wrapped\"}}</string>";
        let status = parse_status_body(body).unwrap();
        assert_eq!(status.sensor_name.as_deref(), Some("Wrapped"));
    }

    #[test]
    fn parse_xml_with_invalid_inner_json_fails() {
        let body = "<string>{\"d\": not json}</string>";
        assert!(matches!(
            parse_status_body(body),
            Err(ParseError::Json(_))
        ));
    }

    #[test]
    fn parse_garbage_fails() {
        assert!(parse_status_body("no markup at all").is_err());
        assert!(matches!(parse_status_body("<string>"), Err(ParseError::Envelope)));
    }

    #[test]
    fn parse_missing_payload_keys_is_empty_status() {
        let status = parse_status_body("{}").unwrap();
        assert!(status.sensor_name.is_none());
        assert!(status.channel_list().is_empty());
    }

    #[test]
    fn channels_as_wrapped_list() {
        let body = r#"{"d": {"channels": {"channelDetails": [
            {"channelLabel": "Temperature", "reading": "21.4", "unit": "°C"},
            {"channelLabel": "Humidity", "reading": "44", "unit": "%RH"}
        ]}}}"#;
        let status = parse_status_body(body).unwrap();
        assert_eq!(status.channel_list().len(), 2);
    }

    #[test]
    fn channels_as_wrapped_single_object() {
        let body = r#"{"d": {"channels": {"channelDetails":
            {"channelLabel": "Temperature", "reading": "21.4", "unit": "°C"}
        }}}"#;
        let status = parse_status_body(body).unwrap();
        assert_eq!(status.channel_list().len(), 1);
    }

    #[test]
    fn channels_as_bare_list() {
        let body = r#"{"d": {"channels": [
            {"channelLabel": "Temperature", "reading": 21.4, "unit": "°C"}
        ]}}"#;
        let status = parse_status_body(body).unwrap();
        assert_eq!(status.channel_list().len(), 1);
    }

    #[test]
    fn single_object_and_list_shapes_merge_identically() {
        let wrapped_one = parse_status_body(
            r#"{"d": {"channels": {"channelDetails": {"channelLabel": "Temperature", "reading": "21.4", "unit": "°C"}}}}"#,
        )
        .unwrap();
        let wrapped_list = parse_status_body(
            r#"{"d": {"channels": {"channelDetails": [{"channelLabel": "Temperature", "reading": "21.4", "unit": "°C"}]}}}"#,
        )
        .unwrap();

        let device = scraped_device();
        assert_eq!(
            merge_live_status(&device, &wrapped_one),
            merge_live_status(&device, &wrapped_list)
        );
    }

    #[test]
    fn merge_overrides_name_and_diagnostics() {
        let body = r#"{"d": {
            "sensorName": "Live Name",
            "firmwareVersion": "3.10",
            "rssi": -48,
            "lastCommFormatted": "15/06/2024 08:30:00"
        }}"#;
        let status = parse_status_body(body).unwrap();
        let merged = merge_live_status(&scraped_device(), &status);

        assert_eq!(merged.name, "Live Name");
        assert_eq!(
            merged.attribute(ATTR_FIRMWARE_VERSION).unwrap().value,
            Some(Value::Text("3.10".into()))
        );
        assert_eq!(
            merged.attribute(ATTR_WIFI_SIGNAL).unwrap().value,
            Some(Value::Integer(-48))
        );
        let last = merged.attribute(ATTR_LAST_UPDATED).unwrap();
        let ts = last.value.as_ref().unwrap().as_timestamp().unwrap();
        assert_eq!(ts.naive_local().year(), 2024);
        // Scraped-only diagnostics are untouched
        assert_eq!(
            merged.attribute(ATTR_SSID).unwrap().value,
            Some(Value::Text("plantroom-wifi".into()))
        );
        assert_eq!(merged.id, 42);
        assert_eq!(merged.model, "EL-WiFi-TH");
    }

    #[test]
    fn merge_keeps_scraped_values_when_live_omits_them() {
        let status = parse_status_body(r#"{"d": {}}"#).unwrap();
        let merged = merge_live_status(&scraped_device(), &status);

        assert_eq!(merged.name, "Scraped Name");
        assert_eq!(
            merged.attribute(ATTR_FIRMWARE_VERSION).unwrap().value,
            Some(Value::Text("3.01".into()))
        );
        assert_eq!(
            merged.attribute(ATTR_WIFI_SIGNAL).unwrap().value,
            Some(Value::Integer(-70))
        );
    }

    #[test]
    fn merge_blank_sensor_name_does_not_override() {
        let status = parse_status_body(r#"{"d": {"sensorName": "  "}}"#).unwrap();
        let merged = merge_live_status(&scraped_device(), &status);
        assert_eq!(merged.name, "Scraped Name");
    }

    #[test]
    fn merge_malformed_last_comm_is_null() {
        let status =
            parse_status_body(r#"{"d": {"lastCommFormatted": "not a date"}}"#).unwrap();
        let merged = merge_live_status(&scraped_device(), &status);
        assert_eq!(merged.attribute(ATTR_LAST_UPDATED).unwrap().value, None);
    }

    #[test]
    fn merge_failed_channel_coercion_keeps_key_with_null() {
        let body = r#"{"d": {"channels": [
            {"channelLabel": "Air Quality", "reading": "warming up", "unit": "AQI"},
            {"channelLabel": "Temperature", "reading": "--.--", "unit": "°C"}
        ]}}"#;
        let status = parse_status_body(body).unwrap();
        let merged = merge_live_status(&scraped_device(), &status);

        let aqi = merged.attribute("Air Quality").unwrap();
        assert_eq!(aqi.value, None);
        assert_eq!(aqi.unit.as_deref(), Some("AQI"));
        assert_eq!(merged.attribute("Temperature").unwrap().value, None);
    }

    #[test]
    fn merge_unlabeled_channel_is_skipped() {
        let body = r#"{"d": {"channels": [
            {"reading": "1.0", "unit": "x"},
            {"channelLabel": "Humidity", "reading": 50, "unit": "%RH"}
        ]}}"#;
        let status = parse_status_body(body).unwrap();
        let merged = merge_live_status(&scraped_device(), &status);

        assert!(merged.attribute("Humidity").is_some());
        // Only the labeled channel landed
        assert_eq!(merged.channels().count(), 1);
    }
}
