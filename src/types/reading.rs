// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reading values and the sentinel/coercion rules.
//!
//! The dashboard reports "no reading" with placeholder strings rather
//! than an absent field. Sentinels are mapped to `None` *before* numeric
//! coercion so a literal `"---"` can never half-parse into a number.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

/// Placeholder strings upstream uses to mean "no reading".
const SENTINELS: [&str; 4] = ["--.--", "---", "N/A", ""];

/// A coerced reading value.
///
/// Integer and float are kept distinct because the dashboard reports
/// counts (e.g. signal strength) as integers and measurements as
/// decimals; downstream consumers present them differently.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// A whole-number reading.
    Integer(i64),
    /// A decimal reading.
    Float(f64),
    /// A non-numeric reading kept verbatim (trimmed).
    Text(String),
    /// A timezone-aware timestamp (only ever used for `Last Updated`).
    Timestamp(DateTime<FixedOffset>),
}

impl Value {
    /// Returns true if the trimmed string is an upstream "no reading"
    /// placeholder.
    #[must_use]
    pub fn is_sentinel(raw: &str) -> bool {
        SENTINELS.contains(&raw.trim())
    }

    /// Coerces a scraped (string) reading from the device listing.
    ///
    /// Sentinels map to `None`; otherwise integer, then float, then the
    /// trimmed text verbatim. Scraped readings never fail outright —
    /// anything non-numeric stays text.
    #[must_use]
    pub fn from_scraped(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if Self::is_sentinel(trimmed) {
            return None;
        }
        if let Ok(n) = trimmed.parse::<i64>() {
            return Some(Self::Integer(n));
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            return Some(Self::Float(f));
        }
        Some(Self::Text(trimmed.to_string()))
    }

    /// Coerces a scraped text attribute (MAC address, firmware, SSID).
    ///
    /// Like [`Value::from_scraped`] but without numeric coercion: a
    /// firmware version of `"2"` stays text.
    #[must_use]
    pub fn from_text(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if Self::is_sentinel(trimmed) {
            return None;
        }
        Some(Self::Text(trimmed.to_string()))
    }

    /// Coerces a live-status reading, which may arrive as a JSON number
    /// or a string.
    ///
    /// Sentinels map to `None`; strings try integer, then float; a value
    /// that still fails coercion is `None` (the channel key survives,
    /// its reading does not).
    #[must_use]
    pub fn from_live(raw: &serde_json::Value) -> Option<Self> {
        match raw {
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Self::Integer(i))
                } else {
                    n.as_f64().map(Self::Float)
                }
            }
            serde_json::Value::String(s) => {
                let trimmed = s.trim();
                if Self::is_sentinel(trimmed) {
                    return None;
                }
                if let Ok(i) = trimmed.parse::<i64>() {
                    return Some(Self::Integer(i));
                }
                trimmed.parse::<f64>().ok().map(Self::Float)
            }
            _ => None,
        }
    }

    /// Returns the value as a float if it is numeric.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            // Precision loss on huge ids is acceptable for presentation
            #[allow(clippy::cast_precision_loss)]
            Self::Integer(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the value as text if it is non-numeric text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as a timestamp if it is one.
    #[must_use]
    pub fn as_timestamp(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            Self::Timestamp(dt) => Some(*dt),
            _ => None,
        }
    }
}

/// One normalized channel or diagnostic attribute entry.
///
/// `value` is `None` when upstream reported a sentinel or coercion
/// failed; the entry itself still exists so consumers can distinguish
/// "no reading this cycle" from "channel never existed".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    /// The coerced value, absent for sentinels and failed coercions.
    pub value: Option<Value>,
    /// The unit string as reported upstream, absent when upstream gave
    /// none (or an empty one).
    pub unit: Option<String>,
}

impl Reading {
    /// Creates a reading from an already coerced value and a raw unit.
    ///
    /// Empty units normalize to `None`.
    #[must_use]
    pub fn new(value: Option<Value>, unit: Option<&str>) -> Self {
        let unit = unit
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(ToString::to_string);
        Self { value, unit }
    }

    /// Creates a unit-less reading.
    #[must_use]
    pub fn bare(value: Option<Value>) -> Self {
        Self { value, unit: None }
    }
}
