// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Configuration for the EasyLog Cloud client.

use std::time::Duration;

/// Configuration for the cloud endpoints and the scrape cycle.
///
/// # Examples
///
/// ```
/// use easylog_cloud::CloudConfig;
/// use std::time::Duration;
///
/// // Defaults point at the public dashboard
/// let config = CloudConfig::new();
///
/// // With all options
/// let config = CloudConfig::new()
///     .with_base_url("https://staging.easylogcloud.com")
///     .with_timeout(Duration::from_secs(10))
///     .with_status_concurrency(2);
/// ```
#[derive(Debug, Clone)]
pub struct CloudConfig {
    base_url: String,
    timeout: Duration,
    status_concurrency: usize,
    layout: FieldLayout,
}

impl CloudConfig {
    /// Default dashboard base URL.
    pub const DEFAULT_BASE_URL: &'static str = "https://www.easylogcloud.com";
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
    /// Default number of concurrent live-status requests.
    pub const DEFAULT_STATUS_CONCURRENCY: usize = 4;

    /// Creates a configuration with the default endpoints and layout.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            timeout: Self::DEFAULT_TIMEOUT,
            status_concurrency: Self::DEFAULT_STATUS_CONCURRENCY,
            layout: FieldLayout::default(),
        }
    }

    /// Sets a custom base URL (scheme and host, no trailing slash).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let mut url = base_url.into();
        while url.ends_with('/') {
            url.pop();
        }
        self.base_url = url;
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the concurrency limit for per-device live-status requests.
    ///
    /// Values below 1 are treated as 1.
    #[must_use]
    pub fn with_status_concurrency(mut self, limit: usize) -> Self {
        self.status_concurrency = limit.max(1);
        self
    }

    /// Sets a custom positional field layout for the device decoder.
    #[must_use]
    pub fn with_field_layout(mut self, layout: FieldLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the live-status concurrency limit.
    #[must_use]
    pub fn status_concurrency(&self) -> usize {
        self.status_concurrency
    }

    /// Returns the positional field layout.
    #[must_use]
    pub fn layout(&self) -> &FieldLayout {
        &self.layout
    }

    /// URL of the login form (GET for the page, POST for submission).
    #[must_use]
    pub fn login_url(&self) -> String {
        format!("{}/", self.base_url)
    }

    /// URL of the authenticated device-listing page.
    #[must_use]
    pub fn devices_url(&self) -> String {
        format!("{}/devices.aspx", self.base_url)
    }

    /// URL of the per-device live-status endpoint.
    #[must_use]
    pub fn status_url(&self, device_id: u32) -> String {
        format!(
            "{}/devicedata.asmx/currentStatus?index=1&sensorId={device_id}",
            self.base_url
        )
    }
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Positional indices of the scalar fields inside a `Device(...)` block.
///
/// The upstream array literal has no schema; these indices were read off
/// live dashboard samples and have shifted between site versions. They
/// are configuration, not invariants: when the upstream layout changes,
/// blocks shorter than [`FieldLayout::required_count`] are skipped with a
/// warning instead of being misread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLayout {
    /// Device id (integer).
    pub id: usize,
    /// Hardware model string.
    pub model: usize,
    /// Display name.
    pub name: usize,
    /// MAC address.
    pub mac: usize,
    /// Firmware version.
    pub firmware: usize,
    /// Wireless network SSID.
    pub ssid: usize,
    /// Signal strength.
    pub wifi_signal: usize,
    /// Last-sync timestamp (`day/month/year hour:minute:second`).
    pub last_sync: usize,
}

impl FieldLayout {
    /// Minimum number of scalar fields a block must have to be decoded.
    #[must_use]
    pub fn required_count(&self) -> usize {
        let max = self
            .id
            .max(self.model)
            .max(self.name)
            .max(self.mac)
            .max(self.firmware)
            .max(self.ssid)
            .max(self.wifi_signal)
            .max(self.last_sync);
        max + 1
    }
}

impl Default for FieldLayout {
    fn default() -> Self {
        Self {
            id: 0,
            model: 2,
            name: 4,
            mac: 5,
            firmware: 16,
            ssid: 17,
            wifi_signal: 28,
            last_sync: 34,
        }
    }
}
