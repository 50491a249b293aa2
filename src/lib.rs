// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `EasyLog` Cloud client - a Rust library for reading `EasyLog` Cloud
//! environmental sensors.
//!
//! The cloud dashboard exposes no formal API: the device listing is a
//! pseudo-JavaScript array literal embedded in an authenticated HTML
//! page, and per-device live readings come from a web-service endpoint
//! that answers JSON or JSON wrapped in a legacy XML envelope. This
//! library handles the login handshake, locates and decodes the embedded
//! array, and normalizes everything into one device/channel model.
//!
//! # What a cycle does
//!
//! - **Authenticate**: fetch the login form, echo its hidden
//!   anti-forgery tokens back with the credentials, keep the session
//!   cookies.
//! - **Scrape**: fetch the device listing and decode the
//!   `devicesArr = [new Device(...)]` literal with a bracket-depth
//!   tokenizer.
//! - **Enrich**: fetch each device's live status (bounded concurrency)
//!   and merge current readings over the scraped record.
//!
//! Malformed individual records are logged and skipped; only
//! authentication and transport failures abort a cycle.
//!
//! # Quick Start
//!
//! ```no_run
//! use easylog_cloud::{CloudClient, CloudConfig};
//!
//! #[tokio::main]
//! async fn main() -> easylog_cloud::Result<()> {
//!     let client = CloudClient::new(CloudConfig::new(), "user@example.com", "secret");
//!
//!     let devices = client.refresh().await?;
//!     for device in &devices {
//!         println!("{} ({})", device.name, device.model);
//!         for (label, reading) in device.channels() {
//!             println!("  {label}: {:?} {:?}", reading.value, reading.unit);
//!         }
//!     }
//!
//!     if let Some(account) = client.account_identity() {
//!         println!("account: {account}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Riding out sentinel readings
//!
//! The dashboard reports "no reading" with placeholder strings
//! (`--.--`, `---`, `N/A`). Keep a caller-owned [`ReadingCache`] across
//! cycles to backfill those gaps with the last known good value:
//!
//! ```no_run
//! use easylog_cloud::{CloudClient, CloudConfig, ReadingCache};
//!
//! #[tokio::main]
//! async fn main() -> easylog_cloud::Result<()> {
//!     let client = CloudClient::new(CloudConfig::new(), "user@example.com", "secret");
//!     let mut cache = ReadingCache::new();
//!
//!     loop {
//!         let devices = client.refresh_with_cache(&mut cache).await?;
//!         println!("{} devices", devices.len());
//!         tokio::time::sleep(std::time::Duration::from_secs(300)).await;
//!     }
//! }
//! ```

mod client;
mod config;
mod device;
pub mod error;
mod scrape;
mod session;
mod status;
mod types;

pub use client::CloudClient;
pub use config::{CloudConfig, FieldLayout};
pub use device::{
    ATTR_FIRMWARE_VERSION, ATTR_LAST_UPDATED, ATTR_MAC_ADDRESS, ATTR_SSID, ATTR_WIFI_SIGNAL,
    Device, ReadingCache,
};
pub use error::{AuthError, Error, FetchError, ParseError, Result};
pub use session::Session;
pub use types::{Reading, Value, parse_sync_timestamp};
