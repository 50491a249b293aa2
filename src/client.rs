// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The polling-cycle orchestrator.
//!
//! One refresh is a single sequential flow: authenticate, fetch the
//! device listing, decode it, then enrich every device with its live
//! status. Only the live-status fan-out runs concurrently, bounded by
//! the configured limit; results keep input order.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::Semaphore;
use tracing::{debug, error, warn};

use crate::config::CloudConfig;
use crate::device::{Device, ReadingCache};
use crate::error::{AuthError, Error, Result};
use crate::scrape::decoder::decode;
use crate::scrape::html::element_text;
use crate::scrape::tokenizer::locate_array;
use crate::session::Session;
use crate::status::{merge_live_status, parse_status_body};

/// Element id of the signed-in account label on the devices page.
const IDENTITY_ELEMENT_ID: &str = "username";

/// Client for the EasyLog Cloud dashboard.
///
/// Holds credentials and configuration; a fresh [`Session`] is
/// established for every refresh, and no state survives between cycles
/// apart from the account identity extracted from the last successful
/// page fetch.
///
/// # Examples
///
/// ```no_run
/// use easylog_cloud::{CloudClient, CloudConfig};
///
/// #[tokio::main]
/// async fn main() -> easylog_cloud::Result<()> {
///     let client = CloudClient::new(CloudConfig::new(), "user@example.com", "secret");
///
///     let devices = client.refresh().await?;
///     for device in &devices {
///         println!("{} ({})", device.name, device.model);
///     }
///     Ok(())
/// }
/// ```
pub struct CloudClient {
    config: CloudConfig,
    username: String,
    password: String,
    account_name: RwLock<Option<String>>,
}

impl CloudClient {
    /// Creates a client for the given account.
    #[must_use]
    pub fn new(
        config: CloudConfig,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            config,
            username: username.into(),
            password: password.into(),
            account_name: RwLock::new(None),
        }
    }

    /// Runs one full polling cycle and returns the normalized devices.
    ///
    /// Devices whose live status cannot be fetched or parsed are absent
    /// from the result for this cycle; an authenticated account with no
    /// devices yields an empty list.
    ///
    /// # Errors
    ///
    /// [`Error::Auth`] when the handshake fails or the credentials are
    /// rejected, [`Error::Fetch`] when the listing page cannot be
    /// retrieved.
    pub async fn refresh(&self) -> Result<Vec<Device>> {
        let session =
            Session::authenticate(&self.config, &self.username, &self.password).await?;
        let html = session.fetch_devices_page().await.map_err(Error::Fetch)?;

        let identity = element_text(&html, IDENTITY_ELEMENT_ID);
        let span = locate_array(&html);

        // A page with neither the device array nor the account label is
        // the signed-out page: the POST was answered but not accepted.
        if span.is_none() && identity.is_none() {
            return Err(Error::Auth(AuthError::LoginRejected));
        }
        *self.account_name.write() = identity;

        let Some(span) = span else {
            warn!("device array marker absent; treating account as empty");
            return Ok(Vec::new());
        };

        let devices = decode(span, self.config.layout());
        debug!(count = devices.len(), "decoded device listing");

        Ok(self.fetch_live_statuses(&session, devices).await)
    }

    /// Like [`CloudClient::refresh`], backfilling sentinel readings from
    /// the caller-owned cache and recording fresh ones into it.
    ///
    /// # Errors
    ///
    /// Same as [`CloudClient::refresh`].
    pub async fn refresh_with_cache(&self, cache: &mut ReadingCache) -> Result<Vec<Device>> {
        let mut devices = self.refresh().await?;
        for device in &mut devices {
            cache.backfill(device);
        }
        Ok(devices)
    }

    /// Swallow-and-log variant of [`CloudClient::refresh`]: any cycle
    /// failure yields an empty list.
    ///
    /// For callers that distinguish "empty" from "errored", use
    /// [`CloudClient::refresh`] instead.
    pub async fn get_devices(&self) -> Vec<Device> {
        match self.refresh().await {
            Ok(devices) => devices,
            Err(err) => {
                error!(error = %err, "polling cycle failed");
                Vec::new()
            }
        }
    }

    /// The account display name from the most recent successful page
    /// fetch, if the page carried one.
    #[must_use]
    pub fn account_identity(&self) -> Option<String> {
        self.account_name.read().clone()
    }

    /// Fetches and merges live status for each device, bounded by the
    /// configured concurrency limit. Result order matches input order;
    /// devices without a usable status are dropped for this cycle.
    async fn fetch_live_statuses(&self, session: &Session, devices: Vec<Device>) -> Vec<Device> {
        let semaphore = Arc::new(Semaphore::new(self.config.status_concurrency()));
        let mut handles = Vec::with_capacity(devices.len());

        for device in devices {
            let session = session.clone();
            let semaphore = Arc::clone(&semaphore);
            handles.push(tokio::spawn(async move {
                let Ok(_permit) = semaphore.acquire().await else {
                    return None;
                };
                fetch_and_merge(&session, &device).await
            }));
        }

        let mut merged = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok(Some(device)) => merged.push(device),
                Ok(None) => {}
                Err(err) => warn!(error = %err, "live-status task failed"),
            }
        }
        merged
    }
}

/// One device's live-status fetch-parse-merge, or `None` to drop it for
/// this cycle.
async fn fetch_and_merge(session: &Session, device: &Device) -> Option<Device> {
    let body = match session.fetch_status_body(device.id).await {
        Ok(body) => body,
        Err(err) => {
            warn!(device_id = device.id, error = %err, "live-status fetch failed; dropping device this cycle");
            return None;
        }
    };
    match parse_status_body(&body) {
        Ok(status) => Some(merge_live_status(device, &status)),
        Err(err) => {
            warn!(device_id = device.id, error = %err, "live-status payload unusable; dropping device this cycle");
            None
        }
    }
}
