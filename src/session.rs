// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The authenticated dashboard session.
//!
//! The dashboard is an ASP.NET WebForms application: logging in means
//! fetching the form page, echoing its hidden anti-forgery tokens back
//! in a credentials POST, and carrying the session cookies into every
//! later request. Each [`Session::authenticate`] call builds a client
//! with a fresh cookie store, so a new login invalidates the previous
//! session.

use reqwest::Client;
use tracing::debug;

use crate::config::CloudConfig;
use crate::error::{AuthError, FetchError};
use crate::scrape::html::hidden_input_value;

// Form field names of the dashboard's login page. The anti-forgery
// tokens are required; __EVENTVALIDATION only exists on some site
// versions and is echoed back when present.
const FIELD_VIEWSTATE: &str = "__VIEWSTATE";
const FIELD_VIEWSTATE_GENERATOR: &str = "__VIEWSTATEGENERATOR";
const FIELD_EVENT_VALIDATION: &str = "__EVENTVALIDATION";
const FIELD_USERNAME: &str = "ctl00$cph1$username1";
const FIELD_PASSWORD: &str = "ctl00$cph1$password";
const FIELD_REMEMBER_ME: &str = "ctl00$cph1$rememberme";
const FIELD_SIGN_IN: &str = "ctl00$cph1$signin";

/// An authenticated session against the dashboard.
///
/// Owns the HTTP client whose cookie store carries the login. The
/// login POST answering 200 proves nothing — the server serves the
/// signed-out page with that status too — so whether the session is
/// actually authenticated is judged by the content of the subsequent
/// devices-page fetch.
#[derive(Debug, Clone)]
pub struct Session {
    client: Client,
    config: CloudConfig,
}

impl Session {
    /// Performs the login handshake and returns the session.
    ///
    /// # Errors
    ///
    /// [`AuthError::MissingFormField`] when the login page lacks a
    /// required hidden token (never guessed at), [`AuthError::Http`] on
    /// transport failure.
    pub async fn authenticate(
        config: &CloudConfig,
        username: &str,
        password: &str,
    ) -> Result<Self, AuthError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .cookie_store(true)
            .build()?;

        let login_url = config.login_url();
        debug!(url = %login_url, "fetching login page");
        let page = client.get(&login_url).send().await?.text().await?;

        let viewstate = hidden_input_value(&page, FIELD_VIEWSTATE)
            .ok_or(AuthError::MissingFormField(FIELD_VIEWSTATE))?;
        let generator = hidden_input_value(&page, FIELD_VIEWSTATE_GENERATOR)
            .ok_or(AuthError::MissingFormField(FIELD_VIEWSTATE_GENERATOR))?;

        let mut form: Vec<(&str, String)> = vec![
            (FIELD_VIEWSTATE, viewstate),
            (FIELD_VIEWSTATE_GENERATOR, generator),
            (FIELD_USERNAME, username.to_string()),
            (FIELD_PASSWORD, password.to_string()),
            (FIELD_REMEMBER_ME, "on".to_string()),
            (FIELD_SIGN_IN, "Sign In".to_string()),
        ];
        if let Some(validation) = hidden_input_value(&page, FIELD_EVENT_VALIDATION) {
            form.push((FIELD_EVENT_VALIDATION, validation));
        }

        debug!(url = %login_url, "submitting credentials");
        let response = client.post(&login_url).form(&form).send().await?;
        debug!(status = %response.status(), "login form submitted");

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Fetches the device-listing page with the session cookies.
    ///
    /// Content is not validated here; an empty or signed-out page is
    /// the caller's judgment call.
    ///
    /// # Errors
    ///
    /// [`FetchError::Http`] on transport failure, [`FetchError::Status`]
    /// on a non-success response.
    pub async fn fetch_devices_page(&self) -> Result<String, FetchError> {
        let url = self.config.devices_url();
        debug!(url = %url, "fetching device listing");
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }

    /// Fetches the raw live-status body for one device.
    pub(crate) async fn fetch_status_body(&self, device_id: u32) -> Result<String, FetchError> {
        let url = self.config.status_url(device_id);
        debug!(url = %url, "fetching live status");
        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }
}
