// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the EasyLog Cloud client.
//!
//! Failures that abort a polling cycle (authentication, transport) carry
//! typed errors. Per-record problems — a malformed device block, an
//! unparseable date, a stray sentinel — are logged and skipped instead of
//! raised; they never appear in this hierarchy.

use thiserror::Error;

/// The main error type for this library.
///
/// Only whole-cycle failures reach this enum. Individual device or
/// channel records that fail to decode are dropped with a warning and do
/// not abort the batch.
#[derive(Debug, Error)]
pub enum Error {
    /// The login handshake failed.
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// An authenticated page or status request failed.
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),
}

/// Errors raised by the login handshake.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The login page did not contain a required hidden form field.
    ///
    /// The anti-forgery tokens are mandatory for the form POST; guessing
    /// a default would silently submit an invalid login, so this is
    /// fatal for the cycle.
    #[error("login page is missing hidden form field: {0}")]
    MissingFormField(&'static str),

    /// The credentials were not accepted.
    ///
    /// The server answers a failed login with HTTP 200 and the signed-out
    /// page, so rejection is judged by content, not status.
    #[error("login was not accepted by the server")]
    LoginRejected,

    /// A network call in the handshake failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Errors raised by authenticated page and status requests.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request failed at the transport level.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("unexpected HTTP status {0}")]
    Status(u16),
}

/// Errors raised while parsing a live-status response body.
///
/// These never propagate out of a cycle: a device whose status payload
/// cannot be parsed is skipped for that cycle and the error is logged.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The body was not valid JSON.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The body was XML but no text-bearing node could be extracted.
    #[error("unrecognized XML envelope")]
    Envelope,
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
