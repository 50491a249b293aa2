// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Locating and decoding the device array embedded in dashboard HTML.
//!
//! The dashboard has no API; the device listing arrives as a
//! pseudo-JavaScript array literal (`devicesArr = [new Device(...)]`)
//! inside an authenticated page. This module finds that span, tokenizes
//! the constructor-call grammar with one shared bracket-depth scanner,
//! and assembles normalized devices from the positional fields.

pub(crate) mod decoder;
pub(crate) mod html;
pub(crate) mod tokenizer;
