/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Seams to the hosting page and the user-facing surfaces.

pub mod history;
pub mod indicator;
pub mod liveness;
pub mod page;
pub mod presentation;
