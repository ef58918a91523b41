/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Portable kernel for admin-guard.
//!
//! Everything in this crate is synchronous and host-agnostic: identity
//! values and set membership, page classification, the bounded search over
//! loosely-typed application state, profile-link parsing, the preference
//! model, and the notification gate. The async services and host seams live
//! in the `admin-guard` package.

pub mod config;
pub mod identity;
pub mod notification;
pub mod page;
pub mod profile_links;
pub mod state_tree;

pub use config::{GuardConfig, NotificationStyle, PreferenceEditError};
pub use identity::{Identity, SensitiveSet, is_member};
pub use notification::{ArmOutcome, IndicatorEvent, NotificationGate, NotificationState, PageViewEpoch};
pub use page::is_sensitive_page;
