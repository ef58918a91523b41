/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! admin-guard: warn when a sensitive account is signed in while viewing a
//! pull-request page.
//!
//! - [`services`]: identity resolution and preference storage
//! - [`shell::host`]: seams to the page, history, presentation, badge and
//!   liveness
//! - [`shell::runtime`]: the evaluation loop, the navigation watcher and the
//!   CLI host
//!
//! The synchronous kernel lives in the `guard-core` crate.

use tracing_subscriber::EnvFilter;

pub mod prefs;
pub mod services;
pub mod shell;

pub use guard_core;

const DEFAULT_LOG_FILTER: &str = "admin_guard=info,guard_core=info";

/// Install the global subscriber. `filter` wins over `RUST_LOG`.
pub fn init_logging(filter: Option<&str>) {
    let filter = match filter {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
    };
    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
    {
        eprintln!("admin-guard: logging already initialized: {e}");
    }
}
