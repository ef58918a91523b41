/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Whether the hosting execution context is still usable. Once it reports
/// `false` the watcher tears down and never recovers.
pub trait LivenessProbe: Send + Sync {
    fn is_context_valid(&self) -> bool;
}

/// Shared validity flag, invalidated by the host when its context goes away.
#[derive(Debug, Clone)]
pub struct ContextHandle {
    valid: Arc<AtomicBool>,
}

impl Default for ContextHandle {
    fn default() -> Self {
        Self {
            valid: Arc::new(AtomicBool::new(true)),
        }
    }
}

impl ContextHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invalidate(&self) {
        self.valid.store(false, Ordering::Release);
    }
}

impl LivenessProbe for ContextHandle {
    fn is_context_valid(&self) -> bool {
        self.valid.load(Ordering::Acquire)
    }
}
