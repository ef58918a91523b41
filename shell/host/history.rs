/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Navigation signals from the host page.
//!
//! Single-page applications change location without a page load, so the
//! watcher listens to three sources: DOM mutations, history traversal, and
//! programmatic history pushes and replaces. The last is observed by
//! wrapping the page's [`History`] in a [`HistoryAdapter`], which keeps the
//! wrapped behavior intact and reports the call afterwards.

use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavigationSignal {
    /// Something in the document changed; the location may or may not have.
    DomMutation,
    /// Back/forward traversal.
    PopState,
    PushState,
    ReplaceState,
}

/// Sending half, cloned into every host-side observer.
#[derive(Debug, Clone)]
pub struct NavigationHub {
    sender: mpsc::UnboundedSender<NavigationSignal>,
}

/// Receiving half, owned by the watcher.
#[derive(Debug)]
pub struct NavigationEvents {
    receiver: mpsc::UnboundedReceiver<NavigationSignal>,
}

impl NavigationHub {
    pub fn channel() -> (NavigationHub, NavigationEvents) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (NavigationHub { sender }, NavigationEvents { receiver })
    }

    /// Returns `false` once the watcher has torn down.
    pub fn notify(&self, signal: NavigationSignal) -> bool {
        self.sender.send(signal).is_ok()
    }

    pub fn dom_mutated(&self) -> bool {
        self.notify(NavigationSignal::DomMutation)
    }

    pub fn popstate(&self) -> bool {
        self.notify(NavigationSignal::PopState)
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl NavigationEvents {
    pub async fn recv(&mut self) -> Option<NavigationSignal> {
        self.receiver.recv().await
    }

    /// Stop accepting signals. Hubs observe this through [`NavigationHub::notify`].
    pub fn close(&mut self) {
        self.receiver.close();
    }
}

/// The page's history mechanism.
pub trait History: Send + Sync {
    fn push_state(&self, location: &str);
    fn replace_state(&self, location: &str);
}

/// Wraps a [`History`] so that pushes and replaces are reported as
/// navigation signals after the wrapped call has run.
pub struct HistoryAdapter<H> {
    inner: H,
    hub: NavigationHub,
}

impl<H: History> HistoryAdapter<H> {
    pub fn new(inner: H, hub: NavigationHub) -> Self {
        Self { inner, hub }
    }
}

impl<H: History> History for HistoryAdapter<H> {
    fn push_state(&self, location: &str) {
        self.inner.push_state(location);
        self.hub.notify(NavigationSignal::PushState);
    }

    fn replace_state(&self, location: &str) {
        self.inner.replace_state(location);
        self.hub.notify(NavigationSignal::ReplaceState);
    }
}

impl<H: History> History for std::sync::Arc<H> {
    fn push_state(&self, location: &str) {
        (**self).push_state(location);
    }

    fn replace_state(&self, location: &str) {
        (**self).replace_state(location);
    }
}
