/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Warning presentation seam.
//!
//! The evaluation loop calls exactly one `show_*`/`request_*` method per
//! armed page view. Banner and modal presentations receive a
//! [`DismissHandle`] bound to the page view they were armed in; the user
//! closing them must go through it so the gate is released and the
//! indicator cleared. A handle outliving its page view does nothing.

use std::fmt;
use std::sync::Arc;

use guard_core::{Identity, IndicatorEvent, NotificationGate, NotificationState, PageViewEpoch};
use parking_lot::Mutex;
use tokio::sync::mpsc;

use super::indicator::IndicatorSink;

pub const NOTIFICATION_TITLE: &str = "Admin Profile Detected";

pub fn banner_message(identity: &Identity) -> String {
    format!("Admin Profile Detected! You are using admin profile {identity} on a PR page.")
}

pub fn modal_message(identity: &Identity) -> String {
    format!(
        "You are using admin profile {identity} on a PR page. This may not be intended. \
         Please switch to a non-admin profile."
    )
}

pub fn notification_message(identity: &Identity) -> String {
    format!("You are using an admin profile on a PR page: {identity}")
}

pub trait Presenter: Send + Sync {
    fn show_banner(&self, identity: &Identity, dismiss: DismissHandle);
    fn show_modal(&self, identity: &Identity, dismiss: DismissHandle);
    fn request_external_notification(&self, identity: &Identity);
    /// Remove whatever artifact is currently displayed, if any.
    fn withdraw(&self);
}

/// Lets the user-facing artifact release the notify-once gate.
#[derive(Clone)]
pub struct DismissHandle {
    gate: Arc<Mutex<NotificationGate>>,
    indicator: Arc<dyn IndicatorSink>,
    epoch: PageViewEpoch,
}

impl DismissHandle {
    pub fn new(
        gate: Arc<Mutex<NotificationGate>>,
        indicator: Arc<dyn IndicatorSink>,
        epoch: PageViewEpoch,
    ) -> Self {
        Self {
            gate,
            indicator,
            epoch,
        }
    }

    /// Returns `false` when the warning was already withdrawn or dismissed.
    pub fn dismiss(&self) -> bool {
        let dismissed = self.gate.lock().dismiss(self.epoch);
        if dismissed {
            log::debug!("presentation: dismissed");
            self.indicator.emit(IndicatorEvent::ClearIndicator);
        } else {
            log::debug!("presentation: dismissal of a stale warning ignored");
        }
        dismissed
    }

    pub fn state(&self) -> NotificationState {
        self.gate.lock().state()
    }
}

impl fmt::Debug for DismissHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DismissHandle")
            .field("epoch", &self.epoch)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub enum PresentationRequest {
    Banner {
        message: String,
        dismiss: DismissHandle,
    },
    Modal {
        message: String,
        dismiss: DismissHandle,
    },
    ExternalNotification {
        title: String,
        message: String,
    },
    Withdraw,
}

impl PresentationRequest {
    pub fn dismiss_handle(&self) -> Option<&DismissHandle> {
        match self {
            Self::Banner { dismiss, .. } | Self::Modal { dismiss, .. } => Some(dismiss),
            Self::ExternalNotification { .. } | Self::Withdraw => None,
        }
    }
}

/// Forwards presentation requests to a renderer task.
#[derive(Debug, Clone)]
pub struct ChannelPresenter {
    sender: mpsc::UnboundedSender<PresentationRequest>,
}

impl ChannelPresenter {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<PresentationRequest>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    fn send(&self, request: PresentationRequest) {
        if self.sender.send(request).is_err() {
            log::debug!("presentation: renderer gone, request dropped");
        }
    }
}

impl Presenter for ChannelPresenter {
    fn show_banner(&self, identity: &Identity, dismiss: DismissHandle) {
        self.send(PresentationRequest::Banner {
            message: banner_message(identity),
            dismiss,
        });
    }

    fn show_modal(&self, identity: &Identity, dismiss: DismissHandle) {
        self.send(PresentationRequest::Modal {
            message: modal_message(identity),
            dismiss,
        });
    }

    fn request_external_notification(&self, identity: &Identity) {
        self.send(PresentationRequest::ExternalNotification {
            title: NOTIFICATION_TITLE.to_string(),
            message: notification_message(identity),
        });
    }

    fn withdraw(&self) {
        self.send(PresentationRequest::Withdraw);
    }
}
