/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Toolbar-indicator side channel. Sends are fire-and-forget; nothing is
//! waited on and no reply is expected.

use guard_core::IndicatorEvent;
use parking_lot::Mutex;
use tokio::sync::mpsc;

pub const BADGE_ALERT_TEXT: &str = "!";
pub const BADGE_ALERT_COLOR: &str = "#d73a49";

pub trait IndicatorSink: Send + Sync {
    fn emit(&self, event: IndicatorEvent);
}

/// Forwards events to whoever holds the receiver; drops them once it is gone.
#[derive(Debug, Clone)]
pub struct ChannelIndicator {
    sender: mpsc::UnboundedSender<IndicatorEvent>,
}

impl ChannelIndicator {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<IndicatorEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl IndicatorSink for ChannelIndicator {
    fn emit(&self, event: IndicatorEvent) {
        if self.sender.send(event).is_err() {
            log::debug!("indicator: receiver gone, event dropped");
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BadgeState {
    pub text: String,
    pub color: Option<String>,
}

impl BadgeState {
    pub fn is_raised(&self) -> bool {
        !self.text.is_empty()
    }
}

/// Keeps the toolbar badge in step with indicator events.
#[derive(Debug, Default)]
pub struct BadgeIndicator {
    badge: Mutex<BadgeState>,
}

impl BadgeIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn badge(&self) -> BadgeState {
        self.badge.lock().clone()
    }
}

impl IndicatorSink for BadgeIndicator {
    fn emit(&self, event: IndicatorEvent) {
        let mut badge = self.badge.lock();
        match event {
            IndicatorEvent::MemberDetected { identity } => {
                log::info!("indicator: raising badge for {identity}");
                badge.text = BADGE_ALERT_TEXT.to_string();
                badge.color = Some(BADGE_ALERT_COLOR.to_string());
            },
            IndicatorEvent::ClearIndicator => {
                badge.text.clear();
            },
        }
    }
}
