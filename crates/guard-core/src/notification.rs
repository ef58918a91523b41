/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Notify-once gate and the indicator side-channel payloads.
//!
//! The gate is the only thing that decides whether a warning may be shown.
//! It arms at most once per page view; a page view ends when the gate is
//! reset by a navigation or a dismissal. Every reset advances the page-view
//! epoch, so an evaluation that started under an older epoch can never arm
//! the gate for a newer page view.

use serde::{Deserialize, Serialize};

use crate::identity::Identity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotificationState {
    /// No warning shown; the next matching evaluation may arm.
    #[default]
    Unarmed,
    /// A warning is currently presented.
    Armed,
}

/// Page-view counter captured at the start of an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageViewEpoch(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmOutcome {
    /// The caller won the transition and must notify exactly once.
    Armed,
    /// A warning is already presented for this page view.
    AlreadyArmed,
    /// The gate was reset after the caller captured its epoch.
    Superseded,
}

#[derive(Debug, Default)]
pub struct NotificationGate {
    state: NotificationState,
    epoch: u64,
}

impl NotificationGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> NotificationState {
        self.state
    }

    pub fn epoch(&self) -> PageViewEpoch {
        PageViewEpoch(self.epoch)
    }

    /// Start a new page view. Returns the state before the reset.
    pub fn reset(&mut self) -> NotificationState {
        let previous = self.state;
        self.state = NotificationState::Unarmed;
        self.epoch = self.epoch.wrapping_add(1);
        previous
    }

    /// The user closed the warning armed under `observed`. Ends that page
    /// view only if it is still current and armed; returns whether it did.
    pub fn dismiss(&mut self, observed: PageViewEpoch) -> bool {
        if observed.0 != self.epoch || self.state != NotificationState::Armed {
            return false;
        }
        self.reset();
        true
    }

    pub fn try_arm(&mut self, observed: PageViewEpoch) -> ArmOutcome {
        if observed.0 != self.epoch {
            return ArmOutcome::Superseded;
        }
        match self.state {
            NotificationState::Armed => ArmOutcome::AlreadyArmed,
            NotificationState::Unarmed => {
                self.state = NotificationState::Armed;
                ArmOutcome::Armed
            },
        }
    }
}

/// Fire-and-forget message for the toolbar indicator collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum IndicatorEvent {
    MemberDetected { identity: Identity },
    ClearIndicator,
}
