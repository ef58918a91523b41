/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! One pass of "should the user be warned right now?".
//!
//! [`EvaluationLoop::evaluate`] never fails: every collaborator failure
//! degrades to "no action" or to default preferences. It is safe to run
//! concurrently with itself; the notification gate admits at most one
//! presentation per page view, and an evaluation that straddles a navigation
//! loses to the newer page view.

use std::fmt;
use std::sync::Arc;

use guard_core::{
    ArmOutcome, GuardConfig, Identity, IndicatorEvent, NotificationGate, NotificationState,
    NotificationStyle, PageViewEpoch, is_member, is_sensitive_page,
};
use parking_lot::Mutex;

use crate::services::config_store::ConfigStore;
use crate::services::identity::IdentityResolver;
use crate::shell::host::indicator::IndicatorSink;
use crate::shell::host::page::PageDocument;
use crate::shell::host::presentation::{DismissHandle, Presenter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvaluationOutcome {
    NotSensitivePage,
    Disabled,
    Unresolved,
    NotMember { identity: Identity },
    /// A warning for this page view is already up.
    AlreadyArmed,
    /// A navigation happened while this evaluation was running.
    Superseded,
    Presented { identity: Identity, style: NotificationStyle },
}

impl EvaluationOutcome {
    pub fn presented(&self) -> bool {
        matches!(self, Self::Presented { .. })
    }
}

impl fmt::Display for EvaluationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotSensitivePage => write!(f, "not a pull-request page"),
            Self::Disabled => write!(f, "warnings disabled"),
            Self::Unresolved => write!(f, "signed-in account not detected"),
            Self::NotMember { identity } => write!(f, "{identity} is not a sensitive account"),
            Self::AlreadyArmed => write!(f, "warning already shown"),
            Self::Superseded => write!(f, "page changed during evaluation"),
            Self::Presented { identity, style } => {
                write!(f, "warned about {identity} ({style})")
            },
        }
    }
}

pub struct EvaluationLoop {
    page: Arc<dyn PageDocument>,
    config: Arc<dyn ConfigStore>,
    resolver: Arc<IdentityResolver>,
    presenter: Arc<dyn Presenter>,
    indicator: Arc<dyn IndicatorSink>,
    gate: Arc<Mutex<NotificationGate>>,
}

impl EvaluationLoop {
    pub fn new(
        page: Arc<dyn PageDocument>,
        config: Arc<dyn ConfigStore>,
        resolver: Arc<IdentityResolver>,
        presenter: Arc<dyn Presenter>,
        indicator: Arc<dyn IndicatorSink>,
    ) -> Self {
        Self {
            page,
            config,
            resolver,
            presenter,
            indicator,
            gate: Arc::new(Mutex::new(NotificationGate::new())),
        }
    }

    pub fn notification_state(&self) -> NotificationState {
        self.gate.lock().state()
    }

    /// Dismissal bound to the page view `epoch`.
    pub fn dismiss_handle(&self, epoch: PageViewEpoch) -> DismissHandle {
        DismissHandle::new(Arc::clone(&self.gate), Arc::clone(&self.indicator), epoch)
    }

    pub fn resolver(&self) -> &IdentityResolver {
        &self.resolver
    }

    /// Begin a new page view. A warning left over from the previous view is
    /// withdrawn and the indicator cleared.
    pub fn reset_for_navigation(&self) {
        let previous = self.gate.lock().reset();
        if previous == NotificationState::Armed {
            log::debug!("evaluation: navigation withdrew the active warning");
            self.presenter.withdraw();
            self.indicator.emit(IndicatorEvent::ClearIndicator);
        }
    }

    pub async fn evaluate(&self) -> EvaluationOutcome {
        let epoch = self.gate.lock().epoch();

        let location = self.page.location();
        if !is_sensitive_page(&location) {
            return EvaluationOutcome::NotSensitivePage;
        }

        let config = self.load_config().await;
        if !config.enabled {
            return EvaluationOutcome::Disabled;
        }

        let Some(identity) = self.resolver.resolve().await else {
            return EvaluationOutcome::Unresolved;
        };

        if !is_member(identity.as_str(), &config.sensitive_set()) {
            return EvaluationOutcome::NotMember { identity };
        }

        if !is_sensitive_page(&self.page.location()) {
            return EvaluationOutcome::NotSensitivePage;
        }

        let armed = self.gate.lock().try_arm(epoch);
        match armed {
            ArmOutcome::AlreadyArmed => EvaluationOutcome::AlreadyArmed,
            ArmOutcome::Superseded => EvaluationOutcome::Superseded,
            ArmOutcome::Armed => {
                let style = config.notification_style;
                self.present(&identity, style, epoch);
                EvaluationOutcome::Presented { identity, style }
            },
        }
    }

    async fn load_config(&self) -> GuardConfig {
        match self.config.load().await {
            Ok(config) => config,
            Err(e) => {
                log::warn!("evaluation: preferences unavailable, using defaults: {e}");
                GuardConfig::default()
            },
        }
    }

    fn present(&self, identity: &Identity, style: NotificationStyle, epoch: PageViewEpoch) {
        log::info!("evaluation: sensitive account {identity} on a pull-request page");
        self.indicator.emit(IndicatorEvent::MemberDetected {
            identity: identity.clone(),
        });
        match style {
            NotificationStyle::Banner => {
                self.presenter.show_banner(identity, self.dismiss_handle(epoch))
            },
            NotificationStyle::Modal => self.presenter.show_modal(identity, self.dismiss_handle(epoch)),
            NotificationStyle::BrowserNotification => {
                self.presenter.request_external_notification(identity)
            },
        }
    }
}
