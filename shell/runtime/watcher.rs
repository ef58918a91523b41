/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Soft-navigation watcher.
//!
//! Owns one supervised task that multiplexes:
//! - navigation signals (DOM mutations, popstate, history push/replace),
//!   which reset the notification gate and (re)start the settle delay;
//! - the settle deadline, which spawns one evaluation for however many
//!   signals arrived while it was pending;
//! - a periodic re-check on sensitive pages, without a reset;
//! - a liveness check that tears everything down once the host context is
//!   gone.
//!
//! Evaluations run in a [`JoinSet`] so the loop never waits on one, and so
//! teardown can abort whatever is still in flight.

use std::sync::Arc;
use std::time::Duration;

use guard_core::is_sensitive_page;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{Instant, MissedTickBehavior, interval, interval_at, sleep_until};
use tokio_util::sync::CancellationToken;

use super::evaluation::{EvaluationLoop, EvaluationOutcome};
use crate::shell::host::history::{NavigationEvents, NavigationSignal};
use crate::shell::host::liveness::LivenessProbe;
use crate::shell::host::page::PageDocument;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatcherTimings {
    /// Quiet period after a navigation before evaluating.
    pub settle_delay: Duration,
    /// Safety-net re-evaluation period while on a sensitive page.
    pub recheck_interval: Duration,
    pub liveness_interval: Duration,
}

impl Default for WatcherTimings {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_secs(1),
            recheck_interval: Duration::from_secs(5),
            liveness_interval: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherExit {
    Shutdown,
    ContextInvalidated,
}

pub struct NavigationWatcher {
    cancel: CancellationToken,
    task: JoinHandle<WatcherExit>,
}

impl NavigationWatcher {
    /// Start watching. Must be called from within a tokio runtime.
    pub fn spawn(
        evaluation: Arc<EvaluationLoop>,
        page: Arc<dyn PageDocument>,
        liveness: Arc<dyn LivenessProbe>,
        events: NavigationEvents,
        timings: WatcherTimings,
    ) -> Self {
        let cancel = CancellationToken::new();
        let last_location = page.location();
        let watch_loop = WatchLoop {
            evaluation,
            page,
            liveness,
            events,
            timings,
            cancel: cancel.clone(),
            evaluations: JoinSet::new(),
            last_location,
            settle_deadline: None,
        };
        let task = tokio::spawn(watch_loop.run());
        log::debug!("watcher: started");
        Self { cancel, task }
    }

    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub async fn join(self) -> WatcherExit {
        match self.task.await {
            Ok(exit) => exit,
            Err(e) => {
                log::warn!("watcher: task ended abnormally: {e}");
                WatcherExit::Shutdown
            },
        }
    }
}

struct WatchLoop {
    evaluation: Arc<EvaluationLoop>,
    page: Arc<dyn PageDocument>,
    liveness: Arc<dyn LivenessProbe>,
    events: NavigationEvents,
    timings: WatcherTimings,
    cancel: CancellationToken,
    evaluations: JoinSet<EvaluationOutcome>,
    last_location: String,
    settle_deadline: Option<Instant>,
}

impl WatchLoop {
    async fn run(mut self) -> WatcherExit {
        let mut liveness = interval(self.timings.liveness_interval);
        liveness.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut recheck = interval_at(
            Instant::now() + self.timings.recheck_interval,
            self.timings.recheck_interval,
        );
        recheck.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut signals_open = true;

        self.restart_settle_delay();

        let exit = loop {
            let deadline = self.settle_deadline;
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break WatcherExit::Shutdown,
                _ = liveness.tick() => {
                    if !self.liveness.is_context_valid() {
                        log::info!("watcher: host context invalidated, stopping");
                        break WatcherExit::ContextInvalidated;
                    }
                },
                signal = self.events.recv(), if signals_open => match signal {
                    Some(signal) => self.on_signal(signal),
                    None => {
                        log::debug!("watcher: navigation signals closed");
                        signals_open = false;
                    },
                },
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.settle_deadline = None;
                    self.spawn_evaluation();
                },
                _ = recheck.tick() => {
                    if is_sensitive_page(&self.page.location()) {
                        self.spawn_evaluation();
                    }
                },
                Some(joined) = self.evaluations.join_next(), if !self.evaluations.is_empty() => {
                    match joined {
                        Ok(outcome) => log::debug!("watcher: evaluation finished: {outcome}"),
                        Err(e) if e.is_cancelled() => {},
                        Err(e) => log::warn!("watcher: evaluation panicked: {e}"),
                    }
                },
            }
        };

        self.teardown().await;
        exit
    }

    fn on_signal(&mut self, signal: NavigationSignal) {
        let location = self.page.location();
        if signal == NavigationSignal::DomMutation && location == self.last_location {
            return;
        }
        log::debug!("watcher: {signal:?} at {location}");
        self.last_location = location;
        self.evaluation.reset_for_navigation();
        self.restart_settle_delay();
    }

    fn restart_settle_delay(&mut self) {
        self.settle_deadline = Some(Instant::now() + self.timings.settle_delay);
    }

    fn spawn_evaluation(&mut self) {
        let evaluation = Arc::clone(&self.evaluation);
        self.evaluations.spawn(async move { evaluation.evaluate().await });
    }

    async fn teardown(&mut self) {
        self.events.close();
        log::debug!("watcher: aborting {} in-flight evaluations", self.evaluations.len());
        self.evaluations.shutdown().await;
        log::debug!("watcher: stopped");
    }
}
