/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::sync::Arc;
use std::time::Duration;

use admin_guard::guard_core::{IndicatorEvent, NotificationState, NotificationStyle};
use admin_guard::shell::host::history::{History, HistoryAdapter};
use admin_guard::shell::host::liveness::ContextHandle;
use admin_guard::shell::host::presentation::PresentationRequest;
use admin_guard::shell::runtime::watcher::{NavigationWatcher, WatcherExit, WatcherTimings};

use super::harness::{EndpointDouble, Scenario, config};

#[tokio::test(start_paused = true)]
async fn navigating_between_pull_requests_rearms_the_warning() {
    let mut scenario = Scenario::at(
        "https://github.com/org/repo/pull/7",
        config(&["root-admin"], NotificationStyle::Banner, true),
        EndpointDouble::signed_in("root-admin"),
    );
    let (hub, events) = Scenario::navigation();
    let history = HistoryAdapter::new(scenario.page.clone(), hub.clone());
    let context = ContextHandle::new();
    let watcher = NavigationWatcher::spawn(
        Arc::clone(&scenario.evaluation),
        scenario.page.clone(),
        Arc::new(context.clone()),
        events,
        WatcherTimings::default(),
    );

    tokio::time::sleep(Duration::from_millis(1100)).await;
    assert_eq!(scenario.evaluation.notification_state(), NotificationState::Armed);
    assert_eq!(scenario.drain_requests().len(), 1);

    history.push_state("https://github.com/org/repo/pull/8");
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(scenario.evaluation.notification_state(), NotificationState::Unarmed);
    assert!(matches!(
        scenario.drain_requests().as_slice(),
        [PresentationRequest::Withdraw]
    ));

    tokio::time::sleep(Duration::from_millis(1000)).await;
    assert_eq!(scenario.evaluation.notification_state(), NotificationState::Armed);
    assert!(matches!(
        scenario.drain_requests().as_slice(),
        [PresentationRequest::Banner { .. }]
    ));
    // The identity is cached for the page context, so only one lookup ran.
    assert_eq!(scenario.endpoint.request_count(), 1);

    let indicator = scenario.drain_indicator();
    assert!(matches!(
        indicator.as_slice(),
        [
            IndicatorEvent::MemberDetected { .. },
            IndicatorEvent::ClearIndicator,
            IndicatorEvent::MemberDetected { .. },
        ]
    ));

    context.invalidate();
    assert_eq!(watcher.join().await, WatcherExit::ContextInvalidated);
    assert!(!hub.popstate());
}

#[tokio::test(start_paused = true)]
async fn leaving_pull_requests_withdraws_without_rearming() {
    let mut scenario = Scenario::at(
        "https://github.com/org/repo/pull/7",
        config(&["root-admin"], NotificationStyle::Banner, true),
        EndpointDouble::signed_in("root-admin"),
    );
    let (hub, events) = Scenario::navigation();
    let watcher = NavigationWatcher::spawn(
        Arc::clone(&scenario.evaluation),
        scenario.page.clone(),
        Arc::new(ContextHandle::new()),
        events,
        WatcherTimings::default(),
    );
    tokio::time::sleep(Duration::from_millis(1100)).await;
    scenario.drain_requests();

    scenario.page.set_location("https://github.com/org/repo/issues/3");
    hub.popstate();
    tokio::time::sleep(Duration::from_secs(6)).await;

    assert_eq!(scenario.evaluation.notification_state(), NotificationState::Unarmed);
    assert!(matches!(
        scenario.drain_requests().as_slice(),
        [PresentationRequest::Withdraw]
    ));

    watcher.shutdown();
    assert_eq!(watcher.join().await, WatcherExit::Shutdown);
}
