/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use admin_guard::guard_core::{IndicatorEvent, NotificationState, NotificationStyle};
use admin_guard::shell::host::presentation::PresentationRequest;
use admin_guard::shell::runtime::evaluation::EvaluationOutcome;

use super::harness::{EndpointDouble, Scenario, config};

const PR_7: &str = "https://github.com/org/repo/pull/7";

#[tokio::test]
async fn sensitive_member_gets_one_banner_and_one_indicator_event() {
    let mut scenario = Scenario::at(
        PR_7,
        config(&["root-admin"], NotificationStyle::Banner, true),
        EndpointDouble::signed_in("root-admin"),
    );

    let outcome = scenario.evaluation.evaluate().await;

    assert!(outcome.presented(), "unexpected outcome {outcome}");
    let requests = scenario.drain_requests();
    assert_eq!(requests.len(), 1);
    match &requests[0] {
        PresentationRequest::Banner { message, .. } => assert!(message.contains("root-admin")),
        other => panic!("expected a banner, got {other:?}"),
    }
    let indicator = scenario.drain_indicator();
    assert_eq!(indicator.len(), 1);
    assert!(matches!(
        &indicator[0],
        IndicatorEvent::MemberDetected { identity } if identity.as_str() == "root-admin"
    ));
}

#[tokio::test]
async fn non_member_gets_nothing() {
    let mut scenario = Scenario::at(
        PR_7,
        config(&["root-admin"], NotificationStyle::Banner, true),
        EndpointDouble::signed_in("alice"),
    );

    let outcome = scenario.evaluation.evaluate().await;

    assert!(matches!(outcome, EvaluationOutcome::NotMember { .. }));
    assert!(scenario.drain_requests().is_empty());
    assert!(scenario.drain_indicator().is_empty());
}

#[tokio::test]
async fn disabled_guard_only_reads_preferences() {
    let mut scenario = Scenario::at(
        PR_7,
        config(&["root-admin"], NotificationStyle::Banner, false),
        EndpointDouble::signed_in("root-admin"),
    );

    assert_eq!(scenario.evaluation.evaluate().await, EvaluationOutcome::Disabled);
    assert_eq!(scenario.store.load_count(), 1);
    assert_eq!(scenario.endpoint.request_count(), 0);
    assert!(scenario.drain_requests().is_empty());
    assert!(scenario.drain_indicator().is_empty());
}

#[tokio::test]
async fn unreachable_endpoints_and_empty_page_end_quietly() {
    let mut scenario = Scenario::at(
        PR_7,
        config(&["root-admin"], NotificationStyle::Banner, true),
        EndpointDouble::unreachable(),
    );

    let outcome = scenario.evaluation.evaluate().await;

    assert_eq!(outcome, EvaluationOutcome::Unresolved);
    assert_eq!(scenario.endpoint.request_count(), 2);
    assert_eq!(scenario.evaluation.notification_state(), NotificationState::Unarmed);
    assert!(scenario.drain_requests().is_empty());
}

#[tokio::test]
async fn repeated_evaluation_while_armed_does_not_duplicate() {
    let mut scenario = Scenario::at(
        PR_7,
        config(&["Root-Admin"], NotificationStyle::Modal, true),
        EndpointDouble::signed_in("root-admin"),
    );

    let (first, second) = tokio::join!(
        scenario.evaluation.evaluate(),
        scenario.evaluation.evaluate()
    );

    assert_eq!(
        [first.presented(), second.presented()].iter().filter(|p| **p).count(),
        1
    );
    assert_eq!(scenario.endpoint.request_count(), 1);
    assert_eq!(scenario.drain_requests().len(), 1);
    assert_eq!(scenario.evaluation.evaluate().await, EvaluationOutcome::AlreadyArmed);
}
