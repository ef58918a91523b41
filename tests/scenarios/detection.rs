/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use admin_guard::guard_core::NotificationStyle;
use admin_guard::guard_core::profile_links::MenuShape;
use admin_guard::shell::host::page::{MetaAttribute, MetaTag, PageSnapshot, ProfileMenu};
use admin_guard::shell::runtime::evaluation::EvaluationOutcome;
use serde_json::json;

use super::harness::{EndpointDouble, Scenario, config};

fn pr_page() -> PageSnapshot {
    PageSnapshot {
        location: "https://github.com/org/repo/compare/main...topic".to_string(),
        ..PageSnapshot::default()
    }
}

async fn detected_identity(snapshot: PageSnapshot) -> Option<String> {
    let scenario = Scenario::new(
        snapshot,
        config(&[], NotificationStyle::Banner, true),
        EndpointDouble::unreachable(),
    );
    match scenario.evaluation.evaluate().await {
        EvaluationOutcome::NotMember { identity } => Some(identity.as_str().to_string()),
        EvaluationOutcome::Unresolved => None,
        other => panic!("unexpected outcome {other}"),
    }
}

#[tokio::test]
async fn embedded_state_is_used_when_endpoints_fail() {
    let snapshot = PageSnapshot {
        globals: json!({ "app": { "session": { "viewer": { "login": "from-state" } } } })
            .as_object()
            .cloned()
            .unwrap_or_default(),
        meta: vec![MetaTag::new(MetaAttribute::Name, "user-login", "from-meta")],
        ..pr_page()
    };
    assert_eq!(detected_identity(snapshot).await.as_deref(), Some("from-state"));
}

#[tokio::test]
async fn metadata_is_used_when_state_is_missing() {
    let snapshot = PageSnapshot {
        meta: vec![
            MetaTag::new(MetaAttribute::Property, "og:site_name", "GitHub"),
            MetaTag::new(MetaAttribute::Name, "user-login", "from-meta"),
        ],
        ..pr_page()
    };
    assert_eq!(detected_identity(snapshot).await.as_deref(), Some("from-meta"));
}

#[tokio::test]
async fn profile_menu_is_the_last_resort() {
    let snapshot = PageSnapshot {
        meta: vec![MetaTag::new(MetaAttribute::Property, "og:site_name", "GitHub")],
        profile_menus: vec![ProfileMenu {
            shape: MenuShape::AvatarDisclosure,
            hrefs: vec!["/settings".into(), "/from-menu/stars".into()],
        }],
        ..pr_page()
    };
    assert_eq!(detected_identity(snapshot).await.as_deref(), Some("from-menu"));
}

#[tokio::test]
async fn nothing_detectable_is_unresolved() {
    assert_eq!(detected_identity(pr_page()).await, None);
}
