/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use admin_guard::services::config_store::MemoryConfigStore;
use admin_guard::services::identity::{
    IdentityEndpointClient, IdentityResolver, LookupError, ResolverSettings,
};
use admin_guard::shell::host::history::{NavigationEvents, NavigationHub};
use admin_guard::shell::host::indicator::ChannelIndicator;
use admin_guard::shell::host::page::{PageSnapshot, StaticPage};
use admin_guard::shell::host::presentation::{ChannelPresenter, PresentationRequest};
use admin_guard::shell::runtime::evaluation::EvaluationLoop;
use admin_guard::guard_core::{GuardConfig, IndicatorEvent, NotificationStyle};
use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::mpsc::UnboundedReceiver;
use url::Url;

/// Identity endpoint double: answers every request with the same document,
/// or fails every request.
pub struct EndpointDouble {
    answer: Option<Value>,
    requests: AtomicUsize,
}

impl EndpointDouble {
    pub fn signed_in(login: &str) -> Self {
        Self {
            answer: Some(json!({ "login": login })),
            requests: AtomicUsize::new(0),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            answer: None,
            requests: AtomicUsize::new(0),
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityEndpointClient for EndpointDouble {
    async fn fetch_identity_document(&self, _endpoint: &Url) -> Result<Value, LookupError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.answer
            .clone()
            .ok_or_else(|| LookupError::Network("connection refused".to_string()))
    }
}

pub fn config(names: &[&str], style: NotificationStyle, enabled: bool) -> GuardConfig {
    GuardConfig {
        sensitive_identities: names.iter().map(|name| name.to_string()).collect(),
        notification_style: style,
        enabled,
    }
}

/// One page context wired with the full default strategy cascade.
pub struct Scenario {
    pub page: Arc<StaticPage>,
    pub store: Arc<MemoryConfigStore>,
    pub endpoint: Arc<EndpointDouble>,
    pub evaluation: Arc<EvaluationLoop>,
    pub requests: UnboundedReceiver<PresentationRequest>,
    pub indicator: UnboundedReceiver<IndicatorEvent>,
}

impl Scenario {
    pub fn new(snapshot: PageSnapshot, config: GuardConfig, endpoint: EndpointDouble) -> Self {
        let page = Arc::new(StaticPage::new(snapshot));
        let store = Arc::new(MemoryConfigStore::new(config));
        let endpoint = Arc::new(endpoint);
        let resolver = IdentityResolver::with_default_strategies(
            page.clone(),
            endpoint.clone(),
            &ResolverSettings::default(),
        );
        let (presenter, requests) = ChannelPresenter::channel();
        let (indicator_sink, indicator) = ChannelIndicator::channel();
        let evaluation = Arc::new(EvaluationLoop::new(
            page.clone(),
            store.clone(),
            Arc::new(resolver),
            Arc::new(presenter),
            Arc::new(indicator_sink),
        ));
        Self {
            page,
            store,
            endpoint,
            evaluation,
            requests,
            indicator,
        }
    }

    pub fn at(location: &str, config: GuardConfig, endpoint: EndpointDouble) -> Self {
        Self::new(
            PageSnapshot {
                location: location.to_string(),
                ..PageSnapshot::default()
            },
            config,
            endpoint,
        )
    }

    pub fn drain_requests(&mut self) -> Vec<PresentationRequest> {
        std::iter::from_fn(|| self.requests.try_recv().ok()).collect()
    }

    pub fn drain_indicator(&mut self) -> Vec<IndicatorEvent> {
        std::iter::from_fn(|| self.indicator.try_recv().ok()).collect()
    }

    pub fn navigation() -> (NavigationHub, NavigationEvents) {
        NavigationHub::channel()
    }
}
