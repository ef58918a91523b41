/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Embedded-state lookup over the page's global application-state containers.

use std::sync::Arc;

use async_trait::async_trait;
use guard_core::Identity;
use guard_core::state_tree::{MAX_SEARCH_DEPTH, find_identity_field};
use serde_json::Value;

use super::{IdentityStrategy, LookupError, StrategyKind};
use crate::shell::host::page::PageDocument;

/// Container with a well-known user location, probed directly.
const INITIAL_STATE_CONTAINER: &str = "__INITIAL_STATE__";
const INITIAL_STATE_LOGIN_POINTER: &str = "/context/user/login";

/// Containers searched recursively, in order.
const SEARCHED_CONTAINERS: [&str; 5] = ["app", "gh", "GitHub", "__app__", "__DATA__"];

pub struct EmbeddedStateStrategy {
    page: Arc<dyn PageDocument>,
}

impl EmbeddedStateStrategy {
    pub fn new(page: Arc<dyn PageDocument>) -> Self {
        Self { page }
    }

    fn container(&self, name: &str) -> Option<Value> {
        match self.page.global_state(name) {
            Ok(value) => value,
            Err(e) => {
                log::debug!("identity: skipping state container {name}: {e}");
                None
            },
        }
    }

    fn probe_initial_state(&self) -> Option<Identity> {
        let state = self.container(INITIAL_STATE_CONTAINER)?;
        state
            .pointer(INITIAL_STATE_LOGIN_POINTER)
            .and_then(Value::as_str)
            .and_then(Identity::new)
    }

    fn search_containers(&self) -> Option<Identity> {
        SEARCHED_CONTAINERS.iter().find_map(|name| {
            let state = self.container(name)?;
            let found = find_identity_field(&&state, MAX_SEARCH_DEPTH)?;
            log::debug!("identity: found account name in state container {name}");
            Identity::new(found)
        })
    }
}

#[async_trait]
impl IdentityStrategy for EmbeddedStateStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::EmbeddedState
    }

    async fn detect(&self) -> Result<Option<Identity>, LookupError> {
        Ok(self.probe_initial_state().or_else(|| self.search_containers()))
    }
}
