/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Structural fallback: read the account from the profile menu links.
//! Least reliable of the strategies, so it runs last.

use std::sync::Arc;

use async_trait::async_trait;
use guard_core::Identity;
use guard_core::profile_links::first_profile_segment;

use super::{IdentityStrategy, LookupError, StrategyKind};
use crate::shell::host::page::PageDocument;

pub struct ProfileMenuStrategy {
    page: Arc<dyn PageDocument>,
}

impl ProfileMenuStrategy {
    pub fn new(page: Arc<dyn PageDocument>) -> Self {
        Self { page }
    }
}

#[async_trait]
impl IdentityStrategy for ProfileMenuStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ProfileMenu
    }

    async fn detect(&self) -> Result<Option<Identity>, LookupError> {
        let menus = self.page.profile_menus();
        Ok(menus.iter().find_map(|menu| {
            first_profile_segment(menu.hrefs.iter().map(String::as_str), menu.shape)
                .and_then(Identity::new)
        }))
    }
}
