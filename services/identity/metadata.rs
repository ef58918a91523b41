/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::sync::Arc;

use async_trait::async_trait;
use guard_core::Identity;

use super::{IdentityStrategy, LookupError, StrategyKind};
use crate::shell::host::page::{MetaAttribute, PageDocument};

/// Meta tags that may carry the signed-in account, in lookup order.
const IDENTITY_META_TAGS: [(MetaAttribute, &str); 2] = [
    (MetaAttribute::Name, "user-login"),
    (MetaAttribute::Property, "og:site_name"),
];

pub struct MetadataStrategy {
    page: Arc<dyn PageDocument>,
    placeholders: Vec<String>,
}

impl MetadataStrategy {
    pub fn new(page: Arc<dyn PageDocument>, placeholders: Vec<String>) -> Self {
        let placeholders = placeholders
            .into_iter()
            .map(|placeholder| placeholder.to_lowercase())
            .filter(|placeholder| !placeholder.is_empty())
            .collect();
        Self { page, placeholders }
    }

    fn is_placeholder(&self, content: &str) -> bool {
        let content = content.to_lowercase();
        self.placeholders
            .iter()
            .any(|placeholder| content.contains(placeholder.as_str()))
    }
}

#[async_trait]
impl IdentityStrategy for MetadataStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Metadata
    }

    async fn detect(&self) -> Result<Option<Identity>, LookupError> {
        for (attribute, key) in IDENTITY_META_TAGS {
            let Some(content) = self.page.meta_content(attribute, key) else {
                continue;
            };
            if self.is_placeholder(&content) {
                log::debug!("identity: ignoring placeholder meta {key}={content:?}");
                continue;
            }
            if let Some(identity) = Identity::new(&content) {
                return Ok(Some(identity));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::host::page::{MetaTag, PageSnapshot, StaticPage};

    fn strategy_for(meta: Vec<MetaTag>) -> MetadataStrategy {
        let page = StaticPage::new(PageSnapshot {
            meta,
            ..PageSnapshot::default()
        });
        MetadataStrategy::new(Arc::new(page), vec!["GitHub".to_string()])
    }

    #[tokio::test]
    async fn reads_the_user_login_tag() {
        let strategy = strategy_for(vec![
            MetaTag::new(MetaAttribute::Property, "og:site_name", "GitHub"),
            MetaTag::new(MetaAttribute::Name, "user-login", "Root-Admin"),
        ]);
        let identity = strategy.detect().await.expect("metadata lookup never fails");
        assert_eq!(identity.as_ref().map(Identity::as_str), Some("Root-Admin"));
    }

    #[tokio::test]
    async fn rejects_site_name_placeholders() {
        let strategy = strategy_for(vec![MetaTag::new(
            MetaAttribute::Property,
            "og:site_name",
            "GitHub Enterprise",
        )]);
        assert_eq!(strategy.detect().await, Ok(None));
    }

    #[tokio::test]
    async fn blank_user_login_falls_back_to_site_name_tag() {
        let strategy = strategy_for(vec![
            MetaTag::new(MetaAttribute::Name, "user-login", "  "),
            MetaTag::new(MetaAttribute::Property, "og:site_name", "octocat"),
        ]);
        let identity = strategy.detect().await.expect("metadata lookup never fails");
        assert_eq!(identity.as_ref().map(Identity::as_str), Some("octocat"));
    }
}
