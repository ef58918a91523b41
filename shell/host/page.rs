/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Read-only view of the hosting page, as seen by identity resolution.

use guard_core::profile_links::MenuShape;
use guard_core::state_tree::StateAccessError;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

use super::history::History;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MetaAttribute {
    /// `<meta name="...">`
    Name,
    /// `<meta property="...">`
    Property,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaTag {
    pub attribute: MetaAttribute,
    pub key: String,
    pub content: String,
}

impl MetaTag {
    pub fn new(attribute: MetaAttribute, key: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            attribute,
            key: key.into(),
            content: content.into(),
        }
    }
}

/// Links found under one account menu, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileMenu {
    pub shape: MenuShape,
    pub hrefs: Vec<String>,
}

pub trait PageDocument: Send + Sync {
    /// Full current location, including query and fragment.
    fn location(&self) -> String;

    /// A named global application-state container. `Err` when the container
    /// exists but reading it failed.
    fn global_state(&self, name: &str) -> Result<Option<Value>, StateAccessError>;

    /// Content of the first meta tag matching `attribute=key`.
    fn meta_content(&self, attribute: MetaAttribute, key: &str) -> Option<String>;

    fn profile_menus(&self) -> Vec<ProfileMenu>;
}

/// Serializable capture of everything [`PageDocument`] exposes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSnapshot {
    pub location: String,
    pub globals: Map<String, Value>,
    pub meta: Vec<MetaTag>,
    pub profile_menus: Vec<ProfileMenu>,
}

#[derive(Default)]
struct StaticPageState {
    snapshot: PageSnapshot,
    denied_globals: BTreeSet<String>,
}

/// In-process page backed by a [`PageSnapshot`]. Also acts as the page's
/// history, so pushes and replaces move its location.
#[derive(Default)]
pub struct StaticPage {
    state: RwLock<StaticPageState>,
}

impl StaticPage {
    pub fn new(snapshot: PageSnapshot) -> Self {
        Self {
            state: RwLock::new(StaticPageState {
                snapshot,
                denied_globals: BTreeSet::new(),
            }),
        }
    }

    pub fn at(location: impl Into<String>) -> Self {
        Self::new(PageSnapshot {
            location: location.into(),
            ..PageSnapshot::default()
        })
    }

    pub fn set_location(&self, location: impl Into<String>) {
        self.state.write().snapshot.location = location.into();
    }

    /// Replace the page content while keeping the current location.
    pub fn update(&self, snapshot: PageSnapshot) {
        let mut state = self.state.write();
        let location = std::mem::take(&mut state.snapshot.location);
        state.snapshot = PageSnapshot {
            location,
            ..snapshot
        };
    }

    /// Make reads of `name` fail, as a cross-origin or throwing getter would.
    pub fn deny_global(&self, name: impl Into<String>) {
        self.state.write().denied_globals.insert(name.into());
    }
}

impl PageDocument for StaticPage {
    fn location(&self) -> String {
        self.state.read().snapshot.location.clone()
    }

    fn global_state(&self, name: &str) -> Result<Option<Value>, StateAccessError> {
        let state = self.state.read();
        if state.denied_globals.contains(name) {
            return Err(StateAccessError::new(format!("access to {name} denied")));
        }
        Ok(state.snapshot.globals.get(name).cloned())
    }

    fn meta_content(&self, attribute: MetaAttribute, key: &str) -> Option<String> {
        self.state
            .read()
            .snapshot
            .meta
            .iter()
            .find(|tag| tag.attribute == attribute && tag.key == key)
            .map(|tag| tag.content.clone())
    }

    fn profile_menus(&self) -> Vec<ProfileMenu> {
        self.state.read().snapshot.profile_menus.clone()
    }
}

impl History for StaticPage {
    fn push_state(&self, location: &str) {
        self.set_location(location);
    }

    fn replace_state(&self, location: &str) {
        self.set_location(location);
    }
}
