/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Best-effort identity discovery over loosely-typed application state.
//!
//! Hosts expose their global state as a tree of [`StateNode`]s. The search
//! never fails: a node whose fields or children cannot be read is a dead
//! branch, and the depth bound keeps cyclic graphs finite.

use std::fmt;

use serde_json::Value;

/// Deepest level inspected below a container root (the root is depth 0).
pub const MAX_SEARCH_DEPTH: usize = 5;

/// Field names that carry an account name, in preference order.
pub const IDENTITY_FIELDS: [&str; 2] = ["login", "username"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateAccessError {
    pub reason: String,
}

impl StateAccessError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for StateAccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "state not accessible: {}", self.reason)
    }
}

impl std::error::Error for StateAccessError {}

/// A node in a host-provided state graph.
pub trait StateNode: Sized {
    /// Objects and arrays; only containers are inspected or descended into.
    fn is_container(&self) -> bool;

    /// The string value of `field` when this node is an object holding a string there.
    fn string_field(&self, field: &str) -> Result<Option<String>, StateAccessError>;

    /// Child values in host iteration order.
    fn children(&self) -> Result<Vec<Self>, StateAccessError>;
}

impl<'a> StateNode for &'a Value {
    fn is_container(&self) -> bool {
        matches!(self, Value::Object(_) | Value::Array(_))
    }

    fn string_field(&self, field: &str) -> Result<Option<String>, StateAccessError> {
        Ok(self
            .as_object()
            .and_then(|object| object.get(field))
            .and_then(Value::as_str)
            .map(str::to_owned))
    }

    fn children(&self) -> Result<Vec<Self>, StateAccessError> {
        Ok(match *self {
            Value::Object(object) => object.values().collect(),
            Value::Array(items) => items.iter().collect(),
            _ => Vec::new(),
        })
    }
}

/// Depth-first search for the first container exposing a non-empty identity field.
pub fn find_identity_field<N: StateNode>(root: &N, max_depth: usize) -> Option<String> {
    search(root, 0, max_depth)
}

fn search<N: StateNode>(node: &N, depth: usize, max_depth: usize) -> Option<String> {
    if depth > max_depth || !node.is_container() {
        return None;
    }

    for field in IDENTITY_FIELDS {
        if let Ok(Some(value)) = node.string_field(field)
            && !value.is_empty()
        {
            return Some(value);
        }
    }

    let Ok(children) = node.children() else {
        return None;
    };
    children
        .iter()
        .filter(|child| child.is_container())
        .find_map(|child| search(child, depth + 1, max_depth))
}
