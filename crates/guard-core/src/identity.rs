/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// An authenticated account name as reported by the host site.
///
/// The original casing is kept for display; equality ignores case.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Returns `None` for empty or whitespace-only input.
    pub fn new(raw: impl AsRef<str>) -> Option<Self> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lower-cased form used for every comparison.
    pub fn normalized(&self) -> String {
        self.0.to_lowercase()
    }
}

impl PartialEq for Identity {
    fn eq(&self, other: &Self) -> bool {
        self.normalized() == other.normalized()
    }
}

impl Eq for Identity {}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Configured identities that should raise a warning.
///
/// Entries are stored normalized: trimmed, without a leading `@`, lower-cased.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SensitiveSet {
    entries: BTreeSet<String>,
}

impl SensitiveSet {
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            entries: entries
                .into_iter()
                .filter_map(|entry| normalize_entry(entry.as_ref()))
                .collect(),
        }
    }

    pub fn contains(&self, identity: &str) -> bool {
        normalize_entry(identity).is_some_and(|normalized| self.entries.contains(&normalized))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}

/// Normalize a user-entered identity: trim, drop one leading `@`, lower-case.
pub fn normalize_entry(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('@').unwrap_or(trimmed).trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_lowercase())
}

/// Case-insensitive membership. False when either side is empty.
pub fn is_member(identity: &str, set: &SensitiveSet) -> bool {
    if set.is_empty() || identity.trim().is_empty() {
        return false;
    }
    set.contains(identity)
}
