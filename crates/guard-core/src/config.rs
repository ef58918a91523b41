/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! User preferences read on every evaluation.

use std::fmt;
use std::str::FromStr;

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

use crate::identity::{SensitiveSet, normalize_entry};

/// How a detected sensitive identity is presented to the user.
///
/// Deserialization is lenient: unset or unrecognized values, of any type,
/// become [`NotificationStyle::Banner`]. [`FromStr`] is strict, for user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationStyle {
    #[default]
    Banner,
    Modal,
    BrowserNotification,
}

impl NotificationStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Banner => "banner",
            Self::Modal => "modal",
            Self::BrowserNotification => "browser-notification",
        }
    }

    fn parse_known(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "banner" => Some(Self::Banner),
            "modal" => Some(Self::Modal),
            "browser" | "browser-notification" => Some(Self::BrowserNotification),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for NotificationStyle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Stored {
            Named(String),
            Other(IgnoredAny),
        }

        Ok(match Stored::deserialize(deserializer)? {
            Stored::Named(raw) => Self::parse_known(&raw).unwrap_or_default(),
            Stored::Other(_) => Self::default(),
        })
    }
}

impl FromStr for NotificationStyle {
    type Err = PreferenceEditError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::parse_known(raw).ok_or_else(|| PreferenceEditError::UnknownStyle(raw.to_string()))
    }
}

impl fmt::Display for NotificationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    pub sensitive_identities: Vec<String>,
    pub notification_style: NotificationStyle,
    pub enabled: bool,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            sensitive_identities: Vec::new(),
            notification_style: NotificationStyle::Banner,
            enabled: true,
        }
    }
}

impl GuardConfig {
    pub fn sensitive_set(&self) -> SensitiveSet {
        SensitiveSet::from_entries(&self.sensitive_identities)
    }

    /// Add an identity, returning the normalized form that was stored.
    pub fn add_identity(&mut self, raw: &str) -> Result<String, PreferenceEditError> {
        let normalized = normalize_entry(raw).ok_or(PreferenceEditError::EmptyIdentity)?;
        let already_listed = self
            .sensitive_identities
            .iter()
            .filter_map(|existing| normalize_entry(existing))
            .any(|existing| existing == normalized);
        if already_listed {
            return Err(PreferenceEditError::DuplicateIdentity(normalized));
        }
        self.sensitive_identities.push(normalized.clone());
        Ok(normalized)
    }

    /// Remove every entry matching `raw` after normalization.
    pub fn remove_identity(&mut self, raw: &str) -> bool {
        let Some(normalized) = normalize_entry(raw) else {
            return false;
        };
        let before = self.sensitive_identities.len();
        self.sensitive_identities
            .retain(|existing| normalize_entry(existing).as_deref() != Some(normalized.as_str()));
        self.sensitive_identities.len() != before
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreferenceEditError {
    EmptyIdentity,
    DuplicateIdentity(String),
    UnknownStyle(String),
}

impl fmt::Display for PreferenceEditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyIdentity => write!(f, "identity must not be empty"),
            Self::DuplicateIdentity(name) => write!(f, "identity {name} is already listed"),
            Self::UnknownStyle(raw) => write!(
                f,
                "unknown notification style {raw:?} (expected banner, modal or browser-notification)"
            ),
        }
    }
}

impl std::error::Error for PreferenceEditError {}
