/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Preference storage. Every evaluation loads a fresh [`GuardConfig`].

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use guard_core::GuardConfig;
use parking_lot::RwLock;

const CONFIG_DIR_NAME: &str = "admin-guard";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Parse(String),
    Serialize(String),
    NoConfigDir,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "config I/O error: {e}"),
            Self::Parse(e) => write!(f, "config parse error: {e}"),
            Self::Serialize(e) => write!(f, "config serialization error: {e}"),
            Self::NoConfigDir => write!(f, "no config directory available"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ConfigError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn load(&self) -> Result<GuardConfig, ConfigError>;
}

/// In-memory store; counts loads so callers can verify fresh reads.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    config: RwLock<GuardConfig>,
    loads: AtomicUsize,
}

impl MemoryConfigStore {
    pub fn new(config: GuardConfig) -> Self {
        Self {
            config: RwLock::new(config),
            loads: AtomicUsize::new(0),
        }
    }

    pub fn update(&self, edit: impl FnOnce(&mut GuardConfig)) {
        edit(&mut *self.config.write());
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn load(&self) -> Result<GuardConfig, ConfigError> {
        self.loads.fetch_add(1, Ordering::Relaxed);
        Ok(self.config.read().clone())
    }
}

/// TOML file store. A missing file reads as the defaults.
#[derive(Debug, Clone)]
pub struct TomlConfigStore {
    path: PathBuf,
}

impl TomlConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/admin-guard/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        let mut dir = dirs::config_dir()?;
        dir.push(CONFIG_DIR_NAME);
        dir.push(CONFIG_FILE_NAME);
        Some(dir)
    }

    pub fn at_default_path() -> Result<Self, ConfigError> {
        Self::default_path().map(Self::new).ok_or(ConfigError::NoConfigDir)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn save(&self, config: &GuardConfig) -> Result<(), ConfigError> {
        let encoded =
            toml::to_string_pretty(config).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, encoded).await?;
        log::debug!("config: saved {}", self.path.display());
        Ok(())
    }

    /// Write the default preferences if no file exists yet. Returns whether
    /// a file was written.
    pub async fn ensure_defaults(&self) -> Result<bool, ConfigError> {
        if tokio::fs::try_exists(&self.path).await? {
            return Ok(false);
        }
        self.save(&GuardConfig::default()).await?;
        log::info!("config: wrote defaults to {}", self.path.display());
        Ok(true)
    }

    /// Load, apply `edit`, and save. Returns whatever `edit` returned.
    pub async fn edit<T, E>(
        &self,
        edit: impl FnOnce(&mut GuardConfig) -> Result<T, E>,
    ) -> Result<Result<T, E>, ConfigError> {
        let mut config = self.load().await?;
        let outcome = edit(&mut config);
        if outcome.is_ok() {
            self.save(&config).await?;
        }
        Ok(outcome)
    }
}

#[async_trait]
impl ConfigStore for TomlConfigStore {
    async fn load(&self) -> Result<GuardConfig, ConfigError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(GuardConfig::default()),
            Err(e) => return Err(e.into()),
        };
        toml::from_str(&raw).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}
