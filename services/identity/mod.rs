/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Identity resolution: which account is signed in on the current page.
//!
//! The resolver walks an ordered cascade of [`IdentityStrategy`]s and stops at
//! the first one that yields an identity. A success is cached for the
//! resolver's lifetime (one page context); a miss is never cached, so a later
//! attempt can succeed once more of the page has rendered.
//!
//! At most one cascade runs at a time. Callers arriving while a cascade is in
//! flight subscribe to its outcome through a `watch` channel instead of
//! starting their own, and give up after [`ResolverSettings::wait_timeout`].

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use guard_core::Identity;
use parking_lot::Mutex;
use tokio::sync::watch;

use crate::shell::host::page::PageDocument;

pub mod embedded;
pub mod endpoint;
pub mod metadata;
pub mod profile_menu;

pub use embedded::EmbeddedStateStrategy;
pub use endpoint::{Credentials, EndpointStrategy, HttpIdentityClient, IdentityEndpointClient};
pub use metadata::MetadataStrategy;
pub use profile_menu::ProfileMenuStrategy;

/// Identity endpoints tried in order by the authenticated lookup.
pub const DEFAULT_IDENTITY_ENDPOINTS: [&str; 2] = [
    "https://api.github.com/user",
    "https://github.com/api/v3/user",
];

/// Meta-tag values that name the site rather than an account.
pub const DEFAULT_METADATA_PLACEHOLDERS: [&str; 1] = ["GitHub"];

const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    AuthenticatedEndpoint,
    EmbeddedState,
    Metadata,
    ProfileMenu,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AuthenticatedEndpoint => "authenticated endpoint",
            Self::EmbeddedState => "embedded state",
            Self::Metadata => "page metadata",
            Self::ProfileMenu => "profile menu",
        };
        f.write_str(name)
    }
}

/// A single failed lookup. Always recovered by moving on down the cascade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    InvalidEndpoint(String),
    Network(String),
    HttpStatus(u16),
    Body(String),
    StateInaccessible(String),
    Client(String),
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEndpoint(raw) => write!(f, "invalid identity endpoint {raw:?}"),
            Self::Network(e) => write!(f, "network error: {e}"),
            Self::HttpStatus(status) => write!(f, "unexpected HTTP status {status}"),
            Self::Body(e) => write!(f, "unreadable response body: {e}"),
            Self::StateInaccessible(e) => write!(f, "page state not accessible: {e}"),
            Self::Client(e) => write!(f, "HTTP client unavailable: {e}"),
        }
    }
}

impl std::error::Error for LookupError {}

#[async_trait]
pub trait IdentityStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// `Ok(None)` means this strategy found nothing; the cascade continues either way.
    async fn detect(&self) -> Result<Option<Identity>, LookupError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverSettings {
    pub endpoints: Vec<String>,
    pub metadata_placeholders: Vec<String>,
    /// How long a caller waits on someone else's in-flight resolution.
    pub wait_timeout: Duration,
    /// Per-request bound for the authenticated lookup.
    pub request_timeout: Duration,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            endpoints: DEFAULT_IDENTITY_ENDPOINTS.iter().map(|e| e.to_string()).collect(),
            metadata_placeholders: DEFAULT_METADATA_PLACEHOLDERS
                .iter()
                .map(|p| p.to_string())
                .collect(),
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// `None` while the cascade is running, then the shared outcome.
type PendingOutcome = Option<Option<Identity>>;

#[derive(Default)]
struct ResolverState {
    cached: Option<Identity>,
    pending: Option<watch::Receiver<PendingOutcome>>,
}

enum Claim {
    Cached(Identity),
    Wait(watch::Receiver<PendingOutcome>),
    Lead(watch::Sender<PendingOutcome>),
}

pub struct IdentityResolver {
    strategies: Vec<Box<dyn IdentityStrategy>>,
    wait_timeout: Duration,
    state: Mutex<ResolverState>,
}

impl IdentityResolver {
    pub fn new(strategies: Vec<Box<dyn IdentityStrategy>>, wait_timeout: Duration) -> Self {
        Self {
            strategies,
            wait_timeout,
            state: Mutex::new(ResolverState::default()),
        }
    }

    /// The full cascade: authenticated endpoints, embedded state, page
    /// metadata, then profile menus.
    pub fn with_default_strategies(
        page: Arc<dyn PageDocument>,
        client: Arc<dyn IdentityEndpointClient>,
        settings: &ResolverSettings,
    ) -> Self {
        let strategies: Vec<Box<dyn IdentityStrategy>> = vec![
            Box::new(EndpointStrategy::new(settings.endpoints.clone(), client)),
            Box::new(EmbeddedStateStrategy::new(Arc::clone(&page))),
            Box::new(MetadataStrategy::new(
                Arc::clone(&page),
                settings.metadata_placeholders.clone(),
            )),
            Box::new(ProfileMenuStrategy::new(page)),
        ];
        Self::new(strategies, settings.wait_timeout)
    }

    pub fn cached(&self) -> Option<Identity> {
        self.state.lock().cached.clone()
    }

    pub fn is_resolving(&self) -> bool {
        self.state.lock().pending.is_some()
    }

    pub async fn resolve(&self) -> Option<Identity> {
        match self.claim() {
            Claim::Cached(identity) => {
                log::debug!("identity: using cached identity {identity}");
                Some(identity)
            },
            Claim::Wait(receiver) => self.wait_for_pending(receiver).await,
            Claim::Lead(sender) => {
                let pending = PendingResolution {
                    state: &self.state,
                    sender: Some(sender),
                };
                let outcome = self.run_cascade().await;
                pending.complete(outcome.clone());
                outcome
            },
        }
    }

    fn claim(&self) -> Claim {
        let mut state = self.state.lock();
        if let Some(identity) = &state.cached {
            return Claim::Cached(identity.clone());
        }
        if let Some(receiver) = &state.pending {
            return Claim::Wait(receiver.clone());
        }
        let (sender, receiver) = watch::channel(None);
        state.pending = Some(receiver);
        Claim::Lead(sender)
    }

    async fn wait_for_pending(&self, mut receiver: watch::Receiver<PendingOutcome>) -> Option<Identity> {
        log::debug!("identity: resolution already in flight, waiting");
        match tokio::time::timeout(self.wait_timeout, receiver.wait_for(Option::is_some)).await {
            Ok(Ok(outcome)) => (*outcome).clone().flatten(),
            Ok(Err(_)) => {
                log::debug!("identity: in-flight resolution was abandoned");
                None
            },
            Err(_) => {
                log::debug!(
                    "identity: gave up waiting for in-flight resolution after {:?}",
                    self.wait_timeout
                );
                None
            },
        }
    }

    async fn run_cascade(&self) -> Option<Identity> {
        for strategy in &self.strategies {
            match strategy.detect().await {
                Ok(Some(identity)) => {
                    log::info!("identity: detected {identity} via {}", strategy.kind());
                    return Some(identity);
                },
                Ok(None) => log::debug!("identity: {} found nothing", strategy.kind()),
                Err(e) => log::debug!("identity: {} failed: {e}", strategy.kind()),
            }
        }
        log::debug!("identity: could not detect the signed-in account");
        None
    }
}

/// Owns the in-flight slot for the duration of one cascade.
///
/// Dropping it without [`PendingResolution::complete`] (the leading future
/// was cancelled) frees the slot and closes the channel, which releases
/// every waiter with `None`.
struct PendingResolution<'a> {
    state: &'a Mutex<ResolverState>,
    sender: Option<watch::Sender<PendingOutcome>>,
}

impl PendingResolution<'_> {
    fn complete(mut self, outcome: Option<Identity>) {
        let mut state = self.state.lock();
        if let Some(identity) = &outcome {
            state.cached = Some(identity.clone());
        }
        state.pending = None;
        if let Some(sender) = self.sender.take() {
            sender.send_replace(Some(outcome));
        }
    }
}

impl Drop for PendingResolution<'_> {
    fn drop(&mut self) {
        if self.sender.is_some() {
            self.state.lock().pending = None;
        }
    }
}
