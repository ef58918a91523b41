/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Authenticated-endpoint lookup: ask the site who is signed in.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use guard_core::Identity;
use reqwest::Client;
use reqwest::header::{ACCEPT, COOKIE};
use serde_json::Value;
use url::Url;

use super::{IdentityStrategy, LookupError, StrategyKind};

const REQUESTED_WITH_HEADER: &str = "X-Requested-With";

/// Credentials attached to every identity request.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Raw `Cookie` header value of the signed-in session.
    pub cookie: Option<String>,
    /// Bearer token, for hosts that accept token auth on the identity endpoint.
    pub token: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("cookie", &self.cookie.as_ref().map(|_| "<redacted>"))
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[async_trait]
pub trait IdentityEndpointClient: Send + Sync {
    /// GET `endpoint` with credentials and return the decoded JSON body.
    async fn fetch_identity_document(&self, endpoint: &Url) -> Result<Value, LookupError>;
}

pub struct HttpIdentityClient {
    client: Client,
    credentials: Credentials,
}

impl HttpIdentityClient {
    pub fn new(credentials: Credentials, request_timeout: Duration) -> Result<Self, LookupError> {
        let client = Client::builder()
            .timeout(request_timeout)
            .user_agent(concat!("admin-guard/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LookupError::Client(e.to_string()))?;
        Ok(Self::with_client(client, credentials))
    }

    pub fn with_client(client: Client, credentials: Credentials) -> Self {
        Self {
            client,
            credentials,
        }
    }
}

#[async_trait]
impl IdentityEndpointClient for HttpIdentityClient {
    async fn fetch_identity_document(&self, endpoint: &Url) -> Result<Value, LookupError> {
        let mut request = self
            .client
            .get(endpoint.clone())
            .header(ACCEPT, "application/json")
            .header(REQUESTED_WITH_HEADER, "XMLHttpRequest");
        if let Some(cookie) = &self.credentials.cookie {
            request = request.header(COOKIE, cookie);
        }
        if let Some(token) = &self.credentials.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| LookupError::Network(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::HttpStatus(status.as_u16()));
        }
        response
            .json::<Value>()
            .await
            .map_err(|e| LookupError::Body(e.to_string()))
    }
}

/// The account name from an identity endpoint response, if it carries one.
pub fn parse_identity_document(document: &Value) -> Option<Identity> {
    let object = document.as_object()?;
    ["login", "username"]
        .iter()
        .filter_map(|field| object.get(*field).and_then(Value::as_str))
        .find_map(Identity::new)
}

pub struct EndpointStrategy {
    endpoints: Vec<String>,
    client: Arc<dyn IdentityEndpointClient>,
}

impl EndpointStrategy {
    pub fn new(endpoints: Vec<String>, client: Arc<dyn IdentityEndpointClient>) -> Self {
        Self { endpoints, client }
    }

    async fn try_endpoint(&self, raw: &str) -> Result<Option<Identity>, LookupError> {
        let endpoint = Url::parse(raw).map_err(|_| LookupError::InvalidEndpoint(raw.to_string()))?;
        let document = self.client.fetch_identity_document(&endpoint).await?;
        Ok(parse_identity_document(&document))
    }
}

#[async_trait]
impl IdentityStrategy for EndpointStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::AuthenticatedEndpoint
    }

    async fn detect(&self) -> Result<Option<Identity>, LookupError> {
        for endpoint in &self.endpoints {
            match self.try_endpoint(endpoint).await {
                Ok(Some(identity)) => return Ok(Some(identity)),
                Ok(None) => log::debug!("identity: {endpoint} returned no account name"),
                Err(e) => log::debug!("identity: {endpoint} failed: {e}"),
            }
        }
        Ok(None)
    }
}
