//! Vault API client
//!
//! A thin typed HTTP client for the handful of Vault endpoints this tool
//! needs: LDAP group, approle, and ACL policy create-or-update, plus token
//! and approle authentication. Calls are sequential and unbuffered; there is
//! deliberately no retry or backoff layer.

use crate::config::VaultConfig;
use crate::error::{VaultError, VaultResult};
use crate::flatten::PathCapabilities;
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde_json::json;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

const TOKEN_HEADER: &str = "X-Vault-Token";

/// Vault API client
pub struct VaultClient {
    http: Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl VaultClient {
    /// Create a new Vault client from configuration
    pub fn new(config: &VaultConfig) -> VaultResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(!config.verify_ssl)
            .user_agent(format!("vault-selfserve/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(VaultError::Request)?;

        Ok(Self {
            http,
            base_url: config.api_url(),
            token: RwLock::new(config.token.clone()),
        })
    }

    /// Build a URL for an API endpoint
    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Add the session token to a request
    async fn authenticated(&self, request: RequestBuilder) -> VaultResult<RequestBuilder> {
        let token = self.token.read().await;
        let token = token.as_deref().ok_or(VaultError::NoCredentials)?;
        Ok(request.header(TOKEN_HEADER, token))
    }

    /// Turn a non-2xx response into an error carrying the body
    async fn check(response: Response) -> VaultResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(VaultError::from_response(status.as_u16(), &body))
    }

    /// Establish a usable session token.
    ///
    /// The configured token is kept if it passes a lookup-self probe;
    /// otherwise an approle login is performed with the configured role
    /// credentials and its client token is adopted.
    pub async fn authenticate(&self, config: &VaultConfig) -> VaultResult<()> {
        if self.token.read().await.is_some() && self.lookup_self().await.is_ok() {
            debug!("authenticated with configured token");
            return Ok(());
        }

        let (role_id, secret_id) = match (&config.role_id, &config.role_secret) {
            (Some(role_id), Some(secret_id)) => (role_id, secret_id),
            _ => return Err(VaultError::NoCredentials),
        };

        let response = self
            .http
            .post(self.url("/auth/approle/login"))
            .json(&json!({ "role_id": role_id, "secret_id": secret_id }))
            .send()
            .await?;
        let response = Self::check(response).await?;

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| VaultError::InvalidResponse(format!("failed to parse login: {e}")))?;
        let client_token = body["auth"]["client_token"]
            .as_str()
            .ok_or_else(|| {
                VaultError::InvalidResponse("login response carries no client_token".to_string())
            })?
            .to_string();

        *self.token.write().await = Some(client_token);
        debug!("authenticated via approle login");
        Ok(())
    }

    /// Probe whether the current token is accepted by the server
    async fn lookup_self(&self) -> VaultResult<()> {
        let request = self.http.get(self.url("/auth/token/lookup-self"));
        let request = self.authenticated(request).await?;
        Self::check(request.send().await?).await?;
        Ok(())
    }

    /// Make an authenticated POST request, discarding the response body
    async fn post<B: Serialize + ?Sized>(&self, endpoint: &str, body: &B) -> VaultResult<()> {
        let request = self.http.post(self.url(endpoint)).json(body);
        let request = self.authenticated(request).await?;
        Self::check(request.send().await?).await?;
        Ok(())
    }

    /// Make an authenticated PUT request, discarding the response body
    async fn put<B: Serialize + ?Sized>(&self, endpoint: &str, body: &B) -> VaultResult<()> {
        let request = self.http.put(self.url(endpoint)).json(body);
        let request = self.authenticated(request).await?;
        Self::check(request.send().await?).await?;
        Ok(())
    }

    /// Create or update an LDAP group, granting it the named policies.
    #[instrument(skip(self))]
    pub async fn create_or_update_group(
        &self,
        name: &str,
        policy_names: &[String],
    ) -> VaultResult<()> {
        let endpoint = format!("/auth/ldap/groups/{}", urlencoding::encode(name));
        // The LDAP backend takes its policy list as one comma-joined string
        self.post(&endpoint, &json!({ "policies": policy_names.join(",") }))
            .await
    }

    /// Create or update an approle, granting it the named policies.
    #[instrument(skip(self))]
    pub async fn create_or_update_approle(
        &self,
        name: &str,
        policy_names: &[String],
    ) -> VaultResult<()> {
        let endpoint = format!("/auth/approle/role/{}", urlencoding::encode(name));
        self.post(&endpoint, &json!({ "policies": policy_names }))
            .await
    }

    /// Create or update an ACL policy from a path→capability-set body.
    ///
    /// Vault expects the policy document JSON-encoded inside the request
    /// JSON. Capability lists are sorted for deterministic comparison.
    #[instrument(skip(self, policy))]
    pub async fn create_or_update_policy(
        &self,
        name: &str,
        policy: &PathCapabilities,
    ) -> VaultResult<()> {
        let endpoint = format!("/sys/policies/acl/{}", urlencoding::encode(name));
        let document = policy_document(policy);
        self.put(&endpoint, &json!({ "policy": document.to_string() }))
            .await
    }
}

/// Render a policy body in the shape Vault's ACL endpoint expects:
/// `{"path": {"foobar/*": {"capabilities": ["list", "read"]}, ...}}`
fn policy_document(policy: &PathCapabilities) -> serde_json::Value {
    let mut paths = serde_json::Map::new();
    for (path, capabilities) in policy {
        let mut capabilities: Vec<&str> = capabilities.iter().map(|c| c.as_str()).collect();
        capabilities.sort_unstable();
        paths.insert(path.clone(), json!({ "capabilities": capabilities }));
    }
    json!({ "path": paths })
}
