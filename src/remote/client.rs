//! HTTP access to the user backend.
//!
//! [`UserApi`] is the seam between the controller runtime and the network.
//! [`HttpUserApi`] implements it with `reqwest`, injecting the session's bearer
//! token into every request and normalizing every failure into an
//! [`OperationError`]. Nothing here panics or returns a transport error to the
//! caller.

use super::envelope;
use crate::domain::error::{Result, UserGridError};
use crate::domain::{NewUser, OperationError, UserPatch, UserRecord};
use crate::session::{AuthToken, Credentials};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Message returned when the login endpoint rejects the credentials.
pub const LOGIN_FAILURE_MESSAGE: &str = "Unauthorized: Invalid email or password.";

/// Outcome of one remote operation.
pub type ApiResult<T> = std::result::Result<T, OperationError>;

/// Remote operations consumed by the controller.
#[async_trait]
pub trait UserApi: Send + Sync {
    /// `POST /api/login`
    async fn login(&self, credentials: &Credentials) -> ApiResult<AuthToken>;

    /// `GET /api/users?search=`
    async fn list_users(&self, search: Option<&str>) -> ApiResult<Vec<UserRecord>>;

    /// `POST /api/users`
    async fn create_user(&self, user: &NewUser) -> ApiResult<UserRecord>;

    /// `PUT /api/users/:id`; `None` when the server only acknowledged.
    async fn update_user(&self, id: &str, patch: &UserPatch) -> ApiResult<Option<UserRecord>>;

    /// `DELETE /api/users/:id`
    async fn delete_user(&self, id: &str) -> ApiResult<()>;
}

/// `reqwest`-backed [`UserApi`].
#[derive(Clone)]
pub struct HttpUserApi {
    client: Client,
    base_url: String,
    token: Arc<RwLock<Option<String>>>,
}

impl std::fmt::Debug for HttpUserApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpUserApi")
            .field("base_url", &self.base_url)
            .field("has_token", &self.token.try_read().map(|t| t.is_some()).unwrap_or(false))
            .finish()
    }
}

impl HttpUserApi {
    /// Creates a client for `base_url` with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`UserGridError::Remote`] if the TLS backend cannot be initialized.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UserGridError::Remote(e.to_string()))?;

        tracing::debug!(base_url = %base_url, timeout_ms = timeout.as_millis(), "created http client");

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: Arc::new(RwLock::new(None)),
        })
    }

    /// Sets or clears the bearer token used for subsequent requests.
    pub async fn set_token(&self, token: Option<&AuthToken>) {
        *self.token.write().await = token.map(|t| t.access_token.clone());
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn authorized(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match self.token.read().await.as_deref() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Sends the request and returns the body of a 2xx response.
    async fn execute(&self, request: RequestBuilder) -> ApiResult<Vec<u8>> {
        let response = request.send().await.map_err(|e| {
            tracing::debug!(error = %e, timeout = e.is_timeout(), "request failed without response");
            if e.is_timeout() {
                OperationError::network("Request timed out")
            } else {
                OperationError::network(format!("Network error: {}", e.without_url()))
            }
        })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| OperationError::network(format!("Failed to read response: {e}")))?;

        tracing::debug!(status = status.as_u16(), bytes = body.len(), "response received");

        if status.is_success() {
            Ok(body.to_vec())
        } else {
            Err(OperationError::from_status(status.as_u16(), envelope::error_message(&body)))
        }
    }
}

#[async_trait]
impl UserApi for HttpUserApi {
    async fn login(&self, credentials: &Credentials) -> ApiResult<AuthToken> {
        let request = self.client.post(self.url("api/login")).json(credentials);
        let body = self.execute(request).await.map_err(login_failure)?;
        envelope::login_token(&body).map_err(login_failure)
    }

    async fn list_users(&self, search: Option<&str>) -> ApiResult<Vec<UserRecord>> {
        let mut request = self.authorized(Method::GET, "api/users").await;
        if let Some(search) = search.filter(|s| !s.is_empty()) {
            request = request.query(&[("search", search)]);
        }
        let body = self.execute(request).await?;
        envelope::users(&body)
    }

    async fn create_user(&self, user: &NewUser) -> ApiResult<UserRecord> {
        let request = self.authorized(Method::POST, "api/users").await.json(user);
        let body = self.execute(request).await?;
        envelope::created_user(&body)
    }

    async fn update_user(&self, id: &str, patch: &UserPatch) -> ApiResult<Option<UserRecord>> {
        let request = self.authorized(Method::PUT, &format!("api/users/{id}")).await.json(patch);
        let body = self.execute(request).await?;
        envelope::updated_user(&body)
    }

    async fn delete_user(&self, id: &str) -> ApiResult<()> {
        let request = self.authorized(Method::DELETE, &format!("api/users/{id}")).await;
        let body = self.execute(request).await?;
        envelope::acknowledgement(&body)
    }
}

/// Login rejections carry their own fixed message.
fn login_failure(err: OperationError) -> OperationError {
    if err.is_authorization() {
        OperationError { message: LOGIN_FAILURE_MESSAGE.to_string(), ..err }
    } else {
        err
    }
}
