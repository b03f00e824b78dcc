//! Executes [`RemoteRequest`]s against a [`UserApi`].
//!
//! The dispatcher is the asynchronous half of the controller: the event handler
//! emits requests as actions, the runtime hands each one to
//! [`RemoteDispatcher::handle_request`] on its own task, and the resulting
//! [`RemoteResponse`] is fed back into the handler as an event. Spans created
//! while a request runs are parented to the span that issued it.

use super::client::{ApiResult, UserApi};
use super::messages::{RemoteRequest, RemoteResponse};
use std::sync::Arc;
use tracing::Instrument;

/// Runs remote requests; cheap to clone into spawned tasks.
#[derive(Clone)]
pub struct RemoteDispatcher {
    api: Arc<dyn UserApi>,
}

impl std::fmt::Debug for RemoteDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteDispatcher").finish_non_exhaustive()
    }
}

impl RemoteDispatcher {
    #[must_use]
    pub fn new(api: Arc<dyn UserApi>) -> Self {
        Self { api }
    }

    /// Logs the outcome of a remote operation and passes it through.
    fn log_result<T>(operation: &str, result: ApiResult<T>) -> ApiResult<T> {
        match &result {
            Ok(_) => tracing::debug!(operation = operation, "remote operation successful"),
            Err(e) => tracing::debug!(
                operation = operation,
                status_code = e.status_code,
                kind = ?e.kind,
                error = %e.message,
                "remote operation failed"
            ),
        }
        result
    }

    /// Performs one request and packages the outcome as a response.
    pub async fn handle_request(&self, request: RemoteRequest) -> RemoteResponse {
        let span = tracing::debug_span!(
            "remote_request",
            operation = request.operation(),
            epoch = request.epoch()
        );

        if let Some(parent) = request.trace_context().and_then(super::TraceContext::to_otel_context) {
            use tracing_opentelemetry::OpenTelemetrySpanExt;
            span.set_parent(parent);
        }

        self.dispatch(request).instrument(span).await
    }

    async fn dispatch(&self, request: RemoteRequest) -> RemoteResponse {
        match request {
            RemoteRequest::Login { epoch, credentials, .. } => {
                let result = self.api.login(&credentials).await;
                RemoteResponse::LoggedIn {
                    epoch,
                    result: Self::log_result("login", result),
                }
            }
            RemoteRequest::ListUsers { epoch, generation, search, .. } => {
                let result = self.api.list_users(search.as_deref()).await;
                if let Ok(users) = &result {
                    tracing::debug!(user_count = users.len(), generation = generation, "users fetched");
                }
                RemoteResponse::UsersLoaded {
                    epoch,
                    generation,
                    result: Self::log_result("list users", result),
                }
            }
            RemoteRequest::CreateUser { epoch, seq, user, .. } => {
                let result = self.api.create_user(&user).await;
                RemoteResponse::UserCreated {
                    epoch,
                    seq,
                    result: Self::log_result("create user", result),
                }
            }
            RemoteRequest::UpdateUser { epoch, seq, id, patch, .. } => {
                let result = self.api.update_user(&id, &patch).await;
                RemoteResponse::UserUpdated {
                    epoch,
                    seq,
                    id,
                    patch,
                    result: Self::log_result("update user", result),
                }
            }
            RemoteRequest::DeleteUser { epoch, seq, id, .. } => {
                let result = self.api.delete_user(&id).await;
                RemoteResponse::UserDeleted {
                    epoch,
                    seq,
                    id,
                    result: Self::log_result("delete user", result),
                }
            }
        }
    }
}
