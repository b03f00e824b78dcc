//! Request/response protocol between the controller and the remote access layer.
//!
//! Every request is stamped with the session epoch it was issued under and,
//! for mutations, the sequence number assigned by the mutation coordinator.
//! Responses echo both so the controller can discard anything stale. Requests
//! also carry the caller's tracing context so spans created while the request
//! runs on another task are linked back to the intent that caused it.

use crate::domain::{NewUser, OperationError, UserPatch, UserRecord};
use crate::session::{AuthToken, Credentials};

/// Distributed tracing context carried across the async boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceContext {
    /// OpenTelemetry trace ID as a hex string.
    pub trace_id: String,

    /// Span ID of the span that issued the request.
    pub parent_span_id: String,
}

impl TraceContext {
    /// Captures the OpenTelemetry ids of the current span.
    ///
    /// Returns `None` when no valid span context is active (for example when
    /// tracing was never initialized).
    pub fn from_current() -> Option<Self> {
        use opentelemetry::trace::TraceContextExt;
        use tracing_opentelemetry::OpenTelemetrySpanExt;

        let otel_context = tracing::Span::current().context();
        let span_ref = otel_context.span();
        let span_context = span_ref.span_context();

        if !span_context.is_valid() {
            return None;
        }

        Some(Self {
            trace_id: format!("{:032x}", span_context.trace_id()),
            parent_span_id: format!("{:016x}", span_context.span_id()),
        })
    }

    /// Rebuilds a remote parent context for spans on the executing task.
    #[must_use]
    pub fn to_otel_context(&self) -> Option<opentelemetry::Context> {
        use opentelemetry::trace::{SpanContext, SpanId, TraceContextExt, TraceFlags, TraceId, TraceState};

        let trace_id = TraceId::from_hex(&self.trace_id).ok()?;
        let span_id = SpanId::from_hex(&self.parent_span_id).ok()?;

        let span_context = SpanContext::new(trace_id, span_id, TraceFlags::SAMPLED, true, TraceState::default());
        Some(opentelemetry::Context::new().with_remote_span_context(span_context))
    }
}

/// Generates constructors that attach the current trace context.
macro_rules! remote_request_builders {
    (
        $(
            $builder_name:ident($variant:ident { $($field:ident: $ty:ty),* $(,)? })
        ),* $(,)?
    ) => {
        impl RemoteRequest {
            $(
                #[doc = concat!("Create a ", stringify!($variant), " request with current trace context")]
                #[must_use]
                pub fn $builder_name($($field: $ty),*) -> Self {
                    Self::$variant {
                        $($field,)*
                        trace_context: TraceContext::from_current(),
                    }
                }
            )*
        }
    };
}

remote_request_builders! {
    login(Login { epoch: u64, credentials: Credentials }),
    list_users(ListUsers { epoch: u64, generation: u64, search: Option<String> }),
    create_user(CreateUser { epoch: u64, seq: u64, user: NewUser }),
    update_user(UpdateUser { epoch: u64, seq: u64, id: String, patch: UserPatch }),
    delete_user(DeleteUser { epoch: u64, seq: u64, id: String }),
}

/// Requests issued by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteRequest {
    /// Exchange credentials for a bearer token.
    Login {
        epoch: u64,
        credentials: Credentials,
        trace_context: Option<TraceContext>,
    },

    /// Fetch the user collection. `generation` identifies this load so only
    /// the newest one is applied.
    ListUsers {
        epoch: u64,
        generation: u64,
        search: Option<String>,
        trace_context: Option<TraceContext>,
    },

    CreateUser {
        epoch: u64,
        seq: u64,
        user: NewUser,
        trace_context: Option<TraceContext>,
    },

    UpdateUser {
        epoch: u64,
        seq: u64,
        id: String,
        patch: UserPatch,
        trace_context: Option<TraceContext>,
    },

    DeleteUser {
        epoch: u64,
        seq: u64,
        id: String,
        trace_context: Option<TraceContext>,
    },
}

impl RemoteRequest {
    /// Short name used as a span field.
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        match self {
            Self::Login { .. } => "login",
            Self::ListUsers { .. } => "list_users",
            Self::CreateUser { .. } => "create_user",
            Self::UpdateUser { .. } => "update_user",
            Self::DeleteUser { .. } => "delete_user",
        }
    }

    #[must_use]
    pub const fn epoch(&self) -> u64 {
        match self {
            Self::Login { epoch, .. }
            | Self::ListUsers { epoch, .. }
            | Self::CreateUser { epoch, .. }
            | Self::UpdateUser { epoch, .. }
            | Self::DeleteUser { epoch, .. } => *epoch,
        }
    }

    #[must_use]
    pub const fn trace_context(&self) -> Option<&TraceContext> {
        match self {
            Self::Login { trace_context, .. }
            | Self::ListUsers { trace_context, .. }
            | Self::CreateUser { trace_context, .. }
            | Self::UpdateUser { trace_context, .. }
            | Self::DeleteUser { trace_context, .. } => trace_context.as_ref(),
        }
    }
}

/// Completed requests, fed back to the controller as events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteResponse {
    LoggedIn {
        epoch: u64,
        result: Result<AuthToken, OperationError>,
    },

    UsersLoaded {
        epoch: u64,
        generation: u64,
        result: Result<Vec<UserRecord>, OperationError>,
    },

    UserCreated {
        epoch: u64,
        seq: u64,
        result: Result<UserRecord, OperationError>,
    },

    /// `result` holds the server's copy of the record when it returned one,
    /// or `None` for a bare acknowledgement.
    UserUpdated {
        epoch: u64,
        seq: u64,
        id: String,
        patch: UserPatch,
        result: Result<Option<UserRecord>, OperationError>,
    },

    UserDeleted {
        epoch: u64,
        seq: u64,
        id: String,
        result: Result<(), OperationError>,
    },
}

impl RemoteResponse {
    #[must_use]
    pub const fn epoch(&self) -> u64 {
        match self {
            Self::LoggedIn { epoch, .. }
            | Self::UsersLoaded { epoch, .. }
            | Self::UserCreated { epoch, .. }
            | Self::UserUpdated { epoch, .. }
            | Self::UserDeleted { epoch, .. } => *epoch,
        }
    }
}
