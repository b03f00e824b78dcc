//! The canonical response envelope and payload decoding.
//!
//! Every backend response body must have this shape:
//!
//! ```json
//! { "status": 200, "message": "success", "data": { ... } }
//! ```
//!
//! `status` mirrors an HTTP status code and is the success indicator: any
//! value outside `200..=299` is a failure even when the transport status was
//! 2xx. `data` holds the payload for each endpoint:
//!
//! | Endpoint              | `data`                                         |
//! |-----------------------|------------------------------------------------|
//! | `POST /api/login`     | `{ "accessToken": "...", "expiresIn": <unix> }`|
//! | `GET /api/users`      | `{ "users": [UserRecord, ...] }`               |
//! | `POST /api/users`     | `{ "user": UserRecord }`                       |
//! | `PUT /api/users/:id`  | `{ "user": UserRecord }` or acknowledgement    |
//! | `DELETE /api/users/:id` | acknowledgement                              |
//!
//! An acknowledgement is `{ "success": true|false, "message": "..." }`; a
//! negative acknowledgement means the target record no longer exists.
//! Bodies of any other shape are rejected as validation failures and never
//! reach the controller.

use crate::domain::user::describe;
use crate::domain::{OperationError, UserRecord};
use crate::session::AuthToken;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashSet;

/// Top-level wrapper around every payload.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub status: u16,
    #[serde(default)]
    pub message: Option<String>,
    pub data: T,
}

impl<T> Envelope<T> {
    /// Converts an in-body failure status into an error.
    ///
    /// # Errors
    ///
    /// Returns the classified failure when `status` is not 2xx.
    pub fn into_data(self) -> Result<T, OperationError> {
        if (200..300).contains(&self.status) {
            Ok(self.data)
        } else {
            Err(OperationError::from_status(self.status, self.message))
        }
    }
}

#[derive(Debug, Deserialize)]
struct UsersPayload {
    users: Vec<UserRecord>,
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    user: UserRecord,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UpdatePayload {
    Record { user: UserRecord },
    Ack(Acknowledgement),
}

#[derive(Debug, Deserialize)]
struct Acknowledgement {
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

impl Acknowledgement {
    fn into_result(self) -> Result<(), OperationError> {
        if self.success {
            Ok(())
        } else {
            Err(OperationError::not_found(self.message))
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginPayload {
    access_token: String,
    expires_in: i64,
}

/// Decodes `body` as an envelope around `T` and unwraps its data.
///
/// # Errors
///
/// Returns a validation failure for malformed bodies, or the classified
/// failure for an in-body error status.
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, OperationError> {
    let envelope: Envelope<serde_json::Value> =
        serde_json::from_slice(body).map_err(|e| OperationError::malformed(&e.to_string()))?;

    let data = envelope.into_data()?;
    serde_json::from_value(data).map_err(|e| OperationError::malformed(&e.to_string()))
}

/// Decodes the list endpoint's payload.
///
/// Well-formed records that violate domain invariants (e.g. an email without
/// a dotted domain) are logged and left out so one bad row cannot hide the
/// rest of the collection.
///
/// # Errors
///
/// Fails on malformed bodies or duplicate ids.
pub fn users(body: &[u8]) -> Result<Vec<UserRecord>, OperationError> {
    let payload: UsersPayload = decode(body)?;

    let mut seen = HashSet::with_capacity(payload.users.len());
    for user in &payload.users {
        if !seen.insert(user.id.as_str()) {
            return Err(OperationError::malformed(&format!("duplicate user id {}", user.id)));
        }
    }

    Ok(payload
        .users
        .into_iter()
        .filter(|user| match user.validate() {
            Ok(()) => true,
            Err(errors) => {
                tracing::warn!(user_id = %user.id, errors = %describe(&errors), "skipping invalid user record");
                false
            }
        })
        .collect())
}

/// Decodes the create endpoint's payload.
///
/// # Errors
///
/// Fails on malformed bodies or an invalid record.
pub fn created_user(body: &[u8]) -> Result<UserRecord, OperationError> {
    let payload: UserPayload = decode(body)?;
    check_record(&payload.user)?;
    Ok(payload.user)
}

/// Decodes the update endpoint's payload: the server copy, or `None` for a
/// positive acknowledgement.
///
/// # Errors
///
/// Fails on malformed bodies, an invalid record, or a negative acknowledgement.
pub fn updated_user(body: &[u8]) -> Result<Option<UserRecord>, OperationError> {
    match decode::<UpdatePayload>(body)? {
        UpdatePayload::Record { user } => {
            check_record(&user)?;
            Ok(Some(user))
        }
        UpdatePayload::Ack(ack) => ack.into_result().map(|()| None),
    }
}

/// Decodes an acknowledgement.
///
/// # Errors
///
/// Fails on malformed bodies or a negative acknowledgement.
pub fn acknowledgement(body: &[u8]) -> Result<(), OperationError> {
    decode::<Acknowledgement>(body)?.into_result()
}

/// Decodes the login payload. `expiresIn` is an absolute unix timestamp.
///
/// # Errors
///
/// Fails on malformed bodies, an empty token, or an unrepresentable expiry.
pub fn login_token(body: &[u8]) -> Result<AuthToken, OperationError> {
    let payload: LoginPayload = decode(body)?;

    if payload.access_token.trim().is_empty() {
        return Err(OperationError::malformed("empty access token"));
    }

    let expires_at: DateTime<Utc> = DateTime::from_timestamp(payload.expires_in, 0)
        .ok_or_else(|| OperationError::malformed("expiresIn out of range"))?;

    Ok(AuthToken { access_token: payload.access_token, expires_at })
}

/// Best-effort extraction of a human-readable message from an error body.
///
/// Accepts the canonical envelope or a bare `{ "message": "..." }` object.
#[must_use]
pub fn error_message(body: &[u8]) -> Option<String> {
    #[derive(Deserialize)]
    struct MessageOnly {
        message: Option<String>,
    }

    serde_json::from_slice::<MessageOnly>(body)
        .ok()
        .and_then(|m| m.message)
        .filter(|m| !m.trim().is_empty())
}

fn check_record(user: &UserRecord) -> Result<(), OperationError> {
    user.validate()
        .map_err(|errors| OperationError::malformed(&format!("user {}: {}", user.id, describe(&errors))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::MALFORMED_RESPONSE_MESSAGE;
    use crate::domain::FailureKind;
    use serde_json::json;

    fn body(value: &serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(value).unwrap()
    }

    fn john() -> serde_json::Value {
        json!({
            "id": "1",
            "firstName": "John",
            "lastName": "Doe",
            "email": "john@example.com",
            "status": "ACTIVE",
            "dateOfBirth": "1980-02-01"
        })
    }

    #[test]
    fn users_from_canonical_envelope() {
        let raw = body(&json!({ "status": 200, "message": "success", "data": { "users": [john()] } }));
        let users = users(&raw).unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].id, "1");
    }

    #[test]
    fn legacy_result_wrapper_is_rejected() {
        let raw = body(&json!({ "result": { "status": 200, "data": { "users": [john()] } } }));
        let err = users(&raw).unwrap_err();
        assert_eq!(err.kind, FailureKind::Validation);
        assert_eq!(err.message, MALFORMED_RESPONSE_MESSAGE);
    }

    #[test]
    fn invalid_record_is_skipped_in_list() {
        let mut bad = john();
        bad["id"] = json!("2");
        bad["email"] = json!("x@localhost");
        let raw = body(&json!({ "status": 200, "data": { "users": [bad, john()] } }));
        let users = users(&raw).unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].id, "1");
    }

    #[test]
    fn invalid_single_record_is_rejected() {
        let mut bad = john();
        bad["firstName"] = json!("");
        let raw = body(&json!({ "status": 200, "data": { "user": bad } }));
        assert_eq!(created_user(&raw).unwrap_err().kind, FailureKind::Validation);
    }

    #[test]
    fn malformed_record_fails_list() {
        let mut bad = john();
        bad["status"] = json!("DELETED");
        let raw = body(&json!({ "status": 200, "data": { "users": [bad] } }));
        assert_eq!(users(&raw).unwrap_err().kind, FailureKind::Validation);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let raw = body(&json!({ "status": 200, "data": { "users": [john(), john()] } }));
        assert_eq!(users(&raw).unwrap_err().status_code, 422);
    }

    #[test]
    fn in_body_status_is_honored() {
        let raw = body(&json!({ "status": 401, "message": "Invalid Credentials!", "data": {} }));
        let err = login_token(&raw).unwrap_err();
        assert_eq!(err.kind, FailureKind::Authorization);
        assert_eq!(err.status_code, 401);
    }

    #[test]
    fn update_accepts_record_or_ack() {
        let raw = body(&json!({ "status": 200, "data": { "user": john() } }));
        assert!(updated_user(&raw).unwrap().is_some());

        let raw = body(&json!({ "status": 200, "data": { "success": true, "message": "User updated successfully" } }));
        assert_eq!(updated_user(&raw).unwrap(), None);

        let raw = body(&json!({ "status": 200, "data": { "success": false, "message": "User not found" } }));
        let err = updated_user(&raw).unwrap_err();
        assert_eq!(err.kind, FailureKind::NotFound);
        assert_eq!(err.message, "User not found");
        assert_eq!(err.status_code, 404);
    }

    #[test]
    fn acknowledgement_requires_success_flag() {
        let raw = body(&json!({ "status": 200, "data": { "success": true } }));
        assert!(acknowledgement(&raw).is_ok());

        let raw = body(&json!({ "status": 200, "data": { "deleted": 1 } }));
        assert_eq!(acknowledgement(&raw).unwrap_err().kind, FailureKind::Validation);
    }

    #[test]
    fn login_payload() {
        let raw = body(&json!({
            "status": 200,
            "message": "success",
            "data": { "accessToken": "tok", "expiresIn": 1_900_000_000 }
        }));
        let token = login_token(&raw).unwrap();
        assert_eq!(token.access_token, "tok");
        assert_eq!(token.expires_at.timestamp(), 1_900_000_000);
    }

    #[test]
    fn error_message_extraction() {
        assert_eq!(
            error_message(br#"{"status":500,"message":"Database unavailable","data":null}"#),
            Some("Database unavailable".into())
        );
        assert_eq!(error_message(b"<html>Bad gateway</html>"), None);
        assert_eq!(error_message(br#"{"message":""}"#), None);
    }
}
