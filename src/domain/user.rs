//! User account domain model.
//!
//! This module defines [`UserRecord`], the server-owned representation of one
//! user account, together with the payload types used to create ([`NewUser`])
//! and partially update ([`UserPatch`]) records. Field validation mirrors the
//! rules the backend enforces so obviously invalid input never leaves the
//! client.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Earliest accepted date of birth.
const MIN_DATE_OF_BIRTH: (i32, u32, u32) = (1900, 1, 1);

pub const FIRST_NAME_REQUIRED: &str = "First name is required";
pub const INVALID_EMAIL: &str = "Invalid email address";
pub const INVALID_DATE_FORMAT: &str = "Date must be in YYYY-MM-DD format";
pub const DATE_OUT_OF_RANGE: &str = "Date of birth must be between January 1, 1900, and today.";

/// Account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserStatus {
    Active,
    Locked,
}

impl UserStatus {
    /// Label shown next to a record.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Locked => "Locked",
        }
    }

    /// Parses either the wire form (`ACTIVE`) or the label (`active`).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "ACTIVE" => Some(Self::Active),
            "LOCKED" => Some(Self::Locked),
            _ => None,
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single validation failure on one field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: &str) -> Self {
        Self { field, message: message.to_string() }
    }
}

/// One user account as stored by the server.
///
/// `id` is opaque and assigned by the server. A record with a given `id`
/// denotes one logical user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub email: String,
    pub status: UserStatus,
    pub date_of_birth: NaiveDate,
}

impl UserRecord {
    /// `firstName` and `lastName` joined by a space, trimmed.
    ///
    /// # Example
    ///
    /// ```
    /// # use usergrid::domain::{UserRecord, UserStatus};
    /// # use chrono::NaiveDate;
    /// let user = UserRecord {
    ///     id: "1".into(),
    ///     first_name: "John".into(),
    ///     last_name: None,
    ///     email: "john@example.com".into(),
    ///     status: UserStatus::Active,
    ///     date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
    /// };
    /// assert_eq!(user.display_name(), "John");
    /// ```
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name.as_deref().unwrap_or(""))
            .trim()
            .to_string()
    }

    /// Uppercased first letters of each display-name word.
    #[must_use]
    pub fn initials(&self) -> String {
        self.display_name()
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .flat_map(char::to_uppercase)
            .collect()
    }

    /// Checks the record invariants against today's date.
    ///
    /// # Errors
    ///
    /// Returns every failing field.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        self.validate_on(today())
    }

    /// Like [`validate`](Self::validate) with an explicit reference date.
    ///
    /// # Errors
    ///
    /// Returns every failing field.
    pub fn validate_on(&self, today: NaiveDate) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        if self.id.trim().is_empty() {
            errors.push(FieldError::new("id", "Id is required"));
        }
        check_first_name(&self.first_name, &mut errors);
        check_email(&self.email, &mut errors);
        check_date_of_birth(self.date_of_birth, today, &mut errors);
        into_result(errors)
    }

    /// Merges the fields present in `patch`, leaving the rest untouched.
    ///
    /// An empty `last_name` in the patch clears the last name.
    pub fn merge(&mut self, patch: &UserPatch) {
        if let Some(first_name) = &patch.first_name {
            self.first_name.clone_from(first_name);
        }
        if let Some(last_name) = &patch.last_name {
            self.last_name = if last_name.trim().is_empty() { None } else { Some(last_name.clone()) };
        }
        if let Some(email) = &patch.email {
            self.email.clone_from(email);
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(date_of_birth) = patch.date_of_birth {
            self.date_of_birth = date_of_birth;
        }
    }
}

/// Fields for a record that does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub email: String,
    pub status: UserStatus,
    pub date_of_birth: NaiveDate,
}

impl NewUser {
    /// # Errors
    ///
    /// Returns every failing field.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        self.validate_on(today())
    }

    /// # Errors
    ///
    /// Returns every failing field.
    pub fn validate_on(&self, today: NaiveDate) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        check_first_name(&self.first_name, &mut errors);
        check_email(&self.email, &mut errors);
        check_date_of_birth(self.date_of_birth, today, &mut errors);
        into_result(errors)
    }
}

/// A partial field set for an update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<UserStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
}

impl UserPatch {
    /// A patch carrying every field of `record` except its id.
    #[must_use]
    pub fn from_record(record: &UserRecord) -> Self {
        Self {
            first_name: Some(record.first_name.clone()),
            last_name: Some(record.last_name.clone().unwrap_or_default()),
            email: Some(record.email.clone()),
            status: Some(record.status),
            date_of_birth: Some(record.date_of_birth),
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.status.is_none()
            && self.date_of_birth.is_none()
    }

    /// Validates only the fields that are present.
    ///
    /// # Errors
    ///
    /// Returns every failing field.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        self.validate_on(today())
    }

    /// # Errors
    ///
    /// Returns every failing field.
    pub fn validate_on(&self, today: NaiveDate) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        if let Some(first_name) = &self.first_name {
            check_first_name(first_name, &mut errors);
        }
        if let Some(email) = &self.email {
            check_email(email, &mut errors);
        }
        if let Some(date_of_birth) = self.date_of_birth {
            check_date_of_birth(date_of_birth, today, &mut errors);
        }
        into_result(errors)
    }
}

/// Parses a strict `YYYY-MM-DD` date.
///
/// # Errors
///
/// Returns a [`FieldError`] if the text is not exactly four digits, a dash,
/// two digits, a dash, two digits, or does not name a real calendar day.
///
/// # Example
///
/// ```
/// use usergrid::domain::user::parse_date_of_birth;
///
/// assert!(parse_date_of_birth("1990-04-12").is_ok());
/// assert!(parse_date_of_birth("1990-4-12").is_err());
/// ```
pub fn parse_date_of_birth(text: &str) -> Result<NaiveDate, FieldError> {
    let bytes = text.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });

    if !well_formed {
        return Err(FieldError::new("dateOfBirth", INVALID_DATE_FORMAT));
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map_err(|_| FieldError::new("dateOfBirth", INVALID_DATE_FORMAT))
}

/// Joins field errors into one line for the status channel.
#[must_use]
pub fn describe(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn check_first_name(first_name: &str, errors: &mut Vec<FieldError>) {
    if first_name.trim().is_empty() {
        errors.push(FieldError::new("firstName", FIRST_NAME_REQUIRED));
    }
}

fn check_email(email: &str, errors: &mut Vec<FieldError>) {
    let valid = email.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty()
            && !domain.contains('@')
            && !email.contains(char::is_whitespace)
            && domain.split('.').count() >= 2
            && domain.split('.').all(|part| !part.is_empty())
    });

    if !valid {
        errors.push(FieldError::new("email", INVALID_EMAIL));
    }
}

fn check_date_of_birth(date_of_birth: NaiveDate, today: NaiveDate, errors: &mut Vec<FieldError>) {
    let (year, month, day) = MIN_DATE_OF_BIRTH;
    let in_range = NaiveDate::from_ymd_opt(year, month, day)
        .is_some_and(|min| date_of_birth >= min && date_of_birth <= today);

    if !in_range {
        errors.push(FieldError::new("dateOfBirth", DATE_OUT_OF_RANGE));
    }
}

fn into_result(errors: Vec<FieldError>) -> Result<(), Vec<FieldError>> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
