use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

pub mod logging;
mod report;

pub use report::{FailedRecipient, ReportSummary, SendReport, SendResponse};

// ============================================================================
// Contact Directory
// ============================================================================

/// A stored recipient record.
///
/// The remote service keys contacts by `_id`; a plain `id` is accepted too.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Contact {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

/// Payload for creating a contact
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewContact {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

/// Partial update for an existing contact. Unset fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContactUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

impl ContactUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.company.is_none()
    }
}

// ============================================================================
// Template
// ============================================================================

/// The single reusable message body.
///
/// Placeholders such as `[Name]` and `[Company Name]` are resolved by the
/// remote service, never here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Template {
    pub body: String,
}

impl Template {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }
}

// ============================================================================
// Authentication
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response. `accessToken` is optional on the wire so a malformed
/// response can be reported instead of failing deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(default)]
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

// ============================================================================
// Dispatch
// ============================================================================

/// Reasons a dispatch (or template save) is refused before touching the network.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Select at least one contact")]
    EmptySelection,

    #[error("Please enter a subject")]
    BlankSubject,

    #[error("Please enter a message")]
    BlankMessage,
}

/// Body of `POST /send-email`.
///
/// Only obtainable through [`SendRequest::new`], so an instance always carries
/// at least one contact id, a non-blank subject and a non-blank message.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SendRequest {
    contact_ids: Vec<String>,
    subject: String,
    message_template: String,
}

impl SendRequest {
    /// Checks selection, subject and message in that order.
    pub fn new(
        contact_ids: BTreeSet<String>,
        subject: impl Into<String>,
        message_template: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let subject = subject.into();
        let message_template = message_template.into();

        if contact_ids.is_empty() {
            return Err(ValidationError::EmptySelection);
        }
        if subject.trim().is_empty() {
            return Err(ValidationError::BlankSubject);
        }
        if message_template.trim().is_empty() {
            return Err(ValidationError::BlankMessage);
        }

        Ok(Self {
            contact_ids: contact_ids.into_iter().collect(),
            subject,
            message_template,
        })
    }

    pub fn contact_ids(&self) -> &[String] {
        &self.contact_ids
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn message_template(&self) -> &str {
        &self.message_template
    }
}
