//! Externally visible DTO shapes
//!
//! Optional sub-objects serialize only when present; a sub-object whose
//! fields are all absent is collapsed to "absent" before serialization
//! (see the adapter), never emitted as an object of nulls.

use serde::{Deserialize, Serialize};

/// Composite user entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<UserName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<UserContact>,
}

/// Name sub-object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserName {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl UserName {
    /// True when no field carries a value
    pub fn is_empty(&self) -> bool {
        self.first.is_none()
            && self.middle.is_none()
            && self.last.is_none()
            && self.display.is_none()
    }
}

/// Contact sub-object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserContact {
    pub emails: Vec<EmailAddress>,
}

/// One email entry of the contact sub-object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmailAddress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
}

impl EmailAddress {
    /// True when no field carries a value
    pub fn is_empty(&self) -> bool {
        self.address.is_none() && self.description.is_none() && self.verified.is_none()
    }
}

/// Response body for user creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserCreateResponse {
    pub id: String,
}

/// Response body for the paginated list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserListResponse {
    #[serde(rename = "totalCount")]
    pub total_count: i64,
    pub count: i64,
    pub users: Vec<User>,
}

/// Partial update payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserUpdateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<UserName>,
}
