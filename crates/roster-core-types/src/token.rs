//! Public record tokens
//!
//! A `UserToken` is the identifier a caller sees for a user record. It is
//! assigned once by storage at creation time and never reused. The internal
//! surrogate key used for ordering and joins never leaves the service.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Externally visible identifier for a user record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserToken(Uuid);

impl UserToken {
    /// Wrap a storage-assigned token value
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Get the underlying 128-bit value
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// The all-zero token, used as the "no cursor" sentinel in list queries
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    /// Check whether this is the all-zero token
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl FromStr for UserToken {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl From<Uuid> for UserToken {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for UserToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trip() {
        let token = UserToken::from_uuid(Uuid::new_v4());
        let parsed: UserToken = token.to_string().parse().unwrap();
        assert_eq!(parsed, token);
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        assert!("not-a-token".parse::<UserToken>().is_err());
        assert!("".parse::<UserToken>().is_err());
        assert!("123e4567-e89b-12d3-a456".parse::<UserToken>().is_err());
    }

    #[test]
    fn test_nil_sentinel() {
        assert!(UserToken::nil().is_nil());
        assert!(!UserToken::from_uuid(Uuid::new_v4()).is_nil());
    }

    #[test]
    fn test_serialization_is_transparent() {
        let token = UserToken::from_uuid(Uuid::new_v4());
        let json = serde_json::to_string(&token).unwrap();
        assert_eq!(json, format!("\"{}\"", token));
        let back: UserToken = serde_json::from_str(&json).unwrap();
        assert_eq!(back, token);
    }
}
