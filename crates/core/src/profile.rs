//! Canonical user identity.

use serde::{Deserialize, Serialize};

use crate::types::{Email, UserId};

/// The authenticated user's identity.
///
/// Owned by the auth store; every other component only reads it. The
/// canonical copy comes from the backend (`GET /auth/me`); a degraded copy
/// can be derived from a session-provider projection via
/// [`with_derived_username`](Self::with_derived_username).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Backend user id.
    pub id: UserId,
    /// Email address.
    pub email: Email,
    /// Login name.
    pub username: String,
    /// Display name, if the user set one.
    pub name: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
    /// Default delivery address as free text.
    pub address: Option<String>,
}

impl UserProfile {
    /// Build a minimal identity with the username derived from the email
    /// local part.
    ///
    /// Used when no canonical profile is available: an email without an `@`
    /// yields the whole string, a missing email an empty username, so the
    /// derivation never fails.
    #[must_use]
    pub fn with_derived_username(id: UserId, email: Email, name: Option<String>) -> Self {
        let username = email.local_part().to_owned();
        Self {
            id,
            email,
            username,
            name,
            phone: None,
            address: None,
        }
    }

    /// The name to show in a greeting: the display name when set, the
    /// username otherwise.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.username)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_username_is_email_local_part() {
        let profile = UserProfile::with_derived_username(
            UserId::new(7),
            Email::parse("a@b.com").unwrap(),
            None,
        );

        assert_eq!(profile.id, UserId::new(7));
        assert_eq!(profile.email.as_str(), "a@b.com");
        assert_eq!(profile.username, "a");
        assert_eq!(profile.name, None);
    }

    #[test]
    fn test_derived_username_degrades_without_at() {
        let profile = UserProfile::with_derived_username(
            UserId::new(1),
            Email::from_trusted("not-an-email".to_string()),
            None,
        );
        assert_eq!(profile.username, "not-an-email");
    }

    #[test]
    fn test_display_name_prefers_name() {
        let mut profile = UserProfile::with_derived_username(
            UserId::new(1),
            Email::parse("kasim@tiffin.pk").unwrap(),
            Some("Kasim".to_string()),
        );
        assert_eq!(profile.display_name(), "Kasim");

        profile.name = None;
        assert_eq!(profile.display_name(), "kasim");
    }

    #[test]
    fn test_deserializes_backend_profile() {
        let json = r#"{
            "id": 42,
            "email": "rider@tiffin.pk",
            "username": "rider",
            "name": "Rider One",
            "phone": "+92-300-0000000",
            "address": "House 5, F-7/2, Islamabad"
        }"#;

        let profile: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.id, UserId::new(42));
        assert_eq!(profile.email.domain(), "tiffin.pk");
        assert_eq!(profile.phone.as_deref(), Some("+92-300-0000000"));
    }

    #[test]
    fn test_deserializes_minimal_profile() {
        let json = r#"{"id": 1, "email": "a@b.com", "username": "a"}"#;
        let profile: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.name, None);
        assert_eq!(profile.address, None);
    }
}
