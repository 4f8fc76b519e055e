use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::result::timestamp_or_millis;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(alias = "createdAt", deserialize_with = "timestamp_or_millis")]
    pub created_at: DateTime<Utc>,
}

/// Who is signed in on this machine. Stored alongside the game records.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthState {
    pub user: Option<User>,
    #[serde(alias = "isAuthenticated")]
    pub is_authenticated: bool,
}

impl AuthState {
    /// Local sign-in; there is no account server, so any address is accepted.
    pub fn sign_in(name: &str, email: &str) -> Self {
        let name = if name.trim().is_empty() {
            email.split('@').next().unwrap_or(email).to_string()
        } else {
            name.trim().to_string()
        };
        Self {
            user: Some(User {
                id: email.trim().to_lowercase(),
                name,
                email: email.trim().to_string(),
                created_at: Utc::now(),
            }),
            is_authenticated: true,
        }
    }

    pub fn display_name(&self) -> Option<&str> {
        self.user
            .as_ref()
            .filter(|_| self.is_authenticated)
            .map(|u| u.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_signed_out() {
        let auth = AuthState::default();
        assert!(!auth.is_authenticated);
        assert!(auth.display_name().is_none());
    }

    #[test]
    fn test_sign_in_derives_name_from_email() {
        let auth = AuthState::sign_in("", "Li.Bai@example.com");
        assert!(auth.is_authenticated);
        assert_eq!(auth.display_name(), Some("Li.Bai"));
        assert_eq!(auth.user.as_ref().unwrap().id, "li.bai@example.com");
    }

    #[test]
    fn test_partial_blob_loads_with_defaults() {
        let auth: AuthState = serde_json::from_str(r#"{"isAuthenticated":false}"#).unwrap();
        assert_eq!(auth, AuthState::default());
    }

    #[test]
    fn test_browser_era_blob_keeps_sign_in() {
        let json = r#"{"user":{"id":"libai@example.com","name":"李白","email":"libai@example.com","createdAt":1700000000000},"isAuthenticated":true}"#;
        let auth: AuthState = serde_json::from_str(json).unwrap();
        assert_eq!(auth.display_name(), Some("李白"));
        let user = auth.user.unwrap();
        assert_eq!(user.created_at.timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn test_signed_in_blob_round_trips() {
        let auth = AuthState::sign_in("杜甫", "dufu@example.com");
        let json = serde_json::to_string(&auth).unwrap();
        let back: AuthState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, auth);
    }
}
