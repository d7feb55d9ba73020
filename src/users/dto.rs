use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::users::repo_types::User;

/// Request body for registration. Fields are optional at the serde layer so
/// a missing one yields a 400 with a clear message instead of a parse error.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub description: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Partial profile update: only supplied fields overwrite existing ones.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub description: Option<String>,
    pub avatar: Option<String>,
}

/// The sanitized projection: everything safe to hand to a client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub description: String,
    pub avatar: String,
    #[serde(rename = "isAdmin")]
    pub is_admin: bool,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            description: user.description.clone(),
            avatar: user.avatar.clone(),
            is_admin: user.is_admin,
        }
    }
}

/// Success envelope carrying a single user.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub status: u16,
    pub success: bool,
    pub message: String,
    pub user: PublicUser,
}

/// Success envelope for the admin listing.
#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub status: u16,
    pub success: bool,
    pub users: Vec<PublicUser>,
}

/// Success envelope with no user payload (logout).
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub status: u16,
    pub success: bool,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn make_user() -> User {
        let now = OffsetDateTime::now_utc();
        User {
            id: Uuid::new_v4(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password_hash: "$argon2id$secret".into(),
            description: "First programmer".into(),
            avatar: "https://example.com/ada.png".into(),
            is_admin: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn public_user_excludes_password_hash() {
        let public = PublicUser::from(&make_user());
        let json = serde_json::to_string(&public).expect("serialize");
        assert!(!json.contains("password"));
        assert!(!json.contains("argon2"));
        assert!(json.contains("\"isAdmin\":true"));
        assert!(json.contains("ada@example.com"));
    }

    #[test]
    fn update_request_tolerates_partial_bodies() {
        let req: UpdateProfileRequest =
            serde_json::from_str(r#"{"name":"Grace"}"#).expect("parse");
        assert_eq!(req.name.as_deref(), Some("Grace"));
        assert!(req.email.is_none());
        assert!(req.password.is_none());
        assert!(req.description.is_none());
        assert!(req.avatar.is_none());
    }
}
