//! Cookie-based session plumbing: building/clearing the session cookie and
//! the two request gates (`SessionUser` for any authenticated caller,
//! `AdminUser` for admin-only routes).

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use tracing::warn;

use crate::auth::token::{SessionKeys, SessionClaims, SESSION_TTL};
use crate::error::ApiError;
use crate::state::AppState;

/// Set-Cookie value for a freshly issued session token. Http-only and
/// SameSite=Strict always; Secure outside development.
pub fn session_cookie(name: &str, token: &str, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}",
        name,
        token,
        SESSION_TTL.whole_seconds()
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Set-Cookie value that overwrites the session with an already-expired
/// empty value. Safe to send whether or not a session existed.
pub fn clear_session_cookie(name: &str) -> String {
    format!("{}=; HttpOnly; SameSite=Strict; Path=/; Max-Age=0", name)
}

/// Pull the named cookie's value out of a `Cookie` request header line.
pub fn token_from_cookies(cookie_header: &str, name: &str) -> Option<String> {
    cookie_header.split(';').find_map(|pair| {
        let mut parts = pair.trim().splitn(2, '=');
        if parts.next()? == name {
            Some(parts.next()?.to_string())
        } else {
            None
        }
    })
}

fn extract_and_verify(parts: &Parts, state: &AppState) -> Result<SessionClaims, ApiError> {
    let cookie_header = parts
        .headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok());

    // No cookie at all: reject without attempting verification.
    let token = cookie_header
        .and_then(|h| token_from_cookies(h, &state.config.token_name))
        .ok_or_else(|| {
            ApiError::Unauthorized("Not authorized, token not available".into())
        })?;

    let keys = SessionKeys::from_ref(state);
    keys.verify(&token).map_err(|_| {
        warn!("invalid or expired session token");
        ApiError::Unauthorized("Not authorized".into())
    })
}

/// Gate for authenticated routes: any valid, non-expired session passes.
pub struct SessionUser(pub SessionClaims);

#[async_trait]
impl FromRequestParts<AppState> for SessionUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(SessionUser(extract_and_verify(parts, state)?))
    }
}

/// Gate for admin routes: a valid session whose claims carry `isAdmin`.
pub struct AdminUser(pub SessionClaims);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = extract_and_verify(parts, state)?;
        if !claims.is_admin {
            warn!(user_id = %claims.sub, "admin route rejected non-admin session");
            return Err(ApiError::Unauthorized("Not authorized as admin".into()));
        }
        Ok(AdminUser(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::repo_types::User;
    use axum::http::Request;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn make_user(is_admin: bool) -> User {
        let now = OffsetDateTime::now_utc();
        User {
            id: Uuid::new_v4(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password_hash: "$argon2id$fake".into(),
            description: "First programmer".into(),
            avatar: "https://example.com/ada.png".into(),
            is_admin,
            created_at: now,
            updated_at: now,
        }
    }

    fn parts_with_cookie(cookie: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/users/profile");
        if let Some(c) = cookie {
            builder = builder.header(header::COOKIE, c);
        }
        builder.body(()).expect("request").into_parts().0
    }

    #[test]
    fn session_cookie_attributes() {
        let cookie = session_cookie("jwt", "tok123", false);
        assert!(cookie.starts_with("jwt=tok123;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Strict"));
        assert!(cookie.contains("Max-Age=604800"));
        assert!(!cookie.contains("Secure"));
    }

    #[test]
    fn session_cookie_secure_outside_development() {
        assert!(session_cookie("jwt", "tok123", true).contains("; Secure"));
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let cookie = clear_session_cookie("jwt");
        assert!(cookie.starts_with("jwt=;"));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[test]
    fn token_extracted_among_other_cookies() {
        let header = "theme=dark; jwt=abc.def.ghi; lang=en";
        assert_eq!(
            token_from_cookies(header, "jwt"),
            Some("abc.def.ghi".to_string())
        );
        assert_eq!(token_from_cookies(header, "session"), None);
    }

    #[tokio::test]
    async fn protect_rejects_missing_cookie() {
        let state = AppState::fake();
        let mut parts = parts_with_cookie(None);
        let err = SessionUser::from_request_parts(&mut parts, &state)
            .await
            .err()
            .expect("must reject");
        assert_eq!(err.to_string(), "Not authorized, token not available");
    }

    #[tokio::test]
    async fn protect_rejects_garbage_token() {
        let state = AppState::fake();
        let mut parts = parts_with_cookie(Some("jwt=not-a-token"));
        let err = SessionUser::from_request_parts(&mut parts, &state)
            .await
            .err()
            .expect("must reject");
        assert_eq!(err.to_string(), "Not authorized");
    }

    #[tokio::test]
    async fn protect_accepts_valid_session() {
        let state = AppState::fake();
        let user = make_user(false);
        let token = SessionKeys::from_ref(&state).issue(&user).expect("issue");
        let cookie = format!("jwt={}", token);
        let mut parts = parts_with_cookie(Some(&cookie));
        let SessionUser(claims) = SessionUser::from_request_parts(&mut parts, &state)
            .await
            .expect("must pass");
        assert_eq!(claims.sub, user.id);
    }

    #[tokio::test]
    async fn admin_gate_rejects_non_admin_session() {
        let state = AppState::fake();
        let token = SessionKeys::from_ref(&state)
            .issue(&make_user(false))
            .expect("issue");
        let cookie = format!("jwt={}", token);
        let mut parts = parts_with_cookie(Some(&cookie));
        let err = AdminUser::from_request_parts(&mut parts, &state)
            .await
            .err()
            .expect("must reject");
        assert_eq!(err.to_string(), "Not authorized as admin");
    }

    #[tokio::test]
    async fn admin_gate_accepts_admin_session() {
        let state = AppState::fake();
        let user = make_user(true);
        let token = SessionKeys::from_ref(&state).issue(&user).expect("issue");
        let cookie = format!("jwt={}", token);
        let mut parts = parts_with_cookie(Some(&cookie));
        let AdminUser(claims) = AdminUser::from_request_parts(&mut parts, &state)
            .await
            .expect("must pass");
        assert!(claims.is_admin);
    }
}
