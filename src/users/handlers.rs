use axum::{
    extract::{FromRef, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        password::{hash_password_blocking, verify_password_blocking},
        session::{clear_session_cookie, session_cookie, AdminUser, SessionUser},
        token::SessionKeys,
    },
    error::ApiError,
    state::AppState,
    users::{
        dto::{
            LoginRequest, MessageResponse, PublicUser, RegisterRequest, UpdateProfileRequest,
            UserListResponse, UserResponse,
        },
        repo_types::User,
        validate,
    },
};

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/api/users",
        Router::new()
            .route("/register", post(register))
            .route("/login", post(login))
            .route("/logout", post(logout))
            .route("/profile", get(get_profile).put(update_profile))
            .route("/admin/profile", get(admin_profile))
            .route("/", get(list_users))
            .route("/:id", delete(delete_user)),
    )
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(name), Some(email), Some(password), Some(description), Some(avatar)) = (
        payload.name,
        payload.email,
        payload.password,
        payload.description,
        payload.avatar,
    ) else {
        return Err(ApiError::Validation("All fields are required".into()));
    };

    let email = validate::normalize_email(&email);
    validate::validate_name(&name)?;
    validate::validate_email(&email)?;
    validate::validate_password(&password)?;
    validate::validate_description(&description)?;
    validate::validate_avatar(&avatar)?;

    if User::find_by_email(&state.db, &email).await?.is_some() {
        warn!(%email, "registration with taken email");
        return Err(ApiError::DuplicateEmail);
    }

    let hash = hash_password_blocking(password).await?;
    // The unique constraint still guards the race between the check above
    // and this insert; a losing concurrent create maps to DuplicateEmail.
    let user = User::create(&state.db, &name, &email, &hash, &description, &avatar).await?;

    let token = SessionKeys::from_ref(&state).issue(&user)?;
    let cookie = session_cookie(&state.config.token_name, &token, state.config.secure_cookies());

    info!(user_id = %user.id, %email, "user registered");
    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(UserResponse {
            status: 201,
            success: true,
            message: "User created successfully".into(),
            user: PublicUser::from(&user),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (email, password) = match (payload.email, payload.password) {
        (Some(e), Some(p)) if !e.is_empty() && !p.is_empty() => (e, p),
        _ => {
            return Err(ApiError::Validation("Email or Password not present".into()));
        }
    };
    let email = validate::normalize_email(&email);

    // Unknown email and wrong password take the same exit so responses
    // cannot be used to enumerate accounts.
    let Some(user) = User::find_by_email(&state.db, &email).await? else {
        warn!(%email, "login with unknown email");
        return Err(ApiError::InvalidCredentials);
    };

    if !verify_password_blocking(password, user.password_hash.clone()).await? {
        warn!(user_id = %user.id, "login with wrong password");
        return Err(ApiError::InvalidCredentials);
    }

    let token = SessionKeys::from_ref(&state).issue(&user)?;
    let cookie = session_cookie(&state.config.token_name, &token, state.config.secure_cookies());

    info!(user_id = %user.id, %email, "user logged in");
    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(UserResponse {
            status: 201,
            success: true,
            message: format!("Welcome back {}", user.name),
            user: PublicUser::from(&user),
        }),
    ))
}

/// Stateless sessions cannot be revoked server-side; logout just overwrites
/// the cookie with an expired empty value. Idempotent by construction.
#[instrument(skip(state))]
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    let cookie = clear_session_cookie(&state.config.token_name);
    (
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(MessageResponse {
            status: 200,
            success: true,
            message: "User successfully logged out!".into(),
        }),
    )
}

#[instrument(skip(state, claims))]
pub async fn get_profile(
    State(state): State<AppState>,
    SessionUser(claims): SessionUser,
) -> Result<impl IntoResponse, ApiError> {
    // Identity comes from the verified token, never from caller input.
    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(UserResponse {
        status: 200,
        success: true,
        message: "User profile".into(),
        user: PublicUser::from(&user),
    }))
}

#[instrument(skip(state, claims, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    SessionUser(claims): SessionUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or(ApiError::NotFound)?;

    if let Some(name) = payload.name {
        validate::validate_name(&name)?;
        user.name = name;
    }
    if let Some(email) = payload.email {
        let email = validate::normalize_email(&email);
        validate::validate_email(&email)?;
        user.email = email;
    }
    if let Some(avatar) = payload.avatar {
        validate::validate_avatar(&avatar)?;
        user.avatar = avatar;
    }
    if let Some(description) = payload.description {
        validate::validate_description(&description)?;
        user.description = description;
    }
    // Rehash only on an actual plaintext change; other updates leave the
    // stored hash untouched.
    if let Some(password) = payload.password {
        validate::validate_password(&password)?;
        user.password_hash = hash_password_blocking(password).await?;
    }

    let updated = user.update(&state.db).await?;

    info!(user_id = %updated.id, "profile updated");
    Ok(Json(UserResponse {
        status: 200,
        success: true,
        message: "Updated user".into(),
        user: PublicUser::from(&updated),
    }))
}

#[instrument(skip(state, claims))]
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(claims): AdminUser,
) -> Result<impl IntoResponse, ApiError> {
    let users = User::list(&state.db).await?;
    info!(admin_id = %claims.sub, count = users.len(), "admin listed users");
    Ok(Json(UserListResponse {
        status: 200,
        success: true,
        users: users.iter().map(PublicUser::from).collect(),
    }))
}

#[instrument(skip(claims))]
pub async fn admin_profile(AdminUser(claims): AdminUser) -> impl IntoResponse {
    info!(admin_id = %claims.sub, "admin profile requested");
    "Admin profile info"
}

/// Deletion stub: the route exists and is admin-gated, but no deletion path
/// is implemented in this scope.
#[instrument(skip(claims))]
pub async fn delete_user(
    AdminUser(claims): AdminUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    warn!(admin_id = %claims.sub, target = %id, "delete requested but not implemented");
    "Delete user"
}
