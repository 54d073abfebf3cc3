use std::sync::Arc;

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};
use argon2::{
    password_hash::{PasswordHasher, SaltString},
    Argon2,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use derivatex_core::errors::Error as CoreError;
use derivatex_core::users::{NewUser, User};
use rand::rngs::OsRng;
use serde::Deserialize;
use tracing::info;

/// Registration body. The password never leaves this handler unhashed.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateUserBody {
    first_name: String,
    last_name: String,
    email: String,
    password: String,
}

/// Hashes `password` into an Argon2id PHC string with a fresh salt.
fn hash_password(password: &str) -> ApiResult<String> {
    if password.is_empty() {
        return Err(ApiError::BadRequest("password is required".to_string()));
    }
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;
    Ok(hash.to_string())
}

async fn get_user(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<User>> {
    state
        .user_repository
        .get_by_id(&id)?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateUserBody>,
) -> ApiResult<(StatusCode, Json<User>)> {
    if state.user_repository.get_by_email(&body.email)?.is_some() {
        return Err(CoreError::ConstraintViolation(format!(
            "A user with email {} already exists",
            body.email
        ))
        .into());
    }
    let new_user = NewUser {
        password_hash: hash_password(&body.password)?,
        first_name: body.first_name,
        last_name: body.last_name,
        email: body.email,
    };
    let user = state.user_repository.create(new_user).await?;
    info!("Created user {}", user.id);
    Ok((StatusCode::CREATED, Json(user)))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", post(create_user))
        .route("/users/{id}", get(get_user))
}
