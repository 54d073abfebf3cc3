use std::sync::Arc;

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use derivatex_core::derivatives::{
    DeleteOutcome, Derivative, DerivativeFilter, DerivativeUpdates, NewDerivative, UpdateOutcome,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateDerivativeBody {
    user_id: String,
    derivative: NewDerivative,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateDerivativeBody {
    user_id: String,
    updates: DerivativeUpdates,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActingUser {
    user_id: String,
}

fn require_user(user_id: &str) -> ApiResult<()> {
    if user_id.trim().is_empty() {
        return Err(ApiError::BadRequest("userId is required".to_string()));
    }
    Ok(())
}

async fn list_derivatives(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<DerivativeFilter>,
) -> ApiResult<Json<Vec<Derivative>>> {
    let derivatives = state.derivative_service.list_derivatives(&filter)?;
    Ok(Json(derivatives))
}

async fn get_derivative(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Derivative>> {
    state
        .derivative_service
        .get_derivative(&id)?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

async fn create_derivative(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateDerivativeBody>,
) -> ApiResult<(StatusCode, Json<Derivative>)> {
    require_user(&body.user_id)?;
    let created = state
        .derivative_service
        .add_derivative(body.derivative, &body.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_derivative(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<UpdateDerivativeBody>,
) -> ApiResult<Json<UpdateOutcome>> {
    require_user(&body.user_id)?;
    let outcome = state
        .derivative_service
        .update_derivative(&id, &body.user_id, body.updates)
        .await?;
    Ok(Json(outcome))
}

async fn delete_derivative(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Query(acting): Query<ActingUser>,
) -> ApiResult<Json<DeleteOutcome>> {
    require_user(&acting.user_id)?;
    let outcome = state
        .derivative_service
        .delete_derivative(&id, &acting.user_id)
        .await?;
    Ok(Json(outcome))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/derivatives",
            get(list_derivatives).post(create_derivative),
        )
        .route(
            "/derivatives/{id}",
            get(get_derivative)
                .patch(update_derivative)
                .delete(delete_derivative),
        )
}
