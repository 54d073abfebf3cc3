use std::sync::Arc;

use crate::{error::ApiResult, main_lib::AppState};
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use derivatex_core::actions::{Action, ActionFilter};

/// Lists the audit trail, newest first.
async fn list_actions(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<ActionFilter>,
) -> ApiResult<Json<Vec<Action>>> {
    let actions = state.derivative_service.get_actions(&filter)?;
    Ok(Json(actions))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/actions", get(list_actions))
}
