use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::sync::Arc;

use super::server::AppState;
use super::SessionToken;
use crate::error::AppError;
use crate::handlers::meal_handler::MealLogView;
use crate::models::MealEdit;
use crate::services::meal_log::LoggedMeal;

/// Routes for the meal log, nested under `/api/log`
pub fn create_log_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_meals).delete(clear_meals))
        .route(
            "/:position",
            get(get_meal).patch(edit_meal).delete(delete_meal),
        )
        .route("/:position/image", get(get_meal_image))
}

/// Newest first, with the summary line
async fn list_meals(
    State(state): State<Arc<AppState>>,
    SessionToken(token): SessionToken,
) -> Result<Json<MealLogView>, AppError> {
    Ok(Json(state.meal_handler.meal_log(&token).await?))
}

async fn clear_meals(
    State(state): State<Arc<AppState>>,
    SessionToken(token): SessionToken,
) -> Result<Json<serde_json::Value>, AppError> {
    let removed = state.meal_handler.clear_log(&token).await?;
    Ok(Json(serde_json::json!({ "removed": removed })))
}

async fn get_meal(
    Path(position): Path<usize>,
    State(state): State<Arc<AppState>>,
    SessionToken(token): SessionToken,
) -> Result<Json<LoggedMeal>, AppError> {
    Ok(Json(state.meal_handler.get_entry(&token, position).await?))
}

async fn edit_meal(
    Path(position): Path<usize>,
    State(state): State<Arc<AppState>>,
    SessionToken(token): SessionToken,
    Json(edit): Json<MealEdit>,
) -> Result<Json<LoggedMeal>, AppError> {
    Ok(Json(
        state.meal_handler.edit_entry(&token, position, edit).await?,
    ))
}

async fn delete_meal(
    Path(position): Path<usize>,
    State(state): State<Arc<AppState>>,
    SessionToken(token): SessionToken,
) -> Result<Json<LoggedMeal>, AppError> {
    Ok(Json(state.meal_handler.delete_entry(&token, position).await?))
}

/// Stored photo, served back with its original content type
async fn get_meal_image(
    Path(position): Path<usize>,
    State(state): State<Arc<AppState>>,
    SessionToken(token): SessionToken,
) -> Result<Response, AppError> {
    let image = state.meal_handler.entry_image(&token, position).await?;
    Ok(([(header::CONTENT_TYPE, image.mime_type)], image.bytes).into_response())
}
