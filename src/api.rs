use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const SESSION_HEADER: &str = "x-session-token";

/// Session token taken from the `x-session-token` header
pub struct SessionToken(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for SessionToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(|v| SessionToken(v.to_string()))
            .ok_or(AppError::InvalidSession)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub status: u16,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::InvalidSession => (StatusCode::UNAUTHORIZED, "E_SESSION"),
            AppError::MissingImage => (StatusCode::BAD_REQUEST, "E_NO_IMAGE"),
            AppError::UnsupportedImage(_) => (StatusCode::UNSUPPORTED_MEDIA_TYPE, "E_IMAGE_TYPE"),
            AppError::DraftChanged => (StatusCode::CONFLICT, "E_DRAFT_CHANGED"),
            AppError::EntryNotFound(_) => (StatusCode::NOT_FOUND, "E_NOT_FOUND"),
            AppError::Invalid(_) => (StatusCode::BAD_REQUEST, "E_INVALID"),
            AppError::Model(_) => (StatusCode::BAD_GATEWAY, "E_MODEL"),
        };

        if status.is_server_error() {
            log::error!("❌ Request failed: {}", self);
        } else {
            log::debug!("Request rejected ({}): {}", status, self);
        }

        let body = ErrorResponse {
            code: code.to_string(),
            message: self.to_string(),
            status: status.as_u16(),
        };

        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct SymptomsRequest {
    pub symptoms: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct DietaryPreferenceRequest {
    pub dietary_preference: String,
}

#[derive(Debug, Deserialize)]
pub struct FoodItemsRequest {
    pub items: String,
}

// Meal log routes
pub mod log_routes;

pub mod server {
    use super::*;
    use axum::{
        extract::{DefaultBodyLimit, Multipart, State},
        routing::{get, post, put},
        Router,
    };
    use std::path::PathBuf;
    use std::sync::Arc;
    use tower_http::services::ServeDir;

    use crate::handlers::meal_handler::{DraftView, Recommendation};
    use crate::handlers::profile::{update_dietary_preference, update_symptoms};
    use crate::handlers::MealHandler;
    use crate::models::{ImageUpload, Profile, ALL_SYMPTOMS, DIETARY_PREFERENCES, MAX_SYMPTOMS};
    use crate::services::meal_log::LoggedMeal;
    use crate::services::SessionStore;

    pub struct AppState {
        pub meal_handler: Arc<MealHandler>,
        pub sessions: Arc<SessionStore>,
    }

    pub fn create_router(
        meal_handler: Arc<MealHandler>,
        sessions: Arc<SessionStore>,
        max_upload_bytes: usize,
        static_dir: Option<PathBuf>,
    ) -> Router {
        let state = Arc::new(AppState {
            meal_handler,
            sessions,
        });

        let router = Router::new()
            .route("/", get(root_handler))
            .route("/health", get(health_check))
            .route("/api/session", post(create_session))
            .route("/api/profile", get(get_profile))
            .route("/api/profile/options", get(profile_options))
            .route("/api/profile/symptoms", put(put_symptoms))
            .route("/api/profile/dietary-preference", put(put_dietary_preference))
            .route("/api/meals/analyze", post(analyze_meal))
            .route("/api/meals/draft", get(get_draft))
            .route("/api/meals/draft/items", put(put_food_items))
            .route("/api/meals/recommend", post(recommend_meal))
            .route("/api/meals/log", post(log_meal))
            .nest("/api/log", super::log_routes::create_log_router())
            .layer(DefaultBodyLimit::max(max_upload_bytes))
            .with_state(state);

        match static_dir {
            Some(dir) => {
                log::info!("📁 Serving front-end from {}", dir.display());
                router.fallback_service(ServeDir::new(dir))
            }
            None => router,
        }
    }

    async fn root_handler() -> &'static str {
        "PCOS Meal Coach API - create a session with POST /api/session"
    }

    async fn health_check() -> &'static str {
        "OK"
    }

    async fn create_session(State(state): State<Arc<AppState>>) -> impl IntoResponse {
        let token = state.sessions.create().await;
        (StatusCode::CREATED, Json(serde_json::json!({ "token": token })))
    }

    async fn get_profile(
        State(state): State<Arc<AppState>>,
        SessionToken(token): SessionToken,
    ) -> Result<Json<Profile>, AppError> {
        let profile = state
            .sessions
            .with_session(&token, |session| session.profile.clone())
            .await
            .ok_or(AppError::InvalidSession)?;
        Ok(Json(profile))
    }

    async fn profile_options() -> Json<serde_json::Value> {
        Json(serde_json::json!({
            "symptoms": ALL_SYMPTOMS,
            "dietary_preferences": DIETARY_PREFERENCES,
            "max_symptoms": MAX_SYMPTOMS,
        }))
    }

    async fn put_symptoms(
        State(state): State<Arc<AppState>>,
        SessionToken(token): SessionToken,
        Json(request): Json<SymptomsRequest>,
    ) -> Result<Json<Profile>, AppError> {
        let profile = state
            .sessions
            .with_session(&token, |session| {
                update_symptoms(&mut session.profile, request.symptoms)?;
                Ok::<_, AppError>(session.profile.clone())
            })
            .await
            .ok_or(AppError::InvalidSession)??;
        Ok(Json(profile))
    }

    async fn put_dietary_preference(
        State(state): State<Arc<AppState>>,
        SessionToken(token): SessionToken,
        Json(request): Json<DietaryPreferenceRequest>,
    ) -> Result<Json<Profile>, AppError> {
        let profile = state
            .sessions
            .with_session(&token, |session| {
                update_dietary_preference(&mut session.profile, request.dietary_preference)?;
                Ok::<_, AppError>(session.profile.clone())
            })
            .await
            .ok_or(AppError::InvalidSession)??;
        Ok(Json(profile))
    }

    /// Multipart upload with the dish photo in an `image` field
    async fn analyze_meal(
        State(state): State<Arc<AppState>>,
        SessionToken(token): SessionToken,
        mut multipart: Multipart,
    ) -> Result<Json<DraftView>, AppError> {
        let mut upload: Option<ImageUpload> = None;

        while let Some(field) = multipart.next_field().await.map_err(|e| {
            log::error!("Failed to read multipart field: {}", e);
            AppError::Invalid(format!("Failed to read multipart field: {}", e))
        })? {
            if field.name() != Some("image") {
                continue;
            }

            let content_type = field.content_type().unwrap_or_default().to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::Invalid(format!("Failed to read image: {}", e)))?;

            if data.is_empty() {
                return Err(AppError::Invalid("Image cannot be empty".to_string()));
            }

            let image = ImageUpload::new(data.to_vec(), &content_type)
                .ok_or(AppError::UnsupportedImage(content_type))?;
            upload = Some(image);
        }

        let image = upload.ok_or(AppError::MissingImage)?;
        let draft = state.meal_handler.analyze_image(&token, image).await?;
        Ok(Json(draft))
    }

    async fn get_draft(
        State(state): State<Arc<AppState>>,
        SessionToken(token): SessionToken,
    ) -> Result<Json<DraftView>, AppError> {
        Ok(Json(state.meal_handler.draft(&token).await?))
    }

    async fn put_food_items(
        State(state): State<Arc<AppState>>,
        SessionToken(token): SessionToken,
        Json(request): Json<FoodItemsRequest>,
    ) -> Result<Json<DraftView>, AppError> {
        Ok(Json(
            state.meal_handler.save_food_items(&token, request.items).await?,
        ))
    }

    async fn recommend_meal(
        State(state): State<Arc<AppState>>,
        SessionToken(token): SessionToken,
    ) -> Result<Json<Recommendation>, AppError> {
        Ok(Json(state.meal_handler.recommend(&token).await?))
    }

    async fn log_meal(
        State(state): State<Arc<AppState>>,
        SessionToken(token): SessionToken,
    ) -> Result<(StatusCode, Json<LoggedMeal>), AppError> {
        let logged = state.meal_handler.log_activity(&token).await?;
        Ok((StatusCode::CREATED, Json(logged)))
    }
}
