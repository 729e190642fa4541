use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::middleware::RequestId;
use crate::models::{CatalogItem, Category, ItemId, Preferences, UserProfile};
use crate::services::discovery::UnknownSeason;
use crate::services::{ProfileUpdate, RecommendOptions, Recommendation, Season};

use super::AppState;

const DEFAULT_COUNT: usize = 5;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    pub n: Option<i64>,
    pub include_history: Option<bool>,
    pub price_sensitivity: Option<f64>,
    pub location_based: Option<bool>,
    pub urgent_only: Option<bool>,
}

impl RecommendationQuery {
    fn into_options(self) -> RecommendOptions {
        let defaults = RecommendOptions::default();
        RecommendOptions {
            n: count(self.n, defaults.n),
            include_history: self.include_history.unwrap_or(defaults.include_history),
            price_sensitivity: self
                .price_sensitivity
                .unwrap_or(defaults.price_sensitivity),
            location_based: self.location_based.unwrap_or(defaults.location_based),
            urgent_only: self.urgent_only.unwrap_or(defaults.urgent_only),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateProfileRequest {
    pub user_id: Option<String>,
    pub name: Option<String>,
    pub address: Option<String>,
    #[serde(alias = "zip_code")]
    pub location: Option<String>,
    pub preferences: Option<Preferences>,
    pub history: Option<Vec<ItemId>>,
}

#[derive(Debug, Deserialize)]
pub struct TrackInteractionRequest {
    pub user_id: Option<String>,
    #[serde(alias = "gig_id")]
    pub item_id: Option<ItemId>,
    pub interaction_type: Option<String>,
    pub value: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct TrackInteractionResponse {
    pub status: &'static str,
    pub message: String,
    pub preferences_updated: bool,
}

#[derive(Debug, Deserialize)]
pub struct UrgentNeedRequest {
    pub user_id: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ExplanationResponse {
    pub user_id: String,
    pub item_id: ItemId,
    pub explanation: String,
}

#[derive(Debug, Deserialize)]
pub struct EmergencyQuery {
    pub user_id: Option<String>,
    pub category: Option<String>,
    pub n: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SeasonalQuery {
    pub user_id: Option<String>,
    pub n: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct SnapshotLoadResponse {
    pub loaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profiles: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Negative counts mean "nothing"
fn count(n: Option<i64>, default: usize) -> usize {
    n.map(|n| usize::try_from(n).unwrap_or(0)).unwrap_or(default)
}

/// Trims an identifier and rejects it when missing or blank
fn required(value: Option<String>, field: &str) -> AppResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::InvalidInput(format!("Missing {}", field)))
}

/// Rejects strengths and weights that are negative or not finite
fn non_negative(value: f64, field: &str) -> AppResult<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(AppError::InvalidInput(format!(
            "{} must be a non-negative number",
            field
        )))
    }
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// List catalog categories
pub async fn get_categories(State(state): State<AppState>) -> Json<Vec<Category>> {
    let engine = state.engine.read().await;
    Json(engine.catalog().categories().to_vec())
}

/// Ranked recommendations for a user
pub async fn get_recommendations(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(user_id): Path<String>,
    Query(query): Query<RecommendationQuery>,
) -> Json<Vec<Recommendation>> {
    let options = query.into_options();
    tracing::info!(
        request_id = %request_id,
        user_id = %user_id,
        n = options.n,
        "Processing recommendation request"
    );

    // write lock: unknown users get a default profile
    let mut engine = state.engine.write().await;
    Json(engine.recommend(&user_id, &options))
}

/// Explain a single recommendation
pub async fn explain_recommendation(
    State(state): State<AppState>,
    Path((user_id, item_id)): Path<(String, ItemId)>,
) -> Json<ExplanationResponse> {
    let engine = state.engine.read().await;
    let explanation = engine.explain(&user_id, item_id);
    Json(ExplanationResponse {
        user_id,
        item_id,
        explanation,
    })
}

/// Create or update a user profile
pub async fn create_user_profile(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<CreateProfileRequest>,
) -> AppResult<Json<UserProfile>> {
    let user_id = required(request.user_id, "user_id")?;
    if let Some(preferences) = &request.preferences {
        for (category, weight) in preferences.iter() {
            non_negative(weight, &format!("Preference for {}", category))?;
        }
    }
    tracing::info!(request_id = %request_id, user_id = %user_id, "Profile upsert");

    let update = ProfileUpdate {
        name: request.name,
        address: request.address,
        location: request.location,
        preferences: request.preferences,
        history: request.history,
    };

    let mut engine = state.engine.write().await;
    let profile = engine.create_or_update_profile(&user_id, update).clone();
    Ok(Json(profile))
}

/// Flag a user as needing urgent service
pub async fn set_urgent_need(
    State(state): State<AppState>,
    Json(request): Json<UrgentNeedRequest>,
) -> AppResult<Json<UserProfile>> {
    let user_id = required(request.user_id, "user_id")?;

    let mut engine = state.engine.write().await;
    if !engine.set_urgent_need(&user_id, request.category.as_deref()) {
        return Err(AppError::NotFound(format!("User {} not found", user_id)));
    }

    engine
        .profile(&user_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::Internal(format!("Profile {} vanished", user_id)))
}

/// Record a user interaction with a catalog item
pub async fn track_interaction(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<TrackInteractionRequest>,
) -> AppResult<Json<TrackInteractionResponse>> {
    let user_id = required(request.user_id, "user_id")?;
    let item_id = request
        .item_id
        .ok_or_else(|| AppError::InvalidInput("Missing item_id".to_string()))?;
    let interaction_type = request.interaction_type.unwrap_or_else(|| "view".to_string());
    let value = non_negative(request.value.unwrap_or(1.0), "value")?;

    tracing::info!(
        request_id = %request_id,
        user_id = %user_id,
        item_id,
        interaction = %interaction_type,
        "Tracking interaction"
    );

    let mut engine = state.engine.write().await;
    let preferences_updated = engine.track(&user_id, item_id, &interaction_type, value);

    Ok(Json(TrackInteractionResponse {
        status: "success",
        message: format!(
            "Interaction recorded for user {} with item {}",
            user_id, item_id
        ),
        preferences_updated,
    }))
}

/// Items offering same-day service
pub async fn get_emergency_services(
    State(state): State<AppState>,
    Query(query): Query<EmergencyQuery>,
) -> Json<Vec<CatalogItem>> {
    let engine = state.engine.read().await;
    let items: Vec<CatalogItem> = engine
        .emergency_services(
            query.user_id.as_deref(),
            query.category.as_deref(),
            count(query.n, DEFAULT_COUNT),
        )
        .into_iter()
        .cloned()
        .collect();
    Json(items)
}

/// Seasonal shortlist
pub async fn get_seasonal_recommendations(
    State(state): State<AppState>,
    Path(season): Path<String>,
    Query(query): Query<SeasonalQuery>,
) -> AppResult<Json<Vec<CatalogItem>>> {
    let season: Season = season
        .parse()
        .map_err(|e: UnknownSeason| AppError::InvalidInput(e.to_string()))?;

    let engine = state.engine.read().await;
    let items: Vec<CatalogItem> = engine
        .seasonal_recommendations(
            season,
            query.user_id.as_deref(),
            count(query.n, DEFAULT_COUNT),
        )
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(items))
}

/// Persist the engine state to the configured snapshot file
pub async fn save_snapshot(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let engine = state.engine.read().await;
    engine.save_snapshot(state.snapshot_path.as_path())?;
    Ok(Json(json!({
        "saved": true,
        "path": state.snapshot_path.display().to_string(),
    })))
}

/// Restore engine state from the configured snapshot file
///
/// Failure is reported in the body; the current state is kept.
pub async fn load_snapshot(State(state): State<AppState>) -> Json<SnapshotLoadResponse> {
    let mut engine = state.engine.write().await;
    match engine.restore_snapshot(state.snapshot_path.as_path()) {
        Ok(summary) => Json(SnapshotLoadResponse {
            loaded: true,
            profiles: Some(summary.profiles),
            error: None,
        }),
        Err(e) => Json(SnapshotLoadResponse {
            loaded: false,
            profiles: None,
            error: Some(e.to_string()),
        }),
    }
}
