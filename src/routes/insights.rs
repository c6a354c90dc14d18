use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde_json::Value;

use crate::error::AppError;
use crate::insights::{compute_insights, compute_insights_from_value};
use crate::models::{Insights, UserQuery};
use crate::store::SharedStore;

pub fn routes(store: SharedStore) -> Router {
    Router::new()
        .route("/insights", get(get_insights).post(post_insights))
        .with_state(store)
}

async fn get_insights(
    State(store): State<SharedStore>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Insights>, AppError> {
    let entries = store.list_entries(query.user_id).await?;
    tracing::debug!("computing insights over {} entries", entries.len());

    Ok(Json(compute_insights(&entries)))
}

/// Insights over entries supplied by the caller instead of the store.
async fn post_insights(Json(body): Json<Value>) -> Result<Json<Insights>, AppError> {
    let insights = compute_insights_from_value(&body).map_err(|e| {
        tracing::warn!("⚠️ Rejected insight request: {}", e);
        e
    })?;

    Ok(Json(insights))
}
