use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{NewPeriodEntry, PeriodEntry, UserQuery};
use crate::store::SharedStore;

pub fn routes(store: SharedStore) -> Router {
    Router::new()
        .route("/entries", get(list_entries).post(create_entry))
        .route("/entries/:id", delete(delete_entry))
        .with_state(store)
}

async fn list_entries(
    State(store): State<SharedStore>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Vec<PeriodEntry>>, AppError> {
    Ok(Json(store.list_entries(query.user_id).await?))
}

async fn create_entry(
    State(store): State<SharedStore>,
    Query(query): Query<UserQuery>,
    Json(body): Json<NewPeriodEntry>,
) -> Result<(StatusCode, Json<PeriodEntry>), AppError> {
    let entry = store.create_entry(query.user_id, body).await?;
    tracing::info!("📝 Logged period starting {} for {}", entry.start_date, query.user_id);

    Ok((StatusCode::CREATED, Json(entry)))
}

async fn delete_entry(
    State(store): State<SharedStore>,
    Path(id): Path<Uuid>,
    Query(query): Query<UserQuery>,
) -> Result<StatusCode, AppError> {
    if store.delete_entry(query.user_id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("No entry found".into()))
    }
}
