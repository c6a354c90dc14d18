use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};

use crate::error::AppError;
use crate::insights::cycle_stats;
use crate::models::{CycleStatsResponse, UserQuery};
use crate::store::SharedStore;

pub async fn get_cycle_stats(
    State(store): State<SharedStore>,
    Query(query): Query<UserQuery>,
) -> Result<Json<CycleStatsResponse>, AppError> {
    let entries = store.list_entries(query.user_id).await?;

    Ok(Json(cycle_stats(&entries)))
}

pub fn routes(store: SharedStore) -> Router {
    Router::new()
        .route("/cycle-stats", get(get_cycle_stats))
        .with_state(store)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::json;
    use uuid::Uuid;

    use crate::routes::test_support::{body_json, json_request, send, test_app};

    #[tokio::test]
    async fn ongoing_cycle_has_no_length() {
        let app = test_app();
        let user = Uuid::new_v4();
        let entries_uri = format!("/entries?user_id={user}");

        for body in [
            json!({ "startDate": "2024-01-01", "endDate": "2024-01-04", "flow": "light" }),
            json!({ "startDate": "2024-01-31", "flow": "medium" }),
        ] {
            send(&app, json_request("POST", &entries_uri, body)).await;
        }

        let response = send(
            &app,
            Request::builder()
                .uri(format!("/cycle-stats?user_id={user}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["averageCycleLength"], json!(30.0));
        assert_eq!(json["averagePeriodLength"], json!(4.0));
        assert_eq!(json["shortestCycle"], json!(30));
        assert_eq!(json["cycleStats"][0]["cycleLength"], json!(30));
        assert_eq!(json["cycleStats"][1]["cycleNumber"], json!(2));
        assert!(json["cycleStats"][1]["cycleLength"].is_null());
        assert!(json["cycleStats"][1]["periodLength"].is_null());
    }
}
