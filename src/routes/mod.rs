use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::store::SharedStore;

pub mod cycle_stats;
pub mod entries;
pub mod insights;

pub fn app(store: SharedStore) -> Router {
    Router::new()
        .merge(entries::routes(store.clone()))
        .merge(insights::routes(store.clone()))
        .merge(cycle_stats::routes(store))
        .route("/health", get(|| async { "ok" }))
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use axum::{body::Body, http::Request, response::Response, Router};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::store::MemoryEntryStore;

    pub fn test_app() -> Router {
        super::app(Arc::new(MemoryEntryStore::new()))
    }

    pub async fn send(app: &Router, request: Request<Body>) -> Response {
        app.clone().oneshot(request).await.unwrap()
    }

    pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    pub async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }
}
