use std::path::Path;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    api,
    config::AppConfig,
    fetcher,
    middleware::assign_trace_id,
    repo::catalog::{self, EventCatalog},
};

#[derive(Clone)]
pub struct AppState {
    pub catalog: EventCatalog,
}

pub async fn build_router(config: &AppConfig) -> anyhow::Result<Router> {
    let seeded = match &config.catalog.seed_file {
        Some(path) => catalog::load_seed_file(Path::new(path))?,
        None => Vec::new(),
    };
    tracing::info!(count = seeded.len(), "event catalog seeded");

    let catalog = EventCatalog::new(seeded);
    fetcher::spawn(catalog.clone(), config.upstream.clone())?;

    Ok(router(AppState { catalog }))
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(middleware::from_fn(assign_trace_id));

    Router::new()
        .route("/healthz", get(api::health::health_check))
        .route(
            "/events",
            get(api::events::list_events).post(api::events::create_event),
        )
        .route("/events/check", post(api::events::check_duplicate))
        .layer(middleware)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use chrono::NaiveDate;

    use crate::{
        middleware::TRACE_HEADER,
        repo::catalog::{record, EventRecord, EventSource},
    };

    fn seeded(id: &str, name: &str, location: &str, day: u32) -> EventRecord {
        EventRecord {
            location: location.to_string(),
            date: NaiveDate::from_ymd_opt(2025, 7, day).unwrap(),
            ..record(id, name, EventSource::Seed)
        }
    }

    fn test_router() -> Router {
        router(AppState {
            catalog: EventCatalog::new(vec![
                seeded("1", "Tech Expo 2025", "KLCC", 5),
                seeded("2", "Food Carnival", "Sunway City", 1),
                seeded("3", "Music Fest", "Bukit Jalil", 1),
            ]),
        })
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let res = app
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = res.status();
        (status, read_json(res).await)
    }

    fn names(body: &Value) -> Vec<&str> {
        body.as_array()
            .unwrap()
            .iter()
            .map(|item| item["name"].as_str().unwrap())
            .collect()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn read_json(res: axum::response::Response) -> Value {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_reports_event_count() {
        let res = test_router()
            .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers().contains_key(TRACE_HEADER));
        assert_eq!(read_json(res).await, json!({"ok": true, "events": 3}));
    }

    #[tokio::test]
    async fn list_filters_by_search() {
        let res = test_router()
            .oneshot(Request::get("/events?search=carn").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = read_json(res).await;
        let items = body.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["name"], "Food Carnival");
        assert_eq!(items[0]["imageCount"], 0);
        assert_eq!(items[0]["date"], "2025-07-01");
    }

    #[tokio::test]
    async fn list_search_matches_location() {
        let (status, body) = get_json(test_router(), "/events?search=klcc").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(names(&body), vec!["Tech Expo 2025"]);
    }

    #[tokio::test]
    async fn list_applies_location_date_and_sort() {
        let (_, body) = get_json(test_router(), "/events?location=Jalil").await;
        assert_eq!(names(&body), vec!["Music Fest"]);

        let (_, body) = get_json(test_router(), "/events?date=2025-07-01&sort=a-z").await;
        assert_eq!(names(&body), vec!["Food Carnival", "Music Fest"]);

        let (_, body) = get_json(test_router(), "/events?sort=newest").await;
        assert_eq!(names(&body), vec!["Tech Expo 2025", "Food Carnival", "Music Fest"]);

        let (_, body) = get_json(test_router(), "/events?sort=oldest").await;
        assert_eq!(names(&body), vec!["Food Carnival", "Music Fest", "Tech Expo 2025"]);
    }

    #[tokio::test]
    async fn list_with_bad_date_is_bad_request() {
        let (status, body) = get_json(test_router(), "/events?date=01-07-2025").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "BadRequest");
    }

    #[tokio::test]
    async fn check_flags_near_duplicate() {
        let res = test_router()
            .oneshot(post_json("/events/check", json!({"name": "Music Festt"})))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = read_json(res).await;
        assert_eq!(body["state"], "warning");
        assert_eq!(body["matched"], "Music Fest");
        assert!(body["similarity"].as_f64().unwrap() > 90.0);
    }

    #[tokio::test]
    async fn check_reports_clean_and_empty() {
        let app = test_router();
        let res = app
            .clone()
            .oneshot(post_json("/events/check", json!({"name": "Penang Bridge Run"})))
            .await
            .unwrap();
        assert_eq!(read_json(res).await, json!({"state": "clean"}));

        let res = app
            .oneshot(post_json("/events/check", json!({"name": "   "})))
            .await
            .unwrap();
        assert_eq!(read_json(res).await, json!({"state": "empty"}));
    }

    #[tokio::test]
    async fn create_with_duplicate_name_still_succeeds() {
        let app = test_router();
        let res = app
            .clone()
            .oneshot(post_json(
                "/events",
                json!({
                    "name": "Tech Expo 2025",
                    "date": "2025-07-05",
                    "location": "KLCC",
                    "description": "Second hall",
                    "createdBy": "creator-9"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        let body = read_json(res).await;
        assert_eq!(body["duplicateOf"], "Tech Expo 2025");
        assert_eq!(body["event"]["source"], "local");
        assert_eq!(body["event"]["description"], "Second hall");
        assert_eq!(body["event"]["createdBy"], "creator-9");

        let res = app
            .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(read_json(res).await["events"], 4);
    }

    #[tokio::test]
    async fn create_with_missing_field_is_bad_request() {
        let res = test_router()
            .oneshot(post_json(
                "/events",
                json!({"name": "New Expo", "date": "2025-07-05", "createdBy": "creator-9"}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body = read_json(res).await;
        assert_eq!(body["error"]["code"], "BadRequest");
        assert_eq!(body["error"]["message"], "location is required");
    }

    #[tokio::test]
    async fn create_without_creator_is_bad_request() {
        let res = test_router()
            .oneshot(post_json(
                "/events",
                json!({"name": "New Expo", "date": "2025-07-05", "location": "MITEC"}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body = read_json(res).await;
        assert_eq!(body["error"]["message"], "createdBy is required");
    }
}
