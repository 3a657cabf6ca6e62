// 🌐 Web Application - routes, shared state and the JSON wrapper

pub mod handlers;
pub mod views;

use crate::store::EntryStore;
use axum::{routing::get, Router};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EntryStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn EntryStore>) -> Self {
        Self { store }
    }
}

/// API Response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failed(error: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

/// Build the full application: HTML pages, `/api`, and `/static` assets
pub fn router(state: AppState, static_dir: &Path) -> Router {
    let api_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/entries", get(handlers::api_entries))
        .layer(CorsLayer::permissive())
        .with_state(state.clone());

    Router::new()
        .route("/", get(handlers::home))
        .route(
            "/new",
            get(handlers::new_entry_form).post(handlers::submit_guess),
        )
        .route(
            "/result",
            get(handlers::result_form).post(handlers::show_result),
        )
        .route("/entries", get(handlers::list_entries))
        .route("/delete", get(handlers::delete_all))
        .with_state(state)
        .nest("/api", api_routes)
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::GuessRecord;
    use crate::store::MemoryEntryStore;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use tower::ServiceExt;

    fn app_with(records: Vec<GuessRecord>) -> (Router, Arc<MemoryEntryStore>) {
        let store = Arc::new(MemoryEntryStore::with_records(records));
        let app = router(AppState::new(store.clone()), Path::new("web/static"));
        (app, store)
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_form(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn location(response: &Response) -> &str {
        response.headers()[header::LOCATION].to_str().unwrap()
    }

    fn two_guesses() -> Vec<GuessRecord> {
        vec![
            GuessRecord::new("Alice", "2024-01-01", "50", "3000", "F"),
            GuessRecord::new("Bob", "2024-01-02", "51", "3050", "F"),
        ]
    }

    #[tokio::test]
    async fn test_home_page() {
        let (app, _) = app_with(vec![]);
        let response = app.oneshot(get_req("/")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Baby Tombola"));
    }

    #[tokio::test]
    async fn test_home_shows_redirect_notice() {
        let (app, _) = app_with(vec![]);
        let response = app.oneshot(get_req("/?notice=submitted")).await.unwrap();

        assert!(body_text(response)
            .await
            .contains("Entry submitted successfully!"));
    }

    #[tokio::test]
    async fn test_submit_guess_appends_and_redirects() {
        let (app, store) = app_with(vec![]);
        let response = app
            .oneshot(post_form(
                "/new",
                "name=Alice&dob=2024-01-01&length=50.0&weight=3000&gender=F",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/?notice=submitted");
        assert_eq!(
            store.read_all().unwrap(),
            vec![GuessRecord::new("Alice", "2024-01-01", "50.0", "3000", "F")]
        );
    }

    #[tokio::test]
    async fn test_invalid_guess_is_not_stored() {
        let (app, store) = app_with(vec![]);
        let response = app
            .oneshot(post_form(
                "/new",
                "name=Bob&dob=2024-01-01&length=long&weight=3000&gender=M",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_text(response).await;
        assert!(body.contains("invalid length"));
        assert!(body.contains("Bob"));
        assert!(store.read_all().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_fields_are_a_notice_not_a_rejection() {
        let (app, store) = app_with(vec![]);
        let response = app.oneshot(post_form("/new", "name=Carol")).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_text(response).await.contains("Error:"));
        assert!(store.read_all().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_guess_without_form_content_type_redisplays_form() {
        let (app, store) = app_with(vec![]);
        let request = Request::builder()
            .method("POST")
            .uri("/new")
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from("name=Bob&dob=2024-01-01&length=50&weight=3000&gender=M"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        let body = body_text(response).await;
        assert!(body.contains("Error:"));
        assert!(body.contains("<form"));
        assert!(store.read_all().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_result_without_content_type_redisplays_form() {
        let (app, _) = app_with(two_guesses());
        let request = Request::builder()
            .method("POST")
            .uri("/result")
            .body(Body::from("dob=2024-01-01&length=50&weight=3000&gender=F"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        let body = body_text(response).await;
        assert!(body.contains("Error:"));
        assert!(!body.contains("Winner:"));
    }

    #[tokio::test]
    async fn test_result_shows_winner_and_charts() {
        let (app, _) = app_with(two_guesses());
        let response = app
            .oneshot(post_form(
                "/result",
                "dob=2024-01-01&length=50&weight=3000&gender=F",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("Winner: Alice"));
        assert!(body.contains("0.00"));
        assert_eq!(body.matches("data:image/svg+xml;base64,").count(), 3);
    }

    #[tokio::test]
    async fn test_result_with_empty_store() {
        let (app, _) = app_with(vec![]);
        let response = app
            .oneshot(post_form(
                "/result",
                "dob=2024-01-01&length=50&weight=3000&gender=F",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("no entries have been submitted yet"));
        assert!(!body.contains("data:image/svg+xml"));
    }

    #[tokio::test]
    async fn test_result_with_bad_actual_redisplays_form() {
        let (app, _) = app_with(two_guesses());
        let response = app
            .oneshot(post_form(
                "/result",
                "dob=yesterday&length=50&weight=3000&gender=F",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_text(response).await.contains("invalid date of birth"));
    }

    #[tokio::test]
    async fn test_entries_listed_verbatim() {
        let mut records = two_guesses();
        records.push(GuessRecord::new("Zed", "soon", "n/a", "3000", "M"));
        let (app, _) = app_with(records);

        let body = body_text(app.oneshot(get_req("/entries")).await.unwrap()).await;
        assert!(body.contains("Alice"));
        assert!(body.contains("Zed"));
        assert!(body.contains("soon"));
    }

    #[tokio::test]
    async fn test_delete_on_empty_store() {
        let (app, store) = app_with(vec![]);
        let response = app.oneshot(get_req("/delete")).await.unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/?notice=deleted");
        assert!(store.read_all().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_clears_entries() {
        let (app, store) = app_with(two_guesses());
        app.oneshot(get_req("/delete")).await.unwrap();

        assert!(store.read_all().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_api_entries_json() {
        let (app, _) = app_with(two_guesses());
        let response = app.oneshot(get_req("/api/entries")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value =
            serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"][1]["Name"], "Bob");
        assert_eq!(json["data"][0]["DateOfBirth"], "2024-01-01");
    }
}
