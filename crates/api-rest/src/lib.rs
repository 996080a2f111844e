//! # API REST
//!
//! REST API implementation for SenCare.
//!
//! Handles:
//! - HTTP endpoints with axum, one per [`PatientStore`] operation
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON envelopes, API key checks, CORS)
//!
//! Uses `api-shared` for wire bodies and authentication.

#![warn(rust_2018_idioms)]

mod error;
mod handlers;

pub use error::ApiError;

use api_shared::{
    ApiKeyAuthenticator, Authenticator, Credentials, HealthRes, PatientBody, PatientInput,
    ReadingBody, ReadingInput, API_KEY_HEADER,
};
use axum::extract::{Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, put};
use axum::Router;
use sencare_core::PatientStore;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Application state for the REST API server
///
/// Contains shared state that needs to be accessible to all request handlers: the store
/// requests are served from and, when configured, the authenticator guarding `/patients`.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn PatientStore>,
    auth: Option<Arc<dyn Authenticator>>,
}

impl AppState {
    pub fn new(store: Arc<dyn PatientStore>) -> Self {
        Self { store, auth: None }
    }

    /// Requires every `/patients` request to carry `key` in the `x-api-key` header.
    pub fn with_api_key(self, key: impl Into<String>) -> Self {
        self.with_authenticator(Arc::new(ApiKeyAuthenticator::new(key)))
    }

    pub fn with_authenticator(mut self, auth: Arc<dyn Authenticator>) -> Self {
        self.auth = Some(auth);
        self
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::list_patients,
        handlers::create_patient,
        handlers::get_patient,
        handlers::update_patient,
        handlers::delete_patient,
        handlers::list_readings,
        handlers::create_reading,
        handlers::update_reading,
        handlers::delete_reading,
    ),
    components(schemas(HealthRes, PatientBody, PatientInput, ReadingBody, ReadingInput))
)]
pub struct ApiDoc;

async fn require_credentials(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(auth) = &state.auth {
        let credentials = Credentials {
            api_key: request
                .headers()
                .get(API_KEY_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned),
        };
        if let Err(e) = auth.authenticate(&credentials) {
            tracing::warn!("rejected {} {}: {}", request.method(), request.uri().path(), e);
            return Err(e.into());
        }
    }
    Ok(next.run(request).await)
}

/// Builds the application router with every route, the docs and CORS.
pub fn router(state: AppState) -> Router {
    let patients = Router::new()
        .route(
            "/patients",
            get(handlers::list_patients).post(handlers::create_patient),
        )
        .route(
            "/patients/:pid",
            get(handlers::get_patient)
                .put(handlers::update_patient)
                .delete(handlers::delete_patient),
        )
        .route(
            "/patients/:pid/clinical-data",
            get(handlers::list_readings).post(handlers::create_reading),
        )
        .route(
            "/patients/:pid/clinical-data/:rid",
            put(handlers::update_reading).delete(handlers::delete_reading),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_credentials,
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .merge(patients)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serves the API on an already bound listener until the server fails.
///
/// # Errors
/// Returns an error if the HTTP server fails while running.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("-- SenCare REST API listening on {}", addr);
    }
    axum::serve(listener, router(state)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Method, StatusCode};
    use http_body_util::BodyExt;
    use sencare_core::MemoryStore;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        router(AppState::new(Arc::new(MemoryStore::new())))
    }

    async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = axum::http::Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let response = app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .expect("router should respond");
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("response should be JSON")
        };
        (status, value)
    }

    fn jane() -> Value {
        json!({"name": "Jane Doe", "age": 67, "contact": "555-0100", "condition": "Normal"})
    }

    #[tokio::test]
    async fn test_health_is_open() {
        let app = router(AppState::new(Arc::new(MemoryStore::new())).with_api_key("k"));
        let (status, body) = call(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn test_patient_lifecycle() {
        let app = app();

        let (status, created) = call(&app, Method::POST, "/patients", Some(jane())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["status"], "success");
        let pid = created["data"]["id"].as_str().unwrap().to_owned();

        let (status, listed) = call(&app, Method::GET, "/patients", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed["data"].as_array().unwrap().len(), 1);

        let mut edited = jane();
        edited["condition"] = json!("Critical");
        let (status, updated) =
            call(&app, Method::PUT, &format!("/patients/{pid}"), Some(edited)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["data"]["condition"], "Critical");
        assert_eq!(updated["data"]["id"], pid.as_str());

        let (status, deleted) = call(&app, Method::DELETE, &format!("/patients/{pid}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(deleted, json!({"status": "success"}));

        let (status, missing) = call(&app, Method::GET, &format!("/patients/{pid}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(missing["status"], "error");
    }

    #[tokio::test]
    async fn test_reading_routes() {
        let app = app();
        let (_, created) = call(&app, Method::POST, "/patients", Some(jane())).await;
        let pid = created["data"]["id"].as_str().unwrap().to_owned();
        let readings = format!("/patients/{pid}/clinical-data");

        let (status, reading) = call(
            &app,
            Method::POST,
            &readings,
            Some(json!({"date": "2024-10-01", "type": "Heart Rate", "value": "140", "condition": "Critical"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(reading["data"]["type"], "Heart Rate");
        assert_eq!(reading["data"]["value"], 140.0);
        let rid = reading["data"]["id"].as_str().unwrap().to_owned();

        let (status, replaced) = call(
            &app,
            Method::PUT,
            &format!("{readings}/{rid}"),
            Some(json!({"date": "2024-10-02", "type": "Heart Rate", "value": 72, "condition": "Normal"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(replaced["data"]["id"], rid.as_str());
        assert_eq!(replaced["data"]["date"], "2024-10-02");

        let (_, listed) = call(&app, Method::GET, &readings, None).await;
        assert_eq!(listed["data"].as_array().unwrap().len(), 1);

        let (status, _) = call(&app, Method::DELETE, &format!("{readings}/{rid}"), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = call(&app, Method::DELETE, &format!("{readings}/{rid}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_bodies_are_bad_requests() {
        let app = app();

        let (status, body) = call(
            &app,
            Method::POST,
            "/patients",
            Some(json!({"name": "Jane", "age": "old", "contact": "x", "condition": "Normal"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");

        let (status, _) = call(
            &app,
            Method::POST,
            "/patients",
            Some(json!({"name": " ", "age": 3, "contact": "x", "condition": "Normal"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, created) = call(&app, Method::POST, "/patients", Some(jane())).await;
        let pid = created["data"]["id"].as_str().unwrap().to_owned();
        let (status, _) = call(
            &app,
            Method::POST,
            &format!("/patients/{pid}/clinical-data"),
            Some(json!({"date": "2024-10-01", "type": "Blood Pressure", "value": 120, "condition": "Normal"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_api_key_guards_patient_routes() {
        let app = router(AppState::new(Arc::new(MemoryStore::new())).with_api_key("s3cret"));

        let (status, body) = call(&app, Method::GET, "/patients", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["status"], "error");

        let request = axum::http::Request::builder()
            .uri("/patients")
            .header(API_KEY_HEADER, "s3cret")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let request = axum::http::Request::builder()
            .uri("/patients")
            .header(API_KEY_HEADER, "wrong")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
