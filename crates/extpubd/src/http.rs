//! HTTP API for the external publishing system
//!
//! Axum-based server providing the two operations an admin UI needs:
//! - listing enabled providers with their publish-options schemas
//! - triggering one publish attempt
//!
//! plus the static admin-bar declaration and a health endpoint.
//!
//! Internal failures are converted into a generic `publishing-failed`
//! error carrying only the underlying message, never stack detail.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use extpub_core::schema::OptionsSchema;
use extpub_core::{ProviderRegistry, PublishCoordinator, RequestContext};

/// HTTP server for the publishing API
pub struct HttpServer {
    coordinator: PublishCoordinator,
}

impl HttpServer {
    /// Create a new HTTP server around a wired coordinator
    pub fn new(coordinator: PublishCoordinator) -> Self {
        Self { coordinator }
    }

    /// Build the Axum router
    pub fn router(&self) -> Router {
        let state = AppState {
            registry: Arc::clone(self.coordinator.registry()),
            coordinator: self.coordinator.clone(),
        };

        Router::new()
            .route("/health", get(health_handler))
            .route("/api/v1/providers", get(list_providers))
            .route("/api/v1/publish", post(publish_handler))
            .route("/api/v1/admin-bar", get(admin_bar_handler))
            .with_state(state)
    }

    /// Run the HTTP server until the shutdown future resolves
    pub async fn run(
        self,
        addr: SocketAddr,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> anyhow::Result<()> {
        let router = self.router();

        tracing::info!("HTTP server listening on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown.await;
                tracing::info!("HTTP server shutting down");
            })
            .await?;

        Ok(())
    }
}

/// Shared application state
#[derive(Clone)]
struct AppState {
    registry: Arc<ProviderRegistry>,
    coordinator: PublishCoordinator,
}

/// Error payload returned to API clients
#[derive(Debug, Serialize)]
struct ApiError {
    error: &'static str,
    message: String,
}

impl ApiError {
    fn invalid(message: impl Into<String>) -> (StatusCode, Json<ApiError>) {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: "invalid",
                message: message.into(),
            }),
        )
    }

    fn publishing_failed(message: impl Into<String>) -> (StatusCode, Json<ApiError>) {
        (
            StatusCode::BAD_GATEWAY,
            Json(ApiError {
                error: "publishing-failed",
                message: message.into(),
            }),
        )
    }
}

// ============================================================================
// Handlers
// ============================================================================

async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "providers": state.registry.len(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// One entry in the providers listing
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProviderInfo {
    name: String,
    label: String,
    publish_options: OptionsSchema,
}

/// GET /api/v1/providers
///
/// Every enabled provider, in registration order.
async fn list_providers(State(state): State<AppState>) -> Json<Vec<ProviderInfo>> {
    let providers = state
        .registry
        .providers()
        .into_iter()
        .map(|descriptor| ProviderInfo {
            name: descriptor.name().to_string(),
            label: descriptor.label().to_string(),
            publish_options: descriptor.provider().publish_options(),
        })
        .collect();

    Json(providers)
}

/// Body of POST /api/v1/publish
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublishRequest {
    provider_name: Option<String>,
    doc_id: Option<String>,
    #[serde(default)]
    options: Option<Value>,
}

/// POST /api/v1/publish
///
/// Delegates to the coordinator and returns the provider's raw result on
/// success.
async fn publish_handler(
    State(state): State<AppState>,
    Json(body): Json<PublishRequest>,
) -> Response {
    let (Some(provider_name), Some(doc_id)) = (body.provider_name, body.doc_id) else {
        return ApiError::invalid("providerName and docId are required").into_response();
    };

    let ctx = RequestContext::new(uuid::Uuid::new_v4().to_string());
    let options = body.options.unwrap_or_else(|| json!({}));

    match state
        .coordinator
        .publish(&ctx, &provider_name, &doc_id, &options)
        .await
    {
        Ok(outcome) => Json(outcome).into_response(),
        Err(e) => ApiError::publishing_failed(e.to_string()).into_response(),
    }
}

/// GET /api/v1/admin-bar
///
/// The static "Publish Externally" affordance for the host UI shell.
async fn admin_bar_handler() -> Json<extpub_core::admin::AdminAction> {
    Json(extpub_core::admin::publish_action())
}

#[cfg(all(test, feature = "devto"))]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, header};
    use extpub_core::traits::DocumentStore;
    use extpub_core::{Document, MemoryDocumentStore, ProviderDescriptor};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn test_router() -> (Router, MemoryDocumentStore) {
        let registry = Arc::new(ProviderRegistry::new());
        registry.register(ProviderDescriptor::new(Arc::new(
            extpub_provider_devto::DevtoProvider::new_dry_run(Some("k".to_string()), None),
        )));

        let store = MemoryDocumentStore::new();
        store
            .insert(Document::new("doc-1", "A Post"))
            .await
            .unwrap();

        let coordinator = PublishCoordinator::new(registry, Arc::new(store.clone()));
        (HttpServer::new(coordinator).router(), store)
    }

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_list_providers() {
        let (router, _) = test_router().await;

        let response = router
            .oneshot(Request::builder().uri("/api/v1/providers").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let providers = json.as_array().unwrap();
        assert_eq!(providers.len(), 1);
        assert_eq!(providers[0]["name"], "devto");
        assert_eq!(providers[0]["label"], "DEV.to");
        assert!(providers[0]["publishOptions"]["fields"].is_array());
    }

    #[tokio::test]
    async fn test_publish_requires_provider_and_doc() {
        let (router, _) = test_router().await;

        let response = router
            .oneshot(post_json(
                "/api/v1/publish",
                json!({ "docId": "doc-1" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "invalid");
    }

    #[tokio::test]
    async fn test_publish_success_appends_record() {
        let (router, store) = test_router().await;

        let response = router
            .oneshot(post_json(
                "/api/v1/publish",
                json!({
                    "providerName": "devto",
                    "docId": "doc-1",
                    "options": { "title": "T", "published": false }
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "draft");

        let ctx = RequestContext::new("check");
        let doc = store.find(&ctx, "doc-1").await.unwrap().unwrap();
        assert_eq!(doc.external_publications.len(), 1);
        assert_eq!(doc.external_publications[0].provider, "devto");
    }

    #[tokio::test]
    async fn test_publish_unknown_provider_maps_to_publishing_failed() {
        let (router, _) = test_router().await;

        let response = router
            .oneshot(post_json(
                "/api/v1/publish",
                json!({ "providerName": "nope", "docId": "doc-1" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let json = body_json(response).await;
        assert_eq!(json["error"], "publishing-failed");
        assert!(json["message"].as_str().unwrap().contains("nope"));
    }

    #[tokio::test]
    async fn test_publish_missing_document_maps_to_publishing_failed() {
        let (router, _) = test_router().await;

        let response = router
            .oneshot(post_json(
                "/api/v1/publish",
                json!({ "providerName": "devto", "docId": "missing-id" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let json = body_json(response).await;
        assert_eq!(json["error"], "publishing-failed");
    }

    #[tokio::test]
    async fn test_admin_bar_declaration() {
        let (router, _) = test_router().await;

        let response = router
            .oneshot(Request::builder().uri("/api/v1/admin-bar").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["name"], "externalPublish");
        assert_eq!(json["tooltip"], "Publish Externally");
    }

    #[tokio::test]
    async fn test_health() {
        let (router, _) = test_router().await;

        let response = router
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["providers"], 1);
    }
}
