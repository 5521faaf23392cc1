//! Request router: one HTTP route per registry operation, plus the landing
//! page and documentation endpoints.
//!
//! Per request: validate the operation's declared fields, build the input
//! bundle, invoke the execution adapter, then either answer with a single
//! JSON object or hand the token channel to the streaming bridge.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, on, MethodFilter};
use axum::{Json, Router};
use serde_json::Value;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa::openapi::OpenApi;
use uuid::Uuid;

use crate::error::ApiError;
use crate::provider::{self, ExecutionResult, TextGenerator};
use crate::registry::{Operation, Registry};
use crate::server::access_log::{self, AccessLog};
use crate::server::limit::RateLimiter;
use crate::server::{openapi, pages, streaming, validate};

/// Application state shared across handlers.
pub struct AppState {
    pub registry: Registry,
    pub generator: Arc<dyn TextGenerator>,
    pub limiter: RateLimiter,
    pub access_log: Arc<AccessLog>,
    pub openapi: OpenApi,
}

/// Build the axum router: registry routes, landing page, documentation,
/// and the middleware stack (rate limit, access log, trace, CORS, panics).
pub fn build_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .route("/", get(pages::index))
        .route("/api-docs", get(openapi::swagger_ui))
        .route("/api-docs/openapi.json", get(serve_openapi));

    for operation in state.registry.operations() {
        let filter =
            MethodFilter::try_from(operation.method.clone()).unwrap_or(MethodFilter::POST);
        let operation = Arc::new(operation.clone());
        router = router.route(
            operation.route,
            on(filter, move |state: State<Arc<AppState>>, body: Bytes| {
                let operation = operation.clone();
                async move { run_operation(state, operation, body).await }
            }),
        );
    }

    router
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit))
        .layer(middleware::from_fn_with_state(
            state.access_log.clone(),
            access_log::log_request,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(CatchPanicLayer::new())
        .with_state(state)
}

/// Validate, execute, and answer one operation request.
async fn run_operation(
    State(state): State<Arc<AppState>>,
    operation: Arc<Operation>,
    body: Bytes,
) -> Result<Response, ApiError> {
    // A body that is not a JSON object fails validation for every field.
    let body: Option<Value> = serde_json::from_slice(&body).ok();

    let input = validate::sanitize(body.as_ref(), operation.input_variables)
        .map_err(ApiError::Validation)?;

    let request_id = Uuid::new_v4();
    info!(
        request_id = %request_id,
        operation = operation.id,
        streaming = operation.execution.is_streaming(),
        "Executing operation"
    );

    match provider::execute(&operation, &input, state.generator.as_ref()).await? {
        ExecutionResult::Text(text) => {
            Ok(Json(serde_json::json!({ "text": text })).into_response())
        }
        ExecutionResult::Stream(rx) => Ok(streaming::ndjson_response(rx)),
    }
}

/// Reject clients over their request budget before any other work happens.
async fn rate_limit(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

    if state.limiter.check(client) {
        next.run(request).await
    } else {
        ApiError::RateLimited.into_response()
    }
}

async fn serve_openapi(State(state): State<Arc<AppState>>) -> Json<OpenApi> {
    Json(state.openapi.clone())
}

/// Convenience constructor used by the binary and integration tests.
pub fn app_state(
    registry: Registry,
    generator: Arc<dyn TextGenerator>,
    limiter: RateLimiter,
    access_log: AccessLog,
) -> Arc<AppState> {
    let openapi = openapi::synthesize(&registry);
    Arc::new(AppState {
        registry,
        generator,
        limiter,
        access_log: Arc::new(access_log),
        openapi,
    })
}
