//! HTTP server exposing the ability registry.
//!
//! Every ability is reachable over a plain JSON API and over MCP Streamable
//! HTTP, both backed by the same [`AbilityRegistry`] and [`InsightsContext`].
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Version and analytics availability |
//! | `GET`  | `/abilities/list` | All abilities with schemas |
//! | `GET`  | `/abilities/categories` | Registered ability categories |
//! | `POST` | `/abilities/{namespace}/{name}` | Run an ability |
//! | `*`    | `/mcp` | MCP Streamable HTTP endpoint |
//!
//! # Authentication
//!
//! Callers send `Authorization: Bearer <token>`. Tokens are matched by
//! SHA-256 against `[[auth.users]]`; anything else runs as the anonymous
//! caller and is refused with 403.
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "analytics_unavailable", "message": "..." } }
//! ```
//!
//! Codes: `invalid_input` (400), `forbidden` (403), `not_found` (404),
//! `internal` (500), `backend_error` (502), `analytics_unavailable` and
//! `analytics_required` (503).

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use rmcp::transport::streamable_http_server::{
    session::local::LocalSessionManager, StreamableHttpServerConfig, StreamableHttpService,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::analytics::AnalyticsStatus;
use crate::auth::{bearer_token, resolve_caller, Caller};
use crate::config::{AuthConfig, Config};
use crate::context::InsightsContext;
use crate::error::AbilityError;
use crate::mcp::McpBridge;
use crate::traits::{AbilityInfo, AbilityRegistry};

#[derive(Clone)]
struct AppState {
    ctx: Arc<InsightsContext>,
    abilities: Arc<AbilityRegistry>,
    auth: Arc<AuthConfig>,
}

/// Start the server on `[server].bind` with the configured backends.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let ctx = Arc::new(InsightsContext::from_config(config).await?);
    let abilities = Arc::new(AbilityRegistry::with_builtins(&config.auth.capability));
    run_server_with_context(config, ctx, abilities).await
}

/// Start the server with a caller-supplied context and registry.
pub async fn run_server_with_context(
    config: &Config,
    ctx: Arc<InsightsContext>,
    abilities: Arc<AbilityRegistry>,
) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();

    println!("Registered {} abilities:", abilities.len());
    for r in abilities.registrations() {
        println!(
            "  POST /abilities/{} ({}) requires {}",
            r.ability().name(),
            r.ability().label(),
            r.capability()
        );
    }

    let status = AnalyticsStatus::of(ctx.analytics.as_ref());
    if !status.available() {
        tracing::warn!(
            connected = status.connected,
            stats_capability = status.stats_capability,
            "analytics unavailable; analytics-backed abilities will return 503"
        );
    }

    let app = router(ctx, abilities, Arc::new(config.auth.clone()));

    println!("Editorial Insights listening on http://{}", bind_addr);
    tracing::info!(bind = %bind_addr, "server started");

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the full router: JSON routes plus the MCP service under `/mcp`.
pub fn router(
    ctx: Arc<InsightsContext>,
    abilities: Arc<AbilityRegistry>,
    auth: Arc<AuthConfig>,
) -> Router {
    let bridge = McpBridge::new(ctx.clone(), abilities.clone(), auth.clone());
    let mcp_service = StreamableHttpService::new(
        move || Ok(bridge.clone()),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig::default(),
    );

    let state = AppState {
        ctx,
        abilities,
        auth,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/abilities/list", get(handle_list_abilities))
        .route("/abilities/categories", get(handle_categories))
        .route("/abilities/{namespace}/{name}", post(handle_ability_call))
        .nest_service("/mcp", mcp_service)
        .layer(cors)
        .with_state(state)
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<AbilityError> for AppError {
    fn from(err: AbilityError) -> Self {
        AppError {
            status: StatusCode::from_u16(err.status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

fn request_caller(auth: &AuthConfig, headers: &HeaderMap) -> Caller {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token);
    resolve_caller(auth, token)
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    analytics: AnalyticsStatus,
}

async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        analytics: AnalyticsStatus::of(state.ctx.analytics.as_ref()),
    })
}

// ============ GET /abilities/list ============

#[derive(Serialize)]
struct AbilityListResponse {
    abilities: Vec<AbilityInfo>,
}

async fn handle_list_abilities(State(state): State<AppState>) -> Json<AbilityListResponse> {
    let abilities = state
        .abilities
        .registrations()
        .iter()
        .map(|r| r.describe())
        .collect();
    Json(AbilityListResponse { abilities })
}

// ============ GET /abilities/categories ============

#[derive(Serialize)]
struct CategoryListResponse {
    categories: Vec<String>,
}

async fn handle_categories(State(state): State<AppState>) -> Json<CategoryListResponse> {
    let categories = state
        .abilities
        .categories()
        .into_iter()
        .map(str::to_string)
        .collect();
    Json(CategoryListResponse { categories })
}

// ============ POST /abilities/{namespace}/{name} ============

/// Run an ability. The body is the input object; an empty body means `{}`.
async fn handle_ability_call(
    State(state): State<AppState>,
    Path((namespace, name)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let full_name = format!("{}/{}", namespace, name);

    let input: Option<Value> = if body.iter().all(u8::is_ascii_whitespace) {
        None
    } else {
        Some(serde_json::from_slice(&body).map_err(|e| AppError {
            status: StatusCode::BAD_REQUEST,
            code: "invalid_input".to_string(),
            message: format!("request body is not valid JSON: {}", e),
        })?)
    };

    let caller = request_caller(&state.auth, &headers);
    let result = state
        .abilities
        .invoke(&full_name, input.as_ref(), &caller, &state.ctx)
        .await?;

    Ok(Json(serde_json::json!({ "result": result })))
}
