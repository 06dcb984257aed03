//! HTTP route definitions

use std::time::Duration;

use axum::{
    extract::State,
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{debug, warn};

use crate::app::AppState;
use crate::game::{Action, EngineError};
use crate::http::protocol::{ActionRequest, GameResponse};
use crate::util::time::{is_expired, unix_secs, uptime_secs};

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.client_origin);
    let timeout = Duration::from_secs(state.config.request_timeout_secs);

    Router::new()
        .route("/health", get(health_handler))
        .route("/game/new", post(new_game_handler))
        .route("/game/action", post(action_handler))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// CORS from a comma-separated origin list, `*` meaning any origin
fn cors_layer(client_origin: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    if client_origin.trim() == "*" {
        return cors.allow_origin(Any);
    }

    let allowed_origins: Vec<header::HeaderValue> = client_origin
        .split(',')
        .filter_map(|s| s.trim().parse::<header::HeaderValue>().ok())
        .collect();
    cors.allow_origin(allowed_origins)
}

// ============================================================================
// Health endpoint
// ============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    games_started: u64,
    turns_served: u64,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: uptime_secs(),
        games_started: state.stats.games_started(),
        turns_served: state.stats.turns_served(),
    })
}

// ============================================================================
// Game endpoints
// ============================================================================

async fn new_game_handler(State(state): State<AppState>) -> Result<Json<GameResponse>, AppError> {
    let outcome = state.engine.new_game(rand::random(), unix_secs())?;
    state.stats.record_game();
    Ok(Json(outcome.into()))
}

async fn action_handler(
    State(state): State<AppState>,
    Json(req): Json<ActionRequest>,
) -> Result<Json<GameResponse>, AppError> {
    if state.action_limiter.check().is_err() {
        return Err(AppError::RateLimited);
    }

    let (action, token) = Action::parse_button_id(&req.custom_id)
        .ok_or_else(|| AppError::BadRequest("Unrecognised button".to_string()))?;

    let game = state.engine.decode(token).map_err(|e| {
        warn!(error = %e, "Rejected session token");
        AppError::CorruptedSession(e.to_string())
    })?;

    let now = unix_secs();
    if is_expired(game.last_interaction, now, state.config.idle_timeout_secs) {
        debug!(last_interaction = game.last_interaction, now, "Session expired");
        return Err(AppError::Expired);
    }

    let outcome = state.engine.advance(game, action, now)?;
    state.stats.record_turn();
    Ok(Json(outcome.into()))
}

// ============================================================================
// Error handling
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Corrupted session: {0}")]
    CorruptedSession(String),

    #[error("Session expired. Start a new game.")]
    Expired,

    #[error("Too many requests")]
    RateLimited,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Decode(e) => AppError::CorruptedSession(e.to_string()),
            EngineError::Encode(e) => {
                warn!(error = %e, "State did not fit in a session token");
                AppError::Internal(e.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) | AppError::CorruptedSession(_) => StatusCode::BAD_REQUEST,
            AppError::Expired => StatusCode::GONE,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = serde_json::json!({
            "error": self.to_string()
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::game::token::{self, TOKEN_CEILING};
    use crate::game::{GridMap, Phase};

    fn app_with(config: Config) -> (Router, AppState) {
        let state = AppState::new(config, GridMap::builtin().unwrap());
        (build_router(state.clone()), state)
    }

    fn app() -> Router {
        app_with(Config::default()).0
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn new_game() -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/game/new")
            .body(Body::empty())
            .unwrap()
    }

    fn action(custom_id: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/game/action")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                serde_json::json!({ "custom_id": custom_id }).to_string(),
            ))
            .unwrap()
    }

    fn button<'a>(body: &'a Value, label: &str) -> &'a str {
        body["buttons"]
            .as_array()
            .unwrap()
            .iter()
            .find(|b| b["label"] == label)
            .and_then(|b| b["custom_id"].as_str())
            .unwrap()
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["games_started"], 0);
    }

    #[tokio::test]
    async fn new_game_offers_every_action_within_the_id_ceiling() {
        let (router, state) = app_with(Config::default());
        let (status, body) = send(router, new_game()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["phase"], "active");
        assert_eq!(body["health"], 100);
        assert_eq!(state.stats.games_started(), 1);

        let buttons = body["buttons"].as_array().unwrap();
        assert_eq!(buttons.len(), Action::BUTTONS.len());
        for b in buttons {
            let id = b["custom_id"].as_str().unwrap();
            assert!(id.starts_with("dg:"));
            assert!(id.len() <= TOKEN_CEILING, "{id}");
        }

        let view = body["view"].as_str().unwrap();
        assert_eq!(view.lines().count(), state.config.view.height);
    }

    #[tokio::test]
    async fn pressing_a_button_advances_the_game() {
        let (router, state) = app_with(Config::default());
        let (_, start) = send(router.clone(), new_game()).await;

        let (status, body) = send(router, action(button(&start, "Turn right"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "You turn right.");
        assert_ne!(body["token"], start["token"]);
        assert_eq!(state.stats.turns_served(), 1);
    }

    #[tokio::test]
    async fn foreign_buttons_are_bad_requests() {
        let (status, body) = send(app(), action("tetris:left:xyz")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("button"));
    }

    #[tokio::test]
    async fn corrupted_tokens_are_rejected() {
        let (status, body) = send(app(), action("dg:fw:1|2|3")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Corrupted session"));
    }

    #[tokio::test]
    async fn oversized_fields_are_corrupted_sessions() {
        let token = "1.50|1.50|0.000|100|0|0|0|99999999999.0|99999999999.0|65535|0|0.0|0.0|0|0|0.0|0.0|0|0|0|1760000000";
        let (status, body) = send(app(), action(&Action::Wait.button_id(token))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Corrupted session"));

        let token = format!("1.50|1.50|0.000|100|0|0|0|0.0|0.0|999|0|0.0|0.0|0|0|0.0|0.0|0|0|0|{}", unix_secs());
        let (status, _) = send(app(), action(&Action::Wait.button_id(&token))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn stale_sessions_expire() {
        let (router, state) = app_with(Config::default());
        let stale = state.engine.start_state(0, 1_000);
        let token = token::encode(&stale).unwrap();

        let (status, _) = send(router, action(&Action::Wait.button_id(&token))).await;
        assert_eq!(status, StatusCode::GONE);
    }

    #[tokio::test]
    async fn finished_games_offer_no_buttons() {
        let (router, state) = app_with(Config::default());
        let mut won = state.engine.start_state(0, unix_secs());
        won.phase = Phase::Won;
        let token = token::encode(&won).unwrap();

        let (status, body) = send(router, action(&Action::Shoot.button_id(&token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["phase"], "won");
        assert!(body["buttons"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn action_quota_is_enforced() {
        let config = Config {
            action_rate_limit: 1,
            ..Config::default()
        };
        let (router, _) = app_with(config);
        let (_, start) = send(router.clone(), new_game()).await;
        let id = button(&start, "Wait").to_string();

        let (first, _) = send(router.clone(), action(&id)).await;
        assert_eq!(first, StatusCode::OK);
        let (second, body) = send(router, action(&id)).await;
        assert_eq!(second, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["error"], "Too many requests");
    }
}
