//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use futures::stream::{self, Stream};
use tracing::{debug, error, info};

use crate::state::{AppState, TimerSnapshot};
use super::responses::{ActionResponse, HealthResponse, InitialSecondsRequest, StatusResponse};

fn action_response(
    action: &str,
    result: Result<TimerSnapshot, String>,
) -> Result<Json<ActionResponse>, StatusCode> {
    match result {
        Ok(timer) => {
            info!("{} endpoint called - {} seconds shown", action, timer.seconds);
            let message = format!("Timer {} handled", action);
            Ok(Json(ActionResponse::new(message, timer)))
        }
        Err(e) => {
            error!("Failed to {} timer: {}", action, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /start - Start or resume the countdown
pub async fn start_handler(State(state): State<Arc<AppState>>) -> Result<Json<ActionResponse>, StatusCode> {
    action_response("start", state.start())
}

/// Handle POST /stop - Pause the countdown
pub async fn stop_handler(State(state): State<Arc<AppState>>) -> Result<Json<ActionResponse>, StatusCode> {
    action_response("stop", state.stop())
}

/// Handle POST /reset - Restore the initial seconds while idle
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> Result<Json<ActionResponse>, StatusCode> {
    action_response("reset", state.reset())
}

/// Handle PUT /initial-seconds - Set the countdown budget
pub async fn initial_seconds_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<InitialSecondsRequest>,
) -> Result<Json<ActionResponse>, StatusCode> {
    action_response("set-initial-seconds", state.set_initial_seconds(request.seconds))
}

/// Handle GET /status - Return current timer and server status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, StatusCode> {
    let timer = match state.timer.snapshot() {
        Ok(t) => t,
        Err(e) => {
            error!("Failed to get timer state: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let expirations = match state.get_expirations() {
        Ok(log) => log,
        Err(e) => {
            error!("Failed to get expirations: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timer,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
        expirations: expirations.count,
        last_expired_at: expirations.last_expired_at,
    }))
}

/// Handle GET /events - Stream a snapshot on connect and after every change
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    debug!("Events subscriber connected");
    let updates = state.timer.subscribe();

    let events = stream::unfold((updates, true), |(mut updates, first)| async move {
        if !first && updates.changed().await.is_err() {
            return None;
        }
        let snapshot = updates.borrow_and_update().clone();
        Some((Event::default().event("timer").json_data(&snapshot), (updates, false)))
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
