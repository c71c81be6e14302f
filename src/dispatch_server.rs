//! The HTTP surface exposing [`crate::scheduler::Scheduler`] state to
//! workers and operators. Router construction lives here (rather than in
//! the coordinator binary) so it can be exercised directly in integration
//! tests against a real bound listener.
use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router, debug_handler};
use thiserror::Error;
use tokio::sync::Notify;

use crate::scheduler::Scheduler;
use crate::{Constants, CycleId, DoneList, NotifyBuild, Pkgname};

pub type ResponseResult<T> = std::result::Result<T, ResponseError>;

#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("malformed notifybuild request: {0}")]
    DispatchProtocol(&'static str),
    #[error("status {0} is not a recognized build outcome")]
    UnrecognizedStatus(i32),
}

impl IntoResponse for ResponseError {
    fn into_response(self) -> Response {
        tracing::warn!("{self:?}");
        let status = match self {
            ResponseError::DispatchProtocol(_) => StatusCode::BAD_REQUEST,
            ResponseError::UnrecognizedStatus(_) => StatusCode::NOT_ACCEPTABLE,
        };
        (status, self.to_string()).into_response()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub scheduler: Arc<Scheduler>,
    pub package_to_cycle: Arc<HashMap<Pkgname, CycleId>>,
    pub constants: Arc<Constants>,
    pub shutdown: Arc<Notify>,
}

/// Next eligible package as plain text (200), or an empty 204 when none is
/// available. A 204 observed while the scheduler is fully complete triggers
/// the graceful shutdown.
#[debug_handler]
pub async fn get_package(State(state): State<AppState>) -> Response {
    match state.scheduler.next_package() {
        Some(package) => {
            tracing::info!(%package, "dispatched");
            (StatusCode::OK, package.to_string()).into_response()
        }
        None => {
            if state.scheduler.is_complete() {
                state.scheduler.log_if_stuck();
                tracing::info!(states = %state.scheduler.summary_line(), "build complete, initiating shutdown");
                state.shutdown.notify_one();
            }
            StatusCode::NO_CONTENT.into_response()
        }
    }
}

#[debug_handler]
pub async fn notify_build(
    State(state): State<AppState>,
    body: Option<Json<NotifyBuild>>,
) -> ResponseResult<StatusCode> {
    let Json(notify) = body.ok_or(ResponseError::DispatchProtocol(
        "missing or malformed package/status fields",
    ))?;

    match notify.status {
        0 => {
            state.scheduler.notify_success(&notify.package);
            Ok(StatusCode::OK)
        }
        -1 => {
            state.scheduler.notify_failure(&notify.package);
            Ok(StatusCode::OK)
        }
        other => Err(ResponseError::UnrecognizedStatus(other)),
    }
}

#[debug_handler]
pub async fn done_list(State(state): State<AppState>) -> Json<DoneList> {
    Json(DoneList {
        packages: state.scheduler.done_list(),
    })
}

#[debug_handler]
pub async fn map_package_to_cycle(State(state): State<AppState>) -> Json<HashMap<Pkgname, CycleId>> {
    Json((*state.package_to_cycle).clone())
}

#[debug_handler]
pub async fn constants(State(state): State<AppState>) -> Json<Constants> {
    Json((*state.constants).clone())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/package/", get(get_package))
        .route("/notifybuild/", post(notify_build))
        .route("/donelist/", get(done_list))
        .route("/mappackagetocycle/", get(map_package_to_cycle))
        .route("/constants/", get(constants))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}
