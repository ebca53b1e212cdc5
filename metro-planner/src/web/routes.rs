//! HTTP route handlers.

use axum::body::Bytes;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::de::DeserializeOwned;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, warn};

use crate::cache::RouteError;
use crate::domain::StationId;
use crate::network::StationRegistry;
use crate::planner::{Itinerary, PlanError, Strategy};

use super::dto::*;
use super::state::{AppState, ReloadError};

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/stations", get(list_stations))
        .route("/api/stations/search", get(search_stations))
        .route("/api/lines", get(list_lines))
        .route("/api/route", post(plan_route))
        .route("/api/route/all", post(plan_all_routes))
        .route("/api/network/reload", post(reload_network))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// All stations in build order.
async fn list_stations(State(state): State<AppState>) -> Json<StationListResponse> {
    let snapshot = state.network.snapshot().await;
    let stations = snapshot
        .registry
        .iter()
        .map(StationResult::from_station)
        .collect();

    Json(StationListResponse {
        generation: snapshot.generation,
        loaded_at: snapshot.loaded_at,
        stations,
    })
}

/// Search stations by name.
async fn search_stations(
    State(state): State<AppState>,
    Query(req): Query<StationSearchRequest>,
) -> Json<Vec<StationResult>> {
    let limit = req.limit.unwrap_or(10).min(50);
    let snapshot = state.network.snapshot().await;

    Json(
        snapshot
            .registry
            .search(&req.q, limit)
            .into_iter()
            .map(StationResult::from_station)
            .collect(),
    )
}

async fn list_lines(State(state): State<AppState>) -> Json<LinesResponse> {
    let snapshot = state.network.snapshot().await;
    Json(LinesResponse {
        generation: snapshot.generation,
        lines: snapshot
            .registry
            .lines()
            .iter()
            .map(LineResult::from_line)
            .collect(),
    })
}

/// Plan a route under one strategy.
async fn plan_route(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<RouteResponse>, AppError> {
    let req: RouteRequest = parse_body(&body)?;
    let strategy = req.strategy.unwrap_or(Strategy::FewestTransfers);

    let snapshot = state.network.snapshot().await;
    let from = resolve_station(&snapshot.registry, &req.from)?;
    let to = resolve_station(&snapshot.registry, &req.to)?;

    let found = state
        .routes
        .plan(snapshot.clone(), &from.id, &to.id, strategy)
        .await?;
    let route = (*found)
        .clone()
        .map(|itinerary| RouteResult::from_itinerary(itinerary, &snapshot.registry));

    Ok(Json(RouteResponse {
        from: from.view,
        to: to.view,
        strategy,
        route,
    }))
}

/// Plan a route under every strategy.
async fn plan_all_routes(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<RouteAllResponse>, AppError> {
    let req: RouteAllRequest = parse_body(&body)?;

    let snapshot = state.network.snapshot().await;
    let from = resolve_station(&snapshot.registry, &req.from)?;
    let to = resolve_station(&snapshot.registry, &req.to)?;

    let results = state
        .routes
        .plan_all(snapshot.clone(), &from.id, &to.id)
        .await?;
    let view = |found: Option<Itinerary>| {
        found.map(|itinerary| RouteResult::from_itinerary(itinerary, &snapshot.registry))
    };

    Ok(Json(RouteAllResponse {
        from: from.view,
        to: to.view,
        fewest_transfers: view(results.fewest_transfers),
        fewest_stops: view(results.fewest_stops),
        shortest_distance: view(results.shortest_distance),
    }))
}

/// Re-read the network from its source.
async fn reload_network(State(state): State<AppState>) -> Result<Json<ReloadResponse>, AppError> {
    let reloaded = state.reload().await?;
    Ok(Json(ReloadResponse {
        generation: reloaded.generation,
        stations: reloaded.stations,
        lines: reloaded.lines,
    }))
}

/// Parse a JSON body, logging the raw body when it is malformed.
fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|e| {
        debug!(error = %e, body = %String::from_utf8_lossy(body), "rejected request body");
        AppError::BadRequest {
            message: format!("Invalid JSON: {e}"),
        }
    })
}

struct Resolved {
    id: StationId,
    view: StationRef,
}

/// Resolve user input to a station: an exact id first, then a name.
fn resolve_station(registry: &StationRegistry, input: &str) -> Result<Resolved, AppError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(AppError::BadRequest {
            message: "station must not be empty".to_string(),
        });
    }

    let station = StationId::parse(input)
        .ok()
        .and_then(|id| registry.get(&id))
        .or_else(|| registry.name_to_id(input).and_then(|id| registry.get(id)))
        .ok_or_else(|| AppError::NotFound {
            message: format!("unknown station: {input}"),
        })?;

    Ok(Resolved {
        id: station.id().clone(),
        view: StationRef {
            id: station.id().to_string(),
            name: station.name().to_string(),
        },
    })
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    BadGateway { message: String },
    Internal { message: String },
}

impl From<RouteError> for AppError {
    fn from(e: RouteError) -> Self {
        match e {
            RouteError::Plan(PlanError::UnknownStation(_)) => AppError::NotFound {
                message: e.to_string(),
            },
            RouteError::Task(_) => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl From<ReloadError> for AppError {
    fn from(e: ReloadError) -> Self {
        match e {
            // Both mean the upstream data could not be used
            ReloadError::Source(_) | ReloadError::Network(_) => AppError::BadGateway {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::BadGateway { message } => (StatusCode::BAD_GATEWAY, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, %message, "request failed");
        } else {
            warn!(%status, %message, "request rejected");
        }

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
