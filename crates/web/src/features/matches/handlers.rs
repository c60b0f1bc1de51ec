use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use engine::{
    dto::matches::{
        CreateMatchRequest, MatchListQuery, MatchResponse, RecordFoulRequest,
        RecordOutcomeResponse, RecordScoreRequest, RecordWarningRequest, ScoreResponse,
    },
    models::{CornerColor, Match},
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;
use crate::state::AppState;

fn parse_color(raw: &str) -> Result<CornerColor, WebError> {
    CornerColor::parse(raw)
        .ok_or_else(|| WebError::BadRequest(format!("Unknown corner color '{}'", raw)))
}

fn respond(state: &AppState, m: &Match) -> Json<MatchResponse> {
    Json(MatchResponse::from_match(m, state.engine.clock().now()))
}

#[utoipa::path(
    get,
    path = "/api/matches",
    params(MatchListQuery),
    responses(
        (status = 200, description = "Matches matching the filter", body = Vec<MatchResponse>),
        (status = 400, description = "Unknown status")
    ),
    tag = "matches"
)]
pub async fn list_matches(
    State(state): State<AppState>,
    Query(query): Query<MatchListQuery>,
) -> Result<Json<Vec<MatchResponse>>, WebError> {
    let filter = query.to_filter().map_err(WebError::BadRequest)?;
    let matches = state.engine.registry.list_matches(&filter).await?;

    let now = state.engine.clock().now();
    let response = matches
        .iter()
        .map(|m| MatchResponse::from_match(m, now))
        .collect();

    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/matches/{id}",
    params(
        ("id" = Uuid, Path, description = "Match id")
    ),
    responses(
        (status = 200, description = "Match found", body = MatchResponse),
        (status = 404, description = "Match not found")
    ),
    tag = "matches"
)]
pub async fn get_match(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MatchResponse>, WebError> {
    let m = state.engine.registry.get_match(id).await?;

    Ok(respond(&state, &m))
}

#[utoipa::path(
    post,
    path = "/api/matches",
    request_body = CreateMatchRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Match created from a tanding schedule", body = MatchResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Schedule not found")
    ),
    tag = "matches"
)]
pub async fn create_match(
    State(state): State<AppState>,
    Json(req): Json<CreateMatchRequest>,
) -> Result<Response, WebError> {
    let m = state
        .engine
        .registry
        .create_match_from_schedule(req.schedule_id)
        .await?;

    Ok((StatusCode::CREATED, respond(&state, &m)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/matches/{id}/start",
    params(
        ("id" = Uuid, Path, description = "Match id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Match started", body = MatchResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Match not found"),
        (status = 409, description = "Match cannot be started from its current status")
    ),
    tag = "matches"
)]
pub async fn start_match(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MatchResponse>, WebError> {
    let m = state.engine.registry.start_match(id).await?;

    Ok(respond(&state, &m))
}

#[utoipa::path(
    post,
    path = "/api/matches/{id}/pause",
    params(
        ("id" = Uuid, Path, description = "Match id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Match paused", body = MatchResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Match not found"),
        (status = 409, description = "Match is not running")
    ),
    tag = "matches"
)]
pub async fn pause_match(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MatchResponse>, WebError> {
    let m = state.engine.registry.pause_match(id).await?;

    Ok(respond(&state, &m))
}

#[utoipa::path(
    post,
    path = "/api/matches/{id}/resume",
    params(
        ("id" = Uuid, Path, description = "Match id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Match resumed", body = MatchResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Match not found"),
        (status = 409, description = "Match is not paused")
    ),
    tag = "matches"
)]
pub async fn resume_match(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MatchResponse>, WebError> {
    let m = state.engine.registry.resume_match(id).await?;

    Ok(respond(&state, &m))
}

#[utoipa::path(
    post,
    path = "/api/matches/{id}/finish",
    params(
        ("id" = Uuid, Path, description = "Match id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Match finished, winner decided by score", body = MatchResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Match not found"),
        (status = 409, description = "Match is already finished")
    ),
    tag = "matches"
)]
pub async fn finish_match(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MatchResponse>, WebError> {
    let m = state.engine.registry.finish_match(id).await?;

    Ok(respond(&state, &m))
}

#[utoipa::path(
    post,
    path = "/api/matches/{id}/next-round",
    params(
        ("id" = Uuid, Path, description = "Match id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Next babak started", body = MatchResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Match not found"),
        (status = 409, description = "Last babak reached or match not active")
    ),
    tag = "matches"
)]
pub async fn advance_round(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MatchResponse>, WebError> {
    let m = state.engine.registry.advance_round(id).await?;

    Ok(respond(&state, &m))
}

#[utoipa::path(
    post,
    path = "/api/matches/{id}/{color}/scores",
    params(
        ("id" = Uuid, Path, description = "Match id"),
        ("color" = String, Path, description = "merah or biru")
    ),
    request_body = RecordScoreRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Score recorded", body = RecordOutcomeResponse),
        (status = 200, description = "Same event already recorded", body = RecordOutcomeResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Match not found"),
        (status = 409, description = "Match not active or event id reused"),
        (status = 422, description = "Invalid correction")
    ),
    tag = "scoring"
)]
pub async fn record_score(
    State(state): State<AppState>,
    Path((id, color)): Path<(Uuid, String)>,
    Json(req): Json<RecordScoreRequest>,
) -> Result<Response, WebError> {
    req.validate()?;
    let color = parse_color(&color)?;

    let detail = req.into_detail(state.engine.clock().now());
    let outcome = state.engine.ledger.record_score(id, color, detail).await?;

    Ok(recorded(outcome.into()))
}

#[utoipa::path(
    post,
    path = "/api/matches/{id}/{color}/fouls",
    params(
        ("id" = Uuid, Path, description = "Match id"),
        ("color" = String, Path, description = "merah or biru")
    ),
    request_body = RecordFoulRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Foul recorded", body = RecordOutcomeResponse),
        (status = 200, description = "Same event already recorded", body = RecordOutcomeResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Match not found"),
        (status = 409, description = "Match not active or event id reused")
    ),
    tag = "scoring"
)]
pub async fn record_foul(
    State(state): State<AppState>,
    Path((id, color)): Path<(Uuid, String)>,
    Json(req): Json<RecordFoulRequest>,
) -> Result<Response, WebError> {
    req.validate()?;
    let color = parse_color(&color)?;

    let foul = req.into_foul(state.engine.clock().now());
    let outcome = state.engine.ledger.record_foul(id, color, foul).await?;

    Ok(recorded(outcome.into()))
}

#[utoipa::path(
    post,
    path = "/api/matches/{id}/{color}/warnings",
    params(
        ("id" = Uuid, Path, description = "Match id"),
        ("color" = String, Path, description = "merah or biru")
    ),
    request_body = RecordWarningRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Warning recorded", body = RecordOutcomeResponse),
        (status = 200, description = "Same event already recorded", body = RecordOutcomeResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Match not found"),
        (status = 409, description = "Match not active or event id reused")
    ),
    tag = "scoring"
)]
pub async fn record_warning(
    State(state): State<AppState>,
    Path((id, color)): Path<(Uuid, String)>,
    Json(req): Json<RecordWarningRequest>,
) -> Result<Response, WebError> {
    req.validate()?;
    let color = parse_color(&color)?;

    let warning = req.into_warning(state.engine.clock().now());
    let outcome = state.engine.ledger.record_warning(id, color, warning).await?;

    Ok(recorded(outcome.into()))
}

fn recorded(outcome: RecordOutcomeResponse) -> Response {
    let status = if outcome.recorded {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    (status, Json(outcome)).into_response()
}

#[utoipa::path(
    get,
    path = "/api/matches/{id}/{color}/score",
    params(
        ("id" = Uuid, Path, description = "Match id"),
        ("color" = String, Path, description = "merah or biru")
    ),
    responses(
        (status = 200, description = "Current score of one corner", body = ScoreResponse),
        (status = 400, description = "Unknown corner color"),
        (status = 404, description = "Match not found")
    ),
    tag = "scoring"
)]
pub async fn get_score(
    State(state): State<AppState>,
    Path((id, color)): Path<(Uuid, String)>,
) -> Result<Json<ScoreResponse>, WebError> {
    let color = parse_color(&color)?;
    let score = state.engine.ledger.get_score(id, color).await?;

    Ok(Json(ScoreResponse {
        match_id: id,
        color,
        score,
    }))
}
