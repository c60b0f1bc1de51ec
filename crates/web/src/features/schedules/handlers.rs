use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use engine::{
    dto::schedule::{
        CreateTandingRequest, CreateTgrRequest, DistributeRequest, TandingDistributionResponse,
        TgrDistributionResponse,
    },
    models::{ScheduleTanding, ScheduleTgr},
};
use validator::Validate;

use crate::error::WebError;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/schedules/tanding",
    responses(
        (status = 200, description = "Tanding schedule in submission order", body = Vec<ScheduleTanding>)
    ),
    tag = "schedules"
)]
pub async fn list_tanding(
    State(state): State<AppState>,
) -> Result<Json<Vec<ScheduleTanding>>, WebError> {
    let entries = state.engine.schedules.list_tanding().await?;

    Ok(Json(entries))
}

#[utoipa::path(
    post,
    path = "/api/schedules/tanding",
    request_body = CreateTandingRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Tanding entry created", body = ScheduleTanding),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "schedules"
)]
pub async fn create_tanding(
    State(state): State<AppState>,
    Json(req): Json<CreateTandingRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let entry = state.engine.schedules.create_tanding(req).await?;

    Ok((StatusCode::CREATED, Json(entry)).into_response())
}

#[utoipa::path(
    get,
    path = "/api/schedules/tgr",
    responses(
        (status = 200, description = "TGR schedule in submission order", body = Vec<ScheduleTgr>)
    ),
    tag = "schedules"
)]
pub async fn list_tgr(State(state): State<AppState>) -> Result<Json<Vec<ScheduleTgr>>, WebError> {
    let entries = state.engine.schedules.list_tgr().await?;

    Ok(Json(entries))
}

#[utoipa::path(
    post,
    path = "/api/schedules/tgr",
    request_body = CreateTgrRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "TGR entry created", body = ScheduleTgr),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Participant count does not fit the category")
    ),
    tag = "schedules"
)]
pub async fn create_tgr(
    State(state): State<AppState>,
    Json(req): Json<CreateTgrRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let entry = state.engine.schedules.create_tgr(req).await?;

    Ok((StatusCode::CREATED, Json(entry)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/schedules/tanding/distribute",
    request_body = DistributeRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Tanding entries assigned round-robin", body = TandingDistributionResponse),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Empty or duplicate gelanggang list")
    ),
    tag = "schedules"
)]
pub async fn distribute_tanding(
    State(state): State<AppState>,
    Json(req): Json<DistributeRequest>,
) -> Result<Json<TandingDistributionResponse>, WebError> {
    let assignment = state.engine.schedules.distribute_tanding(&req.venues).await?;

    Ok(Json(assignment.into()))
}

#[utoipa::path(
    post,
    path = "/api/schedules/tgr/distribute",
    request_body = DistributeRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "TGR entries assigned round-robin", body = TgrDistributionResponse),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Empty or duplicate gelanggang list")
    ),
    tag = "schedules"
)]
pub async fn distribute_tgr(
    State(state): State<AppState>,
    Json(req): Json<DistributeRequest>,
) -> Result<Json<TgrDistributionResponse>, WebError> {
    let assignment = state.engine.schedules.distribute_tgr(&req.venues).await?;

    Ok(Json(assignment.into()))
}
