use axum::{Json, extract::State};
use clarifier::{Clarification, ClarifyRequest};
use validator::Validate;

use crate::error::WebError;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/clarify",
    request_body = ClarifyRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Rule that applies to the described pelanggaran", body = Clarification),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 502, description = "Model service unavailable or returned an invalid answer")
    ),
    tag = "clarifier"
)]
pub async fn clarify(
    State(state): State<AppState>,
    Json(req): Json<ClarifyRequest>,
) -> Result<Json<Clarification>, WebError> {
    req.validate()?;

    let clarification = state
        .clarifier
        .clarify(&req.pelanggaran_description)
        .await?;

    Ok(Json(clarification))
}
