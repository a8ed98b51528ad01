//! Assessment session API routes

use crate::error::{ApiError, ApiResult};
use crate::services::AssessmentService;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use metabolic_risk_shared::types::{SessionResponse, SubmitLeadRequest, SubmitLeadResponse};
use metabolic_risk_shared::{Attribution, FlowState, LeadForm, MeasurementInput};
use uuid::Uuid;

/// Create assessment session routes
pub fn assessment_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_session))
        .route("/:id", get(get_session))
        .route("/:id/measurements", post(submit_measurement))
        .route("/:id/lead-gate", post(open_lead_gate).delete(close_lead_gate))
        .route("/:id/lead", post(submit_lead))
        .route("/:id/reset", post(reset_session))
}

/// Ids that do not parse cannot name a session
fn parse_session_id(raw: &str) -> ApiResult<Uuid> {
    raw.parse::<Uuid>()
        .map_err(|_| ApiError::NotFound(format!("Session {} not found", raw)))
}

fn view(state: &AppState, id: Uuid, flow: &FlowState) -> SessionResponse {
    SessionResponse::from_state(id.to_string(), flow, &state.config().contact)
}

/// POST /api/v1/sessions - Start a new assessment
async fn create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionResponse>) {
    let (id, flow) = AssessmentService::start(state.sessions()).await;
    (StatusCode::CREATED, Json(view(&state, id, &flow)))
}

/// GET /api/v1/sessions/:id - Current step and the views it allows
async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SessionResponse>> {
    let id = parse_session_id(&id)?;
    let flow = state.sessions().get(id).await?;
    Ok(Json(view(&state, id, &flow)))
}

/// POST /api/v1/sessions/:id/measurements - Submit the measurement form
///
/// Responds 400 with per-field messages when any field is invalid; the
/// session stays in the input step.
async fn submit_measurement(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<MeasurementInput>,
) -> ApiResult<Json<SessionResponse>> {
    let id = parse_session_id(&id)?;
    let flow = AssessmentService::submit_measurement(state.sessions(), id, &input).await?;
    Ok(Json(view(&state, id, &flow)))
}

/// POST /api/v1/sessions/:id/lead-gate - Ask for the full result
async fn open_lead_gate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SessionResponse>> {
    let id = parse_session_id(&id)?;
    let flow = AssessmentService::open_lead_gate(state.sessions(), id).await?;
    Ok(Json(view(&state, id, &flow)))
}

/// DELETE /api/v1/sessions/:id/lead-gate - Dismiss the gate
async fn close_lead_gate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SessionResponse>> {
    let id = parse_session_id(&id)?;
    let flow = AssessmentService::close_lead_gate(state.sessions(), id).await?;
    Ok(Json(view(&state, id, &flow)))
}

/// POST /api/v1/sessions/:id/lead - Submit the contact form
///
/// Campaign attribution comes from the `utm_*` query parameters.
async fn submit_lead(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(attribution): Query<Attribution>,
    Json(req): Json<SubmitLeadRequest>,
) -> ApiResult<Json<SubmitLeadResponse>> {
    let id = parse_session_id(&id)?;
    let form = LeadForm::new(req.name, req.phone);

    let (flow, outcome) =
        AssessmentService::submit_lead(state.sessions(), state.leads(), id, &form, attribution)
            .await?;

    Ok(Json(SubmitLeadResponse {
        session: view(&state, id, &flow),
        delivery: outcome.as_str().to_string(),
    }))
}

/// POST /api/v1/sessions/:id/reset - Start over
async fn reset_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SessionResponse>> {
    let id = parse_session_id(&id)?;
    let flow = AssessmentService::reset(state.sessions(), id).await?;
    Ok(Json(view(&state, id, &flow)))
}
