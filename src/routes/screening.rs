use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::screening_dto::{
        AnswerPayload, AnswerResponse, ChatMessageResponse, CompleteSessionPayload,
        ScreeningResultResponse, SessionResponse, StartSessionPayload,
    },
    error::{Error, Result},
    middleware::auth::Claims,
    models::user::UserRole,
    AppState,
};

fn claims_user_id(claims: &Claims) -> Result<Uuid> {
    claims
        .user_id()
        .ok_or_else(|| Error::Unauthorized("Invalid token subject".to_string()))
}

fn is_staff(claims: &Claims) -> bool {
    UserRole::parse(&claims.role_str())
        .map(|role| role.is_hr_or_admin())
        .unwrap_or(false)
}

#[utoipa::path(
    post,
    path = "/api/screening/sessions",
    responses(
        (status = 201, description = "Session opened with the first question"),
        (status = 400, description = "AI screening not enabled for this job"),
        (status = 409, description = "Active session already exists")
    )
)]
#[axum::debug_handler]
pub async fn start_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<StartSessionPayload>,
) -> Result<impl IntoResponse> {
    let candidate_id = claims_user_id(&claims)?;
    let (session, first_question) = state
        .screening_service
        .start_session(candidate_id, payload.application_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AnswerResponse {
            session: SessionResponse::from(session),
            next_question: first_question,
            completed: false,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/screening/sessions",
    responses((status = 200, description = "Candidate's own sessions, newest first"))
)]
#[axum::debug_handler]
pub async fn list_sessions(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let candidate_id = claims_user_id(&claims)?;
    let sessions = state
        .screening_service
        .list_sessions_for_candidate(candidate_id)
        .await?;
    let sessions: Vec<SessionResponse> = sessions.into_iter().map(Into::into).collect();
    Ok(Json(sessions))
}

#[utoipa::path(
    get,
    path = "/api/screening/sessions/{id}",
    params(("id" = String, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Session found"),
        (status = 403, description = "Belongs to another candidate")
    )
)]
#[axum::debug_handler]
pub async fn get_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let user_id = claims_user_id(&claims)?;
    let session = state.screening_service.get_session(id).await?;
    if !is_staff(&claims) && session.candidate_id != user_id {
        return Err(Error::Forbidden(
            "This session belongs to another candidate".to_string(),
        ));
    }
    Ok(Json(SessionResponse::from(session)))
}

#[utoipa::path(
    post,
    path = "/api/screening/sessions/{id}/answers",
    params(("id" = String, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Answer recorded, next question returned"),
        (status = 400, description = "Session is not active")
    )
)]
#[axum::debug_handler]
pub async fn submit_answer(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AnswerPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let candidate_id = claims_user_id(&claims)?;
    let (session, next_question) = state
        .screening_service
        .record_answer(id, candidate_id, &payload.content, payload.response_time_seconds)
        .await?;

    let completed = session.all_questions_answered();
    Ok(Json(AnswerResponse {
        session: SessionResponse::from(session),
        next_question,
        completed,
    }))
}

#[utoipa::path(
    post,
    path = "/api/screening/sessions/{id}/complete",
    params(("id" = String, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Session completed, result recorded"),
        (status = 400, description = "Session is not active"),
        (status = 403, description = "Scores submitted by a non-staff caller")
    )
)]
#[axum::debug_handler]
pub async fn complete_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CompleteSessionPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let caller_id = claims_user_id(&claims)?;
    let staff = is_staff(&claims);
    if !staff && payload.carries_scores() {
        return Err(Error::Forbidden(
            "Screening scores can only be recorded by staff".to_string(),
        ));
    }
    let (session, result) = state
        .screening_service
        .complete_session(id, caller_id, staff, payload)
        .await?;

    state
        .audit_service
        .record(
            Some(caller_id),
            "screening.completed",
            "chat_session",
            session.id,
            None,
            None,
        )
        .await?;

    Ok(Json(serde_json::json!({
        "session": SessionResponse::from(session),
        "result": ScreeningResultResponse::from(result),
    })))
}

#[utoipa::path(
    post,
    path = "/api/screening/sessions/{id}/abandon",
    params(("id" = String, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Session abandoned"),
        (status = 400, description = "Session is not active")
    )
)]
#[axum::debug_handler]
pub async fn abandon_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let candidate_id = claims_user_id(&claims)?;
    let session = state
        .screening_service
        .abandon_session(id, candidate_id)
        .await?;
    Ok(Json(SessionResponse::from(session)))
}

#[utoipa::path(
    get,
    path = "/api/screening/sessions/{id}/messages",
    params(("id" = String, Path, description = "Session ID")),
    responses((status = 200, description = "Transcript in chronological order"))
)]
#[axum::debug_handler]
pub async fn list_messages(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let user_id = claims_user_id(&claims)?;
    let session = state.screening_service.get_session(id).await?;
    if !is_staff(&claims) && session.candidate_id != user_id {
        return Err(Error::Forbidden(
            "This session belongs to another candidate".to_string(),
        ));
    }
    let messages = state.screening_service.list_messages(id).await?;
    let messages: Vec<ChatMessageResponse> = messages.into_iter().map(Into::into).collect();
    Ok(Json(messages))
}

#[utoipa::path(
    get,
    path = "/api/screening/sessions/{id}/result",
    params(("id" = String, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Screening result"),
        (status = 404, description = "Session has no result yet")
    )
)]
#[axum::debug_handler]
pub async fn get_result(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let user_id = claims_user_id(&claims)?;
    let session = state.screening_service.get_session(id).await?;
    if !is_staff(&claims) && session.candidate_id != user_id {
        return Err(Error::Forbidden(
            "This session belongs to another candidate".to_string(),
        ));
    }
    let result = state.screening_service.get_result(id).await?;
    Ok(Json(ScreeningResultResponse::from(result)))
}
