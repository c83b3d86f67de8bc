//! Axum route handlers for the screening session API.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::archive::{PersistedResult, SavedResult};
use crate::documents::{extract_text, DocumentKind};
use crate::errors::AppError;
use crate::interview::session::{ReviewView, SessionView};
use crate::interview::store::SessionHandle;
use crate::interview::workflow::{finish_interview, start_interview};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub session: SessionView,
}

#[derive(Debug, Deserialize)]
pub struct InputsRequest {
    pub job_description: Option<String>,
    pub resume_text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    #[serde(default)]
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct ExtractedDocument {
    pub field: String,
    pub kind: DocumentKind,
    /// Zero means extraction failed or the document was empty.
    pub characters: usize,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub session_id: Uuid,
    pub documents: Vec<ExtractedDocument>,
    pub session: SessionView,
}

#[derive(Debug, Serialize)]
pub struct SavedResultResponse {
    pub result: PersistedResult,
    pub review: Option<ReviewView>,
}

const JOB_DESCRIPTION_FIELD: &str = "job_description";
const RESUME_FIELD: &str = "resume";

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionResponse>) {
    let (session_id, handle) = state.sessions.create().await;
    info!("Created screening session {session_id}");
    let session = handle.lock().await.view();
    (
        StatusCode::CREATED,
        Json(SessionResponse {
            session_id,
            session,
        }),
    )
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let handle = find_session(&state, session_id).await?;
    let session = handle.lock().await.view();
    Ok(Json(SessionResponse {
        session_id,
        session,
    }))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.sessions.remove(session_id).await {
        return Err(not_found(session_id));
    }
    info!("Discarded screening session {session_id}");
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/sessions/:id/inputs
///
/// Sets the job description and/or resume as raw text.
pub async fn handle_set_inputs(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<InputsRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    if request.job_description.is_none() && request.resume_text.is_none() {
        return Err(AppError::Validation(
            "provide job_description and/or resume_text".to_string(),
        ));
    }

    let handle = find_session(&state, session_id).await?;
    let mut session = handle.lock().await;
    if let Some(text) = request.job_description {
        session.set_job_description(text)?;
    }
    if let Some(text) = request.resume_text {
        session.set_resume_text(text)?;
    }

    Ok(Json(SessionResponse {
        session_id,
        session: session.view(),
    }))
}

/// POST /api/v1/sessions/:id/documents
///
/// Multipart upload. Field `job_description` and/or `resume`, each a `.txt`
/// or `.pdf` file. Unreadable documents load as empty text.
pub async fn handle_upload_documents(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let handle = find_session(&state, session_id).await?;

    let mut uploads: Vec<(String, DocumentKind, Bytes)> = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name != JOB_DESCRIPTION_FIELD && name != RESUME_FIELD {
            return Err(AppError::Validation(format!(
                "unexpected field '{name}', expected '{JOB_DESCRIPTION_FIELD}' or '{RESUME_FIELD}'"
            )));
        }
        let kind = DocumentKind::detect(field.content_type(), field.file_name()).ok_or_else(
            || AppError::Validation(format!("field '{name}' must be a .txt or .pdf file")),
        )?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("could not read field '{name}': {e}")))?;
        uploads.push((name, kind, bytes));
    }

    if uploads.is_empty() {
        return Err(AppError::Validation("no documents uploaded".to_string()));
    }

    let mut extracted = Vec::with_capacity(uploads.len());
    for (field, kind, bytes) in uploads {
        let text = tokio::task::spawn_blocking(move || extract_text(&bytes, kind))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("extraction task failed: {e}")))?;
        info!(
            "Extracted {} characters from {field} ({kind:?}) for session {session_id}",
            text.chars().count()
        );
        extracted.push((field, kind, text));
    }

    let mut session = handle.lock().await;
    let mut documents = Vec::with_capacity(extracted.len());
    for (field, kind, text) in extracted {
        let characters = text.chars().count();
        if field == JOB_DESCRIPTION_FIELD {
            session.set_job_description(text)?;
        } else {
            session.set_resume_text(text)?;
        }
        documents.push(ExtractedDocument {
            field,
            kind,
            characters,
        });
    }

    Ok(Json(UploadResponse {
        session_id,
        documents,
        session: session.view(),
    }))
}

/// POST /api/v1/sessions/:id/start
///
/// Generates the interview questions. Responds 502 `GENERATION_FAILED` when
/// the model produced none; the session stays editable and can be retried.
pub async fn handle_start(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let handle = find_session(&state, session_id).await?;
    let mut session = handle.lock().await;

    start_interview(&mut session, state.llm.as_ref(), &state.prompts).await?;
    info!("Session {session_id} is interviewing");

    Ok(Json(SessionResponse {
        session_id,
        session: session.view(),
    }))
}

/// POST /api/v1/sessions/:id/previous
pub async fn handle_previous(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<AnswerRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let handle = find_session(&state, session_id).await?;
    let mut session = handle.lock().await;
    session.previous(request.answer)?;
    info!(
        "Session {session_id} moved to question {}",
        session.current_index() + 1
    );
    Ok(Json(SessionResponse {
        session_id,
        session: session.view(),
    }))
}

/// POST /api/v1/sessions/:id/next
pub async fn handle_next(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<AnswerRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let handle = find_session(&state, session_id).await?;
    let mut session = handle.lock().await;
    session.next(request.answer)?;
    info!(
        "Session {session_id} moved to question {}",
        session.current_index() + 1
    );
    Ok(Json(SessionResponse {
        session_id,
        session: session.view(),
    }))
}

/// POST /api/v1/sessions/:id/finish
///
/// Saves the last answer and scores every question before responding.
pub async fn handle_finish(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<AnswerRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let handle = find_session(&state, session_id).await?;
    let mut session = handle.lock().await;

    finish_interview(
        &mut session,
        request.answer,
        state.llm.as_ref(),
        &state.prompts,
    )
    .await?;
    info!("Session {session_id} scored and ready for review");

    Ok(Json(SessionResponse {
        session_id,
        session: session.view(),
    }))
}

/// GET /api/v1/sessions/:id/results
pub async fn handle_results(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<ReviewView>, AppError> {
    let handle = find_session(&state, session_id).await?;
    let session = handle.lock().await;
    session.ensure_reviewing("view results")?;
    let review = session
        .review_view()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("reviewing session has no review")))?;
    Ok(Json(review))
}

/// POST /api/v1/sessions/:id/save
///
/// Writes a new result file each time; the session itself is unchanged.
pub async fn handle_save(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<(StatusCode, Json<SavedResult>), AppError> {
    let handle = find_session(&state, session_id).await?;
    let session = handle.lock().await;
    session.ensure_reviewing("save results")?;

    let saved = state.archive.save(&session).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

/// GET /api/v1/results/:filename
pub async fn handle_get_saved_result(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Json<SavedResultResponse>, AppError> {
    let result = state.archive.load(&filename).await?;
    let review = result.clone().into_session().review_view();
    Ok(Json(SavedResultResponse { result, review }))
}

async fn find_session(state: &AppState, session_id: Uuid) -> Result<SessionHandle, AppError> {
    state
        .sessions
        .get(session_id)
        .await
        .ok_or_else(|| not_found(session_id))
}

fn not_found(session_id: Uuid) -> AppError {
    AppError::NotFound(format!("Session {session_id} not found"))
}
