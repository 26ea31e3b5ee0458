use crate::{
    AppState,
    error::ApiError,
    extract::{Payload, ValidatedQuery},
    models::{
        CreateReplyRequest, CreateThreadRequest, DELETED_REPLY_TEXT, DeleteReplyRequest,
        DeleteThreadRequest, Reply, ReportReplyRequest, ReportThreadRequest, THREAD_LIST_LIMIT,
        Thread, ThreadQuery, ThreadView,
    },
    password,
};
use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};

/// Body of every successful report call, whether or not anything was matched.
pub const REPORTED: &str = "reported";

/// DeleteOutcome
///
/// Result of a password-gated deletion. Both variants are `200 OK` with a plain-text body:
/// the API signals a password mismatch in the body, never in the status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Success,
    IncorrectPassword,
}

impl DeleteOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeleteOutcome::Success => "success",
            DeleteOutcome::IncorrectPassword => "incorrect password",
        }
    }
}

impl IntoResponse for DeleteOutcome {
    fn into_response(self) -> Response {
        self.as_str().into_response()
    }
}

// --- Thread Handlers ---

/// create_thread
///
/// Creates a thread on `board`. The response is the full stored document, including
/// `reported` and the hashed `delete_password`.
#[utoipa::path(
    post,
    path = "/api/threads/{board}",
    params(("board" = String, Path, description = "Board name")),
    request_body = CreateThreadRequest,
    responses(
        (status = 200, description = "Created thread", body = Thread),
        (status = 400, description = "Missing or empty field")
    )
)]
pub async fn create_thread(
    State(state): State<AppState>,
    Path(board): Path<String>,
    Payload(payload): Payload<CreateThreadRequest>,
) -> Result<Json<Thread>, ApiError> {
    let hashed = password::hash_password(payload.delete_password).await?;
    let thread = state
        .repo
        .create_thread(Thread::new(&board, payload.text, hashed))
        .await?;

    tracing::info!(board = %board, thread_id = %thread.id, "thread created");
    Ok(Json(thread))
}

/// list_threads
///
/// The board front page: the most recently bumped threads, each with a short preview of
/// its newest replies. Redacted.
#[utoipa::path(
    get,
    path = "/api/threads/{board}",
    params(("board" = String, Path, description = "Board name")),
    responses((status = 200, description = "Recent threads", body = [ThreadView]))
)]
pub async fn list_threads(
    State(state): State<AppState>,
    Path(board): Path<String>,
) -> Result<Json<Vec<ThreadView>>, ApiError> {
    let threads = state.repo.get_recent_threads(&board, THREAD_LIST_LIMIT).await?;
    Ok(Json(threads.iter().map(ThreadView::summary).collect()))
}

/// report_thread
///
/// Flags a thread for moderation. Always answers `reported`.
#[utoipa::path(
    put,
    path = "/api/threads/{board}",
    params(("board" = String, Path, description = "Board name")),
    request_body = ReportThreadRequest,
    responses((status = 200, description = "Reported", body = String, content_type = "text/plain"))
)]
pub async fn report_thread(
    State(state): State<AppState>,
    Path(board): Path<String>,
    Payload(payload): Payload<ReportThreadRequest>,
) -> Result<&'static str, ApiError> {
    if !state.repo.report_thread(&board, payload.thread_id).await? {
        tracing::debug!(board = %board, thread_id = %payload.thread_id, "report for unknown thread");
    }
    Ok(REPORTED)
}

/// delete_thread
///
/// Deletes a thread and all of its replies when the password matches.
#[utoipa::path(
    delete,
    path = "/api/threads/{board}",
    params(("board" = String, Path, description = "Board name")),
    request_body = DeleteThreadRequest,
    responses(
        (status = 200, description = "`success` or `incorrect password`", body = String, content_type = "text/plain"),
        (status = 404, description = "Thread not found")
    )
)]
pub async fn delete_thread(
    State(state): State<AppState>,
    Path(board): Path<String>,
    Payload(payload): Payload<DeleteThreadRequest>,
) -> Result<DeleteOutcome, ApiError> {
    let thread = state
        .repo
        .get_thread(&board, payload.thread_id)
        .await?
        .ok_or(ApiError::NotFound("thread"))?;

    if !password::verify_password(payload.delete_password, thread.delete_password).await? {
        tracing::warn!(board = %board, thread_id = %thread.id, "thread delete with wrong password");
        return Ok(DeleteOutcome::IncorrectPassword);
    }

    // A concurrent delete may have won the race; the thread is gone either way.
    state.repo.delete_thread(&board, thread.id).await?;
    tracing::info!(board = %board, thread_id = %thread.id, "thread deleted");
    Ok(DeleteOutcome::Success)
}

// --- Reply Handlers ---

/// create_reply
///
/// Appends a reply and bumps its thread in one store operation. Responds with the
/// created reply so its `_id` can be used for later report and delete calls.
#[utoipa::path(
    post,
    path = "/api/replies/{board}",
    params(("board" = String, Path, description = "Board name")),
    request_body = CreateReplyRequest,
    responses(
        (status = 200, description = "Created reply", body = Reply),
        (status = 400, description = "Missing or empty field"),
        (status = 404, description = "Thread not found")
    )
)]
pub async fn create_reply(
    State(state): State<AppState>,
    Path(board): Path<String>,
    Payload(payload): Payload<CreateReplyRequest>,
) -> Result<Json<Reply>, ApiError> {
    let hashed = password::hash_password(payload.delete_password).await?;
    let reply = Reply::new(payload.text, hashed);

    if !state
        .repo
        .add_reply(&board, payload.thread_id, reply.clone())
        .await?
    {
        return Err(ApiError::NotFound("thread"));
    }

    tracing::info!(board = %board, thread_id = %payload.thread_id, reply_id = %reply.id, "reply created");
    Ok(Json(reply))
}

/// get_thread
///
/// A single thread with every reply, redacted.
#[utoipa::path(
    get,
    path = "/api/replies/{board}",
    params(("board" = String, Path, description = "Board name"), ThreadQuery),
    responses(
        (status = 200, description = "Thread with all replies", body = ThreadView),
        (status = 404, description = "Thread not found")
    )
)]
pub async fn get_thread(
    State(state): State<AppState>,
    Path(board): Path<String>,
    ValidatedQuery(query): ValidatedQuery<ThreadQuery>,
) -> Result<Json<ThreadView>, ApiError> {
    match state.repo.get_thread(&board, query.thread_id).await? {
        Some(thread) => Ok(Json(ThreadView::full(&thread))),
        None => Err(ApiError::NotFound("thread")),
    }
}

/// report_reply
///
/// Flags a reply for moderation. Always answers `reported`.
#[utoipa::path(
    put,
    path = "/api/replies/{board}",
    params(("board" = String, Path, description = "Board name")),
    request_body = ReportReplyRequest,
    responses((status = 200, description = "Reported", body = String, content_type = "text/plain"))
)]
pub async fn report_reply(
    State(state): State<AppState>,
    Path(board): Path<String>,
    Payload(payload): Payload<ReportReplyRequest>,
) -> Result<&'static str, ApiError> {
    if !state
        .repo
        .report_reply(&board, payload.thread_id, payload.reply_id)
        .await?
    {
        tracing::debug!(
            board = %board,
            thread_id = %payload.thread_id,
            reply_id = %payload.reply_id,
            "report for unknown reply"
        );
    }
    Ok(REPORTED)
}

/// delete_reply
///
/// Deletes a reply logically: its text becomes `[deleted]` and it keeps its position,
/// so reply counts and ordering do not shift.
#[utoipa::path(
    delete,
    path = "/api/replies/{board}",
    params(("board" = String, Path, description = "Board name")),
    request_body = DeleteReplyRequest,
    responses(
        (status = 200, description = "`success` or `incorrect password`", body = String, content_type = "text/plain"),
        (status = 404, description = "Thread or reply not found")
    )
)]
pub async fn delete_reply(
    State(state): State<AppState>,
    Path(board): Path<String>,
    Payload(payload): Payload<DeleteReplyRequest>,
) -> Result<DeleteOutcome, ApiError> {
    let thread = state
        .repo
        .get_thread(&board, payload.thread_id)
        .await?
        .ok_or(ApiError::NotFound("thread"))?;
    let stored = thread
        .find_reply(payload.reply_id)
        .map(|reply| reply.delete_password.clone())
        .ok_or(ApiError::NotFound("reply"))?;

    if !password::verify_password(payload.delete_password, stored).await? {
        tracing::warn!(
            board = %board,
            thread_id = %thread.id,
            reply_id = %payload.reply_id,
            "reply delete with wrong password"
        );
        return Ok(DeleteOutcome::IncorrectPassword);
    }

    state
        .repo
        .replace_reply_text(&board, thread.id, payload.reply_id, DELETED_REPLY_TEXT)
        .await?;
    tracing::info!(board = %board, thread_id = %thread.id, reply_id = %payload.reply_id, "reply deleted");
    Ok(DeleteOutcome::Success)
}
