use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Maximum number of threads returned by the board listing.
pub const THREAD_LIST_LIMIT: i64 = 10;

/// Maximum number of replies previewed per thread in the board listing.
pub const REPLY_PREVIEW_LIMIT: usize = 3;

/// Text a reply carries once it has been deleted. The slot stays in the thread.
pub const DELETED_REPLY_TEXT: &str = "[deleted]";

// --- Stored Documents ---

/// Thread
///
/// The stored thread document. Replies are embedded in creation order and persisted
/// alongside the thread (a JSONB column in Postgres), so deleting the row deletes them too.
///
/// This is the unredacted shape: it is only ever returned to the client that created it.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct Thread {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub board: String,
    pub text: String,
    #[ts(type = "string")]
    pub created_on: DateTime<Utc>,
    #[ts(type = "string")]
    pub bumped_on: DateTime<Utc>,
    pub reported: bool,
    // Argon2id PHC string, never the plain password.
    pub delete_password: String,
    #[sqlx(json)]
    pub replies: Vec<Reply>,
}

impl Thread {
    /// Builds a fresh, unreported thread with no replies.
    pub fn new(board: &str, text: String, delete_password: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            board: board.to_string(),
            text,
            created_on: now,
            bumped_on: now,
            reported: false,
            delete_password,
            replies: Vec::new(),
        }
    }

    pub fn find_reply(&self, reply_id: Uuid) -> Option<&Reply> {
        self.replies.iter().find(|reply| reply.id == reply_id)
    }
}

/// Reply
///
/// A post embedded in exactly one thread. It has no storage identity of its own:
/// every operation addresses it through `(thread_id, reply_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Reply {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub text: String,
    #[ts(type = "string")]
    pub created_on: DateTime<Utc>,
    pub reported: bool,
    pub delete_password: String,
}

impl Reply {
    pub fn new(text: String, delete_password: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            text,
            created_on: Utc::now(),
            reported: false,
            delete_password,
        }
    }
}

// --- Client Views (Redacted) ---

/// ReplyView
///
/// Client-facing reply. `reported` and `delete_password` are dropped at the type level.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ReplyView {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub text: String,
    #[ts(type = "string")]
    pub created_on: DateTime<Utc>,
}

impl From<&Reply> for ReplyView {
    fn from(reply: &Reply) -> Self {
        Self {
            id: reply.id,
            text: reply.text.clone(),
            created_on: reply.created_on,
        }
    }
}

/// ThreadView
///
/// Client-facing thread used by both the board listing and the single thread view.
/// `replycount` is only present in the listing, where `replies` is a truncated preview.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ThreadView {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub text: String,
    #[ts(type = "string")]
    pub created_on: DateTime<Utc>,
    #[ts(type = "string")]
    pub bumped_on: DateTime<Utc>,
    pub replies: Vec<ReplyView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub replycount: Option<usize>,
}

impl ThreadView {
    /// Listing shape: the `REPLY_PREVIEW_LIMIT` most recent replies, newest first.
    pub fn summary(thread: &Thread) -> Self {
        let replies = thread
            .replies
            .iter()
            .rev()
            .take(REPLY_PREVIEW_LIMIT)
            .map(ReplyView::from)
            .collect();

        Self {
            id: thread.id,
            text: thread.text.clone(),
            created_on: thread.created_on,
            bumped_on: thread.bumped_on,
            replies,
            replycount: Some(thread.replies.len()),
        }
    }

    /// Detail shape: every reply in creation order.
    pub fn full(thread: &Thread) -> Self {
        Self {
            id: thread.id,
            text: thread.text.clone(),
            created_on: thread.created_on,
            bumped_on: thread.bumped_on,
            replies: thread.replies.iter().map(ReplyView::from).collect(),
            replycount: None,
        }
    }
}

// --- Request Payloads ---

/// CreateThreadRequest
///
/// Body of `POST /api/threads/{board}`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS, ToSchema)]
#[ts(export)]
pub struct CreateThreadRequest {
    #[validate(length(min = 1, message = "text must not be empty"))]
    pub text: String,
    #[validate(length(min = 1, message = "delete_password must not be empty"))]
    pub delete_password: String,
}

/// ReportThreadRequest
///
/// Body of `PUT /api/threads/{board}`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS, ToSchema)]
#[ts(export)]
pub struct ReportThreadRequest {
    pub thread_id: Uuid,
}

/// DeleteThreadRequest
///
/// Body of `DELETE /api/threads/{board}`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS, ToSchema)]
#[ts(export)]
pub struct DeleteThreadRequest {
    pub thread_id: Uuid,
    #[validate(length(min = 1, message = "delete_password must not be empty"))]
    pub delete_password: String,
}

/// CreateReplyRequest
///
/// Body of `POST /api/replies/{board}`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS, ToSchema)]
#[ts(export)]
pub struct CreateReplyRequest {
    pub thread_id: Uuid,
    #[validate(length(min = 1, message = "text must not be empty"))]
    pub text: String,
    #[validate(length(min = 1, message = "delete_password must not be empty"))]
    pub delete_password: String,
}

/// ReportReplyRequest
///
/// Body of `PUT /api/replies/{board}`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS, ToSchema)]
#[ts(export)]
pub struct ReportReplyRequest {
    pub thread_id: Uuid,
    pub reply_id: Uuid,
}

/// DeleteReplyRequest
///
/// Body of `DELETE /api/replies/{board}`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS, ToSchema)]
#[ts(export)]
pub struct DeleteReplyRequest {
    pub thread_id: Uuid,
    pub reply_id: Uuid,
    #[validate(length(min = 1, message = "delete_password must not be empty"))]
    pub delete_password: String,
}

/// ThreadQuery
///
/// Query string of `GET /api/replies/{board}`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ThreadQuery {
    /// Thread whose replies are requested.
    pub thread_id: Uuid,
}
