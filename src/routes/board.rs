use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Board Router Module
///
/// Both resources are addressed by board name in the path; the thread or reply being
/// acted on travels in the body (or the query string for the thread view).
pub fn board_routes() -> Router<AppState> {
    Router::new()
        // /api/threads/{board}
        // POST creates, GET lists the 10 most recently bumped threads,
        // PUT reports, DELETE removes a thread with its replies.
        .route(
            "/api/threads/{board}",
            get(handlers::list_threads)
                .post(handlers::create_thread)
                .put(handlers::report_thread)
                .delete(handlers::delete_thread),
        )
        // /api/replies/{board}
        // POST appends a reply and bumps the thread, GET ?thread_id= shows the whole
        // thread, PUT reports a reply, DELETE blanks it to `[deleted]`.
        .route(
            "/api/replies/{board}",
            get(handlers::get_thread)
                .post(handlers::create_reply)
                .put(handlers::report_reply)
                .delete(handlers::delete_reply),
        )
}
