/// Router Module Index
///
/// Organizes the application's routes by surface. Board routes are anonymous:
/// mutation is gated per thread/reply by a delete password, not by a session.

/// Service-level routes (liveness).
pub mod public;

/// The thread and reply endpoints, one path per resource, one verb per operation.
pub mod board;
