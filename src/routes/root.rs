//! Root route
//!
//! `GET /` answers 200 with an empty body. The informational message the
//! route once carried is intentionally not sent; existing callers only rely
//! on the route existing.

use axum::http::StatusCode;

/// Root handler
pub async fn root() -> StatusCode {
    StatusCode::OK
}
