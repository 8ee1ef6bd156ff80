//! Session introspection.

use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use animart_core::{Email, UserId};

use crate::middleware::RequireSession;

/// Claims of the presented token.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub id: UserId,
    pub email: Email,
    pub expires_at: DateTime<Utc>,
}

/// Return who the bearer token asserts, and until when.
pub async fn show(RequireSession(claims): RequireSession) -> Json<SessionResponse> {
    let expires_at = claims.expires_at();
    Json(SessionResponse {
        id: claims.id,
        email: claims.email,
        expires_at,
    })
}
