//! Signup and signin handlers.

use axum::{Json, extract::State, http::StatusCode};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::ApiJson;
use crate::error::Result;
use crate::services::RegisterRequest;
use crate::state::AppState;

/// Signup form data.
#[derive(Debug, Deserialize)]
pub struct SignupBody {
    pub username: String,
    pub email: String,
    pub password: SecretString,
}

/// Signin form data.
#[derive(Debug, Deserialize)]
pub struct SigninBody {
    pub email: String,
    pub password: SecretString,
}

/// Message-only response.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub msg: &'static str,
}

/// Successful signin response.
#[derive(Debug, Serialize)]
pub struct SigninResponse {
    pub msg: &'static str,
    pub token: String,
}

/// Register a new identity.
#[instrument(skip_all, fields(username = %body.username))]
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SignupBody>,
) -> Result<(StatusCode, Json<MessageResponse>)> {
    let request = RegisterRequest {
        username: body.username,
        email: body.email,
        password: body.password,
    };
    state.credentials().register(&request).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            msg: "Registration successful",
        }),
    ))
}

/// Verify credentials and issue a session token.
#[instrument(skip_all)]
pub async fn signin(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SigninBody>,
) -> Result<Json<SigninResponse>> {
    let identity = state
        .credentials()
        .verify(&body.email, &body.password)
        .await?;
    let token = state.sessions().issue(&identity)?;

    tracing::info!(user_id = %identity.id, "Signed in");

    Ok(Json(SigninResponse {
        msg: "Login successful",
        token,
    }))
}
