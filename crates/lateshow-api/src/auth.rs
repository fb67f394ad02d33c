use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::{error, info, warn};

use lateshow_db::Database;
use lateshow_types::api::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};

use crate::appearances::AppearanceWriter;
use crate::credentials::CredentialStore;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::tokens::TokenService;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub credentials: CredentialStore,
    pub tokens: TokenService,
    pub appearances: AppearanceWriter,
}

impl AppStateInner {
    pub fn new(db: Arc<Database>, tokens: TokenService) -> anyhow::Result<Self> {
        Ok(Self {
            credentials: CredentialStore::new(db.clone())?,
            tokens,
            appearances: AppearanceWriter::new(db),
        })
    }
}

pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(username), Some(password)) = (req.username, req.password) else {
        return Err(ApiError::InvalidInput("Username and password required".into()));
    };

    // Argon2 hashing is CPU-bound; keep it off the async workers.
    let app = state.clone();
    let name = username.clone();
    let result = tokio::task::spawn_blocking(move || app.credentials.register(&name, &password))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(anyhow::anyhow!("registration task failed"))
        })?;

    if let Err(ApiError::DuplicateUsername) = &result {
        warn!("Registration rejected: username '{}' already exists", username);
    }
    result?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".into(),
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(username), Some(password)) = (req.username, req.password) else {
        return Err(ApiError::InvalidCredentials);
    };

    let app = state.clone();
    let name = username.clone();
    let user_id = tokio::task::spawn_blocking(move || app.credentials.verify(&name, &password))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(anyhow::anyhow!("login task failed"))
        })?
        .inspect_err(|e| {
            if matches!(e, ApiError::InvalidCredentials) {
                warn!("Failed login for '{}'", username);
            }
        })?;

    let access_token = state.tokens.issue(user_id)?;
    info!("User {} logged in", user_id);

    Ok(Json(LoginResponse { access_token }))
}
