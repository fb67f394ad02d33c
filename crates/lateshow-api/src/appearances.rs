use std::sync::Arc;

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::{error, info, warn};

use lateshow_db::Database;
use lateshow_types::api::CreateAppearanceRequest;
use lateshow_types::models::Appearance;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::middleware::AuthUser;
use crate::references::{EntityKind, ReferenceValidator};

/// Validates and persists new appearance records.
///
/// The reference check and the insert are two separate steps: a guest or
/// episode deleted in between is caught only by the schema's foreign keys,
/// which surfaces as `ApiError::Persistence`.
pub struct AppearanceWriter {
    db: Arc<Database>,
    references: ReferenceValidator,
}

impl AppearanceWriter {
    pub fn new(db: Arc<Database>) -> Self {
        let references = ReferenceValidator::new(db.clone());
        Self { db, references }
    }

    /// Blocking; run off the async runtime.
    pub fn create(
        &self,
        rating: Option<i64>,
        guest_id: Option<i64>,
        episode_id: Option<i64>,
    ) -> Result<Appearance, ApiError> {
        // Presence only: a rating of 0 is a value, not a missing field.
        let (Some(rating), Some(guest_id), Some(episode_id)) = (rating, guest_id, episode_id) else {
            return Err(ApiError::InvalidInput(
                "rating, guest_id, and episode_id required".into(),
            ));
        };

        for (kind, id) in [(EntityKind::Guest, guest_id), (EntityKind::Episode, episode_id)] {
            if !self.references.exists(kind, id)? {
                warn!("Rejected appearance: {} {} does not exist", kind, id);
                return Err(ApiError::InvalidReference);
            }
        }

        let row = self
            .db
            .insert_appearance(rating, guest_id, episode_id)
            .map_err(ApiError::Persistence)?;

        Ok(Appearance {
            id: row.id,
            rating: row.rating,
            guest_id: row.guest_id,
            episode_id: row.episode_id,
        })
    }
}

/// POST /appearances: requires a bearer token (see `middleware::require_auth`).
pub async fn create_appearance(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(req): ApiJson<CreateAppearanceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let app = state.clone();
    let appearance = tokio::task::spawn_blocking(move || {
        app.appearances.create(req.rating, req.guest_id, req.episode_id)
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal(anyhow::anyhow!("appearance task failed"))
    })??;

    info!(
        "Appearance {} created by user {} (guest {}, episode {}, rating {})",
        appearance.id, user.id, appearance.guest_id, appearance.episode_id, appearance.rating
    );

    Ok((StatusCode::CREATED, Json(appearance)))
}
