use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::Result;
use crate::models::Profile;
use crate::routes::MaybeActor;
use crate::AppState;

/// Public profile; `is_subscribed` reflects the caller, false when anonymous
pub async fn get_user(
    State(state): State<AppState>,
    MaybeActor(viewer): MaybeActor,
    Path(id): Path<u64>,
) -> Result<Json<Profile>> {
    let users = state.users.clone();
    let profile = tokio::task::spawn_blocking(move || users.get_profile(viewer, id)).await??;
    Ok(Json(profile))
}
