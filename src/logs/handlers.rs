use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use time::{Date, OffsetDateTime};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::jwt::AuthUser,
    error::{is_unique_violation, ApiError},
    habits,
    logs::{dto::TrackRequest, repo, repo::HabitLog},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/habits/:id/track", post(track_habit))
        .route("/habits/:id/log", get(list_logs))
        .route("/habits/:id/track/:date", delete(untrack_habit))
}

#[instrument(skip(state, payload))]
pub async fn track_habit(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(habit_id): Path<Uuid>,
    Json(payload): Json<TrackRequest>,
) -> Result<(StatusCode, Json<HabitLog>), ApiError> {
    habits::repo::find_scoped(&state.db, auth.id, habit_id)
        .await?
        .ok_or(ApiError::NotFound("habit"))?;

    let date = payload
        .date
        .unwrap_or_else(|| OffsetDateTime::now_utc().date());

    if repo::exists(&state.db, habit_id, date).await? {
        return Err(ApiError::BadRequest(
            "habit already tracked for that date".into(),
        ));
    }

    let log = match repo::insert(&state.db, habit_id, date).await {
        Ok(l) => l,
        // concurrent tracks of the same (habit, date): the unique
        // constraint decides, the loser gets the duplicate rejection
        Err(e) if is_unique_violation(&e) => {
            return Err(ApiError::BadRequest(
                "habit already tracked for that date".into(),
            ));
        }
        Err(e) => return Err(e.into()),
    };

    info!(habit_id = %habit_id, date = %date, "habit tracked");
    Ok((StatusCode::CREATED, Json(log)))
}

#[instrument(skip(state))]
pub async fn list_logs(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(habit_id): Path<Uuid>,
) -> Result<Json<Vec<HabitLog>>, ApiError> {
    habits::repo::find_scoped(&state.db, auth.id, habit_id)
        .await?
        .ok_or(ApiError::NotFound("habit"))?;

    let logs = repo::list_by_habit(&state.db, habit_id).await?;
    Ok(Json(logs))
}

#[instrument(skip(state))]
pub async fn untrack_habit(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((habit_id, date)): Path<(Uuid, Date)>,
) -> Result<StatusCode, ApiError> {
    habits::repo::find_scoped(&state.db, auth.id, habit_id)
        .await?
        .ok_or(ApiError::NotFound("habit"))?;

    // delete-if-present: untracking an untracked date is not an error
    let removed = repo::delete_by_date(&state.db, habit_id, date).await?;

    info!(habit_id = %habit_id, date = %date, removed, "habit untracked");
    Ok(StatusCode::NO_CONTENT)
}
