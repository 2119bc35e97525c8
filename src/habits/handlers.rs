use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::jwt::AuthUser,
    error::ApiError,
    habits::{dto::HabitRequest, repo, repo::Habit},
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/habits", get(list_habits))
        .route("/habits/:id", get(get_habit))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/habits", post(create_habit))
        .route("/habits/:id", put(update_habit).delete(delete_habit))
}

#[instrument(skip(state, payload))]
pub async fn create_habit(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<HabitRequest>,
) -> Result<(StatusCode, Json<Habit>), ApiError> {
    let habit = repo::create(
        &state.db,
        auth.id,
        &payload.title,
        payload.description.as_deref(),
    )
    .await?;

    info!(habit_id = %habit.id, user_id = %auth.id, "habit created");
    Ok((StatusCode::CREATED, Json(habit)))
}

#[instrument(skip(state))]
pub async fn list_habits(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<Habit>>, ApiError> {
    let habits = repo::list_by_user(&state.db, auth.id).await?;
    Ok(Json(habits))
}

#[instrument(skip(state))]
pub async fn get_habit(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(habit_id): Path<Uuid>,
) -> Result<Json<Habit>, ApiError> {
    let habit = repo::find_scoped(&state.db, auth.id, habit_id)
        .await?
        .ok_or(ApiError::NotFound("habit"))?;
    Ok(Json(habit))
}

#[instrument(skip(state, payload))]
pub async fn update_habit(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(habit_id): Path<Uuid>,
    Json(payload): Json<HabitRequest>,
) -> Result<StatusCode, ApiError> {
    let updated = repo::update_scoped(
        &state.db,
        auth.id,
        habit_id,
        &payload.title,
        payload.description.as_deref(),
    )
    .await?;
    if updated == 0 {
        return Err(ApiError::NotFound("habit"));
    }

    info!(habit_id = %habit_id, user_id = %auth.id, "habit updated");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn delete_habit(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(habit_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let deleted = repo::delete_scoped(&state.db, auth.id, habit_id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("habit"));
    }

    info!(habit_id = %habit_id, user_id = %auth.id, "habit deleted");
    Ok(StatusCode::NO_CONTENT)
}
