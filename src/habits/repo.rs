use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Habit {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub created_at: OffsetDateTime,
}

pub async fn create(
    db: &PgPool,
    user_id: Uuid,
    title: &str,
    description: Option<&str>,
) -> anyhow::Result<Habit> {
    let habit = sqlx::query_as::<_, Habit>(
        r#"
        INSERT INTO habits (user_id, title, description)
        VALUES ($1, $2, $3)
        RETURNING id, user_id, title, description, created_at
        "#,
    )
    .bind(user_id)
    .bind(title)
    .bind(description)
    .fetch_one(db)
    .await?;
    Ok(habit)
}

pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<Habit>> {
    let rows = sqlx::query_as::<_, Habit>(
        r#"
        SELECT id, user_id, title, description, created_at
        FROM habits
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Lookup scoped by owner. A habit owned by someone else resolves to None,
/// the same as one that does not exist.
pub async fn find_scoped(
    db: &PgPool,
    user_id: Uuid,
    habit_id: Uuid,
) -> anyhow::Result<Option<Habit>> {
    let habit = sqlx::query_as::<_, Habit>(
        r#"
        SELECT id, user_id, title, description, created_at
        FROM habits
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(habit_id)
    .bind(user_id)
    .fetch_optional(db)
    .await?;
    Ok(habit)
}

pub async fn update_scoped(
    db: &PgPool,
    user_id: Uuid,
    habit_id: Uuid,
    title: &str,
    description: Option<&str>,
) -> anyhow::Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE habits
        SET title = $3, description = $4
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(habit_id)
    .bind(user_id)
    .bind(title)
    .bind(description)
    .execute(db)
    .await?;
    Ok(result.rows_affected())
}

/// Delete scoped by owner; logs go with the habit via ON DELETE CASCADE.
pub async fn delete_scoped(db: &PgPool, user_id: Uuid, habit_id: Uuid) -> anyhow::Result<u64> {
    let result = sqlx::query("DELETE FROM habits WHERE id = $1 AND user_id = $2")
        .bind(habit_id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}
