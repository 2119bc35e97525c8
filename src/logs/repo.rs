use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::Date;
use uuid::Uuid;

/// One completion of a habit on a calendar date. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct HabitLog {
    pub id: Uuid,
    pub habit_id: Uuid,
    pub date: Date,
}

pub async fn insert(db: &PgPool, habit_id: Uuid, date: Date) -> anyhow::Result<HabitLog> {
    let log = sqlx::query_as::<_, HabitLog>(
        r#"
        INSERT INTO habit_logs (habit_id, date)
        VALUES ($1, $2)
        RETURNING id, habit_id, date
        "#,
    )
    .bind(habit_id)
    .bind(date)
    .fetch_one(db)
    .await?;
    Ok(log)
}

pub async fn exists(db: &PgPool, habit_id: Uuid, date: Date) -> anyhow::Result<bool> {
    let found: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM habit_logs WHERE habit_id = $1 AND date = $2")
            .bind(habit_id)
            .bind(date)
            .fetch_optional(db)
            .await?;
    Ok(found.is_some())
}

pub async fn list_by_habit(db: &PgPool, habit_id: Uuid) -> anyhow::Result<Vec<HabitLog>> {
    let rows = sqlx::query_as::<_, HabitLog>(
        r#"
        SELECT id, habit_id, date
        FROM habit_logs
        WHERE habit_id = $1
        ORDER BY date ASC
        "#,
    )
    .bind(habit_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Delete-if-present; returns the number of rows removed.
pub async fn delete_by_date(db: &PgPool, habit_id: Uuid, date: Date) -> anyhow::Result<u64> {
    let result = sqlx::query("DELETE FROM habit_logs WHERE habit_id = $1 AND date = $2")
        .bind(habit_id)
        .bind(date)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}
