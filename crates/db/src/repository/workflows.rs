//! Workflow CRUD operations.
//!
//! Saving is last-write-wins: `update_workflow` overwrites name and data
//! unconditionally.

use chrono::Utc;

use crate::{models::WorkflowRow, DbError, DbPool};

const COLUMNS: &str = "id, name, data, created_at, updated_at";

/// Insert a new workflow into the database.
///
/// `data` is the serialized graph document.
pub async fn create_workflow(pool: &DbPool, name: &str, data: &str) -> Result<WorkflowRow, DbError> {
    let now = Utc::now();

    let row = sqlx::query_as::<_, WorkflowRow>(&format!(
        "INSERT INTO workflows (name, data, created_at, updated_at) VALUES (?1, ?2, ?3, ?3) RETURNING {COLUMNS}"
    ))
    .bind(name)
    .bind(data)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Replace the name and data of an existing workflow.
///
/// Returns `DbError::NotFound` if no row has this id.
pub async fn update_workflow(pool: &DbPool, id: i64, name: &str, data: &str) -> Result<WorkflowRow, DbError> {
    let row = sqlx::query_as::<_, WorkflowRow>(&format!(
        "UPDATE workflows SET name = ?1, data = ?2, updated_at = ?3 WHERE id = ?4 RETURNING {COLUMNS}"
    ))
    .bind(name)
    .bind(data)
    .bind(Utc::now())
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Fetch a single workflow by its primary key.
pub async fn get_workflow(pool: &DbPool, id: i64) -> Result<WorkflowRow, DbError> {
    let row = sqlx::query_as::<_, WorkflowRow>(&format!("SELECT {COLUMNS} FROM workflows WHERE id = ?1"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Return all workflows, most recently saved first.
pub async fn list_workflows(pool: &DbPool) -> Result<Vec<WorkflowRow>, DbError> {
    let rows = sqlx::query_as::<_, WorkflowRow>(&format!(
        "SELECT {COLUMNS} FROM workflows ORDER BY updated_at DESC, id DESC"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Permanently delete a workflow by its primary key.
///
/// Returns `DbError::NotFound` if no row was deleted.
pub async fn delete_workflow(pool: &DbPool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM workflows WHERE id = ?1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_pool;

    const EMPTY: &str = r#"{"nodes":[],"connections":[]}"#;

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let pool = memory_pool().await.unwrap();
        let created = create_workflow(&pool, "Orders", EMPTY).await.unwrap();
        assert_eq!(created.created_at, created.updated_at);

        let fetched = get_workflow(&pool, created.id).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.data_json().unwrap()["nodes"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn update_overwrites_and_bumps_updated_at() {
        let pool = memory_pool().await.unwrap();
        let created = create_workflow(&pool, "Draft", EMPTY).await.unwrap();

        let updated = update_workflow(&pool, created.id, "Final", r#"{"nodes":[{"id":"node-1"}]}"#)
            .await
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "Final");
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn missing_rows_are_not_found() {
        let pool = memory_pool().await.unwrap();
        assert!(matches!(get_workflow(&pool, 42).await, Err(DbError::NotFound)));
        assert!(matches!(update_workflow(&pool, 42, "x", EMPTY).await, Err(DbError::NotFound)));
        assert!(matches!(delete_workflow(&pool, 42).await, Err(DbError::NotFound)));
    }

    #[tokio::test]
    async fn list_is_newest_first_and_delete_removes() {
        let pool = memory_pool().await.unwrap();
        let first = create_workflow(&pool, "first", EMPTY).await.unwrap();
        let second = create_workflow(&pool, "second", EMPTY).await.unwrap();

        let names: Vec<_> = list_workflows(&pool).await.unwrap().into_iter().map(|w| w.name).collect();
        assert_eq!(names, vec!["second", "first"]);

        delete_workflow(&pool, second.id).await.unwrap();
        let remaining = list_workflows(&pool).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, first.id);
    }
}
