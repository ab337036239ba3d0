use crate::db::{models::*, DbPool};
use crate::error::{Error, Result};
use chrono::Utc;

/// Create a new container
pub async fn create_container(pool: &DbPool, new_container: &NewContainer) -> Result<Container> {
    let now = Utc::now();

    let container = sqlx::query_as::<_, Container>(
        r#"
        INSERT INTO containers (name, password_hash, source_repo, source_branch, created_at)
        VALUES (?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&new_container.name)
    .bind(&new_container.password_hash)
    .bind(&new_container.source_repo)
    .bind(&new_container.source_branch)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(container)
}

/// Look up a container by name, case-insensitively
pub async fn find_by_name(pool: &DbPool, name: &str) -> Result<Option<Container>> {
    let container = sqlx::query_as::<_, Container>(
        "SELECT * FROM containers WHERE name = ? COLLATE NOCASE",
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;

    Ok(container)
}

/// Get a container by name, failing when absent
pub async fn get_by_name(pool: &DbPool, name: &str) -> Result<Container> {
    find_by_name(pool, name)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Container {name} not found")))
}
