use crate::db::{models::*, DbPool};
use crate::error::Result;
use crate::import::upload::UploadedFile;
use chrono::Utc;

/// Persist the uploaded file records for a container
pub async fn insert_files(
    pool: &DbPool,
    container_id: i64,
    uploaded: &[UploadedFile],
) -> Result<()> {
    let now = Utc::now();

    for file in uploaded {
        sqlx::query(
            r#"
            INSERT INTO files
                (container_id, storage_key, original_name, mime_type, size_bytes, relative_path, content_url, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(container_id)
        .bind(&file.storage_key)
        .bind(&file.original_name)
        .bind(&file.mime_type)
        .bind(file.size_bytes as i64)
        .bind(&file.relative_path)
        .bind(&file.content_url)
        .bind(now)
        .execute(pool)
        .await?;
    }

    Ok(())
}

/// List a container's files ordered by relative path
pub async fn list_for_container(pool: &DbPool, container_id: i64) -> Result<Vec<StoredFile>> {
    let files = sqlx::query_as::<_, StoredFile>(
        "SELECT * FROM files WHERE container_id = ? ORDER BY relative_path",
    )
    .bind(container_id)
    .fetch_all(pool)
    .await?;

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{self, models::NewContainer};

    #[tokio::test]
    async fn test_insert_and_list() {
        let pool = db::init_pool("sqlite::memory:").await.unwrap();
        db::run_migrations(&pool).await.unwrap();

        let container = db::containers::create_container(
            &pool,
            &NewContainer {
                name: "c".to_string(),
                password_hash: "h".to_string(),
                source_repo: None,
                source_branch: None,
            },
        )
        .await
        .unwrap();

        let uploaded = vec![
            UploadedFile {
                storage_key: "readme_ab12cd34".to_string(),
                original_name: "README.md".to_string(),
                mime_type: "text/markdown".to_string(),
                size_bytes: 100,
                relative_path: "README.md".to_string(),
                content_url: "https://cdn.example/readme_ab12cd34".to_string(),
            },
            UploadedFile {
                storage_key: "app_ef56ab78".to_string(),
                original_name: "app.js".to_string(),
                mime_type: "text/javascript".to_string(),
                size_bytes: 2048,
                relative_path: "src/app.js".to_string(),
                content_url: "https://cdn.example/app_ef56ab78".to_string(),
            },
        ];

        insert_files(&pool, container.id, &uploaded).await.unwrap();

        let files = list_for_container(&pool, container.id).await.unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].relative_path, "README.md");
        assert_eq!(files[1].size_bytes, 2048);
    }
}
