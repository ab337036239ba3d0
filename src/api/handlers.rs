use axum::{
    extract::{ConnectInfo, Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::debug;

use crate::{api::models::*, db, import::Importer, utils::names, Error, Result};

/// Header carrying the container password on browse requests
const PASSWORD_HEADER: &str = "x-container-password";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: sqlx::SqlitePool,
    pub importer: Arc<Importer>,
    pub settings: crate::config::Settings,
}

/// POST /import - Import a repository into a new container
pub async fn import_repository(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    Json(request): Json<ImportRequest>,
) -> Result<(StatusCode, Json<ImportResponse>)> {
    debug!("Import request: {:?}", request.repo_url);

    // Fall back to localhost when no peer address is available (tests,
    // in-process routing)
    let client_key = connect_info
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "127.0.0.1".to_string());

    let outcome = state
        .importer
        .import(&request.repo_url, request.branch, &client_key)
        .await?;

    let sandbox_url = format!(
        "{}/containers/{}",
        state.settings.public_base_url(),
        outcome.container_name
    );

    let response = ImportResponse {
        container_id: outcome.container_id,
        container_name: outcome.container_name,
        password: outcome.password,
        sandbox_url,
        file_count: outcome.file_count,
        skipped_count: outcome.skipped_count,
        total_size: outcome.total_size_bytes,
        repo_info: RepoSummary {
            owner: outcome.reference.owner,
            repo: outcome.reference.repo,
            branch: outcome.reference.branch,
            description: outcome.metadata.description,
            stars: outcome.metadata.star_count,
            language: outcome.metadata.language,
        },
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /info?url= - Inspect a repository without importing it
pub async fn repo_info(
    State(state): State<AppState>,
    Query(params): Query<InfoParams>,
) -> Result<Json<InfoResponse>> {
    debug!("Info request: {}", params.url);

    let info = state.importer.repo_info(&params.url).await?;

    let size_human = names::human_size(info.metadata.size_bytes());

    Ok(Json(InfoResponse {
        owner: info.reference.owner,
        repo: info.reference.repo,
        branch: info.reference.branch,
        description: info.metadata.description,
        stars: info.metadata.star_count,
        forks: info.metadata.fork_count,
        language: info.metadata.language,
        size: info.metadata.size_kb,
        size_human,
        is_too_big: info.is_too_big,
        default_branch: info.metadata.default_branch,
    }))
}

/// GET /containers/:name - Browse a container's file list
pub async fn get_container(
    State(state): State<AppState>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> Result<Json<ContainerResponse>> {
    let container = db::containers::get_by_name(&state.pool, &name).await?;

    let password = headers
        .get(PASSWORD_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| Error::Unauthorized("Container password required".to_string()))?;

    if names::hash_password(password) != container.password_hash {
        return Err(Error::Unauthorized("Invalid container password".to_string()));
    }

    let files = db::files::list_for_container(&state.pool, container.id).await?;

    Ok(Json(ContainerResponse {
        name: container.name,
        source_repo: container.source_repo,
        source_branch: container.source_branch,
        created_at: container.created_at.to_rfc3339(),
        files: files
            .into_iter()
            .map(|f| FileView {
                name: f.original_name,
                path: f.relative_path,
                mime_type: f.mime_type,
                size: f.size_bytes,
                url: f.content_url,
            })
            .collect(),
    }))
}

/// GET /health - Liveness check
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}
