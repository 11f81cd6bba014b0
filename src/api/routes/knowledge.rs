use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::error::{ApiError, ApiJson};
use crate::api::state::AppState;
use crate::application::KnowledgeService;

#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    pub name: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub id: Uuid,
    pub name: String,
    pub chunks: usize,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SearchHit {
    pub chunk_id: Uuid,
    pub document_id: Uuid,
    pub content: String,
    pub score: f32,
}

fn knowledge(state: &AppState) -> Result<&Arc<KnowledgeService>, ApiError> {
    state
        .knowledge
        .as_ref()
        .ok_or_else(|| ApiError::Unavailable("Knowledge base not available".to_string()))
}

pub async fn ingest(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<IngestRequest>,
) -> Result<(StatusCode, Json<IngestResponse>), ApiError> {
    let report = knowledge(&state)?
        .ingest(&request.name, &request.content)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(IngestResponse {
            id: report.document.id,
            name: report.document.name,
            chunks: report.chunks,
            created_at: report.document.created_at,
        }),
    ))
}

pub async fn search(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SearchRequest>,
) -> Result<Json<Vec<SearchHit>>, ApiError> {
    let results = knowledge(&state)?
        .search(&request.query, request.limit)
        .await?;

    let hits = results
        .into_iter()
        .map(|r| SearchHit {
            chunk_id: r.chunk.id,
            document_id: r.chunk.document_id,
            content: r.chunk.content,
            score: r.score,
        })
        .collect();

    Ok(Json(hits))
}

pub async fn delete_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    knowledge(&state)?.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
