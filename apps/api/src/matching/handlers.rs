//! Axum route handlers for catalog validation, candidate ranking and
//! taxonomy options.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::score::{rank_candidates, RankedCandidate};
use crate::matching::taxonomy::TaxonomyOptions;
use crate::matching::validator::{validate, CatalogCandidate};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct OptionsQuery {
    pub app_id: Uuid,
    pub technology_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct CandidatesQuery {
    pub min_score: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct CandidatesResponse {
    pub requirement_id: Uuid,
    pub open_positions: i32,
    pub min_score: u32,
    pub candidates: Vec<RankedCandidate>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/catalog/validate
///
/// Gate for capability and requirement writes. A candidate with a
/// `resource_id` is a capability and also gets the duplicate-primary check.
pub async fn handle_validate_candidate(
    State(state): State<AppState>,
    Json(candidate): Json<CatalogCandidate>,
) -> Result<StatusCode, AppError> {
    let taxonomy = state.store.load_taxonomy().await?;

    let existing = match candidate.resource_id {
        Some(resource_id) if candidate.is_primary => {
            state.store.resource_capabilities(resource_id).await?
        }
        _ => Vec::new(),
    };

    validate(&candidate, &taxonomy, &existing)?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/requirements/:id/candidates
///
/// Ranks every active capability with the requirement's identity,
/// best-first, dropping those under the threshold.
pub async fn handle_rank_candidates(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<CandidatesQuery>,
) -> Result<Json<CandidatesResponse>, AppError> {
    let min_score = params.min_score.unwrap_or(state.config.min_match_score);
    if min_score > 100 {
        return Err(AppError::Validation(format!(
            "min_score must be between 0 and 100, got {min_score}"
        )));
    }

    let requirement = state
        .store
        .requirement(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Requirement {id} not found")))?;

    let pool = state
        .store
        .capabilities_with_identity(
            requirement.app_id,
            requirement.technology_id,
            requirement.role_id,
        )
        .await?;
    let pool_size = pool.len();

    let candidates = rank_candidates(&requirement, pool, &state.config.match_weights, min_score);
    debug!(
        requirement_id = %id,
        pool_size,
        ranked = candidates.len(),
        min_score,
        "Ranked candidates"
    );

    Ok(Json(CandidatesResponse {
        requirement_id: requirement.id,
        open_positions: requirement.open_positions(),
        min_score,
        candidates,
    }))
}

/// GET /api/v1/taxonomy/options
///
/// Technologies and roles legal under an application (and technology).
pub async fn handle_taxonomy_options(
    State(state): State<AppState>,
    Query(params): Query<OptionsQuery>,
) -> Result<Json<TaxonomyOptions>, AppError> {
    let taxonomy = state.store.load_taxonomy().await?;
    taxonomy
        .options_for(params.app_id, params.technology_id)
        .map(Json)
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "Application {} or technology {:?} not found",
                params.app_id, params.technology_id
            ))
        })
}
