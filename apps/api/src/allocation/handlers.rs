//! Axum route handlers for allocation writes and resource load reports.
//!
//! Every write re-runs the interval analyzer over the resource's active
//! allocations as read by the write's own transaction. Over-allocation is
//! logged and returned; it never fails the write.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::allocation::check_allocation;
use crate::allocation::sweep::{analyze, Commitment, LoadReport};
use crate::errors::AppError;
use crate::matching::score::{best_requirement_match, RequirementMatch};
use crate::models::allocation::{Allocation, AllocationChanges, NewAllocation};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct AllocationResponse {
    pub allocation: Allocation,
    /// Only set on create, when the resource matched a project requirement.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirement_match: Option<RequirementMatch>,
    pub load: LoadReport,
    pub load_summary: String,
}

#[derive(Debug, Serialize)]
pub struct ResourceLoadResponse {
    pub resource_id: Uuid,
    pub active_allocations: usize,
    pub load: LoadReport,
    pub load_summary: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn report_load(resource_id: Uuid, active: &[Allocation]) -> Result<LoadReport, AppError> {
    let commitments: Vec<Commitment> = active.iter().map(Commitment::from).collect();
    let report = analyze(&commitments)?;
    if report.is_over_allocated {
        warn!(
            %resource_id,
            max_load = report.max_load,
            excess = report.excess,
            "Resource over-allocated: {report}"
        );
    }
    Ok(report)
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/allocations
///
/// Scores the resource against the project's requirements, stores the best
/// score as `match_score`, then reports the resource's new load.
pub async fn handle_create_allocation(
    State(state): State<AppState>,
    Json(request): Json<NewAllocation>,
) -> Result<Json<AllocationResponse>, AppError> {
    check_allocation(
        request.allocation_percentage,
        request.start_date,
        request.end_date,
    )?;

    let capabilities = state
        .store
        .resource_capabilities(request.resource_id)
        .await?;
    let requirements = state
        .store
        .project_requirements(request.project_id)
        .await?;
    let requirement_match =
        best_requirement_match(&capabilities, &requirements, &state.config.match_weights);
    let match_score = requirement_match.map(|m| m.score as i32);

    let write = state.store.insert_allocation(&request, match_score).await?;
    info!(
        allocation_id = %write.allocation.id,
        resource_id = %request.resource_id,
        project_id = %request.project_id,
        ?match_score,
        "Created allocation"
    );

    let load = report_load(request.resource_id, &write.active)?;
    Ok(Json(AllocationResponse {
        load_summary: load.to_string(),
        allocation: write.allocation,
        requirement_match,
        load,
    }))
}

/// PUT /api/v1/allocations/:id
///
/// Partial update of percentage and dates. The store merges the changes
/// into the current row under the resource's write lock.
pub async fn handle_update_allocation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(changes): Json<AllocationChanges>,
) -> Result<Json<AllocationResponse>, AppError> {
    let write = state
        .store
        .update_allocation(id, &changes)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Allocation {id} not found")))?;
    info!(
        allocation_id = %id,
        resource_id = %write.allocation.resource_id,
        "Updated allocation"
    );

    let load = report_load(write.allocation.resource_id, &write.active)?;
    Ok(Json(AllocationResponse {
        load_summary: load.to_string(),
        allocation: write.allocation,
        requirement_match: None,
        load,
    }))
}

/// DELETE /api/v1/allocations/:id
///
/// Soft delete; the report covers the allocations that remain.
pub async fn handle_delete_allocation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AllocationResponse>, AppError> {
    let write = state
        .store
        .deactivate_allocation(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Allocation {id} not found")))?;
    info!(
        allocation_id = %id,
        resource_id = %write.allocation.resource_id,
        "Deactivated allocation"
    );

    let load = report_load(write.allocation.resource_id, &write.active)?;
    Ok(Json(AllocationResponse {
        load_summary: load.to_string(),
        allocation: write.allocation,
        requirement_match: None,
        load,
    }))
}

/// GET /api/v1/resources/:id/load
pub async fn handle_resource_load(
    State(state): State<AppState>,
    Path(resource_id): Path<Uuid>,
) -> Result<Json<ResourceLoadResponse>, AppError> {
    let active = state.store.resource_allocations(resource_id).await?;
    let load = analyze(&active.iter().map(Commitment::from).collect::<Vec<_>>())?;
    Ok(Json(ResourceLoadResponse {
        resource_id,
        active_allocations: active.len(),
        load_summary: load.to_string(),
        load,
    }))
}
