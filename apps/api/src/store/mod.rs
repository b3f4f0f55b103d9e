//! Storage seam for the catalog and allocation data the engine consumes.
//!
//! `AppState` carries an `Arc<dyn CapacityStore>`; `PgStore` backs it in
//! production and an in-memory store backs the handler tests.

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::taxonomy::TaxonomySnapshot;
use crate::models::allocation::{Allocation, AllocationChanges, NewAllocation};
use crate::models::capability::{Capability, Requirement};

pub mod postgres;

#[cfg(test)]
pub mod memory;

/// Result of an allocation write: the written row plus the resource's
/// active allocations as seen by the same transaction, after the write.
#[derive(Debug, Clone)]
pub struct AllocationWrite {
    pub allocation: Allocation,
    pub active: Vec<Allocation>,
}

#[async_trait]
pub trait CapacityStore: Send + Sync {
    /// Every active application, technology and role.
    async fn load_taxonomy(&self) -> Result<TaxonomySnapshot, AppError>;

    async fn resource_capabilities(&self, resource_id: Uuid) -> Result<Vec<Capability>, AppError>;

    /// Active capabilities with exactly this identity triple, oldest first.
    async fn capabilities_with_identity(
        &self,
        app_id: Uuid,
        technology_id: Uuid,
        role_id: Uuid,
    ) -> Result<Vec<Capability>, AppError>;

    async fn requirement(&self, id: Uuid) -> Result<Option<Requirement>, AppError>;

    async fn project_requirements(&self, project_id: Uuid) -> Result<Vec<Requirement>, AppError>;

    async fn resource_allocations(&self, resource_id: Uuid) -> Result<Vec<Allocation>, AppError>;

    async fn insert_allocation(
        &self,
        new: &NewAllocation,
        match_score: Option<i32>,
    ) -> Result<AllocationWrite, AppError>;

    /// Merges `changes` into the active allocation and re-checks the merged
    /// window, all under the resource's write lock. `None` if it is not active.
    async fn update_allocation(
        &self,
        id: Uuid,
        changes: &AllocationChanges,
    ) -> Result<Option<AllocationWrite>, AppError>;

    /// Soft delete. `None` if the allocation is not active.
    async fn deactivate_allocation(&self, id: Uuid) -> Result<Option<AllocationWrite>, AppError>;
}
