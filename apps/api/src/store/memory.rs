use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::allocation::check_allocation;
use crate::errors::AppError;
use crate::matching::taxonomy::TaxonomySnapshot;
use crate::models::allocation::{Allocation, AllocationChanges, NewAllocation};
use crate::models::capability::{Capability, Requirement};
use crate::store::{AllocationWrite, CapacityStore};

/// Test double holding everything in memory. Allocations sit behind a mutex
/// so writes and the post-write snapshot happen under one lock.
#[derive(Default)]
pub struct MemoryStore {
    pub taxonomy: TaxonomySnapshot,
    pub capabilities: Vec<Capability>,
    pub requirements: Vec<Requirement>,
    pub allocations: Mutex<Vec<Allocation>>,
}

fn active_for(all: &[Allocation], resource_id: Uuid) -> Vec<Allocation> {
    all.iter()
        .filter(|a| a.resource_id == resource_id && a.is_active)
        .cloned()
        .collect()
}

#[async_trait]
impl CapacityStore for MemoryStore {
    async fn load_taxonomy(&self) -> Result<TaxonomySnapshot, AppError> {
        Ok(self.taxonomy.clone())
    }

    async fn resource_capabilities(&self, resource_id: Uuid) -> Result<Vec<Capability>, AppError> {
        Ok(self
            .capabilities
            .iter()
            .filter(|c| c.resource_id == resource_id)
            .cloned()
            .collect())
    }

    async fn capabilities_with_identity(
        &self,
        app_id: Uuid,
        technology_id: Uuid,
        role_id: Uuid,
    ) -> Result<Vec<Capability>, AppError> {
        Ok(self
            .capabilities
            .iter()
            .filter(|c| {
                c.app_id == app_id && c.technology_id == technology_id && c.role_id == role_id
            })
            .cloned()
            .collect())
    }

    async fn requirement(&self, id: Uuid) -> Result<Option<Requirement>, AppError> {
        Ok(self.requirements.iter().find(|r| r.id == id).cloned())
    }

    async fn project_requirements(&self, project_id: Uuid) -> Result<Vec<Requirement>, AppError> {
        Ok(self
            .requirements
            .iter()
            .filter(|r| r.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn resource_allocations(&self, resource_id: Uuid) -> Result<Vec<Allocation>, AppError> {
        let all = self.allocations.lock().unwrap();
        Ok(active_for(&all, resource_id))
    }

    async fn insert_allocation(
        &self,
        new: &NewAllocation,
        match_score: Option<i32>,
    ) -> Result<AllocationWrite, AppError> {
        let mut all = self.allocations.lock().unwrap();
        let now = Utc::now();
        let allocation = Allocation {
            id: Uuid::new_v4(),
            resource_id: new.resource_id,
            project_id: new.project_id,
            allocation_percentage: new.allocation_percentage,
            start_date: new.start_date,
            end_date: new.end_date,
            match_score,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        all.push(allocation.clone());
        let active = active_for(&all, new.resource_id);
        Ok(AllocationWrite { allocation, active })
    }

    async fn update_allocation(
        &self,
        id: Uuid,
        changes: &AllocationChanges,
    ) -> Result<Option<AllocationWrite>, AppError> {
        let mut all = self.allocations.lock().unwrap();
        let Some(slot) = all.iter_mut().find(|a| a.id == id && a.is_active) else {
            return Ok(None);
        };
        let next = changes.apply_to(slot);
        check_allocation(next.allocation_percentage, next.start_date, next.end_date)?;
        slot.allocation_percentage = next.allocation_percentage;
        slot.start_date = next.start_date;
        slot.end_date = next.end_date;
        slot.updated_at = Utc::now();
        let allocation = slot.clone();
        let active = active_for(&all, allocation.resource_id);
        Ok(Some(AllocationWrite { allocation, active }))
    }

    async fn deactivate_allocation(&self, id: Uuid) -> Result<Option<AllocationWrite>, AppError> {
        let mut all = self.allocations.lock().unwrap();
        let Some(slot) = all.iter_mut().find(|a| a.id == id && a.is_active) else {
            return Ok(None);
        };
        slot.is_active = false;
        slot.updated_at = Utc::now();
        let allocation = slot.clone();
        let active = active_for(&all, allocation.resource_id);
        Ok(Some(AllocationWrite { allocation, active }))
    }
}
