use async_trait::async_trait;
use sqlx::{PgConnection, PgExecutor, PgPool};
use tracing::debug;
use uuid::Uuid;

use crate::allocation::check_allocation;
use crate::errors::AppError;
use crate::matching::taxonomy::TaxonomySnapshot;
use crate::models::allocation::{Allocation, AllocationChanges, NewAllocation};
use crate::models::capability::{Capability, Requirement};
use crate::models::taxonomy::{Application, Role, Technology};
use crate::store::{AllocationWrite, CapacityStore};

const CAPABILITY_COLUMNS: &str = "id, resource_id, app_id, technology_id, role_id, \
     proficiency_level, years_of_experience, is_primary";

const REQUIREMENT_COLUMNS: &str = "id, project_id, app_id, technology_id, role_id, \
     proficiency_level, min_years_exp, required_count, fulfilled_count";

/// PostgreSQL-backed store. Allocation writes take a per-resource advisory
/// lock so the post-write snapshot cannot interleave with another write to
/// the same resource.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn lock_resource(conn: &mut PgConnection, resource_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1::text, 0))")
        .bind(resource_id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Locks the resource owning an active allocation. `None` if there is no
/// such allocation.
async fn lock_allocation_resource(
    conn: &mut PgConnection,
    id: Uuid,
) -> Result<Option<Uuid>, sqlx::Error> {
    let resource_id: Option<Uuid> = sqlx::query_scalar(
        "SELECT resource_id FROM allocations WHERE id = $1 AND is_active",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;
    if let Some(resource_id) = resource_id {
        lock_resource(conn, resource_id).await?;
    }
    Ok(resource_id)
}

async fn active_allocations<'e, E>(
    executor: E,
    resource_id: Uuid,
) -> Result<Vec<Allocation>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Allocation>(
        "SELECT * FROM allocations WHERE resource_id = $1 AND is_active ORDER BY created_at",
    )
    .bind(resource_id)
    .fetch_all(executor)
    .await
}

#[async_trait]
impl CapacityStore for PgStore {
    async fn load_taxonomy(&self) -> Result<TaxonomySnapshot, AppError> {
        let applications = sqlx::query_as::<_, Application>(
            "SELECT id, name, is_global FROM applications WHERE is_active",
        )
        .fetch_all(&self.pool)
        .await?;
        let technologies = sqlx::query_as::<_, Technology>(
            "SELECT id, name, app_id FROM technologies WHERE is_active",
        )
        .fetch_all(&self.pool)
        .await?;
        let roles = sqlx::query_as::<_, Role>(
            "SELECT id, name, app_id, technology_id FROM roles WHERE is_active",
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(
            applications = applications.len(),
            technologies = technologies.len(),
            roles = roles.len(),
            "Loaded taxonomy snapshot"
        );
        Ok(TaxonomySnapshot::new(applications, technologies, roles))
    }

    async fn resource_capabilities(&self, resource_id: Uuid) -> Result<Vec<Capability>, AppError> {
        Ok(sqlx::query_as::<_, Capability>(&format!(
            "SELECT {CAPABILITY_COLUMNS} FROM resource_capabilities \
             WHERE resource_id = $1 AND is_active ORDER BY created_at"
        ))
        .bind(resource_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn capabilities_with_identity(
        &self,
        app_id: Uuid,
        technology_id: Uuid,
        role_id: Uuid,
    ) -> Result<Vec<Capability>, AppError> {
        Ok(sqlx::query_as::<_, Capability>(&format!(
            "SELECT {CAPABILITY_COLUMNS} FROM resource_capabilities \
             WHERE app_id = $1 AND technology_id = $2 AND role_id = $3 AND is_active \
             ORDER BY created_at"
        ))
        .bind(app_id)
        .bind(technology_id)
        .bind(role_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn requirement(&self, id: Uuid) -> Result<Option<Requirement>, AppError> {
        Ok(sqlx::query_as::<_, Requirement>(&format!(
            "SELECT {REQUIREMENT_COLUMNS} FROM project_requirements WHERE id = $1 AND is_active"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn project_requirements(&self, project_id: Uuid) -> Result<Vec<Requirement>, AppError> {
        Ok(sqlx::query_as::<_, Requirement>(&format!(
            "SELECT {REQUIREMENT_COLUMNS} FROM project_requirements \
             WHERE project_id = $1 AND is_active ORDER BY created_at"
        ))
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn resource_allocations(&self, resource_id: Uuid) -> Result<Vec<Allocation>, AppError> {
        Ok(active_allocations(&self.pool, resource_id).await?)
    }

    async fn insert_allocation(
        &self,
        new: &NewAllocation,
        match_score: Option<i32>,
    ) -> Result<AllocationWrite, AppError> {
        let mut tx = self.pool.begin().await?;
        lock_resource(&mut tx, new.resource_id).await?;

        let allocation = sqlx::query_as::<_, Allocation>(
            r#"
            INSERT INTO allocations
                (id, resource_id, project_id, allocation_percentage, start_date, end_date, match_score)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.resource_id)
        .bind(new.project_id)
        .bind(new.allocation_percentage)
        .bind(new.start_date)
        .bind(new.end_date)
        .bind(match_score)
        .fetch_one(&mut *tx)
        .await?;

        let active = active_allocations(&mut *tx, new.resource_id).await?;
        tx.commit().await?;

        Ok(AllocationWrite { allocation, active })
    }

    async fn update_allocation(
        &self,
        id: Uuid,
        changes: &AllocationChanges,
    ) -> Result<Option<AllocationWrite>, AppError> {
        let mut tx = self.pool.begin().await?;
        let Some(resource_id) = lock_allocation_resource(&mut tx, id).await? else {
            return Ok(None);
        };

        // Re-read under the lock so the merge sees the latest committed row.
        let current = sqlx::query_as::<_, Allocation>(
            "SELECT * FROM allocations WHERE id = $1 AND is_active FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(current) = current else {
            return Ok(None);
        };
        let next = changes.apply_to(&current);
        check_allocation(next.allocation_percentage, next.start_date, next.end_date)?;

        let allocation = sqlx::query_as::<_, Allocation>(
            r#"
            UPDATE allocations
            SET allocation_percentage = $2, start_date = $3, end_date = $4, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(next.allocation_percentage)
        .bind(next.start_date)
        .bind(next.end_date)
        .fetch_one(&mut *tx)
        .await?;

        let active = active_allocations(&mut *tx, resource_id).await?;
        tx.commit().await?;

        Ok(Some(AllocationWrite { allocation, active }))
    }

    async fn deactivate_allocation(&self, id: Uuid) -> Result<Option<AllocationWrite>, AppError> {
        let mut tx = self.pool.begin().await?;
        let Some(resource_id) = lock_allocation_resource(&mut tx, id).await? else {
            return Ok(None);
        };

        let deactivated = sqlx::query_as::<_, Allocation>(
            r#"
            UPDATE allocations
            SET is_active = false, updated_at = now()
            WHERE id = $1 AND is_active
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(allocation) = deactivated else {
            return Ok(None);
        };
        let active = active_allocations(&mut *tx, resource_id).await?;
        tx.commit().await?;

        Ok(Some(AllocationWrite { allocation, active }))
    }
}
