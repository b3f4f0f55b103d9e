//! Constraint Validator — gates writes to the capability/requirement catalog.
//!
//! Pure with respect to the taxonomy snapshot and capability list it is given:
//! no lookups outside them and no writes. Serializing concurrent capability
//! writes per resource is the storage layer's job; this only defines the
//! predicate.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::matching::taxonomy::TaxonomyLookup;
use crate::models::capability::Capability;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Application,
    Technology,
    Role,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityKind::Application => "application",
            EntityKind::Technology => "technology",
            EntityKind::Role => "role",
        })
    }
}

/// Which scoping rule a candidate broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScopeKind {
    /// Technology owned by a different application.
    Technology,
    /// Role owned by a different application.
    RoleApp,
    /// Role owned by a different technology.
    RoleTechnology,
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScopeKind::Technology => "technology",
            ScopeKind::RoleApp => "role-app",
            ScopeKind::RoleTechnology => "role-technology",
        })
    }
}

/// Structural catalog violation. Ids stay machine-readable; text is only
/// produced by `Display`.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConstraintViolation {
    #[error("{entity} {id} not found")]
    NotFound { entity: EntityKind, id: Uuid },

    #[error("{scope} scope mismatch: scoped to {scoped_to}, candidate has {found}")]
    ScopeMismatch {
        scope: ScopeKind,
        scoped_to: Uuid,
        found: Uuid,
    },

    #[error("resource already has primary capability {existing_capability_id}")]
    DuplicatePrimary { existing_capability_id: Uuid },
}

/// A capability (when `resource_id` is set) or requirement triple about to
/// be written.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogCandidate {
    pub app_id: Uuid,
    pub technology_id: Uuid,
    pub role_id: Uuid,
    #[serde(default)]
    pub resource_id: Option<Uuid>,
    #[serde(default)]
    pub is_primary: bool,
    /// Id of the capability being updated, excluded from the primary scan.
    #[serde(default)]
    pub exclude_capability_id: Option<Uuid>,
}

/// Checks a candidate triple against the taxonomy and, for primary
/// capabilities, against the resource's other active capabilities.
///
/// Checks run in a fixed order and the first failure wins:
/// lookups, technology scope, role app scope, role technology scope,
/// duplicate primary.
pub fn validate<T>(
    candidate: &CatalogCandidate,
    taxonomy: &T,
    existing: &[Capability],
) -> Result<(), ConstraintViolation>
where
    T: TaxonomyLookup + ?Sized,
{
    taxonomy
        .application(candidate.app_id)
        .ok_or(ConstraintViolation::NotFound {
            entity: EntityKind::Application,
            id: candidate.app_id,
        })?;
    let technology =
        taxonomy
            .technology(candidate.technology_id)
            .ok_or(ConstraintViolation::NotFound {
                entity: EntityKind::Technology,
                id: candidate.technology_id,
            })?;
    let role = taxonomy
        .role(candidate.role_id)
        .ok_or(ConstraintViolation::NotFound {
            entity: EntityKind::Role,
            id: candidate.role_id,
        })?;

    check_scope(ScopeKind::Technology, technology.app_id, candidate.app_id)?;
    check_scope(ScopeKind::RoleApp, role.app_id, candidate.app_id)?;
    check_scope(
        ScopeKind::RoleTechnology,
        role.technology_id,
        candidate.technology_id,
    )?;

    if candidate.is_primary {
        if let Some(resource_id) = candidate.resource_id {
            if let Some(existing) = find_other_primary(
                resource_id,
                candidate.exclude_capability_id,
                existing,
            ) {
                return Err(ConstraintViolation::DuplicatePrimary {
                    existing_capability_id: existing.id,
                });
            }
        }
    }

    Ok(())
}

fn check_scope(
    scope: ScopeKind,
    owner: Option<Uuid>,
    found: Uuid,
) -> Result<(), ConstraintViolation> {
    match owner {
        Some(scoped_to) if scoped_to != found => Err(ConstraintViolation::ScopeMismatch {
            scope,
            scoped_to,
            found,
        }),
        _ => Ok(()),
    }
}

fn find_other_primary(
    resource_id: Uuid,
    exclude: Option<Uuid>,
    existing: &[Capability],
) -> Option<&Capability> {
    existing.iter().find(|c| {
        c.resource_id == resource_id && c.is_primary && Some(c.id) != exclude
    })
}
