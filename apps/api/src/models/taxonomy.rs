use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Top-level node of the skill taxonomy.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Application {
    pub id: Uuid,
    pub name: String,
    pub is_global: bool,
}

/// A technology, optionally scoped to one application. `app_id = None` means
/// the technology is global and usable under any application.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Technology {
    pub id: Uuid,
    pub name: String,
    pub app_id: Option<Uuid>,
}

impl Technology {
    pub fn is_global(&self) -> bool {
        self.app_id.is_none()
    }

    /// True when this technology may appear under `app_id`.
    pub fn usable_under(&self, app_id: Uuid) -> bool {
        self.is_global() || self.app_id == Some(app_id)
    }
}

/// A role, optionally scoped to an application and/or a technology.
/// The two scopes are independent columns.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub app_id: Option<Uuid>,
    pub technology_id: Option<Uuid>,
}

impl Role {
    /// True when this role may appear under `app_id`, and under
    /// `technology_id` when one is given.
    pub fn usable_under(&self, app_id: Uuid, technology_id: Option<Uuid>) -> bool {
        let app_ok = self.app_id.map_or(true, |owner| owner == app_id);
        let tech_ok = match (self.technology_id, technology_id) {
            (None, _) => true,
            (Some(owner), Some(tech)) => owner == tech,
            (Some(_), None) => false,
        };
        app_ok && tech_ok
    }
}
