//! Taxonomy Graph — Application → Technology → Role scoping model.
//!
//! The graph is a small read-mostly reference set, so callers load it once
//! into a `TaxonomySnapshot` and hand it to the validator by reference.

use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use crate::models::taxonomy::{Application, Role, Technology};

/// Read access to taxonomy nodes by id. The validator only needs this.
pub trait TaxonomyLookup {
    fn application(&self, id: Uuid) -> Option<&Application>;
    fn technology(&self, id: Uuid) -> Option<&Technology>;
    fn role(&self, id: Uuid) -> Option<&Role>;
}

#[derive(Debug, Clone, Default)]
pub struct TaxonomySnapshot {
    applications: HashMap<Uuid, Application>,
    technologies: HashMap<Uuid, Technology>,
    roles: HashMap<Uuid, Role>,
}

/// Technologies and roles that are legal beneath one application.
#[derive(Debug, Clone, Serialize)]
pub struct TaxonomyOptions {
    pub application: Application,
    pub technologies: Vec<Technology>,
    pub roles: Vec<Role>,
}

impl TaxonomySnapshot {
    pub fn new(
        applications: Vec<Application>,
        technologies: Vec<Technology>,
        roles: Vec<Role>,
    ) -> Self {
        Self {
            applications: applications.into_iter().map(|a| (a.id, a)).collect(),
            technologies: technologies.into_iter().map(|t| (t.id, t)).collect(),
            roles: roles.into_iter().map(|r| (r.id, r)).collect(),
        }
    }

    /// Technologies usable under `app_id`: global ones plus those scoped to it.
    pub fn technologies_under(&self, app_id: Uuid) -> Vec<&Technology> {
        let mut techs: Vec<&Technology> = self
            .technologies
            .values()
            .filter(|t| t.usable_under(app_id))
            .collect();
        techs.sort_by(|a, b| a.name.cmp(&b.name));
        techs
    }

    /// Roles usable under `app_id`, narrowed to `technology_id` when given.
    /// Without a technology, technology-scoped roles are only offered when
    /// their technology itself lives under `app_id`.
    pub fn roles_under(&self, app_id: Uuid, technology_id: Option<Uuid>) -> Vec<&Role> {
        let mut roles: Vec<&Role> = self
            .roles
            .values()
            .filter(|r| match technology_id {
                Some(_) => r.usable_under(app_id, technology_id),
                None => {
                    let app_ok = r.app_id.map_or(true, |owner| owner == app_id);
                    let tech_ok = r.technology_id.map_or(true, |tech| {
                        self.technology(tech)
                            .is_some_and(|t| t.usable_under(app_id))
                    });
                    app_ok && tech_ok
                }
            })
            .collect();
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        roles
    }

    /// Builds the option lists for an application. `None` when the
    /// application (or the given technology) is unknown.
    pub fn options_for(
        &self,
        app_id: Uuid,
        technology_id: Option<Uuid>,
    ) -> Option<TaxonomyOptions> {
        let application = self.application(app_id)?.clone();
        if let Some(tech) = technology_id {
            self.technology(tech)?;
        }
        Some(TaxonomyOptions {
            application,
            technologies: self.technologies_under(app_id).into_iter().cloned().collect(),
            roles: self
                .roles_under(app_id, technology_id)
                .into_iter()
                .cloned()
                .collect(),
        })
    }
}

impl TaxonomyLookup for TaxonomySnapshot {
    fn application(&self, id: Uuid) -> Option<&Application> {
        self.applications.get(&id)
    }

    fn technology(&self, id: Uuid) -> Option<&Technology> {
        self.technologies.get(&id)
    }

    fn role(&self, id: Uuid) -> Option<&Role> {
        self.roles.get(&id)
    }
}
