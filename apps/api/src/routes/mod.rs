pub mod health;

#[cfg(test)]
pub mod testing;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::allocation::handlers as allocation;
use crate::matching::handlers as matching;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Catalog gate and taxonomy
        .route(
            "/api/v1/catalog/validate",
            post(matching::handle_validate_candidate),
        )
        .route(
            "/api/v1/taxonomy/options",
            get(matching::handle_taxonomy_options),
        )
        .route(
            "/api/v1/requirements/:id/candidates",
            get(matching::handle_rank_candidates),
        )
        // Allocations
        .route(
            "/api/v1/allocations",
            post(allocation::handle_create_allocation),
        )
        .route(
            "/api/v1/allocations/:id",
            put(allocation::handle_update_allocation)
                .delete(allocation::handle_delete_allocation),
        )
        .route(
            "/api/v1/resources/:id/load",
            get(allocation::handle_resource_load),
        )
        .with_state(state)
}
