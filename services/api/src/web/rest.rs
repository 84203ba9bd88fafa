//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use axum::response::Json;
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};
use workbench_core::profiles;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        list_profiles_handler,
    ),
    components(
        schemas(ProfileResponse)
    ),
    tags(
        (name = "Model Workbench API", description = "API endpoints for the generative model workbench.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// One selectable prompt profile from the compiled-in catalog.
#[derive(Serialize, ToSchema)]
pub struct ProfileResponse {
    id: String,
    label: String,
    instruction: String,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// List the selectable prompt profiles.
///
/// The catalog is compiled in and identical for every session; clients use it
/// to populate the profile picker before the socket opens.
#[utoipa::path(
    get,
    path = "/profiles",
    responses(
        (status = 200, description = "The profile catalog", body = [ProfileResponse])
    )
)]
pub async fn list_profiles_handler() -> Json<Vec<ProfileResponse>> {
    let catalog = profiles::catalog()
        .iter()
        .map(|profile| ProfileResponse {
            id: profile.id.to_string(),
            label: profile.label.to_string(),
            instruction: profile.instruction.to_string(),
        })
        .collect();
    Json(catalog)
}
