// School handlers
// HTTP handlers for school registration and proximity listing

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::{debug, info};

use crate::{
    db::Database,
    error::ApiError,
    models::school::{
        CreateSchoolRequest, CreateSchoolResponse, ListSchoolsQuery, ListSchoolsResponse,
    },
};

/// Create a new school
/// POST /addSchool
/// Validation runs before any database work; a body that fails validation
/// never reaches the pool.
pub async fn add_school(
    State(db): State<Arc<Database>>,
    payload: Result<Json<CreateSchoolRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        debug!("Rejected request body: {}", rejection);
        ApiError::Validation(vec!["request body must be valid JSON".to_string()])
    })?;

    let new_school = request.validate().map_err(ApiError::Validation)?;

    info!("Creating school: {}", new_school.name);

    let school = db.insert_school(new_school).await?;

    info!("Successfully created school with id: {}", school.id);
    Ok((
        StatusCode::CREATED,
        Json(CreateSchoolResponse {
            message: "School added successfully".to_string(),
            id: school.id,
            school,
        }),
    ))
}

/// List all schools ordered by distance from the caller's position
/// GET /listSchools?latitude=..&longitude=..
pub async fn list_schools(
    State(db): State<Arc<Database>>,
    Query(params): Query<ListSchoolsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let point = params.validate().map_err(ApiError::Validation)?;

    let schools = db.list_schools_by_distance(point).await?;

    info!("Retrieved {} schools", schools.len());
    Ok((
        StatusCode::OK,
        Json(ListSchoolsResponse {
            count: schools.len(),
            data: schools,
        }),
    ))
}
