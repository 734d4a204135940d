use axum::Json;
use serde::Deserialize;

use crate::catalog;
use crate::errors::AppError;
use crate::extract::{AppPath, AppQuery};
use crate::models::category::{CategoryInfo, ResumeCategory};

/// GET /api/v1/categories
pub async fn handle_list_categories() -> Json<&'static [CategoryInfo]> {
    Json(catalog::all())
}

/// GET /api/v1/categories/:id
pub async fn handle_get_category(
    AppPath(id): AppPath<String>,
) -> Result<Json<&'static CategoryInfo>, AppError> {
    let id: ResumeCategory = id
        .parse()
        .map_err(|_| AppError::NotFound(format!("Category {id} not found")))?;
    Ok(Json(catalog::by_id(id)))
}

/// GET /api/v1/categories/subcategories
pub async fn handle_list_subcategories() -> Json<Vec<&'static str>> {
    Json(catalog::all_subcategories())
}

#[derive(Deserialize)]
pub struct LookupQuery {
    pub name: Option<String>,
    pub subcategory: Option<String>,
}

/// GET /api/v1/categories/lookup?name=..|subcategory=..
pub async fn handle_lookup_category(
    AppQuery(q): AppQuery<LookupQuery>,
) -> Result<Json<&'static CategoryInfo>, AppError> {
    let found = match (&q.name, &q.subcategory) {
        (Some(name), _) => catalog::by_name(name),
        (None, Some(sub)) => catalog::from_subcategory(sub),
        (None, None) => {
            return Err(AppError::Validation(
                "Provide either 'name' or 'subcategory'".to_string(),
            ))
        }
    };
    found
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No matching category".to_string()))
}
