use axum::Json;
use serde::Serialize;

use crate::auth::extractor::ClientUser;
use crate::errors::{AppError, FieldError};
use crate::extract::{AppJson, AppPath};
use crate::intake::validation::{advance, FormStep};
use crate::models::form::ResumeFormData;

#[derive(Serialize)]
pub struct StepInfo {
    pub index: usize,
    pub step: FormStep,
    pub title: &'static str,
    /// Where "Back" leads; the first step points at itself.
    pub previous_step: FormStep,
}

#[derive(Serialize)]
pub struct StepValidationResponse {
    pub step: FormStep,
    pub valid: bool,
    pub errors: Vec<FieldError>,
    pub next_step: Option<FormStep>,
}

/// GET /api/v1/intake/steps
pub async fn handle_list_steps() -> Json<Vec<StepInfo>> {
    Json(
        FormStep::ALL
            .iter()
            .map(|s| StepInfo {
                index: s.index(),
                step: *s,
                title: s.title(),
                previous_step: s.back(),
            })
            .collect(),
    )
}

/// POST /api/v1/intake/steps/:step/validate
pub async fn handle_validate_step(
    ClientUser(_client): ClientUser,
    AppPath(index): AppPath<usize>,
    AppJson(form): AppJson<ResumeFormData>,
) -> Result<Json<StepValidationResponse>, AppError> {
    let step = FormStep::from_index(index)
        .ok_or_else(|| AppError::NotFound(format!("Form step {index} does not exist")))?;

    let response = match advance(step, &form) {
        Ok(next_step) => StepValidationResponse {
            step,
            valid: true,
            errors: vec![],
            next_step,
        },
        Err(errors) => StepValidationResponse {
            step,
            valid: false,
            errors,
            next_step: None,
        },
    };
    Ok(Json(response))
}
