pub mod client;
pub mod supervisor;
pub mod views;
pub mod writer;

use std::str::FromStr;

use chrono::Utc;
use uuid::Uuid;

use crate::errors::AppError;
use crate::lifecycle::transition;
use crate::models::request::{ResumeRequest, ResumeStatus};
use crate::store::Store;

pub async fn load_request(store: &dyn Store, id: Uuid) -> Result<ResumeRequest, AppError> {
    store
        .find_request(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume request {id} not found")))
}

/// Parses a list filter value; empty or `ALL` means no filter.
pub fn filter_value<T>(raw: Option<&str>, what: &str) -> Result<Option<T>, AppError>
where
    T: FromStr<Err = String>,
{
    match raw.map(str::trim) {
        None | Some("") | Some("ALL") => Ok(None),
        Some(v) => v
            .parse::<T>()
            .map(Some)
            .map_err(|e| AppError::Validation(format!("Invalid {what} filter: {e}"))),
    }
}

/// Applies the move to `target` plus `edit` in memory and returns the new
/// request with the status it must still have in the store.
pub fn stage_transition<F>(
    request: ResumeRequest,
    target: ResumeStatus,
    edit: F,
) -> Result<(ResumeRequest, ResumeStatus), AppError>
where
    F: FnOnce(&mut ResumeRequest),
{
    let expected = request.status;
    let mut updated = request;
    transition(&mut updated, target, Utc::now()).map_err(|e| AppError::Conflict(e.to_string()))?;
    edit(&mut updated);
    Ok((updated, expected))
}

pub fn lost_update(id: Uuid) -> AppError {
    AppError::Conflict(format!("Resume request {id} was updated by someone else"))
}

pub fn log_transition(request: &ResumeRequest, from: ResumeStatus) {
    tracing::info!(
        "Resume request {} moved {} -> {}",
        request.id,
        from.as_str(),
        request.status.as_str()
    );
}

/// Moves `request` to `target`, applies `edit` and persists the result
/// conditionally on the status it was read with. Skipped steps and lost races
/// are both 409.
pub async fn advance_request<F>(
    store: &dyn Store,
    request: ResumeRequest,
    target: ResumeStatus,
    edit: F,
) -> Result<ResumeRequest, AppError>
where
    F: FnOnce(&mut ResumeRequest),
{
    let (updated, expected) = stage_transition(request, target, edit)?;
    if !store.update_request(&updated, expected).await? {
        return Err(lost_update(updated.id));
    }
    log_transition(&updated, expected);
    Ok(updated)
}
