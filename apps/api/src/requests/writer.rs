use std::collections::BTreeMap;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::extractor::WriterUser;
use crate::errors::AppError;
use crate::extract::{AppPath, AppQuery};
use crate::models::category::ResumeCategory;
use crate::models::notification::NotificationType;
use crate::models::request::{RequestFilter, ResumeRequest, ResumeStatus};
use crate::models::user::UserRecord;
use crate::notifications::notify;
use crate::requests::views::{average_rating, status_counts, views, RequestDetail, RequestView};
use crate::requests::{
    advance_request, filter_value, load_request, log_transition, lost_update, stage_transition,
};
use crate::state::AppState;
use crate::store::Store;
use crate::wallet::ledger::{new_pending_credit, summarize, writer_share};

const PDF: &str = "application/pdf";
const DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Loads a request assigned to `writer`. Anyone else's work looks missing.
async fn assigned_request(
    store: &dyn Store,
    writer: &UserRecord,
    id: Uuid,
) -> Result<ResumeRequest, AppError> {
    let request = load_request(store, id).await?;
    if request.writer_id != Some(writer.id) {
        return Err(AppError::NotFound(format!("Resume request {id} not found")));
    }
    Ok(request)
}

#[derive(Debug, Default, Deserialize)]
pub struct WriterRequestQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub category: Option<String>,
}

/// Search matches the subcategory or the client's name, case-insensitively.
fn matches_search(request: &ResumeRequest, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    request.subcategory.to_lowercase().contains(&needle)
        || request
            .form_data
            .personal_info
            .full_name
            .to_lowercase()
            .contains(&needle)
}

/// GET /api/v1/writer/requests
pub async fn handle_list_requests(
    State(state): State<AppState>,
    WriterUser(writer): WriterUser,
    AppQuery(q): AppQuery<WriterRequestQuery>,
) -> Result<Json<Vec<RequestView>>, AppError> {
    let status: Option<ResumeStatus> = filter_value(q.status.as_deref(), "status")?;
    let category: Option<ResumeCategory> = filter_value(q.category.as_deref(), "category")?;
    let search = q.search.as_deref().map(str::trim).filter(|s| !s.is_empty());

    let filter = RequestFilter {
        writer_id: Some(writer.id),
        status,
        ..Default::default()
    };
    let requests = state
        .store
        .list_requests(&filter)
        .await?
        .into_iter()
        .filter(|r| category.map_or(true, |c| r.category == c))
        .filter(|r| search.map_or(true, |s| matches_search(r, s)))
        .collect();

    Ok(Json(views(requests)))
}

/// GET /api/v1/writer/requests/:id
pub async fn handle_get_request(
    State(state): State<AppState>,
    WriterUser(writer): WriterUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<RequestDetail>, AppError> {
    let request = assigned_request(state.store.as_ref(), &writer, id).await?;
    Ok(Json(RequestDetail::from(request)))
}

/// POST /api/v1/writer/requests/:id/start
pub async fn handle_start(
    State(state): State<AppState>,
    WriterUser(writer): WriterUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<RequestDetail>, AppError> {
    let store = state.store.as_ref();
    let request = assigned_request(store, &writer, id).await?;
    let started = advance_request(store, request, ResumeStatus::InProgress, |_| {}).await?;
    Ok(Json(RequestDetail::from(started)))
}

struct UploadedFile {
    content_type: String,
    file_name: Option<String>,
    body: Bytes,
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("File size must be less than 10MB".to_string())
    } else {
        AppError::Validation(format!("Malformed upload: {}", e.body_text()))
    }
}

/// Pulls the `file` part out of the form; other parts are ignored.
async fn read_file_field(multipart: &mut Multipart) -> Result<UploadedFile, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field.content_type().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let body = field.bytes().await.map_err(multipart_error)?;
        return Ok(UploadedFile {
            content_type,
            file_name,
            body,
        });
    }
    Err(AppError::Validation("Please select a file to upload".to_string()))
}

fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        PDF => Some("pdf"),
        DOCX => Some("docx"),
        _ => None,
    }
}

/// POST /api/v1/writer/requests/:id/upload
///
/// Stores the finished resume, then completes the request and books the
/// writer's pending credit in one store write.
pub async fn handle_upload(
    State(state): State<AppState>,
    WriterUser(writer): WriterUser,
    AppPath(id): AppPath<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<RequestDetail>, AppError> {
    let store = state.store.as_ref();
    let request = assigned_request(store, &writer, id).await?;
    if request.status != ResumeStatus::InProgress {
        return Err(AppError::Conflict(format!(
            "Cannot upload a resume while the request is {}",
            request.status.as_str()
        )));
    }

    let file = read_file_field(&mut multipart).await?;
    let ext = extension_for(&file.content_type).ok_or_else(|| {
        AppError::UnsupportedMediaType("Please select a PDF or DOCX file".to_string())
    })?;
    if file.body.is_empty() {
        return Err(AppError::Validation("Uploaded file is empty".to_string()));
    }
    if file.body.len() > state.config.max_upload_bytes {
        return Err(AppError::PayloadTooLarge(
            "File size must be less than 10MB".to_string(),
        ));
    }

    let key = format!("resumes/{}/{}.{}", request.id, Uuid::new_v4(), ext);
    let size = file.body.len();
    let url = state
        .storage
        .put(&key, file.body, &file.content_type)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;
    info!(
        "Writer {} uploaded {} ({size} bytes) for request {}",
        writer.id,
        file.file_name.as_deref().unwrap_or("resume"),
        request.id
    );

    let (completed, expected) = stage_transition(request, ResumeStatus::Completed, |r| {
        r.completed_resume_url = Some(url.clone());
    })?;
    let amount = writer_share(completed.price, state.config.writer_share_percent);
    let credit = new_pending_credit(
        writer.id,
        completed.id,
        amount,
        &completed.subcategory,
        Utc::now(),
    );
    if !store.complete_with_credit(&completed, expected, &credit).await? {
        warn!("Upload {url} is orphaned: request {id} changed meanwhile");
        return Err(lost_update(id));
    }
    log_transition(&completed, expected);

    notify(
        store,
        completed.client_id,
        NotificationType::Completion,
        format!(
            "Your {} resume is ready for download",
            completed.subcategory
        ),
        Some(json!({ "request_id": completed.id })),
    )
    .await;

    Ok(Json(RequestDetail::from(completed)))
}

#[derive(Debug, Serialize)]
pub struct WriterDashboard {
    pub active: usize,
    pub completed: usize,
    pub status_counts: BTreeMap<ResumeStatus, usize>,
    pub category_counts: BTreeMap<ResumeCategory, usize>,
    pub total_earned: i64,
    pub pending_earnings: i64,
    pub available_balance: i64,
    pub average_rating: Option<f64>,
    pub active_requests: Vec<RequestView>,
}

/// GET /api/v1/writer/dashboard
pub async fn handle_dashboard(
    State(state): State<AppState>,
    WriterUser(writer): WriterUser,
) -> Result<Json<WriterDashboard>, AppError> {
    let filter = RequestFilter {
        writer_id: Some(writer.id),
        ..Default::default()
    };
    let requests = state.store.list_requests(&filter).await?;
    let transactions = state.store.list_transactions(Some(writer.id)).await?;
    let wallet = summarize(writer.id, &transactions);

    let mut category_counts = BTreeMap::new();
    for r in &requests {
        *category_counts.entry(r.category).or_insert(0) += 1;
    }

    let active_requests: Vec<ResumeRequest> = requests
        .iter()
        .filter(|r| r.status.is_active())
        .cloned()
        .collect();

    Ok(Json(WriterDashboard {
        active: active_requests.len(),
        completed: requests.iter().filter(|r| r.status.is_finished()).count(),
        status_counts: status_counts(&requests),
        category_counts,
        total_earned: wallet.total_earned,
        pending_earnings: wallet.pending_balance,
        available_balance: wallet.balance,
        average_rating: average_rating(&requests),
        active_requests: views(active_requests),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::form::ResumeFormData;

    fn request(subcategory: &str, client: &str) -> ResumeRequest {
        let now = Utc::now();
        let mut form = ResumeFormData::default();
        form.personal_info.full_name = client.to_string();
        ResumeRequest {
            id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            writer_id: None,
            supervisor_id: None,
            category: ResumeCategory::It,
            subcategory: subcategory.to_string(),
            status: ResumeStatus::Assigned,
            form_data: form,
            original_resume_url: None,
            completed_resume_url: None,
            certificates_urls: vec![],
            price: 599,
            payment_id: None,
            payment_status: None,
            feedback: None,
            created_at: now,
            updated_at: now,
            assigned_at: None,
            completed_at: None,
            delivered_at: None,
        }
    }

    #[test]
    fn test_search_matches_subcategory_or_client_name() {
        let r = request("DevOps Engineer", "Meera Iyer");
        assert!(matches_search(&r, "devops"));
        assert!(matches_search(&r, "IYER"));
        assert!(!matches_search(&r, "nurse"));
    }

    #[test]
    fn test_only_pdf_and_docx_are_accepted() {
        assert_eq!(extension_for(PDF), Some("pdf"));
        assert_eq!(extension_for(DOCX), Some("docx"));
        assert_eq!(extension_for("image/png"), None);
        assert_eq!(extension_for(""), None);
    }
}
