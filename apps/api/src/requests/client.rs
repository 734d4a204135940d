use std::collections::BTreeMap;

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::extractor::ClientUser;
use crate::catalog;
use crate::errors::{AppError, FieldError};
use crate::extract::{AppJson, AppPath};
use crate::intake::payment::{process_payment, validate_payment, PaymentDetails};
use crate::intake::validation::validate_form;
use crate::models::category::ResumeCategory;
use crate::models::form::ResumeFormData;
use crate::models::notification::NotificationType;
use crate::models::request::{
    Feedback, PaymentStatus, RequestFilter, ResumeRequest, ResumeStatus,
};
use crate::models::user::UserRecord;
use crate::models::wallet::TransactionStatus;
use crate::notifications::notify;
use crate::requests::views::{status_counts, views, RequestDetail, RequestView};
use crate::requests::{load_request, log_transition, lost_update, stage_transition};
use crate::state::AppState;
use crate::store::Store;

const RECENT_LIMIT: usize = 5;

#[derive(Debug, Deserialize)]
pub struct NewResumeRequest {
    pub category: ResumeCategory,
    pub subcategory: String,
    pub form_data: ResumeFormData,
    pub payment: PaymentDetails,
    #[serde(default)]
    pub original_resume_url: Option<String>,
    #[serde(default)]
    pub certificates_urls: Vec<String>,
}

/// Loads a request owned by `client`. Other clients' requests look missing.
async fn own_request(
    store: &dyn Store,
    client: &UserRecord,
    id: Uuid,
) -> Result<ResumeRequest, AppError> {
    let request = load_request(store, id).await?;
    if request.client_id != client.id {
        return Err(AppError::NotFound(format!("Resume request {id} not found")));
    }
    Ok(request)
}

/// POST /api/v1/client/requests
pub async fn handle_create_request(
    State(state): State<AppState>,
    ClientUser(client): ClientUser,
    AppJson(body): AppJson<NewResumeRequest>,
) -> Result<(StatusCode, Json<RequestDetail>), AppError> {
    let mut errors = Vec::new();
    let resolved = match catalog::resolve(body.category, &body.subcategory) {
        Ok(found) => Some(found),
        Err(msg) => {
            errors.push(FieldError::new("subcategory", msg));
            None
        }
    };
    errors.extend(validate_form(&body.form_data));
    errors.extend(validate_payment(&body.payment));

    let (info, subcategory) = match resolved {
        Some(found) if errors.is_empty() => found,
        _ => return Err(AppError::invalid_fields(errors)),
    };

    let receipt = process_payment(&body.payment, info.price).map_err(AppError::invalid_fields)?;

    let now = Utc::now();
    let request = ResumeRequest {
        id: Uuid::new_v4(),
        client_id: client.id,
        writer_id: None,
        supervisor_id: None,
        category: info.id,
        subcategory: subcategory.to_string(),
        status: ResumeStatus::PendingAssignment,
        form_data: body.form_data,
        original_resume_url: body.original_resume_url,
        completed_resume_url: None,
        certificates_urls: body.certificates_urls,
        price: info.price,
        payment_id: Some(receipt.payment_id.clone()),
        payment_status: Some(receipt.status),
        feedback: None,
        created_at: now,
        updated_at: now,
        assigned_at: None,
        completed_at: None,
        delivered_at: None,
    };
    state.store.insert_request(&request).await?;
    info!(
        "Client {} placed resume request {} ({} / {})",
        client.id,
        request.id,
        info.name,
        subcategory
    );

    notify(
        state.store.as_ref(),
        client.id,
        NotificationType::Payment,
        format!(
            "Payment of ₹{} received for your {} resume",
            info.price, subcategory
        ),
        Some(json!({ "request_id": request.id, "payment_id": receipt.payment_id })),
    )
    .await;

    Ok((StatusCode::CREATED, Json(RequestDetail::from(request))))
}

/// GET /api/v1/client/requests
pub async fn handle_list_requests(
    State(state): State<AppState>,
    ClientUser(client): ClientUser,
) -> Result<Json<Vec<RequestView>>, AppError> {
    let filter = RequestFilter {
        client_id: Some(client.id),
        ..Default::default()
    };
    let requests = state.store.list_requests(&filter).await?;
    Ok(Json(views(requests)))
}

/// GET /api/v1/client/requests/:id
pub async fn handle_get_request(
    State(state): State<AppState>,
    ClientUser(client): ClientUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<RequestDetail>, AppError> {
    let request = own_request(state.store.as_ref(), &client, id).await?;
    Ok(Json(RequestDetail::from(request)))
}

#[derive(Debug, Serialize)]
pub struct DownloadResponse {
    pub download_url: String,
    pub request: RequestDetail,
}

/// POST /api/v1/client/requests/:id/download
///
/// The first download delivers the request and releases the writer's pending
/// credit in one store write. Later downloads hand the URL out again and
/// release any credit still pending against the request.
pub async fn handle_download(
    State(state): State<AppState>,
    ClientUser(client): ClientUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<DownloadResponse>, AppError> {
    let store = state.store.as_ref();
    let request = own_request(store, &client, id).await?;

    let request = match request.status {
        ResumeStatus::Delivered => {
            // Releases credits a delivery left pending; a no-op otherwise.
            let settled = store
                .settle_credits(request.id, TransactionStatus::Completed, Utc::now())
                .await?;
            if settled > 0 {
                warn!(
                    "Resume request {} was delivered with {settled} credit(s) still pending; released",
                    request.id
                );
            }
            request
        }
        ResumeStatus::Completed => {
            let (delivered, expected) = stage_transition(request, ResumeStatus::Delivered, |_| {})?;
            if !store
                .deliver_and_settle(&delivered, expected, Utc::now())
                .await?
            {
                return Err(lost_update(delivered.id));
            }
            log_transition(&delivered, expected);
            if let Some(writer_id) = delivered.writer_id {
                notify(
                    store,
                    writer_id,
                    NotificationType::Delivery,
                    format!(
                        "Your {} resume has been downloaded by the client",
                        delivered.subcategory
                    ),
                    Some(json!({ "request_id": delivered.id })),
                )
                .await;
            }
            delivered
        }
        _ => {
            return Err(AppError::Conflict(
                "Resume is not ready for download yet".to_string(),
            ))
        }
    };

    let download_url = request.completed_resume_url.clone().ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!(
            "request {} is finished but has no resume file",
            request.id
        ))
    })?;

    Ok(Json(DownloadResponse {
        download_url,
        request: RequestDetail::from(request),
    }))
}

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    #[serde(default)]
    pub rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
}

/// POST /api/v1/client/requests/:id/feedback
pub async fn handle_submit_feedback(
    State(state): State<AppState>,
    ClientUser(client): ClientUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(body): AppJson<FeedbackRequest>,
) -> Result<Json<RequestDetail>, AppError> {
    if body.rating == 0 {
        return Err(AppError::Validation("Please select a rating".to_string()));
    }
    if body.rating > 5 {
        return Err(AppError::Validation(
            "Rating must be between 1 and 5".to_string(),
        ));
    }

    let store = state.store.as_ref();
    let mut request = own_request(store, &client, id).await?;
    if request.status != ResumeStatus::Delivered {
        return Err(AppError::Conflict(
            "Feedback can only be left on delivered resumes".to_string(),
        ));
    }
    if request.feedback.is_some() {
        return Err(AppError::Conflict(
            "Feedback has already been submitted".to_string(),
        ));
    }

    let now = Utc::now();
    request.feedback = Some(Feedback {
        rating: body.rating,
        comment: body
            .comment
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty()),
        created_at: now,
    });
    request.updated_at = now;
    if !store.update_request(&request, ResumeStatus::Delivered).await? {
        return Err(lost_update(id));
    }

    if let Some(writer_id) = request.writer_id {
        notify(
            store,
            writer_id,
            NotificationType::Feedback,
            format!(
                "You received a {}-star rating for your {} resume",
                body.rating, request.subcategory
            ),
            Some(json!({ "request_id": request.id, "rating": body.rating })),
        )
        .await;
    }

    Ok(Json(RequestDetail::from(request)))
}

#[derive(Debug, Serialize)]
pub struct ClientDashboard {
    pub total_requests: usize,
    pub status_counts: BTreeMap<ResumeStatus, usize>,
    pub total_spent: i64,
    pub recent_requests: Vec<RequestView>,
}

/// GET /api/v1/client/dashboard
pub async fn handle_dashboard(
    State(state): State<AppState>,
    ClientUser(client): ClientUser,
) -> Result<Json<ClientDashboard>, AppError> {
    let filter = RequestFilter {
        client_id: Some(client.id),
        ..Default::default()
    };
    let requests = state.store.list_requests(&filter).await?;

    let total_spent = requests
        .iter()
        .filter(|r| r.payment_status == Some(PaymentStatus::Completed))
        .map(|r| r.price)
        .sum();

    Ok(Json(ClientDashboard {
        total_requests: requests.len(),
        status_counts: status_counts(&requests),
        total_spent,
        recent_requests: views(requests.into_iter().take(RECENT_LIMIT).collect()),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::user::UserRole;
    use crate::wallet::ledger::{new_pending_credit, summarize};

    fn client() -> UserRecord {
        let now = Utc::now();
        UserRecord {
            id: Uuid::new_v4(),
            email: "meera@example.com".to_string(),
            name: "Meera".to_string(),
            role: UserRole::Client,
            phone: None,
            specialization: None,
            experience: None,
            password_hash: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn finished_request(client_id: Uuid, status: ResumeStatus) -> ResumeRequest {
        let now = Utc::now();
        ResumeRequest {
            id: Uuid::new_v4(),
            client_id,
            writer_id: Some(Uuid::new_v4()),
            supervisor_id: None,
            category: ResumeCategory::It,
            subcategory: "Backend Developer".to_string(),
            status,
            form_data: ResumeFormData::default(),
            original_resume_url: None,
            completed_resume_url: Some("memory://resumes/done.pdf".to_string()),
            certificates_urls: vec![],
            price: 599,
            payment_id: None,
            payment_status: Some(PaymentStatus::Completed),
            feedback: None,
            created_at: now,
            updated_at: now,
            assigned_at: Some(now),
            completed_at: Some(now),
            delivered_at: None,
        }
    }

    async fn seed(state: &AppState, request: &ResumeRequest) -> Uuid {
        let writer_id = request.writer_id.unwrap();
        state.store.insert_request(request).await.unwrap();
        let credit = new_pending_credit(writer_id, request.id, 419, &request.subcategory, Utc::now());
        state.store.insert_transaction(&credit).await.unwrap();
        writer_id
    }

    async fn balances(state: &AppState, writer_id: Uuid) -> (i64, i64) {
        let wallet = summarize(
            writer_id,
            &state.store.list_transactions(Some(writer_id)).await.unwrap(),
        );
        (wallet.balance, wallet.pending_balance)
    }

    #[tokio::test]
    async fn test_first_download_delivers_and_releases_credit() {
        let state = AppState::in_memory(Config::default());
        let owner = client();
        let request = finished_request(owner.id, ResumeStatus::Completed);
        let writer_id = seed(&state, &request).await;

        let Json(resp) = handle_download(State(state.clone()), ClientUser(owner), AppPath(request.id))
            .await
            .unwrap();
        assert_eq!(resp.download_url, "memory://resumes/done.pdf");
        assert_eq!(resp.request.request.status, ResumeStatus::Delivered);
        assert_eq!(balances(&state, writer_id).await, (419, 0));
    }

    #[tokio::test]
    async fn test_download_of_delivered_request_releases_stranded_credit() {
        let state = AppState::in_memory(Config::default());
        let owner = client();
        let request = finished_request(owner.id, ResumeStatus::Delivered);
        let writer_id = seed(&state, &request).await;
        assert_eq!(balances(&state, writer_id).await, (0, 419));

        for _ in 0..2 {
            handle_download(State(state.clone()), ClientUser(owner.clone()), AppPath(request.id))
                .await
                .unwrap();
            assert_eq!(balances(&state, writer_id).await, (419, 0));
        }
    }
}
