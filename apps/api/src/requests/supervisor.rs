use std::collections::{BTreeMap, HashMap};

use axum::{
    extract::State,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::auth::extractor::SupervisorUser;
use crate::catalog;
use crate::errors::AppError;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::models::category::ResumeCategory;
use crate::models::notification::NotificationType;
use crate::models::request::{PaymentStatus, RequestFilter, ResumeRequest, ResumeStatus};
use crate::models::user::{User, UserRole};
use crate::models::wallet::{Transaction, TransactionType};
use crate::notifications::notify;
use crate::requests::views::{average_rating, status_counts, views, RequestDetail, RequestView};
use crate::requests::{advance_request, filter_value, load_request};
use crate::state::AppState;
use crate::wallet::ledger::summarize;

/// GET /api/v1/supervisor/requests/pending
pub async fn handle_list_pending(
    State(state): State<AppState>,
    SupervisorUser(_supervisor): SupervisorUser,
) -> Result<Json<Vec<RequestView>>, AppError> {
    let filter = RequestFilter {
        status: Some(ResumeStatus::PendingAssignment),
        ..Default::default()
    };
    let mut requests = state.store.list_requests(&filter).await?;
    requests.reverse();
    Ok(Json(views(requests)))
}

#[derive(Debug, Default, Deserialize)]
pub struct StatusQuery {
    pub status: Option<String>,
}

/// GET /api/v1/supervisor/requests
pub async fn handle_list_requests(
    State(state): State<AppState>,
    SupervisorUser(_supervisor): SupervisorUser,
    AppQuery(q): AppQuery<StatusQuery>,
) -> Result<Json<Vec<RequestView>>, AppError> {
    let filter = RequestFilter {
        status: filter_value(q.status.as_deref(), "status")?,
        ..Default::default()
    };
    let requests = state.store.list_requests(&filter).await?;
    Ok(Json(views(requests)))
}

#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    pub writer_id: Uuid,
}

/// POST /api/v1/supervisor/requests/:id/assign
pub async fn handle_assign(
    State(state): State<AppState>,
    SupervisorUser(supervisor): SupervisorUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(body): AppJson<AssignRequest>,
) -> Result<Json<RequestDetail>, AppError> {
    let store = state.store.as_ref();
    let writer = store
        .find_user(body.writer_id)
        .await?
        .filter(|u| u.role == UserRole::Writer)
        .ok_or_else(|| AppError::Validation(format!("Writer {} does not exist", body.writer_id)))?;

    let request = load_request(store, id).await?;
    let assigned = advance_request(store, request, ResumeStatus::Assigned, |r| {
        r.writer_id = Some(writer.id);
        r.supervisor_id = Some(supervisor.id);
    })
    .await?;

    notify(
        store,
        writer.id,
        NotificationType::Assignment,
        format!(
            "You have been assigned a new {} resume",
            assigned.subcategory
        ),
        Some(json!({ "request_id": assigned.id })),
    )
    .await;

    Ok(Json(RequestDetail::from(assigned)))
}

#[derive(Debug, Serialize)]
pub struct WriterOverview {
    #[serde(flatten)]
    pub writer: User,
    pub active: usize,
    pub completed: usize,
    pub average_rating: Option<f64>,
    pub balance: i64,
    pub pending_balance: i64,
}

fn group_by_writer<T>(items: Vec<T>, key: impl Fn(&T) -> Option<Uuid>) -> HashMap<Uuid, Vec<T>> {
    let mut grouped: HashMap<Uuid, Vec<T>> = HashMap::new();
    for item in items {
        if let Some(id) = key(&item) {
            grouped.entry(id).or_default().push(item);
        }
    }
    grouped
}

/// GET /api/v1/supervisor/writers
pub async fn handle_list_writers(
    State(state): State<AppState>,
    SupervisorUser(_supervisor): SupervisorUser,
) -> Result<Json<Vec<WriterOverview>>, AppError> {
    let writers = state.store.list_users_by_role(UserRole::Writer).await?;
    let requests = group_by_writer(
        state.store.list_requests(&RequestFilter::default()).await?,
        |r: &ResumeRequest| r.writer_id,
    );
    let transactions = group_by_writer(state.store.list_transactions(None).await?, |t: &Transaction| {
        Some(t.writer_id)
    });

    let overview = writers
        .iter()
        .map(|w| {
            let assigned = requests.get(&w.id).map(Vec::as_slice).unwrap_or_default();
            let txs = transactions.get(&w.id).map(Vec::as_slice).unwrap_or_default();
            let wallet = summarize(w.id, txs);
            WriterOverview {
                writer: User::from(w),
                active: assigned.iter().filter(|r| r.status.is_active()).count(),
                completed: assigned.iter().filter(|r| r.status.is_finished()).count(),
                average_rating: average_rating(assigned),
                balance: wallet.balance,
                pending_balance: wallet.pending_balance,
            }
        })
        .collect();

    Ok(Json(overview))
}

#[derive(Debug, Default, Deserialize)]
pub struct FeedbackQuery {
    pub writer_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct FeedbackEntry {
    pub request_id: Uuid,
    pub client_id: Uuid,
    pub client_name: String,
    pub writer_id: Option<Uuid>,
    pub writer_name: Option<String>,
    pub category: ResumeCategory,
    pub category_name: &'static str,
    pub subcategory: String,
    pub rating: u8,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct FeedbackSummary {
    pub average_rating: Option<f64>,
    pub feedback: Vec<FeedbackEntry>,
}

/// GET /api/v1/supervisor/feedback
pub async fn handle_list_feedback(
    State(state): State<AppState>,
    SupervisorUser(_supervisor): SupervisorUser,
    AppQuery(q): AppQuery<FeedbackQuery>,
) -> Result<Json<FeedbackSummary>, AppError> {
    let filter = RequestFilter {
        writer_id: q.writer_id,
        status: Some(ResumeStatus::Delivered),
        ..Default::default()
    };
    let rated: Vec<ResumeRequest> = state
        .store
        .list_requests(&filter)
        .await?
        .into_iter()
        .filter(|r| r.feedback.is_some())
        .collect();

    let writer_names: HashMap<Uuid, String> = state
        .store
        .list_users_by_role(UserRole::Writer)
        .await?
        .into_iter()
        .map(|w| (w.id, w.name))
        .collect();

    let average = average_rating(&rated);
    let mut feedback: Vec<FeedbackEntry> = rated
        .into_iter()
        .filter_map(|r| {
            let fb = r.feedback?;
            Some(FeedbackEntry {
                request_id: r.id,
                client_id: r.client_id,
                client_name: r.form_data.personal_info.full_name,
                writer_id: r.writer_id,
                writer_name: r.writer_id.and_then(|id| writer_names.get(&id).cloned()),
                category: r.category,
                category_name: catalog::by_id(r.category).name,
                subcategory: r.subcategory,
                rating: fb.rating,
                comment: fb.comment,
                created_at: fb.created_at,
            })
        })
        .collect();
    feedback.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(Json(FeedbackSummary {
        average_rating: average,
        feedback,
    }))
}

#[derive(Debug, Serialize)]
pub struct PayoutSummary {
    pub total_withdrawn: i64,
    pub outstanding_balance: i64,
    pub pending_credits: i64,
    pub withdrawals: Vec<Transaction>,
}

/// GET /api/v1/supervisor/payouts
pub async fn handle_list_payouts(
    State(state): State<AppState>,
    SupervisorUser(_supervisor): SupervisorUser,
) -> Result<Json<PayoutSummary>, AppError> {
    let transactions = state.store.list_transactions(None).await?;
    let (outstanding_balance, pending_credits) = owed_to_writers(transactions.clone());

    let mut withdrawals: Vec<Transaction> = transactions
        .into_iter()
        .filter(|t| t.kind == TransactionType::Withdrawal)
        .collect();
    withdrawals.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let total_withdrawn = summarize(Uuid::nil(), &withdrawals).total_withdrawn;

    Ok(Json(PayoutSummary {
        total_withdrawn,
        outstanding_balance,
        pending_credits,
        withdrawals,
    }))
}

/// Available and pending amounts summed over every writer's wallet.
fn owed_to_writers(transactions: Vec<Transaction>) -> (i64, i64) {
    group_by_writer(transactions, |t: &Transaction| Some(t.writer_id))
        .iter()
        .map(|(id, txs)| summarize(*id, txs))
        .fold((0, 0), |(bal, pending), w| {
            (bal + w.balance, pending + w.pending_balance)
        })
}

#[derive(Debug, Serialize)]
pub struct SupervisorDashboard {
    pub total_requests: usize,
    pub status_counts: BTreeMap<ResumeStatus, usize>,
    pub revenue: i64,
    pub writer_count: usize,
    pub payouts_owed: i64,
    pub pending_payouts: i64,
    pub average_rating: Option<f64>,
}

/// GET /api/v1/supervisor/dashboard
pub async fn handle_dashboard(
    State(state): State<AppState>,
    SupervisorUser(_supervisor): SupervisorUser,
) -> Result<Json<SupervisorDashboard>, AppError> {
    let requests = state.store.list_requests(&RequestFilter::default()).await?;
    let writers = state.store.list_users_by_role(UserRole::Writer).await?;
    let (payouts_owed, pending_payouts) =
        owed_to_writers(state.store.list_transactions(None).await?);

    let revenue = requests
        .iter()
        .filter(|r| r.payment_status == Some(PaymentStatus::Completed))
        .map(|r| r.price)
        .sum();

    Ok(Json(SupervisorDashboard {
        total_requests: requests.len(),
        status_counts: status_counts(&requests),
        revenue,
        writer_count: writers.len(),
        payouts_owed,
        pending_payouts,
        average_rating: average_rating(&requests),
    }))
}
