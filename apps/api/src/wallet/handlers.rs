use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::auth::extractor::WriterUser;
use crate::errors::AppError;
use crate::extract::AppJson;
use crate::models::notification::NotificationType;
use crate::models::wallet::{Transaction, Wallet};
use crate::notifications::notify;
use crate::state::AppState;
use crate::wallet::ledger::{check_withdrawal, new_withdrawal, summarize};

/// GET /api/v1/writer/wallet
pub async fn handle_get_wallet(
    State(state): State<AppState>,
    WriterUser(writer): WriterUser,
) -> Result<Json<Wallet>, AppError> {
    let transactions = state.store.list_transactions(Some(writer.id)).await?;
    Ok(Json(summarize(writer.id, &transactions)))
}

#[derive(Debug, Deserialize)]
pub struct WithdrawalRequest {
    #[serde(default)]
    pub amount: i64,
}

#[derive(Debug, Serialize)]
pub struct WithdrawalResponse {
    pub transaction: Transaction,
    pub wallet: Wallet,
}

/// POST /api/v1/writer/wallet/withdrawals
///
/// The balance is checked up front for the error message, then again by the
/// store while it writes, so two concurrent withdrawals cannot overdraw.
pub async fn handle_withdraw(
    State(state): State<AppState>,
    WriterUser(writer): WriterUser,
    AppJson(body): AppJson<WithdrawalRequest>,
) -> Result<(StatusCode, Json<WithdrawalResponse>), AppError> {
    let store = state.store.as_ref();
    let current = summarize(writer.id, &store.list_transactions(Some(writer.id)).await?);
    check_withdrawal(body.amount, current.balance)
        .map_err(|msg| AppError::Validation(msg.to_string()))?;

    let tx = new_withdrawal(writer.id, body.amount, Utc::now());
    if !store.insert_withdrawal(&tx).await? {
        warn!(
            "Withdrawal of ₹{} by writer {} lost to a concurrent withdrawal",
            body.amount, writer.id
        );
        return Err(AppError::Validation("Insufficient balance".to_string()));
    }
    info!("Writer {} withdrew ₹{}", writer.id, body.amount);

    notify(
        store,
        writer.id,
        NotificationType::Withdrawal,
        format!("₹{} has been withdrawn to your bank account", body.amount),
        Some(json!({ "transaction_id": tx.id, "amount": body.amount })),
    )
    .await;

    let wallet = summarize(writer.id, &store.list_transactions(Some(writer.id)).await?);
    Ok((
        StatusCode::CREATED,
        Json(WithdrawalResponse {
            transaction: tx,
            wallet,
        }),
    ))
}
