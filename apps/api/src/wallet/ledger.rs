use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::wallet::{Transaction, TransactionStatus, TransactionType, Wallet};

pub const WITHDRAWAL_DESCRIPTION: &str = "Withdrawal to bank account";

/// Folds a writer's transactions into balances.
///
/// - `balance` = completed credits - completed withdrawals
/// - `pending_balance` = credits still waiting on delivery
///
/// Failed transactions count towards nothing. The returned list is newest
/// first.
pub fn summarize(writer_id: Uuid, transactions: &[Transaction]) -> Wallet {
    let sum = |kind: TransactionType, status: TransactionStatus| -> i64 {
        transactions
            .iter()
            .filter(|t| t.kind == kind && t.status == status)
            .map(|t| t.amount)
            .sum()
    };

    let total_earned = sum(TransactionType::Credit, TransactionStatus::Completed);
    let total_withdrawn = sum(TransactionType::Withdrawal, TransactionStatus::Completed);
    let pending_balance = sum(TransactionType::Credit, TransactionStatus::Pending);

    let mut sorted = transactions.to_vec();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let updated_at = sorted
        .iter()
        .map(|t| t.processed_at.unwrap_or(t.created_at))
        .max();

    Wallet {
        writer_id,
        balance: total_earned - total_withdrawn,
        pending_balance,
        total_earned,
        total_withdrawn,
        transactions: sorted,
        updated_at,
    }
}

/// Writer's cut of a request price, rounded half up to whole rupees.
pub fn writer_share(price: i64, share_percent: u8) -> i64 {
    (price * i64::from(share_percent) + 50).div_euclid(100)
}

/// Checks a withdrawal amount against the available balance. The messages are
/// shown to the writer as-is.
pub fn check_withdrawal(amount: i64, balance: i64) -> Result<(), &'static str> {
    if amount <= 0 {
        return Err("Please enter a valid amount");
    }
    if amount > balance {
        return Err("Insufficient balance");
    }
    Ok(())
}

pub fn new_withdrawal(writer_id: Uuid, amount: i64, now: DateTime<Utc>) -> Transaction {
    Transaction {
        id: Uuid::new_v4(),
        writer_id,
        resume_request_id: None,
        kind: TransactionType::Withdrawal,
        amount,
        status: TransactionStatus::Completed,
        description: WITHDRAWAL_DESCRIPTION.to_string(),
        created_at: now,
        processed_at: Some(now),
    }
}

/// Credit booked when a writer uploads the finished resume. It stays pending
/// until the client downloads it.
pub fn new_pending_credit(
    writer_id: Uuid,
    request_id: Uuid,
    amount: i64,
    subcategory: &str,
    now: DateTime<Utc>,
) -> Transaction {
    Transaction {
        id: Uuid::new_v4(),
        writer_id,
        resume_request_id: Some(request_id),
        kind: TransactionType::Credit,
        amount,
        status: TransactionStatus::Pending,
        description: format!("Payment for {subcategory} resume"),
        created_at: now,
        processed_at: None,
    }
}
