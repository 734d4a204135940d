use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Credit,
    Withdrawal,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Credit => "CREDIT",
            TransactionType::Withdrawal => "WITHDRAWAL",
        }
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREDIT" => Ok(TransactionType::Credit),
            "WITHDRAWAL" => Ok(TransactionType::Withdrawal),
            other => Err(format!("unknown transaction type '{other}'")),
        }
    }
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "PENDING",
            TransactionStatus::Completed => "COMPLETED",
            TransactionStatus::Failed => "FAILED",
        }
    }
}

impl FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(TransactionStatus::Pending),
            "COMPLETED" => Ok(TransactionStatus::Completed),
            "FAILED" => Ok(TransactionStatus::Failed),
            other => Err(format!("unknown transaction status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: Uuid,
    pub writer_id: Uuid,
    pub resume_request_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub amount: i64,
    pub status: TransactionStatus,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, FromRow)]
pub struct TransactionRow {
    pub id: Uuid,
    pub writer_id: Uuid,
    pub resume_request_id: Option<Uuid>,
    pub kind: String,
    pub amount: i64,
    pub status: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = String;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        Ok(Transaction {
            id: row.id,
            writer_id: row.writer_id,
            resume_request_id: row.resume_request_id,
            kind: row.kind.parse()?,
            amount: row.amount,
            status: row.status.parse()?,
            description: row.description,
            created_at: row.created_at,
            processed_at: row.processed_at,
        })
    }
}

/// Derived view of a writer's ledger; never stored.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Wallet {
    pub writer_id: Uuid,
    pub balance: i64,
    pub pending_balance: i64,
    pub total_earned: i64,
    pub total_withdrawn: i64,
    pub transactions: Vec<Transaction>,
    pub updated_at: Option<DateTime<Utc>>,
}
