use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    Assignment,
    Completion,
    Delivery,
    Payment,
    Feedback,
    Withdrawal,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::Assignment => "ASSIGNMENT",
            NotificationType::Completion => "COMPLETION",
            NotificationType::Delivery => "DELIVERY",
            NotificationType::Payment => "PAYMENT",
            NotificationType::Feedback => "FEEDBACK",
            NotificationType::Withdrawal => "WITHDRAWAL",
        }
    }
}

impl FromStr for NotificationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ASSIGNMENT" => Ok(NotificationType::Assignment),
            "COMPLETION" => Ok(NotificationType::Completion),
            "DELIVERY" => Ok(NotificationType::Delivery),
            "PAYMENT" => Ok(NotificationType::Payment),
            "FEEDBACK" => Ok(NotificationType::Feedback),
            "WITHDRAWAL" => Ok(NotificationType::Withdrawal),
            other => Err(format!("unknown notification type '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, FromRow)]
pub struct NotificationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
    pub data: Option<Value>,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = String;

    fn try_from(row: NotificationRow) -> Result<Self, Self::Error> {
        Ok(Notification {
            id: row.id,
            user_id: row.user_id,
            kind: row.kind.parse()?,
            message: row.message,
            read: row.read,
            created_at: row.created_at,
            data: row.data,
        })
    }
}
