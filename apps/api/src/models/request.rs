use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::category::ResumeCategory;
use crate::models::form::ResumeFormData;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResumeStatus {
    PendingAssignment,
    Assigned,
    InProgress,
    Completed,
    Delivered,
}

impl ResumeStatus {
    pub const ALL: [ResumeStatus; 5] = [
        ResumeStatus::PendingAssignment,
        ResumeStatus::Assigned,
        ResumeStatus::InProgress,
        ResumeStatus::Completed,
        ResumeStatus::Delivered,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResumeStatus::PendingAssignment => "PENDING_ASSIGNMENT",
            ResumeStatus::Assigned => "ASSIGNED",
            ResumeStatus::InProgress => "IN_PROGRESS",
            ResumeStatus::Completed => "COMPLETED",
            ResumeStatus::Delivered => "DELIVERED",
        }
    }
}

impl FromStr for ResumeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResumeStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| format!("unknown status '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Completed => "COMPLETED",
            PaymentStatus::Failed => "FAILED",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(PaymentStatus::Pending),
            "COMPLETED" => Ok(PaymentStatus::Completed),
            "FAILED" => Ok(PaymentStatus::Failed),
            other => Err(format!("unknown payment status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Feedback {
    pub rating: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResumeRequest {
    pub id: Uuid,
    pub client_id: Uuid,
    pub writer_id: Option<Uuid>,
    pub supervisor_id: Option<Uuid>,
    pub category: ResumeCategory,
    pub subcategory: String,
    pub status: ResumeStatus,
    pub form_data: ResumeFormData,
    pub original_resume_url: Option<String>,
    pub completed_resume_url: Option<String>,
    pub certificates_urls: Vec<String>,
    pub price: i64,
    pub payment_id: Option<String>,
    pub payment_status: Option<PaymentStatus>,
    pub feedback: Option<Feedback>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ResumeRequestRow {
    pub id: Uuid,
    pub client_id: Uuid,
    pub writer_id: Option<Uuid>,
    pub supervisor_id: Option<Uuid>,
    pub category: String,
    pub subcategory: String,
    pub status: String,
    pub form_data: Value,
    pub original_resume_url: Option<String>,
    pub completed_resume_url: Option<String>,
    pub certificates_urls: Vec<String>,
    pub price: i64,
    pub payment_id: Option<String>,
    pub payment_status: Option<String>,
    pub feedback: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
}

impl TryFrom<ResumeRequestRow> for ResumeRequest {
    type Error = String;

    fn try_from(row: ResumeRequestRow) -> Result<Self, Self::Error> {
        Ok(ResumeRequest {
            id: row.id,
            client_id: row.client_id,
            writer_id: row.writer_id,
            supervisor_id: row.supervisor_id,
            category: row.category.parse()?,
            subcategory: row.subcategory,
            status: row.status.parse()?,
            form_data: serde_json::from_value(row.form_data).map_err(|e| e.to_string())?,
            original_resume_url: row.original_resume_url,
            completed_resume_url: row.completed_resume_url,
            certificates_urls: row.certificates_urls,
            price: row.price,
            payment_id: row.payment_id,
            payment_status: row
                .payment_status
                .as_deref()
                .map(|s| s.parse::<PaymentStatus>())
                .transpose()?,
            feedback: row
                .feedback
                .map(serde_json::from_value)
                .transpose()
                .map_err(|e| e.to_string())?,
            created_at: row.created_at,
            updated_at: row.updated_at,
            assigned_at: row.assigned_at,
            completed_at: row.completed_at,
            delivered_at: row.delivered_at,
        })
    }
}

/// Selection over stored requests. Empty fields match everything.
#[derive(Debug, Clone, Default)]
pub struct RequestFilter {
    pub client_id: Option<Uuid>,
    pub writer_id: Option<Uuid>,
    pub status: Option<ResumeStatus>,
}

impl RequestFilter {
    pub fn matches(&self, r: &ResumeRequest) -> bool {
        self.client_id.map_or(true, |id| r.client_id == id)
            && self.writer_id.map_or(true, |id| r.writer_id == Some(id))
            && self.status.map_or(true, |s| r.status == s)
    }
}
