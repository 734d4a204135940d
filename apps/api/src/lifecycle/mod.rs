use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::request::{ResumeRequest, ResumeStatus};

impl ResumeStatus {
    /// Successor on the lifecycle, `None` once delivered.
    pub fn next(&self) -> Option<ResumeStatus> {
        match self {
            ResumeStatus::PendingAssignment => Some(ResumeStatus::Assigned),
            ResumeStatus::Assigned => Some(ResumeStatus::InProgress),
            ResumeStatus::InProgress => Some(ResumeStatus::Completed),
            ResumeStatus::Completed => Some(ResumeStatus::Delivered),
            ResumeStatus::Delivered => None,
        }
    }

    /// The lifecycle is strictly linear: only the direct successor is allowed.
    pub fn can_transition_to(&self, target: ResumeStatus) -> bool {
        self.next() == Some(target)
    }

    /// True while a writer still owes work on the request.
    pub fn is_active(&self) -> bool {
        matches!(self, ResumeStatus::Assigned | ResumeStatus::InProgress)
    }

    /// True once the writer has handed in the finished resume.
    pub fn is_finished(&self) -> bool {
        matches!(self, ResumeStatus::Completed | ResumeStatus::Delivered)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionError {
    pub from: ResumeStatus,
    pub to: ResumeStatus,
}

impl std::fmt::Display for TransitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cannot move request from {} to {}",
            self.from.as_str(),
            self.to.as_str()
        )
    }
}

/// Moves the request one step along the lifecycle and stamps the matching
/// milestone timestamp.
pub fn transition(
    request: &mut ResumeRequest,
    target: ResumeStatus,
    now: DateTime<Utc>,
) -> Result<(), TransitionError> {
    if !request.status.can_transition_to(target) {
        return Err(TransitionError {
            from: request.status,
            to: target,
        });
    }
    match target {
        ResumeStatus::Assigned => request.assigned_at = Some(now),
        ResumeStatus::Completed => request.completed_at = Some(now),
        ResumeStatus::Delivered => request.delivered_at = Some(now),
        ResumeStatus::PendingAssignment | ResumeStatus::InProgress => {}
    }
    request.status = target;
    request.updated_at = now;
    Ok(())
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BadgeTone {
    Neutral,
    Warning,
    Secondary,
    Success,
    Accent,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StatusBadge {
    pub label: &'static str,
    pub tone: BadgeTone,
}

pub fn badge(status: ResumeStatus) -> StatusBadge {
    let (label, tone) = match status {
        ResumeStatus::PendingAssignment => ("Pending Assignment", BadgeTone::Neutral),
        ResumeStatus::Assigned => ("Assigned", BadgeTone::Warning),
        ResumeStatus::InProgress => ("In Progress", BadgeTone::Secondary),
        ResumeStatus::Completed => ("Completed", BadgeTone::Success),
        ResumeStatus::Delivered => ("Delivered", BadgeTone::Accent),
    };
    StatusBadge { label, tone }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StepState {
    Complete,
    Pending,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TimelineStep {
    pub name: &'static str,
    pub description: &'static str,
    pub date: Option<DateTime<Utc>>,
    pub state: StepState,
}

fn step(
    name: &'static str,
    description: &'static str,
    date: Option<DateTime<Utc>>,
    done: bool,
) -> TimelineStep {
    TimelineStep {
        name,
        description,
        date,
        state: if done {
            StepState::Complete
        } else {
            StepState::Pending
        },
    }
}

/// Client-facing progress view. "Resume Creation" has no milestone of its
/// own and reuses the assignment date.
pub fn timeline(request: &ResumeRequest) -> Vec<TimelineStep> {
    let status = request.status;
    vec![
        step(
            "Resume Requested",
            "Your resume request has been received",
            Some(request.created_at),
            true,
        ),
        step(
            "Writer Assigned",
            "A professional writer has been assigned to your resume",
            request.assigned_at,
            request.assigned_at.is_some(),
        ),
        step(
            "Resume Creation",
            "Writer is creating your professional resume",
            request.assigned_at,
            status >= ResumeStatus::InProgress,
        ),
        step(
            "Resume Completed",
            "Your resume has been completed and is ready for download",
            request.completed_at,
            status.is_finished(),
        ),
        step(
            "Resume Delivered",
            "You have downloaded your completed resume",
            request.delivered_at,
            status == ResumeStatus::Delivered,
        ),
    ]
}
