use std::collections::BTreeMap;

use serde::Serialize;

use crate::catalog;
use crate::lifecycle::{badge, timeline, StatusBadge, TimelineStep};
use crate::models::category::CategoryInfo;
use crate::models::request::{ResumeRequest, ResumeStatus};

/// List entry: the stored request plus its display badge and category name.
#[derive(Debug, Serialize)]
pub struct RequestView {
    #[serde(flatten)]
    pub request: ResumeRequest,
    pub badge: StatusBadge,
    pub category_name: &'static str,
    pub client_name: String,
}

impl From<ResumeRequest> for RequestView {
    fn from(request: ResumeRequest) -> Self {
        RequestView {
            badge: badge(request.status),
            category_name: catalog::by_id(request.category).name,
            client_name: request.form_data.personal_info.full_name.clone(),
            request,
        }
    }
}

/// Single request page: badge, progress timeline and the full catalog entry.
#[derive(Debug, Serialize)]
pub struct RequestDetail {
    #[serde(flatten)]
    pub request: ResumeRequest,
    pub badge: StatusBadge,
    pub timeline: Vec<TimelineStep>,
    pub category_info: &'static CategoryInfo,
}

impl From<ResumeRequest> for RequestDetail {
    fn from(request: ResumeRequest) -> Self {
        RequestDetail {
            badge: badge(request.status),
            timeline: timeline(&request),
            category_info: catalog::by_id(request.category),
            request,
        }
    }
}

pub fn views(requests: Vec<ResumeRequest>) -> Vec<RequestView> {
    requests.into_iter().map(RequestView::from).collect()
}

/// Count per status, every status present even at zero.
pub fn status_counts(requests: &[ResumeRequest]) -> BTreeMap<ResumeStatus, usize> {
    let mut counts: BTreeMap<ResumeStatus, usize> =
        ResumeStatus::ALL.iter().map(|s| (*s, 0)).collect();
    for r in requests {
        *counts.entry(r.status).or_default() += 1;
    }
    counts
}

/// Mean of the ratings left so far, `None` before the first one.
pub fn average_rating<'a>(requests: impl IntoIterator<Item = &'a ResumeRequest>) -> Option<f64> {
    let ratings: Vec<f64> = requests
        .into_iter()
        .filter_map(|r| r.feedback.as_ref())
        .map(|f| f64::from(f.rating))
        .collect();
    if ratings.is_empty() {
        None
    } else {
        Some(ratings.iter().sum::<f64>() / ratings.len() as f64)
    }
}
