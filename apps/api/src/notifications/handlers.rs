use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::extract::{AppPath, AppQuery};
use crate::models::notification::Notification;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct NotificationQuery {
    #[serde(default)]
    pub unread_only: bool,
}

#[derive(Serialize)]
pub struct NotificationListResponse {
    pub unread: usize,
    pub notifications: Vec<Notification>,
}

/// GET /api/v1/notifications
pub async fn handle_list_notifications(
    State(state): State<AppState>,
    current: CurrentUser,
    AppQuery(q): AppQuery<NotificationQuery>,
) -> Result<Json<NotificationListResponse>, AppError> {
    let all = state.store.list_notifications(current.user.id).await?;
    let unread = all.iter().filter(|n| !n.read).count();
    let notifications = if q.unread_only {
        all.into_iter().filter(|n| !n.read).collect()
    } else {
        all
    };
    Ok(Json(NotificationListResponse {
        unread,
        notifications,
    }))
}

/// POST /api/v1/notifications/:id/read
pub async fn handle_mark_read(
    State(state): State<AppState>,
    current: CurrentUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.store.mark_notification_read(current.user.id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Notification {id} not found")))
    }
}
