pub mod handlers;

use chrono::Utc;
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::models::notification::{Notification, NotificationType};
use crate::store::Store;

/// Records a notification for `user_id`. Failures are logged and swallowed:
/// a lost notification never fails the operation that triggered it.
pub async fn notify(
    store: &dyn Store,
    user_id: Uuid,
    kind: NotificationType,
    message: impl Into<String>,
    data: Option<Value>,
) {
    let notification = Notification {
        id: Uuid::new_v4(),
        user_id,
        kind,
        message: message.into(),
        read: false,
        created_at: Utc::now(),
        data,
    };
    if let Err(e) = store.insert_notification(&notification).await {
        warn!(
            "failed to record {} notification for {user_id}: {e}",
            kind.as_str()
        );
    }
}
