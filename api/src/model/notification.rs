use chrono::{DateTime, Utc};
use kernel::model::{
    id::{NotificationId, UserId},
    notification::{Notification, NotificationKind},
};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: NotificationId,
    pub user_id: UserId,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_at: Option<DateTime<Utc>>,
    pub timestamp: DateTime<Utc>,
}

impl From<Notification> for NotificationResponse {
    fn from(value: Notification) -> Self {
        let Notification {
            id,
            user_id,
            message,
            kind,
            read_at,
            created_at,
        } = value;
        Self {
            id,
            user_id,
            message,
            kind,
            read_at,
            timestamp: created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub count: i64,
}
