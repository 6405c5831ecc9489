use chrono::{DateTime, Utc};
use kernel::model::{
    id::{NotificationId, UserId},
    notification::Notification,
};
use shared::error::AppError;

#[derive(sqlx::FromRow)]
pub struct NotificationRow {
    pub notification_id: NotificationId,
    pub user_id: UserId,
    pub message: String,
    pub kind: String,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = AppError;

    fn try_from(value: NotificationRow) -> Result<Self, Self::Error> {
        let NotificationRow {
            notification_id,
            user_id,
            message,
            kind,
            read_at,
            created_at,
        } = value;
        let kind = kind
            .parse()
            .map_err(|e: strum::ParseError| AppError::ConversionEntityError(e.to_string()))?;
        Ok(Self {
            id: notification_id,
            user_id,
            message,
            kind,
            read_at,
            created_at,
        })
    }
}
