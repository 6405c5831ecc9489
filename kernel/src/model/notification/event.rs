use super::NotificationKind;
use crate::model::id::UserId;

pub struct CreateNotification {
    pub user_id: UserId,
    pub message: String,
    pub kind: NotificationKind,
}
