use async_trait::async_trait;
use shared::error::AppResult;

use crate::model::{
    id::UserId,
    notification::{event::CreateNotification, Notification},
};

#[mockall::automock]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn create(&self, event: CreateNotification) -> AppResult<()>;
    // 新しい順
    async fn find_by_user_id(&self, user_id: UserId) -> AppResult<Vec<Notification>>;
    async fn unread_count(&self, user_id: UserId) -> AppResult<i64>;
    async fn mark_all_read(&self, user_id: UserId) -> AppResult<()>;
}
