use async_trait::async_trait;
use derive_new::new;
use kernel::{
    model::{
        id::{NotificationId, UserId},
        notification::{event::CreateNotification, Notification},
    },
    repository::notification::NotificationRepository,
};
use shared::error::{AppError, AppResult};

use crate::database::{model::notification::NotificationRow, ConnectionPool};

#[derive(new)]
pub struct NotificationRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl NotificationRepository for NotificationRepositoryImpl {
    async fn create(&self, event: CreateNotification) -> AppResult<()> {
        sqlx::query("INSERT INTO notifications (id, user_id, message, kind) VALUES ($1, $2, $3, $4)")
            .bind(NotificationId::new())
            .bind(event.user_id)
            .bind(event.message)
            .bind(event.kind.as_ref())
            .execute(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;
        Ok(())
    }

    async fn find_by_user_id(&self, user_id: UserId) -> AppResult<Vec<Notification>> {
        let rows: Vec<NotificationRow> = sqlx::query_as(
            r#"
            SELECT
                id AS notification_id,
                user_id,
                message,
                kind,
                read_at,
                created_at
            FROM notifications
            WHERE user_id = $1
            ORDER BY created_at DESC, id
            "#,
        )
        .bind(user_id)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;
        rows.into_iter().map(Notification::try_from).collect()
    }

    async fn unread_count(&self, user_id: UserId) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND read_at IS NULL",
        )
        .bind(user_id)
        .fetch_one(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;
        Ok(count)
    }

    async fn mark_all_read(&self, user_id: UserId) -> AppResult<()> {
        sqlx::query(
            "UPDATE notifications SET read_at = now() WHERE user_id = $1 AND read_at IS NULL",
        )
        .bind(user_id)
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;
        Ok(())
    }
}
