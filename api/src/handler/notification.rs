use axum::{extract::State, http::StatusCode, Json};
use registry::AppRegistry;
use shared::error::AppResult;

use crate::{
    extractor::AuthorizedUser,
    model::notification::{NotificationResponse, UnreadCountResponse},
};

pub async fn list_notifications(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<Vec<NotificationResponse>>> {
    let notifications = registry
        .notification_repository()
        .find_by_user_id(user.id())
        .await?
        .into_iter()
        .map(NotificationResponse::from)
        .collect();
    Ok(Json(notifications))
}

// ベルバッジの件数。未読の通知数だけを数え、予約の状態からは導出しない
pub async fn unread_notification_count(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<UnreadCountResponse>> {
    let count = registry
        .notification_repository()
        .unread_count(user.id())
        .await?;
    Ok(Json(UnreadCountResponse { count }))
}

pub async fn mark_notifications_read(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    registry
        .notification_repository()
        .mark_all_read(user.id())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use kernel::{
        model::{
            auth::AccessToken,
            id::{NotificationId, UserId},
            notification::{Notification, NotificationKind},
            user::User,
        },
        repository::notification::MockNotificationRepository,
    };
    use registry::MockAppRegistryExt;

    use super::*;

    fn authorized(user_id: UserId) -> AuthorizedUser {
        AuthorizedUser {
            access_token: AccessToken("test-token".into()),
            user: User {
                id: user_id,
                name: "requester".into(),
                email: "requester@example.com".into(),
            },
        }
    }

    fn registry_with(notification_repo: MockNotificationRepository) -> AppRegistry {
        let mut registry = MockAppRegistryExt::new();
        let notification_repo = Arc::new(notification_repo);
        registry
            .expect_notification_repository()
            .returning(move || notification_repo.clone());
        Arc::new(registry)
    }

    #[tokio::test]
    async fn list_returns_caller_notifications() {
        let user_id = UserId::new();
        let notification = Notification {
            id: NotificationId::new(),
            user_id,
            message: "Your booking request has been accepted for Manure.".into(),
            kind: NotificationKind::Success,
            read_at: None,
            created_at: Utc::now(),
        };

        let mut notification_repo = MockNotificationRepository::new();
        let returned = notification.clone();
        notification_repo
            .expect_find_by_user_id()
            .withf(move |id| *id == user_id)
            .times(1)
            .returning(move |_| Ok(vec![returned.clone()]));

        let registry = registry_with(notification_repo);
        let Json(res) = list_notifications(authorized(user_id), State(registry))
            .await
            .unwrap();
        assert_eq!(res.len(), 1);
        assert_eq!(res[0].kind, NotificationKind::Success);
    }

    #[tokio::test]
    async fn unread_count_comes_from_the_notification_store() {
        let user_id = UserId::new();

        let mut notification_repo = MockNotificationRepository::new();
        notification_repo
            .expect_unread_count()
            .times(1)
            .returning(|_| Ok(3));

        let registry = registry_with(notification_repo);
        let Json(res) = unread_notification_count(authorized(user_id), State(registry))
            .await
            .unwrap();
        assert_eq!(res.count, 3);
    }

    #[tokio::test]
    async fn mark_read_returns_no_content() {
        let user_id = UserId::new();

        let mut notification_repo = MockNotificationRepository::new();
        notification_repo
            .expect_mark_all_read()
            .withf(move |id| *id == user_id)
            .times(1)
            .returning(|_| Ok(()));

        let registry = registry_with(notification_repo);
        let res = mark_notifications_read(authorized(user_id), State(registry))
            .await
            .unwrap();
        assert_eq!(res, StatusCode::NO_CONTENT);
    }
}
