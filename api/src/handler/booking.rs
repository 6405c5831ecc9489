use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use garde::Validate;
use kernel::model::{
    booking::event::{AcceptBooking, CancelBooking, RejectBooking},
    id::BookingId,
    notification::{event::CreateNotification, NotificationKind},
};
use registry::AppRegistry;
use shared::error::AppResult;

use crate::{
    extractor::AuthorizedUser,
    model::booking::{BookingResponse, CreateBookingRequest},
};

// 通知は best-effort。失敗しても呼び出し元の応答は変えず、ログに残すだけ
fn notify_later(registry: AppRegistry, event: CreateNotification) {
    tokio::spawn(async move {
        if let Err(e) = registry.notification_repository().create(event).await {
            tracing::warn!(
                error.cause_chain = ?e,
                "failed to deliver notification"
            );
        }
    });
}

pub async fn register_booking(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateBookingRequest>,
) -> AppResult<(StatusCode, Json<BookingResponse>)> {
    req.validate(&())?;
    let event = req.into_event(user.id())?;
    let booking = registry.booking_repository().create(event).await?;
    notify_later(
        registry,
        CreateNotification {
            user_id: booking.provider.id,
            message: "A booking request awaits your action.".into(),
            kind: NotificationKind::Success,
        },
    );
    Ok((StatusCode::CREATED, Json(booking.into())))
}

pub async fn list_bookings(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<Vec<BookingResponse>>> {
    let bookings = registry
        .booking_repository()
        .find_by_user_id(user.id())
        .await?
        .into_iter()
        .map(BookingResponse::from)
        .collect();
    Ok(Json(bookings))
}

pub async fn accept_booking(
    user: AuthorizedUser,
    Path(booking_id): Path<BookingId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<BookingResponse>> {
    let booking = registry
        .booking_repository()
        .accept(AcceptBooking {
            booking_id,
            acted_by: user.id(),
        })
        .await?;
    notify_later(
        registry,
        CreateNotification {
            user_id: booking.requester.id,
            message: format!(
                "Your booking request has been accepted for {}.",
                booking.item_ref.kind()
            ),
            kind: NotificationKind::Success,
        },
    );
    Ok(Json(booking.into()))
}

pub async fn reject_booking(
    user: AuthorizedUser,
    Path(booking_id): Path<BookingId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<BookingResponse>> {
    let booking = registry
        .booking_repository()
        .reject(RejectBooking {
            booking_id,
            acted_by: user.id(),
        })
        .await?;
    notify_later(
        registry,
        CreateNotification {
            user_id: booking.requester.id,
            message: format!(
                "Your booking request has been rejected for {}.",
                booking.item_ref.kind()
            ),
            kind: NotificationKind::Error,
        },
    );
    Ok(Json(booking.into()))
}

pub async fn cancel_booking(
    user: AuthorizedUser,
    Path(booking_id): Path<BookingId>,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    registry
        .booking_repository()
        .delete(CancelBooking {
            booking_id,
            requested_by: user.id(),
        })
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
            booking::{Booking, BookingDetails, BookingStatus},
            id::{ItemId, UserId},
            item::{ItemKind, ItemRef},
            user::{BookingUser, User},
        },
        repository::{booking::MockBookingRepository, notification::MockNotificationRepository},
    };
    use registry::MockAppRegistryExt;
    use shared::error::AppError;

    use super::*;

    fn authorized(user_id: UserId) -> AuthorizedUser {
        AuthorizedUser {
            access_token: AccessToken("test-token".into()),
            user: User {
                id: user_id,
                name: "provider".into(),
                email: "provider@example.com".into(),
            },
        }
    }

    fn manure_booking(
        requester_id: UserId,
        provider_id: UserId,
        status: BookingStatus,
    ) -> Booking {
        Booking {
            id: BookingId::new(),
            item_ref: ItemRef::new(ItemKind::Manure, ItemId::new()),
            item: None,
            item_snapshot: None,
            requester: BookingUser {
                id: requester_id,
                name: "requester".into(),
            },
            provider: BookingUser {
                id: provider_id,
                name: "provider".into(),
            },
            details: BookingDetails::Produce {
                requested_quantity: 4,
            },
            status,
            created_at: Utc::now(),
        }
    }

    fn registry_with(
        booking_repo: MockBookingRepository,
        notification_repo: MockNotificationRepository,
    ) -> AppRegistry {
        let mut registry = MockAppRegistryExt::new();
        let booking_repo = Arc::new(booking_repo);
        registry
            .expect_booking_repository()
            .returning(move || booking_repo.clone());
        let notification_repo = Arc::new(notification_repo);
        registry
            .expect_notification_repository()
            .returning(move || notification_repo.clone());
        Arc::new(registry)
    }

    #[tokio::test]
    async fn accept_returns_accepted_booking_and_notifies_requester() {
        let requester_id = UserId::new();
        let provider_id = UserId::new();
        let accepted = manure_booking(requester_id, provider_id, BookingStatus::Accepted);
        let booking_id = accepted.id;

        let mut booking_repo = MockBookingRepository::new();
        let returned = accepted.clone();
        booking_repo
            .expect_accept()
            .withf(move |event| event.booking_id == booking_id && event.acted_by == provider_id)
            .times(1)
            .returning(move |_| Ok(returned.clone()));

        let mut notification_repo = MockNotificationRepository::new();
        notification_repo
            .expect_create()
            .withf(move |event| {
                event.user_id == requester_id
                    && event.kind == NotificationKind::Success
                    && event.message == "Your booking request has been accepted for Manure."
            })
            .times(1)
            .returning(|_| Ok(()));

        let registry = registry_with(booking_repo, notification_repo);
        let Json(res) = accept_booking(authorized(provider_id), Path(booking_id), State(registry))
            .await
            .unwrap();
        assert_eq!(res.status, BookingStatus::Accepted);

        // spawn された通知タスクを走らせてから検証する
        tokio::task::yield_now().await;
    }

    #[tokio::test]
    async fn second_accept_surfaces_invalid_state_and_sends_no_notification() {
        let provider_id = UserId::new();
        let booking_id = BookingId::new();

        let mut booking_repo = MockBookingRepository::new();
        booking_repo.expect_accept().times(1).returning(|_| {
            Err(AppError::InvalidStateTransition(
                "この予約はすでに確定しています".into(),
            ))
        });

        let registry = registry_with(booking_repo, MockNotificationRepository::new());
        let res = accept_booking(authorized(provider_id), Path(booking_id), State(registry)).await;
        assert!(matches!(res, Err(AppError::InvalidStateTransition(_))));
        tokio::task::yield_now().await;
    }

    #[tokio::test]
    async fn insufficient_stock_is_surfaced_to_the_caller() {
        let provider_id = UserId::new();
        let booking_id = BookingId::new();

        let mut booking_repo = MockBookingRepository::new();
        booking_repo.expect_accept().times(1).returning(|_| {
            Err(AppError::InsufficientStock("Manure の在庫が不足しています".into()))
        });

        let registry = registry_with(booking_repo, MockNotificationRepository::new());
        let res = accept_booking(authorized(provider_id), Path(booking_id), State(registry)).await;
        assert!(matches!(res, Err(AppError::InsufficientStock(_))));
        tokio::task::yield_now().await;
    }

    #[tokio::test]
    async fn reject_notifies_requester_with_error_kind() {
        let requester_id = UserId::new();
        let provider_id = UserId::new();
        let rejected = manure_booking(requester_id, provider_id, BookingStatus::Rejected);
        let booking_id = rejected.id;

        let mut booking_repo = MockBookingRepository::new();
        let returned = rejected.clone();
        booking_repo
            .expect_reject()
            .times(1)
            .returning(move |_| Ok(returned.clone()));

        let mut notification_repo = MockNotificationRepository::new();
        notification_repo
            .expect_create()
            .withf(move |event| {
                event.user_id == requester_id
                    && event.kind == NotificationKind::Error
                    && event.message == "Your booking request has been rejected for Manure."
            })
            .times(1)
            .returning(|_| Ok(()));

        let registry = registry_with(booking_repo, notification_repo);
        let Json(res) = reject_booking(authorized(provider_id), Path(booking_id), State(registry))
            .await
            .unwrap();
        assert_eq!(res.status, BookingStatus::Rejected);
        tokio::task::yield_now().await;
    }

    #[tokio::test]
    async fn cancel_by_stranger_is_forbidden() {
        let stranger_id = UserId::new();
        let booking_id = BookingId::new();

        let mut booking_repo = MockBookingRepository::new();
        booking_repo
            .expect_delete()
            .withf(move |event| event.requested_by == stranger_id)
            .times(1)
            .returning(|_| Err(AppError::ForbiddenOperation));

        let registry = registry_with(booking_repo, MockNotificationRepository::new());
        let res = cancel_booking(authorized(stranger_id), Path(booking_id), State(registry)).await;
        assert!(matches!(res, Err(AppError::ForbiddenOperation)));
    }

    #[tokio::test]
    async fn cancel_by_requester_returns_no_content() {
        let requester_id = UserId::new();
        let booking_id = BookingId::new();

        let mut booking_repo = MockBookingRepository::new();
        booking_repo
            .expect_delete()
            .withf(move |event| {
                event.booking_id == booking_id && event.requested_by == requester_id
            })
            .times(1)
            .returning(|_| Ok(()));

        let registry = registry_with(booking_repo, MockNotificationRepository::new());
        let res = cancel_booking(authorized(requester_id), Path(booking_id), State(registry))
            .await
            .unwrap();
        assert_eq!(res, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn create_notifies_provider() {
        let requester_id = UserId::new();
        let provider_id = UserId::new();
        let pending = manure_booking(requester_id, provider_id, BookingStatus::Pending);
        let item_id = pending.item_ref.item_id();

        let mut booking_repo = MockBookingRepository::new();
        let returned = pending.clone();
        booking_repo
            .expect_create()
            .withf(move |event| {
                event.requester_id == requester_id && event.provider_id == provider_id
            })
            .times(1)
            .returning(move |_| Ok(returned.clone()));

        let mut notification_repo = MockNotificationRepository::new();
        notification_repo
            .expect_create()
            .withf(move |event| {
                event.user_id == provider_id
                    && event.message == "A booking request awaits your action."
            })
            .times(1)
            .returning(|_| Ok(()));

        let registry = registry_with(booking_repo, notification_repo);
        let req: CreateBookingRequest = serde_json::from_value(serde_json::json!({
            "itemType": "Manure",
            "itemId": item_id.to_string(),
            "providerId": provider_id.to_string(),
            "requestedQuantity": 4,
        }))
        .unwrap();
        let (status, Json(res)) =
            register_booking(authorized(requester_id), State(registry), Json(req))
                .await
                .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(res.status, BookingStatus::Pending);
        assert_eq!(res.requested_quantity, Some(4));
        tokio::task::yield_now().await;
    }
}
