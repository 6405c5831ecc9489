use async_trait::async_trait;
use chrono::NaiveDate;
use derive_new::new;
use kernel::{
    model::{
        booking::{
            event::{AcceptBooking, CancelBooking, CreateBooking, RejectBooking},
            Booking, BookingDetails, BookingStatus,
        },
        id::{BookingId, UserId},
    },
    repository::booking::BookingRepository,
};
use shared::error::{AppError, AppResult};

use crate::{
    database::{model::booking::BookingRow, ConnectionPool},
    repository::item::{debit_item, fetch_item},
};

// 依頼者・提供者を users の二重 join で展開した SELECT。
// 各操作はこの共通句に WHERE を足して使う
const BOOKING_SELECT: &str = r#"
    SELECT
        b.id AS booking_id,
        b.item_id,
        b.item_kind,
        b.item_snapshot,
        b.requester_id,
        ru.name AS requester_name,
        b.provider_id,
        pu.name AS provider_name,
        b.requested_quantity,
        b.scheduled_on,
        b.purpose,
        b.attachment,
        b.acres,
        b.cost,
        b.status,
        b.created_at
    FROM bookings b
    INNER JOIN users ru ON ru.id = b.requester_id
    INNER JOIN users pu ON pu.id = b.provider_id
"#;

#[derive(new)]
pub struct BookingRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl BookingRepository for BookingRepositoryImpl {
    async fn create(&self, event: CreateBooking) -> AppResult<Booking> {
        // ソフト参照なので FK では守られない。作成時点の存在確認はここで行う
        fetch_item(self.db.inner_ref(), event.item_ref)
            .await?
            .ok_or_else(|| {
                AppError::EntityNotFound(format!(
                    "予約対象の {} が見つかりませんでした",
                    event.item_ref.kind()
                ))
            })?;

        let booking_id = BookingId::new();
        let (requested_quantity, scheduled_on, purpose, attachment, acres, cost): (
            Option<i64>,
            Option<NaiveDate>,
            Option<String>,
            Option<String>,
            Option<f64>,
            Option<String>,
        ) = match &event.details {
            BookingDetails::Produce { requested_quantity } => {
                (Some(*requested_quantity), None, None, None, None, None)
            }
            BookingDetails::TractorHire {
                scheduled_on,
                purpose,
                attachment,
                acres,
                cost,
            } => (
                None,
                Some(*scheduled_on),
                Some(purpose.to_string()),
                attachment.as_ref().map(|a| a.to_string()),
                *acres,
                Some(cost.clone()),
            ),
        };

        sqlx::query(
            r#"
            INSERT INTO bookings (
                id, item_id, item_kind, requester_id, provider_id,
                requested_quantity, scheduled_on, purpose, attachment, acres, cost
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(booking_id)
        .bind(event.item_ref.item_id())
        .bind(event.item_ref.kind().as_ref())
        .bind(event.requester_id)
        .bind(event.provider_id)
        .bind(requested_quantity)
        .bind(scheduled_on)
        .bind(purpose)
        .bind(attachment)
        .bind(acres)
        .bind(cost)
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        self.find_by_id(booking_id).await?.ok_or_else(|| {
            AppError::NoRowsAffectedError("作成した予約を取得できませんでした".into())
        })
    }

    async fn find_by_id(&self, booking_id: BookingId) -> AppResult<Option<Booking>> {
        let row: Option<BookingRow> =
            sqlx::query_as(&format!("{BOOKING_SELECT} WHERE b.id = $1"))
                .bind(booking_id)
                .fetch_optional(self.db.inner_ref())
                .await
                .map_err(AppError::SpecificOperationError)?;
        match row {
            None => Ok(None),
            Some(row) => {
                let item = fetch_item(self.db.inner_ref(), row.item_ref()?).await?;
                row.into_booking(item).map(Some)
            }
        }
    }

    async fn find_by_user_id(&self, user_id: UserId) -> AppResult<Vec<Booking>> {
        let rows: Vec<BookingRow> = sqlx::query_as(&format!(
            r#"
            {BOOKING_SELECT}
            WHERE b.requester_id = $1 OR b.provider_id = $1
            ORDER BY b.created_at, b.id
            "#
        ))
        .bind(user_id)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        let mut bookings = Vec::with_capacity(rows.len());
        for row in rows {
            let item = fetch_item(self.db.inner_ref(), row.item_ref()?).await?;
            bookings.push(row.into_booking(item)?);
        }
        Ok(bookings)
    }

    async fn accept(&self, event: AcceptBooking) -> AppResult<Booking> {
        let mut tx = self.db.begin().await?;

        // 行ロックで並行する accept/reject を直列化する
        let row: Option<BookingRow> =
            sqlx::query_as(&format!("{BOOKING_SELECT} WHERE b.id = $1 FOR UPDATE OF b"))
                .bind(event.booking_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(AppError::SpecificOperationError)?;
        let row = row.ok_or_else(|| {
            AppError::EntityNotFound("指定された予約が見つかりませんでした".into())
        })?;

        if row.provider_id != event.acted_by {
            return Err(AppError::ForbiddenOperation);
        }
        let status = row.status()?;
        if status != BookingStatus::Pending {
            return Err(AppError::InvalidStateTransition(format!(
                "{status} の予約は受理できません"
            )));
        }

        let res = sqlx::query(
            "UPDATE bookings SET status = 'accepted' WHERE id = $1 AND status = 'pending'",
        )
        .bind(event.booking_id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;
        if res.rows_affected() == 0 {
            return Err(AppError::InvalidStateTransition(
                "この予約はすでに確定しています".into(),
            ));
        }

        // 在庫の引き落としに失敗したらトランザクションごと巻き戻し、
        // 予約は pending のまま残す
        let item_ref = row.item_ref()?;
        let quantity = row.details()?.requested_quantity();
        debit_item(&mut *tx, item_ref, quantity).await?;

        tx.commit().await.map_err(AppError::TransactionError)?;

        self.find_by_id(event.booking_id).await?.ok_or_else(|| {
            AppError::EntityNotFound("指定された予約が見つかりませんでした".into())
        })
    }

    async fn reject(&self, event: RejectBooking) -> AppResult<Booking> {
        let mut tx = self.db.begin().await?;

        let row: Option<(UserId, String)> = sqlx::query_as(
            "SELECT provider_id, status FROM bookings WHERE id = $1 FOR UPDATE",
        )
        .bind(event.booking_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;
        let (provider_id, status) = row.ok_or_else(|| {
            AppError::EntityNotFound("指定された予約が見つかりませんでした".into())
        })?;
        if provider_id != event.acted_by {
            return Err(AppError::ForbiddenOperation);
        }
        if status != BookingStatus::Pending.as_ref() {
            return Err(AppError::InvalidStateTransition(format!(
                "{status} の予約は拒否できません"
            )));
        }

        let res = sqlx::query(
            "UPDATE bookings SET status = 'rejected' WHERE id = $1 AND status = 'pending'",
        )
        .bind(event.booking_id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;
        if res.rows_affected() == 0 {
            return Err(AppError::InvalidStateTransition(
                "この予約はすでに確定しています".into(),
            ));
        }

        tx.commit().await.map_err(AppError::TransactionError)?;

        self.find_by_id(event.booking_id).await?.ok_or_else(|| {
            AppError::EntityNotFound("指定された予約が見つかりませんでした".into())
        })
    }

    async fn delete(&self, event: CancelBooking) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let row: Option<(UserId, String)> = sqlx::query_as(
            "SELECT requester_id, status FROM bookings WHERE id = $1 FOR UPDATE",
        )
        .bind(event.booking_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;
        let (requester_id, status) = row.ok_or_else(|| {
            AppError::EntityNotFound("指定された予約が見つかりませんでした".into())
        })?;

        // 取り消しは依頼者本人の、pending の予約に限る
        if requester_id != event.requested_by {
            return Err(AppError::ForbiddenOperation);
        }
        if status != BookingStatus::Pending.as_ref() {
            return Err(AppError::InvalidStateTransition(
                "確定済みの予約は取り消せません".into(),
            ));
        }

        let res = sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(event.booking_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;
        if res.rows_affected() == 0 {
            return Err(AppError::NoRowsAffectedError(
                "no booking record has been deleted".into(),
            ));
        }

        tx.commit().await.map_err(AppError::TransactionError)?;
        Ok(())
    }
}
