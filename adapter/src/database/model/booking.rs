use chrono::{DateTime, NaiveDate, Utc};
use kernel::model::{
    booking::{Booking, BookingDetails, BookingStatus},
    id::{BookingId, ItemId, UserId},
    item::{Item, ItemKind, ItemRef},
    user::BookingUser,
};
use shared::error::{AppError, AppResult};
use sqlx::types::Json;

// users を依頼者・提供者の二役で join した形の行
#[derive(sqlx::FromRow)]
pub struct BookingRow {
    pub booking_id: BookingId,
    pub item_id: ItemId,
    pub item_kind: String,
    pub item_snapshot: Option<Json<Item>>,
    pub requester_id: UserId,
    pub requester_name: String,
    pub provider_id: UserId,
    pub provider_name: String,
    pub requested_quantity: Option<i64>,
    pub scheduled_on: Option<NaiveDate>,
    pub purpose: Option<String>,
    pub attachment: Option<String>,
    pub acres: Option<f64>,
    pub cost: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl BookingRow {
    pub fn item_ref(&self) -> AppResult<ItemRef> {
        let kind: ItemKind = self
            .item_kind
            .parse()
            .map_err(|e: strum::ParseError| AppError::ConversionEntityError(e.to_string()))?;
        Ok(ItemRef::new(kind, self.item_id))
    }

    pub fn status(&self) -> AppResult<BookingStatus> {
        self.status
            .parse()
            .map_err(|e: strum::ParseError| AppError::ConversionEntityError(e.to_string()))
    }

    pub fn details(&self) -> AppResult<BookingDetails> {
        let details = match self.item_ref()?.kind() {
            ItemKind::Manure | ItemKind::NurseryCrop => BookingDetails::Produce {
                requested_quantity: self.requested_quantity.ok_or_else(|| {
                    AppError::ConversionEntityError(
                        "requested_quantity が設定されていません".into(),
                    )
                })?,
            },
            ItemKind::Tractor => BookingDetails::TractorHire {
                scheduled_on: self.scheduled_on.ok_or_else(|| {
                    AppError::ConversionEntityError("scheduled_on が設定されていません".into())
                })?,
                purpose: self
                    .purpose
                    .as_deref()
                    .ok_or_else(|| {
                        AppError::ConversionEntityError("purpose が設定されていません".into())
                    })?
                    .parse()
                    .map_err(|e: strum::ParseError| {
                        AppError::ConversionEntityError(e.to_string())
                    })?,
                attachment: self
                    .attachment
                    .as_deref()
                    .map(str::parse)
                    .transpose()
                    .map_err(|e: strum::ParseError| {
                        AppError::ConversionEntityError(e.to_string())
                    })?,
                acres: self.acres,
                cost: self.cost.clone().ok_or_else(|| {
                    AppError::ConversionEntityError("cost が設定されていません".into())
                })?,
            },
        };
        Ok(details)
    }

    // item は呼び出し側がレジストリから引いて渡す。行自身はソフト参照しか持たない
    pub fn into_booking(self, item: Option<Item>) -> AppResult<Booking> {
        let item_ref = self.item_ref()?;
        let status = self.status()?;
        let details = self.details()?;
        Ok(Booking {
            id: self.booking_id,
            item_ref,
            item,
            item_snapshot: self.item_snapshot.map(|Json(item)| item),
            requester: BookingUser {
                id: self.requester_id,
                name: self.requester_name,
            },
            provider: BookingUser {
                id: self.provider_id,
                name: self.provider_name,
            },
            details,
            status,
            created_at: self.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn produce_row() -> BookingRow {
        BookingRow {
            booking_id: BookingId::new(),
            item_id: ItemId::new(),
            item_kind: "Manure".into(),
            item_snapshot: None,
            requester_id: UserId::new(),
            requester_name: "requester".into(),
            provider_id: UserId::new(),
            provider_name: "provider".into(),
            requested_quantity: Some(4),
            scheduled_on: None,
            purpose: None,
            attachment: None,
            acres: None,
            cost: None,
            status: "pending".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn produce_row_converts_into_booking() {
        let row = produce_row();
        let booking = row.into_booking(None).unwrap();
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(
            booking.details,
            BookingDetails::Produce {
                requested_quantity: 4
            }
        );
        assert_eq!(booking.item_ref.kind(), ItemKind::Manure);
    }

    #[test]
    fn produce_row_without_quantity_is_rejected() {
        let row = BookingRow {
            requested_quantity: None,
            ..produce_row()
        };
        assert!(matches!(
            row.into_booking(None),
            Err(AppError::ConversionEntityError(_))
        ));
    }

    #[test]
    fn unknown_status_is_rejected() {
        let row = BookingRow {
            status: "reopened".into(),
            ..produce_row()
        };
        assert!(matches!(
            row.into_booking(None),
            Err(AppError::ConversionEntityError(_))
        ));
    }
}
