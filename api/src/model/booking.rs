use chrono::{DateTime, NaiveDate, Utc};
use garde::Validate;
use kernel::model::{
    booking::{
        event::CreateBooking, Booking, BookingDetails, BookingStatus, TractorAttachment,
        TractorPurpose,
    },
    id::{BookingId, ItemId, UserId},
    item::{Item, ItemKind, ItemRef},
    user::BookingUser,
};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, AppResult};

// 予約作成リクエスト。itemType で分岐し、種別ごとの必須フィールドを
// デシリアライズの時点で固定する
#[derive(Debug, Deserialize, Validate)]
#[serde(tag = "itemType")]
pub enum CreateBookingRequest {
    Manure(#[garde(dive)] ProduceBookingRequest),
    Tractor(#[garde(dive)] TractorBookingRequest),
    NurseryCrop(#[garde(dive)] ProduceBookingRequest),
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProduceBookingRequest {
    #[garde(skip)]
    pub item_id: ItemId,
    #[garde(skip)]
    pub provider_id: UserId,
    #[garde(range(min = 1))]
    pub requested_quantity: i64,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TractorBookingRequest {
    #[garde(skip)]
    pub item_id: ItemId,
    #[garde(skip)]
    pub provider_id: UserId,
    #[garde(skip)]
    pub date: NaiveDate,
    #[garde(skip)]
    pub purpose: TractorPurpose,
    #[garde(skip)]
    pub attachment: Option<TractorAttachment>,
    #[garde(skip)]
    pub acres: Option<f64>,
    #[garde(length(min = 1))]
    pub cost: String,
}

impl CreateBookingRequest {
    pub fn into_event(self, requester_id: UserId) -> AppResult<CreateBooking> {
        match self {
            Self::Manure(req) => req.into_event(ItemKind::Manure, requester_id),
            Self::NurseryCrop(req) => req.into_event(ItemKind::NurseryCrop, requester_id),
            Self::Tractor(req) => {
                // acres は purpose が Ploughing のときだけ必須・正
                let acres_valid = match req.purpose {
                    TractorPurpose::Ploughing => matches!(req.acres, Some(a) if a > 0.0),
                    TractorPurpose::LoadTransport => true,
                };
                if !acres_valid {
                    return Err(AppError::UnprocessableEntity(
                        "purpose が Ploughing の場合、acres は正の数で指定してください".into(),
                    ));
                }
                CreateBooking::new(
                    ItemRef::new(ItemKind::Tractor, req.item_id),
                    requester_id,
                    req.provider_id,
                    BookingDetails::TractorHire {
                        scheduled_on: req.date,
                        purpose: req.purpose,
                        attachment: req.attachment,
                        acres: req.acres,
                        cost: req.cost,
                    },
                )
            }
        }
    }
}

impl ProduceBookingRequest {
    fn into_event(self, kind: ItemKind, requester_id: UserId) -> AppResult<CreateBooking> {
        CreateBooking::new(
            ItemRef::new(kind, self.item_id),
            requester_id,
            self.provider_id,
            BookingDetails::Produce {
                requested_quantity: self.requested_quantity,
            },
        )
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub id: BookingId,
    pub item_id: ItemId,
    pub item_type: ItemKind,
    // 元レコードが削除済みの場合はスナップショットが入る
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<Item>,
    pub requester: BookingUserResponse,
    pub provider: BookingUserResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_quantity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<TractorPurpose>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<TractorAttachment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acres: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<String>,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingUserResponse {
    pub id: UserId,
    pub name: String,
}

impl From<BookingUser> for BookingUserResponse {
    fn from(value: BookingUser) -> Self {
        let BookingUser { id, name } = value;
        Self { id, name }
    }
}

impl From<Booking> for BookingResponse {
    fn from(value: Booking) -> Self {
        let item = value.display_item().cloned();
        let Booking {
            id,
            item_ref,
            requester,
            provider,
            details,
            status,
            created_at,
            ..
        } = value;
        let (requested_quantity, date, purpose, attachment, acres, cost) = match details {
            BookingDetails::Produce { requested_quantity } => {
                (Some(requested_quantity), None, None, None, None, None)
            }
            BookingDetails::TractorHire {
                scheduled_on,
                purpose,
                attachment,
                acres,
                cost,
            } => (
                None,
                Some(scheduled_on),
                Some(purpose),
                attachment,
                acres,
                Some(cost),
            ),
        };
        Self {
            id,
            item_id: item_ref.item_id(),
            item_type: item_ref.kind(),
            item,
            requester: requester.into(),
            provider: provider.into(),
            requested_quantity,
            date,
            purpose,
            attachment,
            acres,
            cost,
            status,
            created_at,
        }
    }
}
