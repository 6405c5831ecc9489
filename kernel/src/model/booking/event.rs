use shared::error::{AppError, AppResult};

use super::BookingDetails;
use crate::model::{
    id::{BookingId, UserId},
    item::ItemRef,
};

pub struct CreateBooking {
    pub item_ref: ItemRef,
    pub requester_id: UserId,
    pub provider_id: UserId,
    pub details: BookingDetails,
}

impl CreateBooking {
    // アイテム種別と詳細の組み合わせ、および自己予約をここで弾く。
    // ストアに届く時点で不正な組み合わせは存在しない
    pub fn new(
        item_ref: ItemRef,
        requester_id: UserId,
        provider_id: UserId,
        details: BookingDetails,
    ) -> AppResult<Self> {
        if !details.matches_kind(item_ref.kind()) {
            return Err(AppError::UnprocessableEntity(format!(
                "予約内容が {} のアイテム種別と一致しません",
                item_ref.kind()
            )));
        }
        if requester_id == provider_id {
            return Err(AppError::UnprocessableEntity(
                "依頼者と提供者が同一の予約は作成できません".into(),
            ));
        }
        Ok(Self {
            item_ref,
            requester_id,
            provider_id,
            details,
        })
    }
}

pub struct AcceptBooking {
    pub booking_id: BookingId,
    pub acted_by: UserId,
}

pub struct RejectBooking {
    pub booking_id: BookingId,
    pub acted_by: UserId,
}

pub struct CancelBooking {
    pub booking_id: BookingId,
    pub requested_by: UserId,
}
