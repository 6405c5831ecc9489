use async_trait::async_trait;
use shared::error::AppResult;

use crate::model::{
    booking::{
        event::{AcceptBooking, CancelBooking, CreateBooking, RejectBooking},
        Booking,
    },
    id::{BookingId, UserId},
};

#[mockall::automock]
#[async_trait]
pub trait BookingRepository: Send + Sync {
    // 予約作成。status は pending で固定
    async fn create(&self, event: CreateBooking) -> AppResult<Booking>;
    async fn find_by_id(&self, booking_id: BookingId) -> AppResult<Option<Booking>>;
    // 依頼者・提供者いずれかとして関与している予約の一覧
    async fn find_by_user_id(&self, user_id: UserId) -> AppResult<Vec<Booking>>;
    // 受理。状態遷移と在庫引き落としを単一トランザクションで行う
    async fn accept(&self, event: AcceptBooking) -> AppResult<Booking>;
    async fn reject(&self, event: RejectBooking) -> AppResult<Booking>;
    // 依頼者自身による pending 予約の取り消し（物理削除）
    async fn delete(&self, event: CancelBooking) -> AppResult<()>;
}
