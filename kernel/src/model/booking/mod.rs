use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use super::{
    id::BookingId,
    item::{Item, ItemKind, ItemRef},
    user::BookingUser,
};

pub mod event;

#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    pub id: BookingId,
    // 元アイテムへのソフト参照。アイテム削除後はダングリングしたまま残る
    pub item_ref: ItemRef,
    pub item: Option<Item>,
    pub item_snapshot: Option<Item>,
    pub requester: BookingUser,
    pub provider: BookingUser,
    pub details: BookingDetails,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    // 表示用アイテム。元レコード削除後はスナップショット側に切り替わる
    pub fn display_item(&self) -> Option<&Item> {
        self.item.as_ref().or(self.item_snapshot.as_ref())
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr, EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Accepted,
    Rejected,
}

// アイテム種別ごとに要求されるフィールドの組。種別と合わない組み合わせは
// CreateBooking::new で弾くため、以降の層では表現できない
#[derive(Debug, Clone, PartialEq)]
pub enum BookingDetails {
    // Manure / NurseryCrop: 数量指定の引き取り予約
    Produce { requested_quantity: i64 },
    // Tractor: 日時・用途・装着機付きの貸出予約
    TractorHire {
        scheduled_on: NaiveDate,
        purpose: TractorPurpose,
        attachment: Option<TractorAttachment>,
        acres: Option<f64>,
        cost: String,
    },
}

impl BookingDetails {
    pub fn matches_kind(&self, kind: ItemKind) -> bool {
        match self {
            Self::Produce { .. } => matches!(kind, ItemKind::Manure | ItemKind::NurseryCrop),
            Self::TractorHire { .. } => matches!(kind, ItemKind::Tractor),
        }
    }

    // 受理時にレジストリから引き落とす数量。トラクターは 1 台単位
    pub fn requested_quantity(&self) -> i64 {
        match self {
            Self::Produce { requested_quantity } => *requested_quantity,
            Self::TractorHire { .. } => 1,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr, EnumString,
)]
pub enum TractorPurpose {
    Ploughing,
    #[strum(serialize = "Load Transport")]
    #[serde(rename = "Load Transport")]
    LoadTransport,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr, EnumString,
)]
pub enum TractorAttachment {
    Plough,
    Harrow,
    Rotavator,
    Cultivator,
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(ItemKind::Manure, true)]
    #[case(ItemKind::NurseryCrop, true)]
    #[case(ItemKind::Tractor, false)]
    fn produce_details_match_produce_kinds(#[case] kind: ItemKind, #[case] expected: bool) {
        let details = BookingDetails::Produce {
            requested_quantity: 4,
        };
        assert_eq!(details.matches_kind(kind), expected);
    }

    #[test]
    fn tractor_hire_debits_one_unit() {
        let details = BookingDetails::TractorHire {
            scheduled_on: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            purpose: TractorPurpose::Ploughing,
            attachment: Some(TractorAttachment::Plough),
            acres: Some(2.5),
            cost: "1500".into(),
        };
        assert_eq!(details.requested_quantity(), 1);
    }

    #[test]
    fn status_keeps_original_wire_strings() {
        assert_eq!(BookingStatus::Pending.to_string(), "pending");
        assert_eq!(
            "accepted".parse::<BookingStatus>().unwrap(),
            BookingStatus::Accepted
        );
        assert!("reopened".parse::<BookingStatus>().is_err());
    }

    #[test]
    fn purpose_uses_original_load_transport_spelling() {
        assert_eq!(TractorPurpose::LoadTransport.to_string(), "Load Transport");
        assert_eq!(
            "Load Transport".parse::<TractorPurpose>().unwrap(),
            TractorPurpose::LoadTransport
        );
    }
}
