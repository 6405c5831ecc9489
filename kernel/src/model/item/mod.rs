use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use super::id::{ItemId, UserId};

pub mod event;

// 予約対象となる 3 つのレジストリの判別子。文字列表現は永続化層・API 層共通
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr, EnumString,
)]
pub enum ItemKind {
    Manure,
    Tractor,
    NurseryCrop,
}

// アイテムへの非所有参照。種別ごとのヴァリアントに分けることで
// レジストリへのディスパッチを網羅的な match で書ける
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemRef {
    Manure(ItemId),
    Tractor(ItemId),
    NurseryCrop(ItemId),
}

impl ItemRef {
    pub fn new(kind: ItemKind, item_id: ItemId) -> Self {
        match kind {
            ItemKind::Manure => Self::Manure(item_id),
            ItemKind::Tractor => Self::Tractor(item_id),
            ItemKind::NurseryCrop => Self::NurseryCrop(item_id),
        }
    }

    pub fn kind(&self) -> ItemKind {
        match self {
            Self::Manure(_) => ItemKind::Manure,
            Self::Tractor(_) => ItemKind::Tractor,
            Self::NurseryCrop(_) => ItemKind::NurseryCrop,
        }
    }

    pub fn item_id(&self) -> ItemId {
        match self {
            Self::Manure(id) | Self::Tractor(id) | Self::NurseryCrop(id) => *id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manure {
    pub id: ItemId,
    pub posted_by: UserId,
    pub manure_type: String,
    pub quantity: i64,
    pub cost_per_kg: f64,
    pub address: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tractor {
    pub id: ItemId,
    pub owned_by: UserId,
    pub brand: String,
    pub model_number: String,
    pub registration_number: String,
    pub engine_capacity_hp: i32,
    pub fuel_type: FuelType,
    pub available: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr, EnumString,
)]
pub enum FuelType {
    Diesel,
    Electric,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NurseryCrop {
    pub id: ItemId,
    pub posted_by: UserId,
    pub name: String,
    pub category: CropCategory,
    pub quantity_available: i64,
    pub cost_per_crop: f64,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr, EnumString,
)]
pub enum CropCategory {
    Vegetable,
    Fruit,
    Grain,
    Pulse,
    Oilseed,
    Other,
}

// レジストリ横断で扱うときの閉じた和。削除済みアイテムのスナップショットを
// そのまま JSON として予約に残すため、シリアライズ可能にしている
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "itemType")]
pub enum Item {
    Manure(Manure),
    Tractor(Tractor),
    NurseryCrop(NurseryCrop),
}

impl Item {
    pub fn kind(&self) -> ItemKind {
        match self {
            Self::Manure(_) => ItemKind::Manure,
            Self::Tractor(_) => ItemKind::Tractor,
            Self::NurseryCrop(_) => ItemKind::NurseryCrop,
        }
    }

    pub fn id(&self) -> ItemId {
        match self {
            Self::Manure(m) => m.id,
            Self::Tractor(t) => t.id,
            Self::NurseryCrop(c) => c.id,
        }
    }

    pub fn owner_id(&self) -> UserId {
        match self {
            Self::Manure(m) => m.posted_by,
            Self::Tractor(t) => t.owned_by,
            Self::NurseryCrop(c) => c.posted_by,
        }
    }

    pub fn item_ref(&self) -> ItemRef {
        ItemRef::new(self.kind(), self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_kind_keeps_original_discriminator_strings() {
        assert_eq!(ItemKind::Manure.to_string(), "Manure");
        assert_eq!(ItemKind::NurseryCrop.to_string(), "NurseryCrop");
        assert_eq!("Tractor".parse::<ItemKind>().unwrap(), ItemKind::Tractor);
        assert!("OrganicManure".parse::<ItemKind>().is_err());
    }

    #[test]
    fn item_ref_dispatches_by_kind() {
        let id = ItemId::new();
        let r = ItemRef::new(ItemKind::NurseryCrop, id);
        assert_eq!(r.kind(), ItemKind::NurseryCrop);
        assert_eq!(r.item_id(), id);
    }
}
