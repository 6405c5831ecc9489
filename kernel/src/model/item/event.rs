use super::{CropCategory, FuelType, ItemRef};
use crate::model::id::UserId;

pub struct CreateManure {
    pub posted_by: UserId,
    pub manure_type: String,
    pub quantity: i64,
    pub cost_per_kg: f64,
    pub address: String,
    pub description: String,
}

pub struct CreateTractor {
    pub owned_by: UserId,
    pub brand: String,
    pub model_number: String,
    pub registration_number: String,
    pub engine_capacity_hp: i32,
    pub fuel_type: FuelType,
}

pub struct CreateNurseryCrop {
    pub posted_by: UserId,
    pub name: String,
    pub category: CropCategory,
    pub quantity_available: i64,
    pub cost_per_crop: f64,
    pub description: String,
}

pub enum CreateItem {
    Manure(CreateManure),
    Tractor(CreateTractor),
    NurseryCrop(CreateNurseryCrop),
}

pub struct DebitItem {
    pub item_ref: ItemRef,
    pub quantity: i64,
}

// 削除は所有者のみ。参照中の予約にはスナップショットを焼き付ける
pub struct DeleteItem {
    pub item_ref: ItemRef,
    pub requested_by: UserId,
}
