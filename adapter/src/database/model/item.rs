use chrono::{DateTime, Utc};
use kernel::model::{
    id::{ItemId, UserId},
    item::{Item, Manure, NurseryCrop, Tractor},
};
use shared::error::AppError;

#[derive(sqlx::FromRow)]
pub struct ManureRow {
    pub manure_id: ItemId,
    pub posted_by: UserId,
    pub manure_type: String,
    pub quantity: i64,
    pub cost_per_kg: f64,
    pub address: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl From<ManureRow> for Manure {
    fn from(value: ManureRow) -> Self {
        let ManureRow {
            manure_id,
            posted_by,
            manure_type,
            quantity,
            cost_per_kg,
            address,
            description,
            created_at,
        } = value;
        Self {
            id: manure_id,
            posted_by,
            manure_type,
            quantity,
            cost_per_kg,
            address,
            description,
            created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
pub struct TractorRow {
    pub tractor_id: ItemId,
    pub owned_by: UserId,
    pub brand: String,
    pub model_number: String,
    pub registration_number: String,
    pub engine_capacity_hp: i32,
    pub fuel_type: String,
    pub available: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<TractorRow> for Tractor {
    type Error = AppError;

    fn try_from(value: TractorRow) -> Result<Self, Self::Error> {
        let TractorRow {
            tractor_id,
            owned_by,
            brand,
            model_number,
            registration_number,
            engine_capacity_hp,
            fuel_type,
            available,
            created_at,
        } = value;
        let fuel_type = fuel_type
            .parse()
            .map_err(|e: strum::ParseError| AppError::ConversionEntityError(e.to_string()))?;
        Ok(Self {
            id: tractor_id,
            owned_by,
            brand,
            model_number,
            registration_number,
            engine_capacity_hp,
            fuel_type,
            available,
            created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
pub struct NurseryCropRow {
    pub nursery_crop_id: ItemId,
    pub posted_by: UserId,
    pub name: String,
    pub category: String,
    pub quantity_available: i64,
    pub cost_per_crop: f64,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<NurseryCropRow> for NurseryCrop {
    type Error = AppError;

    fn try_from(value: NurseryCropRow) -> Result<Self, Self::Error> {
        let NurseryCropRow {
            nursery_crop_id,
            posted_by,
            name,
            category,
            quantity_available,
            cost_per_crop,
            description,
            created_at,
        } = value;
        let category = category
            .parse()
            .map_err(|e: strum::ParseError| AppError::ConversionEntityError(e.to_string()))?;
        Ok(Self {
            id: nursery_crop_id,
            posted_by,
            name,
            category,
            quantity_available,
            cost_per_crop,
            description,
            created_at,
        })
    }
}

impl TryFrom<TractorRow> for Item {
    type Error = AppError;

    fn try_from(value: TractorRow) -> Result<Self, Self::Error> {
        Tractor::try_from(value).map(Item::Tractor)
    }
}

impl TryFrom<NurseryCropRow> for Item {
    type Error = AppError;

    fn try_from(value: NurseryCropRow) -> Result<Self, Self::Error> {
        NurseryCrop::try_from(value).map(Item::NurseryCrop)
    }
}

impl From<ManureRow> for Item {
    fn from(value: ManureRow) -> Self {
        Item::Manure(value.into())
    }
}
