use garde::Validate;
use kernel::model::{
    id::UserId,
    item::{
        event::{CreateManure, CreateNurseryCrop, CreateTractor},
        CropCategory, FuelType,
    },
};
use serde::Deserialize;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateManureRequest {
    #[garde(length(min = 1))]
    pub manure_type: String,
    #[garde(range(min = 1))]
    pub quantity: i64,
    #[garde(range(min = 0.0))]
    pub cost_per_kg: f64,
    #[garde(length(min = 1))]
    pub address: String,
    #[garde(skip)]
    pub description: String,
}

impl CreateManureRequest {
    pub fn into_event(self, posted_by: UserId) -> CreateManure {
        let CreateManureRequest {
            manure_type,
            quantity,
            cost_per_kg,
            address,
            description,
        } = self;
        CreateManure {
            posted_by,
            manure_type,
            quantity,
            cost_per_kg,
            address,
            description,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTractorRequest {
    #[garde(length(min = 1))]
    pub brand: String,
    #[garde(length(min = 1))]
    pub model_number: String,
    #[garde(length(min = 1))]
    pub registration_number: String,
    #[garde(range(min = 1))]
    pub engine_capacity_hp: i32,
    #[garde(skip)]
    pub fuel_type: FuelType,
}

impl CreateTractorRequest {
    pub fn into_event(self, owned_by: UserId) -> CreateTractor {
        let CreateTractorRequest {
            brand,
            model_number,
            registration_number,
            engine_capacity_hp,
            fuel_type,
        } = self;
        CreateTractor {
            owned_by,
            brand,
            model_number,
            registration_number,
            engine_capacity_hp,
            fuel_type,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateNurseryCropRequest {
    #[garde(length(min = 1))]
    pub name: String,
    #[garde(skip)]
    pub category: CropCategory,
    #[garde(range(min = 0))]
    pub quantity_available: i64,
    #[garde(range(min = 0.0))]
    pub cost_per_crop: f64,
    #[garde(skip)]
    pub description: String,
}

impl CreateNurseryCropRequest {
    pub fn into_event(self, posted_by: UserId) -> CreateNurseryCrop {
        let CreateNurseryCropRequest {
            name,
            category,
            quantity_available,
            cost_per_crop,
            description,
        } = self;
        CreateNurseryCrop {
            posted_by,
            name,
            category,
            quantity_available,
            cost_per_crop,
            description,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemListQuery {
    pub owner_id: Option<UserId>,
}
