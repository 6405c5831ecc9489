use axum::{
    routing::{get, post},
    Router,
};
use registry::AppRegistry;

use crate::handler::item::{
    delete_manure, delete_nursery_crop, delete_tractor, find_manure, find_nursery_crop,
    find_tractor, list_manures, list_nursery_crops, list_tractors, register_manure,
    register_nursery_crop, register_tractor,
};

pub fn build_item_routers() -> Router<AppRegistry> {
    let manure_routers = Router::new()
        .route("/", post(register_manure).get(list_manures))
        .route("/:item_id", get(find_manure).delete(delete_manure));
    let tractor_routers = Router::new()
        .route("/", post(register_tractor).get(list_tractors))
        .route("/:item_id", get(find_tractor).delete(delete_tractor));
    let nursery_crop_routers = Router::new()
        .route("/", post(register_nursery_crop).get(list_nursery_crops))
        .route(
            "/:item_id",
            get(find_nursery_crop).delete(delete_nursery_crop),
        );

    Router::new()
        .nest("/manures", manure_routers)
        .nest("/tractors", tractor_routers)
        .nest("/nursery-crops", nursery_crop_routers)
}
