use axum::{
    routing::{delete, post, put},
    Router,
};
use registry::AppRegistry;

use crate::handler::booking::{
    accept_booking, cancel_booking, list_bookings, register_booking, reject_booking,
};

pub fn build_booking_routers() -> Router<AppRegistry> {
    let routers = Router::new()
        .route("/", post(register_booking).get(list_bookings))
        .route("/:booking_id", delete(cancel_booking))
        .route("/:booking_id/accept", put(accept_booking))
        .route("/:booking_id/reject", put(reject_booking));
    Router::new().nest("/bookings", routers)
}
