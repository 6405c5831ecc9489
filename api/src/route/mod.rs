use axum::Router;
use registry::AppRegistry;

pub mod booking;
pub mod health;
pub mod item;
pub mod notification;

pub fn routes() -> Router<AppRegistry> {
    let api_routes = Router::new()
        .merge(booking::build_booking_routers())
        .merge(item::build_item_routers())
        .merge(notification::build_notification_routers());

    Router::new()
        .merge(health::build_health_check_routers())
        .nest("/api/v1", api_routes)
}
