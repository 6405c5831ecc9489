use axum::{
    routing::{get, put},
    Router,
};
use registry::AppRegistry;

use crate::handler::notification::{
    list_notifications, mark_notifications_read, unread_notification_count,
};

pub fn build_notification_routers() -> Router<AppRegistry> {
    let routers = Router::new()
        .route("/", get(list_notifications))
        .route("/unread-count", get(unread_notification_count))
        .route("/read", put(mark_notifications_read));
    Router::new().nest("/notifications", routers)
}
