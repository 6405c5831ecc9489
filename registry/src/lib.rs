use std::sync::Arc;

use adapter::{
    database::ConnectionPool,
    redis::RedisClient,
    repository::{
        auth::AuthRepositoryImpl, booking::BookingRepositoryImpl,
        health::HealthCheckRepositoryImpl, item::ItemRepositoryImpl,
        notification::NotificationRepositoryImpl, user::UserRepositoryImpl,
    },
};
use kernel::repository::{
    auth::AuthRepository, booking::BookingRepository, health::HealthCheckRepository,
    item::ItemRepository, notification::NotificationRepository, user::UserRepository,
};

// DI コンテナ。handler は trait object 経由でリポジトリを引く
#[mockall::automock]
pub trait AppRegistryExt {
    fn auth_repository(&self) -> Arc<dyn AuthRepository>;
    fn booking_repository(&self) -> Arc<dyn BookingRepository>;
    fn health_check_repository(&self) -> Arc<dyn HealthCheckRepository>;
    fn item_repository(&self) -> Arc<dyn ItemRepository>;
    fn notification_repository(&self) -> Arc<dyn NotificationRepository>;
    fn user_repository(&self) -> Arc<dyn UserRepository>;
}

pub type AppRegistry = Arc<dyn AppRegistryExt + Send + Sync + 'static>;

#[derive(Clone)]
pub struct AppRegistryImpl {
    auth_repository: Arc<dyn AuthRepository>,
    booking_repository: Arc<dyn BookingRepository>,
    health_check_repository: Arc<dyn HealthCheckRepository>,
    item_repository: Arc<dyn ItemRepository>,
    notification_repository: Arc<dyn NotificationRepository>,
    user_repository: Arc<dyn UserRepository>,
}

impl AppRegistryImpl {
    pub fn new(pool: ConnectionPool, kv: Arc<RedisClient>) -> Self {
        let auth_repository = Arc::new(AuthRepositoryImpl::new(kv.clone()));
        let booking_repository = Arc::new(BookingRepositoryImpl::new(pool.clone()));
        let health_check_repository = Arc::new(HealthCheckRepositoryImpl::new(pool.clone()));
        let item_repository = Arc::new(ItemRepositoryImpl::new(pool.clone()));
        let notification_repository = Arc::new(NotificationRepositoryImpl::new(pool.clone()));
        let user_repository = Arc::new(UserRepositoryImpl::new(pool.clone()));
        Self {
            auth_repository,
            booking_repository,
            health_check_repository,
            item_repository,
            notification_repository,
            user_repository,
        }
    }
}

impl AppRegistryExt for AppRegistryImpl {
    fn auth_repository(&self) -> Arc<dyn AuthRepository> {
        self.auth_repository.clone()
    }

    fn booking_repository(&self) -> Arc<dyn BookingRepository> {
        self.booking_repository.clone()
    }

    fn health_check_repository(&self) -> Arc<dyn HealthCheckRepository> {
        self.health_check_repository.clone()
    }

    fn item_repository(&self) -> Arc<dyn ItemRepository> {
        self.item_repository.clone()
    }

    fn notification_repository(&self) -> Arc<dyn NotificationRepository> {
        self.notification_repository.clone()
    }

    fn user_repository(&self) -> Arc<dyn UserRepository> {
        self.user_repository.clone()
    }
}
