use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use garde::Validate;
use kernel::model::{
    id::ItemId,
    item::{
        event::{CreateItem, DeleteItem},
        Item, ItemKind, ItemRef,
    },
};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

use crate::{
    extractor::AuthorizedUser,
    model::item::{
        CreateManureRequest, CreateNurseryCropRequest, CreateTractorRequest, ItemListQuery,
    },
};

async fn list_items(
    registry: AppRegistry,
    kind: ItemKind,
    query: ItemListQuery,
) -> AppResult<Json<Vec<Item>>> {
    let items = match query.owner_id {
        Some(owner_id) => {
            registry
                .item_repository()
                .list_by_owner(kind, owner_id)
                .await?
        }
        None => registry.item_repository().list(kind).await?,
    };
    Ok(Json(items))
}

async fn find_item(registry: AppRegistry, item_ref: ItemRef) -> AppResult<Json<Item>> {
    let item = registry
        .item_repository()
        .find(item_ref)
        .await?
        .ok_or_else(|| {
            AppError::EntityNotFound(format!("{} が見つかりませんでした", item_ref.kind()))
        })?;
    Ok(Json(item))
}

async fn delete_item(
    registry: AppRegistry,
    item_ref: ItemRef,
    user: AuthorizedUser,
) -> AppResult<StatusCode> {
    registry
        .item_repository()
        .delete(DeleteItem {
            item_ref,
            requested_by: user.id(),
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn register_manure(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateManureRequest>,
) -> AppResult<(StatusCode, Json<Item>)> {
    req.validate(&())?;
    let item = registry
        .item_repository()
        .create(CreateItem::Manure(req.into_event(user.id())))
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn list_manures(
    State(registry): State<AppRegistry>,
    Query(query): Query<ItemListQuery>,
) -> AppResult<Json<Vec<Item>>> {
    list_items(registry, ItemKind::Manure, query).await
}

pub async fn find_manure(
    State(registry): State<AppRegistry>,
    Path(item_id): Path<ItemId>,
) -> AppResult<Json<Item>> {
    find_item(registry, ItemRef::Manure(item_id)).await
}

pub async fn delete_manure(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
    Path(item_id): Path<ItemId>,
) -> AppResult<StatusCode> {
    delete_item(registry, ItemRef::Manure(item_id), user).await
}

pub async fn register_tractor(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateTractorRequest>,
) -> AppResult<(StatusCode, Json<Item>)> {
    req.validate(&())?;
    let item = registry
        .item_repository()
        .create(CreateItem::Tractor(req.into_event(user.id())))
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn list_tractors(
    State(registry): State<AppRegistry>,
    Query(query): Query<ItemListQuery>,
) -> AppResult<Json<Vec<Item>>> {
    list_items(registry, ItemKind::Tractor, query).await
}

pub async fn find_tractor(
    State(registry): State<AppRegistry>,
    Path(item_id): Path<ItemId>,
) -> AppResult<Json<Item>> {
    find_item(registry, ItemRef::Tractor(item_id)).await
}

pub async fn delete_tractor(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
    Path(item_id): Path<ItemId>,
) -> AppResult<StatusCode> {
    delete_item(registry, ItemRef::Tractor(item_id), user).await
}

pub async fn register_nursery_crop(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateNurseryCropRequest>,
) -> AppResult<(StatusCode, Json<Item>)> {
    req.validate(&())?;
    let item = registry
        .item_repository()
        .create(CreateItem::NurseryCrop(req.into_event(user.id())))
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn list_nursery_crops(
    State(registry): State<AppRegistry>,
    Query(query): Query<ItemListQuery>,
) -> AppResult<Json<Vec<Item>>> {
    list_items(registry, ItemKind::NurseryCrop, query).await
}

pub async fn find_nursery_crop(
    State(registry): State<AppRegistry>,
    Path(item_id): Path<ItemId>,
) -> AppResult<Json<Item>> {
    find_item(registry, ItemRef::NurseryCrop(item_id)).await
}

pub async fn delete_nursery_crop(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
    Path(item_id): Path<ItemId>,
) -> AppResult<StatusCode> {
    delete_item(registry, ItemRef::NurseryCrop(item_id), user).await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use kernel::{
        model::{
            auth::AccessToken,
            id::UserId,
            item::Manure,
        },
        repository::item::MockItemRepository,
    };
    use registry::MockAppRegistryExt;

    use super::*;

    fn authorized(user_id: UserId) -> AuthorizedUser {
        AuthorizedUser {
            access_token: AccessToken("test-token".into()),
            user: kernel::model::user::User {
                id: user_id,
                name: "poster".into(),
                email: "poster@example.com".into(),
            },
        }
    }

    fn registry_with(item_repo: MockItemRepository) -> AppRegistry {
        let mut registry = MockAppRegistryExt::new();
        let item_repo = Arc::new(item_repo);
        registry
            .expect_item_repository()
            .returning(move || item_repo.clone());
        Arc::new(registry)
    }

    fn manure(posted_by: UserId, quantity: i64) -> Item {
        Item::Manure(Manure {
            id: ItemId::new(),
            posted_by,
            manure_type: "Cow dung".into(),
            quantity,
            cost_per_kg: 5.0,
            address: "Mysuru".into(),
            description: "well rotted".into(),
            created_at: Utc::now(),
        })
    }

    #[tokio::test]
    async fn register_manure_creates_item_for_the_caller() {
        let poster_id = UserId::new();
        let created = manure(poster_id, 10);

        let mut item_repo = MockItemRepository::new();
        let returned = created.clone();
        item_repo
            .expect_create()
            .withf(move |event| {
                matches!(event, CreateItem::Manure(e) if e.posted_by == poster_id && e.quantity == 10)
            })
            .times(1)
            .returning(move |_| Ok(returned.clone()));

        let registry = registry_with(item_repo);
        let req: CreateManureRequest = serde_json::from_value(serde_json::json!({
            "manureType": "Cow dung",
            "quantity": 10,
            "costPerKg": 5.0,
            "address": "Mysuru",
            "description": "well rotted",
        }))
        .unwrap();
        let (status, Json(item)) = register_manure(authorized(poster_id), State(registry), Json(req))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(item.owner_id(), poster_id);
    }

    #[tokio::test]
    async fn delete_by_non_owner_is_forbidden() {
        let stranger_id = UserId::new();
        let item_id = ItemId::new();

        let mut item_repo = MockItemRepository::new();
        item_repo
            .expect_delete()
            .withf(move |event| event.requested_by == stranger_id)
            .times(1)
            .returning(|_| Err(shared::error::AppError::ForbiddenOperation));

        let registry = registry_with(item_repo);
        let res = delete_manure(authorized(stranger_id), State(registry), Path(item_id)).await;
        assert!(matches!(
            res,
            Err(shared::error::AppError::ForbiddenOperation)
        ));
    }

    #[tokio::test]
    async fn list_filters_by_owner_when_requested() {
        let owner_id = UserId::new();
        let owned = manure(owner_id, 3);

        let mut item_repo = MockItemRepository::new();
        let returned = owned.clone();
        item_repo
            .expect_list_by_owner()
            .withf(move |kind, user_id| *kind == ItemKind::Manure && *user_id == owner_id)
            .times(1)
            .returning(move |_, _| Ok(vec![returned.clone()]));

        let registry = registry_with(item_repo);
        let Json(items) = list_manures(
            State(registry),
            Query(ItemListQuery {
                owner_id: Some(owner_id),
            }),
        )
        .await
        .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].owner_id(), owner_id);
    }
}
