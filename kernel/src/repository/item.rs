use async_trait::async_trait;
use shared::error::AppResult;

use crate::model::{
    id::UserId,
    item::{
        event::{CreateItem, DebitItem, DeleteItem},
        Item, ItemKind, ItemRef,
    },
};

#[mockall::automock]
#[async_trait]
pub trait ItemRepository: Send + Sync {
    async fn create(&self, event: CreateItem) -> AppResult<Item>;
    async fn find(&self, item_ref: ItemRef) -> AppResult<Option<Item>>;
    async fn list(&self, kind: ItemKind) -> AppResult<Vec<Item>>;
    async fn list_by_owner(&self, kind: ItemKind, owner_id: UserId) -> AppResult<Vec<Item>>;
    // 在庫の引き落とし。同一アイテムへの並行実行に対して原子的
    async fn debit(&self, event: DebitItem) -> AppResult<Item>;
    // 所有者による削除。参照中の予約へスナップショットを残す
    async fn delete(&self, event: DeleteItem) -> AppResult<()>;
}
