use async_trait::async_trait;
use derive_new::new;
use kernel::{
    model::{
        id::{ItemId, UserId},
        item::{
            event::{CreateItem, DebitItem, DeleteItem},
            Item, ItemKind, ItemRef,
        },
    },
    repository::item::ItemRepository,
};
use shared::error::{AppError, AppResult};
use sqlx::PgConnection;

use crate::database::{
    model::item::{ManureRow, NurseryCropRow, TractorRow},
    ConnectionPool,
};

const MANURE_COLUMNS: &str = r#"
    id AS manure_id,
    posted_by,
    manure_type,
    quantity,
    cost_per_kg,
    address,
    description,
    created_at
"#;

const TRACTOR_COLUMNS: &str = r#"
    id AS tractor_id,
    owned_by,
    brand,
    model_number,
    registration_number,
    engine_capacity_hp,
    fuel_type,
    available,
    created_at
"#;

const NURSERY_CROP_COLUMNS: &str = r#"
    id AS nursery_crop_id,
    posted_by,
    name,
    category,
    quantity_available,
    cost_per_crop,
    description,
    created_at
"#;

// 予約の展開にも使うので、リポジトリ外（booking 実装）からも呼べるようにしてある
pub(crate) async fn fetch_item<'e, E>(executor: E, item_ref: ItemRef) -> AppResult<Option<Item>>
where
    E: sqlx::PgExecutor<'e>,
{
    match item_ref {
        ItemRef::Manure(item_id) => {
            let row: Option<ManureRow> =
                sqlx::query_as(&format!("SELECT {MANURE_COLUMNS} FROM manures WHERE id = $1"))
                    .bind(item_id)
                    .fetch_optional(executor)
                    .await
                    .map_err(AppError::SpecificOperationError)?;
            Ok(row.map(Item::from))
        }
        ItemRef::Tractor(item_id) => {
            let row: Option<TractorRow> = sqlx::query_as(&format!(
                "SELECT {TRACTOR_COLUMNS} FROM tractors WHERE id = $1"
            ))
            .bind(item_id)
            .fetch_optional(executor)
            .await
            .map_err(AppError::SpecificOperationError)?;
            row.map(Item::try_from).transpose()
        }
        ItemRef::NurseryCrop(item_id) => {
            let row: Option<NurseryCropRow> = sqlx::query_as(&format!(
                "SELECT {NURSERY_CROP_COLUMNS} FROM nursery_crops WHERE id = $1"
            ))
            .bind(item_id)
            .fetch_optional(executor)
            .await
            .map_err(AppError::SpecificOperationError)?;
            row.map(Item::try_from).transpose()
        }
    }
}

async fn item_exists(conn: &mut PgConnection, item_ref: ItemRef) -> AppResult<bool> {
    let table = match item_ref.kind() {
        ItemKind::Manure => "manures",
        ItemKind::Tractor => "tractors",
        ItemKind::NurseryCrop => "nursery_crops",
    };
    let found: Option<i32> = sqlx::query_scalar(&format!("SELECT 1 FROM {table} WHERE id = $1"))
        .bind(item_ref.item_id())
        .fetch_optional(&mut *conn)
        .await
        .map_err(AppError::SpecificOperationError)?;
    Ok(found.is_some())
}

// 条件付き UPDATE による引き落とし。行が更新されなければ在庫不足か行の不存在。
// 同一アイテムへ並行して走る引き落としはこの一文の行ロックで直列化される
pub(crate) async fn debit_item(
    conn: &mut PgConnection,
    item_ref: ItemRef,
    quantity: i64,
) -> AppResult<()> {
    if quantity <= 0 {
        return Err(AppError::UnprocessableEntity(
            "引き落とす数量は正の数でなければなりません".into(),
        ));
    }
    let res = match item_ref {
        ItemRef::Manure(item_id) => {
            sqlx::query("UPDATE manures SET quantity = quantity - $2 WHERE id = $1 AND quantity >= $2")
                .bind(item_id)
                .bind(quantity)
                .execute(&mut *conn)
                .await
        }
        ItemRef::NurseryCrop(item_id) => sqlx::query(
            "UPDATE nursery_crops SET quantity_available = quantity_available - $2 WHERE id = $1 AND quantity_available >= $2",
        )
        .bind(item_id)
        .bind(quantity)
        .execute(&mut *conn)
        .await,
        // トラクターの在庫は available フラグ 1 台分
        ItemRef::Tractor(item_id) => {
            sqlx::query("UPDATE tractors SET available = FALSE WHERE id = $1 AND available")
                .bind(item_id)
                .execute(&mut *conn)
                .await
        }
    }
    .map_err(AppError::SpecificOperationError)?;

    if res.rows_affected() == 0 {
        // 在庫不足なのかアイテム自体が消えているのかを切り分ける
        if item_exists(&mut *conn, item_ref).await? {
            return Err(AppError::InsufficientStock(format!(
                "{} の在庫が不足しています",
                item_ref.kind()
            )));
        }
        return Err(AppError::EntityNotFound(format!(
            "{} が見つかりませんでした",
            item_ref.kind()
        )));
    }
    Ok(())
}

#[derive(new)]
pub struct ItemRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl ItemRepository for ItemRepositoryImpl {
    async fn create(&self, event: CreateItem) -> AppResult<Item> {
        match event {
            CreateItem::Manure(e) => {
                let row: ManureRow = sqlx::query_as(&format!(
                    r#"
                    INSERT INTO manures (id, posted_by, manure_type, quantity, cost_per_kg, address, description)
                    VALUES ($1, $2, $3, $4, $5, $6, $7)
                    RETURNING {MANURE_COLUMNS}
                    "#
                ))
                .bind(ItemId::new())
                .bind(e.posted_by)
                .bind(e.manure_type)
                .bind(e.quantity)
                .bind(e.cost_per_kg)
                .bind(e.address)
                .bind(e.description)
                .fetch_one(self.db.inner_ref())
                .await
                .map_err(AppError::SpecificOperationError)?;
                Ok(row.into())
            }
            CreateItem::Tractor(e) => {
                let row: TractorRow = sqlx::query_as(&format!(
                    r#"
                    INSERT INTO tractors (id, owned_by, brand, model_number, registration_number, engine_capacity_hp, fuel_type)
                    VALUES ($1, $2, $3, $4, $5, $6, $7)
                    RETURNING {TRACTOR_COLUMNS}
                    "#
                ))
                .bind(ItemId::new())
                .bind(e.owned_by)
                .bind(e.brand)
                .bind(e.model_number)
                .bind(e.registration_number)
                .bind(e.engine_capacity_hp)
                .bind(e.fuel_type.as_ref())
                .fetch_one(self.db.inner_ref())
                .await
                .map_err(AppError::SpecificOperationError)?;
                row.try_into()
            }
            CreateItem::NurseryCrop(e) => {
                let row: NurseryCropRow = sqlx::query_as(&format!(
                    r#"
                    INSERT INTO nursery_crops (id, posted_by, name, category, quantity_available, cost_per_crop, description)
                    VALUES ($1, $2, $3, $4, $5, $6, $7)
                    RETURNING {NURSERY_CROP_COLUMNS}
                    "#
                ))
                .bind(ItemId::new())
                .bind(e.posted_by)
                .bind(e.name)
                .bind(e.category.as_ref())
                .bind(e.quantity_available)
                .bind(e.cost_per_crop)
                .bind(e.description)
                .fetch_one(self.db.inner_ref())
                .await
                .map_err(AppError::SpecificOperationError)?;
                row.try_into()
            }
        }
    }

    async fn find(&self, item_ref: ItemRef) -> AppResult<Option<Item>> {
        fetch_item(self.db.inner_ref(), item_ref).await
    }

    async fn list(&self, kind: ItemKind) -> AppResult<Vec<Item>> {
        self.list_rows(kind, None).await
    }

    async fn list_by_owner(&self, kind: ItemKind, owner_id: UserId) -> AppResult<Vec<Item>> {
        self.list_rows(kind, Some(owner_id)).await
    }

    async fn debit(&self, event: DebitItem) -> AppResult<Item> {
        let mut tx = self.db.begin().await?;
        debit_item(&mut *tx, event.item_ref, event.quantity).await?;
        let item = fetch_item(&mut *tx, event.item_ref)
            .await?
            .ok_or_else(|| {
                AppError::EntityNotFound(format!("{} が見つかりませんでした", event.item_ref.kind()))
            })?;
        tx.commit().await.map_err(AppError::TransactionError)?;
        Ok(item)
    }

    async fn delete(&self, event: DeleteItem) -> AppResult<()> {
        let mut tx = self.db.begin().await?;
        let item = fetch_item(&mut *tx, event.item_ref)
            .await?
            .ok_or_else(|| {
                AppError::EntityNotFound(format!("{} が見つかりませんでした", event.item_ref.kind()))
            })?;
        if item.owner_id() != event.requested_by {
            return Err(AppError::ForbiddenOperation);
        }

        // 参照中の予約に削除前の姿を焼き付けてから行を消す。
        // 予約側の item_id はダングリングしたまま残る
        let snapshot = serde_json::to_value(&item)
            .map_err(|e| AppError::ConversionEntityError(e.to_string()))?;
        sqlx::query(
            "UPDATE bookings SET item_snapshot = $2 WHERE item_id = $1 AND item_kind = $3",
        )
        .bind(event.item_ref.item_id())
        .bind(snapshot)
        .bind(event.item_ref.kind().as_ref())
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        let table = match event.item_ref.kind() {
            ItemKind::Manure => "manures",
            ItemKind::Tractor => "tractors",
            ItemKind::NurseryCrop => "nursery_crops",
        };
        let res = sqlx::query(&format!("DELETE FROM {table} WHERE id = $1"))
            .bind(event.item_ref.item_id())
            .execute(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;
        if res.rows_affected() == 0 {
            return Err(AppError::NoRowsAffectedError(
                "no item record has been deleted".into(),
            ));
        }
        tx.commit().await.map_err(AppError::TransactionError)?;
        Ok(())
    }
}

impl ItemRepositoryImpl {
    async fn list_rows(&self, kind: ItemKind, owner_id: Option<UserId>) -> AppResult<Vec<Item>> {
        match kind {
            ItemKind::Manure => {
                let rows: Vec<ManureRow> = self.fetch_list(
                    &format!("SELECT {MANURE_COLUMNS} FROM manures"),
                    "posted_by",
                    owner_id,
                )
                .await?;
                Ok(rows.into_iter().map(Item::from).collect())
            }
            ItemKind::Tractor => {
                let rows: Vec<TractorRow> = self.fetch_list(
                    &format!("SELECT {TRACTOR_COLUMNS} FROM tractors"),
                    "owned_by",
                    owner_id,
                )
                .await?;
                rows.into_iter().map(Item::try_from).collect()
            }
            ItemKind::NurseryCrop => {
                let rows: Vec<NurseryCropRow> = self.fetch_list(
                    &format!("SELECT {NURSERY_CROP_COLUMNS} FROM nursery_crops"),
                    "posted_by",
                    owner_id,
                )
                .await?;
                rows.into_iter().map(Item::try_from).collect()
            }
        }
    }

    async fn fetch_list<R>(
        &self,
        select: &str,
        owner_column: &str,
        owner_id: Option<UserId>,
    ) -> AppResult<Vec<R>>
    where
        R: for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
    {
        let rows = match owner_id {
            Some(owner_id) => {
                sqlx::query_as(&format!(
                    "{select} WHERE {owner_column} = $1 ORDER BY created_at DESC, id"
                ))
                .bind(owner_id)
                .fetch_all(self.db.inner_ref())
                .await
            }
            None => {
                sqlx::query_as(&format!("{select} ORDER BY created_at DESC, id"))
                    .fetch_all(self.db.inner_ref())
                    .await
            }
        }
        .map_err(AppError::SpecificOperationError)?;
        Ok(rows)
    }
}
