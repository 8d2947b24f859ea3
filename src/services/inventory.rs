use super::Page;
use crate::{
    db::UnitOfWork,
    entities::{inventory, inventory_history, product},
    errors::ServiceError,
};
use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, EntityTrait, FromQueryResult, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateInventoryInput {
    pub product_id: i32,
    #[validate(range(min = 0))]
    pub quantity: i32,
    #[validate(range(min = 0))]
    #[schema(example = 10)]
    pub low_stock_threshold: i32,
}

/// Administrative override of the on-hand quantity.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SetQuantityInput {
    #[validate(range(min = 0))]
    pub quantity: i32,
    #[validate(length(min = 1, max = 200))]
    #[schema(example = "Cycle count correction")]
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InventoryView {
    pub id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub low_stock_threshold: i32,
    pub last_updated: DateTime<Utc>,
}

impl From<inventory::Model> for InventoryView {
    fn from(model: inventory::Model) -> Self {
        Self {
            id: model.id,
            product_id: model.product_id,
            quantity: model.quantity,
            low_stock_threshold: model.low_stock_threshold,
            last_updated: model.last_updated,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InventoryHistoryView {
    pub id: i32,
    pub inventory_id: i32,
    pub previous_quantity: i32,
    pub new_quantity: i32,
    pub change_reason: String,
    pub change_date: DateTime<Utc>,
}

impl From<inventory_history::Model> for InventoryHistoryView {
    fn from(model: inventory_history::Model) -> Self {
        Self {
            id: model.id,
            inventory_id: model.inventory_id,
            previous_quantity: model.previous_quantity,
            new_quantity: model.new_quantity,
            change_reason: model.change_reason,
            change_date: model.change_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, FromQueryResult)]
pub struct LowStockAlert {
    pub product_id: i32,
    pub product_name: String,
    pub current_quantity: i32,
    pub low_stock_threshold: i32,
}

/// Stock levels and their audit trail.
pub struct InventoryService<'a> {
    uow: &'a UnitOfWork,
}

impl<'a> InventoryService<'a> {
    pub fn new(uow: &'a UnitOfWork) -> Self {
        Self { uow }
    }

    #[instrument(skip(self))]
    pub async fn create_inventory(
        &self,
        input: CreateInventoryInput,
    ) -> Result<inventory::Model, ServiceError> {
        input.validate()?;
        let conn = self.uow.conn();

        if product::Entity::find_by_id(input.product_id)
            .one(conn)
            .await?
            .is_none()
        {
            return Err(ServiceError::NotFound(format!(
                "product {} not found",
                input.product_id
            )));
        }

        let conflict = format!("inventory already exists for product {}", input.product_id);
        if self.find_by_product(input.product_id).await?.is_some() {
            return Err(ServiceError::Conflict(conflict));
        }

        let model = inventory::ActiveModel {
            product_id: Set(input.product_id),
            quantity: Set(input.quantity),
            low_stock_threshold: Set(input.low_stock_threshold),
            ..Default::default()
        }
        .insert(conn)
        .await
        .map_err(|e| ServiceError::from_write(e, conflict))?;

        info!(
            inventory_id = model.id,
            product_id = model.product_id,
            quantity = model.quantity,
            "inventory created"
        );
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn list_inventory(&self, page: Page) -> Result<Vec<inventory::Model>, ServiceError> {
        Ok(inventory::Entity::find()
            .order_by_asc(inventory::Column::Id)
            .offset(page.offset)
            .limit(page.limit)
            .all(self.uow.conn())
            .await?)
    }

    pub async fn find_by_product(
        &self,
        product_id: i32,
    ) -> Result<Option<inventory::Model>, ServiceError> {
        Ok(inventory::Entity::find()
            .filter(inventory::Column::ProductId.eq(product_id))
            .one(self.uow.conn())
            .await?)
    }

    pub async fn get_by_product(&self, product_id: i32) -> Result<inventory::Model, ServiceError> {
        self.find_by_product(product_id).await?.ok_or_else(|| {
            ServiceError::NotFound(format!("inventory for product {} not found", product_id))
        })
    }

    /// Products whose quantity is at or below their threshold, by product id.
    #[instrument(skip(self))]
    pub async fn low_stock_alerts(&self) -> Result<Vec<LowStockAlert>, ServiceError> {
        Ok(inventory::Entity::find()
            .select_only()
            .column_as(inventory::Column::ProductId, "product_id")
            .column_as(product::Column::Name, "product_name")
            .column_as(inventory::Column::Quantity, "current_quantity")
            .column_as(inventory::Column::LowStockThreshold, "low_stock_threshold")
            .join(JoinType::InnerJoin, inventory::Relation::Product.def())
            .filter(
                Expr::col((inventory::Entity, inventory::Column::Quantity)).lte(Expr::col((
                    inventory::Entity,
                    inventory::Column::LowStockThreshold,
                ))),
            )
            .order_by_asc(inventory::Column::ProductId)
            .into_model::<LowStockAlert>()
            .all(self.uow.conn())
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn set_quantity(
        &self,
        product_id: i32,
        input: SetQuantityInput,
    ) -> Result<inventory::Model, ServiceError> {
        input.validate()?;
        let current = self.get_by_product(product_id).await?;
        let (updated, _) = self
            .apply_quantity_change(&current, input.quantity, input.reason)
            .await?;
        Ok(updated)
    }

    /// History of a product's inventory, newest first.
    #[instrument(skip(self))]
    pub async fn history(
        &self,
        product_id: i32,
        page: Page,
    ) -> Result<Vec<inventory_history::Model>, ServiceError> {
        let inventory = self.get_by_product(product_id).await?;

        Ok(inventory_history::Entity::find()
            .filter(inventory_history::Column::InventoryId.eq(inventory.id))
            .order_by_desc(inventory_history::Column::ChangeDate)
            .order_by_desc(inventory_history::Column::Id)
            .offset(page.offset)
            .limit(page.limit)
            .all(self.uow.conn())
            .await?)
    }

    /// Moves `current` to `new_quantity` and appends the matching history row.
    ///
    /// The write only lands if the stored quantity still equals
    /// `current.quantity`, so the recorded previous quantity is always the
    /// value that was replaced.
    pub(crate) async fn apply_quantity_change(
        &self,
        current: &inventory::Model,
        new_quantity: i32,
        reason: String,
    ) -> Result<(inventory::Model, inventory_history::Model), ServiceError> {
        if new_quantity < 0 {
            return Err(ServiceError::ValidationError(format!(
                "inventory quantity cannot become negative ({})",
                new_quantity
            )));
        }

        let conn = self.uow.conn();
        let now = Utc::now();

        let result = inventory::Entity::update_many()
            .col_expr(inventory::Column::Quantity, Expr::value(new_quantity))
            .col_expr(inventory::Column::LastUpdated, Expr::value(now))
            .filter(inventory::Column::Id.eq(current.id))
            .filter(inventory::Column::Quantity.eq(current.quantity))
            .exec(conn)
            .await?;

        if result.rows_affected == 0 {
            warn!(
                inventory_id = current.id,
                expected_quantity = current.quantity,
                "inventory changed concurrently"
            );
            return Err(ServiceError::Conflict(format!(
                "inventory for product {} was modified concurrently",
                current.product_id
            )));
        }

        let history = inventory_history::ActiveModel {
            inventory_id: Set(current.id),
            previous_quantity: Set(current.quantity),
            new_quantity: Set(new_quantity),
            change_reason: Set(reason),
            change_date: Set(now),
            ..Default::default()
        }
        .insert(conn)
        .await?;

        info!(
            inventory_id = current.id,
            previous_quantity = current.quantity,
            new_quantity,
            reason = %history.change_reason,
            "inventory quantity changed"
        );

        let updated = inventory::Model {
            quantity: new_quantity,
            last_updated: now,
            ..current.clone()
        };
        if updated.is_low_stock() && !current.is_low_stock() {
            warn!(
                product_id = updated.product_id,
                quantity = updated.quantity,
                low_stock_threshold = updated.low_stock_threshold,
                "product dropped to low stock"
            );
        }
        Ok((updated, history))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{establish_connection_with_config, run_migrations, DbConfig},
        services::catalog::{CatalogService, CreateCategoryInput, CreateProductInput},
    };
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseConnection, PaginatorTrait};

    async fn stocked_pool(quantity: i32) -> (DatabaseConnection, i32) {
        let mut cfg = DbConfig::for_url("sqlite::memory:");
        cfg.max_connections = 1;
        let pool = establish_connection_with_config(&cfg).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let uow = UnitOfWork::begin(&pool).await.unwrap();
        let catalog = CatalogService::new(&uow);
        let category = catalog
            .create_category(CreateCategoryInput {
                name: "Garden".into(),
                description: None,
            })
            .await
            .unwrap();
        let product = catalog
            .create_product(CreateProductInput {
                name: "Hose".into(),
                description: None,
                price: dec!(20),
                category_id: category.id,
            })
            .await
            .unwrap();
        InventoryService::new(&uow)
            .create_inventory(CreateInventoryInput {
                product_id: product.id,
                quantity,
                low_stock_threshold: 2,
            })
            .await
            .unwrap();
        uow.commit().await.unwrap();

        (pool, product.id)
    }

    #[tokio::test]
    async fn stale_snapshot_loses_the_race_without_history() {
        let (pool, product_id) = stocked_pool(10).await;

        let uow = UnitOfWork::begin(&pool).await.unwrap();
        let service = InventoryService::new(&uow);
        let snapshot = service.get_by_product(product_id).await.unwrap();

        // Another writer moves the quantity after the snapshot was taken.
        inventory::Entity::update_many()
            .col_expr(inventory::Column::Quantity, Expr::value(7))
            .filter(inventory::Column::Id.eq(snapshot.id))
            .exec(uow.conn())
            .await
            .unwrap();

        let result = service
            .apply_quantity_change(&snapshot, 4, "Sale of 6 units".into())
            .await;
        assert_matches!(result, Err(ServiceError::Conflict(_)));

        let history = inventory_history::Entity::find()
            .filter(inventory_history::Column::InventoryId.eq(snapshot.id))
            .count(uow.conn())
            .await
            .unwrap();
        assert_eq!(history, 0);
        assert_eq!(service.get_by_product(product_id).await.unwrap().quantity, 7);
        drop(uow);

        let uow = UnitOfWork::begin(&pool).await.unwrap();
        let stored = InventoryService::new(&uow)
            .get_by_product(product_id)
            .await
            .unwrap();
        assert_eq!(stored.quantity, 10);
    }

    #[tokio::test]
    async fn fresh_snapshot_writes_quantity_and_history() {
        let (pool, product_id) = stocked_pool(10).await;

        let uow = UnitOfWork::begin(&pool).await.unwrap();
        let service = InventoryService::new(&uow);
        let current = service.get_by_product(product_id).await.unwrap();
        let (updated, entry) = service
            .apply_quantity_change(&current, 1, "Shrinkage".into())
            .await
            .unwrap();
        uow.commit().await.unwrap();

        assert_eq!(updated.quantity, 1);
        assert!(updated.is_low_stock());
        assert_eq!(entry.previous_quantity, 10);
        assert_eq!(entry.new_quantity, 1);
    }
}
