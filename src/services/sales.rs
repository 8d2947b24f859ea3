use super::{inventory::InventoryService, validate_positive_amount, DateRange, Page};
use crate::{
    db::UnitOfWork,
    entities::{product, sale},
    errors::ServiceError,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateSaleInput {
    pub product_id: i32,
    #[validate(range(min = 1))]
    #[schema(example = 3)]
    pub quantity: i32,
    #[validate(custom = "validate_positive_amount")]
    #[schema(example = "60.00")]
    pub total_amount: Decimal,
    /// When the sale happened; defaults to the time of recording
    #[serde(default)]
    pub sale_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SaleView {
    pub id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub total_amount: Decimal,
    pub sale_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<sale::Model> for SaleView {
    fn from(model: sale::Model) -> Self {
        Self {
            id: model.id,
            product_id: model.product_id,
            quantity: model.quantity,
            total_amount: model.total_amount,
            sale_date: model.sale_date,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SaleFilter {
    pub range: DateRange,
    pub product_id: Option<i32>,
}

/// Change reason written to inventory history for a sale.
pub fn sale_change_reason(quantity: i32) -> String {
    format!("Sale of {} units", quantity)
}

pub struct SalesService<'a> {
    uow: &'a UnitOfWork,
}

impl<'a> SalesService<'a> {
    pub fn new(uow: &'a UnitOfWork) -> Self {
        Self { uow }
    }

    /// Records a sale and decrements stock in the same unit of work.
    ///
    /// Fails with `NotFound` for an unknown product and `InsufficientStock`
    /// when the product has no inventory row or too few units.
    #[instrument(skip(self))]
    pub async fn record_sale(&self, input: CreateSaleInput) -> Result<sale::Model, ServiceError> {
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

        let inventory_service = InventoryService::new(self.uow);
        let inventory = inventory_service
            .find_by_product(input.product_id)
            .await?
            .ok_or_else(|| {
                ServiceError::InsufficientStock(format!(
                    "product {} has no inventory",
                    input.product_id
                ))
            })?;

        if inventory.quantity < input.quantity {
            return Err(ServiceError::InsufficientStock(format!(
                "product {} has {} units, {} requested",
                input.product_id, inventory.quantity, input.quantity
            )));
        }

        let sale = sale::ActiveModel {
            product_id: Set(input.product_id),
            quantity: Set(input.quantity),
            total_amount: Set(input.total_amount),
            sale_date: input.sale_date.map_or(ActiveValue::NotSet, Set),
            ..Default::default()
        }
        .insert(conn)
        .await?;

        inventory_service
            .apply_quantity_change(
                &inventory,
                inventory.quantity - input.quantity,
                sale_change_reason(input.quantity),
            )
            .await?;

        info!(
            sale_id = sale.id,
            product_id = sale.product_id,
            quantity = sale.quantity,
            total_amount = %sale.total_amount,
            "sale recorded"
        );
        Ok(sale)
    }

    /// Sales matching `filter`, newest sale first.
    #[instrument(skip(self))]
    pub async fn list_sales(
        &self,
        filter: SaleFilter,
        page: Page,
    ) -> Result<Vec<sale::Model>, ServiceError> {
        let mut query = filter.range.filter_sales(sale::Entity::find());
        if let Some(product_id) = filter.product_id {
            query = query.filter(sale::Column::ProductId.eq(product_id));
        }

        Ok(query
            .order_by_desc(sale::Column::SaleDate)
            .order_by_desc(sale::Column::Id)
            .offset(page.offset)
            .limit(page.limit)
            .all(self.uow.conn())
            .await?)
    }
}
