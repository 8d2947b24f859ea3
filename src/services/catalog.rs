use super::{validate_positive_amount, Page};
use crate::{
    db::UnitOfWork,
    entities::{category, product},
    errors::ServiceError,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryInput {
    #[validate(length(min = 1, max = 100))]
    #[schema(example = "Electronics")]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCategoryInput {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateProductInput {
    #[validate(length(min = 1, max = 200))]
    #[schema(example = "Electronics Product 1")]
    pub name: String,
    pub description: Option<String>,
    #[validate(custom = "validate_positive_amount")]
    #[schema(example = "19.99")]
    pub price: Decimal,
    pub category_id: i32,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProductInput {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(custom = "validate_positive_amount")]
    pub price: Option<Decimal>,
    pub category_id: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryView {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<category::Model> for CategoryView {
    fn from(model: category::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductView {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub category_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<product::Model> for ProductView {
    fn from(model: product::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            price: model.price,
            category_id: model.category_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Category and product maintenance.
pub struct CatalogService<'a> {
    uow: &'a UnitOfWork,
}

impl<'a> CatalogService<'a> {
    pub fn new(uow: &'a UnitOfWork) -> Self {
        Self { uow }
    }

    #[instrument(skip(self))]
    pub async fn create_category(
        &self,
        input: CreateCategoryInput,
    ) -> Result<category::Model, ServiceError> {
        input.validate()?;
        self.ensure_category_name_free(&input.name, None).await?;

        let conflict = format!("category '{}' already exists", input.name);
        let model = category::ActiveModel {
            name: Set(input.name),
            description: Set(input.description),
            ..Default::default()
        }
        .insert(self.uow.conn())
        .await
        .map_err(|e| ServiceError::from_write(e, conflict))?;

        info!(category_id = model.id, name = %model.name, "category created");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn list_categories(&self, page: Page) -> Result<Vec<category::Model>, ServiceError> {
        Ok(category::Entity::find()
            .order_by_asc(category::Column::Id)
            .offset(page.offset)
            .limit(page.limit)
            .all(self.uow.conn())
            .await?)
    }

    pub async fn get_category(&self, id: i32) -> Result<category::Model, ServiceError> {
        category::Entity::find_by_id(id)
            .one(self.uow.conn())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("category {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn update_category(
        &self,
        id: i32,
        input: UpdateCategoryInput,
    ) -> Result<category::Model, ServiceError> {
        input.validate()?;
        let existing = self.get_category(id).await?;

        let mut active = existing.into_active_model();
        if let Some(name) = input.name {
            self.ensure_category_name_free(&name, Some(id)).await?;
            active.name = Set(name);
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description));
        }

        let model = active
            .update(self.uow.conn())
            .await
            .map_err(|e| ServiceError::from_write(e, "category name already exists"))?;

        info!(category_id = model.id, "category updated");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn create_product(
        &self,
        input: CreateProductInput,
    ) -> Result<product::Model, ServiceError> {
        input.validate()?;
        self.get_category(input.category_id).await?;

        let model = product::ActiveModel {
            name: Set(input.name),
            description: Set(input.description),
            price: Set(input.price),
            category_id: Set(input.category_id),
            ..Default::default()
        }
        .insert(self.uow.conn())
        .await?;

        info!(product_id = model.id, category_id = model.category_id, "product created");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        category_id: Option<i32>,
        page: Page,
    ) -> Result<Vec<product::Model>, ServiceError> {
        let mut query = product::Entity::find();
        if let Some(category_id) = category_id {
            query = query.filter(product::Column::CategoryId.eq(category_id));
        }

        Ok(query
            .order_by_asc(product::Column::Id)
            .offset(page.offset)
            .limit(page.limit)
            .all(self.uow.conn())
            .await?)
    }

    pub async fn get_product(&self, id: i32) -> Result<product::Model, ServiceError> {
        product::Entity::find_by_id(id)
            .one(self.uow.conn())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("product {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn update_product(
        &self,
        id: i32,
        input: UpdateProductInput,
    ) -> Result<product::Model, ServiceError> {
        input.validate()?;
        let existing = self.get_product(id).await?;

        let mut active = existing.into_active_model();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description));
        }
        if let Some(price) = input.price {
            active.price = Set(price);
        }
        if let Some(category_id) = input.category_id {
            self.get_category(category_id).await?;
            active.category_id = Set(category_id);
        }

        let model = active.update(self.uow.conn()).await?;
        info!(product_id = model.id, "product updated");
        Ok(model)
    }

    async fn ensure_category_name_free(
        &self,
        name: &str,
        except_id: Option<i32>,
    ) -> Result<(), ServiceError> {
        let mut query = category::Entity::find().filter(category::Column::Name.eq(name));
        if let Some(id) = except_id {
            query = query.filter(category::Column::Id.ne(id));
        }

        if query.one(self.uow.conn()).await?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "category '{}' already exists",
                name
            )));
        }
        Ok(())
    }
}
