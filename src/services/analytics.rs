use super::DateRange;
use crate::{
    db::UnitOfWork,
    entities::{category, product, sale},
    errors::ServiceError,
};
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use rust_decimal::{prelude::ToPrimitive, Decimal};
use sea_orm::{
    sea_query::Expr, EntityTrait, FromQueryResult, JoinType, QueryOrder, QuerySelect,
    RelationTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, instrument};
use utoipa::ToSchema;

pub const MAX_LOOKBACK_DAYS: i64 = 3650;
pub const MAX_LOOKBACK_MONTHS: i64 = 120;
/// Months are approximated as fixed 30-day blocks when computing lookbacks.
pub const DAYS_PER_MONTH: i64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DailyRevenue {
    pub date: NaiveDate,
    pub revenue: Decimal,
    pub order_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DailySales {
    pub date: NaiveDate,
    pub total_sales: Decimal,
    pub total_quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MonthlyRevenue {
    pub year: i32,
    pub month: u32,
    pub revenue: Decimal,
    pub order_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CategoryRevenue {
    pub category_id: i32,
    pub category_name: String,
    pub revenue: Decimal,
    pub total_quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProductSales {
    pub product_id: i32,
    pub product_name: String,
    pub total_sales: Decimal,
    pub total_quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PeriodRevenue {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RevenueComparison {
    pub period1: PeriodRevenue,
    pub period2: PeriodRevenue,
    pub percentage_change: f64,
}

/// Closed interval compared by [`AnalyticsService::compare_revenue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Period {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ServiceError> {
        DateRange::between(start, end)?;
        Ok(Self { start, end })
    }

    fn range(&self) -> DateRange {
        DateRange {
            start: Some(self.start),
            end: Some(self.end),
        }
    }
}

/// Columns of a sale the calendar buckets need.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct SalePoint {
    pub sale_date: DateTime<Utc>,
    pub total_amount: Decimal,
    pub quantity: i32,
}

/// Revenue with two decimal places. SQLite sums come back with whatever
/// scale the arithmetic produced.
pub fn money(mut amount: Decimal) -> Decimal {
    amount.rescale(2);
    amount
}

/// Per-day totals over a set of sales.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayBucket {
    pub date: NaiveDate,
    pub revenue: Decimal,
    pub order_count: i64,
    pub total_quantity: i64,
}

/// Per-(year, month) totals over a set of sales.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthBucket {
    pub year: i32,
    pub month: u32,
    pub revenue: Decimal,
    pub order_count: i64,
}

/// Groups sales by the UTC calendar date of `sale_date`, oldest first.
/// Dates without sales produce no bucket.
pub fn bucket_by_day(sales: &[SalePoint]) -> Vec<DayBucket> {
    let mut buckets: BTreeMap<NaiveDate, DayBucket> = BTreeMap::new();
    for sale in sales {
        let date = sale.sale_date.date_naive();
        let bucket = buckets.entry(date).or_insert_with(|| DayBucket {
            date,
            revenue: Decimal::ZERO,
            order_count: 0,
            total_quantity: 0,
        });
        bucket.revenue += sale.total_amount;
        bucket.order_count += 1;
        bucket.total_quantity += i64::from(sale.quantity);
    }
    buckets
        .into_values()
        .map(|bucket| DayBucket {
            revenue: money(bucket.revenue),
            ..bucket
        })
        .collect()
}

/// Groups sales by the (year, month) of `sale_date`, oldest first.
pub fn bucket_by_month(sales: &[SalePoint]) -> Vec<MonthBucket> {
    let mut buckets: BTreeMap<(i32, u32), MonthBucket> = BTreeMap::new();
    for sale in sales {
        let key = (sale.sale_date.year(), sale.sale_date.month());
        let bucket = buckets.entry(key).or_insert_with(|| MonthBucket {
            year: key.0,
            month: key.1,
            revenue: Decimal::ZERO,
            order_count: 0,
        });
        bucket.revenue += sale.total_amount;
        bucket.order_count += 1;
    }
    buckets
        .into_values()
        .map(|bucket| MonthBucket {
            revenue: money(bucket.revenue),
            ..bucket
        })
        .collect()
}

/// Relative change from `previous` to `current` in percent.
///
/// A zero `previous` has no ratio: the change is reported as 100 when
/// `current` is positive and 0 otherwise.
pub fn percentage_change(previous: Decimal, current: Decimal) -> f64 {
    if previous.is_zero() {
        return if current > Decimal::ZERO { 100.0 } else { 0.0 };
    }

    ((current - previous) / previous * Decimal::ONE_HUNDRED)
        .to_f64()
        .unwrap_or(0.0)
}

/// Inclusive window `[now - days, now]`.
pub fn lookback_window(now: DateTime<Utc>, days: i64) -> DateRange {
    DateRange {
        start: Some(now - Duration::days(days)),
        end: Some(now),
    }
}

fn check_lookback(value: i64, max: i64, unit: &str) -> Result<(), ServiceError> {
    if (1..=max).contains(&value) {
        Ok(())
    } else {
        Err(ServiceError::ValidationError(format!(
            "{} must be between 1 and {}, got {}",
            unit, max, value
        )))
    }
}

#[derive(Debug, FromQueryResult)]
struct CategoryRevenueRow {
    category_id: i32,
    category_name: String,
    revenue: Option<Decimal>,
    total_quantity: Option<i64>,
}

#[derive(Debug, FromQueryResult)]
struct ProductSalesRow {
    product_id: i32,
    product_name: String,
    total_sales: Option<Decimal>,
    total_quantity: Option<i64>,
}

/// Read-only revenue reporting over recorded sales.
pub struct AnalyticsService<'a> {
    uow: &'a UnitOfWork,
}

impl<'a> AnalyticsService<'a> {
    pub fn new(uow: &'a UnitOfWork) -> Self {
        Self { uow }
    }

    #[instrument(skip(self))]
    pub async fn daily_revenue(
        &self,
        days: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<DailyRevenue>, ServiceError> {
        check_lookback(days, MAX_LOOKBACK_DAYS, "days")?;
        let sales = self.sales_in(lookback_window(now, days)).await?;

        Ok(bucket_by_day(&sales)
            .into_iter()
            .map(|bucket| DailyRevenue {
                date: bucket.date,
                revenue: bucket.revenue,
                order_count: bucket.order_count,
            })
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn daily_sales(
        &self,
        days: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<DailySales>, ServiceError> {
        check_lookback(days, MAX_LOOKBACK_DAYS, "days")?;
        let sales = self.sales_in(lookback_window(now, days)).await?;

        Ok(bucket_by_day(&sales)
            .into_iter()
            .map(|bucket| DailySales {
                date: bucket.date,
                total_sales: bucket.revenue,
                total_quantity: bucket.total_quantity,
            })
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn monthly_revenue(
        &self,
        months: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<MonthlyRevenue>, ServiceError> {
        check_lookback(months, MAX_LOOKBACK_MONTHS, "months")?;
        let sales = self
            .sales_in(lookback_window(now, months * DAYS_PER_MONTH))
            .await?;

        Ok(bucket_by_month(&sales)
            .into_iter()
            .map(|bucket| MonthlyRevenue {
                year: bucket.year,
                month: bucket.month,
                revenue: bucket.revenue,
                order_count: bucket.order_count,
            })
            .collect())
    }

    /// Revenue and units per category (sale → product → category), by category id.
    #[instrument(skip(self))]
    pub async fn revenue_by_category(
        &self,
        range: DateRange,
    ) -> Result<Vec<CategoryRevenue>, ServiceError> {
        let query = sale::Entity::find()
            .select_only()
            .column_as(category::Column::Id, "category_id")
            .column_as(category::Column::Name, "category_name")
            .column_as(
                Expr::col((sale::Entity, sale::Column::TotalAmount)).sum(),
                "revenue",
            )
            .column_as(
                Expr::col((sale::Entity, sale::Column::Quantity)).sum(),
                "total_quantity",
            )
            .join(JoinType::InnerJoin, sale::Relation::Product.def())
            .join(JoinType::InnerJoin, product::Relation::Category.def());

        let rows = range
            .filter_sales(query)
            .group_by(category::Column::Id)
            .group_by(category::Column::Name)
            .order_by_asc(category::Column::Id)
            .into_model::<CategoryRevenueRow>()
            .all(self.uow.conn())
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| CategoryRevenue {
                category_id: row.category_id,
                category_name: row.category_name,
                revenue: money(row.revenue.unwrap_or_default()),
                total_quantity: row.total_quantity.unwrap_or_default(),
            })
            .collect())
    }

    /// Revenue and units per product, by product id.
    #[instrument(skip(self))]
    pub async fn revenue_by_product(
        &self,
        range: DateRange,
    ) -> Result<Vec<ProductSales>, ServiceError> {
        let query = product::Entity::find()
            .select_only()
            .column_as(product::Column::Id, "product_id")
            .column_as(product::Column::Name, "product_name")
            .column_as(
                Expr::col((sale::Entity, sale::Column::TotalAmount)).sum(),
                "total_sales",
            )
            .column_as(
                Expr::col((sale::Entity, sale::Column::Quantity)).sum(),
                "total_quantity",
            )
            .join(JoinType::InnerJoin, product::Relation::Sales.def());

        let rows = range
            .filter_sales(query)
            .group_by(product::Column::Id)
            .group_by(product::Column::Name)
            .order_by_asc(product::Column::Id)
            .into_model::<ProductSalesRow>()
            .all(self.uow.conn())
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| ProductSales {
                product_id: row.product_id,
                product_name: row.product_name,
                total_sales: money(row.total_sales.unwrap_or_default()),
                total_quantity: row.total_quantity.unwrap_or_default(),
            })
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn compare_revenue(
        &self,
        period1: Period,
        period2: Period,
    ) -> Result<RevenueComparison, ServiceError> {
        let revenue1 = self.revenue_in(period1.range()).await?;
        let revenue2 = self.revenue_in(period2.range()).await?;
        let change = percentage_change(revenue1, revenue2);
        debug!(%revenue1, %revenue2, change, "compared revenue periods");

        Ok(RevenueComparison {
            period1: PeriodRevenue {
                start: period1.start,
                end: period1.end,
                revenue: revenue1,
            },
            period2: PeriodRevenue {
                start: period2.start,
                end: period2.end,
                revenue: revenue2,
            },
            percentage_change: change,
        })
    }

    /// Sum of `total_amount` within `range`; zero when nothing matches.
    pub async fn revenue_in(&self, range: DateRange) -> Result<Decimal, ServiceError> {
        let total = range
            .filter_sales(sale::Entity::find())
            .select_only()
            .column_as(
                Expr::col((sale::Entity, sale::Column::TotalAmount)).sum(),
                "revenue",
            )
            .into_tuple::<Option<Decimal>>()
            .one(self.uow.conn())
            .await?
            .flatten();

        Ok(money(total.unwrap_or(Decimal::ZERO)))
    }

    /// Only the bucketed columns are read; a ten-year window can span the
    /// whole sales table.
    async fn sales_in(&self, range: DateRange) -> Result<Vec<SalePoint>, ServiceError> {
        Ok(range
            .filter_sales(sale::Entity::find())
            .select_only()
            .column(sale::Column::SaleDate)
            .column(sale::Column::TotalAmount)
            .column(sale::Column::Quantity)
            .order_by_asc(sale::Column::SaleDate)
            .into_model::<SalePoint>()
            .all(self.uow.conn())
            .await?)
    }
}
