//! Domain operations. Every service borrows the caller's [`UnitOfWork`] so
//! the caller decides where the transaction begins and ends.
//!
//! [`UnitOfWork`]: crate::db::UnitOfWork

pub mod analytics;
pub mod catalog;
pub mod inventory;
pub mod sales;

use crate::entities::sale;
use crate::errors::ServiceError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, QueryFilter};
use validator::ValidationError;

/// Offset/limit window for list operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: u64,
    pub limit: u64,
}

impl Page {
    pub fn new(offset: u64, limit: u64) -> Self {
        Self { offset, limit }
    }
}

/// Inclusive bounds on `sale_date`; a missing side is unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new(
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Self, ServiceError> {
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(ServiceError::ValidationError(format!(
                    "start date {} is after end date {}",
                    start.to_rfc3339(),
                    end.to_rfc3339()
                )));
            }
        }
        Ok(Self { start, end })
    }

    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ServiceError> {
        Self::new(Some(start), Some(end))
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start.map_or(true, |start| at >= start) && self.end.map_or(true, |end| at <= end)
    }

    pub(crate) fn filter_sales<Q: QueryFilter>(&self, mut query: Q) -> Q {
        if let Some(start) = self.start {
            query = query.filter(sale::Column::SaleDate.gte(start));
        }
        if let Some(end) = self.end {
            query = query.filter(sale::Column::SaleDate.lte(end));
        }
        query
    }
}

fn validate_positive_amount(value: &Decimal) -> Result<(), ValidationError> {
    if *value > Decimal::ZERO {
        Ok(())
    } else {
        let mut err = ValidationError::new("positive_amount");
        err.message = Some("must be greater than zero".into());
        Err(err)
    }
}
