pub mod analytics;
pub mod categories;
pub mod common;
pub mod inventory;
pub mod products;
pub mod sales;
