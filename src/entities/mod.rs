pub mod category;
pub mod inventory;
pub mod inventory_history;
pub mod product;
pub mod sale;
