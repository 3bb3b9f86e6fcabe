pub mod format;
pub mod image_store;
pub mod manager;
pub mod portfolio_store;
