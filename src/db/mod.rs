pub mod claim;
pub mod database;
pub mod store;
