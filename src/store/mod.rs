pub mod models;
pub mod repository;

#[cfg(test)]
pub mod memory;

pub use repository::{CommissionStore, PgCommissionStore};
