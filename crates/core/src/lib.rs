pub mod db;

pub mod accounts;
pub mod budgets;
pub mod categories;
pub mod dashboard;
pub mod goals;
pub mod transactions;

pub mod constants;
pub mod errors;
pub mod schema;

pub use errors::{Error, Result};
