pub mod transactions_errors;
pub mod transactions_model;
pub mod transactions_repository;
pub mod transactions_service;

pub use transactions_errors::TransactionError;
pub use transactions_model::{
    NewTransaction, SortDirection, Transaction, TransactionFilters, TransactionSortBy,
    TransactionType, TransactionUpdate,
};
pub use transactions_repository::TransactionRepository;
pub use transactions_service::TransactionService;
