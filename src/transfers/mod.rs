pub mod transfers_errors;
pub mod transfers_model;
pub mod transfers_repository;
pub mod transfers_service;

pub use transfers_errors::TransferError;
pub use transfers_model::{SortDirection, Transaction, TransactionQuery, TransactionSort};
pub use transfers_repository::TransferRepository;
pub use transfers_service::TransferService;
