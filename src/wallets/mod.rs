pub mod wallets_errors;
pub mod wallets_model;
pub mod wallets_repository;
pub mod wallets_service;

pub use wallets_errors::{Result, WalletError};
pub use wallets_model::{NewWallet, Wallet};
pub use wallets_repository::WalletRepository;
pub use wallets_service::WalletService;
