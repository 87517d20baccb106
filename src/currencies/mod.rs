pub mod currencies_model;
pub mod currencies_repository;

pub use currencies_model::{validate_currency_code, Currency, NewCurrency};
pub use currencies_repository::CurrencyRepository;
