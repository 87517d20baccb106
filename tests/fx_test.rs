mod common;

use rust_decimal_macros::dec;
use std::sync::Arc;

use billfold_core::currencies::CurrencyRepository;
use billfold_core::errors::Error;
use billfold_core::fx::{FxError, FxRepository, FxRepositoryTrait, FxServiceTrait, NewExchangeRate};

use common::{fx_service, setup_db, StaticRateProvider};

#[test]
fn upsert_is_idempotent_and_creates_currencies() {
    let db = setup_db();
    let repository = FxRepository::new(db.pool.clone());

    repository
        .upsert_rate(NewExchangeRate {
            from_currency: "USD".to_string(),
            to_currency: "EUR".to_string(),
            rate: dec!(0.9),
        })
        .unwrap();
    let replaced = repository
        .upsert_rate(NewExchangeRate {
            from_currency: "USD".to_string(),
            to_currency: "EUR".to_string(),
            rate: dec!(0.95),
        })
        .unwrap();

    assert_eq!(replaced.rate, dec!(0.95));

    let rates = repository.get_rates().unwrap();
    assert_eq!(rates.len(), 1);
    assert_eq!(rates[0].from_currency, "USD");
    assert_eq!(rates[0].to_currency, "EUR");
    assert_eq!(rates[0].rate, dec!(0.95));

    // Both currencies were created lazily
    let currencies = CurrencyRepository::new(db.pool.clone());
    assert!(currencies.get_by_code("USD").unwrap().is_some());
    assert!(currencies.get_by_code("EUR").unwrap().is_some());
}

#[test]
fn rates_are_directional() {
    let db = setup_db();
    let repository = FxRepository::new(db.pool.clone());

    repository
        .upsert_rate(NewExchangeRate {
            from_currency: "USD".to_string(),
            to_currency: "EUR".to_string(),
            rate: dec!(0.9),
        })
        .unwrap();

    assert!(repository.get_rate("USD", "EUR").unwrap().is_some());
    assert!(repository.get_rate("EUR", "USD").unwrap().is_none());
}

#[tokio::test]
async fn resolve_fetches_once_and_persists_the_whole_table() {
    let db = setup_db();
    let provider = Arc::new(
        StaticRateProvider::default()
            .with_table("USD", &[("EUR", dec!(0.9)), ("CNY", dec!(7.25))]),
    );
    let service = fx_service(&db.pool, provider.clone());

    let rate = service.resolve_rate("USD", "EUR").await.unwrap();
    assert_eq!(rate.rate, dec!(0.9));
    assert_eq!(provider.fetch_count(), 1);

    // The whole table was persisted by the single fetch
    assert_eq!(service.get_rates().unwrap().len(), 2);

    // Both pairs now resolve from the store without touching the source
    let cny = service.resolve_rate("USD", "CNY").await.unwrap();
    assert_eq!(cny.rate, dec!(7.25));
    let eur = service.resolve_rate("USD", "EUR").await.unwrap();
    assert_eq!(eur.rate, dec!(0.9));
    assert_eq!(provider.fetch_count(), 1);
}

#[tokio::test]
async fn resolve_fails_when_target_is_not_in_the_table() {
    let db = setup_db();
    let provider = Arc::new(
        StaticRateProvider::default().with_table("USD", &[("EUR", dec!(0.9))]),
    );
    let service = fx_service(&db.pool, provider.clone());

    let err = service.resolve_rate("USD", "GBP").await.unwrap_err();
    assert!(matches!(err, Error::Fx(FxError::RateUnavailable(_))));
    assert_eq!(provider.fetch_count(), 1);

    // The fetched table is still persisted for future lookups
    assert_eq!(service.get_rates().unwrap().len(), 1);
}

#[tokio::test]
async fn resolve_surfaces_source_failures() {
    let db = setup_db();
    let provider = Arc::new(StaticRateProvider::default());
    let service = fx_service(&db.pool, provider.clone());

    let err = service.resolve_rate("USD", "EUR").await.unwrap_err();
    assert!(matches!(err, Error::Fx(FxError::ExternalSource(_))));
}

#[tokio::test]
async fn manually_seeded_rates_resolve_without_fetching() {
    let db = setup_db();
    let provider = Arc::new(StaticRateProvider::default());
    let service = fx_service(&db.pool, provider.clone());

    service
        .add_rate(NewExchangeRate {
            from_currency: "USD".to_string(),
            to_currency: "EUR".to_string(),
            rate: dec!(0.5),
        })
        .unwrap();

    let rate = service.resolve_rate("USD", "EUR").await.unwrap();
    assert_eq!(rate.rate, dec!(0.5));
    assert_eq!(provider.fetch_count(), 0);
}

#[tokio::test]
async fn load_all_rates_walks_every_discovered_currency() {
    let db = setup_db();
    let provider = Arc::new(
        StaticRateProvider::default()
            .with_default_table("USD", &[("EUR", dec!(0.9))])
            .with_table("EUR", &[("USD", dec!(1.1))]),
    );
    let service = fx_service(&db.pool, provider.clone());

    let stored = service.load_all_rates().await.unwrap();
    assert_eq!(stored, 2);

    let rates = service.get_rates().unwrap();
    assert_eq!(rates.len(), 2);
    assert_eq!(service.get_rate("USD", "EUR").unwrap().unwrap().rate, dec!(0.9));
    assert_eq!(service.get_rate("EUR", "USD").unwrap().unwrap().rate, dec!(1.1));

    // One fetch for the default table plus one per discovered currency
    assert_eq!(provider.fetch_count(), 2);
}
