mod common;

use rust_decimal_macros::dec;
use std::sync::Arc;

use billfold_core::transfers::{TransactionQuery, TransferRepository};
use billfold_core::wallets::WalletRepository;

use common::{
    create_system_wallet, create_user, get_balance, onboarding_service, setup_db,
    StaticRateProvider,
};

#[tokio::test]
async fn bootstrap_creates_three_wallets_and_grants_the_welcome_amount() {
    let db = setup_db();
    let provider = Arc::new(StaticRateProvider::default());
    let system = create_system_wallet(&db.pool, "USD", dec!(1000));
    let service = onboarding_service(&db.pool, provider.clone(), &system.id);

    let alice = create_user(&db.pool, "alice");
    let wallets = service.create_starter_wallets(&alice.id).await.unwrap();

    assert_eq!(wallets.len(), 3);
    let mut currencies: Vec<&str> = wallets.iter().map(|w| w.currency.as_str()).collect();
    currencies.sort_unstable();
    assert_eq!(currencies, ["CNY", "EUR", "USD"]);

    for wallet in &wallets {
        if wallet.currency == "USD" {
            assert_eq!(wallet.balance, dec!(100));
        } else {
            assert_eq!(wallet.balance, dec!(0));
        }
        assert!(wallet.is_owned_by(&alice.id));
    }

    assert_eq!(get_balance(&db.pool, &system.id), dec!(900));
    assert_eq!(provider.fetch_count(), 0);

    let transactions = TransferRepository::new(db.pool.clone())
        .list(&TransactionQuery::default())
        .unwrap();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0].description.as_deref(), Some("welcome"));
    assert_eq!(transactions[0].amount, dec!(100));
}

#[tokio::test]
async fn bootstrap_survives_an_underfunded_system_wallet() {
    let db = setup_db();
    let provider = Arc::new(StaticRateProvider::default());
    let system = create_system_wallet(&db.pool, "USD", dec!(50));
    let service = onboarding_service(&db.pool, provider, &system.id);

    let alice = create_user(&db.pool, "alice");
    let wallets = service.create_starter_wallets(&alice.id).await.unwrap();

    // All three wallets exist, the grant was skipped, nothing failed
    assert_eq!(wallets.len(), 3);
    for wallet in &wallets {
        assert_eq!(wallet.balance, dec!(0));
    }
    assert_eq!(get_balance(&db.pool, &system.id), dec!(50));

    let transactions = TransferRepository::new(db.pool.clone())
        .list(&TransactionQuery::default())
        .unwrap();
    assert!(transactions.is_empty());
}

#[tokio::test]
async fn bootstrapping_two_users_draws_two_grants() {
    let db = setup_db();
    let provider = Arc::new(StaticRateProvider::default());
    let system = create_system_wallet(&db.pool, "USD", dec!(1000));
    let service = onboarding_service(&db.pool, provider, &system.id);

    let alice = create_user(&db.pool, "alice");
    let bob = create_user(&db.pool, "bob");
    service.create_starter_wallets(&alice.id).await.unwrap();
    service.create_starter_wallets(&bob.id).await.unwrap();

    assert_eq!(get_balance(&db.pool, &system.id), dec!(800));

    let repository = WalletRepository::new(db.pool.clone());
    assert_eq!(repository.list_for_user(&alice.id).unwrap().len(), 3);
    assert_eq!(repository.list_for_user(&bob.id).unwrap().len(), 3);
}
