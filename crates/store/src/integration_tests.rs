//! Engine tests against the in-memory backend: atomicity, conservation,
//! rollback, and the double-spend race.

use std::sync::Arc;

use coinshop_core::AccountId;

use crate::coordinator::TransactionCoordinator;
use crate::error::{PurchaseError, StoreError, TransferError};
use crate::memory::MemoryStore;
use crate::profile::ProfileAggregator;
use crate::store::Store;

struct Harness {
    store: Arc<MemoryStore>,
    coordinator: TransactionCoordinator,
    aggregator: ProfileAggregator,
}

fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    let as_store: Arc<dyn Store> = store.clone();
    Harness {
        store,
        coordinator: TransactionCoordinator::new(as_store.clone()),
        aggregator: ProfileAggregator::new(as_store),
    }
}

impl Harness {
    async fn register(&self, name: &str) -> AccountId {
        self.store
            .create_account(name, "digest")
            .await
            .expect("account creation failed")
            .id
    }

    async fn balance(&self, id: AccountId) -> i64 {
        self.store
            .account_by_id(id)
            .await
            .unwrap()
            .expect("account missing")
            .balance
            .get()
    }
}

#[tokio::test]
async fn purchase_debits_balance_and_grants_item() {
    let h = harness();
    let alice = h.register("alice").await;

    h.coordinator.purchase(alice, "cup").await.unwrap();

    assert_eq!(h.balance(alice).await, 980);
    let profile = h.aggregator.profile(alice).await.unwrap();
    assert_eq!(profile.inventory.len(), 1);
    assert_eq!(profile.inventory[0].item, "cup");
    assert_eq!(profile.inventory[0].quantity, 1);
}

#[tokio::test]
async fn repeat_purchase_increments_the_same_entry() {
    let h = harness();
    let alice = h.register("alice").await;

    h.coordinator.purchase(alice, "pen").await.unwrap();
    h.coordinator.purchase(alice, "pen").await.unwrap();

    let profile = h.aggregator.profile(alice).await.unwrap();
    assert_eq!(profile.inventory.len(), 1);
    assert_eq!(profile.inventory[0].quantity, 2);
    assert_eq!(profile.account.balance.get(), 980);
}

#[tokio::test]
async fn purchase_fails_for_unknown_account_or_item() {
    let h = harness();
    let alice = h.register("alice").await;

    assert!(matches!(
        h.coordinator.purchase(AccountId::new(), "cup").await,
        Err(PurchaseError::AccountNotFound)
    ));
    assert!(matches!(
        h.coordinator.purchase(alice, "yacht").await,
        Err(PurchaseError::ItemNotFound(_))
    ));
    assert_eq!(h.balance(alice).await, 1000);
}

#[tokio::test]
async fn purchase_with_insufficient_balance_mutates_nothing() {
    let h = harness();
    let alice = h.register("alice").await;
    let bob = h.register("bob").await;

    // Drain alice down to 300.
    h.coordinator.transfer(alice, bob, 700).await.unwrap();

    let err = h.coordinator.purchase(alice, "pink-hoody").await.unwrap_err();
    assert!(matches!(
        err,
        PurchaseError::InsufficientBalance {
            balance: 300,
            price: 500
        }
    ));
    assert_eq!(h.balance(alice).await, 300);
    let profile = h.aggregator.profile(alice).await.unwrap();
    assert!(profile.inventory.is_empty());
}

#[tokio::test]
async fn transfer_moves_coins_and_appends_one_entry_each_way() {
    let h = harness();
    let alice = h.register("alice").await;
    let bob = h.register("bob").await;
    let sink = h.register("sink").await;

    // Drain bob to zero so the flow starts from 1000 / 0.
    h.coordinator.transfer(bob, sink, 1000).await.unwrap();

    h.coordinator.transfer(alice, bob, 500).await.unwrap();
    h.coordinator.transfer(bob, alice, 200).await.unwrap();

    assert_eq!(h.balance(alice).await, 700);
    assert_eq!(h.balance(bob).await, 300);

    let profile = h.aggregator.profile(alice).await.unwrap();
    assert_eq!(profile.history.sent.len(), 1);
    assert_eq!(profile.history.sent[0].to, "bob");
    assert_eq!(profile.history.sent[0].amount.get(), 500);
    assert_eq!(profile.history.received.len(), 1);
    assert_eq!(profile.history.received[0].from, "bob");
    assert_eq!(profile.history.received[0].amount.get(), 200);
}

#[tokio::test]
async fn transfer_with_insufficient_balance_leaves_sender_unchanged() {
    let h = harness();
    let alice = h.register("alice").await;
    let bob = h.register("bob").await;

    h.coordinator.transfer(alice, bob, 700).await.unwrap();

    let err = h.coordinator.transfer(alice, bob, 500).await.unwrap_err();
    assert!(matches!(
        err,
        TransferError::InsufficientBalance {
            balance: 300,
            amount: 500
        }
    ));
    assert_eq!(h.balance(alice).await, 300);
    assert_eq!(h.balance(bob).await, 1700);
}

#[tokio::test]
async fn self_transfer_is_always_rejected() {
    let h = harness();
    let alice = h.register("alice").await;

    assert!(matches!(
        h.coordinator.transfer(alice, alice, 10).await,
        Err(TransferError::SelfTransfer)
    ));
    assert_eq!(h.balance(alice).await, 1000);
    let profile = h.aggregator.profile(alice).await.unwrap();
    assert!(profile.history.sent.is_empty());
    assert!(profile.history.received.is_empty());
}

#[tokio::test]
async fn non_positive_amounts_are_rejected_before_the_store() {
    let h = harness();
    let alice = h.register("alice").await;
    let bob = h.register("bob").await;

    assert!(matches!(
        h.coordinator.transfer(alice, bob, 0).await,
        Err(TransferError::InvalidAmount)
    ));
    assert!(matches!(
        h.coordinator.transfer(alice, bob, -5).await,
        Err(TransferError::InvalidAmount)
    ));
}

#[tokio::test]
async fn transfer_to_unknown_receiver_is_rejected() {
    let h = harness();
    let alice = h.register("alice").await;

    assert!(matches!(
        h.coordinator.transfer(alice, AccountId::new(), 10).await,
        Err(TransferError::ReceiverNotFound)
    ));
    assert_eq!(h.balance(alice).await, 1000);
}

#[tokio::test]
async fn transfers_conserve_the_total_supply() {
    let h = harness();
    let a = h.register("a").await;
    let b = h.register("b").await;
    let c = h.register("c").await;

    h.coordinator.transfer(a, b, 250).await.unwrap();
    h.coordinator.transfer(b, c, 900).await.unwrap();
    h.coordinator.transfer(c, a, 123).await.unwrap();
    let _ = h.coordinator.transfer(a, c, 10_000).await; // rejected, no effect

    let total = h.balance(a).await + h.balance(b).await + h.balance(c).await;
    assert_eq!(total, 3000);
}

#[tokio::test]
async fn commit_failure_rolls_back_a_purchase() {
    let h = harness();
    let alice = h.register("alice").await;
    let before = h.aggregator.profile(alice).await.unwrap();

    h.store.inject_commit_failure();
    let err = h.coordinator.purchase(alice, "cup").await.unwrap_err();
    assert!(matches!(
        err,
        PurchaseError::Transaction(StoreError::Unavailable { .. })
    ));

    let after = h.aggregator.profile(alice).await.unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn commit_failure_rolls_back_a_transfer() {
    let h = harness();
    let alice = h.register("alice").await;
    let bob = h.register("bob").await;

    h.store.inject_commit_failure();
    let err = h.coordinator.transfer(alice, bob, 400).await.unwrap_err();
    assert!(matches!(
        err,
        TransferError::Transaction(StoreError::Unavailable { .. })
    ));

    assert_eq!(h.balance(alice).await, 1000);
    assert_eq!(h.balance(bob).await, 1000);
    let profile = h.aggregator.profile(alice).await.unwrap();
    assert!(profile.history.sent.is_empty());
}

#[tokio::test]
async fn profile_reads_are_idempotent() {
    let h = harness();
    let alice = h.register("alice").await;
    let bob = h.register("bob").await;
    h.coordinator.purchase(alice, "book").await.unwrap();
    h.coordinator.transfer(alice, bob, 100).await.unwrap();

    let first = h.aggregator.profile(alice).await.unwrap();
    let second = h.aggregator.profile(alice).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn profile_for_unknown_account_is_a_distinct_error() {
    let h = harness();
    assert!(matches!(
        h.aggregator.profile(AccountId::new()).await,
        Err(crate::error::AggregationError::AccountNotFound)
    ));
}

#[tokio::test]
async fn concurrent_purchases_cannot_double_spend() {
    let h = harness();
    let alice = h.register("alice").await;

    // Down to exactly one pink-hoody's worth of coins.
    h.coordinator.purchase(alice, "pink-hoody").await.unwrap();
    assert_eq!(h.balance(alice).await, 500);

    let (first, second) = tokio::join!(
        h.coordinator.purchase(alice, "pink-hoody"),
        h.coordinator.purchase(alice, "pink-hoody"),
    );

    let successes = [&first, &second].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);
    assert!(
        [first, second].into_iter().any(|r| matches!(
            r,
            Err(PurchaseError::InsufficientBalance { balance: 0, .. })
        ))
    );

    assert_eq!(h.balance(alice).await, 0);
    let profile = h.aggregator.profile(alice).await.unwrap();
    assert_eq!(profile.inventory[0].quantity, 2);
}

#[tokio::test]
async fn display_names_are_unique() {
    let h = harness();
    h.register("alice").await;

    assert!(matches!(
        h.store.create_account("alice", "digest").await,
        Err(StoreError::Constraint { .. })
    ));
}
