//! Restock and adjustment engine tests

use chrono::DateTime;
use rust_decimal::Decimal;
use shared::{
    BatchStatus, ChangeReason, OwnerKind, OwnerScope, Provenance, StockBatch,
};
use stock_ledger::services::adjustment::{
    AdjustmentService, CorrectQuantityInput, DamageInput, RestockInput,
};
use stock_ledger::services::reporting::ReportingService;
use stock_ledger::store::{BatchStore, BatchTxn, MemoryStore};
use stock_ledger::{LedgerConfig, LedgerError};
use uuid::Uuid;

fn scope() -> OwnerScope {
    OwnerScope::new(Uuid::from_u128(10), OwnerKind::Material, Uuid::from_u128(11))
}

fn user() -> Uuid {
    Uuid::from_u128(42)
}

fn service(store: &MemoryStore) -> AdjustmentService<MemoryStore> {
    AdjustmentService::new(store.clone(), LedgerConfig::default())
}

fn restock_input(quantity: i64, cost: i64) -> RestockInput {
    RestockInput {
        quantity,
        cost_price: Decimal::from(cost),
        provenance: Provenance::default(),
        notes: None,
    }
}

async fn seed(store: &MemoryStore, scope: OwnerScope, id: u128, qty: i64, cost: i64) {
    let mut batch = StockBatch::new(scope, qty, Decimal::from(cost), Provenance::default(), None);
    batch.id = Uuid::from_u128(id);
    batch.created_at = DateTime::from_timestamp(id as i64, 0).unwrap();

    let mut txn = store.begin().await.unwrap();
    txn.insert_batch(batch).await.unwrap();
    txn.commit().await.unwrap();
}

async fn get(store: &MemoryStore, scope: OwnerScope, id: u128) -> StockBatch {
    let mut txn = store.begin().await.unwrap();
    txn.get_batch(scope.tenant_id, Uuid::from_u128(id))
        .await
        .unwrap()
        .unwrap()
}

// ============================================================================
// Restock
// ============================================================================

#[tokio::test]
async fn restock_creates_active_batch_and_audit_record() {
    let store = MemoryStore::new();
    let s = scope();
    let supplier = Uuid::from_u128(77);

    let batch = service(&store)
        .restock(
            s,
            user(),
            RestockInput {
                quantity: 50,
                cost_price: Decimal::from(12),
                provenance: Provenance {
                    supplier_id: Some(supplier),
                    is_own_purchase: false,
                    is_credit: true,
                },
                notes: Some("spring delivery".to_string()),
            },
        )
        .await
        .unwrap();

    assert_eq!(batch.quantity, 50);
    assert_eq!(batch.remaining_quantity, 50);
    assert_eq!(batch.status, BatchStatus::Active);
    assert_eq!(batch.supplier_id, Some(supplier));
    assert!(batch.is_credit);

    let stored = get(&store, s, batch.id.as_u128()).await;
    assert_eq!(stored, batch);

    let changes = ReportingService::new(store.clone())
        .list_changes(s)
        .await
        .unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].reason, ChangeReason::Restock);
    assert_eq!(changes[0].change, 50);
    assert_eq!(changes[0].cost_price, Decimal::from(12));
    assert_eq!(changes[0].batch_id, batch.id);
    assert_eq!(changes[0].supplier_id, Some(supplier));
    assert!(changes[0].is_credit);
}

#[tokio::test]
async fn restock_rejects_bad_quantity_and_cost() {
    let store = MemoryStore::new();
    let svc = service(&store);

    for quantity in [0, -10] {
        let err = svc
            .restock(scope(), user(), restock_input(quantity, 10))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidQuantity(_)));
    }

    let err = svc
        .restock(scope(), user(), restock_input(10, -1))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidQuantity(_)));

    // Zero cost is allowed
    assert!(svc.restock(scope(), user(), restock_input(10, 0)).await.is_ok());
}

// ============================================================================
// Damage Write-off
// ============================================================================

#[tokio::test]
async fn damage_reduces_stock_and_leaves_debt_fields_alone() {
    let store = MemoryStore::new();
    let s = scope();
    let mut batch = StockBatch::new(
        s,
        10,
        Decimal::from(8),
        Provenance {
            supplier_id: Some(Uuid::from_u128(5)),
            is_own_purchase: true,
            is_credit: true,
        },
        None,
    );
    batch.id = Uuid::from_u128(1);
    let mut txn = store.begin().await.unwrap();
    txn.insert_batch(batch).await.unwrap();
    txn.commit().await.unwrap();

    service(&store)
        .write_off_damage(
            s.tenant_id,
            Uuid::from_u128(1),
            user(),
            DamageInput {
                quantity: 4,
                notes: Some("water damage".to_string()),
            },
        )
        .await
        .unwrap();

    let stored = get(&store, s, 1).await;
    assert_eq!(stored.remaining_quantity, 6);
    assert_eq!(stored.status, BatchStatus::Active);
    assert_eq!(stored.supplier_id, Some(Uuid::from_u128(5)));
    assert!(stored.is_own_purchase);
    assert!(stored.is_credit);
    assert_eq!(stored.notes.as_deref(), Some("water damage"));

    let changes = ReportingService::new(store.clone())
        .list_changes(s)
        .await
        .unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].reason, ChangeReason::Damage);
    assert_eq!(changes[0].change, -4);
}

#[tokio::test]
async fn damage_to_zero_marks_batch_depleted() {
    let store = MemoryStore::new();
    let s = scope();
    seed(&store, s, 1, 10, 8).await;

    service(&store)
        .write_off_damage(
            s.tenant_id,
            Uuid::from_u128(1),
            user(),
            DamageInput {
                quantity: 10,
                notes: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(get(&store, s, 1).await.status, BatchStatus::Depleted);
}

#[tokio::test]
async fn damage_cannot_exceed_remaining_quantity() {
    let store = MemoryStore::new();
    let s = scope();
    seed(&store, s, 1, 10, 8).await;

    for quantity in [11, 0, -2] {
        let err = service(&store)
            .write_off_damage(
                s.tenant_id,
                Uuid::from_u128(1),
                user(),
                DamageInput {
                    quantity,
                    notes: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidQuantity(_)));
    }

    assert_eq!(get(&store, s, 1).await.remaining_quantity, 10);
}

#[tokio::test]
async fn damage_on_missing_batch_is_not_found() {
    let store = MemoryStore::new();
    let err = service(&store)
        .write_off_damage(
            Uuid::from_u128(10),
            Uuid::from_u128(404),
            user(),
            DamageInput {
                quantity: 1,
                notes: None,
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, LedgerError::NotFound(_)));
}

// ============================================================================
// Manual Quantity Correction
// ============================================================================

#[tokio::test]
async fn correction_rewrites_remaining_and_marks_corrected() {
    let store = MemoryStore::new();
    let s = scope();
    seed(&store, s, 1, 10, 8).await;

    service(&store)
        .correct_quantity(
            s.tenant_id,
            Uuid::from_u128(1),
            user(),
            CorrectQuantityInput {
                new_remaining_quantity: 4,
                redefine_quantity: false,
                notes: Some("cycle count".to_string()),
            },
        )
        .await
        .unwrap();

    let stored = get(&store, s, 1).await;
    assert_eq!(stored.remaining_quantity, 4);
    assert_eq!(stored.quantity, 10);
    assert_eq!(stored.status, BatchStatus::Corrected);

    let changes = ReportingService::new(store.clone())
        .list_changes(s)
        .await
        .unwrap();
    assert_eq!(changes[0].reason, ChangeReason::ManualCorrection);
    assert_eq!(changes[0].change, -6);
}

#[tokio::test]
async fn correction_to_zero_is_allowed_and_deletable_state() {
    let store = MemoryStore::new();
    let s = scope();
    seed(&store, s, 1, 10, 8).await;

    service(&store)
        .correct_quantity(
            s.tenant_id,
            Uuid::from_u128(1),
            user(),
            CorrectQuantityInput {
                new_remaining_quantity: 0,
                redefine_quantity: false,
                notes: None,
            },
        )
        .await
        .unwrap();

    let stored = get(&store, s, 1).await;
    assert_eq!(stored.remaining_quantity, 0);
    // Corrected wins over Depleted for a human-made zero
    assert_eq!(stored.status, BatchStatus::Corrected);
}

#[tokio::test]
async fn raising_the_ceiling_requires_the_redefine_flag() {
    let store = MemoryStore::new();
    let s = scope();
    seed(&store, s, 1, 10, 8).await;

    let err = service(&store)
        .correct_quantity(
            s.tenant_id,
            Uuid::from_u128(1),
            user(),
            CorrectQuantityInput {
                new_remaining_quantity: 15,
                redefine_quantity: false,
                notes: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidCorrection(_)));

    service(&store)
        .correct_quantity(
            s.tenant_id,
            Uuid::from_u128(1),
            user(),
            CorrectQuantityInput {
                new_remaining_quantity: 15,
                redefine_quantity: true,
                notes: None,
            },
        )
        .await
        .unwrap();

    let stored = get(&store, s, 1).await;
    assert_eq!(stored.remaining_quantity, 15);
    assert_eq!(stored.quantity, 15);
    assert_eq!(stored.status, BatchStatus::Corrected);
}

#[tokio::test]
async fn negative_correction_target_is_rejected() {
    let store = MemoryStore::new();
    let s = scope();
    seed(&store, s, 1, 10, 8).await;

    let err = service(&store)
        .correct_quantity(
            s.tenant_id,
            Uuid::from_u128(1),
            user(),
            CorrectQuantityInput {
                new_remaining_quantity: -1,
                redefine_quantity: true,
                notes: None,
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, LedgerError::InvalidCorrection(_)));
}

#[tokio::test]
async fn corrected_status_is_sticky_through_later_damage() {
    let store = MemoryStore::new();
    let s = scope();
    seed(&store, s, 1, 10, 8).await;

    let svc = service(&store);
    svc.correct_quantity(
        s.tenant_id,
        Uuid::from_u128(1),
        user(),
        CorrectQuantityInput {
            new_remaining_quantity: 3,
            redefine_quantity: false,
            notes: None,
        },
    )
    .await
    .unwrap();

    svc.write_off_damage(
        s.tenant_id,
        Uuid::from_u128(1),
        user(),
        DamageInput {
            quantity: 3,
            notes: None,
        },
    )
    .await
    .unwrap();

    let stored = get(&store, s, 1).await;
    assert_eq!(stored.remaining_quantity, 0);
    assert_eq!(stored.status, BatchStatus::Corrected);
}

// ============================================================================
// Cost-Price Correction
// ============================================================================

#[tokio::test]
async fn cost_correction_rewrites_price_and_audits_with_zero_delta() {
    let store = MemoryStore::new();
    let s = scope();
    seed(&store, s, 1, 10, 8).await;

    service(&store)
        .correct_cost_price(s.tenant_id, Uuid::from_u128(1), user(), Decimal::from(11))
        .await
        .unwrap();

    let stored = get(&store, s, 1).await;
    assert_eq!(stored.cost_price, Decimal::from(11));
    assert_eq!(stored.remaining_quantity, 10);
    assert_eq!(stored.status, BatchStatus::Active);

    let changes = ReportingService::new(store.clone())
        .list_changes(s)
        .await
        .unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].reason, ChangeReason::CostCorrection);
    assert_eq!(changes[0].change, 0);
    assert_eq!(changes[0].cost_price, Decimal::from(11));
}

#[tokio::test]
async fn negative_cost_correction_is_rejected() {
    let store = MemoryStore::new();
    let s = scope();
    seed(&store, s, 1, 10, 8).await;

    let err = service(&store)
        .correct_cost_price(s.tenant_id, Uuid::from_u128(1), user(), Decimal::from(-2))
        .await
        .unwrap_err();

    assert!(matches!(err, LedgerError::InvalidCorrection(_)));
    assert_eq!(get(&store, s, 1).await.cost_price, Decimal::from(8));
}
