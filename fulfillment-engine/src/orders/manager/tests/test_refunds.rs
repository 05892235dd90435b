//! Refund flows: proportional returns, terminal statuses, guards.

use super::*;
use shared::models::TransactionKind;
use shared::order::{CommandErrorCode, OrderStatus, PaymentStatus};

/// Paid two-pizza order (25.00 total, 1.0 kg of flour consumed)
fn paid_order(manager: &OrdersManager) -> String {
    let order_id = create_order(manager, vec![pizza_line(2)]);
    let response = manager.execute_command(command(OrderCommandPayload::RecordPayment {
        order_id: order_id.clone(),
        payment: cash(2500),
    }));
    assert!(response.success);
    order_id
}

#[test]
fn test_full_refund_returns_all_consumption() {
    let manager = test_manager();
    manager
        .receive_stock("flour", "b-1", Decimal::new(1200, 3), None, "op-1")
        .unwrap();
    let order_id = paid_order(&manager);

    let response = manager.execute_command(command(OrderCommandPayload::RefundOrder {
        order_id: order_id.clone(),
        amount: Decimal::new(2500, 2),
        note: Some("order wrong".to_string()),
    }));
    assert!(response.success);

    let snapshot = manager.get_order(&order_id).unwrap().unwrap();
    assert_eq!(snapshot.status, OrderStatus::Refunded);
    assert_eq!(snapshot.payment_status, PaymentStatus::Refunded);
    assert_eq!(snapshot.refunded_total, Decimal::new(2500, 2));

    let stock = manager.get_stock("flour", "b-1").unwrap().unwrap();
    assert_eq!(stock.current_stock, Decimal::new(1200, 3));
}

#[test]
fn test_partial_refund_scales_ledger_returns() {
    let manager = test_manager();
    manager
        .receive_stock("flour", "b-1", Decimal::new(5000, 3), None, "op-1")
        .unwrap();
    let order_id = paid_order(&manager);
    let order_number = manager.get_order(&order_id).unwrap().unwrap().order_number;

    // 40% of the order back
    manager.execute_command(command(OrderCommandPayload::RefundOrder {
        order_id: order_id.clone(),
        amount: Decimal::new(1000, 2),
        note: None,
    }));

    let snapshot = manager.get_order(&order_id).unwrap().unwrap();
    assert_eq!(snapshot.status, OrderStatus::PartialRefund);
    assert_eq!(snapshot.payment_status, PaymentStatus::PartiallyRefunded);

    let rows = manager.get_transactions_for_order(&order_number).unwrap();
    let returns: Vec<_> = rows
        .iter()
        .filter(|r| r.kind == TransactionKind::Return)
        .collect();
    assert_eq!(returns.len(), 1);
    assert_eq!(returns[0].quantity, Decimal::new(400, 3));
}

#[test]
fn test_refund_overflow_rejected() {
    let manager = test_manager();
    manager
        .receive_stock("flour", "b-1", Decimal::new(5000, 3), None, "op-1")
        .unwrap();
    let order_id = paid_order(&manager);

    let response = manager.execute_command(command(OrderCommandPayload::RefundOrder {
        order_id,
        amount: Decimal::new(9900, 2),
        note: None,
    }));
    assert!(!response.success);
    assert_eq!(
        response.error.unwrap().code,
        CommandErrorCode::PaymentOverflow
    );
}

#[test]
fn test_refund_on_draft_rejected() {
    let manager = test_manager();
    let order_id = create_order(&manager, vec![pizza_line(1)]);

    let response = manager.execute_command(command(OrderCommandPayload::RefundOrder {
        order_id,
        amount: Decimal::new(100, 2),
        note: None,
    }));
    assert!(!response.success);
    assert_eq!(
        response.error.unwrap().code,
        CommandErrorCode::InvalidOperation
    );
}

#[test]
fn test_refund_returns_nothing_when_consumption_fell_short() {
    let manager = test_manager();
    // Only 0.3 kg on hand for a 1.0 kg order, so consumption records a
    // shortfall and nothing leaves stock
    manager
        .receive_stock("flour", "b-1", Decimal::new(300, 3), None, "op-1")
        .unwrap();
    let order_id = paid_order(&manager);
    let order_number = manager.get_order(&order_id).unwrap().unwrap().order_number;

    let response = manager.execute_command(command(OrderCommandPayload::RefundOrder {
        order_id: order_id.clone(),
        amount: Decimal::new(2500, 2),
        note: None,
    }));
    assert!(response.success);

    // Nothing was consumed, so nothing comes back
    let stock = manager.get_stock("flour", "b-1").unwrap().unwrap();
    assert_eq!(stock.current_stock, Decimal::new(300, 3));
    let returns = manager
        .get_transactions_for_order(&order_number)
        .unwrap()
        .into_iter()
        .filter(|r| r.kind == TransactionKind::Return)
        .count();
    assert_eq!(returns, 0);

    let snapshot = manager.get_order(&order_id).unwrap().unwrap();
    assert_eq!(snapshot.status, OrderStatus::Refunded);
}
