//! End-to-end manager tests: commands in, responses and committed
//! state out.

mod test_refunds;

use rust_decimal::Decimal;
use std::sync::Arc;

use crate::catalog::CatalogService;
use crate::orders::manager::OrdersManager;
use crate::orders::storage::OrderStorage;
use shared::models::{Branch, MenuItem, Product, Recipe, RecipeRequirement};
use shared::order::{
    LineInput, OrderCommand, OrderCommandPayload, PaymentInput, PaymentMethod,
};
use shared::util::now_millis;

/// Branch MAD01 with flour and a pizza that takes 0.5 kg of flour per
/// serving
pub fn test_catalog() -> Arc<CatalogService> {
    let catalog = CatalogService::new();
    catalog.upsert_branch(Branch {
        id: "b-1".to_string(),
        code: "MAD01".to_string(),
        name: "Madrid Centro".to_string(),
        is_active: true,
    });
    catalog.upsert_product(Product {
        id: "flour".to_string(),
        name: "Flour".to_string(),
        unit: "kg".to_string(),
        price: Decimal::new(120, 2),
        is_active: true,
    });
    catalog.upsert_menu_item(MenuItem {
        id: "pizza".to_string(),
        name: "Margherita".to_string(),
        price: Decimal::new(1250, 2),
        recipe: Some(Recipe {
            id: "r-1".to_string(),
            name: "Margherita".to_string(),
            requirements: vec![RecipeRequirement {
                product_id: "flour".to_string(),
                quantity: Decimal::new(500, 3),
                unit: "kg".to_string(),
            }],
            note: None,
        }),
        is_active: true,
    });
    Arc::new(catalog)
}

pub fn test_manager() -> OrdersManager {
    let storage = OrderStorage::open_in_memory().unwrap();
    OrdersManager::with_storage(storage, test_catalog())
}

pub fn command(payload: OrderCommandPayload) -> OrderCommand {
    OrderCommand {
        command_id: uuid::Uuid::new_v4().to_string(),
        operator_id: "op-1".to_string(),
        operator_name: "Operator One".to_string(),
        timestamp: now_millis(),
        payload,
    }
}

pub fn pizza_line(quantity: i64) -> LineInput {
    LineInput {
        product_id: None,
        menu_item_id: Some("pizza".to_string()),
        name: "Margherita".to_string(),
        quantity: Decimal::new(quantity, 0),
        unit_price: Decimal::new(1250, 2),
        tax: Decimal::ZERO,
        discount: Decimal::ZERO,
        note: None,
    }
}

pub fn cash(amount_cents: i64) -> PaymentInput {
    PaymentInput {
        method: PaymentMethod::Cash,
        amount: Decimal::new(amount_cents, 2),
        reference: None,
        note: None,
    }
}

/// Create an order with the given lines and return its order_id
pub fn create_order(manager: &OrdersManager, lines: Vec<LineInput>) -> String {
    let response = manager.execute_command(command(OrderCommandPayload::CreateOrder {
        branch_id: "b-1".to_string(),
        lines,
        note: None,
    }));
    assert!(response.success, "create failed: {:?}", response.error);
    response.order_id.unwrap()
}
