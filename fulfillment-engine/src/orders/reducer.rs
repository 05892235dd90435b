//! Pure helpers that turn inputs into snapshot fragments and keep
//! order totals consistent with their lines.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::money::{round_money, validate_line};
use crate::orders::traits::OrderError;
use shared::order::{ItemRef, LineInput, LineSnapshot, LineStatus, OrderSnapshot};

/// Build a `LineSnapshot` from client input.
///
/// Exactly one of `product_id` / `menu_item_id` must be set. Amounts
/// are rounded here so downstream arithmetic never sees raw input.
pub fn line_from_input(input: &LineInput) -> Result<LineSnapshot, OrderError> {
    validate_line(input)?;

    let item = match (&input.product_id, &input.menu_item_id) {
        (Some(product_id), None) => ItemRef::Product(product_id.clone()),
        (None, Some(menu_item_id)) => ItemRef::MenuItem(menu_item_id.clone()),
        (Some(_), Some(_)) => {
            return Err(OrderError::Validation(
                "line references both a product and a menu item".to_string(),
            ));
        }
        (None, None) => {
            return Err(OrderError::Validation(
                "line references neither a product nor a menu item".to_string(),
            ));
        }
    };

    let subtotal = round_money(input.unit_price * input.quantity);
    let tax = round_money(input.tax);
    let discount = round_money(input.discount);
    let total = round_money(subtotal + tax - discount);

    Ok(LineSnapshot {
        line_id: Uuid::new_v4().to_string(),
        item,
        name: input.name.clone(),
        quantity: input.quantity,
        unit_price: round_money(input.unit_price),
        subtotal,
        tax,
        discount,
        total,
        status: LineStatus::Pending,
        inventory_consumed: false,
        consumed: Vec::new(),
        note: input.note.clone(),
    })
}

/// Recompute order totals from non-cancelled lines.
///
/// Cancelled lines stay in the snapshot for audit but no longer count
/// toward what the customer owes.
pub fn recalculate_totals(snapshot: &mut OrderSnapshot) {
    let mut subtotal = Decimal::ZERO;
    let mut tax = Decimal::ZERO;
    let mut discount = Decimal::ZERO;

    for line in &snapshot.lines {
        if line.status == LineStatus::Cancelled {
            continue;
        }
        subtotal += line.subtotal;
        tax += line.tax;
        discount += line.discount;
    }

    snapshot.subtotal = round_money(subtotal);
    snapshot.tax = round_money(tax);
    snapshot.discount = round_money(discount);
    snapshot.total = round_money(subtotal + tax - discount);
}
