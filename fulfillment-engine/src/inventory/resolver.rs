//! Recipe resolution: expand an order line into ingredient requirements.

use rust_decimal::Decimal;

use crate::catalog::CatalogService;
use crate::money::round_quantity;
use shared::models::IngredientRequirement;
use shared::order::{ItemRef, LineSnapshot};

/// Resolve the ingredient requirements of a single line.
///
/// A product line consumes itself one-to-one. A menu item line expands
/// its recipe, scaling each requirement by the line quantity. Lines
/// with no resolvable recipe yield nothing; that is a catalog gap, not
/// an order failure, so it is logged and skipped.
pub fn resolve_line_requirements(
    line: &LineSnapshot,
    catalog: &CatalogService,
) -> Vec<IngredientRequirement> {
    match &line.item {
        ItemRef::Product(product_id) => {
            let unit = catalog
                .get_product(product_id)
                .map(|p| p.unit)
                .unwrap_or_default();
            vec![IngredientRequirement {
                product_id: product_id.clone(),
                quantity: round_quantity(line.quantity),
                unit,
            }]
        }
        ItemRef::MenuItem(menu_item_id) => {
            let Some(item) = catalog.get_menu_item(menu_item_id) else {
                tracing::warn!(
                    menu_item_id = %menu_item_id,
                    line_id = %line.line_id,
                    "Menu item not in catalog, skipping consumption"
                );
                return Vec::new();
            };
            let Some(recipe) = item.recipe else {
                tracing::warn!(
                    menu_item_id = %menu_item_id,
                    name = %item.name,
                    "Menu item has no recipe, skipping consumption"
                );
                return Vec::new();
            };

            recipe
                .requirements
                .iter()
                .filter(|req| req.quantity > Decimal::ZERO)
                .map(|req| IngredientRequirement {
                    product_id: req.product_id.clone(),
                    quantity: round_quantity(req.quantity * line.quantity),
                    unit: req.unit.clone(),
                })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{MenuItem, Product, Recipe, RecipeRequirement};
    use shared::order::LineStatus;

    fn line(item: ItemRef, quantity: Decimal) -> LineSnapshot {
        LineSnapshot {
            line_id: "line-1".to_string(),
            item,
            name: "Test".to_string(),
            quantity,
            unit_price: Decimal::ONE,
            subtotal: quantity,
            tax: Decimal::ZERO,
            discount: Decimal::ZERO,
            total: quantity,
            status: LineStatus::Pending,
            inventory_consumed: false,
            consumed: Vec::new(),
            note: None,
        }
    }

    fn catalog_with_pizza() -> CatalogService {
        let catalog = CatalogService::new();
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
                id: "r-pizza".to_string(),
                name: "Margherita".to_string(),
                requirements: vec![
                    RecipeRequirement {
                        product_id: "flour".to_string(),
                        quantity: Decimal::new(500, 3),
                        unit: "kg".to_string(),
                    },
                    RecipeRequirement {
                        product_id: "cheese".to_string(),
                        quantity: Decimal::new(150, 3),
                        unit: "kg".to_string(),
                    },
                ],
                note: None,
            }),
            is_active: true,
        });
        catalog
    }

    #[test]
    fn test_product_line_consumes_itself() {
        let catalog = catalog_with_pizza();
        let reqs = resolve_line_requirements(
            &line(ItemRef::Product("flour".to_string()), Decimal::new(2500, 3)),
            &catalog,
        );
        assert_eq!(reqs.len(), 1);
        assert_eq!(reqs[0].product_id, "flour");
        assert_eq!(reqs[0].quantity, Decimal::new(2500, 3));
        assert_eq!(reqs[0].unit, "kg");
    }

    #[test]
    fn test_menu_item_scales_recipe_by_quantity() {
        let catalog = catalog_with_pizza();
        let reqs = resolve_line_requirements(
            &line(ItemRef::MenuItem("pizza".to_string()), Decimal::new(2, 0)),
            &catalog,
        );
        assert_eq!(reqs.len(), 2);
        // 0.5 kg/serving * 2 servings
        assert_eq!(reqs[0].quantity, Decimal::new(1000, 3));
        assert_eq!(reqs[1].quantity, Decimal::new(300, 3));
    }

    #[test]
    fn test_unknown_menu_item_yields_nothing() {
        let catalog = catalog_with_pizza();
        let reqs = resolve_line_requirements(
            &line(ItemRef::MenuItem("ghost".to_string()), Decimal::ONE),
            &catalog,
        );
        assert!(reqs.is_empty());
    }

    #[test]
    fn test_menu_item_without_recipe_yields_nothing() {
        let catalog = catalog_with_pizza();
        catalog.upsert_menu_item(MenuItem {
            id: "soda".to_string(),
            name: "Soda".to_string(),
            price: Decimal::new(200, 2),
            recipe: None,
            is_active: true,
        });
        let reqs = resolve_line_requirements(
            &line(ItemRef::MenuItem("soda".to_string()), Decimal::ONE),
            &catalog,
        );
        assert!(reqs.is_empty());
    }
}
