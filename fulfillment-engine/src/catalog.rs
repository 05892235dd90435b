//! In-memory catalog registry.
//!
//! Read-only reference data for the engine: branches, products, menu
//! items and their recipes. The owning application loads and refreshes
//! the caches; actions only resolve against them.

use parking_lot::RwLock;
use std::collections::HashMap;

use shared::models::{Branch, MenuItem, Product};

/// Catalog lookup service, shared via `Arc`
#[derive(Default)]
pub struct CatalogService {
    branches: RwLock<HashMap<String, Branch>>,
    products: RwLock<HashMap<String, Product>>,
    menu_items: RwLock<HashMap<String, MenuItem>>,
}

impl CatalogService {
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Branches ==========

    /// Replace the branch cache
    pub fn load_branches(&self, branches: Vec<Branch>) {
        let mut cache = self.branches.write();
        cache.clear();
        for branch in branches {
            cache.insert(branch.id.clone(), branch);
        }
        tracing::debug!(count = cache.len(), "Branch cache loaded");
    }

    pub fn upsert_branch(&self, branch: Branch) {
        self.branches.write().insert(branch.id.clone(), branch);
    }

    pub fn get_branch(&self, branch_id: &str) -> Option<Branch> {
        self.branches.read().get(branch_id).cloned()
    }

    /// Short code used as the order number prefix
    pub fn branch_code(&self, branch_id: &str) -> Option<String> {
        self.branches.read().get(branch_id).map(|b| b.code.clone())
    }

    // ========== Products ==========

    /// Replace the product cache
    pub fn load_products(&self, products: Vec<Product>) {
        let mut cache = self.products.write();
        cache.clear();
        for product in products {
            cache.insert(product.id.clone(), product);
        }
        tracing::debug!(count = cache.len(), "Product cache loaded");
    }

    pub fn upsert_product(&self, product: Product) {
        self.products.write().insert(product.id.clone(), product);
    }

    pub fn get_product(&self, product_id: &str) -> Option<Product> {
        self.products.read().get(product_id).cloned()
    }

    // ========== Menu Items ==========

    /// Replace the menu item cache
    pub fn load_menu_items(&self, items: Vec<MenuItem>) {
        let mut cache = self.menu_items.write();
        cache.clear();
        for item in items {
            cache.insert(item.id.clone(), item);
        }
        tracing::debug!(count = cache.len(), "Menu item cache loaded");
    }

    pub fn upsert_menu_item(&self, item: MenuItem) {
        self.menu_items.write().insert(item.id.clone(), item);
    }

    pub fn get_menu_item(&self, item_id: &str) -> Option<MenuItem> {
        self.menu_items.read().get(item_id).cloned()
    }
}
