//! # Catalog
//!
//! Read-only product lookup for hosts that feed the cart (the CLI reads a
//! JSON array of products). The storefront's real catalog lives elsewhere;
//! this is only the id -> `Product` index the cart operations need.

use std::collections::HashMap;

use crate::error::{CoreError, CoreResult};
use crate::types::Product;

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Builds a catalog, rejecting duplicate ids.
    pub fn new(products: Vec<Product>) -> CoreResult<Self> {
        let mut index = HashMap::with_capacity(products.len());
        for (pos, product) in products.iter().enumerate() {
            if index.insert(product.id.clone(), pos).is_some() {
                return Err(CoreError::DuplicateProduct(product.id.clone()));
            }
        }
        Ok(Catalog { products, index })
    }

    /// Parses a JSON array of products.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        let products: Vec<Product> = serde_json::from_str(json)?;
        Self::new(products)
    }

    pub fn get(&self, id: &str) -> CoreResult<&Product> {
        self.index
            .get(id)
            .map(|&pos| &self.products[pos])
            .ok_or_else(|| CoreError::ProductNotFound(id.to_string()))
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
