//! Products
//!
//! The catalog payload the order form is populated from.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Image shown for products without any images.
pub const PLACEHOLDER_IMAGE: &str = "/static/images/placeholder540x540.png";

/// Depth marker prefixed to nested category labels in the category selector.
const CATEGORY_DEPTH_MARKER: &str = "---";

/// Errors related to the product catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog payload could not be decoded.
    #[error("Failed to parse catalog: {0}")]
    Json(#[from] serde_json::Error),

    /// The catalog could not be fetched; carries the status text shown to the user.
    #[error("{0}")]
    Fetch(String),

    /// A quantity input was not a non-negative whole number.
    #[error("Invalid quantity: {0:?}")]
    InvalidQuantity(String),
}

/// Stable identifier of a product variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantId(pub u64);

impl fmt::Display for VariantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a product category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub u64);

/// A purchasable variant of a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    /// Variant identifier
    pub id: VariantId,

    /// Stock keeping unit
    pub sku: String,

    /// Unit price as a decimal string, e.g. `"12.50"`
    pub unit_price: String,

    /// Units in stock
    #[serde(default)]
    pub in_stock: i64,
}

impl Variant {
    /// Whether the variant has any stock to sell.
    pub fn is_available(&self) -> bool {
        self.in_stock > 0
    }
}

/// Attribute value as sent by the catalog: either a plain string or a named choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// A choice from a fixed set, e.g. `{"name": "Red"}`
    Choice {
        /// Display name of the choice
        name: String,
    },

    /// A free-form value
    Text(String),
}

impl AttributeValue {
    /// Text shown for this value.
    pub fn display(&self) -> &str {
        match self {
            AttributeValue::Choice { name } => name,
            AttributeValue::Text(text) => text,
        }
    }
}

/// Product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product identifier
    pub id: u64,

    /// Product name
    pub name: String,

    /// Category the product belongs to
    #[serde(default)]
    pub category: Option<CategoryId>,

    /// Storefront URL
    #[serde(default)]
    pub url: Option<String>,

    /// Image URLs, first one is the cover
    #[serde(default, rename = "product_images")]
    pub images: Vec<String>,

    /// Attribute name to value
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeValue>,

    /// Variants
    #[serde(default)]
    pub variants: Vec<Variant>,
}

impl Product {
    /// The cover image, or the placeholder if the product has none.
    pub fn first_image(&self) -> &str {
        self.images.first().map_or(PLACEHOLDER_IMAGE, String::as_str)
    }

    /// Variants that can currently be ordered.
    pub fn available_variants(&self) -> impl Iterator<Item = &Variant> {
        self.variants.iter().filter(|variant| variant.is_available())
    }
}

/// Catalog of products offered in the order form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Create a catalog from a list of products.
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// Decode a catalog from its JSON payload.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Json`] if the payload is not a valid catalog.
    pub fn from_json(payload: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(payload)?)
    }

    /// Decode the catalog from the response to a catalog request.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::Fetch`]: the status is not 2xx; carries `status_text`.
    /// - [`CatalogError::Json`]: the body is not a valid catalog.
    pub fn from_response(status: u16, status_text: &str, body: &str) -> Result<Self, CatalogError> {
        if !(200..300).contains(&status) {
            warn!(status, status_text, "catalog request failed");

            return Err(CatalogError::Fetch(status_text.to_owned()));
        }

        let catalog = Self::from_json(body)?;

        debug!(status, products = catalog.len(), "fetched catalog");

        Ok(catalog)
    }

    /// All products.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Products in the selected category; `None` selects every product.
    pub fn in_category(&self, category: Option<CategoryId>) -> impl Iterator<Item = &Product> {
        self.products
            .iter()
            .filter(move |product| category.is_none() || product.category == category)
    }

    /// Find a variant by id, along with its product.
    pub fn variant(&self, id: VariantId) -> Option<(&Product, &Variant)> {
        self.products.iter().find_map(|product| {
            product
                .variants
                .iter()
                .find(|variant| variant.id == id)
                .map(|variant| (product, variant))
        })
    }

    /// Number of products.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Check if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

/// Strip the leading depth markers from a category selector label.
pub fn clean_category_label(label: &str) -> &str {
    let mut label = label;

    while let Some(rest) = label.strip_prefix(CATEGORY_DEPTH_MARKER) {
        label = rest;
    }

    label
}

/// Parse a quantity input. Blank input counts as zero.
///
/// # Errors
///
/// Returns [`CatalogError::InvalidQuantity`] if the input is not a non-negative whole number.
pub fn parse_quantity(input: &str) -> Result<u32, CatalogError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Ok(0);
    }

    if !trimmed.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(CatalogError::InvalidQuantity(trimmed.to_owned()));
    }

    trimmed
        .parse()
        .ok()
        .ok_or_else(|| CatalogError::InvalidQuantity(trimmed.to_owned()))
}
