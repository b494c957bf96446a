use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use rust_decimal::Decimal;
use tracing::info;

use crate::domain::ingredient::IngredientToken;
use crate::domain::product::{Availability, Product, ProductId};
use crate::errors::{ApplicationError, DomainError};
use crate::knowledge::{parse_error, read_table, TableSource};

/// Built-in catalog entry.
#[derive(Debug, Clone, Copy)]
struct ProductSeed {
    id: &'static str,
    brand: &'static str,
    name: &'static str,
    category: &'static str,
    skin_type: &'static [&'static str],
    concerns: &'static [&'static str],
    ingredients: &'static [&'static str],
    health_score: f64,
    price_range: &'static str,
    average_price_cents: i64,
    url: &'static str,
    rating: f64,
    review_count: u32,
    availability: Availability,
}

const PRODUCT_SEEDS: &[ProductSeed] = &[
    ProductSeed {
        id: "1",
        brand: "CeraVe",
        name: "Hydrating Facial Cleanser",
        category: "cleanser",
        skin_type: &["normal", "dry", "combination"],
        concerns: &["hydration", "sensitive"],
        ingredients: &["aqua", "glycerin", "niacinamide", "hyaluronic acid"],
        health_score: 85.0,
        price_range: "$10-$20",
        average_price_cents: 1499,
        url: "https://www.cerave.com",
        rating: 4.5,
        review_count: 15_420,
        availability: Availability::InStock,
    },
    ProductSeed {
        id: "2",
        brand: "The Ordinary",
        name: "Niacinamide 10% + Zinc 1%",
        category: "serum",
        skin_type: &["oily", "combination", "acne-prone"],
        concerns: &["acne", "texture", "pores"],
        ingredients: &["aqua", "niacinamide", "zinc", "hyaluronic acid"],
        health_score: 90.0,
        price_range: "$5-$10",
        average_price_cents: 599,
        url: "https://theordinary.com",
        rating: 4.3,
        review_count: 28_930,
        availability: Availability::InStock,
    },
    ProductSeed {
        id: "3",
        brand: "La Roche-Posay",
        name: "Toleriane Double Repair Face Moisturizer",
        category: "moisturizer",
        skin_type: &["sensitive", "dry", "normal"],
        concerns: &["sensitive", "hydration", "barrier"],
        ingredients: &["aqua", "glycerin", "niacinamide", "ceramide"],
        health_score: 88.0,
        price_range: "$15-$25",
        average_price_cents: 1999,
        url: "https://www.laroche-posay.us",
        rating: 4.6,
        review_count: 12_450,
        availability: Availability::InStock,
    },
    ProductSeed {
        id: "4",
        brand: "Lumen Basics",
        name: "Daily Foaming Cleanser",
        category: "cleanser",
        skin_type: &["normal", "oily"],
        concerns: &["oil-control"],
        ingredients: &["aqua", "sodium lauryl sulfate", "glycerin", "methylparaben", "parfum"],
        health_score: 38.0,
        price_range: "$5-$10",
        average_price_cents: 749,
        url: "",
        rating: 3.9,
        review_count: 2_140,
        availability: Availability::InStock,
    },
    ProductSeed {
        id: "5",
        brand: "Verdant Skin",
        name: "Soft Glow Moisturizer",
        category: "moisturizer",
        skin_type: &["dry", "normal"],
        concerns: &["hydration", "dullness"],
        ingredients: &["aqua", "glycerin", "cetearyl alcohol", "phenoxyethanol", "parfum"],
        health_score: 55.0,
        price_range: "$10-$15",
        average_price_cents: 1250,
        url: "",
        rating: 4.1,
        review_count: 5_320,
        availability: Availability::LowStock,
    },
    ProductSeed {
        id: "6",
        brand: "Clearwell",
        name: "Gentle Gel Cleanser",
        category: "cleanser",
        skin_type: &["sensitive", "oily", "combination"],
        concerns: &["sensitive", "redness"],
        ingredients: &["aqua", "decyl glucoside", "glycerin", "panthenol", "sodium benzoate"],
        health_score: 84.0,
        price_range: "$10-$20",
        average_price_cents: 1600,
        url: "",
        rating: 4.4,
        review_count: 3_875,
        availability: Availability::InStock,
    },
];

fn seed_to_product(seed: &ProductSeed) -> Product {
    let set = |values: &[&str]| values.iter().map(|value| (*value).to_owned()).collect::<BTreeSet<_>>();

    Product {
        product_id: ProductId(seed.id.to_owned()),
        brand: seed.brand.to_owned(),
        name: seed.name.to_owned(),
        category: seed.category.to_owned(),
        skin_type: set(seed.skin_type),
        concerns: set(seed.concerns),
        ingredients: seed.ingredients.iter().map(|name| IngredientToken::new(name)).collect(),
        health_score: seed.health_score,
        price_range: seed.price_range.to_owned(),
        average_price: Decimal::new(seed.average_price_cents, 2),
        currency: "USD".to_owned(),
        url: seed.url.to_owned(),
        image_url: String::new(),
        rating: seed.rating,
        review_count: seed.review_count,
        availability: seed.availability,
    }
}

/// Fixed, read-only product catalog.
#[derive(Clone, Debug)]
pub struct ProductCatalog {
    products: Vec<Product>,
    index: HashMap<ProductId, usize>,
    source: TableSource,
}

impl ProductCatalog {
    /// Rejects catalogs that repeat a product id.
    pub fn new(products: Vec<Product>, source: TableSource) -> Result<Self, ApplicationError> {
        let mut index = HashMap::with_capacity(products.len());
        for (position, product) in products.iter().enumerate() {
            if index.insert(product.product_id.clone(), position).is_some() {
                return Err(ApplicationError::Configuration(format!(
                    "product id `{}` appears more than once in the catalog",
                    product.product_id.as_str()
                )));
            }
        }
        Ok(Self { products, index, source })
    }

    pub fn builtin() -> Result<Self, ApplicationError> {
        Self::new(PRODUCT_SEEDS.iter().map(seed_to_product).collect(), TableSource::Fallback)
    }

    /// Loads a JSON array of products from `path`, or the built-in catalog
    /// when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ApplicationError> {
        let catalog = match read_table(path)? {
            Some(contents) => {
                let products: Vec<Product> =
                    serde_json::from_str(&contents).map_err(|error| parse_error(path, error))?;
                Self::new(products, TableSource::File)?
            }
            None => Self::builtin()?,
        };

        info!(
            event_name = "catalog.loaded",
            source = catalog.source.as_str(),
            path = %path.display(),
            product_count = catalog.len(),
            "product catalog loaded"
        );
        Ok(catalog)
    }

    pub fn find(&self, product_id: &ProductId) -> Result<&Product, DomainError> {
        self.index
            .get(product_id)
            .and_then(|position| self.products.get(*position))
            .ok_or_else(|| DomainError::ProductNotFound { product_id: product_id.0.clone() })
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Ids of products whose ingredient list contains `ingredient`, in catalog order.
    pub fn products_using(&self, ingredient: &IngredientToken) -> Vec<ProductId> {
        self.products
            .iter()
            .filter(|product| product.contains(ingredient))
            .map(|product| product.product_id.clone())
            .collect()
    }

    pub fn source(&self) -> TableSource {
        self.source
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn builtin_catalog_has_unique_ids() {
        let catalog = ProductCatalog::builtin().expect("builtin catalog");
        assert_eq!(catalog.len(), 6);
        assert_eq!(catalog.source(), TableSource::Fallback);

        let product = catalog.find(&ProductId("2".to_owned())).expect("product 2");
        assert_eq!(product.brand, "The Ordinary");
        assert_eq!(product.average_price, Decimal::new(599, 2));
    }

    #[test]
    fn unknown_id_is_not_found() {
        let catalog = ProductCatalog::builtin().expect("builtin catalog");
        let error = catalog.find(&ProductId("404".to_owned())).unwrap_err();
        assert_eq!(error, DomainError::ProductNotFound { product_id: "404".to_owned() });
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let first = seed_to_product(&PRODUCT_SEEDS[0]);
        let second = seed_to_product(&PRODUCT_SEEDS[0]);

        let error = ProductCatalog::new(vec![first, second], TableSource::File).unwrap_err();
        assert!(matches!(error, ApplicationError::Configuration(message) if message.contains("`1`")));
    }

    #[test]
    fn products_using_matches_exact_ingredient() {
        let catalog = ProductCatalog::builtin().expect("builtin catalog");
        let users = catalog.products_using(&IngredientToken::new("decyl glucoside"));
        assert_eq!(users, vec![ProductId("6".to_owned())]);
    }

    #[test]
    fn loads_catalog_file_with_defaults() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("catalog.json");
        fs::write(
            &path,
            r#"[{
                "product_id": "sku-9",
                "brand": "Hearth",
                "name": "Oat Balm",
                "category": "Balm",
                "ingredients": ["Aqua", "Avena Sativa Kernel Flour"],
                "health_score": 81,
                "average_price": "9.50",
                "rating": 4.0,
                "availability": "out_of_stock"
            }]"#,
        )
        .expect("write catalog");

        let catalog = ProductCatalog::load(&path).expect("catalog loads");
        let product = catalog.find(&ProductId("sku-9".to_owned())).expect("product");
        assert_eq!(product.currency, "USD");
        assert_eq!(product.ingredients[1].as_str(), "avena sativa kernel flour");
        assert_eq!(product.average_price, Decimal::new(950, 2));
        assert!(product.skin_type.is_empty());
    }

    #[test]
    fn malformed_catalog_is_configuration_error() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("catalog.json");
        fs::write(&path, r#"{"product_id": "1"}"#).expect("write catalog");

        assert!(matches!(ProductCatalog::load(&path), Err(ApplicationError::Configuration(_))));
    }
}
