use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::product::{Product, ProductId};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetailerQuote {
    pub retailer: String,
    pub price: Decimal,
    pub shipping: String,
    pub in_stock: bool,
    pub url: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Rising,
    Stable,
    Falling,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceTrend {
    pub direction: TrendDirection,
    pub change_percent: Decimal,
    pub lowest_30_days: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceComparison {
    pub product_id: ProductId,
    pub product_name: String,
    pub brand: String,
    pub current_price: Decimal,
    pub currency: String,
    pub price_sources: Vec<RetailerQuote>,
    pub price_trend: PriceTrend,
    pub quoted_at: DateTime<Utc>,
}

pub trait PriceSource: Send + Sync {
    fn compare(&self, product: &Product) -> PriceComparison;
}

/// A retailer priced as a fixed multiple of the catalog average.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetailerListing {
    pub retailer: &'static str,
    pub multiplier: Decimal,
    pub shipping: &'static str,
    pub in_stock: bool,
}

/// Quotes every retailer from the product's average price. The trend is
/// always flat with a 30-day low 10% under the current price.
#[derive(Clone, Debug)]
pub struct ListPriceSource {
    listings: Vec<RetailerListing>,
}

impl ListPriceSource {
    pub fn new(listings: Vec<RetailerListing>) -> Self {
        Self { listings }
    }
}

impl Default for ListPriceSource {
    fn default() -> Self {
        Self::new(vec![
            RetailerListing {
                retailer: "Amazon",
                multiplier: Decimal::new(95, 2),
                shipping: "Free",
                in_stock: true,
            },
            RetailerListing {
                retailer: "Sephora",
                multiplier: Decimal::ONE,
                shipping: "Free over $50",
                in_stock: true,
            },
            RetailerListing {
                retailer: "Ulta",
                multiplier: Decimal::new(105, 2),
                shipping: "$5.95",
                in_stock: true,
            },
            RetailerListing {
                retailer: "Target",
                multiplier: Decimal::new(92, 2),
                shipping: "Free with RedCard",
                in_stock: false,
            },
        ])
    }
}

impl PriceSource for ListPriceSource {
    fn compare(&self, product: &Product) -> PriceComparison {
        let base = product.average_price;
        let price_sources = self
            .listings
            .iter()
            .map(|listing| RetailerQuote {
                retailer: listing.retailer.to_owned(),
                price: (base * listing.multiplier).round_dp(2),
                shipping: listing.shipping.to_owned(),
                in_stock: listing.in_stock,
                url: "#".to_owned(),
            })
            .collect();

        PriceComparison {
            product_id: product.product_id.clone(),
            product_name: product.name.clone(),
            brand: product.brand.clone(),
            current_price: base,
            currency: product.currency.clone(),
            price_sources,
            price_trend: PriceTrend {
                direction: TrendDirection::Stable,
                change_percent: Decimal::ZERO,
                lowest_30_days: (base * Decimal::new(90, 2)).round_dp(2),
            },
            quoted_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommender::catalog::ProductCatalog;

    #[test]
    fn list_source_applies_retailer_multipliers() {
        let catalog = ProductCatalog::builtin().expect("catalog");
        let product = catalog.find(&ProductId("1".to_owned())).expect("product 1");

        let comparison = ListPriceSource::default().compare(product);
        assert_eq!(comparison.current_price, Decimal::new(1499, 2));
        assert_eq!(comparison.currency, "USD");

        let prices: Vec<(&str, Decimal, bool)> = comparison
            .price_sources
            .iter()
            .map(|quote| (quote.retailer.as_str(), quote.price, quote.in_stock))
            .collect();
        assert_eq!(
            prices,
            vec![
                ("Amazon", Decimal::new(1424, 2), true),
                ("Sephora", Decimal::new(1499, 2), true),
                ("Ulta", Decimal::new(1574, 2), true),
                ("Target", Decimal::new(1379, 2), false),
            ]
        );
        assert_eq!(comparison.price_trend.direction, TrendDirection::Stable);
        assert_eq!(comparison.price_trend.lowest_30_days, Decimal::new(1349, 2));
    }
}
