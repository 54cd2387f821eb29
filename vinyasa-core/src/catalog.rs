//! Static product and gated-content catalogs.
//!
//! Both catalogs are leaf dependencies: fixed data assembled at startup and
//! handed to the checkout service and the HTTP layer. Class video URLs can
//! be overridden per class with `CLASS_<id>_PREVIEW_URL` /
//! `CLASS_<id>_FULL_URL` environment variables.

use serde::Serialize;

use crate::money::format_cents;

/// How many seconds of the full video the demo paywall releases.
const FULL_VIDEO_END_SECONDS: u32 = 20;

/// A sellable physical product.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    /// Catalog identifier (e.g., "mat").
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Unit price in cents.
    pub price_cents: i64,
    /// Human-readable price string.
    pub price_display: String,
    /// Image URL for display surfaces.
    pub product_display_url: &'static str,
}

/// Lookup of sellable products by id.
#[derive(Debug, Clone)]
pub struct ProductCatalog {
    products: Vec<Product>,
}

impl ProductCatalog {
    /// Creates the demo catalog: a yoga mat and a yoga strap.
    #[must_use]
    pub fn demo() -> Self {
        let products = vec![
            Product {
                id: "mat",
                name: "Yoga Mat",
                price_cents: 2999,
                price_display: format_cents(2999),
                product_display_url:
                    "https://images.bauerhosting.com/affiliates/sites/8/2024/02/offer-2024-02-28T145108.389.jpg?auto=format&w=1440&q=80",
            },
            Product {
                id: "strap",
                name: "Yoga Strap",
                price_cents: 1299,
                price_display: format_cents(1299),
                product_display_url:
                    "https://www.ob-fit.com/wp-content/uploads/2022/03/Yoga-Strap.jpg",
            },
        ];
        Self { products }
    }

    /// Looks up a product by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Returns all products.
    #[must_use]
    pub fn all(&self) -> &[Product] {
        &self.products
    }
}

/// A gated yoga class.
#[derive(Debug, Clone, Serialize)]
pub struct YogaClass {
    /// Catalog identifier ("1" through "4").
    pub id: &'static str,
    /// Class title.
    pub title: &'static str,
    /// Human-readable price string (e.g., "$1.00").
    pub price: &'static str,
    /// Price in whole USDC.
    pub price_usdc: u64,
    /// Freely viewable preview URL.
    pub preview_url: String,
    /// Paywalled full-content URL.
    pub full_url: String,
}

/// Lookup of gated yoga classes by id.
#[derive(Debug, Clone)]
pub struct ContentCatalog {
    classes: Vec<YogaClass>,
}

/// `(id, title, price, price_usdc, default video)` seed rows for the demo.
const CLASS_SEED: [(&str, &str, &str, u64, &str); 4] = [
    (
        "1",
        "Morning Flow",
        "$1.00",
        1,
        "https://www.youtube.com/watch?v=OMu6OKF5Z1k",
    ),
    (
        "2",
        "Power Yoga",
        "$2.00",
        2,
        "https://www.youtube.com/watch?v=ZbtVVYBLCug",
    ),
    (
        "3",
        "Flexibility",
        "$3.00",
        3,
        "https://www.youtube.com/watch?v=AF9d2Icl4fA",
    ),
    (
        "4",
        "Flexibility",
        "$3.00",
        3,
        "https://www.youtube.com/watch?v=j8bEWn2E9uo",
    ),
];

impl ContentCatalog {
    /// Creates the demo catalog, honoring per-class URL overrides from the
    /// environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::with_overrides(|key| std::env::var(key).ok())
    }

    /// Creates the demo catalog with an explicit override lookup.
    ///
    /// Separated from [`Self::from_env`] so tests can inject overrides
    /// without touching process-global environment state.
    #[must_use]
    pub fn with_overrides(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let classes = CLASS_SEED
            .iter()
            .map(|&(id, title, price, price_usdc, video)| {
                let preview = lookup(&format!("CLASS_{id}_PREVIEW_URL"))
                    .unwrap_or_else(|| video.to_owned());
                let full =
                    lookup(&format!("CLASS_{id}_FULL_URL")).unwrap_or_else(|| video.to_owned());
                YogaClass {
                    id,
                    title,
                    price,
                    price_usdc,
                    preview_url: preview,
                    full_url: with_end_cap(&full, FULL_VIDEO_END_SECONDS),
                }
            })
            .collect();
        Self { classes }
    }

    /// Looks up a class by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&YogaClass> {
        self.classes.iter().find(|c| c.id == id)
    }

    /// Returns all classes.
    #[must_use]
    pub fn all(&self) -> &[YogaClass] {
        &self.classes
    }
}

/// Rewrites a YouTube watch URL into an embed URL that stops after
/// `end_seconds`. Non-YouTube URLs pass through unchanged; the player is
/// expected to enforce the limit there.
fn with_end_cap(url: &str, end_seconds: u32) -> String {
    if url.contains("youtube.com/watch") {
        if let Some(video_id) = url
            .split_once("v=")
            .map(|(_, rest)| rest.split('&').next().unwrap_or(rest))
        {
            return format!(
                "https://www.youtube.com/embed/{video_id}?end={end_seconds}&autoplay=1"
            );
        }
    }
    if url.contains("youtube.com/embed") {
        let separator = if url.contains('?') { '&' } else { '?' };
        return format!("{url}{separator}end={end_seconds}&autoplay=1");
    }
    url.to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_lookup() {
        let catalog = ProductCatalog::demo();
        let mat = catalog.get("mat").unwrap();
        assert_eq!(mat.price_cents, 2999);
        assert_eq!(mat.price_display, "$29.99");
        assert!(catalog.get("blocks").is_none());
    }

    #[test]
    fn test_content_lookup_defaults() {
        let catalog = ContentCatalog::with_overrides(|_| None);
        let class = catalog.get("1").unwrap();
        assert_eq!(class.title, "Morning Flow");
        assert_eq!(class.price, "$1.00");
        // Preview stays a plain watch URL; full is capped at 20 seconds.
        assert!(class.preview_url.contains("watch?v="));
        assert_eq!(
            class.full_url,
            "https://www.youtube.com/embed/OMu6OKF5Z1k?end=20&autoplay=1"
        );
    }

    #[test]
    fn test_content_override_wins() {
        let catalog = ContentCatalog::with_overrides(|key| {
            (key == "CLASS_2_FULL_URL").then(|| "https://cdn.example.com/power.mp4".to_owned())
        });
        let class = catalog.get("2").unwrap();
        assert_eq!(class.full_url, "https://cdn.example.com/power.mp4");
    }

    #[test]
    fn test_end_cap_on_existing_embed() {
        assert_eq!(
            with_end_cap("https://www.youtube.com/embed/abc?x=1", 20),
            "https://www.youtube.com/embed/abc?x=1&end=20&autoplay=1"
        );
    }
}
