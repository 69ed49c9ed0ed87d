use axum::{extract::Path, Json};
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use serde::Serialize;

use super::AppError;

/// Number of products in the demo catalogue.
pub const NUM_PRODUCTS: u32 = 500;

// ─── Name pools ──────────────────────────────────────────────────

static ADJ: &[&str] = &[
    "Premium", "Ultra", "Wireless", "Smart", "Compact", "Ergonomic", "Portable", "Digital",
    "Classic", "Modern",
];

static NOUN: &[&str] = &[
    "Keyboard", "Mouse", "Monitor", "Headphones", "Speaker", "Camera", "Tablet", "Charger",
    "Router", "Dock",
];

static CAT: &[&str] = &["electronics", "accessories", "audio", "office", "gaming"];

// ─── Domain type ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: String,
    pub title: String,
    /// Price in cents (e.g. 12999 = $129.99)
    pub price: u64,
    pub stock: u32,
    pub category: String,
}

impl Product {
    /// Deterministic product for a catalogue slot.
    fn generate(n: u32) -> Self {
        let mut rng = StdRng::seed_from_u64(u64::from(n));
        let adj = ADJ[rng.gen_range(0..ADJ.len())];
        let noun = NOUN[rng.gen_range(0..NOUN.len())];

        Self {
            id: format!("prod_{n:04}"),
            title: format!("{adj} {noun}"),
            price: rng.gen_range(999..=99_999u64),
            stock: rng.gen_range(0..=1000u32),
            category: CAT[rng.gen_range(0..CAT.len())].into(),
        }
    }
}

// ─── GET /api/products/:id ───────────────────────────────────────

pub async fn get_product(Path(id): Path<String>) -> Result<Json<Product>, AppError> {
    let n: u32 = id
        .trim_start_matches("prod_")
        .parse()
        .map_err(|_| AppError::BadRequest(format!("invalid product id '{id}'")))?;

    if n == 0 || n > NUM_PRODUCTS {
        return Err(AppError::NotFound(format!("product '{id}' not found")));
    }

    Ok(Json(Product::generate(n)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{Classify, Outcome};

    #[tokio::test]
    async fn known_ids_resolve() {
        let Json(p) = get_product(Path("prod_0007".into())).await.unwrap();
        assert_eq!(p.id, "prod_0007");
        let Json(again) = get_product(Path("7".into())).await.unwrap();
        assert_eq!(again.title, p.title);
    }

    #[tokio::test]
    async fn bad_and_missing_ids() {
        let bad = get_product(Path("abc".into())).await;
        assert_eq!(bad.outcome(), Outcome::InvalidArgument);

        let missing = get_product(Path("9999".into())).await;
        assert_eq!(missing.outcome(), Outcome::NotFound);
    }
}
