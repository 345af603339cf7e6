//! Sale-price resolution with memoization.
//!
//! Computing a product's effective price applies its discount; the result
//! is memoized in the ephemeral store for an hour under
//! `product_{id}_final_price`. Product updates do not invalidate the key,
//! so a memoized price can lag a mutation until the TTL lapses.

use std::time::Duration;

use entity::product;

use crate::error::ApiError;
use crate::kv::KvStore;

pub const PRICE_TTL: Duration = Duration::from_secs(3600);

fn price_key(product_id: i64) -> String {
    format!("product_{product_id}_final_price")
}

/// Discount arithmetic, rounded to kopecks. A product not on sale sells
/// at list price no matter what its discount field says.
pub fn compute_final_price(model: &product::Model) -> f64 {
    if !model.is_on_sale {
        return model.price;
    }
    let discounted = model.price * (1.0 - model.discount / 100.0);
    (discounted * 100.0).round() / 100.0
}

/// Effective price for `model`, served from the memo when one is live.
///
/// Unparseable memo values are treated as absent and recomputed.
pub async fn final_price(kv: &dyn KvStore, model: &product::Model) -> Result<f64, ApiError> {
    let key = price_key(model.id);

    if let Some(cached) = kv.get(&key).await? {
        if let Ok(price) = cached.parse::<f64>() {
            return Ok(price);
        }
    }

    let price = compute_final_price(model);
    kv.set(&key, &price.to_string(), PRICE_TTL).await?;
    Ok(price)
}
