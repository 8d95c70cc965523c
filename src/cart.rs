//! Shopping Cart Module
//!
//! Per-token item quantities. A quantity of zero or less removes the item.

use std::collections::HashMap;

use tracing::warn;

use crate::error::Result;
use crate::keys;
use crate::store::StoreHandle;

#[derive(Clone)]
pub struct CartStore {
    store: StoreHandle,
}

impl CartStore {
    pub fn new(store: StoreHandle) -> Self {
        Self { store }
    }

    // == Add To Cart ==
    pub async fn add_to_cart(&self, token: &str, item: &str, count: i64) -> Result<()> {
        let key = keys::cart(token);
        if count <= 0 {
            self.store.hash_delete(&key, &[item.to_string()]).await?;
        } else {
            self.store.hash_set(&key, item, &count.to_string()).await?;
        }
        Ok(())
    }

    // == Cart Contents ==
    /// Item quantities for `token`. Fields that do not hold a number are skipped.
    pub async fn cart_contents(&self, token: &str) -> Result<HashMap<String, i64>> {
        let raw = self.store.hash_get_all(&keys::cart(token)).await?;
        Ok(raw
            .into_iter()
            .filter_map(|(item, count)| match count.parse() {
                Ok(count) => Some((item, count)),
                Err(_) => {
                    warn!(token, item = %item, "Ignoring non-numeric cart quantity");
                    None
                }
            })
            .collect())
    }
}
