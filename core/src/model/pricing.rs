// tee_orders/src/model/pricing.rs

//! The size price table. One instance prices both the customer-facing listings
//! and the admin grouping totals, so the two can never disagree.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{OrderError, OrderResult};

/// Price in VND. Transfers are whole dong.
pub type Price = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizePrice {
  pub label: String,
  pub price: Price,
}

/// Ordered mapping from size label to price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceTable {
  sizes: Vec<SizePrice>,
}

/// Sum of a set of sizes. Labels with no price are listed rather than failing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PricedTotal {
  pub total: Price,
  pub unpriced: Vec<String>,
}

impl PriceTable {
  pub fn new(sizes: Vec<SizePrice>) -> OrderResult<Self> {
    if sizes.is_empty() {
      return Err(OrderError::validation("Price table must list at least one size."));
    }
    let mut seen = HashSet::new();
    for entry in &sizes {
      if entry.label.trim().is_empty() {
        return Err(OrderError::validation("Size labels cannot be blank."));
      }
      if !seen.insert(entry.label.as_str()) {
        return Err(OrderError::validation(format!("Size '{}' is listed twice.", entry.label)));
      }
    }
    Ok(Self { sizes })
  }

  pub fn price_of(&self, label: &str) -> Option<Price> {
    self.sizes.iter().find(|s| s.label == label).map(|s| s.price)
  }

  pub fn contains(&self, label: &str) -> bool {
    self.price_of(label).is_some()
  }

  pub fn sizes(&self) -> &[SizePrice] {
    &self.sizes
  }

  /// Validates a caller-supplied size label against the table.
  pub fn require(&self, label: &str) -> OrderResult<Price> {
    self.price_of(label).ok_or_else(|| {
      OrderError::validation(format!(
        "Unknown size '{}'. Expected one of: {}.",
        label,
        self.sizes.iter().map(|s| s.label.as_str()).collect::<Vec<_>>().join(", ")
      ))
    })
  }

  pub fn total<'a, I>(&self, labels: I) -> PricedTotal
  where
    I: IntoIterator<Item = &'a str>,
  {
    let mut priced = PricedTotal::default();
    for label in labels {
      match self.price_of(label) {
        Some(price) => priced.total += price,
        None => priced.unpriced.push(label.to_string()),
      }
    }
    priced
  }
}

impl Default for PriceTable {
  fn default() -> Self {
    let sizes = [
      ("2[10-13kg]", 70_000),
      ("5[20-25kg]", 70_000),
      ("6[25-30kg]", 70_000),
      ("XS[30-35kg]", 80_000),
      ("M", 80_000),
      ("L", 80_000),
      ("XL", 80_000),
      ("XXL", 80_000),
    ]
    .into_iter()
    .map(|(label, price)| SizePrice {
      label: label.to_string(),
      price,
    })
    .collect();
    Self { sizes }
  }
}
