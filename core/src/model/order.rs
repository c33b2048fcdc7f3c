// tee_orders/src/model/order.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::member::{Member, MemberView};

/// Store-assigned order identifier. Opaque to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(Uuid);

impl OrderId {
  pub fn new() -> Self {
    Self(Uuid::new_v4())
  }

  pub fn from_uuid(id: Uuid) -> Self {
    Self(id)
  }

  pub fn as_uuid(&self) -> Uuid {
    self.0
  }
}

impl Default for OrderId {
  fn default() -> Self {
    Self::new()
  }
}

impl fmt::Display for OrderId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.0.fmt(f)
  }
}

impl FromStr for OrderId {
  type Err = uuid::Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Uuid::parse_str(s).map(Self)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
  pub id: OrderId,
  /// Free-form link supplied by the customer, usually the shirt design image.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub reference: Option<String>,
  pub created_at: DateTime<Utc>,
  pub members: Vec<Member>,
}

impl Order {
  pub fn member(&self, index: usize) -> Option<&Member> {
    self.members.get(index)
  }

  pub fn member_views(&self) -> impl Iterator<Item = MemberView> + '_ {
    self.members.iter().enumerate().map(move |(index, member)| MemberView {
      order_id: self.id,
      member_index: index,
      order_reference: self.reference.clone(),
      order_created_at: self.created_at,
      member: member.clone(),
    })
  }
}

/// An order as handed to the store for insertion; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
  pub reference: Option<String>,
  pub created_at: DateTime<Utc>,
  pub members: Vec<Member>,
}

impl NewOrder {
  pub fn into_order(self, id: OrderId) -> Order {
    Order {
      id,
      reference: self.reference,
      created_at: self.created_at,
      members: self.members,
    }
  }
}
