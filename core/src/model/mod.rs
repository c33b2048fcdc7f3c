// tee_orders/src/model/mod.rs

//! Order documents, their inline members and the size price table.

pub mod member;
pub mod order;
pub mod pricing;

pub use member::{Member, MemberRef, MemberView, NewMember, PaymentStatus};
pub use order::{NewOrder, Order, OrderId};
pub use pricing::{Price, PriceTable, PricedTotal, SizePrice};
