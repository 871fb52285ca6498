//! Aggregates module
pub mod cart;
pub mod coupon;
pub mod order;
pub mod product;
pub mod review;
pub mod user;

pub use cart::{Cart, CartLine, PricedLine};
pub use coupon::{Coupon, DiscountKind};
pub use order::{NewOrder, Order, OrderError, OrderItem, OrderStatus, OrderWithItems};
pub use product::{Category, Product, ProductError};
pub use review::{NewReview, Review};
pub use user::{Favorite, Registration, User};
