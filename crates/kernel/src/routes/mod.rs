//! HTTP route handlers.

pub mod category;
pub mod health;
pub mod product;
pub mod status;
