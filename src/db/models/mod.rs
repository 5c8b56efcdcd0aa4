//! Database models and transfer objects split per entity.

pub mod category;
pub mod common;
pub mod product;
pub mod user;

pub use category::*;
pub use common::*;
pub use product::*;
pub use user::*;
