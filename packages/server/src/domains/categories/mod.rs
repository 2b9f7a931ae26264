pub mod actions;
pub mod models;
pub mod slug;
pub mod store;

pub use models::{Category, CategoryNode, LocalizedCategory, NewCategory, Translation};
pub use store::{CategoryPatch, CategoryStore, PgCategoryStore};
