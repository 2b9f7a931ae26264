mod category;

pub use category::{Category, CategoryNode, LocalizedCategory, NewCategory, Translation};
