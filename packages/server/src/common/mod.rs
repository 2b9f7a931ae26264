pub mod error;
pub mod locale;

pub use error::{AppError, DependencyKind, FieldErrors, StoreError, TokenErrorKind};
pub use locale::Locale;
