pub mod guard;
pub mod restrict;

pub use guard::{protect_routes, CurrentUser};
pub use restrict::require_admin;
