pub mod app;
pub mod cookies;
pub mod middleware;
pub mod routes;

pub use app::{build_app, AxumAppState};
