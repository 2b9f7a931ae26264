pub mod deps;
pub mod geolocate;
pub mod notifier;
pub mod password;
pub mod test_dependencies;
pub mod traits;

pub use deps::ServerDeps;
pub use traits::{BaseGeoLocator, BaseNotifier, BasePasswordVerifier, NotifierError};
