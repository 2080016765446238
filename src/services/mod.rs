pub mod bootstrap;
pub use bootstrap::{BootstrapError, ProfileBootstrapper, RetryPolicy};

pub mod profiles;
pub use profiles::{ProfileError, ProfileMaintenance};
