mod auth;
mod client;
mod error;
mod sample;

pub mod prelude {
    pub use crate::auth::{AuthOptions, Interface, KeystoneSession};
    pub use crate::client::CeilometerClientInstrumented as CeilometerClient;
    pub use crate::error::CeilometerApiError;
    pub use crate::sample::{NewSample, Sample};
}
