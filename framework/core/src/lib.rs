mod policy;
mod shutdown;

pub mod prelude {
    pub use crate::policy::{FailurePolicy, OnFailure};
    pub use crate::shutdown::{DelegatedShutdownListener, ShutdownHandle, ShutdownSignalError};
}
