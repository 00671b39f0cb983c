//! Command entry points, one per verb.

mod latest;
mod versions;

pub use latest::latest;
pub use versions::{InstallationReporter, NullInstallationReporter, versions};
