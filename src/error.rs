//! Domain errors recognized at the command-line boundary.
//!
//! Query and finder code returns these inside `anyhow::Error`; `main`
//! downcasts to decide whether a failure is reported as a one-line error
//! (exit code 1) or propagates as a crash.

/// No version of the requested package survived filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionNotFound {
    pub package: String,
}

impl DistributionNotFound {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
        }
    }
}

impl std::fmt::Display for DistributionNotFound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "No matching distribution found for {}", self.package)
    }
}

impl std::error::Error for DistributionNotFound {}
