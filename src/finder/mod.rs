//! Candidate discovery contract and selection policy.
//!
//! A [`CandidateSource`] is the narrow seam between the query engine and
//! whatever actually talks to a package index. It may perform network
//! I/O, it may fail with index-connectivity errors, and the order of the
//! candidates it returns is unspecified; callers materialize and dedupe
//! on their side.

mod pypi;

pub use pypi::PyPiFinder;

use anyhow::Result;
use async_trait::async_trait;

use crate::version::Version;

/// Which distribution formats a file may have to count as a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatControl {
    /// Both source distributions and wheels.
    #[default]
    AllowAll,
    /// Source distributions only (`--no-binary`).
    NoBinary,
    /// Wheels only (`--only-binary`).
    OnlyBinary,
}

/// Filtering toggles applied to a query. Constructed once per invocation
/// from the command line and immutable afterwards.
#[derive(Debug, Clone, Default)]
pub struct SelectionPolicy {
    /// Keep alpha/beta/rc/dev versions.
    pub allow_prereleases: bool,
    /// Keep versions whose files were all yanked by the publisher.
    pub allow_yanked: bool,
    /// When set, skip (true) or enforce (false) requires-python checks.
    /// Absent means enforce whenever a target Python is known.
    pub ignore_requires_python: Option<bool>,
    /// Distribution format constraint.
    pub format_control: FormatControl,
    /// Python interpreter version used for requires-python checks.
    /// None disables the check (this tool has no host interpreter).
    pub target_python: Option<Version>,
}

impl SelectionPolicy {
    /// Whether requires-python metadata should be enforced.
    pub fn enforce_requires_python(&self) -> bool {
        self.target_python.is_some() && self.ignore_requires_python != Some(true)
    }
}

/// A discovered (version, download link) pair for a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub name: String,
    pub version: Version,
    /// Where one of the version's files can be fetched from.
    pub link: String,
}

/// Source of candidates for a package, typically an index over the network.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// Every candidate the index advertises for `package`, in no
    /// particular order, possibly with duplicate versions. An unknown
    /// package yields an empty list, not an error.
    async fn find_all_candidates(&self, package: &str) -> Result<Vec<Candidate>>;
}
