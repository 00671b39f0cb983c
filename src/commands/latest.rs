//! The `latest` verb: resolve the newest version of each package.

use anyhow::Result;

use crate::finder::{CandidateSource, SelectionPolicy};
use crate::query::get_versions;

/// Prints `<package>==<latest>` for each target, strictly in order.
///
/// Targets are queried sequentially and the first failure aborts the
/// remainder; packages resolved before the failure keep their output.
#[tracing::instrument(skip(source, policy))]
pub async fn latest<S: CandidateSource>(
    source: &S,
    policy: &SelectionPolicy,
    packages: &[String],
) -> Result<()> {
    for package in packages {
        let result = get_versions(source, policy, package).await?;
        println!("{}=={}", package, result.latest());
    }
    Ok(())
}
