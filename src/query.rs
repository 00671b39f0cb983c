//! Version filtering, ordering and selection.
//!
//! This is the engine behind both verbs: candidates come in from a
//! [`CandidateSource`], get reduced to a deduplicated version set under
//! the selection policy, and leave as a [`QueryResult`] ordered from
//! newest to oldest. Everything here is pure apart from the source call;
//! failure enters only through the source or the empty-set check.

use std::collections::BTreeSet;

use anyhow::Result;
use log::debug;

use crate::error::DistributionNotFound;
use crate::finder::{CandidateSource, SelectionPolicy};
use crate::version::Version;

/// Versions of one package, descending by precedence. Non-empty by
/// construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResult {
    versions: Vec<Version>,
}

impl QueryResult {
    /// Builds a result from a filtered version set for `package`.
    /// An empty set means the index has nothing matching the policy.
    pub fn new(package: &str, versions: BTreeSet<Version>) -> Result<QueryResult, DistributionNotFound> {
        if versions.is_empty() {
            return Err(DistributionNotFound::new(package));
        }
        Ok(QueryResult {
            versions: sort_descending(versions),
        })
    }

    /// The newest version. Cannot fail: the empty case is rejected at
    /// construction.
    pub fn latest(&self) -> &Version {
        &self.versions[0]
    }

    /// All versions, newest first.
    pub fn versions(&self) -> &[Version] {
        &self.versions
    }

    /// The versions rendered for output, newest first.
    pub fn formatted(&self) -> Vec<String> {
        self.versions.iter().map(Version::to_string).collect()
    }
}

/// Deduplicates versions and drops pre-releases unless the policy allows
/// them. Pure and idempotent; yank and compatibility filtering already
/// happened at the source.
pub fn filter_versions(
    versions: impl IntoIterator<Item = Version>,
    policy: &SelectionPolicy,
) -> BTreeSet<Version> {
    versions
        .into_iter()
        .filter(|version| policy.allow_prereleases || !version.is_prerelease())
        .collect()
}

/// Orders a version set from newest to oldest. Deterministic for any
/// insertion order because the set is already value-distinct and totally
/// ordered.
pub fn sort_descending(versions: BTreeSet<Version>) -> Vec<Version> {
    versions.into_iter().rev().collect()
}

/// Runs one package query end to end: discover, filter, order.
#[tracing::instrument(skip(source, policy))]
pub async fn get_versions<S: CandidateSource + ?Sized>(
    source: &S,
    policy: &SelectionPolicy,
    package: &str,
) -> Result<QueryResult> {
    let candidates = source.find_all_candidates(package).await?;
    debug!(
        "Considering {} candidate(s) for package {}",
        candidates.len(),
        package
    );

    let versions = filter_versions(candidates.into_iter().map(|c| c.version), policy);
    let result = QueryResult::new(package, versions)?;
    Ok(result)
}
