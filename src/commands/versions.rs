//! The `versions` verb: list everything the index has for one package.

use anyhow::Result;
use log::debug;

use crate::finder::{CandidateSource, SelectionPolicy};
use crate::query::{QueryResult, get_versions};
use crate::version::Version;

/// Receiver for the (package, latest) pair after a successful query.
///
/// Frontends with access to a local environment can surface installed
/// versus latest information here; this tool itself has none.
pub trait InstallationReporter {
    fn installation_info(&self, package: &str, latest: &Version);
}

/// Reporter that drops the notification.
pub struct NullInstallationReporter;

impl InstallationReporter for NullInstallationReporter {
    fn installation_info(&self, package: &str, latest: &Version) {
        debug!("Latest version of {} is {}", package, latest);
    }
}

/// Renders the two output lines for a completed query.
fn render(package: &str, result: &QueryResult) -> [String; 2] {
    let formatted = result.formatted();
    [
        format!("{} ({})", package, formatted[0]),
        format!("Available versions: {}", formatted.join(", ")),
    ]
}

/// Lists every version of `package` the index advertises under the
/// policy, newest first. Emits either both output lines or none.
#[tracing::instrument(skip(source, policy, reporter))]
pub async fn versions<S: CandidateSource>(
    source: &S,
    policy: &SelectionPolicy,
    package: &str,
    reporter: &dyn InstallationReporter,
) -> Result<()> {
    let result = get_versions(source, policy, package).await?;

    for line in render(package, &result) {
        println!("{}", line);
    }
    reporter.installation_info(package, result.latest());

    Ok(())
}
