//! Candidate source backed by the PyPI JSON API.

use anyhow::Result;
use async_trait::async_trait;
use log::{debug, warn};

use crate::http::{HttpClient, NonRetryableError};
use crate::version::{Version, VersionSpecifiers};

use super::{Candidate, CandidateSource, FormatControl, SelectionPolicy};

/// Index API response types (internal).
mod api {
    use serde::Deserialize;
    use std::collections::HashMap;

    #[derive(Deserialize, Debug)]
    pub struct Project {
        pub releases: HashMap<String, Vec<File>>,
    }

    #[derive(Deserialize, Debug)]
    pub struct File {
        pub url: String,
        pub packagetype: String,
        #[serde(default)]
        pub requires_python: Option<String>,
        #[serde(default)]
        pub yanked: Yanked,
    }

    /// The yanked field is either a bool or a reason string.
    #[derive(Deserialize, Debug)]
    #[serde(untagged)]
    pub enum Yanked {
        Flag(bool),
        Reason(String),
    }

    impl Default for Yanked {
        fn default() -> Self {
            Yanked::Flag(false)
        }
    }

    impl Yanked {
        pub fn is_yanked(&self) -> bool {
            match self {
                Yanked::Flag(flag) => *flag,
                Yanked::Reason(_) => true,
            }
        }
    }
}

/// Finds candidates through the JSON API of a PyPI-compatible index.
///
/// Yank, requires-python and format filtering happen here, at the link
/// level; stability filtering is the caller's concern.
pub struct PyPiFinder {
    http_client: HttpClient,
    index_url: String,
    policy: SelectionPolicy,
}

impl PyPiFinder {
    pub fn new(http_client: HttpClient, index_url: &str, policy: SelectionPolicy) -> Self {
        Self {
            http_client,
            index_url: index_url.trim_end_matches('/').to_string(),
            policy,
        }
    }

    /// Whether a file is selectable under the policy. `version` is only
    /// used for log messages.
    fn file_is_applicable(&self, version: &str, file: &api::File) -> bool {
        match self.policy.format_control {
            FormatControl::AllowAll => {}
            FormatControl::NoBinary => {
                if file.packagetype.starts_with("bdist") {
                    return false;
                }
            }
            FormatControl::OnlyBinary => {
                if file.packagetype != "bdist_wheel" {
                    return false;
                }
            }
        }

        if file.yanked.is_yanked() && !self.policy.allow_yanked {
            debug!("Skipping yanked file {} of version {}", file.url, version);
            return false;
        }

        if self.policy.enforce_requires_python()
            && let Some(target) = &self.policy.target_python
            && let Some(requires_python) = &file.requires_python
        {
            match requires_python.parse::<VersionSpecifiers>() {
                Ok(specifiers) if !specifiers.contains(target) => {
                    debug!(
                        "Version {} requires Python {}, skipping file {}",
                        version, requires_python, file.url
                    );
                    return false;
                }
                Ok(_) => {}
                // Unparseable metadata is treated as permissive.
                Err(e) => warn!(
                    "Ignoring invalid requires-python {:?} on version {}: {}",
                    requires_python, version, e
                ),
            }
        }

        true
    }
}

#[async_trait]
impl CandidateSource for PyPiFinder {
    async fn find_all_candidates(&self, package: &str) -> Result<Vec<Candidate>> {
        let url = format!("{}/pypi/{}/json", self.index_url, package);
        debug!("Fetching project data from {}...", url);

        let project: api::Project = match self.http_client.get_json(&url).await {
            Ok(project) => project,
            // A package unknown to this index is an empty candidate set,
            // not a connectivity failure.
            Err(e) if matches!(
                e.downcast_ref::<NonRetryableError>(),
                Some(NonRetryableError::NotFound(_))
            ) =>
            {
                debug!("Index has no project {}", package);
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        let mut candidates = Vec::new();
        for (version_str, files) in &project.releases {
            let version = Version::parse(version_str);
            for file in files {
                if self.file_is_applicable(version_str, file) {
                    candidates.push(Candidate {
                        name: package.to_string(),
                        version: version.clone(),
                        link: file.url.clone(),
                    });
                }
            }
        }

        debug!(
            "Found {} candidate(s) for package {}",
            candidates.len(),
            package
        );
        Ok(candidates)
    }
}
