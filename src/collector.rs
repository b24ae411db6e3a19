use std::fmt;
use std::io::Write;

use anyhow::{Context, Result};

use crate::github::SourceHost;
use crate::window::DateWindow;

/// Commit messages for one repository, keyed `"<org> -> <repo>"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoCommits {
    pub key: String,
    pub messages: Vec<String>,
}

/// Insertion-ordered groups of commit messages. Never holds an empty group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitGroups {
    entries: Vec<RepoCommits>,
}

impl CommitGroups {
    /// Append `messages` to the group `key`, creating it on first use.
    /// An empty `messages` leaves the collection untouched.
    pub fn extend(&mut self, key: &str, messages: Vec<String>) {
        if messages.is_empty() {
            return;
        }

        match self.entries.iter_mut().find(|e| e.key == key) {
            Some(entry) => entry.messages.extend(messages),
            None => self.entries.push(RepoCommits {
                key: key.to_string(),
                messages,
            }),
        }
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.messages.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RepoCommits> {
        self.entries.iter()
    }
}

/// Something that was skipped while scanning.
#[derive(Debug)]
pub enum ScanIssue {
    Organization {
        name: String,
        error: anyhow::Error,
    },
    Repository {
        organization: String,
        repository: String,
        error: anyhow::Error,
    },
}

impl fmt::Display for ScanIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanIssue::Organization { name, error } => {
                write!(f, "Could not access organization {name}. Reason: {error:#}")
            }
            ScanIssue::Repository {
                organization,
                repository,
                error,
            } => write!(
                f,
                "Could not process repo {organization}/{repository}. Reason: {error:#}"
            ),
        }
    }
}

#[derive(Debug, Default)]
pub struct Collection {
    pub groups: CommitGroups,
    pub issues: Vec<ScanIssue>,
}

/// Scan every organization's repositories for commits by `author` inside
/// `window`. Failures are recorded per organization or repository and never
/// stop the scan. Progress lines go to `progress`.
pub fn collect_commits<W: Write>(
    host: &dyn SourceHost,
    organizations: &[String],
    author: &str,
    window: &DateWindow,
    progress: &mut W,
) -> Result<Collection> {
    let mut collection = Collection::default();

    for org_name in organizations {
        let org_name = org_name.trim();

        let org = match host.organization(org_name) {
            Ok(org) => org,
            Err(error) => {
                collection.issues.push(ScanIssue::Organization {
                    name: org_name.to_string(),
                    error,
                });
                continue;
            }
        };

        writeln!(progress, "Scanning organization: {org_name}")
            .context("failed to write progress")?;

        let repos = match host.repositories(&org) {
            Ok(repos) => repos,
            Err(error) => {
                collection.issues.push(ScanIssue::Organization {
                    name: org_name.to_string(),
                    error,
                });
                continue;
            }
        };

        log::info!("{} repositories in {}", repos.len(), org.login);

        for repo in &repos {
            match host.commit_messages(&org, repo, author, window) {
                Ok(messages) if messages.is_empty() => {
                    log::debug!("No commits in {}/{}", org.login, repo.name);
                }
                Ok(messages) => {
                    let key = format!("{} -> {}", org.display_name(), repo.name);
                    writeln!(progress, "  Found {} commits in {key}", messages.len())
                        .context("failed to write progress")?;
                    collection.groups.extend(&key, messages);
                }
                Err(error) => collection.issues.push(ScanIssue::Repository {
                    organization: org.login.clone(),
                    repository: repo.name.clone(),
                    error,
                }),
            }
        }
    }

    Ok(collection)
}
