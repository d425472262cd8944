use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::trace;

use crate::webhooks::github::Commit;

lazy_static! {
    /// `bug 123`, `Issue #123`, `bug# 123` in a commit summary
    static ref SUMMARY_REFERENCE: Regex = Regex::new(r"(?i)(?:bug|issue)\s*#?\s*(\d+)").unwrap();
    /// `Resolves: #123`, `Related 123`, `Conflicts: rhbz#123` on a line of the commit body
    static ref BODY_REFERENCE: Regex =
        Regex::new(r"(?i)(?:resolves?|related|conflicts?):?\s*(?:[a-z]*#)?(\d+)").unwrap();
}

/// Commits of a push grouped by the bug they reference, then by sha.
pub type BugReferences<'a> = BTreeMap<String, BTreeMap<&'a str, &'a Commit>>;

fn first_bug_id<'t>(pattern: &Regex, line: &'t str) -> Option<&'t str> {
    pattern
        .captures(line)
        .and_then(|captures| captures.get(1))
        .map(|bug_id| bug_id.as_str())
}

/// Bugs referenced by a single commit: at most one from its summary, one per body line.
pub fn referenced_bugs(commit: &Commit) -> impl Iterator<Item = &str> {
    let summary = first_bug_id(&SUMMARY_REFERENCE, commit.summary().trim());
    let body = commit
        .body()
        .filter_map(|line| first_bug_id(&BODY_REFERENCE, line.trim()));

    summary.into_iter().chain(body)
}

/// Groups `commits` by referenced bug. A commit shows up under every bug it references, but only
/// once per bug.
pub fn extract(commits: &[Commit]) -> BugReferences<'_> {
    let mut bugs = BugReferences::new();

    for commit in commits {
        for bug_id in referenced_bugs(commit) {
            trace!(
                "commit {} from {} references bug {}",
                commit.id,
                commit.timestamp.as_deref().unwrap_or("an unknown date"),
                bug_id
            );
            bugs.entry(bug_id.to_owned())
                .or_default()
                .insert(commit.id.as_str(), commit);
        }
    }

    bugs
}
