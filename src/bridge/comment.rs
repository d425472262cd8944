use std::{collections::BTreeMap, fmt::Display};

use url::Url;

use crate::{
    bridge::references::BugReferences,
    webhooks::github::{Commit, PushEvent},
};

/// Summary of the commits of one push referencing a given bug.
#[derive(Debug)]
pub struct Comment<'a> {
    pub branch: &'a str,
    pub repository: &'a Url,
    pub commits: Vec<&'a Commit>,
}

impl<'a> Comment<'a> {
    pub fn shas(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.commits.iter().copied().map(|commit| commit.id.as_str())
    }

    /// The text that gets posted on the bug.
    pub fn text(&self) -> String {
        self.to_string().trim().to_owned()
    }
}

/// Pads every line break with two spaces and indents the following line, so that commit messages
/// render as a block in Bugzilla. CRLF line breaks are treated like LF ones.
fn indent(message: &str) -> String {
    message
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect::<Vec<_>>()
        .join("  \n  ")
}

impl Display for Comment<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let plural = if self.commits.len() > 1 { "s" } else { "" };
        writeln!(
            f,
            "Commit{} pushed to {} at {}",
            plural, self.branch, self.repository
        )?;

        for commit in &self.commits {
            write!(f, "\n{}\n{}\n", commit.url, indent(&commit.message))?;
        }

        Ok(())
    }
}

/// Builds one comment per referenced bug.
pub fn compose<'a>(
    references: &BugReferences<'a>,
    event: &'a PushEvent,
) -> BTreeMap<String, Comment<'a>> {
    references
        .iter()
        .map(|(bug_id, commits)| {
            let comment = Comment {
                branch: event.branch(),
                repository: &event.repository.html_url,
                commits: commits.values().copied().collect(),
            };
            (bug_id.clone(), comment)
        })
        .collect()
}
