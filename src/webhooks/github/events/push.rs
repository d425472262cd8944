use serde::Deserialize;
use url::Url;

use crate::webhooks::github::events::Repository;

const BRANCH_PREFIX: &str = "refs/heads/";

#[derive(Debug, Deserialize)]
pub struct PushEvent {
    pub r#ref: String,
    pub repository: Repository,
    #[serde(default)]
    pub commits: Vec<Commit>,
}

impl PushEvent {
    /// Name of the pushed branch. Refs outside of `refs/heads/` are returned untouched.
    pub fn branch(&self) -> &str {
        self.r#ref
            .strip_prefix(BRANCH_PREFIX)
            .unwrap_or(&self.r#ref)
    }
}

#[derive(Debug, Deserialize)]
pub struct Commit {
    pub id: String,
    pub url: Url,
    pub message: String,
    pub timestamp: Option<String>,
}

impl Commit {
    /// First line of the commit message.
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or_default()
    }

    /// Every line of the commit message after the summary.
    pub fn body(&self) -> impl Iterator<Item = &str> {
        self.message.lines().skip(1)
    }
}
