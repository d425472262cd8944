use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};

use anyhow::bail;

use crate::tracker::{BugTracker, TrackerComment};

/// In-memory tracker: posted comments are appended to the bug's history, so later reads see them.
#[derive(Default)]
pub(crate) struct MemoryTracker {
    comments: Mutex<HashMap<String, Vec<TrackerComment>>>,
    posted: Mutex<Vec<(String, String)>>,
    broken_reads: HashSet<String>,
    broken_posts: HashSet<String>,
}

impl MemoryTracker {
    pub(crate) fn new() -> Self {
        Default::default()
    }

    pub(crate) fn with_comment(self, bug_id: &str, text: &str) -> Self {
        self.add_comment(bug_id, text, false);
        self
    }

    pub(crate) fn with_private_comment(self, bug_id: &str, text: &str) -> Self {
        self.add_comment(bug_id, text, true);
        self
    }

    /// Reading comments of this bug fails.
    pub(crate) fn with_broken_reads(mut self, bug_id: &str) -> Self {
        self.broken_reads.insert(bug_id.to_owned());
        self
    }

    /// Posting on this bug fails.
    pub(crate) fn with_broken_posts(mut self, bug_id: &str) -> Self {
        self.broken_posts.insert(bug_id.to_owned());
        self
    }

    /// Every successful post, in order, as `(bug id, text)`.
    pub(crate) fn posted(&self) -> Vec<(String, String)> {
        self.posted.lock().unwrap().clone()
    }

    fn add_comment(&self, bug_id: &str, text: &str, is_private: bool) {
        let mut comments = self.comments.lock().unwrap();
        let history = comments.entry(bug_id.to_owned()).or_default();
        history.push(TrackerComment {
            id: history.len() as u64,
            text: text.to_owned(),
            creator: Some("bridge@example.com".to_owned()),
            is_private,
        });
    }
}

#[rocket::async_trait]
impl BugTracker for MemoryTracker {
    async fn get_comments(&self, bug_id: &str) -> anyhow::Result<Vec<TrackerComment>> {
        if self.broken_reads.contains(bug_id) {
            bail!("bug {} is unreachable", bug_id);
        }

        let comments = self.comments.lock().unwrap();
        Ok(comments.get(bug_id).cloned().unwrap_or_default())
    }

    async fn post_comment(&self, bug_id: &str, text: &str) -> anyhow::Result<()> {
        if self.broken_posts.contains(bug_id) {
            bail!("not allowed to comment on bug {}", bug_id);
        }

        self.add_comment(bug_id, text, false);
        self.posted
            .lock()
            .unwrap()
            .push((bug_id.to_owned(), text.to_owned()));
        Ok(())
    }
}
