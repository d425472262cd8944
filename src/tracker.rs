use serde::Deserialize;

mod bugzilla;
pub use bugzilla::BugzillaClient;

#[cfg(test)]
pub(crate) mod memory;

/// A comment already present on a bug.
#[derive(Clone, Debug, Deserialize)]
pub struct TrackerComment {
    #[serde(default)]
    pub id: u64,
    pub text: String,
    pub creator: Option<String>,
    #[serde(default)]
    pub is_private: bool,
}

/// What the bridge needs from a bug tracker: reading a bug's comment history and commenting on it.
#[rocket::async_trait]
pub trait BugTracker: Send + Sync {
    async fn get_comments(&self, bug_id: &str) -> anyhow::Result<Vec<TrackerComment>>;

    async fn post_comment(&self, bug_id: &str, text: &str) -> anyhow::Result<()>;
}
