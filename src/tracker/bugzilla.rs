use std::collections::HashMap;

use anyhow::{anyhow, Context};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use url::Url;

use crate::{
    config::GhbhConfig,
    tracker::{BugTracker, TrackerComment},
};

const X_BUGZILLA_API_KEY: &str = "X-BUGZILLA-API-KEY";

/// Client for the Bugzilla 5 REST API.
pub struct BugzillaClient {
    client: Client,
    base_url: Url,
    api_key: String,
    private_comments: bool,
}

#[derive(Debug, Deserialize)]
struct CommentsResponse {
    #[serde(default)]
    bugs: HashMap<String, BugComments>,
}

#[derive(Debug, Deserialize)]
struct BugComments {
    comments: Vec<TrackerComment>,
}

#[derive(Debug, Serialize)]
struct NewComment<'a> {
    comment: &'a str,
    is_private: bool,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: Option<String>,
    code: Option<i64>,
}

impl BugzillaClient {
    pub fn new(config: &GhbhConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("couldn't build HTTP client")?;

        // `Url::join` would drop the last path segment of e.g. `https://example.com/bugzilla`
        let mut base_url = config.bugzilla_url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            client,
            base_url,
            api_key: config.bugzilla_api_key.clone(),
            private_comments: config.bugzilla_private_comments,
        })
    }

    fn comments_url(&self, bug_id: &str) -> anyhow::Result<Url> {
        self.base_url
            .join(&format!("rest/bug/{}/comment", bug_id))
            .with_context(|| format!("invalid comment URL for bug {}", bug_id))
    }
}

/// Turns a non-2xx answer into an error carrying Bugzilla's own message, when it sent one.
async fn error_for_status(response: Response) -> anyhow::Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error = response.json::<ErrorResponse>().await.ok();
    Err(match error {
        Some(ErrorResponse {
            message: Some(message),
            code,
        }) => anyhow!(
            "bugzilla answered {} (code {}): {}",
            status,
            code.unwrap_or_default(),
            message
        ),
        _ => anyhow!("bugzilla answered {}", status),
    })
}

#[rocket::async_trait]
impl BugTracker for BugzillaClient {
    async fn get_comments(&self, bug_id: &str) -> anyhow::Result<Vec<TrackerComment>> {
        let url = self.comments_url(bug_id)?;
        trace!("fetching comments from {}", url);

        let response = self
            .client
            .get(url)
            .header(X_BUGZILLA_API_KEY, &self.api_key)
            .send()
            .await
            .with_context(|| format!("couldn't fetch comments of bug {}", bug_id))?;

        let mut response: CommentsResponse = error_for_status(response)
            .await?
            .json()
            .await
            .with_context(|| format!("couldn't parse comments of bug {}", bug_id))?;

        let comments = response
            .bugs
            .remove(bug_id)
            .map(|bug| bug.comments)
            .unwrap_or_default();
        debug!("bug {} has {} comments", bug_id, comments.len());

        Ok(comments)
    }

    async fn post_comment(&self, bug_id: &str, text: &str) -> anyhow::Result<()> {
        let url = self.comments_url(bug_id)?;
        trace!("posting comment to {}", url);

        let response = self
            .client
            .post(url)
            .header(X_BUGZILLA_API_KEY, &self.api_key)
            .json(&NewComment {
                comment: text,
                is_private: self.private_comments,
            })
            .send()
            .await
            .with_context(|| format!("couldn't post comment on bug {}", bug_id))?;

        error_for_status(response).await?;
        Ok(())
    }
}
