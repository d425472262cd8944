use tracing::{debug, info, warn};

use crate::{
    bridge::{comment::compose, guard::should_post, references::extract},
    tracker::BugTracker,
    webhooks::github::PushEvent,
};

/// Comments on every bug referenced by the push whose history doesn't mention all of the
/// referencing commits yet.
///
/// Returns the number of comments that were attempted, including the ones the tracker refused.
/// Bugs whose history couldn't be fetched are skipped and not counted.
pub async fn dispatch(tracker: &dyn BugTracker, event: &PushEvent) -> usize {
    let references = extract(&event.commits);
    let comments = compose(&references, event);
    debug!(
        "push to {} references {} bugs",
        event.branch(),
        comments.len()
    );

    let mut posts = 0;
    for (bug_id, comment) in &comments {
        match should_post(tracker, bug_id, comment).await {
            Ok(true) => {}
            Ok(false) => {
                info!("bug {} is up to date, not commenting", bug_id);
                continue;
            }
            Err(e) => {
                warn!("skipping bug {}: {:#}", bug_id, e);
                continue;
            }
        }

        posts += 1;
        match tracker.post_comment(bug_id, &comment.text()).await {
            Ok(()) => info!(
                "commented on bug {} about {} commits",
                bug_id,
                comment.commits.len()
            ),
            Err(e) => warn!("couldn't comment on bug {}: {:#}", bug_id, e),
        }
    }

    posts
}
