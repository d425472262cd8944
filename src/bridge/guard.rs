use anyhow::Context;
use tracing::{debug, trace};

use crate::{bridge::comment::Comment, tracker::BugTracker};

/// Checks the bug's history for the commits `comment` would mention. Posting is only needed when
/// at least one of them doesn't appear in any existing comment.
///
/// This is a plain substring search on comment texts: a sha quoted in an unrelated comment also
/// counts as already reported. The branch isn't taken into account, a commit is only announced
/// once even if it's later pushed to another branch.
pub async fn should_post(
    tracker: &dyn BugTracker,
    bug_id: &str,
    comment: &Comment<'_>,
) -> anyhow::Result<bool> {
    let existing = tracker
        .get_comments(bug_id)
        .await
        .with_context(|| format!("couldn't fetch existing comments of bug {}", bug_id))?;

    let mut unreported = None;
    for sha in comment.shas() {
        match existing.iter().find(|previous| previous.text.contains(sha)) {
            Some(previous) => trace!(
                "commit {} already mentioned on bug {} by {}comment {} from {}",
                sha,
                bug_id,
                if previous.is_private { "private " } else { "" },
                previous.id,
                previous.creator.as_deref().unwrap_or("an unknown user")
            ),
            None => {
                unreported = Some(sha);
                break;
            }
        }
    }

    match unreported {
        Some(sha) => {
            debug!("commit {} was never mentioned on bug {}", sha, bug_id);
            Ok(true)
        }
        None => {
            debug!(
                "bug {} already mentions every commit pushed to {}",
                bug_id, comment.branch
            );
            Ok(false)
        }
    }
}
