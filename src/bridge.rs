use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info};

use crate::{
    tracker::BugTracker,
    webhooks::{Event, GitHubEvent},
};

mod comment;
mod dispatch;
mod guard;
mod references;

#[cfg(test)]
mod fixtures;

pub use dispatch::dispatch;

/// Relays push events received from the webhook endpoint to the bug tracker.
pub struct Bridge {
    tracker: Box<dyn BugTracker>,
}

impl Bridge {
    pub fn new(tracker: Box<dyn BugTracker>) -> Self {
        Self { tracker }
    }

    /// Handles events one at a time, until every sender is dropped.
    pub async fn run(self, mut events: UnboundedReceiver<Event>) {
        debug!("running...");

        loop {
            let event = match events.recv().await {
                Some(event) => event,
                None => {
                    info!("all channel senders were dropped, exiting receive loop");
                    break;
                }
            };
            debug!("received event: {:?}", event);

            self.handle_event(event).await;
        }
    }

    async fn handle_event(&self, event: Event) {
        match event {
            Event::GitHub(GitHubEvent::Push(push)) => {
                let posts = dispatch(self.tracker.as_ref(), &push).await;
                info!(
                    "push to {} of {} resulted in {} comments",
                    push.branch(),
                    push.repository.html_url,
                    posts
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::sync::mpsc::unbounded_channel;

    use super::*;
    use crate::tracker::{memory::MemoryTracker, TrackerComment};

    /// Lets the test keep an eye on the tracker the bridge owns.
    struct Shared(Arc<MemoryTracker>);

    #[rocket::async_trait]
    impl BugTracker for Shared {
        async fn get_comments(&self, bug_id: &str) -> anyhow::Result<Vec<TrackerComment>> {
            self.0.get_comments(bug_id).await
        }

        async fn post_comment(&self, bug_id: &str, text: &str) -> anyhow::Result<()> {
            self.0.post_comment(bug_id, text).await
        }
    }

    #[tokio::test]
    async fn run_dispatches_queued_pushes() {
        let tracker = Arc::new(MemoryTracker::new());
        let bridge = Bridge::new(Box::new(Shared(tracker.clone())));
        let (sender, receiver) = unbounded_channel();

        let push = fixtures::push_event("refs/heads/master");
        sender.send(Event::GitHub(GitHubEvent::Push(push))).unwrap();
        let push = fixtures::push_event("refs/heads/master");
        sender.send(Event::GitHub(GitHubEvent::Push(push))).unwrap();
        drop(sender);

        bridge.run(receiver).await;

        // the second push was already reported by the first one
        let posted = tracker.posted();
        assert_eq!(posted.len(), 2);
        assert_eq!(posted[0].0, "123456");
        assert_eq!(posted[1].0, "999999");
    }
}
