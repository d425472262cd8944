use anyhow::anyhow;
use rocket::{
    http::{Method, Status},
    request::{FromRequest, Outcome},
    route::{self, Handler},
    Data, Request, Route, State,
};
use serde::Deserialize;
use tracing::{debug, info, trace, warn};

mod signing;
use signing::SignedGitHubPayload;

pub mod events;
pub use events::*;

use crate::webhooks::{Event, EventSender};

const X_GITHUB_EVENT: &str = "X-GitHub-Event";
pub(crate) const GITHUB_WEBHOOK_PATH: &str = "/api/webhooks/github";

pub struct GitHubSecret(pub Option<String>);

#[rocket::post("/api/webhooks/github", data = "<payload>")]
pub fn github_webhook(
    event: Result<GitHubEventType, anyhow::Error>,
    payload: SignedGitHubPayload,
    sender: &State<EventSender>,
) -> (Status, &'static str) {
    let event = match event {
        Ok(event) => event,
        Err(e) => {
            warn!("rejected GitHub delivery: {}", e);
            return (Status::BadRequest, "Invalid event type\n");
        }
    };
    info!("received GitHub event {:?}", event);

    match event {
        GitHubEventType::Push => {
            let push = match serde_json::from_str::<PushEvent>(&payload.0) {
                Ok(push) => push,
                Err(e) => {
                    warn!("unable to parse push payload: {}", e);
                    return (Status::BadRequest, "Invalid data\n");
                }
            };
            trace!("payload: {:?}", push);

            if sender.0.send(Event::GitHub(GitHubEvent::Push(push))).is_err() {
                warn!("bridge isn't receiving events anymore, dropping push");
                return (Status::InternalServerError, "Bridge unavailable\n");
            }
        }
        GitHubEventType::Ping => debug!("GitHub pinged us"),
        GitHubEventType::Other => trace!("ignoring event"),
    }

    (Status::Ok, "")
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum GitHubEventType {
    Ping,
    Push,
    #[serde(other)]
    Other,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for GitHubEventType {
    type Error = anyhow::Error;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let event_types = request.headers().get(X_GITHUB_EVENT).collect::<Vec<_>>();
        if event_types.len() != 1 {
            return Outcome::Error((
                Status::BadRequest,
                anyhow!("request header needs exactly one event type"),
            ));
        }

        let event_type = serde_json::Value::String(event_types[0].to_owned());

        match serde_json::from_value::<GitHubEventType>(event_type) {
            Ok(ev_type) => Outcome::Success(ev_type),
            Err(e) => Outcome::Error((Status::BadRequest, anyhow!(e))),
        }
    }
}

#[derive(Debug)]
pub enum GitHubEvent {
    Push(PushEvent),
}

/// Answers `405 Method Not Allowed` on the webhook path for anything but `POST`.
#[derive(Clone)]
struct MethodNotAllowed;

#[rocket::async_trait]
impl Handler for MethodNotAllowed {
    async fn handle<'r>(&self, request: &'r Request<'_>, _data: Data<'r>) -> route::Outcome<'r> {
        trace!("refusing {} request on GitHub webhook", request.method());
        route::Outcome::from(
            request,
            (Status::MethodNotAllowed, "Only POST messages are accepted\n"),
        )
    }
}

pub fn method_not_allowed_routes() -> Vec<Route> {
    [Method::Get, Method::Put, Method::Patch, Method::Delete]
        .into_iter()
        .map(|method| Route::new(method, GITHUB_WEBHOOK_PATH, MethodNotAllowed))
        .collect()
}
