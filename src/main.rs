use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use rocket::{catch, catchers, http::Status, routes, Request};
use tokio::sync::mpsc::unbounded_channel;

mod bridge;
use bridge::Bridge;

mod config;
use config::{ConfigOverrides, GhbhConfig};

mod tracker;
use tracker::BugzillaClient;

mod webhooks;
use webhooks::{github::GitHubSecret, github_webhook, method_not_allowed_routes, EventSender};

#[derive(Parser)]
#[clap(version = "0.1")]
struct Opts {
    /// Configuration file for ghbh, optional when the required settings come from the environment
    #[clap(short, long, env = "GHBH_CONFIG", parse(from_os_str))]
    config: Option<PathBuf>,

    #[clap(flatten)]
    overrides: ConfigOverrides,
}

/// Error responses are plain text, like successful ones.
#[catch(default)]
fn plain_text_catcher(status: Status, _request: &Request) -> String {
    format!("{}\n", status.reason().unwrap_or("Error"))
}

#[rocket::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let opts = Opts::parse();
    let config = GhbhConfig::load(opts.config.as_deref(), opts.overrides)?;

    let (sender, receiver) = unbounded_channel();
    let github_secret = config.github_secret.clone();

    let bugzilla = BugzillaClient::new(&config).context("failed to create bugzilla client")?;
    let bridge = Bridge::new(Box::new(bugzilla));
    tokio::spawn(async move { bridge.run(receiver).await });

    let mut figment = rocket::Config::figment();
    if let Some(port) = config.http_port {
        figment = figment.merge(("port", port));
    }

    let rocket = rocket::custom(figment)
        .mount("/", routes![github_webhook])
        .mount("/", method_not_allowed_routes())
        .register("/", catchers![plain_text_catcher])
        .manage(EventSender(sender))
        .manage(GitHubSecret(github_secret));
    rocket
        .launch()
        .await
        .map(|_| ())
        .map_err(|err| anyhow::anyhow!("rocket failed: {}", err))
}
