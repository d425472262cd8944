use std::{fs::File, io::BufReader, io::Read, path::Path};

use anyhow::Context;
use clap::Args;
use serde::Deserialize;
use url::Url;

#[derive(Clone, Debug)]
pub struct GhbhConfig {
    /// Base URL of the Bugzilla instance, e.g. `https://bugzilla.redhat.com`
    pub bugzilla_url: Url,
    /// API key used to authenticate against the Bugzilla REST API
    pub bugzilla_api_key: String,
    /// Whether comments posted by the bridge should be private
    pub bugzilla_private_comments: bool,
    /// Secret shared with GitHub to sign webhook deliveries. Signatures aren't checked when this
    /// isn't set.
    pub github_secret: Option<String>,
    /// Port the webhook server listens on, overrides Rocket's own configuration.
    pub http_port: Option<u16>,
}

/// Contents of the YAML configuration file, where every key may be left to the environment.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    bugzilla_url: Option<Url>,
    bugzilla_api_key: Option<String>,
    #[serde(default)]
    bugzilla_private_comments: bool,
    github_secret: Option<String>,
    http_port: Option<u16>,
}

/// Settings taken from the command line or the environment, they win over the configuration file.
#[derive(Args, Debug, Default)]
pub struct ConfigOverrides {
    /// Base URL of the Bugzilla instance
    #[clap(long, env = "GHBH_BUGZILLA_URL")]
    pub bugzilla_url: Option<Url>,
    /// Bugzilla API key
    #[clap(long, env = "GHBH_BUGZILLA_API_KEY", hide_env_values = true)]
    pub bugzilla_api_key: Option<String>,
    /// Secret used to sign GitHub webhook deliveries
    #[clap(long, env = "GHBH_GITHUB_SECRET", hide_env_values = true)]
    pub github_secret: Option<String>,
    /// Port the webhook server listens on
    #[clap(long, env = "GHBH_HTTP_PORT")]
    pub http_port: Option<u16>,
}

impl GhbhConfig {
    /// Loads the configuration file, if any, and applies `overrides` on top of it.
    pub fn load(path: Option<&Path>, overrides: ConfigOverrides) -> anyhow::Result<Self> {
        let file = match path {
            Some(path) => {
                let config_file = File::open(path)
                    .with_context(|| format!("couldn't open {}:", path.display()))?;
                parse_file(BufReader::new(config_file))?
            }
            None => ConfigFile::default(),
        };

        Self::merge(file, overrides)
    }

    fn merge(file: ConfigFile, overrides: ConfigOverrides) -> anyhow::Result<Self> {
        Ok(Self {
            bugzilla_url: overrides
                .bugzilla_url
                .or(file.bugzilla_url)
                .context("bugzilla_url isn't set, neither in the config file nor GHBH_BUGZILLA_URL")?,
            bugzilla_api_key: overrides.bugzilla_api_key.or(file.bugzilla_api_key).context(
                "bugzilla_api_key isn't set, neither in the config file nor GHBH_BUGZILLA_API_KEY",
            )?,
            bugzilla_private_comments: file.bugzilla_private_comments,
            github_secret: overrides.github_secret.or(file.github_secret),
            http_port: overrides.http_port.or(file.http_port),
        })
    }
}

fn parse_file(reader: impl Read) -> anyhow::Result<ConfigFile> {
    serde_yaml::from_reader(reader).context("couldn't parse config file")
}
