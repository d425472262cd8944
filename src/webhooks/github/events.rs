use serde::Deserialize;
use url::Url;

mod push;

pub use push::*;

#[derive(Debug, Deserialize)]
pub struct Repository {
    pub html_url: Url,
}
