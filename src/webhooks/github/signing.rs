use std::io;

use anyhow::anyhow;
use hmac::{Hmac, Mac, NewMac};
use rocket::{
    data::{ByteUnit, FromData, Outcome},
    http::{ContentType, Status},
    Data, Request, State,
};
use sha1::Sha1;
use sha2::Sha256;
use tracing::trace;

use crate::webhooks::github::GitHubSecret;

const X_HUB_SIGNATURE_256: &str = "X-Hub-Signature-256";
const X_HUB_SIGNATURE: &str = "X-Hub-Signature";
const CONTENT_LENGTH: &str = "Content-Length";

/// Signature of a delivery, as sent in one of the two GitHub signature headers.
#[derive(Debug, PartialEq)]
enum Signature<'a> {
    Sha256(&'a str),
    Sha1(&'a str),
}

impl<'a> Signature<'a> {
    /// Prefers the SHA-256 header, GitHub only keeps sending the SHA-1 one for compatibility.
    fn from_request(request: &'a Request<'_>) -> Option<Self> {
        let headers = request.headers();
        if let Some(signature) = headers.get_one(X_HUB_SIGNATURE_256) {
            Some(Signature::Sha256(signature))
        } else {
            headers.get_one(X_HUB_SIGNATURE).map(Signature::Sha1)
        }
    }
}

fn verify_mac<M: Mac + NewMac>(secret: &str, data: &[u8], hex_signature: &str) -> bool {
    let mut mac = match M::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return false,
    };

    mac.update(data);

    match hex::decode(hex_signature) {
        Ok(bytes) => mac.verify(&bytes).is_ok(),
        Err(_) => {
            trace!("couldn't decode hex-encoded signature {}", hex_signature);
            false
        }
    }
}

fn validate_signature(secret: &str, signature: &Signature<'_>, data: &[u8]) -> bool {
    trace!("validating signature...");

    // GitHub puts a prefix in front of its hex digest
    let (prefix, signature) = match signature {
        Signature::Sha256(s) => ("sha256=", *s),
        Signature::Sha1(s) => ("sha1=", *s),
    };
    let hex_signature = match signature.strip_prefix(prefix) {
        Some(s) => s,
        None => {
            trace!("couldn't strip prefix from signature `{}`", signature);
            return false;
        }
    };

    match prefix {
        "sha256=" => verify_mac::<Hmac<Sha256>>(secret, data, hex_signature),
        _ => verify_mac::<Hmac<Sha1>>(secret, data, hex_signature),
    }
}

/// Raw body of a GitHub delivery whose content type, length and (when a secret is configured)
/// signature were checked.
pub struct SignedGitHubPayload(pub String);

const LIMIT: ByteUnit = ByteUnit::Mebibyte(1);

// Tracking issue for chaining Data guards to avoid reimplementing all this:
// https://github.com/SergioBenitez/Rocket/issues/775
#[rocket::async_trait]
impl<'r> FromData<'r> for SignedGitHubPayload {
    type Error = anyhow::Error;

    async fn from_data(request: &'r Request<'_>, data: Data<'r>) -> Outcome<'r, Self> {
        trace!("received payload on GitHub webhook endpoint: {:?}", request);

        if request.content_type() != Some(&ContentType::JSON) {
            trace!(
                "content type `{:?}` wasn't json, stopping here...",
                request.content_type()
            );
            return Outcome::Error((
                Status::UnsupportedMediaType,
                anyhow!("requests must be of type application/json"),
            ));
        }

        let content_length = request
            .headers()
            .get_one(CONTENT_LENGTH)
            .and_then(|length| length.parse::<u64>().ok());
        if content_length.is_none() {
            trace!("invalid or missing {} header", CONTENT_LENGTH);
            return Outcome::Error((Status::LengthRequired, anyhow!("invalid content length")));
        }

        let secret = match request.guard::<&State<GitHubSecret>>().await {
            rocket::outcome::Outcome::Success(secret) => secret.0.as_deref(),
            _ => {
                trace!("GitHub secret isn't managed, refusing to skip signature checks");
                return Outcome::Error((
                    Status::InternalServerError,
                    anyhow!("webhook secret state is missing"),
                ));
            }
        };

        let signature = Signature::from_request(request);
        if secret.is_some() && signature.is_none() {
            trace!(
                "couldn't locate {} or {} header",
                X_HUB_SIGNATURE_256,
                X_HUB_SIGNATURE
            );
            return Outcome::Error((Status::Unauthorized, anyhow!("missing signature")));
        }

        let size_limit = request.limits().get("json").unwrap_or(LIMIT);
        let content = match data.open(size_limit).into_bytes().await {
            Ok(s) if s.is_complete() => s.into_inner(),
            Ok(_) => {
                let eof = io::ErrorKind::UnexpectedEof;
                trace!("payload was too big");
                return Outcome::Error((
                    Status::PayloadTooLarge,
                    io::Error::new(eof, "data limit exceeded").into(),
                ));
            }
            Err(e) => return Outcome::Error((Status::BadRequest, e.into())),
        };

        if let (Some(secret), Some(signature)) = (secret, &signature) {
            if !validate_signature(secret, signature, &content) {
                trace!("signature validation failed, stopping here...");
                return Outcome::Error((Status::Unauthorized, anyhow!("invalid signature")));
            }
            trace!("validated GitHub payload signature");
        }

        // GitHub only ever sends utf-8 JSON
        match String::from_utf8(content) {
            Ok(content) => Outcome::Success(SignedGitHubPayload(content)),
            Err(e) => {
                trace!("payload wasn't valid utf-8");
                Outcome::Error((Status::BadRequest, e.into()))
            }
        }
    }
}
