//! Slack request signing.
//!
//! Each request carries `X-Slack-Request-Timestamp` and `X-Slack-Signature`.
//! The signature is `v0=` followed by the hex HMAC-SHA256 of
//! `v0:{timestamp}:{body}` keyed with the app's signing secret.

use std::time::Duration;

use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

pub const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";
pub const SIGNATURE_HEADER: &str = "x-slack-signature";

const VERSION: &str = "v0";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("Missing header: {0}")]
    MissingHeader(&'static str),

    #[error("Invalid request timestamp")]
    InvalidTimestamp,

    #[error("Request timestamp is {age_secs}s away from now")]
    Stale { age_secs: i64 },

    #[error("Malformed signature")]
    Malformed,

    #[error("Signature mismatch")]
    Mismatch,

    #[error("Signing secret cannot key an HMAC")]
    InvalidSecret,
}

/// Checks inbound requests against the signing secret.
#[derive(Clone)]
pub struct SignatureVerifier {
    secret: String,
    max_age: Duration,
}

impl SignatureVerifier {
    pub fn new(secret: impl Into<String>, max_age: Duration) -> Self {
        Self {
            secret: secret.into(),
            max_age,
        }
    }

    pub fn verify(
        &self,
        headers: &HeaderMap,
        body: &[u8],
        now: DateTime<Utc>,
    ) -> Result<(), SignatureError> {
        let timestamp = header_str(headers, TIMESTAMP_HEADER)?;
        let signature = header_str(headers, SIGNATURE_HEADER)?;

        let sent_at: i64 = timestamp
            .trim()
            .parse()
            .map_err(|_| SignatureError::InvalidTimestamp)?;
        let age_secs = now.timestamp().saturating_sub(sent_at).saturating_abs();
        if age_secs.unsigned_abs() > self.max_age.as_secs() {
            return Err(SignatureError::Stale { age_secs });
        }

        let digest = signature
            .strip_prefix("v0=")
            .and_then(|hex_sig| hex::decode(hex_sig).ok())
            .ok_or(SignatureError::Malformed)?;

        keyed_mac(&self.secret, timestamp, body)?
            .verify_slice(&digest)
            .map_err(|_| SignatureError::Mismatch)
    }
}

/// The `v0=...` signature Slack would send for this timestamp and body.
pub fn compute_signature(
    secret: &str,
    timestamp: &str,
    body: &[u8],
) -> Result<String, SignatureError> {
    let mac = keyed_mac(secret, timestamp, body)?;
    Ok(format!(
        "{}={}",
        VERSION,
        hex::encode(mac.finalize().into_bytes())
    ))
}

/// HMAC over `v0:{timestamp}:{body}`.
fn keyed_mac(secret: &str, timestamp: &str, body: &[u8]) -> Result<HmacSha256, SignatureError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| SignatureError::InvalidSecret)?;
    mac.update(format!("{}:{}:", VERSION, timestamp).as_bytes());
    mac.update(body);
    Ok(mac)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &'static str) -> Result<&'a str, SignatureError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or(SignatureError::MissingHeader(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SECRET: &str = "8f742231b10e8888abcd99yyyzzz85a5";

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_531_420_618, 0).unwrap()
    }

    fn headers(timestamp: &str, signature: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(TIMESTAMP_HEADER, timestamp.parse().unwrap());
        headers.insert(SIGNATURE_HEADER, signature.parse().unwrap());
        headers
    }

    fn verifier() -> SignatureVerifier {
        SignatureVerifier::new(SECRET, Duration::from_secs(300))
    }

    #[test]
    fn test_slack_documented_example() {
        let body = b"token=xyzz0WbapA4vBCDEFasx0q6G&team_id=T1DC2JH3J&team_domain=testteamnow&channel_id=G8PSS9T3V&channel_name=foobar&user_id=U2CERLKJA&user_name=roadrunner&command=%2Fwebhook-collect&text=&response_url=https%3A%2F%2Fhooks.slack.com%2Fcommands%2FT1DC2JH3J%2F397700885554%2F96rGlfmibIGlgcZRskXaIFfN&trigger_id=398738663015.47445629121.803a0bc887a14d10d2c447fce8b6703c";
        let expected = "v0=a2114d57b48eac39b9ad189dd8316235a7b4a8d21a10bd27519666489c69b503";

        assert_eq!(compute_signature(SECRET, "1531420618", body).unwrap(), expected);
        assert_eq!(
            verifier().verify(&headers("1531420618", expected), body, now()),
            Ok(())
        );
    }

    #[test]
    fn test_rejects_tampered_body() {
        let signature = compute_signature(SECRET, "1531420618", b"{\"a\":1}").unwrap();
        assert_eq!(
            verifier().verify(&headers("1531420618", &signature), b"{\"a\":2}", now()),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn test_rejects_wrong_secret() {
        let signature = compute_signature("other-secret", "1531420618", b"{}").unwrap();
        assert_eq!(
            verifier().verify(&headers("1531420618", &signature), b"{}", now()),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn test_rejects_stale_request() {
        let sent = (now().timestamp() - 301).to_string();
        let signature = compute_signature(SECRET, &sent, b"{}").unwrap();
        assert_eq!(
            verifier().verify(&headers(&sent, &signature), b"{}", now()),
            Err(SignatureError::Stale { age_secs: 301 })
        );
    }

    #[test]
    fn test_accepts_request_at_window_edge() {
        let sent = (now().timestamp() - 300).to_string();
        let signature = compute_signature(SECRET, &sent, b"{}").unwrap();
        assert!(verifier()
            .verify(&headers(&sent, &signature), b"{}", now())
            .is_ok());
    }

    #[test]
    fn test_missing_headers() {
        assert_eq!(
            verifier().verify(&HeaderMap::new(), b"{}", now()),
            Err(SignatureError::MissingHeader(TIMESTAMP_HEADER))
        );

        let mut only_ts = HeaderMap::new();
        only_ts.insert(TIMESTAMP_HEADER, "1531420618".parse().unwrap());
        assert_eq!(
            verifier().verify(&only_ts, b"{}", now()),
            Err(SignatureError::MissingHeader(SIGNATURE_HEADER))
        );
    }

    #[test]
    fn test_malformed_values() {
        assert_eq!(
            verifier().verify(&headers("yesterday", "v0=00"), b"{}", now()),
            Err(SignatureError::InvalidTimestamp)
        );
        assert_eq!(
            verifier().verify(&headers("1531420618", "deadbeef"), b"{}", now()),
            Err(SignatureError::Malformed)
        );
        assert_eq!(
            verifier().verify(&headers("1531420618", "v0=not-hex"), b"{}", now()),
            Err(SignatureError::Malformed)
        );
    }

    #[test]
    fn test_empty_secret_still_signs() {
        let signature = compute_signature("", "1531420618", b"{}").unwrap();
        assert!(signature.starts_with("v0="));
        assert_eq!(signature.len(), 3 + 64);
        assert_eq!(
            SignatureVerifier::new("", Duration::from_secs(300))
                .verify(&headers("1531420618", &signature), b"{}", now()),
            Ok(())
        );
    }
}
