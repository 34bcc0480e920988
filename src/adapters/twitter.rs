//! Twitter API v2 adapter for the social poster port.
//!
//! The v2 tweet endpoint still authenticates with OAuth 1.0a user context:
//! an HMAC-SHA1 signature over the method, URL, and oauth parameters. The
//! JSON request body is not part of the signature base string.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use rand::Rng;
use secrecy::ExposeSecret;
use serde::Deserialize;
use sha1::Sha1;
use tracing::debug;

use crate::config::SocialConfig;
use crate::ports::{PostReceipt, SocialError, SocialPoster};

const TWEETS_URL: &str = "https://api.twitter.com/2/tweets";

pub struct TwitterPoster {
    client: reqwest::Client,
    config: SocialConfig,
}

impl TwitterPoster {
    pub fn new(config: SocialConfig) -> Result<Self, SocialError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| SocialError::network(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn authorization_header(&self, method: &str, url: &str, timestamp: u64, nonce: &str) -> String {
        let mut params: Vec<(String, String)> = vec![
            ("oauth_consumer_key".into(), self.config.consumer_key.clone()),
            ("oauth_nonce".into(), nonce.to_string()),
            ("oauth_signature_method".into(), "HMAC-SHA1".into()),
            ("oauth_timestamp".into(), timestamp.to_string()),
            ("oauth_token".into(), self.config.access_token.clone()),
            ("oauth_version".into(), "1.0".into()),
        ];
        params.sort();

        let param_string = params
            .iter()
            .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        let base_string = format!(
            "{method}&{}&{}",
            percent_encode(url),
            percent_encode(&param_string)
        );
        let signing_key = format!(
            "{}&{}",
            percent_encode(self.config.consumer_secret.expose_secret()),
            percent_encode(self.config.access_token_secret.expose_secret())
        );

        let signature = sign(&signing_key, &base_string);
        params.push(("oauth_signature".into(), signature));
        params.sort();

        let fields = params
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
            .collect::<Vec<_>>()
            .join(", ");
        format!("OAuth {fields}")
    }
}

#[async_trait]
impl SocialPoster for TwitterPoster {
    async fn post(&self, text: &str) -> Result<PostReceipt, SocialError> {
        let timestamp = chrono::Utc::now().timestamp() as u64;
        let nonce = random_nonce();
        let authorization = self.authorization_header("POST", TWEETS_URL, timestamp, &nonce);

        let response = self
            .client
            .post(TWEETS_URL)
            .header(reqwest::header::AUTHORIZATION, authorization)
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await
            .map_err(|e| SocialError::network(e.to_string()))?;

        let status = response.status();
        if status != reqwest::StatusCode::CREATED {
            let message = response.text().await.unwrap_or_default();
            return Err(SocialError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: TweetResponse = response
            .json()
            .await
            .map_err(|e| SocialError::parse(e.to_string()))?;
        debug!(id = %parsed.data.id, "tweet created");
        Ok(PostReceipt {
            id: parsed.data.id,
        })
    }
}

fn sign(key: &str, base_string: &str) -> String {
    // Key length is unbounded for HMAC, so this cannot fail.
    let mut mac = Hmac::<Sha1>::new_from_slice(key.as_bytes())
        .unwrap_or_else(|_| unreachable!("hmac accepts any key length"));
    mac.update(base_string.as_bytes());
    BASE64.encode(mac.finalize().into_bytes())
}

/// RFC 3986 percent encoding: only unreserved characters pass through.
fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

fn random_nonce() -> String {
    let mut rng = rand::thread_rng();
    (0..16).map(|_| format!("{:02x}", rng.gen::<u8>())).collect()
}

#[derive(Deserialize)]
struct TweetResponse {
    data: TweetData,
}

#[derive(Deserialize)]
struct TweetData {
    id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::Secret;

    fn config() -> SocialConfig {
        SocialConfig {
            consumer_key: "ck".into(),
            consumer_secret: Secret::new("cs".into()),
            access_token: "at".into(),
            access_token_secret: Secret::new("ats".into()),
        }
    }

    #[test]
    fn percent_encoding_is_rfc3986() {
        assert_eq!(percent_encode("abc-123_~."), "abc-123_~.");
        assert_eq!(percent_encode("a b"), "a%20b");
        assert_eq!(percent_encode("a&b=c"), "a%26b%3Dc");
        assert_eq!(percent_encode("é"), "%C3%A9");
        assert_eq!(percent_encode("/"), "%2F");
    }

    #[test]
    fn nonce_is_32_hex_chars() {
        let nonce = random_nonce();
        assert_eq!(nonce.len(), 32);
        assert!(nonce.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn signature_is_base64_of_sha1_length() {
        // HMAC-SHA1 output is 20 bytes; base64 of that is 28 chars.
        assert_eq!(sign("cs&ats", "POST&x&y").len(), 28);
    }

    #[test]
    fn authorization_header_carries_all_oauth_fields() {
        let poster = TwitterPoster::new(config()).unwrap();
        let header = poster.authorization_header("POST", TWEETS_URL, 1_700_000_000, "abcd1234");

        assert!(header.starts_with("OAuth "));
        for field in [
            "oauth_consumer_key=\"ck\"",
            "oauth_nonce=\"abcd1234\"",
            "oauth_signature_method=\"HMAC-SHA1\"",
            "oauth_timestamp=\"1700000000\"",
            "oauth_token=\"at\"",
            "oauth_version=\"1.0\"",
            "oauth_signature=\"",
        ] {
            assert!(header.contains(field), "missing {field} in {header}");
        }
    }

    #[test]
    fn authorization_header_is_deterministic_for_fixed_inputs() {
        let poster = TwitterPoster::new(config()).unwrap();
        let a = poster.authorization_header("POST", TWEETS_URL, 1_700_000_000, "n");
        let b = poster.authorization_header("POST", TWEETS_URL, 1_700_000_000, "n");
        assert_eq!(a, b);
    }
}
