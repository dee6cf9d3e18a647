//! Download configurations and feed fetching.
//!
//! A [`DownloadConfig`] is one row of the feed catalog: where a feed lives
//! and how to authenticate against it. Auth values name keys into a
//! secrets map and are substituted at request-build time, so catalog
//! snapshots never contain credentials.

use std::collections::BTreeMap;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use bytes::Bytes;
use chrono::{DateTime, FixedOffset};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{GtfsError, Result};
use crate::extract::{FeedExtract, RealtimeFeedExtract, ScheduleFeedExtract};
use crate::feed_type::FeedType;

// Some feed servers refuse requests without a browser user agent.
pub const USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.12; rv:55.0) Gecko/20100101 Firefox/55.0";

const TIMEOUT_SECONDS: u64 = 60;

/// A client configured for feed fetching: shared pool, one-minute timeout.
pub fn http_client() -> Result<Client> {
    let client = Client::builder()
        .timeout(std::time::Duration::from_secs(TIMEOUT_SECONDS))
        .build()?;
    Ok(client)
}

/// One catalog row: a named feed URL plus its auth references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadConfig {
    pub name: String,
    pub url: String,
    pub feed_type: FeedType,
    /// Query parameter name -> secret key.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub auth_query_params: BTreeMap<String, String>,
    /// Header name -> secret key.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub auth_headers: BTreeMap<String, String>,
}

impl DownloadConfig {
    /// URL-safe base64 (with padding) of the feed URL; used as a partition
    /// value since raw URLs contain slashes.
    pub fn base64_url(&self) -> String {
        base64_url(&self.url)
    }
}

pub fn base64_url(url: &str) -> String {
    URL_SAFE.encode(url.as_bytes())
}

/// Inverse of [`base64_url`], for turning partition values back into URLs.
pub fn decode_base64_url(encoded: &str) -> Result<String> {
    let invalid = || GtfsError::InvalidEncodedUrl {
        value: encoded.to_string(),
    };
    let bytes = URL_SAFE.decode(encoded).map_err(|_| invalid())?;
    String::from_utf8(bytes).map_err(|_| invalid())
}

/// Build the GET request for a config, substituting secrets into auth
/// query parameters and headers. Fails fast on a bad URL or an auth value
/// naming a secret the map does not hold.
pub fn build_request(
    client: &Client,
    config: &DownloadConfig,
    secrets: &BTreeMap<String, String>,
) -> Result<reqwest::RequestBuilder> {
    let url = Url::parse(&config.url).map_err(|_| GtfsError::InvalidUrl {
        url: config.url.clone(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(GtfsError::InvalidUrl {
            url: config.url.clone(),
        });
    }

    let lookup = |secret_key: &String| {
        secrets
            .get(secret_key)
            .cloned()
            .ok_or_else(|| GtfsError::MissingSecret {
                key: secret_key.clone(),
            })
    };

    let mut request = client
        .get(url)
        .header(reqwest::header::USER_AGENT, USER_AGENT);

    if !config.auth_query_params.is_empty() {
        let mut params = Vec::with_capacity(config.auth_query_params.len());
        for (param, secret_key) in &config.auth_query_params {
            params.push((param.clone(), lookup(secret_key)?));
        }
        request = request.query(&params);
    }
    for (header, secret_key) in &config.auth_headers {
        request = request.header(header.as_str(), lookup(secret_key)?);
    }
    Ok(request)
}

fn disposition_filename(header: &str) -> Option<String> {
    // Observed shapes: `attachment; filename=feed.zip`, a bare
    // `filename=feed.zip`, and quoted variants of both.
    for part in header.split(';') {
        if let Some(rest) = part.trim().strip_prefix("filename=") {
            let name = rest.trim().trim_matches('"').trim();
            if !name.is_empty() {
                return Some(name.to_string());
            }
        }
    }
    None
}

/// Pick the artifact filename for a download: the content-disposition
/// name when the server sent one, else the URL basename when it is a zip,
/// else the literal `feed`.
pub fn derive_filename(disposition: Option<&str>, url: &Url) -> String {
    if let Some(name) = disposition.and_then(disposition_filename) {
        return name;
    }
    if url.path().ends_with(".zip") {
        if let Some(last) = url.path_segments().and_then(|mut s| s.next_back()) {
            return last.to_string();
        }
    }
    "feed".to_string()
}

/// Fetch one feed and wrap the response in the extract record for its
/// kind. The destination bucket comes from the per-dataset environment
/// variables; the response URL (after redirects) drives the filename.
pub async fn download_feed(
    client: &Client,
    config: &DownloadConfig,
    secrets: &BTreeMap<String, String>,
    ts: DateTime<FixedOffset>,
) -> Result<(FeedExtract, Bytes)> {
    let request = build_request(client, config, secrets)?;

    diagnostics::log_info!(
        "Downloading feed {name}",
        name: config.name.clone()
    );
    let response = request.send().await?.error_for_status()?;

    let response_code = response.status().as_u16();
    let final_url = response.url().clone();
    let mut response_headers = BTreeMap::new();
    for (name, value) in response.headers() {
        if let Ok(text) = value.to_str() {
            response_headers.insert(name.to_string(), text.to_string());
        }
    }
    let disposition = response_headers.get("content-disposition").cloned();
    let content = response.bytes().await?;

    let filename = derive_filename(disposition.as_deref(), &final_url);
    let extract = if config.feed_type.is_realtime() {
        let bucket = artifacts::config::rt_raw_bucket()?;
        FeedExtract::Realtime(RealtimeFeedExtract::new(
            bucket,
            filename,
            ts,
            config.clone(),
            response_code,
            response_headers,
        )?)
    } else {
        let bucket = artifacts::config::schedule_raw_bucket()?;
        FeedExtract::Schedule(ScheduleFeedExtract::new(
            bucket,
            filename,
            ts,
            config.clone(),
            response_code,
            response_headers,
        )?)
    };
    Ok((extract, content))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule_config() -> DownloadConfig {
        DownloadConfig {
            name: "Example Transit".to_string(),
            url: "https://example.com/gtfs/feed.zip".to_string(),
            feed_type: FeedType::Schedule,
            auth_query_params: BTreeMap::new(),
            auth_headers: BTreeMap::new(),
        }
    }

    fn secrets() -> BTreeMap<String, String> {
        BTreeMap::from([("example_api_key".to_string(), "s3cret".to_string())])
    }

    #[test]
    fn test_base64_url_round_trip() {
        let encoded = base64_url("https://ridemvgo.org/gtfs");
        assert_eq!(encoded, "aHR0cHM6Ly9yaWRlbXZnby5vcmcvZ3Rmcw==");
        assert_eq!(
            decode_base64_url(&encoded).unwrap(),
            "https://ridemvgo.org/gtfs"
        );
    }

    #[test]
    fn test_decode_base64_url_rejects_junk() {
        assert!(decode_base64_url("!!!").is_err());
    }

    #[test]
    fn test_build_request_sets_user_agent() {
        let client = Client::new();
        let request = build_request(&client, &schedule_config(), &secrets())
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(
            request.headers()[reqwest::header::USER_AGENT],
            USER_AGENT
        );
        assert_eq!(request.url().as_str(), "https://example.com/gtfs/feed.zip");
    }

    #[test]
    fn test_build_request_substitutes_query_param_secret() {
        let mut config = schedule_config();
        config
            .auth_query_params
            .insert("api_key".to_string(), "example_api_key".to_string());

        let client = Client::new();
        let request = build_request(&client, &config, &secrets())
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(
            request.url().as_str(),
            "https://example.com/gtfs/feed.zip?api_key=s3cret"
        );
    }

    #[test]
    fn test_build_request_substitutes_header_secret() {
        let mut config = schedule_config();
        config
            .auth_headers
            .insert("Authorization".to_string(), "example_api_key".to_string());

        let client = Client::new();
        let request = build_request(&client, &config, &secrets())
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(request.headers()["Authorization"], "s3cret");
    }

    #[test]
    fn test_build_request_missing_secret_fails() {
        let mut config = schedule_config();
        config
            .auth_headers
            .insert("Authorization".to_string(), "nonexistent".to_string());

        let client = Client::new();
        match build_request(&client, &config, &secrets()) {
            Err(GtfsError::MissingSecret { key }) => assert_eq!(key, "nonexistent"),
            other => panic!("expected missing secret error, got {other:?}"),
        }
    }

    #[test]
    fn test_build_request_rejects_non_http_urls() {
        let mut config = schedule_config();
        config.url = "ftp://example.com/feed.zip".to_string();
        let client = Client::new();
        assert!(matches!(
            build_request(&client, &config, &secrets()),
            Err(GtfsError::InvalidUrl { .. })
        ));

        config.url = "not a url".to_string();
        assert!(matches!(
            build_request(&client, &config, &secrets()),
            Err(GtfsError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_derive_filename_prefers_disposition() {
        let url = Url::parse("https://example.com/download").unwrap();
        assert_eq!(
            derive_filename(Some("attachment; filename=mygtfs.zip"), &url),
            "mygtfs.zip"
        );
        assert_eq!(
            derive_filename(Some("filename=bare.zip"), &url),
            "bare.zip"
        );
        assert_eq!(
            derive_filename(Some("attachment; filename=\"quoted.zip\""), &url),
            "quoted.zip"
        );
    }

    #[test]
    fn test_derive_filename_falls_back_to_zip_basename() {
        let url = Url::parse("https://example.com/static/gtfs.zip").unwrap();
        assert_eq!(derive_filename(None, &url), "gtfs.zip");
        assert_eq!(derive_filename(Some("attachment"), &url), "gtfs.zip");
    }

    #[test]
    fn test_derive_filename_defaults_to_feed() {
        let url = Url::parse("https://example.com/api/gtfs?format=pb").unwrap();
        assert_eq!(derive_filename(None, &url), "feed");
    }
}
