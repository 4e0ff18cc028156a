//! HTTP transport for NWIS requests.
//!
//! The water services ask clients to accept gzip, so every request sends
//! `Accept-Encoding: gzip`. The body is decompressed here only when the
//! response says `Content-Encoding: gzip`, then decoded with the charset
//! named in `Content-Type` (UTF-8 when absent).
//!
//! Query objects talk to the network through the [`Transport`] trait so a
//! test double can stand in for [`HttpTransport`]. Failures are returned as
//! they come; there is no retry here.

use flate2::read::GzDecoder;
use log::{debug, error, info, warn};
use reqwest::header::{HeaderName, ACCEPT_ENCODING, CONTENT_ENCODING, CONTENT_TYPE};
use std::io::Read;

use crate::config::ClientConfig;
use crate::model::{NwisError, Result};

/// An HTTP response before body decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub content_encoding: Option<String>,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl RawResponse {
    /// A 200 response with a plain UTF-8 body.
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            content_encoding: None,
            content_type: Some("text/plain; charset=UTF-8".to_string()),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    fn is_gzip(&self) -> bool {
        self.content_encoding
            .as_deref()
            .is_some_and(|enc| enc.trim().eq_ignore_ascii_case("gzip"))
    }

    /// The `charset` parameter of `Content-Type`, lowercased.
    pub fn charset(&self) -> Option<String> {
        self.content_type.as_deref().and_then(|ct| {
            ct.split(';').skip(1).find_map(|param| {
                let (name, value) = param.split_once('=')?;
                name.trim()
                    .eq_ignore_ascii_case("charset")
                    .then(|| value.trim().trim_matches('"').to_ascii_lowercase())
            })
        })
    }
}

/// Characters of an error response body kept in `NwisError::HttpStatus`.
pub const ERROR_BODY_LIMIT: usize = 512;

/// Something that can perform a blocking GET.
pub trait Transport {
    /// Issues `GET url` with `Accept-Encoding: gzip` and returns the raw
    /// response, whatever its status.
    fn get(&self, url: &str) -> Result<RawResponse>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, url: &str) -> Result<RawResponse> {
        (**self).get(url)
    }
}

/// [`Transport`] over a blocking reqwest client.
///
/// reqwest follows redirects by default. Its own gzip support is left off
/// so `Content-Encoding` reaches [`decode_body`] intact.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .build()?;
        Ok(Self { client })
    }

    /// Wraps an existing client, e.g. one with a proxy configured.
    pub fn with_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<RawResponse> {
        let response = self.client.get(url).header(ACCEPT_ENCODING, "gzip").send()?;

        let header = |name: HeaderName| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let status = response.status().as_u16();
        let content_encoding = header(CONTENT_ENCODING);
        let content_type = header(CONTENT_TYPE);
        let body = response.bytes()?.to_vec();

        Ok(RawResponse {
            status,
            content_encoding,
            content_type,
            body,
        })
    }
}

/// Fetches `url` and returns the decoded body text.
///
/// # Errors
/// - `NwisError::Transport`: the transport failed, or gzip data was corrupt.
/// - `NwisError::HttpStatus`: the server answered with a non-2xx status.
/// - `NwisError::MalformedResponse`: the body is not valid in its charset.
pub fn fetch_text<T: Transport + ?Sized>(transport: &T, url: &str) -> Result<String> {
    info!("Fetching: {}", url);

    let response = transport.get(url)?;
    if !response.is_success() {
        let status = response.status;
        let body = error_body_excerpt(response);
        error!("HTTP {} from {}: {}", status, url, body);
        return Err(NwisError::HttpStatus {
            status,
            url: url.to_string(),
            body,
        });
    }

    let text = decode_body(response)?;
    info!("Received {} characters", text.chars().count());
    Ok(text)
}

/// The first [`ERROR_BODY_LIMIT`] characters of an error response, trimmed.
/// The service explains rejected queries there ("No sites found matching
/// all criteria"). A body that cannot be decoded is read lossily.
fn error_body_excerpt(response: RawResponse) -> String {
    let raw = response.body.clone();
    let text = decode_body(response).unwrap_or_else(|_| String::from_utf8_lossy(&raw).into_owned());
    let trimmed = text.trim();
    match trimmed.char_indices().nth(ERROR_BODY_LIMIT) {
        Some((cut, _)) => format!("{}…", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

/// Gunzips (when flagged) and charset-decodes a response body.
pub fn decode_body(response: RawResponse) -> Result<String> {
    let charset = response.charset();
    let bytes = if response.is_gzip() {
        let mut decompressed = Vec::new();
        GzDecoder::new(response.body.as_slice()).read_to_end(&mut decompressed)?;
        debug!("gzip: {} -> {} bytes", response.body.len(), decompressed.len());
        decompressed
    } else {
        response.body
    };

    decode_charset(bytes, charset.as_deref().unwrap_or("utf-8"))
}

fn decode_charset(bytes: Vec<u8>, charset: &str) -> Result<String> {
    match charset {
        "utf-8" | "utf8" | "us-ascii" | "ascii" => String::from_utf8(bytes).map_err(|e| {
            NwisError::MalformedResponse(format!("body is not valid {}: {}", charset, e))
        }),
        "iso-8859-1" | "latin1" | "latin-1" | "l1" => Ok(bytes.into_iter().map(char::from).collect()),
        other => {
            warn!("unsupported charset '{}'", other);
            Err(NwisError::MalformedResponse(format!(
                "unsupported response charset '{}'",
                other
            )))
        }
    }
}
