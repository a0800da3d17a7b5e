use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use crate::core::error::{SetupError, SetupResult};

const APP_USER_AGENT: &str = concat!("MinecraftServerSetup/", env!("CARGO_PKG_VERSION"));

/// Build the process-wide HTTP client.
///
/// No request timeout is set: server jars are large and slow links must be
/// tolerated. `identity` encoding keeps `Content-Length` equal to the number of
/// body bytes we stream to disk.
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    let mut default_headers = HeaderMap::new();
    default_headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("identity"));

    Client::builder()
        .user_agent(APP_USER_AGENT)
        .default_headers(default_headers)
        .build()
}

/// Turn a non-2xx response into `SetupError::HttpStatus`.
pub fn check_status(response: Response, url: &str) -> SetupResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    Err(SetupError::HttpStatus {
        url: url.to_string(),
        status: status.as_u16(),
        reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
    })
}

/// GET `url` and decode the JSON body, ignoring fields `T` does not declare.
pub async fn get_json<T: DeserializeOwned>(client: &Client, url: &str) -> SetupResult<T> {
    let response = check_status(client.get(url).send().await?, url)?;
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| {
        SetupError::Parse(format!("Failed to parse response from {url}: {e}"))
    })
}
