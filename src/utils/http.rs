// src/utils/http.rs

//! HTTP client utilities.
//!
//! All requests are blocking and sequential; the remote API is rate-limited
//! and the mirror is expected to run from a scheduler, one invocation at a
//! time.

use std::time::Duration;

use reqwest::blocking::Client;

use crate::error::{AppError, Result};
use crate::models::HttpConfig;

/// Create a configured blocking HTTP client.
pub fn create_client(config: &HttpConfig) -> Result<Client> {
    let client = Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Fetch a URL and return the response body.
///
/// Any non-2xx status is an immediate error; listing fetches are never
/// retried.
pub fn get_text(client: &Client, url: &str) -> Result<String> {
    let response = client.get(url).send()?.error_for_status()?;
    Ok(response.text()?)
}

/// Fetch a URL, retrying immediately on request timeouts.
///
/// Non-timeout failures (including non-2xx statuses) abort at once; when the
/// retry budget is exhausted the last timeout becomes fatal.
pub fn get_text_with_retry(client: &Client, url: &str, max_retries: u32) -> Result<String> {
    for attempt in 1..=max_retries {
        // The body read stays inside the match so a timeout while streaming
        // a large response counts as retryable too.
        match client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.text())
        {
            Ok(body) => return Ok(body),
            Err(e) if e.is_timeout() => {
                log::warn!(
                    "Timeout while retrieving `{}`. Retrying ({}/{})...",
                    url,
                    attempt,
                    max_retries
                );
            }
            Err(e) => return Err(AppError::Http(e)),
        }
    }

    log::error!("Max retries for timeout reached. Failed to retrieve `{url}`.");
    Err(AppError::Timeout {
        url: url.to_string(),
        attempts: max_retries,
    })
}
