//! HTTP client for the tracker's fragment endpoints.

use std::time::Duration;

use crate::error::{Error, Result};

/// A trip-recording control action on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripAction {
    Start,
    Stop,
}

impl TripAction {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
        }
    }
}

/// Client for one tracker device.
///
/// Fragment fetches deliberately carry no request timeout: the page this
/// replaces had none either, and the next scheduled tick is the de facto
/// retry. Reachability detection is the probe's job, not the client's.
#[derive(Debug, Clone)]
pub struct TrackerClient {
    http: reqwest::Client,
    base_url: String,
}

fn build_http_client() -> std::result::Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .pool_idle_timeout(Duration::from_secs(60))
        .pool_max_idle_per_host(2)
        .tcp_keepalive(Duration::from_secs(30))
        .build()
}

impl TrackerClient {
    /// Creates a client for the tracker at `base_url`.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            http: build_http_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_fragment(&self, path: &str) -> Result<String> {
        let response = self.http.get(format!("{}{path}", self.base_url)).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::BadStatus(status));
        }
        Ok(response.text().await?)
    }

    /// Fetches the main status fragment (`GET /data`).
    ///
    /// # Errors
    /// Any transport failure or non-2xx response; callers treat both as
    /// the same network failure.
    pub async fn fetch_status(&self) -> Result<String> {
        self.get_fragment("/data").await
    }

    /// Fetches the download-list fragment (`GET /downloads`).
    ///
    /// # Errors
    /// Any transport failure or non-2xx response.
    pub async fn fetch_downloads(&self) -> Result<String> {
        self.get_fragment("/downloads").await
    }

    async fn post_action(&self, path: &str) -> Result<()> {
        let response = self.http.post(format!("{}{path}", self.base_url)).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::BadStatus(status));
        }
        Ok(())
    }

    /// Starts trip recording on the device (`POST /start`).
    ///
    /// # Errors
    /// Any transport failure or non-2xx response.
    pub async fn start_trip(&self) -> Result<()> {
        self.post_action("/start").await
    }

    /// Stops trip recording on the device (`POST /stop`).
    ///
    /// # Errors
    /// Any transport failure or non-2xx response.
    pub async fn stop_trip(&self) -> Result<()> {
        self.post_action("/stop").await
    }
}
