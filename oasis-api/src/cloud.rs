//! Cloud service client for track metadata
//!
//! The vendor cloud enriches tracks with display metadata (title, author,
//! artwork). It is an entirely separate connection from the device transport:
//! its own HTTP client, its own failure domain. Nothing here is required for
//! device control.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::client::ClientConfig;
use crate::error::{ApiError, Result};

/// Default base URL of the vendor cloud service
pub const CLOUD_BASE_URL: &str = "https://app.grounded.so";

/// Display metadata for one track
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackMetadata {
    pub id: u32,
    pub name: String,
    pub author: Option<String>,
    pub image: Option<String>,
}

impl TrackMetadata {
    /// Placeholder metadata for a track the cloud does not know
    pub fn unknown(id: u32) -> Self {
        Self {
            id,
            name: format!("Unknown Title (#{id})"),
            author: None,
            image: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CloudTrack {
    id: u32,
    name: String,
    #[serde(default)]
    author: Option<CloudAuthor>,
    #[serde(default)]
    image: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CloudAuthor {
    #[serde(default)]
    person: Option<CloudPerson>,
}

#[derive(Debug, Deserialize)]
struct CloudPerson {
    #[serde(default)]
    name: Option<String>,
}

impl From<CloudTrack> for TrackMetadata {
    fn from(track: CloudTrack) -> Self {
        Self {
            id: track.id,
            name: track.name,
            author: track
                .author
                .and_then(|a| a.person)
                .and_then(|p| p.name),
            image: track.image,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TrackPage {
    #[serde(default)]
    data: Vec<CloudTrack>,
    #[serde(default)]
    next_page_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: String,
}

/// Metadata lookup seam
///
/// The enricher depends on this trait rather than the concrete client so
/// tests can simulate cloud outages.
#[async_trait]
pub trait CloudApi: Send + Sync {
    /// Fetch metadata for the given track ids
    async fn tracks(&self, ids: &[u32]) -> Result<Vec<TrackMetadata>>;
}

/// Credential-authenticated client for the vendor cloud
#[derive(Debug, Clone)]
pub struct CloudClient {
    base_url: String,
    http: reqwest::Client,
    token: Option<String>,
}

impl CloudClient {
    /// Create a client against the default cloud endpoint
    pub fn new(token: Option<String>) -> Result<Self> {
        Self::with_config(CLOUD_BASE_URL, token, ClientConfig::default())
    }

    /// Create a client with an explicit base URL and timeouts
    pub fn with_config(
        base_url: impl Into<String>,
        token: Option<String>,
        config: ClientConfig,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.read_timeout)
            .build()
            .map_err(|e| ApiError::Connection(e.to_string()))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
            token,
        })
    }

    /// Current access token, if any
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn bearer(&self) -> Result<&str> {
        self.token.as_deref().ok_or(ApiError::Auth)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        match response.status() {
            status if status.is_success() => Ok(response),
            reqwest::StatusCode::UNAUTHORIZED => Err(ApiError::Auth),
            status => Err(ApiError::Protocol(format!("HTTP {status}"))),
        }
    }

    /// Log in with cloud credentials, storing and returning the access token
    pub async fn login(&mut self, email: &str, password: &str) -> Result<String> {
        let response = self
            .http
            .post(self.endpoint("api/auth/login"))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;
        let login: LoginResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::Protocol(e.to_string()))?;
        self.token = Some(login.access_token.clone());
        Ok(login.access_token)
    }

    /// Invalidate the current session server-side
    pub async fn logout(&mut self) -> Result<()> {
        let token = self.bearer()?.to_string();
        let response = self
            .http
            .get(self.endpoint("api/auth/logout"))
            .bearer_auth(token)
            .send()
            .await?;
        Self::check(response).await?;
        self.token = None;
        Ok(())
    }

    /// Fetch metadata for one track
    ///
    /// A 404 yields placeholder metadata rather than an error: the track id
    /// is valid for the device even when the cloud has never heard of it.
    pub async fn track(&self, id: u32) -> Result<TrackMetadata> {
        let response = self
            .http
            .get(self.endpoint(&format!("api/track/{id}")))
            .bearer_auth(self.bearer()?)
            .send()
            .await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(TrackMetadata::unknown(id));
        }
        let track: CloudTrack = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::Protocol(e.to_string()))?;
        Ok(track.into())
    }

    /// Fetch the latest published software version details
    ///
    /// The payload shape is vendor-defined, so it is returned as raw JSON.
    pub async fn latest_software(&self) -> Result<serde_json::Value> {
        let response = self
            .http
            .get(self.endpoint("api/software/last-version"))
            .bearer_auth(self.bearer()?)
            .send()
            .await?;
        Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::Protocol(e.to_string()))
    }
}

#[async_trait]
impl CloudApi for CloudClient {
    async fn tracks(&self, ids: &[u32]) -> Result<Vec<TrackMetadata>> {
        let token = self.bearer()?.to_string();
        let query: Vec<(&str, String)> =
            ids.iter().map(|id| ("ids[]", id.to_string())).collect();
        let response = self
            .http
            .get(self.endpoint("api/track"))
            .query(&query)
            .bearer_auth(&token)
            .send()
            .await?;
        let mut page: TrackPage = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::Protocol(e.to_string()))?;

        let mut tracks: Vec<TrackMetadata> =
            page.data.drain(..).map(TrackMetadata::from).collect();
        while let Some(next) = page.next_page_url.take() {
            debug!("following track page {next}");
            let response = self.http.get(&next).bearer_auth(&token).send().await?;
            page = Self::check(response)
                .await?
                .json()
                .await
                .map_err(|e| ApiError::Protocol(e.to_string()))?;
            tracks.extend(page.data.drain(..).map(TrackMetadata::from));
        }
        Ok(tracks)
    }
}
