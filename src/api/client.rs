use futures::Stream;
use futures::TryStreamExt;
use reqwest::Client;
use thiserror::Error;
use url::Url;

use super::models::{ApiConfig, PlaylistInfoResponse};
use crate::domain::Video;

const PLAYLIST_INFO_PATH: &str = "api/playlist-info";
const DOWNLOAD_VIDEO_PATH: &str = "api/download-video";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Invalid service URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Video ID is empty")]
    EmptyVideoId,
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Clone)]
pub struct ApiClient {
    config: ApiConfig,
    http: Client,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    /// Resolve an endpoint path against the configured base URL.
    /// A base without a trailing slash is treated as a directory.
    fn endpoint(&self, path: &str) -> Result<Url> {
        let mut base = self.config.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        Ok(Url::parse(&base)?.join(path)?)
    }

    /// Resolve a playlist URL into its list of videos.
    pub async fn fetch_playlist_info(&self, playlist_url: &str) -> Result<Vec<Video>> {
        let endpoint = self.endpoint(PLAYLIST_INFO_PATH)?;

        let response = self
            .http
            .get(endpoint)
            .query(&[("url", playlist_url)])
            .send()
            .await?
            .error_for_status()
            .map_err(|e| ApiError::ApiError(format!("Playlist request failed: {}", e)))?;

        let json: PlaylistInfoResponse = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("JSON decode error: {}", e)))?;

        Ok(json.videos)
    }

    /// Build the URL serving the raw bytes of one video.
    pub fn download_url(&self, video_id: &str) -> Result<Url> {
        if video_id.trim().is_empty() {
            return Err(ApiError::EmptyVideoId);
        }

        let mut url = self.endpoint(DOWNLOAD_VIDEO_PATH)?;
        url.query_pairs_mut().append_pair("video_id", video_id);
        Ok(url)
    }

    /// Fetch the image bytes behind a video's thumbnail URL.
    pub async fn fetch_thumbnail(&self, thumbnail_url: &str) -> Result<bytes::Bytes> {
        let response = self
            .http
            .get(thumbnail_url)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| ApiError::ApiError(format!("Thumbnail request failed: {}", e)))?;

        Ok(response.bytes().await?)
    }

    /// Download file with progress stream
    /// Returns (total_size, stream)
    pub async fn download_file_stream(
        &self,
        download_url: &str,
    ) -> Result<(Option<u64>, impl Stream<Item = Result<bytes::Bytes>>)> {
        let response = self
            .http
            .get(download_url)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| ApiError::ApiError(format!("Download request failed: {}", e)))?;

        let total_size = response.content_length();
        let stream = response.bytes_stream().map_err(ApiError::RequestError);

        Ok((total_size, stream))
    }
}
