use serde::{Deserialize, Serialize};

use crate::domain::Video;

/// Response from the /api/playlist-info endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaylistInfoResponse {
    pub videos: Vec<Video>,
}

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_playlist_info() {
        let body = r#"{
            "videos": [
                {"id": "v1", "title": "One", "url": "https://youtu.be/v1", "thumbnail": "t1", "playlistTitle": "Mix"},
                {"id": "v2", "title": "Two", "thumbnailUrl": "t2"}
            ]
        }"#;

        let response: PlaylistInfoResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.videos.len(), 2);
        assert_eq!(response.videos[0].thumbnail_url, "t1");
        assert_eq!(response.videos[0].playlist_title.as_deref(), Some("Mix"));
        assert_eq!(response.videos[1].thumbnail_url, "t2");
        assert!(response.videos[1].playlist_title.is_none());
        assert!(response.videos[1].url.is_none());
    }

    #[test]
    fn test_missing_videos_is_an_error() {
        let result = serde_json::from_str::<PlaylistInfoResponse>(r#"{"detail": "boom"}"#);
        assert!(result.is_err());
    }
}
