use serde::{Deserialize, Serialize};

/// One playlist entry as returned by the playlist service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Video {
    pub id: String,
    pub title: String,
    #[serde(default, rename = "thumbnail", alias = "thumbnailUrl")]
    pub thumbnail_url: String,
    #[serde(default, rename = "playlistTitle")]
    pub playlist_title: Option<String>,
    /// Watch page URL, when the service provides it
    #[serde(default)]
    pub url: Option<String>,
}

/// One entry of a batch handed to the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    pub video_id: String,
    pub title: String,
}

impl DownloadTarget {
    pub fn new(video_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            video_id: video_id.into(),
            title: title.into(),
        }
    }
}

impl From<&Video> for DownloadTarget {
    fn from(video: &Video) -> Self {
        Self::new(video.id.clone(), video.title.clone())
    }
}

/// A download that has been handed to the save-to-disk trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub video_id: String,
    pub title: String,
    pub download_url: String,
    pub suggested_filename: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    Idle,
    Loading,
    Success,
    Error,
}

/// How responses of overlapping playlist fetches are applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchPolicy {
    /// Every response is applied in the order it resolves.
    #[default]
    LastResponseWins,
    /// Responses of requests superseded by a newer one are dropped.
    LatestRequestOnly,
}
