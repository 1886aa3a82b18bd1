use std::collections::HashSet;

use log::{debug, info, warn};

use crate::{
    api::ApiClient,
    domain::{AppError, FetchPolicy, FetchState, Selection, Video},
};

/// A fetch that has been started and whose result has not been applied yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    seq: u64,
    url: String,
}

impl FetchTicket {
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// The playlist was replaced with this many videos.
    Loaded(usize),
    /// The fetch failed; the previous playlist is still in place.
    Failed(AppError),
    /// A newer fetch superseded this one and its response was dropped.
    Superseded,
}

/// Everything the window shows: the playlist, what is checked and whether a
/// fetch is running. Only the operations below mutate it.
#[derive(Debug, Default)]
pub struct PlaylistSession {
    playlist_url: String,
    videos: Vec<Video>,
    selection: Selection,
    loading: bool,
    last_result: Option<Result<(), AppError>>,
    policy: FetchPolicy,
    issued: u64,
}

impl PlaylistSession {
    pub fn new(policy: FetchPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn playlist_url(&self) -> &str {
        &self.playlist_url
    }

    pub fn set_playlist_url(&mut self, url: impl Into<String>) {
        self.playlist_url = url.into();
    }

    pub fn videos(&self) -> &[Video] {
        &self.videos
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn fetch_state(&self) -> FetchState {
        if self.loading {
            return FetchState::Loading;
        }
        match self.last_result {
            None => FetchState::Idle,
            Some(Ok(())) => FetchState::Success,
            Some(Err(_)) => FetchState::Error,
        }
    }

    /// Whether the "no videos found" message applies: a URL was typed, nothing
    /// is loaded and no fetch is running.
    pub fn shows_no_results(&self) -> bool {
        !self.loading && self.videos.is_empty() && !self.playlist_url.is_empty()
    }

    /// Title of the loaded playlist, taken from its first entry.
    pub fn playlist_title(&self) -> Option<&str> {
        self.videos.first()?.playlist_title.as_deref()
    }

    /// Videos whose ids are selected, in playlist order.
    pub fn selected_videos(&self) -> impl Iterator<Item = &Video> {
        self.videos
            .iter()
            .filter(move |video| self.selection.has(&video.id))
    }

    /// Toggle one video. Ids not in the current playlist are ignored.
    pub fn toggle_video(&mut self, id: &str) {
        if self.videos.iter().any(|video| video.id == id) {
            self.selection.toggle(id);
        } else {
            debug!("Ignoring toggle for unknown video {}", id);
        }
    }

    pub fn select_all(&mut self) {
        self.selection
            .select_all(self.videos.iter().map(|video| video.id.as_str()));
    }

    pub fn select_none(&mut self) {
        self.selection.clear();
    }

    /// Start a fetch. Returns `None` without touching any state when the URL
    /// is blank.
    pub fn begin_fetch(&mut self, url: &str) -> Option<FetchTicket> {
        let url = url.trim();
        if url.is_empty() {
            return None;
        }

        self.issued += 1;
        self.loading = true;
        info!("Fetching playlist {} (request #{})", url, self.issued);

        Some(FetchTicket {
            seq: self.issued,
            url: url.to_string(),
        })
    }

    /// Apply the result of a fetch started with [`begin_fetch`].
    ///
    /// On success the playlist is replaced and the selection cleared in one
    /// step. On failure the previous playlist is kept.
    ///
    /// [`begin_fetch`]: PlaylistSession::begin_fetch
    pub fn finish_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<Video>, AppError>,
    ) -> FetchOutcome {
        if self.policy == FetchPolicy::LatestRequestOnly && ticket.seq != self.issued {
            debug!(
                "Dropping response of request #{} superseded by #{}",
                ticket.seq, self.issued
            );
            return FetchOutcome::Superseded;
        }

        let outcome = match result {
            Ok(videos) => {
                self.videos = dedup_by_id(videos);
                self.selection.clear();
                self.last_result = Some(Ok(()));
                info!(
                    "Loaded {} videos for request #{}",
                    self.videos.len(),
                    ticket.seq
                );
                FetchOutcome::Loaded(self.videos.len())
            }
            Err(e) => {
                warn!("Request #{} failed: {}", ticket.seq, e);
                self.last_result = Some(Err(e.clone()));
                FetchOutcome::Failed(e)
            }
        };

        self.loading = false;
        outcome
    }
}

/// Run the network half of a fetch started with
/// [`PlaylistSession::begin_fetch`]. Its result goes to `finish_fetch`.
pub async fn fetch_playlist(
    client: &ApiClient,
    ticket: &FetchTicket,
) -> Result<Vec<Video>, AppError> {
    client
        .fetch_playlist_info(ticket.url())
        .await
        .map_err(|e| AppError::Fetch(e.to_string()))
}

fn dedup_by_id(videos: Vec<Video>) -> Vec<Video> {
    let mut seen = HashSet::new();
    videos
        .into_iter()
        .filter(|video| {
            let fresh = seen.insert(video.id.clone());
            if !fresh {
                warn!("Dropping duplicate video id {}", video.id);
            }
            fresh
        })
        .collect()
}
