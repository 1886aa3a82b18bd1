use std::{future::Future, sync::Arc, time::Duration};

use log::{debug, info, warn};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::{
    api::ApiClient,
    application::session::PlaylistSession,
    domain::{AppError, DownloadRequest, DownloadTarget},
    utils::suggested_filename,
};

/// Pause between two consecutive triggers of a batch.
pub const DEFAULT_DOWNLOAD_DELAY: Duration = Duration::from_millis(2000);

/// Side effect that saves one video to disk.
///
/// Must return without waiting for the transfer; whatever happens to the
/// transfer afterwards is invisible to the dispatcher.
pub trait DownloadTrigger: Send + Sync {
    fn trigger(&self, request: DownloadRequest);
}

/// Summary of one batch walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub triggered: usize,
    pub rejected: usize,
    /// The walk stopped before reaching the end of the batch.
    pub cancelled: bool,
}

#[derive(Clone)]
pub struct DownloadDispatcher {
    api_client: ApiClient,
    trigger: Arc<dyn DownloadTrigger>,
    delay: Duration,
}

impl DownloadDispatcher {
    pub fn new(api_client: ApiClient, trigger: Arc<dyn DownloadTrigger>, delay: Duration) -> Self {
        Self {
            api_client,
            trigger,
            delay,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Hand one video to the trigger and return right away.
    pub fn download_one(&self, video_id: &str, title: &str) -> Result<DownloadRequest, AppError> {
        let url = self
            .api_client
            .download_url(video_id)
            .map_err(|e| AppError::InvalidVideoId(video_id.to_string(), e.to_string()))?;

        let request = DownloadRequest {
            video_id: video_id.to_string(),
            title: title.to_string(),
            download_url: url.to_string(),
            suggested_filename: suggested_filename(title),
        };

        info!("Triggering download of {} as {}", video_id, request.suggested_filename);
        self.trigger.trigger(request.clone());
        Ok(request)
    }

    /// Trigger every target in order, sleeping for the configured delay
    /// between two triggers. There is no delay after the last one.
    ///
    /// Cancelling `cancel` stops the walk at its next pause; targets already
    /// triggered are not affected.
    pub async fn download_many(
        &self,
        targets: Vec<DownloadTarget>,
        cancel: CancellationToken,
    ) -> DispatchReport {
        let total = targets.len();
        let mut report = DispatchReport::default();
        info!("Dispatching {} downloads, {:?} apart", total, self.delay);

        for (index, target) in targets.iter().enumerate() {
            if cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }

            debug!("Dispatching {}/{}: {}", index + 1, total, target.video_id);
            match self.download_one(&target.video_id, &target.title) {
                Ok(_) => report.triggered += 1,
                Err(e) => {
                    warn!("Skipping {}: {}", target.video_id, e);
                    report.rejected += 1;
                }
            }

            if index + 1 < total {
                tokio::select! {
                    _ = sleep(self.delay) => {}
                    _ = cancel.cancelled() => {
                        report.cancelled = true;
                        break;
                    }
                }
            }
        }

        if report.cancelled {
            info!(
                "Batch cancelled after {} of {} downloads",
                report.triggered + report.rejected,
                total
            );
        } else {
            info!("Batch finished: {} of {} downloads triggered", report.triggered, total);
        }
        report
    }

    /// Dispatch the selected videos in playlist order.
    ///
    /// The batch is taken from `session` when this is called, so the session
    /// stays free to change while the returned future paces through it.
    pub fn download_selected(
        &self,
        session: &PlaylistSession,
        cancel: CancellationToken,
    ) -> impl Future<Output = DispatchReport> + Send + 'static {
        let targets = session.selected_videos().map(DownloadTarget::from).collect();
        self.spawn_batch(targets, cancel)
    }

    /// Dispatch every video of the playlist in order.
    pub fn download_all(
        &self,
        session: &PlaylistSession,
        cancel: CancellationToken,
    ) -> impl Future<Output = DispatchReport> + Send + 'static {
        let targets = session.videos().iter().map(DownloadTarget::from).collect();
        self.spawn_batch(targets, cancel)
    }

    fn spawn_batch(
        &self,
        targets: Vec<DownloadTarget>,
        cancel: CancellationToken,
    ) -> impl Future<Output = DispatchReport> + Send + 'static {
        let dispatcher = self.clone();
        async move { dispatcher.download_many(targets, cancel).await }
    }
}
