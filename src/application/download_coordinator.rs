use std::{
    io,
    path::{Path, PathBuf},
};

use futures::{stream::BoxStream, StreamExt};
use log::{error, info, trace, warn};
use tokio::{fs::OpenOptions, io::AsyncWriteExt};

use crate::{
    api::ApiClient,
    application::DownloadTrigger,
    domain::{AppError, DownloadRequest},
};

/// Upper bound on " (n)" suffixes tried before giving up on a file name.
const MAX_NAME_ATTEMPTS: u32 = 1000;

#[derive(Debug, Clone)]
pub enum DownloadEvent {
    Progress(f32),
    Completed(PathBuf),
    Failed(AppError),
}

/// Saves videos into a download directory, one background task per video.
#[derive(Clone)]
pub struct DownloadCoordinator {
    api_client: ApiClient,
    download_dir: PathBuf,
}

impl DownloadCoordinator {
    pub fn new(api_client: ApiClient, download_dir: PathBuf) -> Self {
        Self {
            api_client,
            download_dir,
        }
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    pub async fn choose_download_dir(&self) -> Option<PathBuf> {
        rfd::AsyncFileDialog::new()
            .set_directory(&self.download_dir)
            .pick_folder()
            .await
            .map(|handle| handle.path().to_path_buf())
    }

    pub fn download_stream(&self, request: DownloadRequest) -> BoxStream<'static, DownloadEvent> {
        futures::stream::unfold(
            DownloadRuntimeState::Start {
                client: self.api_client.clone(),
                url: request.download_url,
                dir: self.download_dir.clone(),
                filename: request.suggested_filename,
            },
            |state| async move {
                match state {
                    DownloadRuntimeState::Start {
                        client,
                        url,
                        dir,
                        filename,
                    } => {
                        let (file, path) = match create_unique_file(&dir, &filename).await {
                            Ok(created) => created,
                            Err(e) => {
                                return Some((
                                    DownloadEvent::Failed(AppError::Io(format!(
                                        "Failed to create file: {}",
                                        e
                                    ))),
                                    DownloadRuntimeState::Finished,
                                ));
                            }
                        };

                        match client.download_file_stream(&url).await {
                            Ok((total_size, stream)) => Some((
                                DownloadEvent::Progress(0.0),
                                DownloadRuntimeState::Downloading {
                                    file,
                                    stream: stream.boxed(),
                                    downloaded: 0,
                                    total: total_size,
                                    path,
                                },
                            )),
                            Err(e) => Some((
                                abort(&path, e.to_string()).await,
                                DownloadRuntimeState::Finished,
                            )),
                        }
                    }
                    DownloadRuntimeState::Downloading {
                        mut file,
                        mut stream,
                        mut downloaded,
                        total,
                        path,
                    } => match stream.next().await {
                        Some(Ok(chunk)) => {
                            if let Err(e) = file.write_all(&chunk).await {
                                drop(file);
                                return Some((
                                    abort(&path, format!("Write error: {}", e)).await,
                                    DownloadRuntimeState::Finished,
                                ));
                            }

                            downloaded += chunk.len() as u64;

                            let progress = match total {
                                Some(total_size) if total_size > 0 => {
                                    downloaded as f32 / total_size as f32
                                }
                                _ => 0.0,
                            };

                            Some((
                                DownloadEvent::Progress(progress),
                                DownloadRuntimeState::Downloading {
                                    file,
                                    stream,
                                    downloaded,
                                    total,
                                    path,
                                },
                            ))
                        }
                        Some(Err(e)) => {
                            drop(file);
                            Some((
                                abort(&path, e.to_string()).await,
                                DownloadRuntimeState::Finished,
                            ))
                        }
                        None => {
                            if let Err(e) = file.sync_all().await {
                                drop(file);
                                return Some((
                                    abort(&path, format!("Failed to sync file: {}", e)).await,
                                    DownloadRuntimeState::Finished,
                                ));
                            }

                            Some((
                                DownloadEvent::Completed(path),
                                DownloadRuntimeState::Finished,
                            ))
                        }
                    },
                    DownloadRuntimeState::Finished => None,
                }
            },
        )
        .boxed()
    }
}

impl DownloadTrigger for DownloadCoordinator {
    fn trigger(&self, request: DownloadRequest) {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                error!("Cannot start download of {}: {}", request.video_id, e);
                return;
            }
        };

        let video_id = request.video_id.clone();
        let mut events = self.download_stream(request);
        runtime.spawn(async move {
            while let Some(event) = events.next().await {
                match event {
                    DownloadEvent::Progress(progress) => {
                        trace!("{}: {:.1}%", video_id, progress * 100.0)
                    }
                    DownloadEvent::Completed(path) => {
                        info!("Saved {} to {}", video_id, path.display())
                    }
                    DownloadEvent::Failed(e) => warn!("Download of {} failed: {}", video_id, e),
                }
            }
        });
    }
}

enum DownloadRuntimeState {
    Start {
        client: ApiClient,
        url: String,
        dir: PathBuf,
        filename: String,
    },
    Downloading {
        file: tokio::fs::File,
        stream: BoxStream<'static, crate::api::Result<bytes::Bytes>>,
        downloaded: u64,
        total: Option<u64>,
        path: PathBuf,
    },
    Finished,
}

/// Create `filename` in `dir`, or "name (n).ext" when the name is taken.
async fn create_unique_file(dir: &Path, filename: &str) -> io::Result<(tokio::fs::File, PathBuf)> {
    tokio::fs::create_dir_all(dir).await?;

    let name = Path::new(filename);
    let stem = name
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| filename.to_string());
    let extension = name
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    for attempt in 0..MAX_NAME_ATTEMPTS {
        let candidate = if attempt == 0 {
            filename.to_string()
        } else {
            format!("{} ({}){}", stem, attempt, extension)
        };
        let path = dir.join(candidate);

        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => return Ok((file, path)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e),
        }
    }

    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("no free file name for {}", filename),
    ))
}

/// Remove the partial file of a failed transfer and report the failure.
async fn abort(path: &Path, reason: String) -> DownloadEvent {
    if let Err(e) = tokio::fs::remove_file(path).await {
        warn!("Could not remove partial file {}: {}", path.display(), e);
    }
    DownloadEvent::Failed(AppError::Io(reason))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiConfig;
    use mockito::Matcher;

    fn coordinator(base_url: &str, dir: &Path) -> DownloadCoordinator {
        let api_client = ApiClient::new(ApiConfig {
            base_url: base_url.to_string(),
        });
        DownloadCoordinator::new(api_client, dir.to_path_buf())
    }

    fn request(base_url: &str, id: &str, filename: &str) -> DownloadRequest {
        DownloadRequest {
            video_id: id.to_string(),
            title: id.to_string(),
            download_url: format!("{}/api/download-video?video_id={}", base_url, id),
            suggested_filename: filename.to_string(),
        }
    }

    async fn last_event(coordinator: &DownloadCoordinator, request: DownloadRequest) -> DownloadEvent {
        let events: Vec<DownloadEvent> = coordinator.download_stream(request).collect().await;
        events.last().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_create_unique_file_adds_suffix() {
        let dir = tempfile::tempdir().unwrap();

        let (_, first) = create_unique_file(dir.path(), "One.mp4").await.unwrap();
        let (_, second) = create_unique_file(dir.path(), "One.mp4").await.unwrap();
        let (_, third) = create_unique_file(dir.path(), "One.mp4").await.unwrap();

        assert_eq!(first, dir.path().join("One.mp4"));
        assert_eq!(second, dir.path().join("One (1).mp4"));
        assert_eq!(third, dir.path().join("One (2).mp4"));
    }

    #[tokio::test]
    async fn test_abort_removes_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let (mut file, path) = create_unique_file(dir.path(), "Half.mp4").await.unwrap();
        file.write_all(b"half").await.unwrap();
        drop(file);

        let event = abort(&path, "Failed to sync file: disk full".to_string()).await;

        assert!(matches!(event, DownloadEvent::Failed(AppError::Io(ref msg)) if msg.contains("sync")));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_download_stream_saves_file() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/download-video")
            .match_query(Matcher::UrlEncoded("video_id".into(), "v1".into()))
            .with_status(200)
            .with_body("video-bytes")
            .create_async()
            .await;
        let dir = tempfile::tempdir().unwrap();
        let coordinator = coordinator(&server.url(), dir.path());

        let event = last_event(&coordinator, request(&server.url(), "v1", "One.mp4")).await;

        let saved = dir.path().join("One.mp4");
        assert!(matches!(event, DownloadEvent::Completed(ref path) if *path == saved));
        assert_eq!(std::fs::read(&saved).unwrap(), b"video-bytes");
    }

    #[tokio::test]
    async fn test_download_stream_failure_removes_file() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/download-video")
            .match_query(Matcher::Any)
            .with_status(404)
            .create_async()
            .await;
        let dir = tempfile::tempdir().unwrap();
        let coordinator = coordinator(&server.url(), dir.path());

        let event = last_event(&coordinator, request(&server.url(), "gone", "Gone.mp4")).await;

        assert!(matches!(event, DownloadEvent::Failed(AppError::Io(_))));
        assert!(!dir.path().join("Gone.mp4").exists());
    }

    #[tokio::test]
    async fn test_trigger_saves_in_background() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/download-video")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("abc")
            .create_async()
            .await;
        let dir = tempfile::tempdir().unwrap();
        let coordinator = coordinator(&server.url(), dir.path());

        coordinator.trigger(request(&server.url(), "v1", "One.mp4"));

        let saved = dir.path().join("One.mp4");
        for _ in 0..100 {
            if std::fs::read(&saved).map(|b| b == b"abc").unwrap_or(false) {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        assert_eq!(std::fs::read(&saved).unwrap(), b"abc");
    }

    #[test]
    fn test_trigger_outside_runtime_does_not_panic() {
        let dir = tempfile::tempdir().unwrap();
        let coordinator = coordinator("http://127.0.0.1:1", dir.path());

        coordinator.trigger(request("http://127.0.0.1:1", "v1", "One.mp4"));

        assert!(!dir.path().join("One.mp4").exists());
    }
}
