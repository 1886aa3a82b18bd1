use std::{collections::HashMap, path::PathBuf, sync::Arc};

use iced::{widget::image, Task};
use log::{info, warn};
use tokio_util::sync::CancellationToken;

use crate::{
    api::ApiClient,
    application::{
        fetch_playlist, DispatchReport, DownloadCoordinator, DownloadDispatcher, FetchOutcome,
        FetchTicket, PlaylistSession,
    },
    config::Config,
    domain::{AppError, DownloadRequest, Video},
    ui::{PlaylistMessage, PlaylistView},
};

const FETCH_FAILED: &str = "Failed to fetch playlist. Please check the URL and try again.";

pub struct PlaylistApp {
    view: PlaylistView,
    session: PlaylistSession,
    api_client: ApiClient,
    coordinator: DownloadCoordinator,
    dispatcher: DownloadDispatcher,
    // Decoded thumbnails by video id
    thumbnails: HashMap<String, image::Handle>,
    // Parent of every running batch; replaced after each stop
    batch_cancel: CancellationToken,
}

impl Default for PlaylistApp {
    fn default() -> Self {
        let config = Config::load().unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Config::new()
        });
        Self::new(config)
    }
}

impl PlaylistApp {
    pub fn new(config: Config) -> Self {
        let api_client = ApiClient::new(config.api_config());
        let coordinator = DownloadCoordinator::new(api_client.clone(), config.resolved_download_dir());
        let dispatcher = DownloadDispatcher::new(
            api_client.clone(),
            Arc::new(coordinator.clone()),
            config.download_delay(),
        );

        Self {
            view: PlaylistView::default(),
            session: PlaylistSession::new(config.fetch_policy),
            api_client,
            coordinator,
            dispatcher,
            thumbnails: HashMap::new(),
            batch_cancel: CancellationToken::new(),
        }
    }

    fn set_download_dir(&mut self, dir: PathBuf) {
        info!("Saving downloads to {}", dir.display());
        self.coordinator = DownloadCoordinator::new(self.api_client.clone(), dir);
        self.dispatcher = DownloadDispatcher::new(
            self.api_client.clone(),
            Arc::new(self.coordinator.clone()),
            self.dispatcher.delay(),
        );
    }

    /// (video id, thumbnail URL) pairs of listed videos with no cached image.
    fn missing_thumbnails(&self) -> Vec<(String, String)> {
        self.session
            .videos()
            .iter()
            .filter(|video| !video.thumbnail_url.trim().is_empty())
            .filter(|video| !self.thumbnails.contains_key(&video.id))
            .map(|video| (video.id.clone(), video.thumbnail_url.clone()))
            .collect()
    }

    fn load_thumbnails(&mut self) -> Task<Message> {
        let session = &self.session;
        self.thumbnails
            .retain(|id, _| session.videos().iter().any(|video| &video.id == id));

        Task::batch(self.missing_thumbnails().into_iter().map(|(id, url)| {
            let api_client = self.api_client.clone();
            Task::perform(
                async move {
                    let result = api_client
                        .fetch_thumbnail(&url)
                        .await
                        .map_err(|e| AppError::Fetch(e.to_string()));
                    (id, result)
                },
                |(id, result)| Message::ThumbnailLoaded(id, result),
            )
        }))
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    UiMessage(PlaylistMessage),
    PlaylistFetched(FetchTicket, Result<Vec<Video>, AppError>),
    ThumbnailLoaded(String, Result<bytes::Bytes, AppError>),
    DownloadTriggered(Result<DownloadRequest, AppError>),
    BatchFinished(DispatchReport),
    FolderSelected(Option<PathBuf>),
    NotificationClosed,
}

pub fn update(app: &mut PlaylistApp, message: Message) -> Task<Message> {
    match message {
        Message::UiMessage(ui_msg) => return handle_ui(app, ui_msg),
        Message::PlaylistFetched(ticket, result) => {
            match app.session.finish_fetch(ticket, result) {
                FetchOutcome::Loaded(count) => {
                    app.view.status_message = format!("Loaded {} videos", count);
                    return app.load_thumbnails();
                }
                FetchOutcome::Failed(e) => {
                    app.view.status_message = e.to_string();
                    return Task::perform(
                        async move {
                            rfd::AsyncMessageDialog::new()
                                .set_level(rfd::MessageLevel::Error)
                                .set_title("Playlist Downloader")
                                .set_description(FETCH_FAILED)
                                .set_buttons(rfd::MessageButtons::Ok)
                                .show()
                                .await;
                        },
                        |_| Message::NotificationClosed,
                    );
                }
                FetchOutcome::Superseded => {}
            }
        }
        Message::ThumbnailLoaded(id, Ok(bytes)) => {
            if app.session.videos().iter().any(|video| video.id == id) {
                app.thumbnails.insert(id, image::Handle::from_bytes(bytes));
            }
        }
        Message::ThumbnailLoaded(id, Err(e)) => {
            warn!("No thumbnail for {}: {}", id, e);
        }
        Message::DownloadTriggered(result) => match result {
            Ok(request) => {
                app.view.status_message = format!("Downloading {}", request.suggested_filename);
            }
            Err(e) => {
                app.view.status_message = e.to_string();
            }
        },
        Message::BatchFinished(report) => {
            app.view.status_message = if report.cancelled {
                format!("Stopped after {} downloads", report.triggered)
            } else {
                format!("Started {} downloads", report.triggered)
            };
        }
        Message::FolderSelected(Some(dir)) => app.set_download_dir(dir),
        Message::FolderSelected(None) | Message::NotificationClosed => {}
    }
    Task::none()
}

fn handle_ui(app: &mut PlaylistApp, message: PlaylistMessage) -> Task<Message> {
    match message {
        PlaylistMessage::UrlChanged(url) => app.session.set_playlist_url(url),
        PlaylistMessage::FetchPressed => {
            let url = app.session.playlist_url().to_string();
            if let Some(ticket) = app.session.begin_fetch(&url) {
                app.view.status_message = "Fetching playlist...".to_string();
                let api_client = app.api_client.clone();

                // iced Task::perform runs in the background tokio executor
                return Task::perform(
                    async move {
                        let result = fetch_playlist(&api_client, &ticket).await;
                        (ticket, result)
                    },
                    |(ticket, result)| Message::PlaylistFetched(ticket, result),
                );
            }
        }
        PlaylistMessage::VideoToggled(id) => app.session.toggle_video(&id),
        PlaylistMessage::SelectAllToggled => app.session.select_all(),
        PlaylistMessage::ClearSelectionPressed => app.session.select_none(),
        PlaylistMessage::DownloadPressed(id) => {
            let title = app
                .session
                .videos()
                .iter()
                .find(|video| video.id == id)
                .map(|video| video.title.clone());

            if let Some(title) = title {
                let dispatcher = app.dispatcher.clone();
                return Task::perform(
                    async move { dispatcher.download_one(&id, &title) },
                    Message::DownloadTriggered,
                );
            }
        }
        PlaylistMessage::DownloadSelectedPressed => {
            if !app.session.selection().is_empty() {
                app.view.status_message =
                    format!("Downloading {} selected videos...", app.session.selection().len());
                let batch = app
                    .dispatcher
                    .download_selected(&app.session, app.batch_cancel.child_token());
                return Task::perform(batch, Message::BatchFinished);
            }
        }
        PlaylistMessage::DownloadAllPressed => {
            if !app.session.videos().is_empty() {
                app.view.status_message =
                    format!("Downloading all {} videos...", app.session.videos().len());
                let batch = app
                    .dispatcher
                    .download_all(&app.session, app.batch_cancel.child_token());
                return Task::perform(batch, Message::BatchFinished);
            }
        }
        PlaylistMessage::StopDownloadsPressed => {
            app.batch_cancel.cancel();
            app.batch_cancel = CancellationToken::new();
        }
        PlaylistMessage::ChooseFolderPressed => {
            let coordinator = app.coordinator.clone();
            return Task::perform(
                async move { coordinator.choose_download_dir().await },
                Message::FolderSelected,
            );
        }
    }
    Task::none()
}

pub fn view(app: &PlaylistApp) -> iced::Element<'_, Message> {
    app.view
        .view(&app.session, &app.thumbnails, app.coordinator.download_dir())
        .map(Message::UiMessage)
}
