use std::{collections::HashMap, path::Path};

use iced::{
    widget::{
        button, checkbox, column, image, row, scrollable, text, text_input, Column, Space,
    },
    Alignment, Element, Length,
};

use crate::{application::PlaylistSession, domain::FetchState};

const EMPTY_STATE: &str = "No videos found. Please check the playlist URL.";
const ROW_THUMBNAIL_WIDTH: f32 = 96.0;
const HEADER_THUMBNAIL_WIDTH: f32 = 160.0;

/// Main view state
pub struct PlaylistView {
    pub status_message: String,
}

impl Default for PlaylistView {
    fn default() -> Self {
        Self {
            status_message: "Paste a playlist URL and press Fetch".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum PlaylistMessage {
    UrlChanged(String),
    FetchPressed,
    VideoToggled(String),
    SelectAllToggled,
    ClearSelectionPressed,
    DownloadPressed(String),
    DownloadSelectedPressed,
    DownloadAllPressed,
    StopDownloadsPressed,
    ChooseFolderPressed,
}

impl PlaylistView {
    pub fn view<'a>(
        &'a self,
        session: &'a PlaylistSession,
        thumbnails: &'a HashMap<String, image::Handle>,
        download_dir: &Path,
    ) -> Element<'a, PlaylistMessage> {
        let loading = session.fetch_state() == FetchState::Loading;
        let can_fetch = !loading && !session.playlist_url().trim().is_empty();

        let url_input = text_input(
            "https://youtube.com/playlist?list=...",
            session.playlist_url(),
        )
        .padding(10);
        let url_input = if loading {
            url_input
        } else {
            url_input
                .on_input(PlaylistMessage::UrlChanged)
                .on_submit(PlaylistMessage::FetchPressed)
        };

        let fetch_button = button(if loading { "Loading..." } else { "Fetch" })
            .on_press_maybe(can_fetch.then_some(PlaylistMessage::FetchPressed))
            .padding([10, 20]);

        let mut content = column![
            text("Playlist Downloader").size(32),
            Space::new().height(Length::Fixed(10.0)),
            text("Playlist URL").size(16),
            row![url_input, fetch_button]
                .spacing(10)
                .align_y(Alignment::Center),
            row![
                text(format!("Saving to {}", download_dir.display())).size(12),
                button("Change folder")
                    .on_press(PlaylistMessage::ChooseFolderPressed)
                    .padding([4, 10]),
            ]
            .spacing(10)
            .align_y(Alignment::Center),
            text(&self.status_message).size(14),
        ]
        .spacing(10);

        let videos = session.videos();
        if !videos.is_empty() {
            let selected = session.selection().len();
            let header = match session.playlist_title() {
                Some(title) => format!("{} ({} videos)", title, videos.len()),
                None => format!("{} videos loaded", videos.len()),
            };

            let header = text(header).size(20);
            let cover = videos
                .first()
                .and_then(|first| thumbnails.get(&first.id))
                .map(|handle| image(handle.clone()).width(Length::Fixed(HEADER_THUMBNAIL_WIDTH)));
            content = match cover {
                Some(cover) => content.push(
                    row![cover, header]
                        .spacing(10)
                        .align_y(Alignment::Center),
                ),
                None => content.push(header),
            };

            content = content.push(
                row![
                    checkbox(selected == videos.len())
                        .on_toggle(|_| PlaylistMessage::SelectAllToggled),
                    text(format!("Select all ({})", videos.len())),
                    Space::new().width(Length::Fill),
                    button("Clear selection").on_press_maybe(
                        (selected > 0).then_some(PlaylistMessage::ClearSelectionPressed)
                    ),
                    button(text(format!("Download Selected ({})", selected)))
                        .on_press_maybe(
                            (selected > 0).then_some(PlaylistMessage::DownloadSelectedPressed)
                        ),
                    button("Download All").on_press(PlaylistMessage::DownloadAllPressed),
                    button("Stop").on_press(PlaylistMessage::StopDownloadsPressed),
                ]
                .spacing(10)
                .align_y(Alignment::Center),
            );

            let rows = videos.iter().enumerate().map(|(index, video)| {
                let thumbnail: Element<'a, PlaylistMessage> = match thumbnails.get(&video.id) {
                    Some(handle) => image(handle.clone())
                        .width(Length::Fixed(ROW_THUMBNAIL_WIDTH))
                        .into(),
                    None => Space::new().width(Length::Fixed(ROW_THUMBNAIL_WIDTH)).into(),
                };

                row![
                    checkbox(session.selection().has(&video.id))
                        .on_toggle(move |_| PlaylistMessage::VideoToggled(video.id.clone())),
                    text(format!("{}", index + 1)).width(Length::Fixed(30.0)),
                    thumbnail,
                    text(&video.title).width(Length::Fill),
                    button("Download")
                        .on_press(PlaylistMessage::DownloadPressed(video.id.clone())),
                ]
                .spacing(10)
                .align_y(Alignment::Center)
                .into()
            });

            content = content.push(scrollable(Column::with_children(rows).spacing(6)));
        } else if session.shows_no_results() {
            content = content.push(text(EMPTY_STATE).size(14));
        }

        content.padding(20).into()
    }
}
