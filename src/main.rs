mod api;
mod app;
mod application;
mod config;
mod domain;
mod ui;
mod utils;

fn main() -> iced::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    iced::application(app::PlaylistApp::default, app::update, app::view)
        .title("Playlist Downloader")
        .run()
}
