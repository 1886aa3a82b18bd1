pub mod dispatcher;
pub mod download_coordinator;
pub mod session;

pub use dispatcher::{DispatchReport, DownloadDispatcher, DownloadTrigger, DEFAULT_DOWNLOAD_DELAY};
pub use download_coordinator::DownloadCoordinator;
pub use session::{fetch_playlist, FetchOutcome, FetchTicket, PlaylistSession};
