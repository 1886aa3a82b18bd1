pub mod error;
pub mod model;
pub mod selection;

pub use error::AppError;
pub use model::{DownloadRequest, DownloadTarget, FetchPolicy, FetchState, Video};
pub use selection::Selection;
