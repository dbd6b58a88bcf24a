//! Client for the TheHax replay hosting service.
//!
//! One [`Session`] (shared cookie jar plus rate-limited login) is created at
//! startup and reused by every upload attempt; the [`Uploader`] fetches the
//! source attachment, pushes the multipart form through that session, and
//! classifies whatever the service answers into an [`UploadOutcome`].

pub mod response;
pub mod session;
pub mod upload;

pub use response::{classify, UploadOutcome};
pub use session::{Credentials, LoginOutcome, Session};
pub use upload::{UploadRequest, Uploader};

use thiserror::Error;

pub(crate) const SERVICE_ORIGIN: &str = "https://replay.thehax.pl";
pub(crate) const UPLOAD_URL: &str = "https://replay.thehax.pl/api/upload";
pub(crate) const UPLOAD_PAGE_URL: &str = "https://replay.thehax.pl/upload";
pub(crate) const LOGIN_URL: &str = "https://replay.thehax.pl/login";

/// Some CDNs and the upload endpoint's bot heuristics want a browser-like UA.
pub(crate) const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; DiscordBot/1.0; +https://discordapp.com)";

/// Errors produced while preparing an upload attempt.
///
/// The upload call itself never returns an error; every response, including
/// transport failures, is folded into an [`UploadOutcome`].
#[derive(Debug, Error)]
pub enum UploadError {
    /// The shared HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
    /// Fetching the source attachment failed at the network level.
    #[error("failed to download attachment: {0}")]
    Download(#[source] reqwest::Error),
    /// The attachment host answered with a non-success status.
    #[error("attachment download returned status {status}")]
    DownloadStatus {
        /// HTTP status code returned by the attachment host.
        status: u16,
    },
}

impl UploadError {
    /// HTTP status attached to this error, when one was received.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::DownloadStatus { status } => Some(*status),
            Self::Client(e) | Self::Download(e) => e.status().map(|s| s.as_u16()),
        }
    }
}
