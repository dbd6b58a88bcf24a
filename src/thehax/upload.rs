//! Attachment download and multipart upload to the TheHax API.

use std::sync::Arc;

use reqwest::header;
use reqwest::multipart::{Form, Part};
use tracing::{debug, warn};

use super::response::{classify, snippet, UploadOutcome};
use super::session::{Session, REQUEST_TIMEOUT};
use super::{UploadError, BROWSER_USER_AGENT, SERVICE_ORIGIN, UPLOAD_PAGE_URL, UPLOAD_URL};

/// Filename assumed when the attachment carries none.
pub const DEFAULT_FILENAME: &str = "replay.hbr2";

/// One replay to push to the service. Built per attempt, never reused.
#[derive(Debug)]
pub struct UploadRequest {
    /// Raw replay file content.
    pub bytes: Vec<u8>,
    /// Original attachment filename, when known.
    pub filename: Option<String>,
    /// Whether the hosted replay should be private.
    pub private: bool,
    /// Opaque API key forwarded to the service.
    pub api_key: Option<String>,
    /// Opaque tenant key forwarded to the service.
    pub tenant_key: Option<String>,
}

/// Uploads replays through a shared [`Session`].
pub struct Uploader {
    session: Arc<Session>,
    download_client: reqwest::Client,
}

impl Uploader {
    /// Creates the uploader with its own plain client for CDN downloads.
    ///
    /// Downloads do not go through the session client: the CDN is a
    /// different host that may redirect, while the session client keeps
    /// redirects disabled for login classification.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::Client`] if the download client cannot be
    /// built.
    pub fn new(session: Arc<Session>) -> Result<Self, UploadError> {
        let download_client = reqwest::Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            session,
            download_client,
        })
    }

    /// Fetches the source attachment bytes.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::Download`] on network failure and
    /// [`UploadError::DownloadStatus`] when the host answers non-2xx.
    pub async fn download(&self, url: &str) -> Result<Vec<u8>, UploadError> {
        let response = self
            .download_client
            .get(url)
            .send()
            .await
            .map_err(UploadError::Download)?;

        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::DownloadStatus {
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(UploadError::Download)?;
        Ok(bytes.to_vec())
    }

    /// Pushes one replay to the service and classifies the answer.
    ///
    /// Logs in first when credentials are configured (failure there is
    /// non-fatal). Statuses in [200, 500) are treated as received responses
    /// so error bodies can be inspected; network failures and 5xx become
    /// [`UploadOutcome::TransportError`].
    pub async fn upload(&self, request: UploadRequest) -> UploadOutcome {
        self.session.ensure_authenticated().await;

        let filename = request
            .filename
            .clone()
            .unwrap_or_else(|| DEFAULT_FILENAME.to_string());
        let name = display_name(&filename).to_string();

        let mut form = match build_form(request.bytes, &filename, name, request.private) {
            Ok(form) => form,
            Err(e) => {
                return UploadOutcome::TransportError {
                    status: None,
                    body_snippet: snippet(&e.to_string()),
                }
            }
        };

        let mut req = self
            .session
            .client()
            .post(UPLOAD_URL)
            .header(header::ACCEPT, "application/json")
            .header(header::ORIGIN, SERVICE_ORIGIN)
            .header(header::REFERER, UPLOAD_PAGE_URL);

        // The service's expected credential header names are undocumented,
        // so each key goes out under both plausible names plus a form field.
        // Unknown headers and fields are ignored server-side.
        if let Some(key) = &request.api_key {
            req = req
                .header(header::AUTHORIZATION, format!("Bearer {key}"))
                .header("X-Api-Key", key);
            form = form.text("apiKey", key.clone());
        }
        if let Some(key) = &request.tenant_key {
            req = req.header("X-Tenant-Key", key).header("X-Tenant", key);
            form = form.text("tenantKey", key.clone());
        }

        let response = match req.multipart(form).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("upload request failed: {e}");
                return UploadOutcome::TransportError {
                    status: e.status().map(|s| s.as_u16()),
                    body_snippet: snippet(&e.to_string()),
                };
            }
        };

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), body = %snippet(&body), "TheHax answered");

        if status.is_server_error() {
            return UploadOutcome::TransportError {
                status: Some(status.as_u16()),
                body_snippet: snippet(&body),
            };
        }
        classify(Some(status.as_u16()), &body)
    }
}

fn build_form(
    bytes: Vec<u8>,
    filename: &str,
    name: String,
    private: bool,
) -> Result<Form, reqwest::Error> {
    let content = Part::bytes(bytes)
        .file_name(filename.to_string())
        .mime_str("application/octet-stream")?;

    Ok(Form::new()
        .part("replay[fileContent]", content)
        .text("replay[name]", name)
        .text("replay[private]", if private { "1" } else { "0" }))
}

/// Strips the final extension to produce the display name the service shows.
///
/// A filename without an extension passes through unchanged.
#[must_use]
pub fn display_name(filename: &str) -> &str {
    match filename.rfind('.') {
        Some(idx) if idx > 0 => &filename[..idx],
        _ => filename,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_strips_final_extension() {
        assert_eq!(display_name("match.hbr2"), "match");
        assert_eq!(display_name("season.final.hbr2"), "season.final");
    }

    #[test]
    fn display_name_passes_through_without_extension() {
        assert_eq!(display_name("match"), "match");
        assert_eq!(display_name(".hidden"), ".hidden");
    }

    #[test]
    fn default_filename_derives_default_display_name() {
        assert_eq!(display_name(DEFAULT_FILENAME), "replay");
    }
}
