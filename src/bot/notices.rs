//! Content of the status notice posted per relay attempt.
//!
//! The handler posts one placeholder and later edits it in place; the text
//! and embed construction live here as pure helpers so they stay testable
//! without a gateway connection. Full diagnostic detail never appears in
//! these notices, only in the local log.

use serenity::builder::{CreateEmbed, EditMessage};
use serenity::model::Timestamp;

use crate::thehax::UploadOutcome;

/// Placeholder posted when an upload attempt begins.
pub const UPLOADING: &str = "📤 Uploading replay to TheHax, hold on…";

/// Generic notice for transport-level failures.
pub const UPLOAD_FAILED: &str = "❌ Failed to upload the replay to TheHax. Try again later.";

const SUCCESS_TITLE: &str = "📽️ New replay uploaded";
const SUCCESS_COLOUR: u32 = 0x0057_F287;

/// Edit that resolves the placeholder for a finished attempt.
#[must_use]
pub fn resolution(outcome: &UploadOutcome) -> EditMessage {
    match outcome {
        UploadOutcome::Success { url } => {
            EditMessage::new().content("").embed(success_embed(url))
        }
        UploadOutcome::RemoteError { message } => {
            EditMessage::new().content(remote_error_text(message))
        }
        UploadOutcome::TransportError { .. } => EditMessage::new().content(UPLOAD_FAILED),
    }
}

fn success_embed(url: &str) -> CreateEmbed {
    CreateEmbed::new()
        .title(SUCCESS_TITLE)
        .description(format!("[Click here to watch the replay]({url})"))
        .colour(SUCCESS_COLOUR)
        .timestamp(Timestamp::now())
}

/// Short user-facing text for an explicit service rejection.
#[must_use]
pub fn remote_error_text(message: &str) -> String {
    format!("❌ TheHax rejected the replay: {message}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_error_text_carries_service_message() {
        let text = remote_error_text("guest upload limit reached");
        assert!(text.contains("guest upload limit reached"));
        assert!(text.starts_with('❌'));
    }
}
