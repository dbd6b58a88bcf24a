//! Discord event handler: the relay orchestrator.
//!
//! Per accepted message the flow is placeholder → download → (login) →
//! upload → edit the same placeholder with the result. Every failure inside
//! one attempt is converted into that single edited notice; nothing here is
//! allowed to take the process down, and a failed notice delivery is only
//! logged.

use std::sync::{Arc, OnceLock};

use serenity::async_trait;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::model::id::ChannelId;
use serenity::prelude::{Context, EventHandler};
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::thehax::response::snippet;
use crate::thehax::{UploadOutcome, UploadRequest, Uploader};

use super::notices;
use super::trigger::{self, AttachmentRef, InboundMessage};

/// Serenity event handler holding the shared upload pipeline.
pub struct Handler {
    uploader: Uploader,
    settings: Arc<Settings>,
    own_id: OnceLock<u64>,
}

impl Handler {
    /// Creates the handler around the shared uploader.
    #[must_use]
    pub fn new(uploader: Uploader, settings: Arc<Settings>) -> Self {
        Self {
            uploader,
            settings,
            own_id: OnceLock::new(),
        }
    }

    fn own_id(&self) -> Option<u64> {
        self.own_id.get().copied()
    }

    /// Runs one relay attempt and edits the placeholder exactly once.
    async fn relay(&self, ctx: &Context, channel_id: ChannelId, replay: &AttachmentRef) {
        info!(name = %replay.name, size = replay.size, "relaying replay attachment");

        let mut notice = match channel_id.say(&ctx.http, notices::UPLOADING).await {
            Ok(message) => message,
            Err(e) => {
                // Without the placeholder there is nowhere to report into
                warn!("failed to post status notice: {e}");
                return;
            }
        };

        let outcome = self.run_attempt(replay).await;
        if let Err(e) = notice.edit(&ctx.http, notices::resolution(&outcome)).await {
            warn!("failed to edit status notice: {e}");
        }
    }

    async fn run_attempt(&self, replay: &AttachmentRef) -> UploadOutcome {
        let bytes = match self.uploader.download(&replay.url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("attachment download failed: {e}");
                return UploadOutcome::TransportError {
                    status: e.status(),
                    body_snippet: snippet(&e.to_string()),
                };
            }
        };
        debug!(bytes = bytes.len(), "attachment downloaded");

        let request = UploadRequest {
            bytes,
            filename: Some(replay.name.clone()),
            private: self.settings.private_uploads(),
            api_key: self.settings.thehax_api_key.clone(),
            tenant_key: self.settings.thehax_tenant_key.clone(),
        };
        let outcome = self.uploader.upload(request).await;

        match &outcome {
            UploadOutcome::Success { url } => info!(%url, "replay uploaded"),
            UploadOutcome::RemoteError { message } => {
                warn!("TheHax rejected the upload: {message}");
            }
            UploadOutcome::TransportError {
                status,
                body_snippet,
            } => warn!(?status, body = %body_snippet, "upload transport failure"),
        }
        outcome
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        let _ = self.own_id.set(ready.user.id.get());
        info!("Discord bot connected as {}", ready.user.name);
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.guild_id.is_some() {
            debug!(
                channel = %msg.channel_id,
                attachments = msg.attachments.len(),
                webhook = msg.webhook_id.is_some(),
                "guild message"
            );
        }

        let attachments: Vec<AttachmentRef> = msg
            .attachments
            .iter()
            .map(|a| AttachmentRef {
                name: a.filename.clone(),
                size: u64::from(a.size),
                url: a.url.clone(),
            })
            .collect();
        let view = InboundMessage {
            in_guild: msg.guild_id.is_some(),
            author_id: msg.author.id.get(),
            author_is_bot: msg.author.bot,
            via_webhook: msg.webhook_id.is_some(),
            attachments: &attachments,
        };

        let Some(replay) = trigger::select_replay(&view, self.own_id()) else {
            return;
        };
        self.relay(&ctx, msg.channel_id, replay).await;
    }
}
