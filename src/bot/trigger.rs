//! Decides which inbound messages warrant an upload attempt.
//!
//! Pure logic over a gateway-agnostic view of a message; the handler builds
//! the view from serenity types so everything here is testable without a
//! live gateway.

/// File suffix that marks a HaxBall replay, matched case-insensitively.
pub const REPLAY_EXTENSION: &str = ".hbr2";

/// One attachment of an inbound message.
#[derive(Debug, Clone)]
pub struct AttachmentRef {
    /// Attachment filename as reported by the gateway.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// URL the file content can be fetched from.
    pub url: String,
}

/// Gateway-agnostic view of an inbound chat message.
#[derive(Debug)]
pub struct InboundMessage<'a> {
    /// Whether the message was posted inside a guild channel.
    pub in_guild: bool,
    /// Author identity.
    pub author_id: u64,
    /// Whether the author carries the gateway's automated flag.
    pub author_is_bot: bool,
    /// Whether the message originated from a webhook relay.
    pub via_webhook: bool,
    /// Ordered attachments of the message.
    pub attachments: &'a [AttachmentRef],
}

/// Accepts a message by returning its first replay attachment, or rejects
/// it with `None`.
///
/// Rules, in order: direct messages are ignored; the bot's own messages are
/// ignored (its status notices would otherwise loop back through here);
/// webhook relays are allowed even though their author looks automated,
/// while every other bot author is rejected; finally the first attachment
/// with the replay extension wins.
#[must_use]
pub fn select_replay<'a>(
    msg: &InboundMessage<'a>,
    own_id: Option<u64>,
) -> Option<&'a AttachmentRef> {
    if !msg.in_guild {
        return None;
    }
    if own_id == Some(msg.author_id) {
        return None;
    }
    if msg.author_is_bot && !msg.via_webhook {
        return None;
    }
    msg.attachments
        .iter()
        .find(|attachment| has_replay_extension(&attachment.name))
}

/// Whether a filename ends with the replay extension, ignoring case.
#[must_use]
pub fn has_replay_extension(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(REPLAY_EXTENSION)
}
