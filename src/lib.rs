//! Discord bot that relays `.hbr2` replay attachments to the TheHax replay
//! host and reports the resulting link back as an embed.
//!
//! The interesting part lives in [`thehax`]: a cookie-backed session with
//! CSRF form login, rate-limited re-authentication, and a multipart upload
//! whose heterogeneous responses are classified into a stable outcome type.
//! The Discord side ([`bot`]) is a thin event filter plus a status message
//! that gets edited in place once the upload resolves.

pub mod bot;
pub mod config;
pub mod thehax;
