//! End-to-end checks over the pure pieces of the relay pipeline: trigger
//! filtering, display-name derivation, and response classification.

use hbr_relay::bot::trigger::{select_replay, AttachmentRef, InboundMessage};
use hbr_relay::thehax::upload::{display_name, DEFAULT_FILENAME};
use hbr_relay::thehax::{classify, UploadOutcome};

fn message_with(names: &[&str]) -> Vec<AttachmentRef> {
    names
        .iter()
        .map(|name| AttachmentRef {
            name: (*name).to_string(),
            size: 4096,
            url: format!("https://cdn.example/{name}"),
        })
        .collect()
}

#[test]
fn accepted_replay_flows_into_upload_naming() {
    let attachments = message_with(&["scoreboard.png", "Grand.Final.HBR2"]);
    let msg = InboundMessage {
        in_guild: true,
        author_id: 1,
        author_is_bot: false,
        via_webhook: false,
        attachments: &attachments,
    };

    let replay = select_replay(&msg, Some(999)).expect("replay accepted");
    assert_eq!(replay.name, "Grand.Final.HBR2");
    assert_eq!(display_name(&replay.name), "Grand.Final");
}

#[test]
fn relayed_webhook_message_is_accepted_but_plain_bot_is_not() {
    let attachments = message_with(&["game.hbr2"]);
    let mut msg = InboundMessage {
        in_guild: true,
        author_id: 2,
        author_is_bot: true,
        via_webhook: true,
        attachments: &attachments,
    };
    assert!(select_replay(&msg, None).is_some());

    msg.via_webhook = false;
    assert!(select_replay(&msg, None).is_none());
}

#[test]
fn fallback_filename_has_a_usable_stem() {
    assert_eq!(display_name(DEFAULT_FILENAME), "replay");
    assert_eq!(display_name("no_extension"), "no_extension");
}

#[test]
fn canonical_service_bodies_classify_cleanly() {
    assert_eq!(
        classify(Some(200), r#"{"success":true,"url":"https://x/y"}"#),
        UploadOutcome::Success {
            url: "https://x/y".to_string()
        }
    );
    assert_eq!(
        classify(Some(200), r#"{"success":false,"message":"limit reached"}"#),
        UploadOutcome::RemoteError {
            message: "limit reached".to_string()
        }
    );
    assert_eq!(
        classify(
            Some(200),
            r#"{"success":false,"errors":[{"message":"a"},{"message":"b"}]}"#
        ),
        UploadOutcome::RemoteError {
            message: "a; b".to_string()
        }
    );
}

#[test]
fn garbage_bodies_become_bounded_transport_errors() {
    let noise = format!("<html>{}</html>", "x".repeat(1000));
    match classify(Some(500), &noise) {
        UploadOutcome::TransportError {
            status,
            body_snippet,
        } => {
            assert_eq!(status, Some(500));
            assert!(body_snippet.chars().count() <= 300);
        }
        other => panic!("expected transport error, got {other:?}"),
    }
}
