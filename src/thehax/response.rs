//! Classification of TheHax upload responses.
//!
//! The service answers with a mix of shapes: a JSON success object, a JSON
//! failure with either a single `message` or an `errors` array, or (behind
//! proxies and rate limiters) arbitrary text. Everything is folded into the
//! three-variant [`UploadOutcome`] so the rest of the bot never inspects raw
//! bodies.

use serde::Deserialize;

/// Maximum characters of response body kept for diagnostics.
const SNIPPET_MAX_CHARS: usize = 300;

/// Outcome of one upload attempt. Exactly one variant per attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The service accepted the replay and returned its public location.
    Success {
        /// URL of the hosted replay.
        url: String,
    },
    /// The service understood the request and explicitly rejected it
    /// (typically guest upload limits). Not worth retrying automatically.
    RemoteError {
        /// Human-readable rejection reason reported by the service.
        message: String,
    },
    /// Network failure, timeout, 5xx, or a body we could not make sense of.
    TransportError {
        /// HTTP status, when a response was received at all.
        status: Option<u16>,
        /// Truncated body (or error text) for the local log.
        body_snippet: String,
    },
}

#[derive(Debug, Deserialize)]
struct ServiceResponse {
    success: Option<bool>,
    url: Option<String>,
    message: Option<String>,
    #[serde(default)]
    errors: Vec<ServiceError>,
}

#[derive(Debug, Deserialize)]
struct ServiceError {
    message: Option<String>,
}

/// Classifies a received response body into an [`UploadOutcome`].
///
/// `status` is carried through into [`UploadOutcome::TransportError`] for
/// diagnostics; it plays no part in the classification itself, which only
/// looks at the body shape.
#[must_use]
pub fn classify(status: Option<u16>, body: &str) -> UploadOutcome {
    let Ok(parsed) = serde_json::from_str::<ServiceResponse>(body) else {
        // Not JSON at all: raw text from a proxy or an HTML error page
        return UploadOutcome::TransportError {
            status,
            body_snippet: snippet(body),
        };
    };

    match (parsed.success, parsed.url) {
        (Some(true), Some(url)) => UploadOutcome::Success { url },
        (Some(false), _) => reject_outcome(parsed.message, &parsed.errors, status, body),
        _ => UploadOutcome::TransportError {
            status,
            body_snippet: snippet(body),
        },
    }
}

fn reject_outcome(
    message: Option<String>,
    errors: &[ServiceError],
    status: Option<u16>,
    body: &str,
) -> UploadOutcome {
    if let Some(message) = message {
        return UploadOutcome::RemoteError { message };
    }
    if !errors.is_empty() {
        let joined = errors
            .iter()
            .filter_map(|e| e.message.as_deref())
            .collect::<Vec<_>>()
            .join("; ");
        return UploadOutcome::RemoteError { message: joined };
    }
    // `success: false` with nothing actionable attached
    UploadOutcome::TransportError {
        status,
        body_snippet: snippet(body),
    }
}

/// Truncates a body to at most [`SNIPPET_MAX_CHARS`] characters for logging.
pub(crate) fn snippet(body: &str) -> String {
    if body.chars().count() <= SNIPPET_MAX_CHARS {
        return body.to_string();
    }
    body.chars().take(SNIPPET_MAX_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_with_url() {
        let outcome = classify(Some(200), r#"{"success":true,"url":"https://x/y"}"#);
        assert_eq!(
            outcome,
            UploadOutcome::Success {
                url: "https://x/y".to_string()
            }
        );
    }

    #[test]
    fn failure_with_message() {
        let outcome = classify(Some(200), r#"{"success":false,"message":"limit reached"}"#);
        assert_eq!(
            outcome,
            UploadOutcome::RemoteError {
                message: "limit reached".to_string()
            }
        );
    }

    #[test]
    fn failure_with_error_list() {
        let body = r#"{"success":false,"errors":[{"message":"a"},{"message":"b"}]}"#;
        assert_eq!(
            classify(Some(200), body),
            UploadOutcome::RemoteError {
                message: "a; b".to_string()
            }
        );
    }

    #[test]
    fn success_without_url_is_transport_error() {
        let outcome = classify(Some(200), r#"{"success":true}"#);
        assert!(matches!(outcome, UploadOutcome::TransportError { .. }));
    }

    #[test]
    fn unparsable_body_is_transport_error() {
        let outcome = classify(Some(403), "<html>blocked</html>");
        match outcome {
            UploadOutcome::TransportError {
                status,
                body_snippet,
            } => {
                assert_eq!(status, Some(403));
                assert_eq!(body_snippet, "<html>blocked</html>");
            }
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[test]
    fn snippet_is_bounded() {
        let long = "x".repeat(2000);
        let outcome = classify(Some(200), &long);
        match outcome {
            UploadOutcome::TransportError { body_snippet, .. } => {
                assert_eq!(body_snippet.chars().count(), 300);
            }
            other => panic!("expected transport error, got {other:?}"),
        }
    }
}
