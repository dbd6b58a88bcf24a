//! Authenticated session against the TheHax service.
//!
//! The service uses a classic CSRF-protected form login with cookie
//! sessions. One [`Session`] is created at process start and shared by every
//! upload attempt; cookies accumulate in the client's store automatically,
//! so a successful login benefits all later uploads in the same process.
//! Nothing is persisted across restarts.

use std::time::{Duration, Instant};

use lazy_regex::lazy_regex;
use reqwest::redirect::Policy;
use reqwest::StatusCode;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::{UploadError, BROWSER_USER_AGENT, LOGIN_URL};

/// Minimum gap between two real login round-trips.
const LOGIN_COOLDOWN: Duration = Duration::from_secs(5 * 60);

/// Timeout applied to every call made through the session client.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Hidden anti-forgery field on the login page.
static RE_CSRF_TOKEN: lazy_regex::Lazy<regex::Regex> =
    lazy_regex!(r#"name="_csrf_token"\s+value="([^"]*)""#);

/// Account credentials for the replay host. Absence disables login entirely.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Account username.
    pub username: String,
    /// Account password.
    pub password: String,
}

/// Result of one [`Session::ensure_authenticated`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// A login round-trip ran and the service accepted the credentials.
    Succeeded,
    /// No credentials configured, or a recent login is still fresh.
    Skipped,
    /// The login round-trip ran and failed; the upload proceeds
    /// unauthenticated.
    Failed(String),
}

/// Shared HTTP session: cookie store, optional credentials, and the
/// timestamp of the last successful login.
pub struct Session {
    client: reqwest::Client,
    credentials: Option<Credentials>,
    last_login: Mutex<Option<Instant>>,
}

impl Session {
    /// Builds the session transport.
    ///
    /// Redirects are disabled client-wide: login success is signalled by a
    /// 302/303 that must reach us unfollowed, and the upload endpoint never
    /// redirects.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::Client`] if the client cannot be constructed.
    pub fn new(credentials: Option<Credentials>) -> Result<Self, UploadError> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(Policy::none())
            .user_agent(BROWSER_USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            credentials,
            last_login: Mutex::new(None),
        })
    }

    /// The shared transport; all TheHax calls go through it so the cookie
    /// store sees every response.
    pub(crate) fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Logs in when useful: a no-op without credentials, and a no-op while a
    /// successful login is younger than five minutes.
    ///
    /// Failures are logged and swallowed; the calling upload proceeds
    /// unauthenticated. There is deliberately no mutual exclusion around the
    /// whole operation: two interleaved uploads may both log in, which the
    /// service treats as an idempotent repeat.
    pub async fn ensure_authenticated(&self) -> LoginOutcome {
        let Some(credentials) = &self.credentials else {
            return LoginOutcome::Skipped;
        };

        if self.recently_logged_in().await {
            debug!("login skipped, session still fresh");
            return LoginOutcome::Skipped;
        }

        match self.login(credentials).await {
            Ok(()) => {
                info!("logged in to TheHax");
                *self.last_login.lock().await = Some(Instant::now());
                LoginOutcome::Succeeded
            }
            Err(reason) => {
                warn!("TheHax login failed, uploading unauthenticated: {reason}");
                LoginOutcome::Failed(reason)
            }
        }
    }

    async fn recently_logged_in(&self) -> bool {
        self.last_login
            .lock()
            .await
            .is_some_and(|at| at.elapsed() < LOGIN_COOLDOWN)
    }

    async fn login(&self, credentials: &Credentials) -> Result<(), String> {
        let page = self
            .client
            .get(LOGIN_URL)
            .send()
            .await
            .map_err(|e| format!("login page fetch failed: {e}"))?;
        let html = page
            .text()
            .await
            .map_err(|e| format!("login page read failed: {e}"))?;

        let token = extract_csrf_token(&html).unwrap_or_else(|| {
            warn!("no _csrf_token field on login page, submitting without one");
            String::new()
        });

        let form = [
            ("username", credentials.username.as_str()),
            ("password", credentials.password.as_str()),
            ("rememberMe", "on"),
            ("_csrf_token", token.as_str()),
        ];
        let response = self
            .client
            .post(LOGIN_URL)
            .form(&form)
            .send()
            .await
            .map_err(|e| format!("login submit failed: {e}"))?;

        let status = response.status();
        if status == StatusCode::FOUND || status == StatusCode::SEE_OTHER {
            return Ok(());
        }
        if status == StatusCode::OK {
            // Some deployments answer 200 and render the authenticated page
            // directly; a logout affordance is the marker for that.
            let body = response.text().await.unwrap_or_default();
            if body.to_lowercase().contains("logout") {
                return Ok(());
            }
            return Err("status 200 without authenticated-page marker".to_string());
        }
        Err(format!("unexpected login status {status}"))
    }
}

fn extract_csrf_token(html: &str) -> Option<String> {
    RE_CSRF_TOKEN
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_csrf_token_from_login_page() {
        let html = r#"<form method="post">
            <input type="hidden" name="_csrf_token" value="abc123DEF" />
        </form>"#;
        assert_eq!(extract_csrf_token(html), Some("abc123DEF".to_string()));
    }

    #[test]
    fn missing_token_yields_none() {
        assert_eq!(extract_csrf_token("<html><body>no form</body></html>"), None);
        // A field with another name must not match
        let other = r#"<input name="_token" value="x"/>"#;
        assert_eq!(extract_csrf_token(other), None);
    }

    #[tokio::test]
    async fn no_credentials_skips_without_io() {
        let session = Session::new(None).expect("client builds");
        assert_eq!(session.ensure_authenticated().await, LoginOutcome::Skipped);
    }

    #[tokio::test]
    async fn fresh_login_is_rate_limited() {
        let session = Session::new(Some(Credentials {
            username: "u".to_string(),
            password: "p".to_string(),
        }))
        .expect("client builds");

        // Simulate a login that just succeeded; the next call must not
        // touch the network.
        *session.last_login.lock().await = Some(Instant::now());
        assert_eq!(session.ensure_authenticated().await, LoginOutcome::Skipped);
    }
}
