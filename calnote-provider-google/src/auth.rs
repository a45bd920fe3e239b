//! Interactive OAuth sign-in using a loopback redirect.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use url::Url;

use crate::app_config::AppConfig;
use crate::client::API_BASE;
use crate::session::{SessionData, TOKEN_URL, TokenResponse};

pub const REDIRECT_PORT: u16 = 8085;

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const SCOPES: &[&str] = &["https://www.googleapis.com/auth/calendar"];

fn redirect_uri() -> String {
    format!("http://localhost:{REDIRECT_PORT}/callback")
}

fn consent_url(app: &AppConfig, state: &str) -> Result<Url> {
    let redirect_uri = redirect_uri();
    let scope = SCOPES.join(" ");

    Url::parse_with_params(
        AUTH_URL,
        &[
            ("client_id", app.client_id.as_str()),
            ("redirect_uri", redirect_uri.as_str()),
            ("response_type", "code"),
            ("scope", scope.as_str()),
            ("access_type", "offline"),
            ("prompt", "consent"),
            ("state", state),
        ],
    )
    .context("Failed to build consent URL")
}

/// Pull `code` and `state` out of the callback request line.
fn parse_callback(request_line: &str) -> Result<(String, String)> {
    let url_part = request_line
        .split_whitespace()
        .nth(1)
        .context("Invalid request")?;

    let url = Url::parse(&format!("http://localhost{url_part}"))?;
    let param = |name: &str| {
        url.query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.to_string())
    };

    if let Some(error) = param("error") {
        anyhow::bail!("Google sign-in was declined: {error}");
    }

    let code = param("code").context("No code in callback")?;
    let state = param("state").context("No state in callback")?;
    Ok((code, state))
}

/// Block until the browser hits the redirect URI.
fn wait_for_callback() -> Result<(String, String)> {
    let listener = TcpListener::bind(("127.0.0.1", REDIRECT_PORT))
        .with_context(|| format!("Failed to bind to port {REDIRECT_PORT}"))?;

    eprintln!("Waiting for OAuth callback on port {REDIRECT_PORT}...");

    let (mut stream, _) = listener.accept().context("Failed to accept connection")?;

    let mut reader = BufReader::new(&stream);
    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;

    let result = parse_callback(&request_line);

    let body = match &result {
        Ok(_) => "<h1>Signed in to calnote</h1><p>You can close this window.</p>",
        Err(_) => "<h1>Sign-in failed</h1><p>Return to the terminal for details.</p>",
    };
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n<html><body>{body}</body></html>"
    );
    stream.write_all(response.as_bytes())?;
    stream.flush()?;

    result
}

#[derive(Deserialize)]
struct PrimaryCalendar {
    id: String,
}

/// Run the browser sign-in and store the session.
/// Returns the account email.
pub async fn authenticate(dir: &Path) -> Result<String> {
    let app = AppConfig::load_from(dir)?;
    let expected_state = uuid::Uuid::new_v4().to_string();
    let auth_url = consent_url(&app, &expected_state)?;

    eprintln!("\nOpen this URL in your browser to sign in:\n");
    eprintln!("{auth_url}\n");

    if open::that(auth_url.as_str()).is_err() {
        eprintln!("(Could not open browser automatically, please copy the URL above)");
    }

    let (code, state) = tokio::task::spawn_blocking(wait_for_callback)
        .await
        .context("OAuth callback listener stopped")??;

    if state != expected_state {
        anyhow::bail!("OAuth state mismatch, refusing the callback");
    }

    eprintln!("\nReceived authorization code, exchanging for tokens...");

    let http = reqwest::Client::new();
    let redirect_uri = redirect_uri();
    let response = http
        .post(TOKEN_URL)
        .form(&[
            ("code", code.as_str()),
            ("client_id", app.client_id.as_str()),
            ("client_secret", app.client_secret.as_str()),
            ("redirect_uri", redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ])
        .send()
        .await
        .context("Failed to exchange code for tokens")?
        .error_for_status()
        .context("Google refused the authorization code")?;

    let tokens: TokenResponse = response
        .json()
        .await
        .context("Failed to parse token response")?;

    if tokens.refresh_token.is_none() {
        anyhow::bail!("Google did not return a refresh token");
    }
    let session = SessionData::from_response(tokens, "");

    // The primary calendar's id is the account email.
    let primary: PrimaryCalendar = http
        .get(format!("{API_BASE}/calendars/primary"))
        .bearer_auth(session.access_token())
        .send()
        .await
        .context("Failed to look up the primary calendar")?
        .error_for_status()?
        .json()
        .await?;

    session.save(dir, &primary.id)?;
    tracing::info!(account = %primary.id, "signed in to Google");

    Ok(primary.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_callback() {
        let (code, state) =
            parse_callback("GET /callback?code=4%2Fabc&state=xyz HTTP/1.1\r\n").unwrap();
        assert_eq!(code, "4/abc");
        assert_eq!(state, "xyz");
    }

    #[test]
    fn test_parse_declined_callback() {
        let err = parse_callback("GET /callback?error=access_denied&state=xyz HTTP/1.1")
            .unwrap_err()
            .to_string();
        assert!(err.contains("access_denied"));
    }

    #[test]
    fn test_consent_url_requests_offline_access() {
        let app = AppConfig {
            client_id: "id.apps.googleusercontent.com".into(),
            client_secret: "secret".into(),
        };
        let url = consent_url(&app, "state-1").unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();

        assert!(pairs.contains(&("access_type".into(), "offline".into())));
        assert!(pairs.contains(&("state".into(), "state-1".into())));
        assert!(!url.as_str().contains("secret"));
    }
}
