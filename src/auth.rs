//! Authentication against the remote file host.
//!
//! Produces an authenticated [`Session`] whose HTTP client is shared by all
//! concurrent part fetches. The login handshake runs exactly once, before
//! any worker starts; `reqwest::Client` is safe for concurrent use after.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// Default login endpoint of the remote service.
pub const LOGIN_URL: &str = "https://rapidgator.net/auth/login";

/// Login credentials, either supplied on the command line or read from a
/// persisted credential file (JSON, read-only input).
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    /// Reads credentials from a JSON file of the shape
    /// `{"email": "...", "password": "..."}`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            Error::Authentication(format!(
                "invalid credential file {}: {}",
                path.display(),
                e
            ))
        })
    }
}

/// Builds the login form payload under the fixed keys the remote service
/// expects. Fails with [`Error::InvalidIdentifier`] unless the username is
/// email-shaped.
pub fn build_payload(email: &str, password: &str) -> Result<HashMap<&'static str, String>> {
    if !is_email_shaped(email) {
        return Err(Error::InvalidIdentifier(email.to_string()));
    }

    let mut payload = HashMap::new();
    payload.insert("LoginForm[email]", email.to_string());
    payload.insert("LoginForm[password]", password.to_string());
    Ok(payload)
}

/// Minimal email shape check: `local@domain.tld` with non-empty segments.
fn is_email_shaped(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// An authenticated transport session.
#[derive(Debug, Clone)]
pub struct Session {
    client: reqwest::Client,
}

impl Session {
    /// Performs the login handshake and returns a session whose cookie jar
    /// carries the authenticated state.
    pub async fn login(login_url: &str, credentials: &Credentials) -> Result<Self> {
        let payload = build_payload(&credentials.email, &credentials.password)?;
        debug!(login_url, email = %credentials.email, "authenticating");

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .map_err(Error::Transport)?;

        let response = client
            .post(login_url)
            .form(&payload)
            .send()
            .await
            .map_err(|e| Error::Authentication(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Authentication(format!(
                "login returned HTTP {}",
                status
            )));
        }

        info!("authentication successful");
        Ok(Self { client })
    }

    /// The underlying HTTP client, shared by concurrent part fetches.
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}
