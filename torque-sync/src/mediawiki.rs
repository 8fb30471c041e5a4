#![doc = "MediaWiki transport: bridges the core `WikiTransport` contract to a live wiki's api.php over HTTP."]
//
//! # MediaWiki client
//!
//! [`MediaWikiClient`] implements [`WikiTransport`] against `api.php` with a
//! cookie-carrying `reqwest` client, and [`connect`] builds a logged-in
//! [`WikiSession`] from credentials, namespace and base URL.
//!
//! - Credentials come from `WIKI_USERNAME` / `WIKI_PASSWORD` (see [`Credentials::from_env`]).
//! - Timeouts are long: every Torque upload makes the wiki reindex.
//! - API-level `{"error": ...}` bodies become [`TransportError::Api`].

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, info};

use torque_sync_core::contract::{ApiCall, RemotePage, WikiTransport};
use torque_sync_core::{PublishError, TransportError, WikiSession};

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Login name and password for the wiki bot account.
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn from_env() -> Result<Self, PublishError> {
        dotenvy::dotenv().ok();
        match (env::var("WIKI_USERNAME"), env::var("WIKI_PASSWORD")) {
            (Ok(username), Ok(password)) => {
                info!(username = %username, "Loaded wiki credentials from environment");
                Ok(Self { username, password })
            }
            (Err(e), _) => {
                error!(error = ?e, "WIKI_USERNAME missing in environment");
                Err(PublishError::Auth(format!("WIKI_USERNAME: {e}")))
            }
            (_, Err(e)) => {
                error!(error = ?e, "WIKI_PASSWORD missing in environment");
                Err(PublishError::Auth(format!("WIKI_PASSWORD: {e}")))
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: String,
    #[serde(default)]
    info: String,
}

#[derive(Debug, Deserialize)]
struct TokensResponse {
    query: TokensQuery,
}

#[derive(Debug, Deserialize)]
struct TokensQuery {
    tokens: Tokens,
}

#[derive(Debug, Deserialize)]
struct Tokens {
    logintoken: Option<String>,
    csrftoken: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    login: LoginResult,
}

#[derive(Debug, Deserialize)]
struct LoginResult {
    result: String,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PagesResponse {
    query: PagesQuery,
}

#[derive(Debug, Deserialize)]
struct PagesQuery {
    pages: Vec<PageEntry>,
}

#[derive(Debug, Deserialize)]
struct PageEntry {
    title: String,
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    invalid: bool,
    invalidreason: Option<String>,
    #[serde(default)]
    revisions: Vec<Revision>,
}

#[derive(Debug, Deserialize)]
struct Revision {
    slots: Slots,
}

#[derive(Debug, Deserialize)]
struct Slots {
    main: MainSlot,
}

#[derive(Debug, Deserialize)]
struct MainSlot {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct EditResponse {
    edit: EditResult,
}

#[derive(Debug, Deserialize)]
struct EditResult {
    result: String,
}

#[derive(Debug, Deserialize)]
struct AllPagesResponse {
    #[serde(rename = "continue")]
    cont: Option<AllPagesContinue>,
    query: AllPagesQuery,
}

#[derive(Debug, Deserialize)]
struct AllPagesContinue {
    apcontinue: String,
}

#[derive(Debug, Deserialize)]
struct AllPagesQuery {
    allpages: Vec<AllPagesEntry>,
}

#[derive(Debug, Deserialize)]
struct AllPagesEntry {
    title: String,
}

/// HTTP client for one wiki's `api.php`.
pub struct MediaWikiClient {
    client: Client,
    api_url: String,
}

impl MediaWikiClient {
    /// Splits `base_url` into scheme and host and prepares a client for
    /// `<scheme>://<host>/api.php`. Does not log in.
    pub fn new(base_url: &str) -> Result<Self, PublishError> {
        let (scheme, host) = base_url
            .split_once("://")
            .filter(|(scheme, host)| !scheme.is_empty() && !host.is_empty())
            .ok_or_else(|| PublishError::InvalidUrl(base_url.to_string()))?;
        let host = host.trim_end_matches('/');

        let client = Client::builder()
            .cookie_store(true)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| TransportError::Network(format!("failed to build HTTP client: {e}")))?;

        let api_url = format!("{scheme}://{host}/api.php");
        debug!(api_url = %api_url, "Prepared MediaWiki client");
        Ok(Self { client, api_url })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Logs in with the action=login flow; the session cookie is kept by the
    /// client's cookie store.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), PublishError> {
        let tokens: TokensResponse = self
            .get(&[("action", "query"), ("meta", "tokens"), ("type", "login")])
            .await
            .map_err(|e| PublishError::Auth(format!("could not fetch login token: {e}")))?;
        let token = tokens
            .query
            .tokens
            .logintoken
            .ok_or_else(|| PublishError::Auth("wiki returned no login token".to_string()))?;

        let response: LoginResponse = self
            .post_form(&[
                ("action", "login"),
                ("lgname", username),
                ("lgpassword", password),
                ("lgtoken", token.as_str()),
            ])
            .await
            .map_err(|e| PublishError::Auth(format!("login request failed: {e}")))?;

        if response.login.result != "Success" {
            let reason = response.login.reason.unwrap_or(response.login.result);
            error!(username, reason = %reason, "Wiki login rejected");
            return Err(PublishError::Auth(reason));
        }
        info!(username, "Logged in to wiki");
        Ok(())
    }

    async fn get<R: DeserializeOwned>(&self, params: &[(&str, &str)]) -> Result<R, TransportError> {
        let response = self
            .client
            .get(&self.api_url)
            .query(&[("format", "json"), ("formatversion", "2")])
            .query(params)
            .send()
            .await
            .map_err(network)?;
        decode(response).await
    }

    async fn post_form<R: DeserializeOwned>(
        &self,
        params: &[(&str, &str)],
    ) -> Result<R, TransportError> {
        let mut form: Vec<(&str, &str)> = vec![("format", "json"), ("formatversion", "2")];
        form.extend_from_slice(params);
        let response = self
            .client
            .post(&self.api_url)
            .form(&form)
            .send()
            .await
            .map_err(network)?;
        decode(response).await
    }

    async fn csrf_token(&self) -> Result<String, TransportError> {
        let tokens: TokensResponse = self.get(&[("action", "query"), ("meta", "tokens")]).await?;
        tokens
            .query
            .tokens
            .csrftoken
            .ok_or_else(|| TransportError::Decode("wiki returned no csrf token".to_string()))
    }
}

fn network(e: reqwest::Error) -> TransportError {
    TransportError::Network(e.to_string())
}

/// Checks the HTTP status, surfaces API error objects and deserializes the rest.
async fn decode<R: DeserializeOwned>(response: reqwest::Response) -> Result<R, TransportError> {
    let response = response.error_for_status().map_err(network)?;
    let value: Value = response
        .json()
        .await
        .map_err(|e| TransportError::Decode(e.to_string()))?;
    if let Some(err) = value.get("error") {
        let err: ApiErrorBody = serde_json::from_value(err.clone())
            .map_err(|e| TransportError::Decode(format!("malformed error object: {e}")))?;
        return Err(TransportError::Api {
            code: err.code,
            info: err.info,
        });
    }
    serde_json::from_value(value).map_err(|e| TransportError::Decode(e.to_string()))
}

#[async_trait]
impl WikiTransport for MediaWikiClient {
    async fn raw_call(&self, call: ApiCall) -> Result<Value, TransportError> {
        info!(
            action = %call.action,
            params = call.params.len(),
            files = call.files.len(),
            "Issuing raw API call"
        );
        let mut form = Form::new()
            .text("action", call.action.clone())
            .text("format", "json");
        for (name, value) in call.params {
            form = form.text(name, value);
        }
        for (name, bytes) in call.files {
            let part = Part::bytes(bytes).file_name(name.clone());
            form = form.part(name, part);
        }

        let response = self
            .client
            .post(&self.api_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                error!(action = %call.action, error = %e, "Raw API call failed");
                network(e)
            })?;
        decode(response).await
    }

    async fn fetch_page(&self, title: &str) -> Result<RemotePage, TransportError> {
        let response: PagesResponse = self
            .get(&[
                ("action", "query"),
                ("prop", "revisions"),
                ("rvprop", "content"),
                ("rvslots", "main"),
                ("titles", title),
            ])
            .await?;
        let page = response
            .query
            .pages
            .into_iter()
            .next()
            .ok_or_else(|| TransportError::Decode(format!("no page entry for {title:?}")))?;
        if page.invalid {
            let info = page
                .invalidreason
                .unwrap_or_else(|| format!("{title:?} is not a valid page title"));
            error!(title, reason = %info, "Wiki rejected page title");
            return Err(TransportError::Api {
                code: "invalidtitle".to_string(),
                info,
            });
        }
        if page.missing {
            return Ok(RemotePage::missing(page.title));
        }
        let content = page
            .revisions
            .into_iter()
            .next()
            .map(|rev| rev.slots.main.content)
            .unwrap_or_default();
        Ok(RemotePage::existing(page.title, content))
    }

    async fn save_page(&self, title: &str, body: &str) -> Result<(), TransportError> {
        let token = self.csrf_token().await?;
        let response: EditResponse = self
            .post_form(&[
                ("action", "edit"),
                ("title", title),
                ("text", body),
                ("token", token.as_str()),
            ])
            .await?;
        if response.edit.result != "Success" {
            return Err(TransportError::Api {
                code: "edit-failed".to_string(),
                info: format!("edit of {title:?} returned {}", response.edit.result),
            });
        }
        debug!(title, "Saved page");
        Ok(())
    }

    async fn list_all_pages(&self) -> Result<Vec<RemotePage>, TransportError> {
        let mut pages = Vec::new();
        let mut apcontinue: Option<String> = None;
        loop {
            let from = apcontinue.take();
            let mut params = vec![
                ("action", "query"),
                ("list", "allpages"),
                ("aplimit", "max"),
            ];
            if let Some(from) = from.as_deref() {
                params.push(("apcontinue", from));
            }
            let response: AllPagesResponse = self.get(&params).await?;
            pages.extend(
                response
                    .query
                    .allpages
                    .into_iter()
                    .map(|entry| RemotePage::existing(entry.title, String::new())),
            );
            match response.cont {
                Some(cont) => apcontinue = Some(cont.apcontinue),
                None => break,
            }
        }
        info!(count = pages.len(), "Listed all wiki pages");
        Ok(pages)
    }
}

/// Builds a logged-in session for `competition_name` on the wiki at `base_url`.
pub async fn connect(
    username: &str,
    password: &str,
    competition_name: &str,
    base_url: &str,
) -> Result<WikiSession<MediaWikiClient>, PublishError> {
    let client = MediaWikiClient::new(base_url)?;
    client.login(username, password).await?;
    Ok(WikiSession::new(client, competition_name))
}
