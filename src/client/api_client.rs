use std::time::Duration;

use anyhow::Context;

use chrono::NaiveDate;

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response};

use secrecy::{ExposeSecret, Secret};

use serde_json::json;

use url::Url;

use uuid::Uuid;

use crate::controller::auth::LoginResponse;
use crate::domain::ExitAnswer;

use super::CredentialStore;

/// HTTP client bound to one API base URL, optionally carrying a session token
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Client without credentials, for registration and login
    pub fn anonymous(base_url: Url, timeout: Duration) -> anyhow::Result<Self> {
        Self::build(base_url, timeout, HeaderMap::new())
    }

    /// Client that sends `token` as the `Authorization` header on every request
    pub fn authenticated(
        base_url: Url,
        timeout: Duration,
        token: &Secret<String>,
    ) -> anyhow::Result<Self> {
        let mut value = HeaderValue::from_str(token.expose_secret())
            .context("Session token is not a valid header value")?;
        value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, value);

        Self::build(base_url, timeout, headers)
    }

    fn build(mut base_url: Url, timeout: Duration, headers: HeaderMap) -> anyhow::Result<Self> {
        // Relative joins drop the last path segment unless it ends with a slash
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .context("Failed to build http client")?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Start a request against a path relative to the base URL
    pub fn request(&self, method: Method, path: &str) -> anyhow::Result<RequestBuilder> {
        let url = self
            .base_url
            .join(path)
            .with_context(|| format!("Failed to build URL for {}", path))?;
        Ok(self.client.request(method, url))
    }

    async fn send(&self, req: anyhow::Result<RequestBuilder>) -> anyhow::Result<Response> {
        req?.send().await.context("Failed to execute request")
    }

    pub async fn register(&self, username: &str, password: &str) -> anyhow::Result<Response> {
        let body = json!({ "username": username, "password": password });
        self.send(self.request(Method::POST, "auth/register").map(|r| r.json(&body)))
            .await
    }

    pub async fn login(&self, username: &str, password: &str) -> anyhow::Result<Response> {
        let body = json!({ "username": username, "password": password });
        self.send(self.request(Method::POST, "auth/login").map(|r| r.json(&body)))
            .await
    }

    pub async fn resign(&self, lwd: NaiveDate) -> anyhow::Result<Response> {
        let body = json!({ "lwd": lwd });
        self.send(self.request(Method::POST, "user/resign").map(|r| r.json(&body)))
            .await
    }

    pub async fn own_resignation(&self) -> anyhow::Result<Response> {
        self.send(self.request(Method::GET, "user/resignation"))
            .await
    }

    pub async fn submit_responses(&self, responses: &[ExitAnswer]) -> anyhow::Result<Response> {
        let body = json!({ "responses": responses });
        self.send(self.request(Method::POST, "user/responses").map(|r| r.json(&body)))
            .await
    }

    pub async fn resignations(&self) -> anyhow::Result<Response> {
        self.send(self.request(Method::GET, "admin/resignations"))
            .await
    }

    pub async fn resignation(&self, resignation_id: Uuid) -> anyhow::Result<Response> {
        let path = format!("admin/resignations/{}", resignation_id);
        self.send(self.request(Method::GET, &path)).await
    }

    pub async fn conclude_resignation(
        &self,
        resignation_id: Uuid,
        approved: bool,
        lwd: Option<NaiveDate>,
    ) -> anyhow::Result<Response> {
        let body = json!({ "resignationId": resignation_id, "approved": approved, "lwd": lwd });
        self.send(
            self.request(Method::PUT, "admin/conclude_resignation")
                .map(|r| r.json(&body)),
        )
        .await
    }

    pub async fn exit_responses(&self) -> anyhow::Result<Response> {
        self.send(self.request(Method::GET, "admin/exit_responses"))
            .await
    }
}

/// The pair of clients a front end works with.
///
/// The stored token is read once, when the clients are built. After the
/// stored token changes, call [`ApiClients::refresh`] to pick it up.
#[derive(Debug)]
pub struct ApiClients {
    base_url: Url,
    timeout: Duration,
    pub anonymous: ApiClient,
    /// `None` while nothing is stored
    pub authenticated: Option<ApiClient>,
}

impl ApiClients {
    pub fn new(
        base_url: Url,
        timeout: Duration,
        credentials: &CredentialStore,
    ) -> anyhow::Result<Self> {
        let anonymous = ApiClient::anonymous(base_url.clone(), timeout)?;
        let mut clients = Self {
            base_url,
            timeout,
            anonymous,
            authenticated: None,
        };
        clients.refresh(credentials)?;
        Ok(clients)
    }

    /// Rebuild the authenticated client from whatever is stored now
    pub fn refresh(&mut self, credentials: &CredentialStore) -> anyhow::Result<()> {
        self.authenticated = credentials
            .load()?
            .map(|token| ApiClient::authenticated(self.base_url.clone(), self.timeout, &token))
            .transpose()?;
        Ok(())
    }

    /// Log in, persist the issued token, and switch the authenticated client to it
    pub async fn sign_in(
        &mut self,
        credentials: &CredentialStore,
        username: &str,
        password: &str,
    ) -> anyhow::Result<()> {
        let res = self
            .anonymous
            .login(username, password)
            .await?
            .error_for_status()
            .context("Login was rejected")?;
        let LoginResponse { token } = res.json().await.context("Malformed login response")?;

        credentials.save(&Secret::new(token))?;
        self.refresh(credentials)
    }

    /// Forget the stored token and drop the authenticated client
    pub fn sign_out(&mut self, credentials: &CredentialStore) -> anyhow::Result<()> {
        credentials.clear()?;
        self.authenticated = None;
        Ok(())
    }
}
