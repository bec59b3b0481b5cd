// Griddle - Asset sync for DCC pipelines
// Copyright (C) 2025 Griddle Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published
// by the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{multipart, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::RwLock;
use std::time::Duration;
use uuid::Uuid;

use crate::error::{RemoteError, RemoteResult};
use crate::types::{Asset, AssetCreate, AssetInfo, AuthState, Token, User, Version, VersionCreate};
use crate::RemoteRepository;

/// Connection settings for [`HttpRemote`]
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// API root including the version prefix, e.g. `http://localhost:8000/api/v1`
    pub api_root: String,
    pub timeout: Duration,
    pub token: Option<String>,
}

impl RemoteConfig {
    pub fn new(api_root: impl Into<String>) -> Self {
        Self {
            api_root: api_root.into(),
            timeout: Duration::from_secs(300),
            token: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }
}

/// HTTP client for the Griddle asset API
pub struct HttpRemote {
    api_root: String,
    client: reqwest::Client,
    token: RwLock<Option<String>>,
}

impl HttpRemote {
    /// Create a new client
    ///
    /// The request timeout applies to whole requests, archive transfers included.
    pub fn new(config: RemoteConfig) -> RemoteResult<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            api_root: config.api_root.trim_end_matches('/').to_string(),
            client,
            token: RwLock::new(config.token),
        })
    }

    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    /// Replace the bearer token used for authenticated calls
    pub fn set_token(&self, token: Option<String>) {
        if let Ok(mut guard) = self.token.write() {
            *guard = token;
        }
    }

    fn token(&self) -> Option<String> {
        self.token.read().ok().and_then(|guard| guard.clone())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_root, path)
    }

    /// Attach the bearer token if we have one
    fn with_optional_auth(&self, request: RequestBuilder) -> RequestBuilder {
        match self.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Attach the bearer token, failing without one
    fn with_auth(&self, request: RequestBuilder) -> RemoteResult<RequestBuilder> {
        let token = self.token().ok_or(RemoteError::Unauthenticated)?;
        Ok(request.bearer_auth(token))
    }

    /// Exchange credentials for a bearer token
    ///
    /// The token is kept for later calls and returned so the caller can persist it.
    pub async fn login(&self, username: &str, password: &str) -> RemoteResult<Token> {
        let url = self.url("/users/token");
        tracing::debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .form(&[("username", username), ("password", password)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = error_message(response).await;
            return Err(RemoteError::rejected(status.as_u16(), message));
        }

        let token: Token = decode(response).await?;
        self.set_token(Some(token.access_token.clone()));
        Ok(token)
    }

    /// Forget the bearer token
    pub fn logout(&self) {
        self.set_token(None);
    }

    /// Who the server thinks we are
    ///
    /// No token, or a token the server rejects with 401, is `LoggedOut`.
    pub async fn current_user(&self) -> RemoteResult<AuthState> {
        let Some(token) = self.token() else {
            return Ok(AuthState::LoggedOut);
        };

        let url = self.url("/users/me");
        tracing::debug!("GET {}", url);

        let response = self.client.get(&url).bearer_auth(token).send().await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            return Ok(AuthState::LoggedOut);
        }

        let user: User = decode(check(response).await?).await?;
        Ok(AuthState::LoggedIn { user })
    }
}

impl fmt::Debug for HttpRemote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRemote")
            .field("api_root", &self.api_root)
            .field("authenticated", &self.token().is_some())
            .finish()
    }
}

#[async_trait]
impl RemoteRepository for HttpRemote {
    async fn asset_info(&self, asset_id: Uuid) -> RemoteResult<AssetInfo> {
        let url = self.url(&format!("/assets/{}", asset_id));
        tracing::debug!("GET {}", url);

        let response = self.with_optional_auth(self.client.get(&url)).send().await?;
        decode(check(response).await?).await
    }

    async fn versions_page(&self, asset_id: Uuid, offset: usize) -> RemoteResult<Vec<Version>> {
        let url = self.url(&format!("/assets/{}/versions", asset_id));
        tracing::debug!("GET {} (offset {})", url, offset);

        let offset = offset.to_string();
        let response = self
            .with_optional_auth(
                self.client
                    .get(&url)
                    .query(&[("sort", "desc"), ("offset", offset.as_str())]),
            )
            .send()
            .await?;
        decode(check(response).await?).await
    }

    async fn assets_page(&self, search: Option<&str>, offset: usize) -> RemoteResult<Vec<Asset>> {
        let url = self.url("/assets/");
        tracing::debug!("GET {} (search {:?}, offset {})", url, search, offset);

        let mut query = vec![("offset", offset.to_string())];
        if let Some(search) = search.filter(|s| !s.is_empty()) {
            query.push(("search", search.to_string()));
        }
        let response = self
            .with_optional_auth(self.client.get(&url).query(&query))
            .send()
            .await?;
        decode(check(response).await?).await
    }

    async fn download_version(&self, asset_id: Uuid, semver: &str) -> RemoteResult<Bytes> {
        let url = self.url(&format!("/assets/{}/versions/{}/file", asset_id, semver));
        tracing::debug!("GET {}", url);

        let response = self.with_auth(self.client.get(&url))?.send().await?;
        let bytes = check(response).await?.bytes().await?;
        tracing::debug!("Downloaded {} bytes for {}@{}", bytes.len(), asset_id, semver);
        Ok(bytes)
    }

    async fn upload_version(
        &self,
        asset_id: Uuid,
        archive: Vec<u8>,
        info: &VersionCreate,
    ) -> RemoteResult<Version> {
        let url = self.url(&format!("/assets/{}/versions", asset_id));
        tracing::debug!("POST {} ({} bytes)", url, archive.len());

        let file = multipart::Part::bytes(archive)
            .file_name(format!("{}.zip", asset_id))
            .mime_str("application/zip")?;
        let form = multipart::Form::new()
            .part("file", file)
            .text("message", info.message.clone())
            .text("is_major", info.is_major.to_string());

        let response = self
            .with_auth(self.client.post(&url).multipart(form))?
            .send()
            .await?;
        decode(check(response).await?).await
    }

    async fn create_asset(&self, asset: &AssetCreate) -> RemoteResult<Asset> {
        let url = self.url("/assets/");
        tracing::debug!("POST {}", url);

        let response = self
            .with_auth(self.client.post(&url).json(asset))?
            .send()
            .await?;
        decode(check(response).await?).await
    }

    async fn update_asset(&self, asset_id: Uuid, asset: &AssetCreate) -> RemoteResult<Asset> {
        let url = self.url(&format!("/assets/{}", asset_id));
        tracing::debug!("PUT {}", url);

        let response = self
            .with_auth(self.client.put(&url).json(asset))?
            .send()
            .await?;
        decode(check(response).await?).await
    }
}

/// Map non-success statuses onto [`RemoteError`]
async fn check(response: Response) -> RemoteResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = error_message(response).await;
    tracing::debug!("Request failed with status {}: {}", status, message);

    Err(match status {
        StatusCode::NOT_FOUND => RemoteError::NotFound(message),
        StatusCode::UNAUTHORIZED => RemoteError::Unauthenticated,
        _ => RemoteError::rejected(status.as_u16(), message),
    })
}

/// The server reports errors as `{"detail": "..."}`
async fn error_message(response: Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|value| match value.get("detail") {
            Some(serde_json::Value::String(detail)) => Some(detail.clone()),
            Some(other) => Some(other.to_string()),
            None => None,
        })
        .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_string()))
        .unwrap_or_else(|| status.to_string())
}

async fn decode<T: DeserializeOwned>(response: Response) -> RemoteResult<T> {
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| RemoteError::Decode(e.to_string()))
}
