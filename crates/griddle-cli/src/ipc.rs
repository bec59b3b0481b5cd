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

//! Inter-process request surface
//!
//! The desktop shell talks to the sync engine through named requests such as
//! `assets:download-version`. Each request is one JSON object tagged by `type`;
//! each response is `{"ok": true, ...}` or
//! `{"ok": false, "error": {"kind", "message"}}`. An optional `id` on the request
//! is echoed back on the response.
//!
//! `griddle ipc` serves this surface as JSON lines over stdin/stdout:
//!
//! ```text
//! > {"id":1,"type":"assets:download-version","asset_id":"…","semver":"1.1"}
//! < {"id":1,"ok":true,"versions":[{"asset_id":"…","semver":"1.1","folderName":"Chair_1b4e28ba"}]}
//! ```
//!
//! Requests are handled one at a time in arrival order.

use griddle_config::LauncherConfig;
use griddle_local::{
    CommandLauncher, DownloadedEntry, LocalFile, Launcher, SyncEngine, SyncError,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Error kind reported for lines that are not a valid request
pub const INVALID_REQUEST: &str = "invalid_request";

/// A request from the desktop shell
///
/// Version fields on `remove-version`, `commit-changes`, `open-folder` and
/// `read-content` are accepted for compatibility; each asset has a single
/// working copy, so they do not select anything.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    #[serde(rename = "assets:list-downloaded")]
    ListDownloaded,

    #[serde(rename = "assets:download-asset")]
    DownloadAsset { asset_id: Uuid },

    #[serde(rename = "assets:create-initial-version")]
    CreateInitialVersion {
        asset_id: Uuid,
        #[serde(default)]
        asset_name: Option<String>,
    },

    #[serde(rename = "assets:download-version")]
    DownloadVersion {
        asset_id: Uuid,
        #[serde(default)]
        semver: Option<String>,
    },

    #[serde(rename = "assets:remove-version")]
    RemoveVersion {
        asset_id: Uuid,
        #[serde(default)]
        semver: Option<String>,
    },

    #[serde(rename = "assets:remove-download")]
    RemoveDownload { asset_id: Uuid },

    #[serde(rename = "assets:commit-changes")]
    CommitChanges {
        asset_id: Uuid,
        message: String,
        #[serde(default)]
        is_major: bool,
        #[serde(default)]
        semver: Option<String>,
    },

    #[serde(rename = "assets:open-folder")]
    OpenFolder {
        asset_id: Uuid,
        #[serde(default)]
        semver: Option<String>,
    },

    #[serde(rename = "assets:read-content")]
    ReadContent {
        asset_id: Uuid,
        #[serde(default)]
        semver: Option<String>,
    },

    #[serde(rename = "assets:is-dirty")]
    IsDirty { asset_id: Uuid },

    #[serde(rename = "assets:launch-dcc")]
    LaunchDcc { asset_id: Uuid, launcher: String },
}

impl Request {
    /// Channel name, as sent in `type`
    pub fn channel(&self) -> &'static str {
        match self {
            Request::ListDownloaded => "assets:list-downloaded",
            Request::DownloadAsset { .. } => "assets:download-asset",
            Request::CreateInitialVersion { .. } => "assets:create-initial-version",
            Request::DownloadVersion { .. } => "assets:download-version",
            Request::RemoveVersion { .. } => "assets:remove-version",
            Request::RemoveDownload { .. } => "assets:remove-download",
            Request::CommitChanges { .. } => "assets:commit-changes",
            Request::OpenFolder { .. } => "assets:open-folder",
            Request::ReadContent { .. } => "assets:read-content",
            Request::IsDirty { .. } => "assets:is-dirty",
            Request::LaunchDcc { .. } => "assets:launch-dcc",
        }
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    id: Option<Value>,
    #[serde(flatten)]
    request: Request,
}

/// Successful response payload
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Reply {
    Versions { versions: Vec<DownloadedEntry> },
    Files { files: Vec<LocalFile> },
    Dirty { dirty: bool },
    Done {},
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: String,
    pub message: String,
}

impl From<&SyncError> for ErrorBody {
    fn from(err: &SyncError) -> Self {
        ErrorBody {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Reply(Reply),
    Error { error: ErrorBody },
}

/// One response line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub ok: bool,
    #[serde(flatten)]
    pub payload: Payload,
}

impl Response {
    pub fn success(id: Option<Value>, reply: Reply) -> Self {
        Response {
            id,
            ok: true,
            payload: Payload::Reply(reply),
        }
    }

    pub fn failure(id: Option<Value>, error: ErrorBody) -> Self {
        Response {
            id,
            ok: false,
            payload: Payload::Error { error },
        }
    }
}

/// Routes requests to the sync engine
pub struct Dispatcher {
    engine: Arc<SyncEngine>,
    launchers: BTreeMap<String, LauncherConfig>,
    folder_opener: Arc<dyn Launcher>,
}

impl Dispatcher {
    pub fn new(engine: Arc<SyncEngine>, launchers: BTreeMap<String, LauncherConfig>) -> Self {
        Self {
            engine,
            launchers,
            folder_opener: Arc::new(CommandLauncher::file_browser()),
        }
    }

    /// Replace the launcher used by `assets:open-folder`
    pub fn with_folder_opener(mut self, opener: Arc<dyn Launcher>) -> Self {
        self.folder_opener = opener;
        self
    }

    /// Run one request against the engine
    pub async fn dispatch(&self, request: Request) -> Result<Reply, SyncError> {
        let engine = &self.engine;
        let reply = match request {
            Request::ListDownloaded => Reply::Versions {
                versions: engine.list_downloaded().await?,
            },
            Request::DownloadAsset { asset_id } => Reply::Versions {
                versions: engine.ensure_materialized(asset_id, None).await?,
            },
            Request::CreateInitialVersion { asset_id, .. } => Reply::Versions {
                versions: engine.create_initial_version(asset_id).await?,
            },
            Request::DownloadVersion { asset_id, semver } => Reply::Versions {
                versions: engine.ensure_materialized(asset_id, semver.as_deref()).await?,
            },
            Request::RemoveVersion { asset_id, .. } | Request::RemoveDownload { asset_id } => {
                Reply::Versions {
                    versions: engine.unsync(asset_id).await?,
                }
            }
            Request::CommitChanges {
                asset_id,
                message,
                is_major,
                ..
            } => Reply::Versions {
                versions: engine.commit(asset_id, &message, is_major).await?,
            },
            Request::OpenFolder { asset_id, .. } => {
                engine.launch(asset_id, self.folder_opener.as_ref()).await?;
                Reply::Done {}
            }
            Request::ReadContent { asset_id, .. } => Reply::Files {
                files: engine.list_local_files(asset_id).await?,
            },
            Request::IsDirty { asset_id } => Reply::Dirty {
                dirty: engine.is_dirty(asset_id).await?,
            },
            Request::LaunchDcc { asset_id, launcher } => {
                let config = self.launchers.get(&launcher).ok_or_else(|| {
                    SyncError::invalid_input(format!("unknown launcher: {}", launcher))
                })?;
                let launcher = CommandLauncher::new(config.program.clone(), config.args.clone());
                engine.launch(asset_id, &launcher).await?;
                Reply::Done {}
            }
        };
        Ok(reply)
    }

    /// Parse and run one request line
    pub async fn handle_line(&self, line: &str) -> Response {
        let envelope: Envelope = match serde_json::from_str(line) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(error = %e, "Rejected malformed request");
                return Response::failure(
                    request_id(line),
                    ErrorBody {
                        kind: INVALID_REQUEST.to_string(),
                        message: e.to_string(),
                    },
                );
            }
        };

        let channel = envelope.request.channel();
        debug!(channel, "Handling request");
        match self.dispatch(envelope.request).await {
            Ok(reply) => Response::success(envelope.id, reply),
            Err(e) => {
                warn!(channel, kind = e.kind(), error = %e, "Request failed");
                Response::failure(envelope.id, ErrorBody::from(&e))
            }
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("launchers", &self.launchers.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Best-effort `id` of a line that failed to parse as a request
fn request_id(line: &str) -> Option<Value> {
    serde_json::from_str::<Value>(line)
        .ok()
        .and_then(|value| value.get("id").cloned())
}

/// Serve JSON-lines requests until `reader` reaches end of input
///
/// Blank lines are skipped. Returns the number of requests answered.
pub async fn serve<R, W>(dispatcher: &Dispatcher, reader: R, mut writer: W) -> std::io::Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut handled = 0;

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let response = dispatcher.handle_line(&line).await;
        let mut out = serde_json::to_vec(&response)?;
        out.push(b'\n');
        writer.write_all(&out).await?;
        writer.flush().await?;
        handled += 1;
    }

    info!(handled, "Input closed, IPC loop finished");
    Ok(handled)
}
