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

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Asset metadata as stored by the server
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub id: Uuid,
    pub asset_name: String,
    pub author_pennkey: String,
    /// Comma-separated keyword list
    #[serde(default)]
    pub keywords: String,
    #[serde(default)]
    pub image_uri: Option<String>,
}

/// One immutable, server-numbered version of an asset
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Version {
    pub asset_id: Uuid,
    /// `MAJOR.MINOR` tag assigned by the server
    pub semver: String,
    pub message: String,
    pub author_pennkey: String,
    #[serde(with = "server_datetime")]
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_major: Option<bool>,
}

/// Response of `GET /assets/{uuid}`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AssetInfo {
    pub asset: Asset,
    /// Most recent first
    #[serde(default)]
    pub versions: Vec<Version>,
}

impl AssetInfo {
    pub fn latest(&self) -> Option<&Version> {
        self.versions.first()
    }

    pub fn find(&self, semver: &str) -> Option<&Version> {
        self.versions.iter().find(|v| v.semver == semver)
    }
}

/// Body of `POST /assets/` and `PUT /assets/{uuid}`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AssetCreate {
    pub asset_name: String,
    #[serde(default)]
    pub keywords: String,
    #[serde(default)]
    pub image_uri: Option<String>,
}

/// Form fields of `POST /assets/{uuid}/versions` besides the file
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VersionCreate {
    pub message: String,
    pub is_major: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub pennkey: String,
    pub first_name: String,
    pub last_name: String,
    pub school: String,
}

/// Response of `POST /users/token`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
}

/// Result of asking the server who we are
///
/// Being logged out is an ordinary state, not an error.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum AuthState {
    LoggedOut,
    LoggedIn { user: User },
}

impl AuthState {
    pub fn is_logged_in(&self) -> bool {
        matches!(self, AuthState::LoggedIn { .. })
    }
}

/// Tag the server assigns to the next upload
///
/// The first version is `0.1`; later ones bump the major or minor component
/// of the highest existing `MAJOR.MINOR` tag, resetting minor on a major bump.
pub fn next_semver<'a, I>(existing: I, is_major: bool) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let highest = existing.into_iter().filter_map(parse_semver).max();

    match highest {
        None => "0.1".to_string(),
        Some((major, _)) if is_major => format!("{}.0", major + 1),
        Some((major, minor)) => format!("{}.{}", major, minor + 1),
    }
}

fn parse_semver(tag: &str) -> Option<(u64, u64)> {
    let (major, minor) = tag.split_once('.')?;
    Some((major.parse().ok()?, minor.parse().ok()?))
}

/// The server emits naive ISO-8601 timestamps (no offset); accept both forms
mod server_datetime {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if let Ok(date) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(date.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(serde::de::Error::custom)
    }
}
