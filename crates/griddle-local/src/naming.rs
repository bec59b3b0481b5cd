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

//! Local folder naming

use uuid::Uuid;

/// Number of asset-id characters appended to folder names
pub const ID_SUFFIX_LEN: usize = 8;

/// Characters that are invalid in a path component on at least one platform
const RESERVED: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Make an asset name safe to use as a single path component
///
/// Reserved and control characters become `_`, trailing dots and spaces are
/// trimmed, and names that would otherwise be empty (or `.`/`..`) become
/// `asset`.
pub fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_control() || RESERVED.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect();

    let cleaned = cleaned.trim_end_matches(['.', ' ']);
    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        "asset".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Folder name of an asset's working copy: `<sanitized name>_<first 8 id chars>`
pub fn folder_name_for(asset_name: &str, asset_id: Uuid) -> String {
    let id = asset_id.hyphenated().to_string();
    format!("{}_{}", sanitize(asset_name), &id[..ID_SUFFIX_LEN])
}
