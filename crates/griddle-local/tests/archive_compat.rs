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

#![allow(clippy::unwrap_used)]
//! Archives written by other ZIP producers unpack like our own

use griddle_local::archive::{pack_blocking, unpack_blocking};
use griddle_local::hash_folder_blocking;
use griddle_test_utils::{assert_trees_equal, AssetTree};
use std::fs;
use tempfile::TempDir;

/// `scene.usda`, `geo/` and `geo/chair.usdc`, deflated by Python's zipfile
const PYTHON_ZIPFILE: &[u8] = b"\
    \x50\x4b\x03\x04\x14\x00\x00\x00\x08\x00\xc0\x4b\xb1\x58\x82\x70\x4c\xe7\x0c\x00\x00\x00\x0a\x00\
    \x00\x00\x0a\x00\x00\x00\x73\x63\x65\x6e\x65\x2e\x75\x73\x64\x61\x53\x2e\x2d\x4e\x49\x54\x30\xd4\
    \x33\xe0\x02\x00\x50\x4b\x03\x04\x14\x00\x00\x00\x08\x00\xc0\x4b\xb1\x58\x00\x00\x00\x00\x02\x00\
    \x00\x00\x00\x00\x00\x00\x04\x00\x00\x00\x67\x65\x6f\x2f\x03\x00\x50\x4b\x03\x04\x14\x00\x00\x00\
    \x08\x00\xc0\x4b\xb1\x58\xbd\x06\xfa\xb1\x0d\x00\x00\x00\x48\x00\x00\x00\x0e\x00\x00\x00\x67\x65\
    \x6f\x2f\x63\x68\x61\x69\x72\x2e\x75\x73\x64\x63\x0b\x88\x08\xd2\x0d\x0d\x76\x71\x66\xa7\x10\x00\
    \x00\x50\x4b\x01\x02\x14\x03\x14\x00\x00\x00\x08\x00\xc0\x4b\xb1\x58\x82\x70\x4c\xe7\x0c\x00\x00\
    \x00\x0a\x00\x00\x00\x0a\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x80\x01\x00\x00\x00\x00\x73\
    \x63\x65\x6e\x65\x2e\x75\x73\x64\x61\x50\x4b\x01\x02\x14\x03\x14\x00\x00\x00\x08\x00\xc0\x4b\xb1\
    \x58\x00\x00\x00\x00\x02\x00\x00\x00\x00\x00\x00\x00\x04\x00\x00\x00\x00\x00\x00\x00\x00\x00\x10\
    \x00\xed\x41\x34\x00\x00\x00\x67\x65\x6f\x2f\x50\x4b\x01\x02\x14\x03\x14\x00\x00\x00\x08\x00\xc0\
    \x4b\xb1\x58\xbd\x06\xfa\xb1\x0d\x00\x00\x00\x48\x00\x00\x00\x0e\x00\x00\x00\x00\x00\x00\x00\x00\
    \x00\x00\x00\x80\x01\x58\x00\x00\x00\x67\x65\x6f\x2f\x63\x68\x61\x69\x72\x2e\x75\x73\x64\x63\x50\
    \x4b\x05\x06\x00\x00\x00\x00\x03\x00\x03\x00\xa6\x00\x00\x00\x91\x00\x00\x00\x00\x00";

fn chair_usdc() -> Vec<u8> {
    let mut bytes = b"PXR-USDC".to_vec();
    bytes.extend(std::iter::repeat(7u8).take(64));
    bytes
}

#[test]
fn test_unpacks_python_zipfile_archive() {
    let out = TempDir::new().unwrap();
    let dest = out.path().join("chair_0b6f9a62");
    unpack_blocking(PYTHON_ZIPFILE, &dest).unwrap();

    assert_eq!(fs::read(dest.join("scene.usda")).unwrap(), b"#usda 1.0\n");
    assert_eq!(fs::read(dest.join("geo/chair.usdc")).unwrap(), chair_usdc());

    let expected = AssetTree::new()
        .file("scene.usda", "#usda 1.0\n")
        .file("geo/chair.usdc", chair_usdc())
        .materialize();
    assert_trees_equal(expected.path(), &dest);
}

#[test]
fn test_foreign_archive_survives_commit_round_trip() {
    let out = TempDir::new().unwrap();
    let first = out.path().join("first");
    unpack_blocking(PYTHON_ZIPFILE, &first).unwrap();

    let repacked = pack_blocking(&first).unwrap();
    let second = out.path().join("second");
    unpack_blocking(&repacked, &second).unwrap();

    assert_eq!(
        hash_folder_blocking(&first).unwrap(),
        hash_folder_blocking(&second).unwrap()
    );
}

#[test]
fn test_flipped_byte_in_entry_data_is_format_error() {
    let mut bytes = PYTHON_ZIPFILE.to_vec();
    // first byte of scene.usda's deflate stream
    bytes[40] ^= 0xff;

    let out = TempDir::new().unwrap();
    let err = unpack_blocking(&bytes, &out.path().join("asset")).unwrap_err();
    assert_eq!(err.kind(), "format");
    assert!(!out.path().join("asset").exists());
}
