// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2025 Griddle Contributors

//! Custom test assertions for Griddle tests.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Relative path -> file content (`None` for directories)
pub fn tree_snapshot(root: &Path) -> BTreeMap<String, Option<Vec<u8>>> {
    let mut snapshot = BTreeMap::new();
    for entry in WalkDir::new(root).min_depth(1) {
        let entry = entry.expect("Failed to walk tree");
        let rel = entry
            .path()
            .strip_prefix(root)
            .expect("Entry outside root")
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");
        let content = if entry.file_type().is_file() {
            Some(fs::read(entry.path()).expect("Failed to read file"))
        } else {
            None
        };
        snapshot.insert(rel, content);
    }
    snapshot
}

/// Assert two folders hold the same names and bytes.
pub fn assert_trees_equal(left: &Path, right: &Path) {
    let l = tree_snapshot(left);
    let r = tree_snapshot(right);
    assert_eq!(
        l.keys().collect::<Vec<_>>(),
        r.keys().collect::<Vec<_>>(),
        "Trees {:?} and {:?} have different entries",
        left,
        right
    );
    for (path, content) in &l {
        assert_eq!(content, &r[path], "Content differs at {}", path);
    }
}

/// Assert a directory exists and is empty.
pub fn assert_dir_empty(path: &Path) {
    assert!(path.is_dir(), "{:?} should be a directory", path);
    let count = fs::read_dir(path).expect("Failed to read directory").count();
    assert_eq!(count, 0, "{:?} should be empty", path);
}

/// Assert a `griddle` command output contains a specific string.
#[macro_export]
macro_rules! assert_griddle_output_contains {
    ($ws:expr, $expected:expr, $($arg:expr),+ $(,)?) => {
        $ws.command()
            $(.arg($arg))+
            .assert()
            .success()
            .stdout(predicates::prelude::predicate::str::contains($expected))
    };
}
