// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2025 Griddle Contributors

//! Test fixtures.
//!
//! Builders for asset folders and the archives the remote serves for them.

use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Deterministic sample content.
pub struct TestFixtures;

impl TestFixtures {
    /// Minimal USD ascii layer naming a single prim.
    pub fn usda_stage(prim: &str) -> Vec<u8> {
        format!(
            "#usda 1.0\n(\n    defaultPrim = \"{prim}\"\n)\n\ndef Xform \"{prim}\"\n{{\n}}\n"
        )
        .into_bytes()
    }

    /// Binary file with predictable but varied content.
    pub fn binary_file(size: usize) -> Vec<u8> {
        (0..size).map(|i| (i % 251) as u8).collect()
    }
}

/// Declarative folder tree for tests.
///
/// # Example
/// ```ignore
/// let tree = AssetTree::new()
///     .file("scene.usda", TestFixtures::usda_stage("Chair"))
///     .dir("textures");
/// let dir = tree.materialize();
/// let archive = tree.to_archive();
/// ```
#[derive(Debug, Clone, Default)]
pub struct AssetTree {
    files: Vec<(String, Vec<u8>)>,
    dirs: Vec<String>,
}

impl AssetTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// A small but realistic asset: a stage, a texture and an empty folder.
    pub fn sample(name: &str) -> Self {
        Self::new()
            .file(&format!("{name}.usda"), TestFixtures::usda_stage(name))
            .file("textures/albedo.png", TestFixtures::binary_file(4096))
            .dir("cache")
    }

    /// Add a file at a `/`-separated relative path.
    pub fn file(mut self, path: &str, content: impl Into<Vec<u8>>) -> Self {
        self.files.push((path.to_string(), content.into()));
        self
    }

    /// Add an (empty) directory.
    pub fn dir(mut self, path: &str) -> Self {
        self.dirs.push(path.to_string());
        self
    }

    /// Write the tree under `root`, creating it if needed.
    pub fn write_to(&self, root: &Path) {
        fs::create_dir_all(root).expect("Failed to create tree root");
        for dir in &self.dirs {
            fs::create_dir_all(root.join(dir)).expect("Failed to create directory");
        }
        for (path, content) in &self.files {
            let full = root.join(path);
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent).expect("Failed to create parent directories");
            }
            fs::write(&full, content).expect("Failed to write file");
        }
    }

    /// Write the tree into a fresh temporary directory.
    pub fn materialize(&self) -> TempDir {
        let dir = TempDir::new().expect("Failed to create temp directory");
        self.write_to(dir.path());
        dir
    }

    /// Encode the tree as a `.zip`, the format versions are served in.
    ///
    /// Entries are stored uncompressed with the host's timestamps, so the
    /// bytes differ from what the sync engine packs for the same tree.
    pub fn to_archive(&self) -> Vec<u8> {
        let dir = self.materialize();
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        let options = || {
            zip::write::SimpleFileOptions::default()
                .compression_method(zip::CompressionMethod::Stored)
        };

        for entry in walkdir::WalkDir::new(dir.path()).min_depth(1).sort_by_file_name() {
            let entry = entry.expect("Failed to walk fixture tree");
            let rel = entry
                .path()
                .strip_prefix(dir.path())
                .expect("Entry outside fixture root")
                .to_string_lossy()
                .replace('\\', "/");
            if entry.file_type().is_dir() {
                writer
                    .add_directory(rel, options())
                    .expect("Failed to add directory");
            } else {
                writer.start_file(rel, options()).expect("Failed to start file");
                let content = fs::read(entry.path()).expect("Failed to read fixture file");
                std::io::Write::write_all(&mut writer, &content).expect("Failed to write file");
            }
        }

        writer
            .finish()
            .expect("Failed to finish zip archive")
            .into_inner()
    }
}
