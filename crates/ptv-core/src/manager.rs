use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};

use crate::document::ConfigDocument;
use crate::error::Result;

/// Owns the working configuration: at most one loaded [`ConfigDocument`],
/// replaced wholesale on reload. This is the read surface the GUI and the
/// batch driver consume; they never touch the document file directly.
#[derive(Debug, Default)]
pub struct ParameterManager {
    doc: ConfigDocument,
}

impl ParameterManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the working document with the contents of `path`.
    pub fn from_yaml(&mut self, path: &Path) -> Result<()> {
        self.doc = ConfigDocument::from_yaml(path)?;
        Ok(())
    }

    /// Write the working document to `path`.
    pub fn to_yaml(&self, path: &Path) -> Result<()> {
        self.doc.to_yaml(path)
    }

    pub fn document(&self) -> &ConfigDocument {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut ConfigDocument {
        &mut self.doc
    }

    pub fn set_document(&mut self, doc: ConfigDocument) {
        self.doc = doc;
    }

    pub fn camera_count(&self) -> usize {
        self.doc.camera_count()
    }

    pub fn block(&self, name: &str) -> Mapping {
        self.doc.block(name)
    }

    pub fn set_block(&mut self, name: &str, block: Mapping) {
        self.doc.set_block(name, block);
    }

    /// The `ptv.splitter` flag; false when unset.
    pub fn splitter(&self) -> bool {
        self.doc
            .value("ptv", "splitter")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// The `sequence.base_name` list; empty when unset. Non-string entries
    /// are skipped.
    pub fn base_names(&self) -> Vec<String> {
        self.doc
            .value("sequence", "base_name")
            .and_then(Value::as_sequence)
            .map(|seq| {
                seq.iter()
                    .filter_map(Value::as_str)
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Derive the expected per-camera input path stems from the working
    /// document. Purely a function of the document; nothing on disk is
    /// probed, and callers verify existence themselves.
    ///
    /// Splitter mode (one sensor split into per-camera views): only the
    /// first base name is consulted, and the result is `camera_count`
    /// entries `cam1..camN` in its parent directory.
    ///
    /// Non-splitter mode: one entry per supplied base name, even when fewer
    /// than `camera_count` are configured. Entry `i` is the parent of base
    /// name `i` joined with `cam{i}` (1-indexed).
    pub fn target_filenames(&self) -> Vec<PathBuf> {
        let base_names = self.base_names();
        if self.splitter() {
            let Some(first) = base_names.first() else {
                return Vec::new();
            };
            let parent = Path::new(first).parent().unwrap_or(Path::new(""));
            (1..=self.camera_count())
                .map(|i| parent.join(format!("cam{i}")))
                .collect()
        } else {
            base_names
                .iter()
                .enumerate()
                .map(|(i, base)| {
                    let parent = Path::new(base).parent().unwrap_or(Path::new(""));
                    parent.join(format!("cam{}", i + 1))
                })
                .collect()
        }
    }
}
