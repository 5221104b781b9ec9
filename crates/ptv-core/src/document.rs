use std::fs;
use std::path::Path;

use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::error::{PtvError, Result};

/// Top-level key holding the camera count.
pub const NUM_CAMS_KEY: &str = "num_cams";

/// One experiment configuration: an open-ended nested YAML mapping with
/// typed accessors layered on top for the fields the core consumes.
///
/// Unknown blocks and keys round-trip untouched, so downstream consumers
/// can carry parameters the manager itself never interprets.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConfigDocument {
    root: Mapping,
}

impl ConfigDocument {
    /// Empty document: no camera count, no blocks. `camera_count()` reads 0
    /// until `num_cams` is set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Minimal well-formed document used to seed a freshly created
    /// parameter set: one camera, empty `ptv`/`sequence`/`track` blocks.
    pub fn minimal() -> Self {
        let mut doc = Self::new();
        doc.set_camera_count(1);

        let mut ptv = Mapping::new();
        ptv.insert(Value::from("splitter"), Value::Bool(false));
        doc.set_block("ptv", ptv);

        let mut sequence = Mapping::new();
        sequence.insert(Value::from("base_name"), Value::Sequence(Vec::new()));
        doc.set_block("sequence", sequence);

        doc.set_block("track", Mapping::new());
        doc
    }

    /// Parse the YAML file at `path`.
    ///
    /// An absent, empty or malformed file is a `Parse` error; a well-formed
    /// document without `num_cams` is a `Schema` error.
    pub fn from_yaml(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| PtvError::Parse(format!("cannot read {}: {e}", path.display())))?;
        if text.trim().is_empty() {
            return Err(PtvError::Parse(format!("{} is empty", path.display())));
        }

        let value: Value = serde_yaml::from_str(&text)
            .map_err(|e| PtvError::Parse(format!("{}: {e}", path.display())))?;
        let root = match value {
            Value::Mapping(m) => m,
            _ => {
                return Err(PtvError::Parse(format!(
                    "{}: top level is not a mapping",
                    path.display()
                )))
            }
        };

        if root.get(NUM_CAMS_KEY).is_none() {
            return Err(PtvError::Schema(format!(
                "{}: missing required key '{NUM_CAMS_KEY}'",
                path.display()
            )));
        }

        debug!(path = %path.display(), "Loaded parameter document");
        Ok(Self { root })
    }

    /// Serialize to `path`, overwriting any existing file. Parent
    /// directories are created if absent.
    pub fn to_yaml(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let text = serde_yaml::to_string(&self.root)?;
        fs::write(path, text)?;
        debug!(path = %path.display(), "Saved parameter document");
        Ok(())
    }

    /// Stored camera count, or 0 when unset or non-positive ("not
    /// configured"). Callers must not derive paths from a 0 count.
    pub fn camera_count(&self) -> usize {
        self.root
            .get(NUM_CAMS_KEY)
            .and_then(Value::as_u64)
            .unwrap_or(0) as usize
    }

    pub fn set_camera_count(&mut self, count: usize) {
        self.root
            .insert(Value::from(NUM_CAMS_KEY), Value::from(count as u64));
    }

    /// Named parameter block. A missing block reads as an empty mapping.
    pub fn block(&self, name: &str) -> Mapping {
        self.root
            .get(name)
            .and_then(Value::as_mapping)
            .cloned()
            .unwrap_or_default()
    }

    /// Replace a named parameter block wholesale.
    pub fn set_block(&mut self, name: &str, block: Mapping) {
        self.root.insert(Value::from(name), Value::Mapping(block));
    }

    /// Single value inside a named block, if present.
    pub fn value(&self, block: &str, key: &str) -> Option<&Value> {
        self.root.get(block)?.as_mapping()?.get(key)
    }

    /// Set a single value inside a named block, creating the block if needed.
    /// A scalar squatting on the block name is replaced by a mapping.
    pub fn set_value(&mut self, block: &str, key: &str, value: Value) {
        let entry = self
            .root
            .entry(Value::from(block))
            .or_insert_with(|| Value::Mapping(Mapping::new()));
        if !entry.is_mapping() {
            *entry = Value::Mapping(Mapping::new());
        }
        if let Some(m) = entry.as_mapping_mut() {
            m.insert(Value::from(key), value);
        }
    }

    pub fn root(&self) -> &Mapping {
        &self.root
    }
}
