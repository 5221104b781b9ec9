use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::Result;
use crate::experiment::{paramset_file_name, Experiment};
use crate::legacy;

const YAML_PREFIX: &str = "parameters_";
const LEGACY_PREFIX: &str = "parameters";

/// Run name from a `parameters_<Name>.yaml` file, if it matches the
/// convention.
fn yaml_run_name(path: &Path) -> Option<String> {
    if !path.is_file() {
        return None;
    }
    // Only the .yaml convention is registered; every writer in the core
    // produces it, so a stray .yml file cannot shadow a real set.
    if path.extension()? != "yaml" {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    let name = stem.strip_prefix(YAML_PREFIX)?;
    (!name.is_empty()).then(|| name.to_string())
}

/// Run name from a `parameters<Name>` legacy directory, if it carries the
/// legacy manifest.
fn legacy_run_name(path: &Path) -> Option<String> {
    if !legacy::is_legacy_dir(path) {
        return None;
    }
    let dir_name = path.file_name()?.to_str()?;
    let name = dir_name.strip_prefix(LEGACY_PREFIX)?;
    (!name.is_empty()).then(|| name.to_string())
}

impl Experiment {
    /// Scan `dir` (non-recursive) for parameter sets in both YAML and
    /// legacy-directory form and register them all, sorted by name.
    ///
    /// A legacy directory without a matching YAML file is converted and
    /// written out once; a second scan finds the YAML and skips the
    /// conversion. Unreadable or malformed entries are logged and skipped,
    /// never raised. After scanning, the first registered run is activated;
    /// if its document fails to load the next ones are tried in order.
    pub fn populate_runs(&mut self, dir: &Path) -> Result<()> {
        let mut runs: BTreeMap<String, PathBuf> = BTreeMap::new();
        let mut legacy_dirs: Vec<(String, PathBuf)> = Vec::new();

        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "Cannot scan experiment directory");
                return Ok(());
            }
        };
        for entry in entries {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    warn!(dir = %dir.display(), error = %e, "Skipping unreadable entry");
                    continue;
                }
            };
            if let Some(name) = yaml_run_name(&path) {
                runs.insert(name, path);
            } else if let Some(name) = legacy_run_name(&path) {
                legacy_dirs.push((name, path));
            }
        }

        for (name, legacy_path) in legacy_dirs {
            if runs.contains_key(&name) {
                continue;
            }
            let yaml_path = dir.join(paramset_file_name(&name));
            match legacy::convert_dir(&legacy_path).and_then(|doc| doc.to_yaml(&yaml_path)) {
                Ok(()) => {
                    info!(run = %name, path = %yaml_path.display(), "Converted legacy run");
                    runs.insert(name, yaml_path);
                }
                Err(e) => {
                    warn!(run = %name, error = %e, "Skipping unconvertible legacy run");
                }
            }
        }

        let first_new = self.n_paramsets();
        for (name, path) in runs {
            if let Err(e) = self.add_paramset(&name, path) {
                warn!(run = %name, error = %e, "Skipping duplicate run");
            }
        }

        for index in first_new..self.n_paramsets() {
            match self.set_active(index) {
                Ok(()) => break,
                Err(e) => {
                    warn!(
                        run = %self.paramsets()[index].name,
                        error = %e,
                        "Discovered run failed to load"
                    );
                }
            }
        }
        Ok(())
    }
}
