use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::document::ConfigDocument;
use crate::error::{PtvError, Result};
use crate::manager::ParameterManager;

/// One registry entry: a named, file-backed parameter set.
#[derive(Clone, Debug)]
pub struct Paramset {
    pub name: String,
    pub yaml_path: PathBuf,
}

/// Conventional file name for a parameter set: `parameters_<name>.yaml`.
pub fn paramset_file_name(name: &str) -> String {
    format!("parameters_{name}.yaml")
}

/// Conventional directory name for a set's legacy form: `parameters<name>`.
pub fn legacy_dir_name(name: &str) -> String {
    format!("parameters{name}")
}

/// The experiment model: an ordered registry of named parameter sets, at
/// most one of them active, plus the [`ParameterManager`] holding the
/// active set's document.
///
/// The active index is a field of the registry, never global state, so
/// independent experiments (and tests) cannot contaminate each other.
///
/// Every mutating operation stages its filesystem change first and commits
/// the in-memory registry only on success, so a failure partway never
/// leaves the registry pointing at a file that no longer exists under its
/// recorded name.
#[derive(Debug, Default)]
pub struct Experiment {
    paramsets: Vec<Paramset>,
    active: Option<usize>,
    pm: ParameterManager,
}

impl Experiment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paramsets(&self) -> &[Paramset] {
        &self.paramsets
    }

    pub fn n_paramsets(&self) -> usize {
        self.paramsets.len()
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn active_params(&self) -> Option<&Paramset> {
        self.active.map(|i| &self.paramsets[i])
    }

    pub fn manager(&self) -> &ParameterManager {
        &self.pm
    }

    pub fn manager_mut(&mut self) -> &mut ParameterManager {
        &mut self.pm
    }

    /// Camera count of the active document (0 when nothing is loaded).
    pub fn camera_count(&self) -> usize {
        self.pm.camera_count()
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.paramsets.iter().position(|ps| ps.name == name)
    }

    fn check_name_free(&self, name: &str) -> Result<()> {
        if self.index_of(name).is_some() {
            return Err(PtvError::DuplicateName(name.to_string()));
        }
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.paramsets.len() {
            return Err(PtvError::NotFound(format!(
                "index {index} out of range (total: {})",
                self.paramsets.len()
            )));
        }
        Ok(())
    }

    /// Register an existing parameter-set file under `name`.
    pub fn add_paramset(&mut self, name: &str, yaml_path: impl Into<PathBuf>) -> Result<()> {
        self.check_name_free(name)?;
        self.paramsets.push(Paramset {
            name: name.to_string(),
            yaml_path: yaml_path.into(),
        });
        Ok(())
    }

    /// Make the set at `index` active, loading its document into the
    /// manager. On any load failure the previously active set and its
    /// loaded document stay in place.
    pub fn set_active(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;
        let path = self.paramsets[index].yaml_path.clone();
        let doc = ConfigDocument::from_yaml(&path).map_err(|e| PtvError::Load {
            path: path.clone(),
            detail: e.to_string(),
        })?;
        self.pm.set_document(doc);
        self.active = Some(index);
        info!(name = %self.paramsets[index].name, "Activated parameter set");
        Ok(())
    }

    /// Write the working document back to the active set's file.
    pub fn save_parameters(&self) -> Result<()> {
        let active = self
            .active_params()
            .ok_or_else(|| PtvError::NotFound("no active parameter set".to_string()))?;
        self.pm.to_yaml(&active.yaml_path)
    }

    /// Copy `name`'s file to a `_copy` sibling and register the copy.
    /// Returns the new file path. When `<name>_copy` is taken the suffix
    /// ladder continues with `_copy2`, `_copy3`, ...
    pub fn duplicate_paramset(&mut self, name: &str) -> Result<PathBuf> {
        let src = self
            .index_of(name)
            .map(|i| self.paramsets[i].clone())
            .ok_or_else(|| PtvError::NotFound(name.to_string()))?;

        // Skip names that are registered or whose conventional file already
        // sits on disk, so an unregistered copy is never overwritten.
        let parent = src.yaml_path.parent().unwrap_or(Path::new(""));
        let mut copy_name = format!("{name}_copy");
        let mut n = 2;
        while self.index_of(&copy_name).is_some()
            || parent.join(paramset_file_name(&copy_name)).exists()
        {
            copy_name = format!("{name}_copy{n}");
            n += 1;
        }

        let dest = parent.join(paramset_file_name(&copy_name));
        fs::copy(&src.yaml_path, &dest)?;
        self.paramsets.push(Paramset {
            name: copy_name.clone(),
            yaml_path: dest.clone(),
        });
        info!(from = %name, to = %copy_name, "Duplicated parameter set");
        Ok(dest)
    }

    /// Create `<dir>/parameters_<name>.yaml` and register it. The file is
    /// seeded from a snapshot of the active document when requested (and
    /// one is loaded), otherwise from the minimal default document.
    pub fn create_new_paramset(
        &mut self,
        name: &str,
        dir: &Path,
        copy_from_active: bool,
    ) -> Result<PathBuf> {
        self.check_name_free(name)?;
        let path = dir.join(paramset_file_name(name));
        if path.exists() {
            return Err(PtvError::DuplicateName(name.to_string()));
        }
        let doc = if copy_from_active && self.active.is_some() {
            self.pm.document().clone()
        } else {
            ConfigDocument::minimal()
        };
        doc.to_yaml(&path)?;
        self.paramsets.push(Paramset {
            name: name.to_string(),
            yaml_path: path.clone(),
        });
        info!(name = %name, path = %path.display(), "Created parameter set");
        Ok(path)
    }

    /// Rename a set and its backing file. Returns the updated entry and
    /// the new file path.
    pub fn rename_paramset(&mut self, old_name: &str, new_name: &str) -> Result<(Paramset, PathBuf)> {
        self.check_name_free(new_name)?;
        let index = self
            .index_of(old_name)
            .ok_or_else(|| PtvError::NotFound(old_name.to_string()))?;

        let old_path = self.paramsets[index].yaml_path.clone();
        let parent = old_path.parent().unwrap_or(Path::new(""));
        let new_path = parent.join(paramset_file_name(new_name));
        fs::rename(&old_path, &new_path)?;

        let ps = &mut self.paramsets[index];
        ps.name = new_name.to_string();
        ps.yaml_path = new_path.clone();
        info!(from = %old_name, to = %new_name, "Renamed parameter set");
        Ok((ps.clone(), new_path))
    }

    /// Permanently delete the set at `index` together with its file. The
    /// active set may never be hard-deleted; retire it with
    /// [`remove_paramset`](Self::remove_paramset) instead.
    pub fn delete_paramset(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;
        if self.active == Some(index) {
            return Err(PtvError::ActiveDeletion(self.paramsets[index].name.clone()));
        }
        fs::remove_file(&self.paramsets[index].yaml_path)?;
        let ps = self.paramsets.remove(index);
        if let Some(a) = self.active {
            if a > index {
                self.active = Some(a - 1);
            }
        }
        info!(name = %ps.name, "Deleted parameter set");
        Ok(())
    }

    /// Retire the set at `index`: its file is renamed to a `.bck` backup
    /// (content preserved for manual recovery), any co-located legacy
    /// directory named after the set is deleted, and the entry is dropped.
    /// Unlike [`delete_paramset`](Self::delete_paramset) this is permitted
    /// on the active set.
    pub fn remove_paramset(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;
        let yaml_path = self.paramsets[index].yaml_path.clone();
        let name = self.paramsets[index].name.clone();

        // The rename is the last staged filesystem change: a failure at any
        // earlier point leaves the entry and its backing file untouched, and
        // a failure of the rename itself leaves them consistent too.
        let parent = yaml_path.parent().unwrap_or(Path::new(""));
        let legacy_dir = parent.join(legacy_dir_name(&name));
        if legacy_dir.is_dir() {
            fs::remove_dir_all(&legacy_dir)?;
        }

        let backup = yaml_path.with_extension("bck");
        fs::rename(&yaml_path, &backup)?;

        self.paramsets.remove(index);
        match self.active {
            Some(a) if a == index => self.active = None,
            Some(a) if a > index => self.active = Some(a - 1),
            _ => {}
        }
        info!(name = %name, backup = %backup.display(), "Removed parameter set");
        Ok(())
    }
}
