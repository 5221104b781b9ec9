use std::fs;
use std::path::Path;

use tempfile::tempdir;

use ptv_core::error::PtvError;
use ptv_core::experiment::Experiment;

/// Minimal loadable parameter set, one base name per camera.
fn write_minimal_yaml(path: &Path, num_cams: usize) {
    let mut text = format!("num_cams: {num_cams}\nptv:\n  splitter: false\n");
    text.push_str("sequence:\n  base_name:\n");
    for i in 1..=num_cams {
        text.push_str(&format!("    - img/cam{i}_00000\n"));
    }
    fs::write(path, text).unwrap();
}

/// Minimal legacy parameter directory with a valid ptv.par.
fn write_minimal_legacy_dir(dir: &Path, num_cams: usize) {
    fs::create_dir_all(dir).unwrap();
    let mut lines = vec![num_cams.to_string()];
    for i in 1..=num_cams {
        lines.push(format!("img/cam{i}.10002"));
        lines.push(format!("cal/cam{i}.tif"));
    }
    for constant in [
        "1", "0", "1", "1280", "1024", "0.012", "0.012", "0", "1", "1.33", "1.46", "6",
    ] {
        lines.push(constant.to_string());
    }
    fs::write(dir.join("ptv.par"), lines.join("\n") + "\n").unwrap();
}

#[test]
fn test_add_set_active_and_save() {
    let dir = tempdir().unwrap();
    let yaml_a = dir.path().join("parameters_A.yaml");
    write_minimal_yaml(&yaml_a, 2);

    let mut exp = Experiment::new();
    exp.add_paramset("A", &yaml_a).unwrap();
    assert_eq!(exp.n_paramsets(), 1);

    exp.set_active(0).unwrap();
    assert_eq!(exp.active_params().unwrap().name, "A");
    assert_eq!(exp.camera_count(), 2);

    exp.save_parameters().unwrap();
    assert!(yaml_a.exists());
    // Saved file loads back with the same count.
    let mut exp2 = Experiment::new();
    exp2.add_paramset("A", &yaml_a).unwrap();
    exp2.set_active(0).unwrap();
    assert_eq!(exp2.camera_count(), 2);
}

#[test]
fn test_add_duplicate_name_fails() {
    let dir = tempdir().unwrap();
    let yaml_a = dir.path().join("parameters_A.yaml");
    write_minimal_yaml(&yaml_a, 2);

    let mut exp = Experiment::new();
    exp.add_paramset("A", &yaml_a).unwrap();
    let err = exp.add_paramset("A", &yaml_a).unwrap_err();
    assert!(matches!(err, PtvError::DuplicateName(_)), "got: {err:?}");
}

#[test]
fn test_set_active_failure_keeps_previous_state() {
    let dir = tempdir().unwrap();
    let yaml_a = dir.path().join("parameters_A.yaml");
    write_minimal_yaml(&yaml_a, 2);

    let mut exp = Experiment::new();
    exp.add_paramset("A", &yaml_a).unwrap();
    exp.add_paramset("B", dir.path().join("parameters_B.yaml"))
        .unwrap(); // backing file never written
    exp.set_active(0).unwrap();

    let err = exp.set_active(1).unwrap_err();
    assert!(matches!(err, PtvError::Load { .. }), "got: {err:?}");
    // The transition is atomic: A stays active with its document loaded.
    assert_eq!(exp.active_index(), Some(0));
    assert_eq!(exp.active_params().unwrap().name, "A");
    assert_eq!(exp.camera_count(), 2);
}

#[test]
fn test_set_active_out_of_range() {
    let mut exp = Experiment::new();
    let err = exp.set_active(0).unwrap_err();
    assert!(matches!(err, PtvError::NotFound(_)), "got: {err:?}");
}

#[test]
fn test_duplicate_paramset() {
    let dir = tempdir().unwrap();
    let yaml_a = dir.path().join("parameters_A.yaml");
    write_minimal_yaml(&yaml_a, 3);

    let mut exp = Experiment::new();
    exp.add_paramset("A", &yaml_a).unwrap();
    exp.set_active(0).unwrap();

    let dup = exp.duplicate_paramset("A").unwrap();
    assert!(dup.exists());
    assert_eq!(dup.file_name().unwrap(), "parameters_A_copy.yaml");
    assert!(exp.paramsets().iter().any(|ps| ps.name == "A_copy"));

    // A second duplicate walks the suffix ladder.
    let dup2 = exp.duplicate_paramset("A").unwrap();
    assert_eq!(dup2.file_name().unwrap(), "parameters_A_copy2.yaml");
    assert!(exp.paramsets().iter().any(|ps| ps.name == "A_copy2"));

    let err = exp.duplicate_paramset("missing").unwrap_err();
    assert!(matches!(err, PtvError::NotFound(_)), "got: {err:?}");
}

#[test]
fn test_duplicate_skips_unregistered_file_on_disk() {
    let dir = tempdir().unwrap();
    let yaml_a = dir.path().join("parameters_A.yaml");
    write_minimal_yaml(&yaml_a, 2);

    // A copy file that exists on disk but was never registered must not be
    // overwritten; the suffix ladder walks past it.
    let stray = dir.path().join("parameters_A_copy.yaml");
    fs::write(&stray, "num_cams: 9\n").unwrap();

    let mut exp = Experiment::new();
    exp.add_paramset("A", &yaml_a).unwrap();
    let dup = exp.duplicate_paramset("A").unwrap();

    assert_eq!(dup.file_name().unwrap(), "parameters_A_copy2.yaml");
    assert!(exp.paramsets().iter().any(|ps| ps.name == "A_copy2"));
    assert_eq!(fs::read_to_string(&stray).unwrap(), "num_cams: 9\n");
}

#[test]
fn test_create_new_paramset() {
    let dir = tempdir().unwrap();
    let yaml_a = dir.path().join("parameters_A.yaml");
    write_minimal_yaml(&yaml_a, 3);

    let mut exp = Experiment::new();
    exp.add_paramset("A", &yaml_a).unwrap();
    exp.set_active(0).unwrap();

    // Copied from the active document: snapshot, not a live link.
    let new_yaml = exp
        .create_new_paramset("B", dir.path(), true)
        .unwrap();
    assert!(new_yaml.exists());
    assert_eq!(new_yaml.file_name().unwrap(), "parameters_B.yaml");
    let idx_b = exp
        .paramsets()
        .iter()
        .position(|ps| ps.name == "B")
        .unwrap();
    exp.set_active(idx_b).unwrap();
    assert_eq!(exp.camera_count(), 3);

    // Default-seeded set.
    let yaml_c = exp.create_new_paramset("C", dir.path(), false).unwrap();
    assert!(yaml_c.exists());
    let idx_c = exp
        .paramsets()
        .iter()
        .position(|ps| ps.name == "C")
        .unwrap();
    exp.set_active(idx_c).unwrap();
    assert_eq!(exp.camera_count(), 1);

    let err = exp.create_new_paramset("B", dir.path(), false).unwrap_err();
    assert!(matches!(err, PtvError::DuplicateName(_)), "got: {err:?}");
}

#[test]
fn test_create_refuses_unregistered_file_on_disk() {
    let dir = tempdir().unwrap();
    let stray = dir.path().join("parameters_B.yaml");
    fs::write(&stray, "num_cams: 9\n").unwrap();

    let mut exp = Experiment::new();
    let err = exp.create_new_paramset("B", dir.path(), false).unwrap_err();
    assert!(matches!(err, PtvError::DuplicateName(_)), "got: {err:?}");
    assert_eq!(fs::read_to_string(&stray).unwrap(), "num_cams: 9\n");
}

#[test]
fn test_rename_paramset() {
    let dir = tempdir().unwrap();
    let yaml_b = dir.path().join("parameters_B.yaml");
    write_minimal_yaml(&yaml_b, 2);

    let mut exp = Experiment::new();
    exp.add_paramset("B", &yaml_b).unwrap();

    let (ps, new_yaml) = exp.rename_paramset("B", "C").unwrap();
    assert_eq!(ps.name, "C");
    assert_eq!(new_yaml.file_name().unwrap(), "parameters_C.yaml");
    assert!(new_yaml.exists());
    assert!(!yaml_b.exists());
    assert_eq!(
        exp.paramsets().iter().filter(|ps| ps.name == "C").count(),
        1
    );
    assert!(exp.paramsets().iter().all(|ps| ps.name != "B"));

    let err = exp.rename_paramset("missing", "D").unwrap_err();
    assert!(matches!(err, PtvError::NotFound(_)), "got: {err:?}");

    let yaml_d = dir.path().join("parameters_D.yaml");
    write_minimal_yaml(&yaml_d, 2);
    exp.add_paramset("D", &yaml_d).unwrap();
    let err = exp.rename_paramset("D", "C").unwrap_err();
    assert!(matches!(err, PtvError::DuplicateName(_)), "got: {err:?}");
}

#[test]
fn test_delete_paramset() {
    let dir = tempdir().unwrap();
    let yaml_d = dir.path().join("parameters_D.yaml");
    let yaml_e = dir.path().join("parameters_E.yaml");
    write_minimal_yaml(&yaml_d, 2);
    write_minimal_yaml(&yaml_e, 2);

    let mut exp = Experiment::new();
    exp.add_paramset("D", &yaml_d).unwrap();
    exp.add_paramset("E", &yaml_e).unwrap();
    exp.set_active(0).unwrap();

    // The active set may never be hard-deleted.
    let err = exp.delete_paramset(0).unwrap_err();
    assert!(matches!(err, PtvError::ActiveDeletion(_)), "got: {err:?}");
    assert!(yaml_d.exists());
    assert_eq!(exp.n_paramsets(), 2);

    exp.delete_paramset(1).unwrap();
    assert!(!yaml_e.exists());
    assert!(exp.paramsets().iter().all(|ps| ps.name != "E"));
    assert_eq!(exp.active_params().unwrap().name, "D");
}

#[test]
fn test_delete_shifts_active_index() {
    let dir = tempdir().unwrap();
    let yaml_a = dir.path().join("parameters_A.yaml");
    let yaml_b = dir.path().join("parameters_B.yaml");
    write_minimal_yaml(&yaml_a, 2);
    write_minimal_yaml(&yaml_b, 3);

    let mut exp = Experiment::new();
    exp.add_paramset("A", &yaml_a).unwrap();
    exp.add_paramset("B", &yaml_b).unwrap();
    exp.set_active(1).unwrap();

    exp.delete_paramset(0).unwrap();
    assert_eq!(exp.active_index(), Some(0));
    assert_eq!(exp.active_params().unwrap().name, "B");
    assert_eq!(exp.camera_count(), 3);
}

#[test]
fn test_remove_paramset_backs_up_and_clears_legacy_dir() {
    let dir = tempdir().unwrap();
    let yaml_c = dir.path().join("parameters_C.yaml");
    write_minimal_yaml(&yaml_c, 2);

    // Co-located legacy directory tied to the set by name.
    let legacy_dir = dir.path().join("parametersC");
    write_minimal_legacy_dir(&legacy_dir, 2);

    let mut exp = Experiment::new();
    exp.add_paramset("C", &yaml_c).unwrap();
    // Removing the active set is permitted, unlike delete.
    exp.set_active(0).unwrap();

    exp.remove_paramset(0).unwrap();
    assert_eq!(exp.n_paramsets(), 0);
    assert_eq!(exp.active_index(), None);
    assert!(!yaml_c.exists());
    assert!(yaml_c.with_extension("bck").exists());
    assert!(!legacy_dir.exists());
}

#[test]
fn test_remove_failure_leaves_registry_consistent() {
    let dir = tempdir().unwrap();
    let yaml_c = dir.path().join("parameters_C.yaml");
    write_minimal_yaml(&yaml_c, 2);

    // A directory squatting on the backup path makes the rename fail.
    fs::create_dir(dir.path().join("parameters_C.bck")).unwrap();

    let mut exp = Experiment::new();
    exp.add_paramset("C", &yaml_c).unwrap();
    exp.set_active(0).unwrap();

    let err = exp.remove_paramset(0).unwrap_err();
    assert!(matches!(err, PtvError::Io(_)), "got: {err:?}");
    // The entry survives and still points at a file that exists.
    assert_eq!(exp.n_paramsets(), 1);
    assert_eq!(exp.active_params().unwrap().name, "C");
    assert!(exp.paramsets()[0].yaml_path.exists());
}

#[test]
fn test_save_without_active_set_fails() {
    let exp = Experiment::new();
    let err = exp.save_parameters().unwrap_err();
    assert!(matches!(err, PtvError::NotFound(_)), "got: {err:?}");
}
