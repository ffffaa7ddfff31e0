use std::fs;
use std::os::unix::fs::symlink;

use tempfile::TempDir;

use ocean_cmd::gather::gather;

#[test]
fn gather_moves_files_and_directories() {
    let run = TempDir::new().unwrap();
    let results = TempDir::new().unwrap();
    let results_dir = results.path().join("run1");

    fs::write(run.path().join("grid_T.nc"), b"results").unwrap();
    fs::write(run.path().join("namelist_cfg"), b"&namrun /").unwrap();
    let subdir = run.path().join("restart_files");
    fs::create_dir(&subdir).unwrap();
    fs::write(subdir.join("restart.nc"), b"restart").unwrap();

    gather(run.path(), &results_dir).unwrap();

    assert_eq!(
        fs::read_to_string(results_dir.join("grid_T.nc")).unwrap(),
        "results"
    );
    assert!(results_dir.join("namelist_cfg").exists());
    assert!(results_dir.join("restart_files").join("restart.nc").exists());
    assert_eq!(fs::read_dir(run.path()).unwrap().count(), 0);
}

#[test]
fn gather_deletes_symlinks_without_moving_them() {
    let run = TempDir::new().unwrap();
    let results = TempDir::new().unwrap();
    let results_dir = results.path().join("run1");

    let forcing = results.path().join("forcing.nc");
    fs::write(&forcing, b"forcing").unwrap();
    symlink(&forcing, run.path().join("forcing.nc")).unwrap();
    fs::write(run.path().join("grid_T.nc"), b"results").unwrap();

    gather(run.path(), &results_dir).unwrap();

    assert!(!results_dir.join("forcing.nc").exists());
    assert!(results_dir.join("grid_T.nc").exists());
    // The link target itself is untouched
    assert_eq!(fs::read_to_string(&forcing).unwrap(), "forcing");
    assert_eq!(fs::read_dir(run.path()).unwrap().count(), 0);
}

#[test]
fn gather_creates_results_dir() {
    let run = TempDir::new().unwrap();
    let results = TempDir::new().unwrap();
    let results_dir = results.path().join("deep").join("run1");

    fs::write(run.path().join("grid_T.nc"), b"results").unwrap();

    gather(run.path(), &results_dir).unwrap();

    assert!(results_dir.join("grid_T.nc").exists());
}

#[test]
fn gather_into_same_directory_moves_nothing() {
    let run = TempDir::new().unwrap();
    fs::write(run.path().join("grid_T.nc"), b"results").unwrap();

    gather(run.path(), run.path()).unwrap();

    assert!(run.path().join("grid_T.nc").exists());
}
