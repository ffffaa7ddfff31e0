//! Gather results files from a run into a results directory.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Move all files and directories from `run_dir` into `results_dir`,
/// creating `results_dir` if it does not exist.
///
/// Symbolic links in `run_dir` point at run inputs rather than results;
/// they are deleted instead of moved, leaving `run_dir` empty.
pub fn gather(run_dir: &Path, results_dir: &Path) -> Result<()> {
    fs::create_dir_all(results_dir)?;
    let mut symlinks = HashSet::new();
    let mut contents = Vec::new();
    for entry in fs::read_dir(run_dir)? {
        let entry = entry?;
        if entry.file_type()?.is_symlink() {
            symlinks.insert(entry.path());
        } else {
            contents.push(entry.path());
        }
    }
    contents.sort();
    move_results(run_dir, results_dir, &contents)?;
    delete_symlinks(&symlinks)?;
    Ok(())
}

fn move_results(run_dir: &Path, results_dir: &Path, contents: &[PathBuf]) -> Result<()> {
    let abs_results_dir = results_dir.canonicalize()?;
    if run_dir.canonicalize()? == abs_results_dir {
        return Ok(());
    }
    tracing::info!("Moving run definition and results files...");
    for src in contents {
        if let Some(name) = src.file_name() {
            tracing::info!(
                "Moving {} to {}/",
                src.display(),
                abs_results_dir.display()
            );
            fs::rename(src, abs_results_dir.join(name))?;
        }
    }
    Ok(())
}

fn delete_symlinks(symlinks: &HashSet<PathBuf>) -> Result<()> {
    tracing::info!("Deleting symbolic links...");
    for link in symlinks {
        fs::remove_file(link)?;
    }
    Ok(())
}
