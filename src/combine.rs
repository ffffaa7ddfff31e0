//! Combine per-processor results files from an MPI run into single files.
//!
//! An MPI run leaves one results file per processor, named
//! `<root>_0000.nc` through `<root>_NNNN.nc` for each output stream. The
//! model's `rebuild_nemo` tool stitches each set back into a single
//! `<root>.nc` file; the per-processor files are deleted afterwards.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use serde_yaml::Value;
use tokio::process::Command;

use crate::error::{OceanError, Result};
use crate::run_desc;

/// Run the rebuild tool for each set of per-processor results files in
/// `run_dir`, then delete the per-processor files.
///
/// The tool's output for each file set is logged at info level. Does
/// nothing if `run_dir` holds no `*_0000.nc` files.
pub async fn combine(run_dir: &Path, run_desc_file: &Path) -> Result<()> {
    let run_desc = run_desc::load(run_desc_file)?;
    let name_roots = results_file_roots(run_dir)?;
    if name_roots.is_empty() {
        return Ok(());
    }
    let rebuild_tool = find_rebuild_tool(&run_desc)?;
    combine_results_files(run_dir, &rebuild_tool, &name_roots).await?;
    delete_per_proc_files(run_dir, &name_roots)?;
    Ok(())
}

/// Name roots of the per-processor file sets in `run_dir`: the stems of
/// `*_0000.nc` files with the processor suffix stripped.
fn results_file_roots(run_dir: &Path) -> Result<Vec<String>> {
    let mut roots = Vec::new();
    for entry in fs::read_dir(run_dir)? {
        let name = entry?.file_name();
        if let Some(root) = name.to_string_lossy().strip_suffix("_0000.nc") {
            roots.push(root.to_string());
        }
    }
    roots.sort();
    if roots.is_empty() {
        tracing::info!("no files found that match the *_0000.nc pattern");
    }
    Ok(roots)
}

/// Locate the rebuild tool relative to the model code config directory
/// named in the run description.
fn find_rebuild_tool(run_desc: &Value) -> Result<PathBuf> {
    // Resolve symlinks before stepping up to the TOOLS tree
    let code_config = run_desc::get_path(run_desc, &["paths", "NEMO code config"])?.canonicalize()?;
    let rebuild_exec = code_config
        .join("..")
        .join("TOOLS")
        .join("REBUILD_NEMO")
        .join("rebuild_nemo.exe");
    if !rebuild_exec.exists() {
        tracing::error!(
            "{} not found - did you forget to build it?",
            rebuild_exec.display()
        );
        return Err(OceanError::ToolNotFound(rebuild_exec));
    }
    // The executable is driven by a wrapper script of the same name
    Ok(rebuild_exec.with_extension(""))
}

async fn combine_results_files(
    run_dir: &Path,
    rebuild_tool: &Path,
    name_roots: &[String],
) -> Result<()> {
    for root in name_roots {
        let nfiles = per_proc_files(run_dir, root)?.len();
        if nfiles == 1 {
            // Results from a single processor are simply renamed
            fs::rename(
                run_dir.join(format!("{root}_0000.nc")),
                run_dir.join(format!("{root}.nc")),
            )?;
            tracing::info!("{root}_0000.nc renamed to {root}.nc");
            continue;
        }
        tracing::info!("{} {root} {nfiles}", rebuild_tool.display());
        let output = Command::new(rebuild_tool)
            .arg(root)
            .arg(nfiles.to_string())
            .current_dir(run_dir)
            .stdin(Stdio::null())
            .output()
            .await?;
        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        if !output.status.success() {
            tracing::error!("{}", text.trim_end());
            return Err(OceanError::RebuildFailed(root.clone()));
        }
        tracing::info!("{}", text.trim_end());
        // The tool leaves its generated namelist behind
        let namelist = run_dir.join("nam_rebuild");
        if namelist.exists() {
            fs::remove_file(namelist)?;
        }
    }
    Ok(())
}

fn delete_per_proc_files(run_dir: &Path, name_roots: &[String]) -> Result<()> {
    tracing::info!("Deleting per-processor files...");
    for root in name_roots {
        for filepath in per_proc_files(run_dir, root)? {
            fs::remove_file(filepath)?;
        }
    }
    Ok(())
}

/// Files in `run_dir` matching `<root>_NNNN.nc` with a 4-digit processor
/// number.
fn per_proc_files(run_dir: &Path, root: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(run_dir)? {
        let entry = entry?;
        if is_per_proc_file(&entry.file_name().to_string_lossy(), root) {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

fn is_per_proc_file(name: &str, root: &str) -> bool {
    name.strip_prefix(root)
        .and_then(|rest| rest.strip_prefix('_'))
        .and_then(|rest| rest.strip_suffix(".nc"))
        .map(|digits| digits.len() == 4 && digits.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(false)
}
