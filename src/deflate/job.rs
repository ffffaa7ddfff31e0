use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use tokio::process::{Child, Command};

use crate::error::Result;

/// One file's unit of deflation work.
///
/// A job is created in the pending state, owns its child process exclusively
/// after [`start`](DeflateJob::start), and is consumed by
/// [`finish`](DeflateJob::finish) once the process has been observed to exit.
#[derive(Debug)]
pub struct DeflateJob {
    filepath: PathBuf,
    dfl_lvl: u8,
    child: Option<Child>,
    pid: Option<u32>,
}

/// Result of polling a running job's child process.
#[derive(Debug)]
pub enum JobPoll {
    Running,
    Exited(ExitStatus),
}

/// Final disposition of a completed job.
#[derive(Debug)]
pub enum JobOutcome {
    /// The temporary output replaced the original file
    Succeeded,
    /// The original file was left untouched; `output` is the tool's
    /// combined stdout and stderr
    Failed { output: String },
}

impl DeflateJob {
    pub fn new(filepath: PathBuf, dfl_lvl: u8) -> Self {
        Self {
            filepath,
            dfl_lvl,
            child: None,
            pid: None,
        }
    }

    pub fn filepath(&self) -> &Path {
        &self.filepath
    }

    /// Path of the compressed output written alongside the original.
    fn tmp_path(&self) -> PathBuf {
        let mut name = self.filepath.as_os_str().to_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }

    /// Spawn the compression process for this job's file.
    ///
    /// Returns the child's process id, used as the job's key while in
    /// flight. A spawn failure (tool not found or not executable) indicates
    /// a broken environment and is propagated to the caller.
    pub fn start(&mut self, tool: &Path) -> Result<u32> {
        let child = Command::new(tool)
            .arg("-4")
            .arg(format!("-L{}", self.dfl_lvl))
            .arg("-O")
            .arg(&self.filepath)
            .arg(self.tmp_path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;
        let pid = child
            .id()
            .ok_or_else(|| std::io::Error::other("child process exited before its id was read"))?;
        self.child = Some(child);
        self.pid = Some(pid);
        Ok(pid)
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Check the child process for termination without blocking.
    pub fn poll(&mut self) -> Result<JobPoll> {
        match self.child.as_mut() {
            Some(child) => match child.try_wait()? {
                Some(status) => Ok(JobPoll::Exited(status)),
                None => Ok(JobPoll::Running),
            },
            None => Ok(JobPoll::Running),
        }
    }

    /// Complete a job whose process has exited.
    ///
    /// Drains the child's captured output, then promotes the temporary
    /// output over the original file if the process exited successfully and
    /// the output exists. On failure the temporary file is removed and the
    /// original is left byte-identical to its pre-job state.
    pub async fn finish(mut self, status: ExitStatus) -> Result<JobOutcome> {
        let output = match self.child.take() {
            Some(child) => {
                let out = child.wait_with_output().await?;
                let mut text = String::from_utf8_lossy(&out.stdout).into_owned();
                text.push_str(&String::from_utf8_lossy(&out.stderr));
                text
            }
            None => String::new(),
        };
        let tmp = self.tmp_path();
        if status.success() && tmp.exists() {
            tokio::fs::rename(&tmp, &self.filepath).await?;
            Ok(JobOutcome::Succeeded)
        } else {
            if tmp.exists() {
                let _ = tokio::fs::remove_file(&tmp).await;
            }
            Ok(JobOutcome::Failed { output })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tmp_path_appends_suffix() {
        let job = DeflateJob::new(PathBuf::from("results/a.nc"), 4);
        assert_eq!(job.tmp_path(), PathBuf::from("results/a.nc.tmp"));
    }

    #[test]
    fn new_job_is_pending() {
        let mut job = DeflateJob::new(PathBuf::from("a.nc"), 4);
        assert!(job.pid().is_none());
        assert!(matches!(job.poll(), Ok(JobPoll::Running)));
    }
}
