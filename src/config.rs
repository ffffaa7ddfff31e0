use std::path::PathBuf;
use std::time::Duration;

/// Configuration for netCDF deflation jobs.
///
/// Each job runs the external compression tool as a child process:
/// `<tool> -4 -L<dfl_lvl> -O <filepath> <filepath>.tmp`.
#[derive(Debug, Clone)]
pub struct DeflateConfig {
    /// Compression tool invoked once per file
    pub tool: PathBuf,
    /// Lempel-Ziv deflation level passed to the tool
    pub dfl_lvl: u8,
    /// Interval between sweeps of the running-job pool
    pub poll_interval: Duration,
}

impl Default for DeflateConfig {
    fn default() -> Self {
        Self {
            tool: PathBuf::from("ncks"),
            dfl_lvl: 4,
            poll_interval: Duration::from_secs(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deflate_config_default() {
        let cfg = DeflateConfig::default();
        assert_eq!(cfg.tool, PathBuf::from("ncks"));
        assert_eq!(cfg.dfl_lvl, 4);
        assert_eq!(cfg.poll_interval, Duration::from_secs(1));
    }
}
