use anyhow::{anyhow, Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing_subscriber::EnvFilter;

use crate::paths;

const LOG_FILE_NAME: &str = "action_runner.log";
const LOG_FILTER_ENV: &str = "ACTION_RUNNER_LOG";

/// Opens (or creates) the log file under `<data_root>/Logs`.
pub fn open_log_file(data_root: &Path) -> Result<(PathBuf, fs::File)> {
    let dir = paths::logs_dir(data_root);
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    let log_path = dir.join(LOG_FILE_NAME);
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("open {}", log_path.display()))?;
    Ok((log_path, file))
}

pub fn init(data_root: &Path) -> Result<PathBuf> {
    let (log_path, file) = open_log_file(data_root)?;
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow!("install log subscriber: {err}"))?;
    Ok(log_path)
}
