use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config;

const DATA_DIR_ENV: &str = "ACTION_RUNNER_DATA_DIR";

pub fn self_path() -> Result<PathBuf> {
    std::env::current_exe().context("current_exe")
}

/// Folder the running executable lives in.
pub fn module_dir() -> Result<PathBuf> {
    let exe = self_path()?;
    Ok(exe.parent().context("exe has no parent")?.to_path_buf())
}

/// Per-user data root, `%LOCALAPPDATA%\Microsoft\PowerToys` unless overridden.
pub fn data_root() -> Result<PathBuf> {
    if let Ok(dev_root) = std::env::var(DATA_DIR_ENV) {
        if !dev_root.trim().is_empty() {
            return Ok(PathBuf::from(dev_root));
        }
    }
    let local = std::env::var("LOCALAPPDATA").context("LOCALAPPDATA not set")?;
    Ok(PathBuf::from(local).join(config::DATA_DIR))
}

pub fn pending_updates_dir(data_root: &Path) -> PathBuf {
    data_root.join("Updates")
}

pub fn logs_dir(data_root: &Path) -> PathBuf {
    data_root.join("Logs")
}

pub fn self_copy_path(temp_dir: &Path) -> PathBuf {
    temp_dir.join(config::SELF_COPY_NAME)
}

pub fn app_exe_path(install_dir: &Path) -> PathBuf {
    install_dir.join(config::APP_EXE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn data_root_prefers_env() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let prior = std::env::var(DATA_DIR_ENV).ok();

        std::env::set_var(DATA_DIR_ENV, r"C:\Temp\RunnerData");
        let root = data_root().unwrap();
        assert_eq!(root, PathBuf::from(r"C:\Temp\RunnerData"));

        if let Some(v) = prior {
            std::env::set_var(DATA_DIR_ENV, v);
        } else {
            std::env::remove_var(DATA_DIR_ENV);
        }
    }

    #[test]
    fn data_root_uses_localappdata() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let prior_override = std::env::var(DATA_DIR_ENV).ok();
        let prior = std::env::var("LOCALAPPDATA").ok();

        std::env::remove_var(DATA_DIR_ENV);
        let tmp = tempfile::tempdir().unwrap();
        std::env::set_var("LOCALAPPDATA", tmp.path());

        let root = data_root().unwrap();
        assert_eq!(root, tmp.path().join(config::DATA_DIR));

        if let Some(v) = prior {
            std::env::set_var("LOCALAPPDATA", v);
        } else {
            std::env::remove_var("LOCALAPPDATA");
        }
        if let Some(v) = prior_override {
            std::env::set_var(DATA_DIR_ENV, v);
        }
    }

    #[test]
    fn updates_and_logs_live_under_data_root() {
        let root = PathBuf::from(r"C:\Users\me\AppData\Local\Microsoft\PowerToys");
        assert_eq!(pending_updates_dir(&root), root.join("Updates"));
        assert_eq!(logs_dir(&root), root.join("Logs"));
    }

    #[test]
    fn app_exe_is_rooted_in_install_dir() {
        let dir = PathBuf::from(r"C:\Program Files\App");
        assert_eq!(app_exe_path(&dir), dir.join(config::APP_EXE_NAME));
    }
}
