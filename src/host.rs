use anyhow::{Context, Result};
use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use crate::{config, download, paths, win32};

/// Opaque handle of a top-level window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowHandle(pub isize);

/// A fire-and-forget process launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Launch {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    /// Suppress the OS error dialog when the launch fails.
    pub quiet: bool,
}

impl Launch {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            quiet: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }
}

/// Everything the actions need from the operating system.
pub trait Host {
    fn current_exe(&self) -> Result<PathBuf>;
    /// Install directory of the parent application.
    fn module_dir(&self) -> Result<PathBuf>;
    fn temp_dir(&self) -> PathBuf;
    fn pending_updates_dir(&self) -> Result<PathBuf>;
    /// Cached installer of the installed package, if any.
    fn installed_package_path(&self) -> Option<PathBuf>;
    fn download(&self, url: &str, dest: &Path) -> Result<()>;
    /// Ok means the OS accepted the launch request. Never waits for the child.
    fn launch(&self, launch: &Launch) -> Result<()>;
    fn install_package(&self, package: &Path) -> Result<()>;
    fn uninstall_package(&self, package: &Path) -> Result<()>;
    fn find_parent_window(&self) -> Option<WindowHandle>;
    fn request_close(&self, window: WindowHandle);
    fn show_error(&self, message: &str, title: &str);
    /// Output of `dotnet --list-runtimes`.
    fn list_runtimes(&self) -> Result<String>;
}

pub struct SystemHost;

impl Host for SystemHost {
    fn current_exe(&self) -> Result<PathBuf> {
        paths::self_path()
    }

    fn module_dir(&self) -> Result<PathBuf> {
        paths::module_dir()
    }

    fn temp_dir(&self) -> PathBuf {
        std::env::temp_dir()
    }

    fn pending_updates_dir(&self) -> Result<PathBuf> {
        Ok(paths::pending_updates_dir(&paths::data_root()?))
    }

    fn installed_package_path(&self) -> Option<PathBuf> {
        match win32::msi_package_path(config::MSI_UPGRADE_CODE) {
            Ok(path) => path,
            Err(err) => {
                tracing::warn!("package lookup failed: {err:#}");
                None
            }
        }
    }

    fn download(&self, url: &str, dest: &Path) -> Result<()> {
        download::download_file(url, dest)
    }

    fn launch(&self, launch: &Launch) -> Result<()> {
        win32::shell_execute(launch)
    }

    fn install_package(&self, package: &Path) -> Result<()> {
        win32::msi_install_product(package, None)
    }

    fn uninstall_package(&self, package: &Path) -> Result<()> {
        win32::msi_install_product(package, Some("REMOVE=ALL"))
    }

    fn find_parent_window(&self) -> Option<WindowHandle> {
        win32::find_window(config::TRAY_WINDOW_CLASS)
    }

    fn request_close(&self, window: WindowHandle) {
        win32::post_close(window);
    }

    fn show_error(&self, message: &str, title: &str) {
        win32::message_box_error(message, title);
    }

    fn list_runtimes(&self) -> Result<String> {
        let mut cmd = Command::new("dotnet");
        cmd.arg("--list-runtimes")
            .stdin(Stdio::null())
            .stderr(Stdio::null());
        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            const CREATE_NO_WINDOW: u32 = 0x08000000;
            cmd.creation_flags(CREATE_NO_WINDOW);
        }
        let output = cmd.output().context("run dotnet --list-runtimes")?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
