use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::{
    host::{Host, Launch},
    paths,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UninstallOutcome {
    NothingInstalled,
    Uninstalled,
}

/// Removes the installed package, then relaunches the parent that the
/// uninstaller terminated. The relaunch is fire-and-forget.
pub fn uninstall_package(host: &impl Host) -> Result<UninstallOutcome> {
    let Some(package) = host.installed_package_path() else {
        info!("no installed package found, nothing to uninstall");
        return Ok(UninstallOutcome::NothingInstalled);
    };

    host.uninstall_package(&package)
        .with_context(|| format!("uninstall {}", package.display()))?;
    info!(package = %package.display(), "package uninstalled");

    match host.module_dir() {
        Ok(dir) => {
            let app = paths::app_exe_path(&dir);
            if let Err(err) = host.launch(&Launch::new(&app).quiet()) {
                warn!("relaunch of {} failed: {err:#}", app.display());
            }
        }
        Err(err) => warn!("cannot locate install dir for relaunch: {err:#}"),
    }
    Ok(UninstallOutcome::Uninstalled)
}
