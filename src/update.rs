use anyhow::{bail, Context, Result};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use tracing::{info, warn};

use crate::{
    cli::{self, Restart, Stage2Args},
    config,
    host::{Host, Launch},
    paths,
};

/// First entry of `updates_dir` whose file name contains the installer pattern.
pub fn find_pending_installer(updates_dir: &Path) -> Result<Option<PathBuf>> {
    let entries = match fs::read_dir(updates_dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(err).with_context(|| format!("read_dir {}", updates_dir.display()))
        }
    };

    for ent in entries {
        let ent = ent?;
        if ent
            .file_name()
            .to_string_lossy()
            .contains(config::INSTALLER_FILENAME_PATTERN)
        {
            return Ok(Some(ent.path()));
        }
    }
    Ok(None)
}

pub fn copy_self_to_temp(host: &impl Host) -> Result<PathBuf> {
    let src = host.current_exe()?;
    let dest = paths::self_copy_path(&host.temp_dir());
    fs::copy(&src, &dest)
        .with_context(|| format!("copy {} -> {}", src.display(), dest.display()))?;
    Ok(dest)
}

/// Hands the update off to a temp copy of this executable.
///
/// Closes the running parent, if any, and asks stage 2 to relaunch it
/// afterwards; `force_restart` asks for the relaunch even if it was not running.
pub fn stage1(host: &impl Host, force_restart: bool) -> Result<()> {
    let updates_dir = host.pending_updates_dir()?;
    let Some(installer) = find_pending_installer(&updates_dir)? else {
        bail!(
            "no pending installer matching {:?} in {}",
            config::INSTALLER_FILENAME_PATTERN,
            updates_dir.display()
        );
    };
    info!(installer = %installer.display(), "found pending update");

    let stage2_exe = copy_self_to_temp(host)?;
    let install_dir = host.module_dir()?;

    let parent = host.find_parent_window();
    let restart = Restart::from_flag(force_restart || parent.is_some());
    if let Some(window) = parent {
        info!("asking {} to close", config::APP_NAME);
        host.request_close(window);
    }

    let launch = Launch::new(&stage2_exe)
        .arg(cli::UPDATE_NOW_STAGE_2)
        .arg(&installer)
        .arg(&install_dir)
        .arg(restart.token())
        .quiet();
    host.launch(&launch)
        .with_context(|| format!("launch update stage 2 {}", stage2_exe.display()))?;
    info!(restart = restart.token(), "update stage 2 launched");
    Ok(())
}

/// Installs the package and optionally relaunches the parent.
///
/// The arguments come from stage 1 and are trusted as-is.
pub fn stage2(host: &impl Host, args: &Stage2Args) -> Result<()> {
    host.install_package(&args.installer)
        .with_context(|| format!("install {}", args.installer.display()))?;
    info!(installer = %args.installer.display(), "update installed");

    if let Err(err) = fs::remove_file(&args.installer) {
        warn!("could not remove {}: {err}", args.installer.display());
    }

    if args.restart == Restart::Relaunch {
        let app = paths::app_exe_path(&args.install_dir);
        host.launch(
            &Launch::new(&app)
                .arg(cli::REPORT_UPDATE_SUCCESS)
                .quiet(),
        )
        .with_context(|| format!("relaunch {}", app.display()))?;
        info!(app = %app.display(), "relaunched after update");
    }
    Ok(())
}
