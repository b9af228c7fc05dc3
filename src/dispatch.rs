use anyhow::Result;
use std::ffi::OsString;
use tracing::{error, info};

use crate::{
    cli::{self, Action},
    config,
    host::Host,
    runtime, uninstall, update,
};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_UNINSTALL_FAILED: i32 = -1;

/// Runs the action selected by `args` and returns the process exit code.
///
/// A missing or unknown selector is a silent no-op that exits 0.
pub fn run(host: &impl Host, args: &[OsString]) -> i32 {
    let action = match cli::parse(args) {
        Ok(Some(action)) => action,
        Ok(None) => {
            info!(args = ?args.get(1..), "no recognised action, nothing to do");
            return EXIT_SUCCESS;
        }
        Err(err) => {
            error!("invalid arguments: {err:#}");
            return EXIT_FAILURE;
        }
    };

    info!(?action, "running action");
    match action {
        Action::InstallDotnetDesktop => {
            exit_code(runtime::install_runtime(host, &config::DOTNET_DESKTOP))
        }
        Action::InstallDotnetCore => exit_code(runtime::install_runtime(host, &config::DOTNET_CORE)),
        Action::UninstallMsi => match uninstall::uninstall_package(host) {
            Ok(_) => EXIT_SUCCESS,
            Err(err) => {
                error!("uninstall failed: {err:#}");
                EXIT_UNINSTALL_FAILED
            }
        },
        Action::UpdateStage1 { force_restart } => exit_code(update::stage1(host, force_restart)),
        Action::UpdateStage2(args) => exit_code(update::stage2(host, &args)),
    }
}

fn exit_code(result: Result<()>) -> i32 {
    match result {
        Ok(()) => EXIT_SUCCESS,
        Err(err) => {
            error!("action failed: {err:#}");
            EXIT_FAILURE
        }
    }
}
