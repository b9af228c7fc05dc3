#![cfg_attr(windows, windows_subsystem = "windows")]

mod cli;
mod config;
mod dispatch;
mod download;
mod host;
mod logging;
mod paths;
mod runtime;
mod uninstall;
mod update;
mod win32;

use std::ffi::OsString;

fn main() {
    match paths::data_root().and_then(|root| logging::init(&root)) {
        Ok(log_path) => tracing::debug!(log = %log_path.display(), "logging initialised"),
        Err(err) => eprintln!("warning: logging disabled: {err:#}"),
    }

    let args: Vec<OsString> = std::env::args_os().collect();
    let code = dispatch::run(&host::SystemHost, &args);
    std::process::exit(code);
}
