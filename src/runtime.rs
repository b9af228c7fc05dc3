use anyhow::{anyhow, Context, Result};
use std::path::Path;
use tracing::{info, warn};

use crate::{
    config::RuntimeSpec,
    host::{Host, Launch},
};

pub const DOWNLOAD_ATTEMPTS: usize = 3;
const INSTALLER_ARGS: [&str; 2] = ["/install", "/passive"];

/// Downloads the runtime installer and launches it without waiting.
///
/// A failed download is reported to the user with the runtime's error dialog.
/// Success only means the installer was started.
pub fn install_runtime(host: &impl Host, runtime: &RuntimeSpec) -> Result<()> {
    if runtime.skip_if_installed && runtime_is_installed(host, runtime) {
        info!(runtime = runtime.display_name, "runtime already installed");
        return Ok(());
    }

    let installer = host.temp_dir().join(runtime.file_name);
    info!(
        runtime = runtime.display_name,
        version = runtime.version,
        "downloading runtime installer"
    );
    if let Err(err) = download_with_retry(host, runtime.url, &installer, DOWNLOAD_ATTEMPTS) {
        host.show_error(runtime.failure_message, runtime.failure_title);
        return Err(err);
    }

    host.launch(&Launch::new(&installer).args(INSTALLER_ARGS))
        .with_context(|| format!("launch {}", installer.display()))?;
    info!(installer = %installer.display(), "runtime installer started");
    Ok(())
}

fn download_with_retry(host: &impl Host, url: &str, dest: &Path, attempts: usize) -> Result<()> {
    let mut last_err = None;
    for attempt in 1..=attempts {
        match host.download(url, dest) {
            Ok(()) => return Ok(()),
            Err(err) => {
                warn!(attempt, "download failed: {err:#}");
                last_err = Some(err);
            }
        }
    }
    let err = last_err.unwrap_or_else(|| anyhow!("no download attempted"));
    Err(err.context(format!("download {url} failed after {attempts} attempts")))
}

pub fn runtime_is_installed(host: &impl Host, runtime: &RuntimeSpec) -> bool {
    match host.list_runtimes() {
        Ok(listing) => runtime_listed(&listing, runtime.installed_probe),
        Err(err) => {
            info!("cannot list installed runtimes: {err:#}");
            false
        }
    }
}

fn runtime_listed(listing: &str, probe: &str) -> bool {
    listing.lines().any(|line| line.contains(probe))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config, host::testing::FakeHost};
    use std::ffi::OsString;

    const LISTING: &str = "Microsoft.NETCore.App 3.0.3 [C:\\Program Files\\dotnet\\shared\\Microsoft.NETCore.App]\n\
Microsoft.WindowsDesktop.App 3.1.0 [C:\\Program Files\\dotnet\\shared\\Microsoft.WindowsDesktop.App]\n";

    #[test]
    fn first_download_success_launches_passive_installer() {
        let tmp = tempfile::tempdir().unwrap();
        let host = FakeHost::rooted(tmp.path());

        install_runtime(&host, &config::DOTNET_DESKTOP).unwrap();

        let expected = host.temp_dir.join(config::DOTNET_DESKTOP.file_name);
        assert_eq!(
            *host.downloads.borrow(),
            vec![(config::DOTNET_DESKTOP.url.to_string(), expected.clone())]
        );
        let launches = host.launches.borrow();
        assert_eq!(launches.len(), 1);
        assert_eq!(launches[0].program, expected);
        assert_eq!(
            launches[0].args,
            vec![OsString::from("/install"), OsString::from("/passive")]
        );
        assert!(host.dialogs.borrow().is_empty());
    }

    #[test]
    fn retries_three_times_then_shows_dialog() {
        let tmp = tempfile::tempdir().unwrap();
        let host = FakeHost::rooted(tmp.path());
        host.download_failures.set(usize::MAX);

        let err = install_runtime(&host, &config::DOTNET_CORE).unwrap_err();

        assert!(format!("{err:#}").contains("after 3 attempts"));
        assert_eq!(host.downloads.borrow().len(), DOWNLOAD_ATTEMPTS);
        assert_eq!(
            *host.dialogs.borrow(),
            vec![(
                config::DOTNET_CORE.failure_message.to_string(),
                config::DOTNET_CORE.failure_title.to_string()
            )]
        );
        assert!(host.launches.borrow().is_empty());
    }

    #[test]
    fn success_on_second_attempt_stops_retrying() {
        let tmp = tempfile::tempdir().unwrap();
        let host = FakeHost::rooted(tmp.path());
        host.download_failures.set(1);

        install_runtime(&host, &config::DOTNET_CORE).unwrap();

        assert_eq!(host.downloads.borrow().len(), 2);
        assert!(host.dialogs.borrow().is_empty());
        assert_eq!(host.launches.borrow().len(), 1);
    }

    #[test]
    fn rejected_launch_is_a_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let mut host = FakeHost::rooted(tmp.path());
        host.reject_launch = true;

        assert!(install_runtime(&host, &config::DOTNET_DESKTOP).is_err());
        assert!(host.dialogs.borrow().is_empty());
    }

    #[test]
    fn installs_even_when_present_unless_configured_to_skip() {
        let tmp = tempfile::tempdir().unwrap();
        let mut host = FakeHost::rooted(tmp.path());
        host.runtimes = Some(LISTING.to_string());

        let always = RuntimeSpec {
            skip_if_installed: false,
            ..config::DOTNET_CORE
        };
        install_runtime(&host, &always).unwrap();
        assert_eq!(host.downloads.borrow().len(), 1);

        let skipping = RuntimeSpec {
            skip_if_installed: true,
            ..config::DOTNET_CORE
        };
        install_runtime(&host, &skipping).unwrap();
        assert_eq!(host.downloads.borrow().len(), 1);
    }

    #[test]
    fn probe_matches_listing_lines() {
        assert!(runtime_listed(LISTING, "Microsoft.NETCore.App 3.0."));
        assert!(!runtime_listed(LISTING, "Microsoft.WindowsDesktop.App 3.0."));
        assert!(!runtime_listed("", "Microsoft.NETCore.App 3.0."));
    }

    #[test]
    fn missing_dotnet_means_not_installed() {
        let tmp = tempfile::tempdir().unwrap();
        let host = FakeHost::rooted(tmp.path());
        assert!(!runtime_is_installed(&host, &config::DOTNET_CORE));
    }
}
