use anyhow::{bail, Result};
use std::{
    ffi::{OsStr, OsString},
    path::PathBuf,
};

pub const INSTALL_DOTNET_DESKTOP: &str = "-install_dotnet_desktop";
pub const INSTALL_DOTNET_CORE: &str = "-install_dotnet_core";
pub const UNINSTALL_MSI: &str = "-uninstall_msi";
pub const UPDATE_NOW: &str = "-update_now";
pub const UPDATE_NOW_AND_START: &str = "-update_now_and_start_pt";
pub const UPDATE_NOW_STAGE_2: &str = "-update_now_stage_2";

pub const RESTART_TOKEN: &str = "restart";
pub const DONT_START_TOKEN: &str = "dont_start";

/// Passed to the relaunched parent after a successful update.
pub const REPORT_UPDATE_SUCCESS: &str = "-report_update_success";

/// Whether stage 2 relaunches the parent after installing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Restart {
    Relaunch,
    DontStart,
}

impl Restart {
    pub fn from_flag(relaunch: bool) -> Self {
        if relaunch {
            Restart::Relaunch
        } else {
            Restart::DontStart
        }
    }

    /// Anything but the exact restart token means "don't start".
    pub fn from_token(token: &OsStr) -> Self {
        Self::from_flag(token == OsStr::new(RESTART_TOKEN))
    }

    pub fn token(self) -> &'static str {
        match self {
            Restart::Relaunch => RESTART_TOKEN,
            Restart::DontStart => DONT_START_TOKEN,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage2Args {
    pub installer: PathBuf,
    pub install_dir: PathBuf,
    pub restart: Restart,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    InstallDotnetDesktop,
    InstallDotnetCore,
    UninstallMsi,
    UpdateStage1 { force_restart: bool },
    UpdateStage2(Stage2Args),
}

/// Parses a full argv (program name first).
///
/// `Ok(None)` for a missing or unrecognised selector; `Err` only when a
/// recognised selector lacks the arguments it needs.
pub fn parse(args: &[OsString]) -> Result<Option<Action>> {
    let Some(selector) = args.get(1).and_then(|arg| arg.to_str()) else {
        return Ok(None);
    };

    let action = match selector {
        INSTALL_DOTNET_DESKTOP => Action::InstallDotnetDesktop,
        INSTALL_DOTNET_CORE => Action::InstallDotnetCore,
        UNINSTALL_MSI => Action::UninstallMsi,
        UPDATE_NOW => Action::UpdateStage1 {
            force_restart: false,
        },
        UPDATE_NOW_AND_START => Action::UpdateStage1 {
            force_restart: true,
        },
        UPDATE_NOW_STAGE_2 => {
            let [installer, install_dir, restart] = match &args[2..] {
                [a, b, c, ..] => [a, b, c],
                rest => bail!(
                    "{UPDATE_NOW_STAGE_2} expects 3 arguments, got {}",
                    rest.len()
                ),
            };
            Action::UpdateStage2(Stage2Args {
                installer: PathBuf::from(installer),
                install_dir: PathBuf::from(install_dir),
                restart: Restart::from_token(restart),
            })
        }
        _ => return Ok(None),
    };
    Ok(Some(action))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(items: &[&str]) -> Vec<OsString> {
        std::iter::once("action_runner.exe")
            .chain(items.iter().copied())
            .map(OsString::from)
            .collect()
    }

    #[test]
    fn missing_selector_is_no_action() {
        assert_eq!(parse(&argv(&[])).unwrap(), None);
        assert_eq!(parse(&[]).unwrap(), None);
    }

    #[test]
    fn unknown_selector_is_no_action() {
        assert_eq!(parse(&argv(&["-frobnicate"])).unwrap(), None);
    }

    #[test]
    fn selectors_match_exactly() {
        assert_eq!(parse(&argv(&["-install_dotnet"])).unwrap(), None);
        assert_eq!(parse(&argv(&["-UNINSTALL_MSI"])).unwrap(), None);
        assert_eq!(parse(&argv(&["-update_now_stage"])).unwrap(), None);
    }

    #[test]
    fn parses_simple_actions() {
        assert_eq!(
            parse(&argv(&[INSTALL_DOTNET_DESKTOP])).unwrap(),
            Some(Action::InstallDotnetDesktop)
        );
        assert_eq!(
            parse(&argv(&[INSTALL_DOTNET_CORE])).unwrap(),
            Some(Action::InstallDotnetCore)
        );
        assert_eq!(
            parse(&argv(&[UNINSTALL_MSI])).unwrap(),
            Some(Action::UninstallMsi)
        );
        assert_eq!(
            parse(&argv(&[UPDATE_NOW])).unwrap(),
            Some(Action::UpdateStage1 {
                force_restart: false
            })
        );
        assert_eq!(
            parse(&argv(&[UPDATE_NOW_AND_START])).unwrap(),
            Some(Action::UpdateStage1 {
                force_restart: true
            })
        );
    }

    #[test]
    fn stage2_takes_three_positionals() {
        let parsed = parse(&argv(&[
            UPDATE_NOW_STAGE_2,
            r"C:\temp\installer.msi",
            r"C:\Program Files\App",
            RESTART_TOKEN,
        ]))
        .unwrap();
        assert_eq!(
            parsed,
            Some(Action::UpdateStage2(Stage2Args {
                installer: PathBuf::from(r"C:\temp\installer.msi"),
                install_dir: PathBuf::from(r"C:\Program Files\App"),
                restart: Restart::Relaunch,
            }))
        );
    }

    #[test]
    fn stage2_with_missing_args_is_an_error() {
        let err = parse(&argv(&[UPDATE_NOW_STAGE_2, "setup.msi"])).unwrap_err();
        assert!(err.to_string().contains("expects 3 arguments, got 1"));
    }

    #[test]
    fn only_exact_restart_token_relaunches() {
        assert_eq!(Restart::from_token(OsStr::new("restart")), Restart::Relaunch);
        assert_eq!(
            Restart::from_token(OsStr::new("dont_start")),
            Restart::DontStart
        );
        assert_eq!(Restart::from_token(OsStr::new("Restart")), Restart::DontStart);
        assert_eq!(Restart::Relaunch.token(), RESTART_TOKEN);
        assert_eq!(Restart::DontStart.token(), DONT_START_TOKEN);
    }
}
