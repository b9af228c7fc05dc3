/// A downloadable runtime prerequisite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeSpec {
    pub display_name: &'static str,
    pub version: &'static str,
    pub file_name: &'static str,
    pub url: &'static str,
    /// Substring of `dotnet --list-runtimes` output that marks the runtime as present.
    pub installed_probe: &'static str,
    pub skip_if_installed: bool,
    pub failure_message: &'static str,
    pub failure_title: &'static str,
}

include!(concat!(env!("OUT_DIR"), "/action_runner_config.rs"));
