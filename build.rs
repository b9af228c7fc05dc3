use serde::Deserialize;
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

#[derive(Debug, Deserialize)]
struct Config {
    app_name: String,
    app_exe_name: String,
    tray_window_class: String,
    installer_filename_pattern: String,
    msi_upgrade_code: String,
    data_dir: String,
    #[serde(default = "default_self_copy_name")]
    self_copy_name: String,
    runtimes: Runtimes,
}

#[derive(Debug, Deserialize)]
struct Runtimes {
    dotnet_desktop: Runtime,
    dotnet_core: Runtime,
}

#[derive(Debug, Deserialize)]
struct Runtime {
    display_name: String,
    version: String,
    file_name: String,
    url: String,
    installed_probe: String,
    #[serde(default)]
    skip_if_installed: bool,
    failure_message: String,
    failure_title: String,
}

fn default_self_copy_name() -> String {
    "action_runner.exe".to_string()
}

fn main() {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");
    let config = load_config(&PathBuf::from(manifest_dir)).unwrap_or_else(|err| {
        panic!("failed to load config.toml: {err}");
    });

    let out_dir = std::env::var("OUT_DIR").expect("OUT_DIR not set");
    if let Err(err) = write_config_rs(&PathBuf::from(out_dir), &config) {
        panic!("failed to write config: {err}");
    }
}

fn load_config(crate_root: &Path) -> io::Result<Config> {
    let config_path = crate_root.join("config.toml");
    println!("cargo:rerun-if-changed={}", config_path.display());
    let contents = fs::read_to_string(&config_path)?;
    let cfg: Config = toml::from_str(&contents)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
    if cfg.installer_filename_pattern.trim().is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "installer_filename_pattern is empty",
        ));
    }
    Ok(cfg)
}

fn write_config_rs(out_dir: &Path, config: &Config) -> io::Result<()> {
    let out_path = out_dir.join("action_runner_config.rs");
    let mut file = fs::File::create(&out_path)?;
    writeln!(file, "pub const APP_NAME: &str = {:?};", config.app_name)?;
    writeln!(file, "pub const APP_EXE_NAME: &str = {:?};", config.app_exe_name)?;
    writeln!(
        file,
        "pub const TRAY_WINDOW_CLASS: &str = {:?};",
        config.tray_window_class
    )?;
    writeln!(
        file,
        "pub const INSTALLER_FILENAME_PATTERN: &str = {:?};",
        config.installer_filename_pattern
    )?;
    writeln!(
        file,
        "pub const MSI_UPGRADE_CODE: &str = {:?};",
        config.msi_upgrade_code
    )?;
    writeln!(file, "pub const DATA_DIR: &str = {:?};", config.data_dir)?;
    writeln!(
        file,
        "pub const SELF_COPY_NAME: &str = {:?};",
        config.self_copy_name
    )?;
    write_runtime(&mut file, "DOTNET_DESKTOP", &config.runtimes.dotnet_desktop)?;
    write_runtime(&mut file, "DOTNET_CORE", &config.runtimes.dotnet_core)?;
    Ok(())
}

fn write_runtime(file: &mut fs::File, ident: &str, runtime: &Runtime) -> io::Result<()> {
    writeln!(file, "pub const {ident}: RuntimeSpec = RuntimeSpec {{")?;
    writeln!(file, "    display_name: {:?},", runtime.display_name)?;
    writeln!(file, "    version: {:?},", runtime.version)?;
    writeln!(file, "    file_name: {:?},", runtime.file_name)?;
    writeln!(file, "    url: {:?},", runtime.url)?;
    writeln!(file, "    installed_probe: {:?},", runtime.installed_probe)?;
    writeln!(file, "    skip_if_installed: {:?},", runtime.skip_if_installed)?;
    writeln!(file, "    failure_message: {:?},", runtime.failure_message)?;
    writeln!(file, "    failure_title: {:?},", runtime.failure_title)?;
    writeln!(file, "}};")?;
    Ok(())
}
