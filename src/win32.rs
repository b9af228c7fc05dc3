//! Thin wrappers over the Win32 shell, window and Windows Installer APIs.
//!
//! Other targets get stand-ins so the rest of the crate builds and tests
//! everywhere: launches spawn a plain child process, no window is ever
//! found, dialogs go to the log and MSI operations fail.

use anyhow::Result;
#[cfg(not(windows))]
use anyhow::{bail, Context};
use std::path::{Path, PathBuf};

use crate::host::{Launch, WindowHandle};

/// Joins arguments into one command line using the MSVC argv quoting rules.
pub fn command_line<S: AsRef<str>>(args: &[S]) -> String {
    args.iter()
        .map(|arg| quote_arg(arg.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn quote_arg(arg: &str) -> String {
    let needs_quotes =
        arg.is_empty() || arg.chars().any(|c| matches!(c, ' ' | '\t' | '\n' | '\x0b' | '"'));
    if !needs_quotes {
        return arg.to_string();
    }

    let mut out = String::with_capacity(arg.len() + 2);
    out.push('"');
    let mut backslashes = 0usize;
    for ch in arg.chars() {
        match ch {
            '\\' => backslashes += 1,
            '"' => {
                out.push_str(&"\\".repeat(backslashes * 2 + 1));
                out.push('"');
                backslashes = 0;
            }
            _ => {
                out.push_str(&"\\".repeat(backslashes));
                out.push(ch);
                backslashes = 0;
            }
        }
    }
    // Trailing backslashes would escape the closing quote.
    out.push_str(&"\\".repeat(backslashes * 2));
    out.push('"');
    out
}

#[cfg(windows)]
fn wide(value: impl AsRef<std::ffi::OsStr>) -> Vec<u16> {
    use std::iter::once;
    use std::os::windows::ffi::OsStrExt;

    value.as_ref().encode_wide().chain(once(0)).collect()
}

#[cfg(windows)]
pub fn shell_execute(launch: &Launch) -> Result<()> {
    use anyhow::Context;
    use windows_sys::Win32::UI::Shell::{
        ShellExecuteExW, SEE_MASK_FLAG_NO_UI, SEE_MASK_NOASYNC, SHELLEXECUTEINFOW,
    };
    use windows_sys::Win32::UI::WindowsAndMessaging::SW_SHOWNORMAL;

    let file = wide(launch.program.as_os_str());
    let args: Vec<String> = launch
        .args
        .iter()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();
    let params = wide(command_line(args.as_slice()));

    let mut info: SHELLEXECUTEINFOW = unsafe { std::mem::zeroed() };
    info.cbSize = std::mem::size_of::<SHELLEXECUTEINFOW>() as u32;
    info.fMask = SEE_MASK_NOASYNC;
    if launch.quiet {
        info.fMask |= SEE_MASK_FLAG_NO_UI;
    }
    info.lpFile = file.as_ptr();
    if !args.is_empty() {
        info.lpParameters = params.as_ptr();
    }
    info.nShow = SW_SHOWNORMAL as i32;

    let accepted = unsafe { ShellExecuteExW(&mut info) };
    if accepted == 0 {
        return Err(std::io::Error::last_os_error())
            .with_context(|| format!("ShellExecuteExW {}", launch.program.display()));
    }
    Ok(())
}

#[cfg(not(windows))]
pub fn shell_execute(launch: &Launch) -> Result<()> {
    use std::process::{Command, Stdio};

    Command::new(&launch.program)
        .args(&launch.args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("spawn {}", launch.program.display()))?;
    Ok(())
}

#[cfg(windows)]
pub fn find_window(class: &str) -> Option<WindowHandle> {
    use windows_sys::Win32::UI::WindowsAndMessaging::FindWindowW;

    let class = wide(class);
    let hwnd = unsafe { FindWindowW(class.as_ptr(), std::ptr::null()) };
    (hwnd != 0).then_some(WindowHandle(hwnd))
}

#[cfg(not(windows))]
pub fn find_window(_class: &str) -> Option<WindowHandle> {
    None
}

/// Queues `WM_CLOSE` for the window without waiting for it to be handled.
#[cfg(windows)]
pub fn post_close(window: WindowHandle) {
    use windows_sys::Win32::UI::WindowsAndMessaging::{PostMessageW, WM_CLOSE};

    let posted = unsafe { PostMessageW(window.0, WM_CLOSE, 0, 0) };
    if posted == 0 {
        tracing::warn!(
            "failed to post WM_CLOSE: {}",
            std::io::Error::last_os_error()
        );
    }
}

#[cfg(not(windows))]
pub fn post_close(_window: WindowHandle) {}

#[cfg(windows)]
pub fn message_box_error(message: &str, title: &str) {
    use windows_sys::Win32::UI::WindowsAndMessaging::{MessageBoxW, MB_ICONERROR, MB_OK};

    let text = wide(message);
    let caption = wide(title);
    unsafe {
        MessageBoxW(0, text.as_ptr(), caption.as_ptr(), MB_OK | MB_ICONERROR);
    }
}

#[cfg(not(windows))]
pub fn message_box_error(message: &str, title: &str) {
    tracing::error!(title, "{message}");
}

/// Runs the Windows Installer synchronously on `package`.
#[cfg(windows)]
pub fn msi_install_product(package: &Path, command_line: Option<&str>) -> Result<()> {
    use windows_sys::Win32::Foundation::ERROR_SUCCESS;
    use windows_sys::Win32::System::ApplicationInstallationAndServicing::MsiInstallProductW;

    let path = wide(package.as_os_str());
    let cmd = command_line.map(wide);
    let cmd_ptr = cmd.as_ref().map_or(std::ptr::null(), |c| c.as_ptr());
    let rc = unsafe { MsiInstallProductW(path.as_ptr(), cmd_ptr) };
    if rc != ERROR_SUCCESS {
        anyhow::bail!("MsiInstallProductW {} failed with {rc}", package.display());
    }
    Ok(())
}

#[cfg(not(windows))]
pub fn msi_install_product(package: &Path, _command_line: Option<&str>) -> Result<()> {
    bail!(
        "cannot run Windows Installer package {} on this platform",
        package.display()
    )
}

/// Cached `LocalPackage` of the first installed product sharing `upgrade_code`.
#[cfg(windows)]
pub fn msi_package_path(upgrade_code: &str) -> Result<Option<PathBuf>> {
    use std::{ffi::OsString, os::windows::ffi::OsStringExt};
    use windows_sys::Win32::Foundation::{ERROR_MORE_DATA, ERROR_NO_MORE_ITEMS, ERROR_SUCCESS};
    use windows_sys::Win32::System::ApplicationInstallationAndServicing::{
        MsiEnumRelatedProductsW, MsiGetProductInfoW,
    };

    let upgrade = wide(upgrade_code);
    // A product code is a 38 character GUID.
    let mut product = [0u16; 39];
    let rc = unsafe { MsiEnumRelatedProductsW(upgrade.as_ptr(), 0, 0, product.as_mut_ptr()) };
    if rc == ERROR_NO_MORE_ITEMS {
        return Ok(None);
    }
    if rc != ERROR_SUCCESS {
        anyhow::bail!("MsiEnumRelatedProductsW failed with {rc}");
    }

    let property = wide("LocalPackage");
    let mut buf = vec![0u16; 261];
    loop {
        let mut len = (buf.len() - 1) as u32;
        let rc = unsafe {
            MsiGetProductInfoW(
                product.as_ptr(),
                property.as_ptr(),
                buf.as_mut_ptr(),
                &mut len,
            )
        };
        if rc == ERROR_MORE_DATA {
            buf.resize(len as usize + 2, 0);
            continue;
        }
        if rc != ERROR_SUCCESS {
            anyhow::bail!("MsiGetProductInfoW failed with {rc}");
        }
        buf.truncate(len as usize);
        break;
    }
    if buf.is_empty() {
        return Ok(None);
    }
    Ok(Some(PathBuf::from(OsString::from_wide(&buf))))
}

#[cfg(not(windows))]
pub fn msi_package_path(_upgrade_code: &str) -> Result<Option<PathBuf>> {
    Ok(None)
}
